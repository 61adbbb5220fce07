//! Configuration view and validation commands: `taskboard config`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use taskboard::config::{ClientConfig, ConfigOverrides, ConfigToml, default_config_path};

use super::super::ConfigCommands;

fn resolve_path(config_path: Option<&Path>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_path()
            .context("Could not determine the user config directory; pass --config"),
    }
}

fn print_sections(toml: &ConfigToml) {
    println!("[api]");
    println!("  base_url = \"{}\"", toml.api.base_url);
    println!("  timeout_secs = {}", toml.api.timeout_secs);
    println!("  coalesce_refresh = {}", toml.api.coalesce_refresh);
    println!();

    println!("[session]");
    if let Some(file) = &toml.session.file {
        println!("  file = \"{}\"", file.display());
    }
    println!("  login_path = \"{}\"", toml.session.login_path);
    println!();

    println!("[logging]");
    println!("  format = \"{}\"", toml.logging.format);
    if let Some(dir) = &toml.logging.dir {
        println!("  dir = \"{}\"", dir.display());
    }
    println!();
}

pub fn cmd_config(
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
    command: Option<ConfigCommands>,
) -> Result<()> {
    let path = resolve_path(config_path)?;

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Taskboard Configuration");
            println!("=======================");
            println!();

            if path.exists() {
                println!("Config file: {}", path.display());
                println!();
                print_sections(&ConfigToml::load(&path)?);
            } else {
                println!("No taskboard.toml found at {}", path.display());
                println!();
                println!("Using default configuration:");
                print_sections(&ConfigToml::default());
                println!("Run 'taskboard config init' to create a taskboard.toml file.");
                println!();
            }

            println!("Effective values (with env/CLI overrides):");
            let toml = ConfigToml::load_or_default(&path)?;
            let config = ClientConfig::from_sources(&toml, |key| std::env::var(key).ok(), overrides)?;
            println!("  base_url = \"{}\"", config.base_url);
            println!("  timeout_secs = {}", config.timeout.as_secs());
            println!("  session_file = \"{}\"", config.session_file.display());
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !path.exists() {
                println!("No taskboard.toml found. Using defaults (valid).");
                return Ok(());
            }

            let toml = ConfigToml::load(&path)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if path.exists() {
                println!("taskboard.toml already exists at {}", path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            ConfigToml::default().save(&path)?;

            println!("Created taskboard.toml at {}", path.display());
            println!();
            println!("You can now customize:");
            println!("  - [api] base_url, timeout_secs, coalesce_refresh");
            println!("  - [session] file, login_path");
            println!("  - [logging] format, dir");
            println!();
        }
    }

    Ok(())
}
