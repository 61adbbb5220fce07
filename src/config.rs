//! Client configuration.
//!
//! Settings are layered, lowest precedence first:
//! 1. built-in defaults
//! 2. `taskboard.toml` (user config dir, or `--config`)
//! 3. environment (`TASKBOARD_API_URL`, `TASKBOARD_SESSION_FILE`,
//!    `TASKBOARD_TIMEOUT_SECS`), after `.env` has been loaded
//! 4. command-line overrides
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! base_url = "https://tasks.example.com/api"
//! timeout_secs = 30
//! coalesce_refresh = false
//!
//! [session]
//! file = "/home/me/.config/taskboard/session.json"
//! login_path = "/login"
//!
//! [logging]
//! format = "text"
//! dir = "/home/me/.local/state/taskboard"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::logging::LogFormat;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const ENV_API_URL: &str = "TASKBOARD_API_URL";
pub const ENV_SESSION_FILE: &str = "TASKBOARD_SESSION_FILE";
pub const ENV_TIMEOUT_SECS: &str = "TASKBOARD_TIMEOUT_SECS";

const APP_DIR: &str = "taskboard";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Serialize concurrent token refreshes behind one in-flight call.
    #[serde(default)]
    pub coalesce_refresh: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            coalesce_refresh: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSection {
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default = "default_login_path")]
    pub login_path: String,
}

fn default_login_path() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            file: None,
            login_path: default_login_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Contents of `taskboard.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigToml {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl ConfigToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse taskboard.toml")
    }

    /// Load from `path`, or defaults if the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize taskboard.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Human-readable problems with the file's values.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Err(e) = normalize_base_url(&self.api.base_url) {
            warnings.push(format!("Invalid api.base_url: {}", e));
        }
        if self.api.timeout_secs == 0 {
            warnings.push("api.timeout_secs is 0: every request would time out".to_string());
        }
        if !self.session.login_path.starts_with('/') {
            warnings.push(format!(
                "session.login_path '{}' should start with '/'",
                self.session.login_path
            ));
        }

        warnings
    }
}

/// Command-line values that win over every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub session_file: Option<PathBuf>,
}

/// Fully resolved settings for one client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub session_file: PathBuf,
    pub login_path: String,
    pub coalesce_refresh: bool,
    pub log_format: LogFormat,
    pub log_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(default_timeout_secs()),
            session_file: default_session_file(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            coalesce_refresh: false,
            log_format: LogFormat::default(),
            log_dir: None,
        }
    }
}

impl ClientConfig {
    /// Resolve from the config file (explicit path or the default location),
    /// the process environment and `overrides`.
    pub fn load(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let toml = match config_path {
            Some(path) => ConfigToml::load(path)?,
            None => match default_config_path() {
                Some(path) => ConfigToml::load_or_default(&path)?,
                None => ConfigToml::default(),
            },
        };
        Self::from_sources(&toml, |key| std::env::var(key).ok(), overrides)
    }

    /// Resolve from explicit sources; `env` looks up an environment variable.
    pub fn from_sources(
        toml: &ConfigToml,
        env: impl Fn(&str) -> Option<String>,
        overrides: &ConfigOverrides,
    ) -> Result<Self> {
        let raw_url = overrides
            .api_url
            .clone()
            .or_else(|| env(ENV_API_URL))
            .unwrap_or_else(|| toml.api.base_url.clone());
        let base_url = normalize_base_url(&raw_url)?;

        let timeout_secs = match env(ENV_TIMEOUT_SECS) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{} must be a number of seconds", ENV_TIMEOUT_SECS))?,
            None => toml.api.timeout_secs,
        };

        let session_file = overrides
            .session_file
            .clone()
            .or_else(|| env(ENV_SESSION_FILE).map(PathBuf::from))
            .or_else(|| toml.session.file.clone())
            .unwrap_or_else(default_session_file);

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            session_file,
            login_path: toml.session.login_path.clone(),
            coalesce_refresh: toml.api.coalesce_refresh,
            log_format: toml.logging.format,
            log_dir: toml.logging.dir.clone(),
        })
    }

    /// Full URL for an API path such as `/tasks/5/`.
    pub fn endpoint(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

/// Parse the URL, require an http(s) scheme and a host, and drop trailing
/// slashes.
pub fn normalize_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        bail!("API base URL is empty");
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        bail!(
            "API base URL '{}' must start with http:// or https://",
            trimmed
        );
    }
    let parsed = reqwest::Url::parse(trimmed)
        .with_context(|| format!("API base URL '{}' is not a valid URL", trimmed))?;
    if parsed.host_str().is_none_or(str::is_empty) {
        bail!("API base URL '{}' has no host", trimmed);
    }
    Ok(trimmed.to_string())
}

pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR))
}

pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("taskboard.toml"))
}

pub fn default_session_file() -> PathBuf {
    config_dir()
        .unwrap_or_else(|| PathBuf::from(".taskboard"))
        .join("session.json")
}
