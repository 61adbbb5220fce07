//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module          | Commands handled                                   |
//! |-----------------|----------------------------------------------------|
//! | `auth`          | `Login`, `Register`, `Logout`, `Whoami`            |
//! | `projects`      | `Projects`                                         |
//! | `tasks`         | `Tasks` (including followers)                      |
//! | `comments`      | `Comments`                                         |
//! | `notifications` | `Notifications`                                    |
//! | `config`        | `Config`                                           |
//!
//! `render` holds the shared text and JSON output helpers.

pub mod auth;
pub mod comments;
pub mod config;
pub mod notifications;
pub mod projects;
pub mod render;
pub mod tasks;

use std::sync::Arc;

use anyhow::Result;
use taskboard::{ApiClient, ClientConfig, FileSessionStore, TerminalNavigator};

pub use auth::{cmd_login, cmd_logout, cmd_register, cmd_whoami, prompt_registration};
pub use comments::cmd_comments;
pub use config::cmd_config;
pub use notifications::cmd_notifications;
pub use projects::cmd_projects;
pub use tasks::cmd_tasks;

/// Client backed by the session file and the terminal sign-in prompt.
pub fn build_client(config: &ClientConfig) -> Result<ApiClient> {
    tracing::debug!(
        base_url = %config.base_url,
        session_file = %config.session_file.display(),
        "building client"
    );
    let store = Arc::new(FileSessionStore::new(config.session_file.clone()));
    let navigator = Arc::new(TerminalNavigator::new(config.login_path.clone()));
    Ok(ApiClient::from_config(config, store, navigator)?)
}

/// Ask before a destructive call unless `force` is set.
pub(crate) fn confirm(prompt: String, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }
    use dialoguer::Confirm;
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}
