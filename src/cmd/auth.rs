//! Session commands: `login`, `register`, `logout`, `whoami`.

use anyhow::{Context, Result};
use dialoguer::{Input, Password};
use taskboard::ApiClient;
use taskboard_common::{LoginCredentials, RegisterData};

use super::render;

fn prompt_if_missing(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()
            .with_context(|| format!("Failed to read {}", prompt.to_lowercase())),
    }
}

fn prompt_password(value: Option<String>, confirm: bool) -> Result<String> {
    if let Some(password) = value {
        return Ok(password);
    }
    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
    }
    prompt.interact().context("Failed to read password")
}

pub async fn cmd_login(
    client: &ApiClient,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let username = prompt_if_missing(username, "Username")?;
    let password = prompt_password(password, false)?;

    // Credentials from a stale or unreadable session must not ride along on
    // the token request. Clearing never reads the old session.
    client.logout()?;

    client
        .login(&LoginCredentials {
            username: username.clone(),
            password,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Sign-in failed: {}", e.detail()))?;

    render::success(format!("Signed in as {}", username));
    Ok(())
}

pub fn prompt_registration(
    username: Option<String>,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    password: Option<String>,
) -> Result<RegisterData> {
    Ok(RegisterData {
        username: prompt_if_missing(username, "Username")?,
        email: prompt_if_missing(email, "Email")?,
        first_name: first_name.unwrap_or_default(),
        last_name: last_name.unwrap_or_default(),
        password: prompt_password(password, true)?,
    })
}

pub async fn cmd_register(client: &ApiClient, data: &RegisterData, json: bool) -> Result<()> {
    let user = client
        .register(data)
        .await
        .map_err(|e| anyhow::anyhow!("Registration failed: {}", e.detail()))?;
    render::emit(json, &user, |user| {
        render::success(format!("Created account {} (#{})", user.username, user.id));
        println!("Run 'taskboard login' to sign in.");
    })
}

pub fn cmd_logout(client: &ApiClient) -> Result<()> {
    let signed_in = client.is_authenticated().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "session is unreadable, removing it");
        true
    });
    client.logout()?;
    if signed_in {
        render::success("Signed out");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

pub async fn cmd_whoami(client: &ApiClient, json: bool) -> Result<()> {
    if !client.is_authenticated()? {
        anyhow::bail!("Not signed in. Run 'taskboard login' first.");
    }
    let user = client.current_user().await?;
    render::emit(json, &user, |user| {
        println!("{} ({})", user.display_name(), user.username);
        if !user.email.is_empty() {
            println!("  Email: {}", user.email);
        }
        println!("  Id:    {}", user.id);
    })
}
