//! CLI command implementations.

mod account;
mod auth;
mod tools;
mod vault;

pub use account::{change_password, delete_account, profile_show, profile_update};
pub use auth::{login, logout, register, status, whoami};
pub use tools::{categories, generate, tags};
pub use vault::{add, delete, edit, favorite, health, list, show, EntryFields};

use anyhow::{Context as _, Result};
use nuvault_api::{NuvaultClient, PasswordService};
use nuvault_cache::VaultCache;
use nuvault_config_and_utils::{Config, Paths};
use nuvault_storage::SessionStore;
use std::io::{self, Write};
use std::sync::Arc;

/// Everything a command needs, built once per invocation.
pub struct Context {
    pub client: NuvaultClient,
    pub cache: Arc<VaultCache>,
    pub session: Arc<SessionStore>,
}

impl Context {
    pub fn new(config: &Config, paths: &Paths) -> Result<Self> {
        let session = Arc::new(
            nuvault_storage::create_session_store(paths)
                .context("Failed to open session store")?,
        );
        let api_url = config.api_url().context("Invalid API URL")?;
        let client = NuvaultClient::new(api_url.as_str(), Arc::clone(&session));
        let service: Arc<dyn PasswordService> = Arc::new(client.clone());
        let cache = Arc::new(VaultCache::new(service, Arc::clone(&session)));

        Ok(Self {
            client,
            cache,
            session,
        })
    }

    /// Bail unless a session token is stored.
    pub fn require_login(&self) -> Result<()> {
        if !self.session.is_authenticated()? {
            anyhow::bail!("Not logged in. Run 'nuvault login' first");
        }
        Ok(())
    }
}

/// Read one trimmed line from stdin.
fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Prompt, keeping `current` when the answer is blank.
fn prompt_with_default(label: &str, current: &str) -> Result<String> {
    let answer = prompt(&format!("{} [{}]", label, current))?;
    Ok(if answer.is_empty() {
        current.to_string()
    } else {
        answer
    })
}

/// Read a secret without echo.
fn prompt_secret(label: &str) -> Result<String> {
    Ok(rpassword::prompt_password(format!("{}: ", label))?)
}

/// Ask user for confirmation.
fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    io::stdout().flush().ok();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
