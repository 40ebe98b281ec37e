pub mod storage;
pub mod token;

pub use storage::{SessionStorage, StoredAccount};

use anyhow::{Context, Result, bail};

use crate::api::{DirectoryApi, LoginRequest, RegisterRequest};

/// Credentials attached to outgoing requests. Built once and handed to the
/// API client; there is no global token lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    /// No credentials: only the public directory endpoints will work.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Session for the account stored against `api_url`, or anonymous.
    pub fn from_storage(storage: &SessionStorage, api_url: &str) -> Result<Self> {
        let account = storage
            .get(api_url)
            .context("failed to read stored session")?;
        Ok(match account {
            Some(account) => Self::bearer(account.token),
            None => Self::anonymous(),
        })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Log in and remember the returned token for `api_url`.
pub async fn login(
    api: &dyn DirectoryApi,
    storage: &SessionStorage,
    api_url: &str,
    request: &LoginRequest,
) -> Result<StoredAccount> {
    let resp = api
        .login(request)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Login failed")))?;
    let account = StoredAccount::from(resp);
    storage
        .set(api_url, &account)
        .context("failed to save session")?;
    tracing::info!(email = %account.email, "logged in");
    Ok(account)
}

/// Create an account and remember the returned token for `api_url`.
pub async fn register(
    api: &dyn DirectoryApi,
    storage: &SessionStorage,
    api_url: &str,
    request: &RegisterRequest,
) -> Result<StoredAccount> {
    let resp = api
        .register(request)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Registration failed")))?;
    let account = StoredAccount::from(resp);
    storage
        .set(api_url, &account)
        .context("failed to save session")?;
    tracing::info!(email = %account.email, "registered");
    Ok(account)
}

/// Use `password` when given on the command line, otherwise ask for it on
/// the terminal without echoing.
pub fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(password) if password.is_empty() => bail!("password must not be empty"),
        Some(password) => Ok(password),
        None => dialoguer::Password::new()
            .with_prompt("Password")
            .interact()
            .context("failed to read password"),
    }
}

/// Forget the stored session for `api_url`.
pub fn logout(storage: &SessionStorage, api_url: &str) -> Result<()> {
    storage
        .remove(api_url)
        .context("failed to remove session")?;
    Ok(())
}
