//! Command-line session: the same auth flow as the browser, with the token
//! kept in a file instead of a cookie.

use crate::{
    client::{ApiClient, AuthService, LoginRequest, RegisterRequest},
    session::{FileTokenStore, MemoryTokenStore, Session, TokenStore},
};
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::{path::PathBuf, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ClientArgs {
    pub auth_url: String,
    pub token_file: Option<PathBuf>,
}

#[derive(Debug)]
pub struct LoginArgs {
    pub client: ClientArgs,
    pub username: String,
    pub password: SecretString,
}

#[derive(Debug)]
pub struct RegisterArgs {
    pub client: ClientArgs,
    pub username: String,
    pub email: String,
    pub password: SecretString,
}

/// The token slot for this invocation: the requested file, the default file
/// under the config dir, or process memory when neither is available.
fn token_store(args: &ClientArgs) -> Arc<dyn TokenStore> {
    match args.token_file.clone().or_else(FileTokenStore::default_path) {
        Some(path) => {
            debug!("Token slot: {}", path.display());
            Arc::new(FileTokenStore::new(path))
        }
        None => {
            warn!("No config directory available; the session will not outlive this process");
            Arc::new(MemoryTokenStore::new())
        }
    }
}

fn auth_service(args: &ClientArgs) -> Result<AuthService> {
    let api = ApiClient::new(&args.auth_url).context("Invalid auth URL")?;
    Ok(AuthService::new(api, token_store(args)))
}

/// Cancel in-flight requests on ctrl-c.
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    cancel
}

/// # Errors
/// Returns an error if the backend rejects the credentials or the token
/// cannot be stored.
pub async fn login(args: LoginArgs) -> Result<()> {
    let auth = auth_service(&args.client)?;
    let credentials = LoginRequest {
        username: args.username,
        password: args.password.expose_secret().to_string(),
    };
    let cancel = cancel_on_ctrl_c();
    let response = auth.login(&credentials, Some(&cancel)).await?;
    println!("Signed in as {} <{}>", response.user.username, response.user.email);
    Ok(())
}

/// # Errors
/// Returns an error if the backend rejects the registration or the token
/// cannot be stored.
pub async fn register(args: RegisterArgs) -> Result<()> {
    let auth = auth_service(&args.client)?;
    let user_data = RegisterRequest {
        username: args.username,
        email: args.email,
        password: args.password.expose_secret().to_string(),
    };
    let cancel = cancel_on_ctrl_c();
    let response = auth.register(&user_data, Some(&cancel)).await?;
    println!(
        "Registered and signed in as {} <{}>",
        response.user.username, response.user.email
    );
    Ok(())
}

/// # Errors
/// Returns an error only if the local token cannot be removed.
pub async fn logout(args: ClientArgs) -> Result<()> {
    let auth = auth_service(&args)?;
    let cancel = cancel_on_ctrl_c();
    auth.logout(Some(&cancel)).await?;
    println!("Signed out");
    Ok(())
}

/// Print the current session as JSON.
/// # Errors
/// Returns an error if the session cannot be serialized.
pub fn whoami(args: &ClientArgs) -> Result<()> {
    let session = Session::resolve(token_store(args).as_ref());
    println!("{}", serde_json::to_string_pretty(&session)?);
    Ok(())
}
