use crate::{
    api::{self, AppState, Gatekeeper},
    session::CookiePolicy,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub api_url: String,
    pub auth_url: String,
    pub jwt_secret: Option<SecretString>,
    pub protected_prefixes: Vec<String>,
    pub insecure_cookies: bool,
}

/// Execute the server action.
/// # Errors
/// Returns an error if a backend URL is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let state = AppState::new(&args.auth_url, &args.api_url)
        .context("Invalid backend URL")?
        .with_cookies(CookiePolicy::default().with_secure(!args.insecure_cookies));

    let gatekeeper = Gatekeeper::new(&args.protected_prefixes).with_secret(args.jwt_secret);

    api::new(args.port, state, gatekeeper).await
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("api_url", args.api_url.clone()),
        ("auth_url", args.auth_url.clone()),
        ("jwt_secret_set", args.jwt_secret.is_some().to_string()),
        ("protected", args.protected_prefixes.join(",")),
        ("secure_cookies", (!args.insecure_cookies).to_string()),
    ];
    log_entries("Startup configuration", &entries);
}

fn log_entries(title: &str, entries: &[(&str, String)]) {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} - {}\n\n{title}:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn short_commit(hash: &str) -> String {
    let trimmed = hash.trim();
    if trimmed.len() > 7 {
        trimmed[..7].to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_commit_truncates() {
        assert_eq!(short_commit("0123456789abcdef"), "0123456");
        assert_eq!(short_commit(" abc "), "abc");
    }

    #[test]
    fn debug_output_hides_secret() {
        let args = Args {
            port: 8080,
            api_url: "http://localhost:5000".to_string(),
            auth_url: "http://localhost:5000".to_string(),
            jwt_secret: Some(SecretString::from("hunter2".to_string())),
            protected_prefixes: vec!["/home".to_string()],
            insecure_cookies: false,
        };
        assert!(!format!("{args:?}").contains("hunter2"));
    }
}
