use crate::cli::actions::{
    server,
    session::{ClientArgs, LoginArgs, RegisterArgs},
    Action,
};
use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;
use std::path::PathBuf;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some(("server", sub_m)) => Ok(Action::Server(server_args(sub_m)?)),
        Some(("login", sub_m)) => Ok(Action::Login(LoginArgs {
            client: client_args(sub_m)?,
            username: required(sub_m, "username")?,
            password: SecretString::from(required(sub_m, "password")?),
        })),
        Some(("register", sub_m)) => Ok(Action::Register(RegisterArgs {
            client: client_args(sub_m)?,
            username: required(sub_m, "username")?,
            email: required(sub_m, "email")?,
            password: SecretString::from(required(sub_m, "password")?),
        })),
        Some(("logout", sub_m)) => Ok(Action::Logout(client_args(sub_m)?)),
        Some(("whoami", sub_m)) => Ok(Action::Whoami(client_args(sub_m)?)),
        Some((other, _)) => bail!("unknown subcommand: {other}"),
        None => bail!("missing subcommand"),
    }
}

fn required(matches: &ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing required argument: --{name}"))
}

fn server_args(matches: &ArgMatches) -> Result<server::Args> {
    let protected_prefixes: Vec<String> = matches
        .get_many::<String>("protected-prefixes")
        .map(|values| {
            values
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if protected_prefixes.is_empty() {
        bail!("--protected-prefixes must name at least one path");
    }

    Ok(server::Args {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        api_url: required(matches, "api-url")?,
        auth_url: required(matches, "auth-url")?,
        jwt_secret: matches
            .get_one::<String>("jwt-secret")
            .filter(|secret| !secret.is_empty())
            .map(|secret| SecretString::from(secret.clone())),
        protected_prefixes,
        insecure_cookies: matches.get_flag("insecure-cookies"),
    })
}

fn client_args(matches: &ArgMatches) -> Result<ClientArgs> {
    Ok(ClientArgs {
        auth_url: required(matches, "auth-url")?,
        token_file: matches.get_one::<PathBuf>("token-file").cloned(),
    })
}
