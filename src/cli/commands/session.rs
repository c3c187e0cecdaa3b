use super::server::DEFAULT_BACKEND_URL;
use clap::{Arg, Command};

fn with_client_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("auth-url")
                .long("auth-url")
                .help("Base URL of the authentication backend")
                .default_value(DEFAULT_BACKEND_URL)
                .env("FINBOARD_AUTH_URL"),
        )
        .arg(
            Arg::new("token-file")
                .long("token-file")
                .help("Where the session token is kept (default: <config dir>/finboard/token)")
                .env("FINBOARD_TOKEN_FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
}

fn username() -> Arg {
    Arg::new("username")
        .short('u')
        .long("username")
        .help("Account username")
        .env("FINBOARD_USERNAME")
        .required(true)
}

fn password() -> Arg {
    Arg::new("password")
        .long("password")
        .help("Account password")
        .env("FINBOARD_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

#[must_use]
pub fn login() -> Command {
    with_client_args(
        Command::new("login")
            .about("Sign in and keep the session token")
            .arg(username())
            .arg(password()),
    )
}

#[must_use]
pub fn register() -> Command {
    with_client_args(
        Command::new("register")
            .about("Create an account and keep the session token")
            .arg(username())
            .arg(
                Arg::new("email")
                    .short('e')
                    .long("email")
                    .help("Account email")
                    .env("FINBOARD_EMAIL")
                    .required(true),
            )
            .arg(password()),
    )
}

#[must_use]
pub fn logout() -> Command {
    with_client_args(Command::new("logout").about("Forget the session token"))
}

#[must_use]
pub fn whoami() -> Command {
    with_client_args(Command::new("whoami").about("Show the signed-in user, if any"))
}
