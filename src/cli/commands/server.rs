use clap::{Arg, ArgAction, Command};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
const DEFAULT_PROTECTED_PREFIXES: &str = "/home,/budgets,/expenses";

#[must_use]
pub fn command() -> Command {
    Command::new("server")
        .about("Serve the session API and the protected dashboard pages")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("FINBOARD_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .help("Base URL of the budget/expense API backend")
                .default_value(DEFAULT_BACKEND_URL)
                .env("FINBOARD_API_URL"),
        )
        .arg(
            Arg::new("auth-url")
                .long("auth-url")
                .help("Base URL of the authentication backend")
                .default_value(DEFAULT_BACKEND_URL)
                .env("FINBOARD_AUTH_URL"),
        )
        .arg(
            Arg::new("jwt-secret")
                .long("jwt-secret")
                .help("Shared HS256 secret; without it the gatekeeper only checks that the cookie exists")
                .env("FINBOARD_JWT_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new("protected-prefixes")
                .long("protected-prefixes")
                .help("Comma separated path prefixes that require a session")
                .env("FINBOARD_PROTECTED_PREFIXES")
                .value_delimiter(',')
                .default_value(DEFAULT_PROTECTED_PREFIXES),
        )
        .arg(
            Arg::new("insecure-cookies")
                .long("insecure-cookies")
                .help("Drop the Secure cookie attribute (plain-HTTP local development only)")
                .env("FINBOARD_INSECURE_COOKIES")
                .action(ArgAction::SetTrue),
        )
}
