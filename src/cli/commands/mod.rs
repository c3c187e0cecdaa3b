pub mod logging;
pub mod server;
pub mod session;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    ColorChoice, Command,
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("finboard")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(server::command())
        .subcommand(session::login())
        .subcommand(session::register())
        .subcommand(session::logout())
        .subcommand(session::whoami());

    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "finboard");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some(env!("CARGO_PKG_DESCRIPTION").to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_server_defaults() {
        temp_env::with_vars(
            [
                ("FINBOARD_PORT", None::<&str>),
                ("FINBOARD_API_URL", None),
                ("FINBOARD_AUTH_URL", None),
                ("FINBOARD_JWT_SECRET", None),
                ("FINBOARD_PROTECTED_PREFIXES", None),
                ("FINBOARD_INSECURE_COOKIES", None),
            ],
            || {
                let matches = new().get_matches_from(vec!["finboard", "server"]);
                let server = matches.subcommand_matches("server");
                assert!(server.is_some());
                let Some(server) = server else { return };

                assert_eq!(server.get_one::<u16>("port").copied(), Some(8080));
                assert_eq!(
                    server.get_one::<String>("api-url").cloned(),
                    Some("http://localhost:5000".to_string())
                );
                assert_eq!(server.get_one::<String>("jwt-secret"), None);
                assert_eq!(
                    server
                        .get_many::<String>("protected-prefixes")
                        .map(|values| values.cloned().collect::<Vec<_>>()),
                    Some(vec![
                        "/home".to_string(),
                        "/budgets".to_string(),
                        "/expenses".to_string()
                    ])
                );
                assert!(!server.get_flag("insecure-cookies"));
            },
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("FINBOARD_PORT", Some("443")),
                ("FINBOARD_API_URL", Some("https://api.finboard.dev")),
                ("FINBOARD_AUTH_URL", Some("https://auth.finboard.dev")),
                ("FINBOARD_JWT_SECRET", Some("s3cret")),
                ("FINBOARD_PROTECTED_PREFIXES", Some("/home,/reports")),
                ("FINBOARD_INSECURE_COOKIES", Some("true")),
                ("FINBOARD_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["finboard", "server"]);
                assert_eq!(matches.get_one::<u8>("verbosity").copied(), Some(2));
                let Some(server) = matches.subcommand_matches("server") else {
                    panic!("server subcommand not matched");
                };
                assert_eq!(server.get_one::<u16>("port").copied(), Some(443));
                assert_eq!(
                    server.get_one::<String>("auth-url").cloned(),
                    Some("https://auth.finboard.dev".to_string())
                );
                assert_eq!(
                    server.get_one::<String>("jwt-secret").cloned(),
                    Some("s3cret".to_string())
                );
                assert_eq!(
                    server
                        .get_many::<String>("protected-prefixes")
                        .map(|values| values.cloned().collect::<Vec<_>>()),
                    Some(vec!["/home".to_string(), "/reports".to_string()])
                );
                assert!(server.get_flag("insecure-cookies"));
            },
        );
    }

    #[test]
    fn test_login_args() {
        temp_env::with_vars(
            [
                ("FINBOARD_PASSWORD", Some("pw")),
                ("FINBOARD_TOKEN_FILE", None::<&str>),
            ],
            || {
                let matches = new().get_matches_from(vec![
                    "finboard",
                    "login",
                    "--username",
                    "ana",
                    "--token-file",
                    "/tmp/finboard-token",
                ]);
                let Some(login) = matches.subcommand_matches("login") else {
                    panic!("login subcommand not matched");
                };
                assert_eq!(
                    login.get_one::<String>("username").cloned(),
                    Some("ana".to_string())
                );
                assert_eq!(
                    login.get_one::<String>("password").cloned(),
                    Some("pw".to_string())
                );
                assert_eq!(
                    login.get_one::<PathBuf>("token-file").cloned(),
                    Some(PathBuf::from("/tmp/finboard-token"))
                );
            },
        );
    }

    #[test]
    fn test_register_requires_email() {
        temp_env::with_vars(
            [
                ("FINBOARD_EMAIL", None::<&str>),
                ("FINBOARD_PASSWORD", Some("pw")),
            ],
            || {
                let result =
                    new().try_get_matches_from(vec!["finboard", "register", "-u", "ana"]);
                assert_eq!(
                    result.map_err(|e| e.kind()).err(),
                    Some(clap::error::ErrorKind::MissingRequiredArgument)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("FINBOARD_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["finboard", "whoami"]);
                assert_eq!(
                    matches.get_one::<u8>("verbosity").copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("FINBOARD_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["finboard".to_string(), "whoami".to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    let v = format!("-{}", "v".repeat(index));
                    args.push(v);
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>("verbosity").copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }
}
