use crate::cli::{
    actions::{server, session, Action},
    telemetry,
};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    let result = match action {
        Action::Server(args) => server::execute(args).await,
        Action::Login(args) => session::login(args).await,
        Action::Register(args) => session::register(args).await,
        Action::Logout(args) => session::logout(args).await,
        Action::Whoami(args) => session::whoami(&args),
    };

    telemetry::shutdown_tracer();

    result
}
