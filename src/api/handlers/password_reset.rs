//! Forgot-password code exchange, relayed to the auth backend unchanged.

use super::{error_response, ErrorBody};
use crate::{api::AppState, client::AuthService, session::MemoryTokenStore};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{instrument, warn};
use utoipa::ToSchema;

/// Documented shape of the relayed body. Extra keys are forwarded untouched.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetCode {
    pub email: String,
    /// Only sent when verifying.
    pub code: Option<String>,
}

#[utoipa::path(
    post,
    path= "/api/auth/send-code",
    request_body = ResetCode,
    responses (
        (status = 200, description = "Backend answer, status and body passed through"),
        (status = 500, description = "Auth backend unreachable", body = ErrorBody),
    ),
    tag = "password-reset",
)]
#[instrument(skip(state, payload))]
pub async fn send_code(
    Extension(state): Extension<Arc<AppState>>,
    payload: Option<Json<Value>>,
) -> Response {
    let body = payload.map_or(Value::Null, |Json(body)| body);
    let auth = stateless(&state);
    relay(auth.send_code(&body, None).await, "Failed to send code")
}

#[utoipa::path(
    post,
    path= "/api/auth/verify-code",
    request_body = ResetCode,
    responses (
        (status = 200, description = "Backend answer, status and body passed through"),
        (status = 500, description = "Auth backend unreachable", body = ErrorBody),
    ),
    tag = "password-reset",
)]
#[instrument(skip(state, payload))]
pub async fn verify_code(
    Extension(state): Extension<Arc<AppState>>,
    payload: Option<Json<Value>>,
) -> Response {
    let body = payload.map_or(Value::Null, |Json(body)| body);
    let auth = stateless(&state);
    relay(auth.verify_code(&body, None).await, "Failed to verify code")
}

// the reset flow never touches the session cookie
fn stateless(state: &AppState) -> AuthService {
    state.auth_service(Arc::new(MemoryTokenStore::new()))
}

fn relay<E: std::fmt::Display>(
    result: Result<(StatusCode, Value), E>,
    failure: &str,
) -> Response {
    match result {
        Ok((status, body)) => (status, Json(body)).into_response(),
        Err(err) => {
            warn!("{failure}: {err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, failure)
        }
    }
}
