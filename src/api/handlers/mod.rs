//! Route handlers and the error body they share.

pub mod health;
pub mod pages;
pub mod password_reset;
pub mod root;
pub mod session;

use crate::client::ApiError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub message: String,
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            message: message.into(),
        }),
    )
        .into_response()
}

/// Backend statuses pass through; anything that never reached the backend
/// becomes a 502.
pub(crate) fn api_error_response(err: &ApiError) -> Response {
    match err {
        ApiError::Http {
            status, message, ..
        } => error_response(
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
            message.clone(),
        ),
        ApiError::InvalidId => error_response(StatusCode::NOT_FOUND, "Not found"),
        other => {
            warn!("Data backend call failed: {other}");
            error_response(StatusCode::BAD_GATEWAY, other.to_string())
        }
    }
}

/// Lightweight email sanity check applied before forwarding a registration.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}
