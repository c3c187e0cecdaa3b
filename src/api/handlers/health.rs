//! Liveness plus what this instance fronts. Never contacts a backend.

use crate::{api::AppState, GIT_COMMIT_HASH};
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    /// Base URL of the auth backend login/register/logout are relayed to.
    auth_backend: String,
    /// Base URL of the budget/expense backend.
    api_backend: String,
    /// Whether the `token` cookie carries the `Secure` attribute.
    secure_cookies: bool,
}

impl Health {
    fn of(state: &AppState) -> Self {
        Self {
            commit: GIT_COMMIT_HASH.to_string(),
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            auth_backend: state.auth_api.base_url().to_string(),
            api_backend: state.data_api.base_url().to_string(),
            secure_cookies: state.cookies.secure(),
        }
    }

    /// `name:version:short-commit`, the short commit empty outside git builds.
    fn x_app(&self) -> Option<HeaderValue> {
        let short = self.commit.get(..7).filter(|_| self.commit.len() > 7);
        let value = format!("{}:{}:{}", self.name, self.version, short.unwrap_or_default());
        HeaderValue::from_str(&value)
            .map_err(|err| debug!("Failed to build X-App header: {err}"))
            .ok()
    }
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "Build info and the backends this instance fronts", body = Health)
    ),
    tag = "health",
)]
/// `GET` answers with [`Health`]; `OPTIONS` only carries the `X-App` header.
pub async fn health(method: Method, Extension(state): Extension<Arc<AppState>>) -> Response {
    let health = Health::of(&state);

    let mut response = if method == Method::GET {
        Json(&health).into_response()
    } else {
        Body::empty().into_response()
    };
    *response.status_mut() = StatusCode::OK;

    if let Some(x_app) = health.x_app() {
        response.headers_mut().insert("X-App", x_app);
    }
    response
}
