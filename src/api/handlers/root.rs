use crate::{api::context::SessionContext, api::gatekeeper::LOGIN_PATH};
use axum::{
    extract::Extension,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Where the landing page should send the browser next.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Landing {
    pub name: String,
    pub next: String,
}

#[utoipa::path(
    get,
    path= "/",
    responses (
        (status = 200, description = "Landing hint: dashboard when signed in, login otherwise", body = Landing)
    ),
    tag = "pages",
)]
pub async fn root(Extension(context): Extension<SessionContext>) -> impl IntoResponse {
    let next = if context.session.is_authenticated {
        "/home"
    } else {
        LOGIN_PATH
    };
    Json(Landing {
        name: env!("CARGO_PKG_NAME").to_string(),
        next: next.to_string(),
    })
}

#[utoipa::path(
    get,
    path= "/login",
    responses (
        (status = 200, description = "Public login page")
    ),
    tag = "pages",
)]
pub async fn login_page() -> impl IntoResponse {
    Json(serde_json::json!({ "page": "login" }))
}
