//! Browser session endpoints: the only place the `token` cookie is written.

use super::{error_response, valid_email, ErrorBody};
use crate::{
    api::{context::SessionContext, AppState},
    client::{AuthError, AuthResponse, LoginRequest, RegisterRequest},
    session::{CookieTokenStore, Session},
};
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, instrument, warn};

const UNAUTHORIZED: &str = "Unauthorized";
const REGISTRATION_FAILED: &str = "Registration failed";

#[utoipa::path(
    post,
    path= "/api/session/login",
    request_body = LoginRequest,
    responses (
        (status = 200, description = "Signed in; the token cookie is set", body = AuthResponse),
        (status = 401, description = "Rejected credentials or unreachable auth backend", body = ErrorBody),
    ),
    tag = "session",
)]
#[instrument(skip(state, context, payload))]
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    Extension(context): Extension<SessionContext>,
    payload: Option<Json<LoginRequest>>,
) -> Response {
    let Some(Json(credentials)) = payload else {
        return error_response(StatusCode::UNAUTHORIZED, UNAUTHORIZED);
    };

    let store = Arc::new(CookieTokenStore::new(state.cookies, context.token));
    let auth = state.auth_service(store.clone());

    match auth.login(&credentials, None).await {
        Ok(response) => with_cookie(&store, Json(response).into_response()),
        Err(err) => auth_error_response(err, StatusCode::UNAUTHORIZED, UNAUTHORIZED),
    }
}

#[utoipa::path(
    post,
    path= "/api/session/register",
    request_body = RegisterRequest,
    responses (
        (status = 200, description = "Account created; the token cookie is set", body = AuthResponse),
        (status = 400, description = "Missing or malformed payload", body = ErrorBody),
        (status = 502, description = "Auth backend unreachable", body = ErrorBody),
    ),
    tag = "session",
)]
#[instrument(skip(state, context, payload))]
pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    Extension(context): Extension<SessionContext>,
    payload: Option<Json<RegisterRequest>>,
) -> Response {
    let Some(Json(user_data)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Missing payload");
    };

    if !valid_email(&user_data.email) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid email");
    }

    let store = Arc::new(CookieTokenStore::new(state.cookies, context.token));
    let auth = state.auth_service(store.clone());

    match auth.register(&user_data, None).await {
        Ok(response) => with_cookie(&store, Json(response).into_response()),
        Err(err) => auth_error_response(err, StatusCode::BAD_GATEWAY, REGISTRATION_FAILED),
    }
}

#[utoipa::path(
    post,
    path= "/api/session/logout",
    responses (
        (status = 200, description = "Cookie cleared; backend notified best-effort"),
    ),
    tag = "session",
)]
#[instrument(skip(state, context))]
pub async fn logout(
    Extension(state): Extension<Arc<AppState>>,
    Extension(context): Extension<SessionContext>,
) -> Response {
    let store = Arc::new(CookieTokenStore::new(state.cookies, context.token));
    let auth = state.auth_service(store.clone());

    if let Err(err) = auth.logout(None).await {
        error!("Failed to clear session cookie: {err}");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Logout failed");
    }

    with_cookie(&store, Json(json!({ "ok": true })).into_response())
}

#[utoipa::path(
    get,
    path= "/api/session",
    responses (
        (status = 200, description = "Session derived from the token cookie", body = Session),
    ),
    tag = "session",
)]
pub async fn current(Extension(context): Extension<SessionContext>) -> Json<Session> {
    Json(context.session)
}

fn with_cookie(store: &CookieTokenStore, mut response: Response) -> Response {
    if let Some(cookie) = store.take_set_cookie() {
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    response
}

fn auth_error_response(err: AuthError, unreachable: StatusCode, fallback: &str) -> Response {
    match err {
        AuthError::Authentication { status, message } => error_response(
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            message,
        ),
        AuthError::Network(source) => {
            warn!("Auth backend unreachable: {source}");
            error_response(unreachable, fallback)
        }
        AuthError::Aborted => error_response(unreachable, fallback),
        AuthError::Decode(message) => {
            warn!("Unexpected auth backend response: {message}");
            error_response(unreachable, fallback)
        }
        AuthError::Store(err) => {
            error!("Failed to set session cookie: {err}");
            error_response(StatusCode::BAD_GATEWAY, fallback)
        }
    }
}
