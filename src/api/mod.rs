//! The backend-for-frontend HTTP surface.
//!
//! Every request first gets an `x-request-id`, then passes the gatekeeper,
//! then has its session resolved once from the `token` cookie before reaching
//! a handler.

pub mod context;
pub mod gatekeeper;
mod handlers;
mod openapi;

pub use context::SessionContext;
pub use gatekeeper::{Decision, Gatekeeper};
pub use handlers::ErrorBody;
pub use openapi::openapi;

use crate::{
    client::{ApiClient, ApiError, AuthEndpoints, AuthService},
    session::{CookiePolicy, TokenStore},
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{get, post},
    Extension, Router,
};
use handlers::{health, pages, password_reset, root, session};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{debug_span, field, info, Span};
use ulid::Ulid;

/// Shared, read-only state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub auth_api: ApiClient,
    pub data_api: ApiClient,
    pub endpoints: AuthEndpoints,
    pub cookies: CookiePolicy,
}

impl AppState {
    /// # Errors
    /// Returns an error if either backend URL is not absolute.
    pub fn new(auth_url: &str, api_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            auth_api: ApiClient::new(auth_url)?,
            data_api: ApiClient::new(api_url)?,
            endpoints: AuthEndpoints::default(),
            cookies: CookiePolicy::default(),
        })
    }

    #[must_use]
    pub fn with_cookies(mut self, cookies: CookiePolicy) -> Self {
        self.cookies = cookies;
        self
    }

    #[must_use]
    pub fn with_endpoints(mut self, endpoints: AuthEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Auth service writing through `store`, usually the request's cookie slot.
    #[must_use]
    pub fn auth_service(&self, store: Arc<dyn TokenStore>) -> AuthService {
        AuthService::new(self.auth_api.clone(), store).with_endpoints(self.endpoints.clone())
    }
}

/// Build the application router with all middleware attached.
pub fn router(state: AppState, gatekeeper: Gatekeeper) -> Router {
    Router::new()
        .route("/", get(root::root))
        .route("/login", get(root::login_page))
        .route("/health", get(health::health).options(health::health))
        .route("/api/session", get(session::current))
        .route("/api/session/login", post(session::login))
        .route("/api/session/register", post(session::register))
        .route("/api/session/logout", post(session::logout))
        .route("/api/auth/send-code", post(password_reset::send_code))
        .route("/api/auth/verify-code", post(password_reset::verify_code))
        .route("/home", get(pages::home))
        .route("/budgets", get(pages::budgets))
        .route("/budgets/:id", get(pages::budget))
        .route("/expenses", get(pages::expenses))
        .route("/expenses/:id", get(pages::expense))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(middleware::from_fn_with_state(
                    Arc::new(gatekeeper),
                    gatekeeper::enforce,
                ))
                .layer(middleware::from_fn(context::resolve))
                .layer(Extension(Arc::new(state))),
        )
}

/// Serve until ctrl-c or SIGTERM.
/// # Errors
/// Returns an error if the server fails to start
pub async fn new(port: u16, state: AppState, gatekeeper: Gatekeeper) -> Result<()> {
    if gatekeeper.verifies_signatures() {
        info!("Gatekeeper verifies token signatures");
    } else {
        info!("No JWT secret configured: gatekeeper only checks cookie presence");
    }

    let app = router(state, gatekeeper);

    let listener = TcpListener::bind(format!("::0:{port}"))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}

// span; headers are left out because they carry the session cookie
fn make_span(request: &Request<Body>) -> Span {
    let path = request.uri().path();
    let method = request.method().as_str();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!(
        "http-request",
        method,
        path,
        request_id,
        authenticated = field::Empty
    )
}
