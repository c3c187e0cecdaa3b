use crate::session::{extract_token, Session};
use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::Span;

/// Per-request view of the session cookie, resolved once before any handler
/// runs and passed along as a request extension.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub token: Option<String>,
    pub session: Session,
}

impl SessionContext {
    #[must_use]
    pub fn from_token(token: Option<String>) -> Self {
        let session = Session::from_token(token.as_deref());
        Self { token, session }
    }
}

pub async fn resolve(mut request: Request<Body>, next: Next) -> Response {
    let context = SessionContext::from_token(extract_token(request.headers()));
    Span::current().record("authenticated", context.session.is_authenticated);
    request.extensions_mut().insert(context);
    next.run(request).await
}
