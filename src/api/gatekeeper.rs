//! Navigation guard for the protected pages.
//!
//! The decision is a pure function of the path, the `token` cookie, the
//! verification secret and the clock. It never fails: anything unexpected
//! about the token sends the browser to the login page.

use crate::{session::extract_token, token};
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::debug;

pub const LOGIN_PATH: &str = "/login";
pub const DEFAULT_PROTECTED_PREFIXES: [&str; 3] = ["/home", "/budgets", "/expenses"];
const EXCLUDED_PREFIXES: [&str; 4] = ["/api", "/static", "/assets", "/favicon.ico"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect,
}

#[derive(Debug, Clone)]
pub struct Gatekeeper {
    protected: Vec<String>,
    excluded: Vec<String>,
    login_path: String,
    secret: Option<SecretString>,
}

impl Default for Gatekeeper {
    fn default() -> Self {
        Self::new(DEFAULT_PROTECTED_PREFIXES.iter().map(ToString::to_string))
    }
}

impl Gatekeeper {
    /// Guard the given prefixes. Blank entries are ignored and a trailing `/`
    /// is dropped, so `"/budgets/"` and `"/budgets"` are the same prefix.
    pub fn new<I, S>(protected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            protected: normalize_prefixes(protected),
            excluded: normalize_prefixes(EXCLUDED_PREFIXES),
            login_path: LOGIN_PATH.to_string(),
            secret: None,
        }
    }

    /// Require a valid signature, not just a present cookie.
    #[must_use]
    pub fn with_secret(mut self, secret: Option<SecretString>) -> Self {
        self.secret = secret;
        self
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn verifies_signatures(&self) -> bool {
        self.secret.is_some()
    }

    #[must_use]
    pub fn is_protected(&self, path: &str) -> bool {
        if path == self.login_path || matches_any(&self.excluded, path) {
            return false;
        }
        matches_any(&self.protected, path)
    }

    #[must_use]
    pub fn decide_at(&self, path: &str, token: Option<&str>, now: i64) -> Decision {
        if !self.is_protected(path) {
            return Decision::Allow;
        }

        let Some(token) = token.filter(|token| !token.is_empty()) else {
            debug!("No session cookie for {path}");
            return Decision::Redirect;
        };

        // without a secret only the cookie's presence is checked
        let Some(secret) = &self.secret else {
            return Decision::Allow;
        };

        match token::verify_signature_at(token, secret.expose_secret().as_bytes(), now) {
            Ok(_) => Decision::Allow,
            Err(err) => {
                debug!("Rejected session cookie for {path}: {err}");
                Decision::Redirect
            }
        }
    }

    #[must_use]
    pub fn decide(&self, path: &str, token: Option<&str>) -> Decision {
        self.decide_at(path, token, token::now_unix())
    }
}

/// Middleware: redirect unauthenticated navigations to the login page.
pub async fn enforce(
    State(gatekeeper): State<Arc<Gatekeeper>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();
    let token = extract_token(request.headers());
    match gatekeeper.decide(path, token.as_deref()) {
        Decision::Allow => next.run(request).await,
        Decision::Redirect => Redirect::temporary(gatekeeper.login_path()).into_response(),
    }
}

fn normalize_prefixes<I, S>(prefixes: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    prefixes
        .into_iter()
        .map(|prefix| prefix.as_ref().trim().trim_end_matches('/').to_string())
        .filter(|prefix| !prefix.is_empty())
        .map(|prefix| {
            if prefix.starts_with('/') {
                prefix
            } else {
                format!("/{prefix}")
            }
        })
        .collect()
}

fn matches_any(prefixes: &[String], path: &str) -> bool {
    prefixes.iter().any(|prefix| under_prefix(prefix, path))
}

// "/budgets" covers "/budgets" and "/budgets/3" but not "/budgetsx"
fn under_prefix(prefix: &str, path: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{issue, Claims};
    use serde_json::{Map, Number};

    const SECRET: &str = "gate-secret";
    const NOW: i64 = 1_700_000_000;

    fn token_with(secret: &str, exp: Option<i64>) -> String {
        let claims = Claims {
            sub: "1".to_string(),
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            iat: Some(Number::from(NOW - 60)),
            exp: exp.map(Number::from),
            extra: Map::new(),
        };
        issue(&claims, secret.as_bytes()).unwrap_or_default()
    }

    fn strict() -> Gatekeeper {
        Gatekeeper::default().with_secret(Some(SecretString::from(SECRET.to_string())))
    }

    #[test]
    fn public_paths_are_allowed() {
        let gate = strict();
        for path in ["/", "/login", "/create-account", "/forgot-password", "/homework"] {
            assert_eq!(gate.decide_at(path, None, NOW), Decision::Allow, "{path}");
        }
    }

    #[test]
    fn excluded_prefixes_are_never_guarded() {
        let gate = Gatekeeper::new(["/api", "/static", "/assets", "/favicon.ico", "/login"]);
        for path in ["/api/session", "/static/app.js", "/assets/logo.svg", "/favicon.ico"] {
            assert_eq!(gate.decide_at(path, None, NOW), Decision::Allow, "{path}");
        }
        assert_eq!(gate.decide_at("/login", None, NOW), Decision::Allow);
    }

    #[test]
    fn missing_cookie_redirects() {
        let gate = Gatekeeper::default();
        for path in ["/home", "/budgets", "/budgets/3", "/expenses/edit/9"] {
            assert_eq!(gate.decide_at(path, None, NOW), Decision::Redirect, "{path}");
        }
        assert_eq!(gate.decide_at("/home", Some(""), NOW), Decision::Redirect);
    }

    #[test]
    fn presence_only_mode_accepts_any_cookie() {
        let gate = Gatekeeper::default();
        assert!(!gate.verifies_signatures());
        assert_eq!(
            gate.decide_at("/home", Some("anything"), NOW),
            Decision::Allow
        );
    }

    #[test]
    fn valid_signature_is_allowed() {
        let token = token_with(SECRET, Some(NOW + 3600));
        assert_eq!(
            strict().decide_at("/home", Some(&token), NOW),
            Decision::Allow
        );
    }

    #[test]
    fn forged_token_redirects() {
        let forged = token_with("attacker-secret", Some(NOW + 3600));
        assert_eq!(
            strict().decide_at("/home", Some(&forged), NOW),
            Decision::Redirect
        );
        assert_eq!(
            strict().decide_at("/budgets", Some("not.a.token"), NOW),
            Decision::Redirect
        );
    }

    #[test]
    fn expired_token_redirects() {
        let token = token_with(SECRET, Some(NOW));
        assert_eq!(
            strict().decide_at("/expenses", Some(&token), NOW),
            Decision::Redirect
        );
        assert_eq!(
            strict().decide_at("/expenses", Some(&token), NOW - 1),
            Decision::Allow
        );
    }

    #[test]
    fn prefixes_are_normalized() {
        let gate = Gatekeeper::new(["reports/", " ", "/home"]);
        assert!(gate.is_protected("/reports"));
        assert!(gate.is_protected("/reports/2024"));
        assert!(gate.is_protected("/home"));
        assert!(!gate.is_protected("/reportsx"));
    }
}
