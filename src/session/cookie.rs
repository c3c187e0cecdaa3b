//! The `token` cookie: one server-issued policy for setting, clearing and
//! reading it.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};

pub const TOKEN_COOKIE_NAME: &str = "token";

/// Seven days, matching the backend's token lifetime.
pub const DEFAULT_MAX_AGE_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Attributes applied to every `token` cookie this service emits.
///
/// Cookies are always `HttpOnly; SameSite=Lax; Path=/`. `Secure` is on unless
/// explicitly disabled for plain-HTTP local development.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CookiePolicy {
    secure: bool,
    max_age_seconds: i64,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            secure: true,
            max_age_seconds: DEFAULT_MAX_AGE_SECONDS,
        }
    }
}

impl CookiePolicy {
    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn with_max_age_seconds(mut self, seconds: i64) -> Self {
        self.max_age_seconds = seconds;
        self
    }

    #[must_use]
    pub fn secure(&self) -> bool {
        self.secure
    }

    #[must_use]
    pub fn max_age_seconds(&self) -> i64 {
        self.max_age_seconds
    }

    /// Build the `Set-Cookie` value that stores `token`.
    ///
    /// # Errors
    /// Fails if the token contains bytes that are not valid in a header.
    pub fn session_cookie(&self, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
        self.render(token, self.max_age_seconds)
    }

    /// Build the `Set-Cookie` value that expires the cookie immediately.
    ///
    /// # Errors
    /// Never fails in practice; the value is static apart from attributes.
    pub fn clear_cookie(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age: i64) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!(
            "{TOKEN_COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}

/// Pull the first non-empty `token` cookie out of request headers.
#[must_use]
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            let val = val.trim();
            (key.trim() == TOKEN_COOKIE_NAME && !val.is_empty()).then(|| val.to_string())
        })
}
