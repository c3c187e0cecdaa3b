use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use utoipa::ToSchema;

/// Decoded token payload.
///
/// `sub`, `username` and `email` are required. `iat`/`exp` are optional
/// NumericDates and may be fractional; any other JSON type fails decoding. A
/// token without `exp` never passes the display-tier validity check.
/// Unknown keys are kept in `extra` so re-encoding preserves them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(deserialize_with = "crate::ids::string_or_number")]
    pub sub: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Project the identity fields into a [`User`].
    #[must_use]
    pub fn user(&self) -> User {
        User {
            id: self.sub.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }

    /// `true` when `exp` is present and strictly after `now`.
    #[must_use]
    pub fn is_live_at(&self, now: i64) -> bool {
        self.exp.as_ref().is_some_and(|exp| is_after(exp, now))
    }

    /// `true` when `exp` is present and not after `now`. A missing `exp`
    /// never expires.
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp.as_ref().is_some_and(|exp| !is_after(exp, now))
    }
}

#[allow(clippy::cast_precision_loss)]
fn is_after(date: &Number, now: i64) -> bool {
    match date.as_i64() {
        Some(seconds) => seconds > now,
        None => date.as_f64().is_some_and(|seconds| seconds > now as f64),
    }
}

/// Identity carried by a token, as shown to the UI.
#[derive(ToSchema, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "crate::ids::string_or_number")]
    pub id: String,
    pub username: String,
    pub email: String,
}
