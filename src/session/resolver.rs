use super::store::TokenStore;
use crate::token::{self, User};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Who is signed in, derived from the token and never stored on its own.
#[derive(ToSchema, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: Option<User>,
    pub is_authenticated: bool,
}

impl Session {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Display-tier view of `token` at `now`: the signature is not checked.
    #[must_use]
    pub fn from_token_at(token: Option<&str>, now: i64) -> Self {
        let user = token
            .and_then(|token| token::decode(token).ok())
            .filter(|claims| claims.is_live_at(now))
            .map(|claims| claims.user());
        Self {
            is_authenticated: user.is_some(),
            user,
        }
    }

    #[must_use]
    pub fn from_token(token: Option<&str>) -> Self {
        Self::from_token_at(token, token::now_unix())
    }

    /// Read the store once and derive the session from that read.
    #[must_use]
    pub fn resolve(store: &dyn TokenStore) -> Self {
        Self::from_token(store.load().as_deref())
    }
}

/// The signed-in user, or `None` when the slot is empty or the token expired.
#[must_use]
pub fn current_user(store: &dyn TokenStore) -> Option<User> {
    let token = store.load()?;
    if !token::is_valid(&token) {
        return None;
    }
    token::decode(&token).ok().map(|claims| claims.user())
}

#[must_use]
pub fn is_authenticated(store: &dyn TokenStore) -> bool {
    store.load().is_some_and(|token| token::is_valid(&token))
}
