//! Session storage and derivation.
//!
//! The token is the single source of truth. A [`Session`] is recomputed from
//! whatever the active [`TokenStore`] holds; nothing else caches "who is
//! signed in".

pub mod cookie;
mod resolver;
mod store;

pub use cookie::{extract_token, CookiePolicy, DEFAULT_MAX_AGE_SECONDS, TOKEN_COOKIE_NAME};
pub use resolver::{current_user, is_authenticated, Session};
pub use store::{CookieTokenStore, FileTokenStore, MemoryTokenStore, StoreError, TokenStore};
