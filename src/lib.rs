//! # Finboard
//!
//! `finboard` is the backend-for-frontend of a personal-finance dashboard. It
//! fronts an external auth/API backend, owns the browser's session cookie and
//! guards the dashboard pages.
//!
//! ## Session lifecycle
//!
//! 1. **Issue:** the auth backend signs an `HS256` token on login or
//!    registration.
//! 2. **Store:** the token lives in exactly one slot: the server-issued
//!    `HttpOnly` `token` cookie in the browser, a private file for the CLI.
//! 3. **Resolve:** every request derives `Session { user, isAuthenticated }`
//!    from that slot once, without caching it anywhere else.
//! 4. **Gate:** navigations to protected pages are redirected to `/login`
//!    unless the cookie is present and, when a secret is configured, carries a
//!    valid signature that has not expired.
//! 5. **Revoke:** logout clears the slot first and only then tells the backend.
//!
//! Display decisions use the unverified payload ([`token::decode`]); access
//! decisions use [`token::verify_signature`]. The two are never substituted
//! for each other.

pub mod api;
pub mod cli;
pub mod client;
pub mod finance;
mod ids;
pub mod session;
pub mod token;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
