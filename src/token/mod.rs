//! Compact `HS256` session tokens.
//!
//! Two trust tiers live here and must not be mixed:
//!
//! - [`decode`] / [`is_valid`] read the payload without the key. They are only
//!   fit for deciding what to *show* (user name, "signed in" badges).
//! - [`verify_signature`] recomputes the MAC with the shared secret and is what
//!   the route gatekeeper relies on.
//!
//! The verifier is intentionally narrow: one algorithm, no issuer or audience
//! checks. The backend that signs tokens and this service share one secret.

mod claims;
mod codec;

pub use claims::{Claims, User};
pub use codec::{
    decode, is_valid, is_valid_at, issue, now_unix, verify_signature, verify_signature_at,
    DecodeError, TokenError, ALGORITHM,
};
