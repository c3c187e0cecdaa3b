use super::claims::Claims;
use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// The only signing algorithm accepted by [`verify_signature`].
pub const ALGORITHM: &str = "HS256";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

impl Header {
    fn hs256() -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        }
    }
}

/// Structural problems found while reading a token without its key.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("token must have exactly three non-empty segments")]
    Segments,
    #[error("invalid base64url encoding in {0} segment")]
    Base64(&'static str),
    #[error("invalid json in {0} segment")]
    Json(&'static str),
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlg(String),
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("invalid signing key")]
    Key,
    #[error("failed to encode token: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Current time in seconds since the epoch.
#[must_use]
pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX)
        })
}

struct Segments<'a> {
    header: &'a str,
    payload: &'a str,
    signature: &'a str,
}

impl<'a> Segments<'a> {
    fn split(token: &'a str) -> Result<Self, DecodeError> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(DecodeError::Segments);
        };
        if header.is_empty() || payload.is_empty() || signature.is_empty() {
            return Err(DecodeError::Segments);
        }
        Ok(Self {
            header,
            payload,
            signature,
        })
    }

    fn signing_input(&self) -> String {
        format!("{}.{}", self.header, self.payload)
    }
}

fn b64d_json<T: for<'de> Deserialize<'de>>(
    segment: &str,
    name: &'static str,
) -> Result<T, DecodeError> {
    let bytes = Base64UrlUnpadded::decode_vec(segment).map_err(|_| DecodeError::Base64(name))?;
    serde_json::from_slice(&bytes).map_err(|_| DecodeError::Json(name))
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn mac_for(secret: &[u8], signing_input: &str) -> Result<HmacSha256, TokenError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| TokenError::Key)?;
    mac.update(signing_input.as_bytes());
    Ok(mac)
}

/// Read the claims of a token without checking its signature.
///
/// Display tier only: anything that grants access must go through
/// [`verify_signature`].
///
/// # Errors
/// Returns [`DecodeError`] when the token is not three base64url JSON segments.
pub fn decode(token: &str) -> Result<Claims, DecodeError> {
    let segments = Segments::split(token)?;
    let _header: Header = b64d_json(segments.header, "header")?;
    b64d_json(segments.payload, "payload")
}

/// Display-tier validity: decodes and requires `exp > now`.
#[must_use]
pub fn is_valid_at(token: &str, now: i64) -> bool {
    decode(token).is_ok_and(|claims| claims.is_live_at(now))
}

#[must_use]
pub fn is_valid(token: &str) -> bool {
    is_valid_at(token, now_unix())
}

/// Gate-tier check: `HS256` only, MAC over `header.payload`, and `exp` (when
/// present) strictly after `now`. No issuer or audience checks.
///
/// # Errors
/// Returns the first failed check as a [`TokenError`].
pub fn verify_signature_at(token: &str, secret: &[u8], now: i64) -> Result<Claims, TokenError> {
    let segments = Segments::split(token)?;

    let header: Header = b64d_json(segments.header, "header")?;
    if header.alg != ALGORITHM {
        return Err(TokenError::UnsupportedAlg(header.alg));
    }

    let signature = Base64UrlUnpadded::decode_vec(segments.signature)
        .map_err(|_| TokenError::InvalidSignature)?;
    // Non-canonical encodings of the right MAC are still a different segment.
    if Base64UrlUnpadded::encode_string(&signature) != segments.signature {
        return Err(TokenError::InvalidSignature);
    }
    mac_for(secret, &segments.signing_input())?
        .verify_slice(&signature)
        .map_err(|_| TokenError::InvalidSignature)?;

    let claims: Claims = b64d_json(segments.payload, "payload")?;
    if claims.is_expired_at(now) {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

/// [`verify_signature_at`] against the current clock.
///
/// # Errors
/// See [`verify_signature_at`].
pub fn verify_signature(token: &str, secret: &[u8]) -> Result<Claims, TokenError> {
    verify_signature_at(token, secret, now_unix())
}

/// Sign claims as an `HS256` token.
///
/// # Errors
/// Returns an error if the claims cannot be serialized.
pub fn issue(claims: &Claims, secret: &[u8]) -> Result<String, TokenError> {
    let header_b64 = b64e_json(&Header::hs256())?;
    let claims_b64 = b64e_json(claims)?;
    let signing_input = format!("{header_b64}.{claims_b64}");
    let tag = mac_for(secret, &signing_input)?.finalize().into_bytes();
    let signature_b64 = Base64UrlUnpadded::encode_string(&tag);

    Ok(format!("{signing_input}.{signature_b64}"))
}
