//! Durable slots for the current session token.
//!
//! Every slot holds at most one token. `load` never fails: an unavailable or
//! unreadable slot reads as "no token".

use super::cookie::CookiePolicy;
use axum::http::{header::InvalidHeaderValue, HeaderValue};
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write token slot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("token is not a valid cookie value")]
    Cookie(#[from] InvalidHeaderValue),
    #[error("token slot lock poisoned")]
    Poisoned,
}

pub trait TokenStore: Send + Sync {
    /// Replace the slot contents with `token`.
    ///
    /// # Errors
    /// Returns an error if the slot cannot be written.
    fn save(&self, token: &str) -> Result<(), StoreError>;

    fn load(&self) -> Option<String>;

    /// Empty the slot. Clearing an empty slot is not an error.
    ///
    /// # Errors
    /// Returns an error if the slot exists but cannot be removed.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Process-local slot, used when no durable storage is available and in tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, token: &str) -> Result<(), StoreError> {
        let mut slot = self.slot.lock().map_err(|_| StoreError::Poisoned)?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn load(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut slot = self.slot.lock().map_err(|_| StoreError::Poisoned)?;
        *slot = None;
        Ok(())
    }
}

/// Token kept in a single file, owner read/write only.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/finboard/token`, if the platform has a config dir.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(env!("CARGO_PKG_NAME")).join("token"))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, token: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        write_private(&self.path, token).map_err(|err| self.io_error(err))
    }

    fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(err) => {
                debug!("No token in {}: {err}", self.path.display());
                None
            }
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        }
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &str) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten pre-existing files too.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &str) -> io::Result<()> {
    fs::write(path, contents)
}

#[derive(Debug, Default)]
struct CookieSlot {
    current: Option<String>,
    set_cookie: Option<HeaderValue>,
}

/// Per-request slot backed by the `token` cookie.
///
/// Reads come from the request's cookie; writes are recorded as a pending
/// `Set-Cookie` header that the handler attaches to its response. A `load`
/// after `save` in the same request sees the new token.
#[derive(Debug)]
pub struct CookieTokenStore {
    policy: CookiePolicy,
    slot: Mutex<CookieSlot>,
}

impl CookieTokenStore {
    #[must_use]
    pub fn new(policy: CookiePolicy, incoming: Option<String>) -> Self {
        Self {
            policy,
            slot: Mutex::new(CookieSlot {
                current: incoming,
                set_cookie: None,
            }),
        }
    }

    /// The `Set-Cookie` value produced by the last `save` or `clear`, if any.
    #[must_use]
    pub fn take_set_cookie(&self) -> Option<HeaderValue> {
        self.slot
            .lock()
            .ok()
            .and_then(|mut slot| slot.set_cookie.take())
    }
}

impl TokenStore for CookieTokenStore {
    fn save(&self, token: &str) -> Result<(), StoreError> {
        let cookie = self.policy.session_cookie(token)?;
        let mut slot = self.slot.lock().map_err(|_| StoreError::Poisoned)?;
        slot.current = Some(token.to_string());
        slot.set_cookie = Some(cookie);
        Ok(())
    }

    fn load(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.current.clone())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let cookie = self.policy.clear_cookie()?;
        let mut slot = self.slot.lock().map_err(|_| StoreError::Poisoned)?;
        slot.current = None;
        slot.set_cookie = Some(cookie);
        Ok(())
    }
}
