//! File-backed persistence of the auth cookie.
//!
//! The browser original keeps the token in `document.cookie`; the client
//! counterpart serializes the same single `name=value; attributes` line to
//! a file. No other storage is touched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};

/// Name of the single cookie holding the raw bearer token.
pub const AUTH_COOKIE_NAME: &str = "auth-token";

/// Cookie expiry window in days.
const COOKIE_MAX_AGE_DAYS: i64 = 7;

/// Scoped read/write access to the one persisted cookie.
#[derive(Debug, Clone)]
pub struct CookieFile {
    path: PathBuf,
}

impl CookieFile {
    /// Create a store persisting at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted token.
    ///
    /// Returns `None` when the cookie is absent; a malformed or expired
    /// cookie is deleted on the spot and also yields `None`.
    #[must_use]
    pub fn load(&self) -> Option<String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "Failed to read cookie file");
                return None;
            }
        };

        match parse_cookie(raw.trim()) {
            Some((value, expires)) if expires > Utc::now() => Some(value),
            _ => {
                self.delete();
                None
            }
        }
    }

    /// Persist the token with a fresh 7-day expiry window.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn store(&self, token: &str) -> io::Result<()> {
        let expires = Utc::now() + Duration::days(COOKIE_MAX_AGE_DAYS);
        let line = format!(
            "{AUTH_COOKIE_NAME}={token}; Expires={}; Path=/; SameSite=Lax",
            expires.format("%a, %d %b %Y %H:%M:%S GMT")
        );

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, line)
    }

    /// Delete the persisted cookie. Idempotent.
    pub fn delete(&self) {
        if let Err(e) = fs::remove_file(&self.path)
            && e.kind() != io::ErrorKind::NotFound
        {
            tracing::warn!(error = %e, path = %self.path.display(), "Failed to delete cookie file");
        }
    }
}

/// Parse a serialized cookie line into its value and expiry.
fn parse_cookie(line: &str) -> Option<(String, DateTime<Utc>)> {
    let mut parts = line.split("; ");

    let (name, value) = parts.next()?.split_once('=')?;
    if name != AUTH_COOKIE_NAME || value.is_empty() {
        return None;
    }

    let mut expires = None;
    for attr in parts {
        if let Some(raw) = attr.strip_prefix("Expires=") {
            expires = DateTime::parse_from_rfc2822(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc));
        }
    }

    Some((value.to_owned(), expires?))
}
