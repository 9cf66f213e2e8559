//! Session cookie configuration.
//!
//! Resolves the signing key and cookie flags from [`AppSettings`] and builds
//! the session middleware shared by the server and integration tests.

use std::path::PathBuf;

use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use tracing::{info, warn};
use zeroize::Zeroize;

use crate::settings::{AppSettings, SettingsError};

pub mod fingerprint;

const SESSION_KEY_MIN_LEN: usize = 64;
/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds fall back to a generated key.
    Debug,
    /// Release builds require a readable key of sufficient length.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Resolved session cookie settings.
#[derive(Clone)]
pub struct SessionSettings {
    /// Signing and encryption key.
    pub key: Key,
    /// Whether the cookie is marked `Secure`.
    pub cookie_secure: bool,
    /// Cookie `SameSite` policy.
    pub same_site: SameSite,
    /// Cookie lifetime.
    pub ttl: chrono::Duration,
}

/// Errors raised while resolving session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The key file is too short for release builds.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// Release builds must not use generated keys.
    #[error("allow_ephemeral_key must be false in release builds")]
    EphemeralNotAllowed,
    /// A related setting is unusable.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Resolve session settings for `mode`.
///
/// Release builds reject `allow_ephemeral_key`, unreadable key files and
/// keys shorter than 64 bytes. Debug builds warn and generate a key instead.
/// The key fingerprint is logged so operators can tell which key is live.
pub fn session_settings(
    settings: &AppSettings,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    if settings.allow_ephemeral_key && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let key = session_key(settings.session_key_file(), mode, settings.allow_ephemeral_key)?;
    info!(
        fingerprint = %fingerprint::key_fingerprint(&key),
        "session key loaded"
    );
    Ok(SessionSettings {
        key,
        cookie_secure: settings.cookie_secure(),
        same_site: SameSite::Lax,
        ttl: settings.session_ttl()?,
    })
}

fn session_key(
    path: PathBuf,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                if mode.is_debug() {
                    warn!(path = %path.display(), length, "session key too short; using temporary key");
                    return Ok(Key::generate());
                }
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(error) => Err(SessionConfigError::KeyRead {
            path,
            source: error,
        }),
    }
}

/// Cookie session middleware holding only the provider access token.
#[must_use]
pub fn session_middleware(settings: &SessionSettings) -> SessionMiddleware<CookieSessionStore> {
    let ttl = actix_web::cookie::time::Duration::seconds(settings.ttl.num_seconds());
    SessionMiddleware::builder(CookieSessionStore::default(), settings.key.clone())
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(settings.cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(settings.same_site)
        .session_lifecycle(PersistentSession::default().session_ttl(ttl))
        .build()
}
