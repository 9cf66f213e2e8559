//! Application settings loaded via OrthoConfig.
//!
//! Every value may come from CLI flags, `VOTING_*` environment variables or a
//! config file. Optional fields fall back to the defaults below.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{DEFAULT_ALLOWED_EMAIL_SUFFIX, DEFAULT_BALLOT_WRITE_RETRIES};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
/// Cohort size used for participation when none is configured.
pub const DEFAULT_TOTAL_ELIGIBLE_VOTERS: u64 = 6;
/// Session lifetime used when none is configured.
pub const DEFAULT_SESSION_TTL_MINUTES: u32 = 120;

/// Server and voting settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "VOTING")]
pub struct AppSettings {
    /// Listen address, e.g. `0.0.0.0:8080`.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub database_pool_size: Option<u32>,
    /// Email suffix accepted at signup and login.
    pub allowed_email_suffix: Option<String>,
    /// Fixed cohort size for participation.
    pub total_eligible_voters: Option<u64>,
    /// File holding the cookie signing key.
    pub session_key_file: Option<PathBuf>,
    /// Permit a generated key when the key file is unreadable.
    #[ortho_config(default = false)]
    pub allow_ephemeral_key: bool,
    /// Mark the session cookie `Secure`; on unless set to `false`.
    pub cookie_secure: Option<bool>,
    /// Session lifetime for both the cookie and provider tokens.
    pub session_ttl_minutes: Option<u32>,
    /// Extra attempts the sequential ballot writer makes after a transient failure.
    pub ballot_write_retries: Option<u32>,
}

/// Raised when a configured value cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// `session_ttl_minutes` must be positive.
    #[error("session TTL must be at least one minute")]
    ZeroSessionTtl,
}

impl AppSettings {
    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Configured email suffix or the institutional default.
    pub fn allowed_email_suffix(&self) -> &str {
        self.allowed_email_suffix
            .as_deref()
            .unwrap_or(DEFAULT_ALLOWED_EMAIL_SUFFIX)
    }

    /// Cohort size for participation. Zero is allowed and reads as 0%.
    pub fn total_eligible_voters(&self) -> u64 {
        self.total_eligible_voters
            .unwrap_or(DEFAULT_TOTAL_ELIGIBLE_VOTERS)
    }

    /// Whether the session cookie carries `Secure`.
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    /// Session key location.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Session lifetime.
    pub fn session_ttl(&self) -> Result<chrono::Duration, SettingsError> {
        match self
            .session_ttl_minutes
            .unwrap_or(DEFAULT_SESSION_TTL_MINUTES)
        {
            0 => Err(SettingsError::ZeroSessionTtl),
            minutes => Ok(chrono::Duration::minutes(i64::from(minutes))),
        }
    }

    /// Retry budget for the sequential ballot writer.
    pub fn ballot_write_retries(&self) -> u32 {
        self.ballot_write_retries
            .unwrap_or(DEFAULT_BALLOT_WRITE_RETRIES)
    }
}
