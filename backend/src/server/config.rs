//! HTTP server configuration resolved from [`AppSettings`].

use std::net::SocketAddr;

use vote_backend::domain::EmailDomainPolicy;
use vote_backend::inbound::http::session_config::{
    BuildMode, SessionConfigError, SessionSettings, session_settings,
};
use vote_backend::outbound::persistence::DbPool;
use vote_backend::settings::{AppSettings, SettingsError};

/// Everything `create_server` needs, validated up front.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) email_policy: EmailDomainPolicy,
    pub(crate) total_eligible_voters: u64,
    pub(crate) ballot_write_retries: u32,
}

/// Failures while resolving server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ServerConfigError {
    /// A setting is out of range.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// The session key could not be prepared.
    #[error(transparent)]
    Session(#[from] SessionConfigError),
}

impl ServerConfig {
    /// Resolve settings for the current build mode. No database pool is
    /// attached; see [`ServerConfig::with_db_pool`].
    ///
    /// # Errors
    ///
    /// Returns [`ServerConfigError`] when a setting or the session key is
    /// unusable.
    pub fn from_settings(settings: &AppSettings) -> Result<Self, ServerConfigError> {
        Ok(Self {
            session: session_settings(settings, BuildMode::from_debug_assertions())?,
            bind_addr: settings.bind_addr()?,
            db_pool: None,
            email_policy: EmailDomainPolicy::new(settings.allowed_email_suffix()),
            total_eligible_voters: settings.total_eligible_voters(),
            ballot_write_retries: settings.ballot_write_retries(),
        })
    }

    /// Back the server with PostgreSQL instead of the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
