//! Driving port for signup, login and session lookups.
//!
//! Inbound adapters parse raw request payloads into [`Credentials`] and call
//! this port; they never talk to the identity provider directly.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::{
    AccessToken, AuthEvent, AuthSession, Credentials, CurrentUser, DisplayName, Error, User,
};

/// A live session together with the profile it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    /// Provider session.
    pub session: AuthSession,
    /// Profile row for the session's subject.
    pub user: User,
}

/// Domain use-case port for identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityGate: Send + Sync {
    /// Create a credential and profile for an institutional email.
    async fn register(
        &self,
        credentials: &Credentials,
        name: DisplayName,
    ) -> Result<SignedIn, Error>;

    /// Sign in, creating the profile on first login if it is missing.
    async fn login(&self, credentials: &Credentials) -> Result<SignedIn, Error>;

    /// End the session. Provider failures are logged, never returned.
    async fn logout(&self, token: &AccessToken);

    /// Caller context for a token, or `None` when the session is gone.
    async fn current_user(&self, token: &AccessToken) -> Result<Option<CurrentUser>, Error>;

    /// Live session and profile for a token.
    async fn session(&self, token: &AccessToken) -> Result<Option<SignedIn>, Error>;

    /// Subscribe to authentication state changes.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
