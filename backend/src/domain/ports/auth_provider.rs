//! Driven port for the external identity provider.
//!
//! The provider owns credentials and sessions. The domain only sees
//! [`AuthSession`] values and a stream of [`AuthEvent`]s; profile rows are
//! kept separately behind [`UserRepository`](super::UserRepository).

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::{AccessToken, AuthEvent, AuthSession, Credentials, DisplayName, Error};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum AuthProviderError {
        /// Email/password pair was not accepted.
        Rejected { message: String } =>
            "identity provider rejected credentials: {message}",
        /// An account already exists for the email.
        EmailTaken { email: String } =>
            "an account already exists for {email}",
        /// Provider backend could not be reached.
        Connection { message: String } =>
            "identity provider connection failed: {message}" as transient,
        /// Provider failed while handling the request.
        Query { message: String } =>
            "identity provider request failed: {message}",
    }
}

impl From<AuthProviderError> for Error {
    fn from(value: AuthProviderError) -> Self {
        match value {
            AuthProviderError::Rejected { .. } => Self::invalid_credentials(value.to_string()),
            AuthProviderError::EmailTaken { .. } => Self::conflict(value.to_string()),
            AuthProviderError::Connection { .. } | AuthProviderError::Query { .. } => {
                Self::store_unavailable(value.to_string())
            }
        }
    }
}

/// Email/password identity provider with observable session changes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create a credential and open a session for it.
    ///
    /// `name` is stored as provider metadata and later used to seed the
    /// profile on first login.
    async fn sign_up(
        &self,
        credentials: &Credentials,
        name: Option<DisplayName>,
    ) -> Result<AuthSession, AuthProviderError>;

    /// Open a session for an existing credential.
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, AuthProviderError>;

    /// Resolve a token to its live session; `None` when unknown or expired.
    async fn session(&self, token: &AccessToken)
    -> Result<Option<AuthSession>, AuthProviderError>;

    /// End the session behind `token`. Unknown tokens are not an error.
    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthProviderError>;

    /// Subscribe to session changes from this point on.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for provider error mapping.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(AuthProviderError::rejected("bad password"), ErrorCode::InvalidCredentials)]
    #[case(AuthProviderError::email_taken("ada@aluno.univesp.br"), ErrorCode::Conflict)]
    #[case(AuthProviderError::connection("timeout"), ErrorCode::StoreUnavailable)]
    #[case(AuthProviderError::query("boom"), ErrorCode::StoreUnavailable)]
    fn maps_to_domain_codes(#[case] error: AuthProviderError, #[case] expected: ErrorCode) {
        let message = error.to_string();
        let mapped = Error::from(error);
        assert_eq!(mapped.code(), expected);
        assert_eq!(mapped.message(), message);
    }
}
