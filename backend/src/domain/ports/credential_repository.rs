//! Port for credential storage used by the password identity provider.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{DisplayName, Email, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential repository adapters.
    pub enum CredentialRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "credential repository connection failed: {message}" as transient,
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "credential repository query failed: {message}",
        /// A credential already exists for the email.
        DuplicateEmail { email: String } =>
            "credential already exists for {email}",
    }
}

/// Stored password credential.
///
/// `password_hash` is an Argon2id PHC string carrying its own salt and
/// parameters; the plain password is never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    /// Subject identifier handed out in sessions.
    pub user_id: UserId,
    /// Normalised email the credential belongs to.
    pub email: Email,
    /// PHC-formatted password hash.
    pub password_hash: String,
    /// Name captured at signup.
    pub display_name: Option<DisplayName>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

/// Credential storage keyed by email.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Insert a new credential; fails with `DuplicateEmail` if one exists.
    async fn insert(&self, credential: &StoredCredential) -> Result<(), CredentialRepositoryError>;

    /// Fetch the credential registered for `email`.
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredential>, CredentialRepositoryError>;
}
