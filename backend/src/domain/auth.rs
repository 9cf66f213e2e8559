//! Authentication primitives: credentials, the email domain gate, sessions,
//! and the caller context passed to every operation.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a service.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{DisplayName, Email, Error, UserId, UserValidationError};

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// Email was missing or malformed.
    #[error(transparent)]
    Email(#[from] UserValidationError),
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated email/password pair used by identity providers.
///
/// ## Invariants
/// - `email` is normalised (trimmed, lower-cased).
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use vote_backend::domain::Credentials;
///
/// let creds = Credentials::try_from_parts("Ada@aluno.univesp.br", "secret").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@aluno.univesp.br");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    email: Email,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email address.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Password string provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Email suffix rule restricting signup and login to one institution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailDomainPolicy {
    suffix: String,
}

/// Suffix accepted when no other is configured.
pub const DEFAULT_ALLOWED_EMAIL_SUFFIX: &str = "@aluno.univesp.br";

impl Default for EmailDomainPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_EMAIL_SUFFIX)
    }
}

impl EmailDomainPolicy {
    /// Build a policy for the given suffix, e.g. `@aluno.univesp.br`.
    #[must_use]
    pub fn new(suffix: impl AsRef<str>) -> Self {
        Self {
            suffix: suffix.as_ref().trim().to_lowercase(),
        }
    }

    /// Suffix every accepted email must end with.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Fail with [`ErrorCode::DomainRejected`](super::ErrorCode::DomainRejected)
    /// unless `email` ends with the configured suffix.
    ///
    /// # Examples
    /// ```
    /// use vote_backend::domain::{Email, EmailDomainPolicy, ErrorCode};
    ///
    /// let policy = EmailDomainPolicy::new("@aluno.univesp.br");
    /// assert!(policy.check(&Email::new("ada@aluno.univesp.br").unwrap()).is_ok());
    /// let err = policy.check(&Email::new("ada@gmail.com").unwrap()).unwrap_err();
    /// assert_eq!(err.code(), ErrorCode::DomainRejected);
    /// ```
    pub fn check(&self, email: &Email) -> Result<(), Error> {
        if email.ends_with_suffix(&self.suffix) {
            Ok(())
        } else {
            Err(Error::domain_rejected(format!(
                "only {} email addresses are allowed",
                self.suffix
            ))
            .with_details(serde_json::json!({ "allowedSuffix": self.suffix })))
        }
    }
}

/// Opaque bearer token identifying a provider session.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl AsRef<str> for AccessToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Identity as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    /// Subject identifier; doubles as the profile id.
    pub user_id: UserId,
    /// Email the credential was registered with.
    pub email: Email,
    /// Name captured in the provider's user metadata at signup, if any.
    pub metadata_name: Option<DisplayName>,
}

/// Active provider session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// Token the client presents on later calls.
    pub token: AccessToken,
    /// Authenticated identity.
    pub identity: AuthIdentity,
    /// Instant after which the provider no longer honours the token.
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Explicit caller context for domain operations.
    #[must_use]
    pub fn current_user(&self) -> CurrentUser {
        CurrentUser::new(self.identity.user_id, self.identity.email.clone())
    }
}

/// Authentication state changes published by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A session was created for the user.
    SignedIn {
        /// Subject of the new session.
        user_id: UserId,
    },
    /// A session was ended explicitly.
    SignedOut {
        /// Subject of the ended session.
        user_id: UserId,
    },
    /// A session was found past its expiry and dropped.
    SessionExpired {
        /// Subject of the expired session.
        user_id: UserId,
    },
}

impl AuthEvent {
    /// User the event concerns.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        match self {
            Self::SignedIn { user_id }
            | Self::SignedOut { user_id }
            | Self::SessionExpired { user_id } => user_id,
        }
    }
}

/// The authenticated caller, passed explicitly into each operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    id: UserId,
    email: Email,
}

impl CurrentUser {
    /// Build a caller context.
    #[must_use]
    pub const fn new(id: UserId, email: Email) -> Self {
        Self { id, email }
    }

    /// Caller's user id.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Caller's email.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }
}
