//! Classification of Diesel and pool failures shared by every repository.
//!
//! Repositories turn a [`StoreFailure`] into their own port error; the only
//! decision they make locally is what a unique violation means.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Coarse failure class for a database call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreFailure {
    /// The connection was lost or never established.
    Connection(String),
    /// A unique constraint rejected the write; carries the constraint name.
    UniqueViolation(Option<String>),
    /// A foreign key rejected the write.
    ForeignKeyViolation(String),
    /// Anything else.
    Query(String),
}

impl From<PoolError> for StoreFailure {
    fn from(error: PoolError) -> Self {
        match error {
            PoolError::Checkout { message } | PoolError::Build { message } => {
                Self::Connection(message)
            }
        }
    }
}

impl From<DieselError> for StoreFailure {
    fn from(error: DieselError) -> Self {
        match error {
            DieselError::DatabaseError(kind, info) => {
                debug!(?kind, message = info.message(), "diesel operation failed");
                match kind {
                    DatabaseErrorKind::ClosedConnection => {
                        Self::Connection(info.message().to_owned())
                    }
                    DatabaseErrorKind::UniqueViolation => {
                        Self::UniqueViolation(info.constraint_name().map(str::to_owned))
                    }
                    DatabaseErrorKind::ForeignKeyViolation => {
                        Self::ForeignKeyViolation(info.message().to_owned())
                    }
                    _ => Self::Query(info.message().to_owned()),
                }
            }
            DieselError::NotFound => Self::Query("record not found".to_owned()),
            other => {
                debug!(error = %other, "diesel operation failed");
                Self::Query(other.to_string())
            }
        }
    }
}

impl StoreFailure {
    /// Message suitable for a port error.
    pub(crate) fn message(&self) -> String {
        match self {
            Self::Connection(message) | Self::Query(message) => message.clone(),
            Self::ForeignKeyViolation(message) => format!("foreign key violation: {message}"),
            Self::UniqueViolation(Some(constraint)) => format!("unique violation on {constraint}"),
            Self::UniqueViolation(None) => "unique violation".to_owned(),
        }
    }
}
