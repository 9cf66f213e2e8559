//! PostgreSQL-backed credential storage for the password identity provider.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CredentialRepository, CredentialRepositoryError, StoredCredential};
use crate::domain::{DisplayName, Email, UserId};

use super::diesel_error_mapping::StoreFailure;
use super::models::CredentialRow;
use super::pool::DbPool;
use super::schema::credentials;

/// Diesel-backed credential store.
#[derive(Clone)]
pub struct DieselCredentialRepository {
    pool: DbPool,
}

impl DieselCredentialRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: impl Into<StoreFailure>, email: &str) -> CredentialRepositoryError {
    match failure.into() {
        StoreFailure::Connection(message) => CredentialRepositoryError::connection(message),
        StoreFailure::UniqueViolation(_) => CredentialRepositoryError::duplicate_email(email),
        other => CredentialRepositoryError::query(other.message()),
    }
}

fn row_to_credential(row: CredentialRow) -> Result<StoredCredential, CredentialRepositoryError> {
    let invalid = |err: crate::domain::UserValidationError| {
        CredentialRepositoryError::query(format!("stored credential invalid: {err}"))
    };
    Ok(StoredCredential {
        user_id: UserId::from_uuid(row.user_id),
        email: Email::new(&row.email).map_err(invalid)?,
        password_hash: row.password_hash,
        display_name: row
            .display_name
            .as_deref()
            .map(DisplayName::new)
            .transpose()
            .map_err(invalid)?,
        created_at: row.created_at,
    })
}

#[async_trait]
impl CredentialRepository for DieselCredentialRepository {
    async fn insert(&self, credential: &StoredCredential) -> Result<(), CredentialRepositoryError> {
        let email = credential.email.as_ref();
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err, email))?;
        let row = CredentialRow {
            email: email.to_owned(),
            user_id: *credential.user_id.as_uuid(),
            password_hash: credential.password_hash.clone(),
            display_name: credential.display_name.as_ref().map(ToString::to_string),
            created_at: credential.created_at,
        };
        diesel::insert_into(credentials::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| map_failure(err, email))?;
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredential>, CredentialRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err, email.as_ref()))?;
        let row = credentials::table
            .find(email.as_ref())
            .select(CredentialRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_failure(err, email.as_ref()))?;
        row.map(row_to_credential).transpose()
    }
}
