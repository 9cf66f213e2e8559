//! PostgreSQL-backed `UserRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{DisplayName, Email, User, UserId};

use super::diesel_error_mapping::StoreFailure;
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed profile store.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: impl Into<StoreFailure>) -> UserPersistenceError {
    match failure.into() {
        StoreFailure::Connection(message) => UserPersistenceError::connection(message),
        other => UserPersistenceError::query(other.message()),
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let email = Email::new(&row.email)
        .map_err(|err| UserPersistenceError::query(format!("stored email invalid: {err}")))?;
    let name = DisplayName::new(&row.display_name)
        .map_err(|err| UserPersistenceError::query(format!("stored name invalid: {err}")))?;
    Ok(User::new(UserId::from_uuid(row.id), email, name))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert_if_absent(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            email: user.email().as_ref(),
            display_name: user.name().as_ref(),
        };
        // A clash on email (rather than id) still raises and maps to a query error.
        let inserted = diesel::insert_into(users::table)
            .values(&row)
            .on_conflict(users::id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_failure)?;
        Ok(inserted == 1)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let row = users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?;
        row.map(row_to_user).transpose()
    }
}
