//! PostgreSQL-backed `VoteRepository` implementation.
//!
//! A ballot replacement deletes the voter's rows and inserts the new three
//! inside one transaction, so readers never observe a partial ballot.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{VoteRepository, VoteRepositoryError};
use crate::domain::{Ballot, ProjectId, UserId, Vote};

use super::diesel_error_mapping::StoreFailure;
use super::models::{NewVoteRow, VoteRow};
use super::pool::DbPool;
use super::schema::votes;

/// Diesel-backed vote store.
#[derive(Clone)]
pub struct DieselVoteRepository {
    pool: DbPool,
}

impl DieselVoteRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: impl Into<StoreFailure>) -> VoteRepositoryError {
    match failure.into() {
        StoreFailure::Connection(message) => VoteRepositoryError::connection(message),
        other => VoteRepositoryError::query(other.message()),
    }
}

fn ballot_rows_for(voter_id: &UserId, ballot: &Ballot) -> Vec<NewVoteRow> {
    ballot
        .project_ids()
        .iter()
        .zip(0_i16..)
        .map(|(project_id, position)| NewVoteRow {
            voter_id: *voter_id.as_uuid(),
            project_id: *project_id.as_uuid(),
            position,
        })
        .collect()
}

#[async_trait]
impl VoteRepository for DieselVoteRepository {
    async fn ballot_rows(&self, voter_id: &UserId) -> Result<Vec<ProjectId>, VoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let ids: Vec<Uuid> = votes::table
            .filter(votes::voter_id.eq(*voter_id.as_uuid()))
            .order(votes::position.asc())
            .select(votes::project_id)
            .load(&mut conn)
            .await
            .map_err(map_failure)?;
        Ok(ids.into_iter().map(ProjectId::from_uuid).collect())
    }

    async fn all_votes(&self) -> Result<Vec<Vote>, VoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let rows: Vec<VoteRow> = votes::table
            .select(VoteRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_failure)?;
        Ok(rows
            .into_iter()
            .map(|row| Vote {
                voter_id: UserId::from_uuid(row.voter_id),
                project_id: ProjectId::from_uuid(row.project_id),
            })
            .collect())
    }

    async fn replace_ballot(
        &self,
        voter_id: &UserId,
        ballot: &Ballot,
    ) -> Result<(), VoteRepositoryError> {
        let voter = *voter_id.as_uuid();
        let rows = ballot_rows_for(voter_id, ballot);
        let mut conn = self.pool.get().await.map_err(map_failure)?;

        let replaced = conn
            .transaction(|conn| {
                async move {
                    let removed = diesel::delete(votes::table.filter(votes::voter_id.eq(voter)))
                        .execute(conn)
                        .await?;
                    diesel::insert_into(votes::table)
                        .values(&rows)
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(removed)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_failure)?;

        debug!(voter_id = %voter_id, replaced, "ballot replaced");
        Ok(())
    }
}
