//! Ports for vote storage.
//!
//! [`VoteRepository`] is what the ballot engine talks to: it replaces a
//! voter's whole ballot in one call. Stores that can run the delete and the
//! inserts inside one transaction implement it directly. Stores that cannot
//! implement the lower-level [`VoteRowStore`] instead and are wrapped by
//! [`SequentialBallotWriter`](crate::domain::SequentialBallotWriter).

use async_trait::async_trait;

use crate::domain::{Ballot, Error, ProjectId, UserId, Vote};

use super::define_port_error;

define_port_error! {
    /// Errors raised by vote storage adapters.
    pub enum VoteRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "vote repository connection failed: {message}" as transient,
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "vote repository query failed: {message}",
        /// Old rows were removed but the new ballot could not be written.
        Partial { voter_id: String, message: String } =>
            "ballot for {voter_id} left incomplete: {message}",
    }
}

impl From<VoteRepositoryError> for Error {
    fn from(value: VoteRepositoryError) -> Self {
        match value {
            VoteRepositoryError::Partial { ref voter_id, .. } => {
                let voter_id = voter_id.clone();
                Self::ballot_corrupted(value.to_string())
                    .with_details(serde_json::json!({ "voterId": voter_id }))
            }
            VoteRepositoryError::Connection { .. } | VoteRepositoryError::Query { .. } => {
                Self::store_unavailable(value.to_string())
            }
        }
    }
}

/// Ballot-level vote storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Raw stored targets for `voter_id`, in insertion order.
    async fn ballot_rows(&self, voter_id: &UserId) -> Result<Vec<ProjectId>, VoteRepositoryError>;

    /// Every stored vote row.
    async fn all_votes(&self) -> Result<Vec<Vote>, VoteRepositoryError>;

    /// Replace all of `voter_id`'s rows with `ballot`.
    ///
    /// On success exactly the ballot's three rows exist for the voter.
    async fn replace_ballot(
        &self,
        voter_id: &UserId,
        ballot: &Ballot,
    ) -> Result<(), VoteRepositoryError>;
}

/// Row-level vote storage without multi-statement transactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteRowStore: Send + Sync {
    /// Raw stored targets for `voter_id`, in insertion order.
    async fn ballot_rows(&self, voter_id: &UserId) -> Result<Vec<ProjectId>, VoteRepositoryError>;

    /// Every stored vote row.
    async fn all_votes(&self) -> Result<Vec<Vote>, VoteRepositoryError>;

    /// Remove every row for `voter_id`, returning how many were removed.
    async fn delete_for_voter(&self, voter_id: &UserId) -> Result<u64, VoteRepositoryError>;

    /// Insert `votes` as one batch.
    async fn insert_votes(&self, votes: &[Vote]) -> Result<(), VoteRepositoryError>;
}
