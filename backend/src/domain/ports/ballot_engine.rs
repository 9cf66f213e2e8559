//! Driving port for casting and reading ballots.

use async_trait::async_trait;

use crate::domain::{Ballot, BallotState, CurrentUser, Error, ProjectId, UserId};

/// Domain use-case port for the ballot engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BallotEngine: Send + Sync {
    /// Replace the voter's ballot with `project_ids`.
    ///
    /// Every rule is checked before anything is written; a rejected ballot
    /// leaves stored votes untouched.
    async fn cast_ballot(
        &self,
        voter: &CurrentUser,
        project_ids: &[ProjectId],
    ) -> Result<Ballot, Error>;

    /// The voter's stored ballot, reconciled on read.
    async fn get_ballot_for(&self, voter_id: &UserId) -> Result<BallotState, Error>;
}
