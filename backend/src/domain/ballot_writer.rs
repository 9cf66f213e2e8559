//! Ballot replacement for stores that cannot run a transaction.
//!
//! [`SequentialBallotWriter`] lifts a [`VoteRowStore`] into a
//! [`VoteRepository`]. Replaces are serialised behind a write lock and reads
//! take the shared side, so within one process nobody observes the gap
//! between the delete and the insert. A transient failure re-runs
//! delete-then-insert for the same voter; the pair is idempotent because the
//! delete clears whatever a failed insert left behind.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::ports::{VoteRepository, VoteRepositoryError, VoteRowStore};
use crate::domain::{Ballot, ProjectId, UserId, Vote};

/// Default number of extra attempts after the first failed write.
pub const DEFAULT_BALLOT_WRITE_RETRIES: u32 = 2;

/// Serialising [`VoteRepository`] over a non-transactional row store.
pub struct SequentialBallotWriter<S> {
    store: Arc<S>,
    gate: RwLock<()>,
    retries: u32,
}

impl<S> SequentialBallotWriter<S> {
    /// Wrap `store`, retrying transient failures up to `retries` times.
    pub fn new(store: Arc<S>, retries: u32) -> Self {
        Self {
            store,
            gate: RwLock::new(()),
            retries,
        }
    }
}

impl<S: VoteRowStore> SequentialBallotWriter<S> {
    async fn write_once(
        &self,
        voter_id: &UserId,
        votes: &[Vote],
        deleted: &mut bool,
    ) -> Result<(), VoteRepositoryError> {
        let removed = self.store.delete_for_voter(voter_id).await?;
        *deleted = true;
        debug!(voter_id = %voter_id, removed, "previous ballot cleared");
        self.store.insert_votes(votes).await
    }
}

#[async_trait]
impl<S: VoteRowStore> VoteRepository for SequentialBallotWriter<S> {
    async fn ballot_rows(&self, voter_id: &UserId) -> Result<Vec<ProjectId>, VoteRepositoryError> {
        let _read = self.gate.read().await;
        self.store.ballot_rows(voter_id).await
    }

    async fn all_votes(&self) -> Result<Vec<Vote>, VoteRepositoryError> {
        let _read = self.gate.read().await;
        self.store.all_votes().await
    }

    async fn replace_ballot(
        &self,
        voter_id: &UserId,
        ballot: &Ballot,
    ) -> Result<(), VoteRepositoryError> {
        let _write = self.gate.write().await;
        let votes = ballot.votes_for(*voter_id);
        let mut deleted = false;
        let mut attempt = 0;

        let failure = loop {
            match self.write_once(voter_id, &votes, &mut deleted).await {
                Ok(()) => return Ok(()),
                Err(err) if err.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    warn!(voter_id = %voter_id, attempt, error = %err, "retrying ballot write");
                }
                Err(err) => break err,
            }
        };

        if deleted {
            warn!(voter_id = %voter_id, error = %failure, "ballot write abandoned after delete");
            Err(VoteRepositoryError::partial(
                voter_id.to_string(),
                failure.to_string(),
            ))
        } else {
            Err(failure)
        }
    }
}
