//! Ballot engine service.
//!
//! All rule checks (count, duplicates, self-vote, unknown projects) run
//! before the vote store is touched. The replace itself is delegated to a
//! [`VoteRepository`], which guarantees readers see either the old or the
//! new ballot.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{BallotEngine, ProjectRepository, VoteRepository};
use crate::domain::{
    Ballot, BallotRuleViolation, BallotState, CurrentUser, Error, ProjectId, UserId,
};

/// [`BallotEngine`] over project and vote stores.
#[derive(Clone)]
pub struct BallotEngineService<P, V> {
    projects: Arc<P>,
    votes: Arc<V>,
}

impl<P, V> BallotEngineService<P, V> {
    /// Create an engine over the given stores.
    pub fn new(projects: Arc<P>, votes: Arc<V>) -> Self {
        Self { projects, votes }
    }
}

impl<P, V> BallotEngineService<P, V>
where
    P: ProjectRepository,
    V: VoteRepository,
{
    async fn ensure_projects_exist(&self, ballot: &Ballot) -> Result<(), Error> {
        let found: HashSet<ProjectId> = self
            .projects
            .find_by_ids(ballot.project_ids())
            .await?
            .into_iter()
            .map(|project| project.id)
            .collect();
        match ballot.project_ids().iter().find(|id| !found.contains(*id)) {
            Some(missing) => Err(BallotRuleViolation::UnknownProject {
                project_id: *missing,
            }
            .into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<P, V> BallotEngine for BallotEngineService<P, V>
where
    P: ProjectRepository,
    V: VoteRepository,
{
    async fn cast_ballot(
        &self,
        voter: &CurrentUser,
        project_ids: &[ProjectId],
    ) -> Result<Ballot, Error> {
        let owned = self.projects.find_by_owner(voter.id()).await?;
        let ballot = Ballot::try_new(project_ids, owned.as_ref().map(|project| &project.id))
            .inspect_err(|violation| {
                info!(voter_id = %voter.id(), rule = violation.rule(), "ballot rejected");
            })?;
        self.ensure_projects_exist(&ballot).await?;

        self.votes.replace_ballot(voter.id(), &ballot).await?;
        info!(voter_id = %voter.id(), ballot = %ballot, "ballot stored");
        Ok(ballot)
    }

    async fn get_ballot_for(&self, voter_id: &UserId) -> Result<BallotState, Error> {
        let rows = self.votes.ballot_rows(voter_id).await?;
        BallotState::from_stored(*voter_id, rows).map_err(|anomaly| {
            warn!(
                voter_id = %voter_id,
                stored = anomaly.project_ids.len(),
                distinct = anomaly.distinct,
                "stored ballot is inconsistent"
            );
            anomaly.into()
        })
    }
}
