//! Project registry service.
//!
//! Submission validates every field before touching the store. The
//! one-project-per-owner rule is left to the repository, which reports a
//! second submission as a conflict. Listing vote counts are read through the
//! [`VoteRepository`] so they agree with ballots mid-replace.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use crate::domain::ports::{ProjectRegistry, ProjectRepository, VoteRepository};
use crate::domain::{
    CurrentUser, Error, ErrorCode, Project, ProjectDraft, ProjectId, ProjectListing, UserId, Vote,
};

/// [`ProjectRegistry`] over a [`ProjectRepository`] and a [`VoteRepository`].
#[derive(Clone)]
pub struct ProjectRegistryService<P, V> {
    projects: Arc<P>,
    votes: Arc<V>,
}

impl<P, V> ProjectRegistryService<P, V> {
    /// Create a registry over `projects`, counting votes from `votes`.
    pub fn new(projects: Arc<P>, votes: Arc<V>) -> Self {
        Self { projects, votes }
    }
}

fn with_vote_counts(mut listings: Vec<ProjectListing>, votes: &[Vote]) -> Vec<ProjectListing> {
    let mut counts: HashMap<ProjectId, u64> = HashMap::new();
    for vote in votes {
        *counts.entry(vote.project_id).or_default() += 1;
    }
    for listing in &mut listings {
        listing.vote_count = counts.get(&listing.project.id).copied().unwrap_or_default();
    }
    listings
}

impl<P, V> ProjectRegistryService<P, V>
where
    P: ProjectRepository,
    V: VoteRepository,
{
    async fn counted_listings(&self) -> Result<Vec<ProjectListing>, Error> {
        let listings = self.projects.list_listings().await?;
        let votes = self.votes.all_votes().await?;
        Ok(with_vote_counts(listings, &votes))
    }
}

#[async_trait]
impl<P, V> ProjectRegistry for ProjectRegistryService<P, V>
where
    P: ProjectRepository,
    V: VoteRepository,
{
    async fn submit_project(
        &self,
        owner: &CurrentUser,
        draft: &ProjectDraft,
    ) -> Result<Project, Error> {
        let submission = draft.validate()?;
        let project = submission.into_project(*owner.id(), Utc::now());
        match self.projects.insert(&project).await {
            Ok(()) => {
                info!(project_id = %project.id, owner_id = %owner.id(), "project submitted");
                Ok(project)
            }
            Err(err) => {
                let error = Error::from(err);
                if error.code() == ErrorCode::Conflict {
                    warn!(owner_id = %owner.id(), "second project submission refused");
                }
                Err(error)
            }
        }
    }

    async fn get_project_for(&self, user_id: &UserId) -> Result<Option<Project>, Error> {
        Ok(self.projects.find_by_owner(user_id).await?)
    }

    async fn list_all_projects(&self) -> Result<Vec<ProjectListing>, Error> {
        self.counted_listings().await
    }

    async fn list_candidates(&self, viewer: &CurrentUser) -> Result<Vec<ProjectListing>, Error> {
        let mut listings = self.counted_listings().await?;
        listings.retain(|listing| listing.project.owner_id != *viewer.id());
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the project registry.
    use super::*;
    use crate::domain::ports::{MockProjectRepository, MockVoteRepository, ProjectRepositoryError};
    use crate::domain::{DisplayName, Email, ProjectField, SUMMARY_MAX};
    use rstest::{fixture, rstest};

    #[fixture]
    fn owner() -> CurrentUser {
        CurrentUser::new(
            UserId::random(),
            Email::new("ada@aluno.univesp.br").expect("email"),
        )
    }

    #[fixture]
    fn draft() -> ProjectDraft {
        ProjectDraft {
            name: "Campus map".into(),
            summary: "Indoor navigation".into(),
            techniques: "Graph search".into(),
            example: "Find room 101".into(),
            image_url: None,
        }
    }

    fn listing(owner_id: UserId, name: &str) -> ProjectListing {
        let project = ProjectDraft {
            name: name.into(),
            summary: "s".into(),
            techniques: "t".into(),
            example: "e".into(),
            image_url: None,
        }
        .validate()
        .expect("valid draft")
        .into_project(owner_id, Utc::now());
        ProjectListing {
            project,
            owner_name: DisplayName::new("Owner").expect("name"),
            owner_email: Email::new("owner@aluno.univesp.br").expect("email"),
            vote_count: 0,
        }
    }

    fn registry(
        repo: MockProjectRepository,
    ) -> ProjectRegistryService<MockProjectRepository, MockVoteRepository> {
        registry_with_votes(repo, Vec::new())
    }

    fn registry_with_votes(
        repo: MockProjectRepository,
        stored: Vec<Vote>,
    ) -> ProjectRegistryService<MockProjectRepository, MockVoteRepository> {
        let mut votes = MockVoteRepository::new();
        votes.expect_all_votes().returning(move || Ok(stored.clone()));
        ProjectRegistryService::new(Arc::new(repo), Arc::new(votes))
    }

    #[rstest]
    #[tokio::test]
    async fn stores_valid_submission(owner: CurrentUser, draft: ProjectDraft) {
        let owner_id = *owner.id();
        let mut repo = MockProjectRepository::new();
        repo.expect_insert()
            .withf(move |project| project.owner_id == owner_id && project.name == "Campus map")
            .times(1)
            .return_once(|_| Ok(()));

        let project = registry(repo)
            .submit_project(&owner, &draft)
            .await
            .expect("stored");
        assert_eq!(project.owner_id, owner_id);
    }

    #[rstest]
    #[tokio::test]
    async fn overlong_summary_never_reaches_the_store(owner: CurrentUser, draft: ProjectDraft) {
        let mut repo = MockProjectRepository::new();
        repo.expect_insert().never();
        let draft = ProjectDraft {
            summary: "x".repeat(SUMMARY_MAX + 1),
            ..draft
        };

        let err = registry(repo)
            .submit_project(&owner, &draft)
            .await
            .expect_err("validation");
        assert_eq!(err.code(), ErrorCode::ValidationError);
        let details = err.details().expect("details");
        assert_eq!(details["fields"][0]["field"], ProjectField::Summary.as_str());
    }

    #[rstest]
    #[tokio::test]
    async fn second_submission_is_a_conflict(owner: CurrentUser, draft: ProjectDraft) {
        let mut repo = MockProjectRepository::new();
        let owner_id = owner.id().to_string();
        repo.expect_insert()
            .return_once(move |_| Err(ProjectRepositoryError::duplicate_owner(owner_id)));

        let err = registry(repo)
            .submit_project(&owner, &draft)
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_project_is_none(owner: CurrentUser) {
        let mut repo = MockProjectRepository::new();
        repo.expect_find_by_owner().return_once(|_| Ok(None));

        let found = registry(repo)
            .get_project_for(owner.id())
            .await
            .expect("lookup");
        assert!(found.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn candidates_exclude_viewer_project(owner: CurrentUser) {
        let mine = listing(*owner.id(), "Mine");
        let theirs = listing(UserId::random(), "Theirs");
        let mut repo = MockProjectRepository::new();
        repo.expect_list_listings()
            .return_once(move || Ok(vec![mine, theirs]));

        let candidates = registry(repo)
            .list_candidates(&owner)
            .await
            .expect("candidates");
        let names: Vec<_> = candidates
            .iter()
            .map(|l| l.project.name.as_str())
            .collect();
        assert_eq!(names, vec!["Theirs"]);
    }

    #[rstest]
    #[tokio::test]
    async fn store_failure_surfaces_unmodified() {
        let mut repo = MockProjectRepository::new();
        repo.expect_list_listings()
            .return_once(|| Err(ProjectRepositoryError::connection("timeout")));

        let err = registry(repo)
            .list_all_projects()
            .await
            .expect_err("store down");
        assert_eq!(err.code(), ErrorCode::StoreUnavailable);
        assert!(err.message().contains("timeout"));
    }

    #[rstest]
    #[tokio::test]
    async fn listing_counts_come_from_the_vote_repository(owner: CurrentUser) {
        let mut stale = listing(*owner.id(), "Counted");
        stale.vote_count = 7;
        let other = listing(UserId::random(), "Ignored");
        let counted_id = stale.project.id;
        let mut repo = MockProjectRepository::new();
        repo.expect_list_listings()
            .return_once(move || Ok(vec![stale, other]));
        let stored = vec![
            Vote {
                voter_id: UserId::random(),
                project_id: counted_id,
            },
            Vote {
                voter_id: UserId::random(),
                project_id: counted_id,
            },
        ];

        let listings = registry_with_votes(repo, stored)
            .list_all_projects()
            .await
            .expect("listings");
        let counts: Vec<_> = listings.iter().map(|l| l.vote_count).collect();
        assert_eq!(counts, vec![2, 0]);
    }
}
