//! In-process store for development and tests.
//!
//! One [`InMemoryStore`] implements every storage port behind a single
//! `RwLock`, so a ballot replace is atomic for readers exactly like a
//! database transaction. It also implements [`VoteRowStore`] for exercising
//! the sequential writer against a real backing store.
//!
//! The same relational rules as the PostgreSQL schema apply: unique emails,
//! one project per owner, projects must reference a stored profile, votes
//! must reference a stored project and be unique per voter and project.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::ports::{
    CredentialRepository, CredentialRepositoryError, ProjectRepository, ProjectRepositoryError,
    StoredCredential, UserPersistenceError, UserRepository, VoteRepository, VoteRepositoryError,
    VoteRowStore,
};
use crate::domain::{Ballot, Email, Project, ProjectId, ProjectListing, User, UserId, Vote};

#[derive(Default)]
struct StoreState {
    users: HashMap<UserId, User>,
    credentials: HashMap<Email, StoredCredential>,
    // Insertion order breaks `created_at` ties in listings.
    projects: Vec<Project>,
    votes: Vec<Vote>,
}

impl StoreState {
    fn project_exists(&self, id: &ProjectId) -> bool {
        self.projects.iter().any(|project| project.id == *id)
    }

    fn rows_for(&self, voter_id: &UserId) -> Vec<ProjectId> {
        self.votes
            .iter()
            .filter(|vote| vote.voter_id == *voter_id)
            .map(|vote| vote.project_id)
            .collect()
    }

    fn check_new_votes(&self, votes: &[Vote]) -> Result<(), VoteRepositoryError> {
        let mut seen: HashSet<(UserId, ProjectId)> = self
            .votes
            .iter()
            .map(|vote| (vote.voter_id, vote.project_id))
            .collect();
        for vote in votes {
            if !self.project_exists(&vote.project_id) {
                return Err(VoteRepositoryError::query(format!(
                    "project {} does not exist",
                    vote.project_id
                )));
            }
            if !seen.insert((vote.voter_id, vote.project_id)) {
                return Err(VoteRepositoryError::query(format!(
                    "duplicate vote by {} for {}",
                    vote.voter_id, vote.project_id
                )));
            }
        }
        Ok(())
    }
}

/// Shared in-memory store implementing the storage ports.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert_if_absent(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut state = self.state.write().await;
        if state.users.contains_key(user.id()) {
            return Ok(false);
        }
        if state.users.values().any(|other| other.email() == user.email()) {
            return Err(UserPersistenceError::query(format!(
                "email {} belongs to another profile",
                user.email()
            )));
        }
        state.users.insert(*user.id(), user.clone());
        Ok(true)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.state.read().await.users.get(id).cloned())
    }
}

#[async_trait]
impl CredentialRepository for InMemoryStore {
    async fn insert(&self, credential: &StoredCredential) -> Result<(), CredentialRepositoryError> {
        let mut state = self.state.write().await;
        if state.credentials.contains_key(&credential.email) {
            return Err(CredentialRepositoryError::duplicate_email(
                credential.email.to_string(),
            ));
        }
        state
            .credentials
            .insert(credential.email.clone(), credential.clone());
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredential>, CredentialRepositoryError> {
        Ok(self.state.read().await.credentials.get(email).cloned())
    }
}

#[async_trait]
impl ProjectRepository for InMemoryStore {
    async fn insert(&self, project: &Project) -> Result<(), ProjectRepositoryError> {
        let mut state = self.state.write().await;
        if state
            .projects
            .iter()
            .any(|existing| existing.owner_id == project.owner_id)
        {
            return Err(ProjectRepositoryError::duplicate_owner(
                project.owner_id.to_string(),
            ));
        }
        if !state.users.contains_key(&project.owner_id) {
            return Err(ProjectRepositoryError::query(format!(
                "owner {} has no profile",
                project.owner_id
            )));
        }
        state.projects.push(project.clone());
        Ok(())
    }

    async fn find_by_owner(
        &self,
        owner_id: &UserId,
    ) -> Result<Option<Project>, ProjectRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .projects
            .iter()
            .find(|project| project.owner_id == *owner_id)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[ProjectId]) -> Result<Vec<Project>, ProjectRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .projects
            .iter()
            .filter(|project| ids.contains(&project.id))
            .cloned()
            .collect())
    }

    async fn list_listings(&self) -> Result<Vec<ProjectListing>, ProjectRepositoryError> {
        let state = self.state.read().await;
        let mut counts: HashMap<ProjectId, u64> = HashMap::new();
        for vote in &state.votes {
            *counts.entry(vote.project_id).or_default() += 1;
        }

        let mut listings: Vec<ProjectListing> = state
            .projects
            .iter()
            .rev()
            .filter_map(|project| {
                let Some(owner) = state.users.get(&project.owner_id) else {
                    debug!(project_id = %project.id, "listing skipped: owner profile missing");
                    return None;
                };
                Some(ProjectListing {
                    project: project.clone(),
                    owner_name: owner.name().clone(),
                    owner_email: owner.email().clone(),
                    vote_count: counts.get(&project.id).copied().unwrap_or_default(),
                })
            })
            .collect();
        // Stable sort keeps newest-inserted first among equal timestamps.
        listings.sort_by(|a, b| b.project.created_at.cmp(&a.project.created_at));
        Ok(listings)
    }
}

#[async_trait]
impl VoteRepository for InMemoryStore {
    async fn ballot_rows(&self, voter_id: &UserId) -> Result<Vec<ProjectId>, VoteRepositoryError> {
        Ok(self.state.read().await.rows_for(voter_id))
    }

    async fn all_votes(&self) -> Result<Vec<Vote>, VoteRepositoryError> {
        Ok(self.state.read().await.votes.clone())
    }

    async fn replace_ballot(
        &self,
        voter_id: &UserId,
        ballot: &Ballot,
    ) -> Result<(), VoteRepositoryError> {
        let mut state = self.state.write().await;
        let new_votes = ballot.votes_for(*voter_id);
        if let Some(missing) = new_votes
            .iter()
            .find(|vote| !state.project_exists(&vote.project_id))
        {
            return Err(VoteRepositoryError::query(format!(
                "project {} does not exist",
                missing.project_id
            )));
        }
        state.votes.retain(|vote| vote.voter_id != *voter_id);
        state.votes.extend(new_votes);
        Ok(())
    }
}

#[async_trait]
impl VoteRowStore for InMemoryStore {
    async fn ballot_rows(&self, voter_id: &UserId) -> Result<Vec<ProjectId>, VoteRepositoryError> {
        Ok(self.state.read().await.rows_for(voter_id))
    }

    async fn all_votes(&self) -> Result<Vec<Vote>, VoteRepositoryError> {
        Ok(self.state.read().await.votes.clone())
    }

    async fn delete_for_voter(&self, voter_id: &UserId) -> Result<u64, VoteRepositoryError> {
        let mut state = self.state.write().await;
        let before = state.votes.len();
        state.votes.retain(|vote| vote.voter_id != *voter_id);
        Ok((before - state.votes.len()) as u64)
    }

    async fn insert_votes(&self, votes: &[Vote]) -> Result<(), VoteRepositoryError> {
        let mut state = self.state.write().await;
        state.check_new_votes(votes)?;
        state.votes.extend_from_slice(votes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the in-memory store.
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{DisplayName, ProjectDraft, SequentialBallotWriter};

    fn user(local: &str) -> User {
        let email = Email::new(format!("{local}@aluno.univesp.br")).expect("email");
        User::new(
            UserId::random(),
            email,
            DisplayName::new(local).expect("name"),
        )
    }

    fn project_for(owner: &User, name: &str, offset_secs: i64) -> Project {
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("instant")
            + Duration::seconds(offset_secs);
        ProjectDraft {
            name: name.into(),
            summary: "s".into(),
            techniques: "t".into(),
            example: "e".into(),
            image_url: None,
        }
        .validate()
        .expect("valid draft")
        .into_project(*owner.id(), created_at)
    }

    struct Seeded {
        store: InMemoryStore,
        voter: User,
        projects: Vec<Project>,
    }

    #[fixture]
    async fn seeded() -> Seeded {
        let store = InMemoryStore::new();
        let voter = user("voter");
        store.insert_if_absent(&voter).await.expect("voter");
        let mut projects = Vec::new();
        for (index, name) in ["a", "b", "c", "d"].into_iter().enumerate() {
            let owner = user(name);
            store.insert_if_absent(&owner).await.expect("owner");
            let project = project_for(&owner, name, i64::try_from(index).expect("small"));
            ProjectRepository::insert(&store, &project)
                .await
                .expect("project");
            projects.push(project);
        }
        Seeded {
            store,
            voter,
            projects,
        }
    }

    fn ballot(projects: &[Project]) -> Ballot {
        let ids: Vec<ProjectId> = projects.iter().map(|project| project.id).collect();
        Ballot::try_new(&ids, None).expect("valid ballot")
    }

    #[rstest]
    #[tokio::test]
    async fn profile_insert_is_idempotent() {
        let store = InMemoryStore::new();
        let ada = user("ada");
        assert!(store.insert_if_absent(&ada).await.expect("first"));
        assert!(!store.insert_if_absent(&ada).await.expect("second"));
        assert_eq!(store.find_by_id(ada.id()).await.expect("read"), Some(ada));
    }

    #[rstest]
    #[tokio::test]
    async fn second_project_for_owner_is_rejected(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let owner = seeded.projects[0].owner_id;
        let mut again = seeded.projects[1].clone();
        again.id = ProjectId::random();
        again.owner_id = owner;
        let err = ProjectRepository::insert(&seeded.store, &again)
            .await
            .expect_err("duplicate owner");
        assert!(matches!(err, ProjectRepositoryError::DuplicateOwner { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn project_without_profile_is_rejected() {
        let store = InMemoryStore::new();
        let ghost = user("ghost");
        let err = ProjectRepository::insert(&store, &project_for(&ghost, "x", 0))
            .await
            .expect_err("missing owner");
        assert!(matches!(err, ProjectRepositoryError::Query { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn listings_are_newest_first_with_counts(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        VoteRepository::replace_ballot(
            &seeded.store,
            seeded.voter.id(),
            &ballot(&seeded.projects[..3]),
        )
        .await
        .expect("replace");

        let listings = seeded.store.list_listings().await.expect("listings");
        let names: Vec<_> = listings.iter().map(|l| l.project.name.as_str()).collect();
        assert_eq!(names, ["d", "c", "b", "a"]);
        let counts: Vec<_> = listings.iter().map(|l| l.vote_count).collect();
        assert_eq!(counts, [0, 1, 1, 1]);
        assert_eq!(listings[0].owner_name.as_ref(), "d");
    }

    #[rstest]
    #[tokio::test]
    async fn equal_timestamps_list_latest_insert_first() {
        let store = InMemoryStore::new();
        for name in ["first", "second"] {
            let owner = user(name);
            store.insert_if_absent(&owner).await.expect("owner");
            ProjectRepository::insert(&store, &project_for(&owner, name, 0))
                .await
                .expect("project");
        }
        let listings = store.list_listings().await.expect("listings");
        assert_eq!(listings[0].project.name, "second");
    }

    #[rstest]
    #[tokio::test]
    async fn replace_swaps_whole_ballot(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let voter = seeded.voter.id();
        VoteRepository::replace_ballot(&seeded.store, voter, &ballot(&seeded.projects[..3]))
            .await
            .expect("first ballot");
        VoteRepository::replace_ballot(&seeded.store, voter, &ballot(&seeded.projects[1..]))
            .await
            .expect("second ballot");

        let rows = VoteRepository::ballot_rows(&seeded.store, voter)
            .await
            .expect("rows");
        let expected: Vec<_> = seeded.projects[1..].iter().map(|p| p.id).collect();
        assert_eq!(rows, expected);
        assert_eq!(
            VoteRepository::all_votes(&seeded.store)
                .await
                .expect("votes")
                .len(),
            3
        );
    }

    #[rstest]
    #[tokio::test]
    async fn failed_replace_keeps_previous_ballot(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let voter = seeded.voter.id();
        let original = ballot(&seeded.projects[..3]);
        VoteRepository::replace_ballot(&seeded.store, voter, &original)
            .await
            .expect("first ballot");

        let unknown = Ballot::try_new(
            &[seeded.projects[0].id, seeded.projects[1].id, ProjectId::random()],
            None,
        )
        .expect("well-formed ballot");
        VoteRepository::replace_ballot(&seeded.store, voter, &unknown)
            .await
            .expect_err("unknown project");

        let rows = VoteRepository::ballot_rows(&seeded.store, voter)
            .await
            .expect("rows");
        assert_eq!(rows, original.project_ids().to_vec());
    }

    #[rstest]
    #[tokio::test]
    async fn sequential_writer_replaces_through_row_store(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let store = Arc::new(seeded.store);
        let writer = SequentialBallotWriter::new(Arc::clone(&store), 2);
        let voter = seeded.voter.id();

        writer
            .replace_ballot(voter, &ballot(&seeded.projects[..3]))
            .await
            .expect("first ballot");
        writer
            .replace_ballot(voter, &ballot(&seeded.projects[1..]))
            .await
            .expect("second ballot");

        let rows = writer.ballot_rows(voter).await.expect("rows");
        assert_eq!(rows.len(), 3);
        assert!(!rows.contains(&seeded.projects[0].id));
    }

    #[rstest]
    #[tokio::test]
    async fn row_store_rejects_duplicate_rows(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let vote = Vote {
            voter_id: *seeded.voter.id(),
            project_id: seeded.projects[0].id,
        };
        let err = seeded
            .store
            .insert_votes(&[vote, vote])
            .await
            .expect_err("duplicate");
        assert!(matches!(err, VoteRepositoryError::Query { .. }));
        assert_eq!(
            seeded
                .store
                .delete_for_voter(seeded.voter.id())
                .await
                .expect("delete"),
            0
        );
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_credential_is_rejected() {
        let store = InMemoryStore::new();
        let credential = StoredCredential {
            user_id: UserId::random(),
            email: Email::new("ada@aluno.univesp.br").expect("email"),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
            display_name: None,
            created_at: Utc::now(),
        };
        CredentialRepository::insert(&store, &credential)
            .await
            .expect("first");
        let err = CredentialRepository::insert(&store, &credential)
            .await
            .expect_err("second");
        assert!(matches!(err, CredentialRepositoryError::DuplicateEmail { .. }));
    }
}
