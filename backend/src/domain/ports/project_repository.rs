//! Port for project persistence.
//!
//! Listings join each project with its owner's profile and a live vote
//! count so readers never assemble the join themselves.

use async_trait::async_trait;

use crate::domain::{Error, Project, ProjectId, ProjectListing, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by project repository adapters.
    pub enum ProjectRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "project repository connection failed: {message}" as transient,
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "project repository query failed: {message}",
        /// The owner already has a project on file.
        DuplicateOwner { owner_id: String } =>
            "user {owner_id} already submitted a project",
    }
}

impl From<ProjectRepositoryError> for Error {
    fn from(value: ProjectRepositoryError) -> Self {
        match value {
            ProjectRepositoryError::DuplicateOwner { .. } => Self::conflict(value.to_string()),
            ProjectRepositoryError::Connection { .. } | ProjectRepositoryError::Query { .. } => {
                Self::store_unavailable(value.to_string())
            }
        }
    }
}

/// Project storage with at most one project per owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Persist a new project. The one-per-owner rule is enforced here.
    async fn insert(&self, project: &Project) -> Result<(), ProjectRepositoryError>;

    /// The project owned by `owner_id`, if any.
    async fn find_by_owner(
        &self,
        owner_id: &UserId,
    ) -> Result<Option<Project>, ProjectRepositoryError>;

    /// Projects whose ids appear in `ids`; missing ids are skipped.
    async fn find_by_ids(&self, ids: &[ProjectId]) -> Result<Vec<Project>, ProjectRepositoryError>;

    /// Every project with owner profile and vote count, newest first.
    async fn list_listings(&self) -> Result<Vec<ProjectListing>, ProjectRepositoryError>;
}
