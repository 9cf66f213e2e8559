//! Driving port for project submission and listing.

use async_trait::async_trait;

use crate::domain::{CurrentUser, Error, Project, ProjectDraft, ProjectListing, UserId};

/// Domain use-case port for the project registry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRegistry: Send + Sync {
    /// Validate and store the caller's single project.
    async fn submit_project(
        &self,
        owner: &CurrentUser,
        draft: &ProjectDraft,
    ) -> Result<Project, Error>;

    /// The project owned by `user_id`; `None` is not an error.
    async fn get_project_for(&self, user_id: &UserId) -> Result<Option<Project>, Error>;

    /// Every project with owner details and vote count, newest first.
    async fn list_all_projects(&self) -> Result<Vec<ProjectListing>, Error>;

    /// Projects the viewer may vote for: everything except their own.
    async fn list_candidates(&self, viewer: &CurrentUser) -> Result<Vec<ProjectListing>, Error>;
}
