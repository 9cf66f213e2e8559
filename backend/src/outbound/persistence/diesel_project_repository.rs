//! PostgreSQL-backed `ProjectRepository` implementation.
//!
//! The one-project-per-owner rule is the `projects.owner_id` unique
//! constraint; a violation surfaces as `DuplicateOwner`.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use url::Url;
use uuid::Uuid;

use crate::domain::ports::{ProjectRepository, ProjectRepositoryError};
use crate::domain::{DisplayName, Email, Project, ProjectId, ProjectListing, UserId};

use super::diesel_error_mapping::StoreFailure;
use super::models::{ProjectRow, UserRow};
use super::pool::DbPool;
use super::schema::{projects, users, votes};

/// Diesel-backed project store.
#[derive(Clone)]
pub struct DieselProjectRepository {
    pool: DbPool,
}

impl DieselProjectRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: impl Into<StoreFailure>) -> ProjectRepositoryError {
    match failure.into() {
        StoreFailure::Connection(message) => ProjectRepositoryError::connection(message),
        other => ProjectRepositoryError::query(other.message()),
    }
}

fn map_insert_failure(failure: impl Into<StoreFailure>, owner_id: &UserId) -> ProjectRepositoryError {
    match failure.into() {
        StoreFailure::UniqueViolation(Some(constraint)) if constraint.contains("owner_id") => {
            ProjectRepositoryError::duplicate_owner(owner_id.to_string())
        }
        StoreFailure::ForeignKeyViolation(_) => {
            ProjectRepositoryError::query(format!("no profile for owner {owner_id}"))
        }
        other => map_failure(other),
    }
}

fn project_to_row(project: &Project) -> ProjectRow {
    ProjectRow {
        id: *project.id.as_uuid(),
        owner_id: *project.owner_id.as_uuid(),
        name: project.name.clone(),
        summary: project.summary.clone(),
        techniques: project.techniques.clone(),
        example: project.example.clone(),
        image_url: project.image_url.as_ref().map(ToString::to_string),
        created_at: project.created_at,
    }
}

fn row_to_project(row: ProjectRow) -> Result<Project, ProjectRepositoryError> {
    let image_url = row
        .image_url
        .as_deref()
        .map(Url::parse)
        .transpose()
        .map_err(|err| ProjectRepositoryError::query(format!("stored image url invalid: {err}")))?;
    Ok(Project {
        id: ProjectId::from_uuid(row.id),
        owner_id: UserId::from_uuid(row.owner_id),
        name: row.name,
        summary: row.summary,
        techniques: row.techniques,
        example: row.example,
        image_url,
        created_at: row.created_at,
    })
}

fn listing_from_rows(
    project: ProjectRow,
    owner: &UserRow,
    counts: &HashMap<Uuid, i64>,
) -> Result<ProjectListing, ProjectRepositoryError> {
    let invalid = |err: crate::domain::UserValidationError| {
        ProjectRepositoryError::query(format!("stored owner invalid: {err}"))
    };
    let vote_count = counts
        .get(&project.id)
        .map_or(0, |count| u64::try_from(*count).unwrap_or(0));
    Ok(ProjectListing {
        owner_name: DisplayName::new(&owner.display_name).map_err(invalid)?,
        owner_email: Email::new(&owner.email).map_err(invalid)?,
        vote_count,
        project: row_to_project(project)?,
    })
}

#[async_trait]
impl ProjectRepository for DieselProjectRepository {
    async fn insert(&self, project: &Project) -> Result<(), ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        diesel::insert_into(projects::table)
            .values(&project_to_row(project))
            .execute(&mut conn)
            .await
            .map_err(|err| map_insert_failure(err, &project.owner_id))?;
        Ok(())
    }

    async fn find_by_owner(
        &self,
        owner_id: &UserId,
    ) -> Result<Option<Project>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let row = projects::table
            .filter(projects::owner_id.eq(*owner_id.as_uuid()))
            .select(ProjectRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?;
        row.map(row_to_project).transpose()
    }

    async fn find_by_ids(&self, ids: &[ProjectId]) -> Result<Vec<Project>, ProjectRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let wanted: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let rows: Vec<ProjectRow> = projects::table
            .filter(projects::id.eq_any(wanted))
            .select(ProjectRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_failure)?;
        rows.into_iter().map(row_to_project).collect()
    }

    async fn list_listings(&self) -> Result<Vec<ProjectListing>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let rows: Vec<(ProjectRow, UserRow)> = projects::table
            .inner_join(users::table)
            .select((ProjectRow::as_select(), UserRow::as_select()))
            .order((projects::created_at.desc(), projects::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_failure)?;
        let counts: HashMap<Uuid, i64> = votes::table
            .group_by(votes::project_id)
            .select((votes::project_id, diesel::dsl::count_star()))
            .load::<(Uuid, i64)>(&mut conn)
            .await
            .map_err(map_failure)?
            .into_iter()
            .collect();
        rows.into_iter()
            .map(|(project, owner)| listing_from_rows(project, &owner, &counts))
            .collect()
    }
}
