//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer; repositories convert them
//! to domain values at the boundary.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{credentials, projects, users, votes};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
}

/// Insertable struct for creating profile rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub display_name: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = credentials)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CredentialRow {
    pub email: String,
    pub user_id: Uuid,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading and inserting projects.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProjectRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub summary: String,
    pub techniques: String,
    pub example: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading votes.
#[derive(Debug, Clone, Copy, Queryable, Selectable)]
#[diesel(table_name = votes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VoteRow {
    pub voter_id: Uuid,
    pub project_id: Uuid,
}

/// Insertable vote; `created_at` takes the column default.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = votes)]
pub(crate) struct NewVoteRow {
    pub voter_id: Uuid,
    pub project_id: Uuid,
    pub position: i16,
}
