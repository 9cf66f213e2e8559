//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly.

diesel::table! {
    /// Voter profiles keyed by the identity provider's subject id.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        display_name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Argon2 password hashes owned by the bundled identity provider.
    credentials (email) {
        email -> Varchar,
        user_id -> Uuid,
        password_hash -> Varchar,
        display_name -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Submitted projects; `owner_id` is unique so each user owns at most one.
    projects (id) {
        id -> Uuid,
        owner_id -> Uuid,
        name -> Text,
        summary -> Text,
        techniques -> Text,
        example -> Text,
        image_url -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per (voter, project) selection.
    votes (voter_id, project_id) {
        voter_id -> Uuid,
        project_id -> Uuid,
        /// Slot within the voter's ballot, preserving submission order.
        position -> Int2,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(projects -> users (owner_id));
diesel::joinable!(votes -> projects (project_id));

diesel::allow_tables_to_appear_in_same_query!(credentials, projects, users, votes);
