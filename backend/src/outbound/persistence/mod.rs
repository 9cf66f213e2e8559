//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows
//! (`models.rs`, `schema.rs`) and domain types. Connections come from a
//! `bb8` pool through `diesel-async`.
//!
//! # Example
//!
//! ```no_run
//! use vote_backend::outbound::persistence::{DbPool, DieselProjectRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/voting")).await?;
//! let projects = DieselProjectRepository::new(pool);
//! # let _ = projects;
//! # Ok(())
//! # }
//! ```

mod diesel_credential_repository;
mod diesel_error_mapping;
mod diesel_project_repository;
mod diesel_user_repository;
mod diesel_vote_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_credential_repository::DieselCredentialRepository;
pub use diesel_project_repository::DieselProjectRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_vote_repository::DieselVoteRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
