//! Outbound adapters implementing domain ports.
//!
//! - **auth**: bundled email/password identity provider
//! - **memory**: process-local store for development and tests
//! - **persistence**: PostgreSQL repositories using Diesel
//!
//! Adapters translate between domain types and storage representations and
//! hold no voting rules.

pub mod auth;
pub mod memory;
pub mod persistence;
