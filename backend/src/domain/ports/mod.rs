//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports ([`AuthProvider`], the repositories, [`VoteRowStore`])
//! describe what the domain needs from the identity provider and the store.
//! Each exposes a typed error built by `define_port_error!` so adapters map
//! their failures into predictable variants. Driving ports
//! ([`IdentityGate`], [`ProjectRegistry`], [`BallotEngine`],
//! [`DashboardQuery`]) are what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_provider;
mod ballot_engine;
mod credential_repository;
mod dashboard_query;
mod identity_gate;
mod project_registry;
mod project_repository;
mod user_repository;
mod vote_repository;

#[cfg(test)]
pub use auth_provider::MockAuthProvider;
pub use auth_provider::{AuthProvider, AuthProviderError};
#[cfg(test)]
pub use ballot_engine::MockBallotEngine;
pub use ballot_engine::BallotEngine;
#[cfg(test)]
pub use credential_repository::MockCredentialRepository;
pub use credential_repository::{
    CredentialRepository, CredentialRepositoryError, StoredCredential,
};
#[cfg(test)]
pub use dashboard_query::MockDashboardQuery;
pub use dashboard_query::DashboardQuery;
#[cfg(test)]
pub use identity_gate::MockIdentityGate;
pub use identity_gate::{IdentityGate, SignedIn};
#[cfg(test)]
pub use project_registry::MockProjectRegistry;
pub use project_registry::ProjectRegistry;
#[cfg(test)]
pub use project_repository::MockProjectRepository;
pub use project_repository::{ProjectRepository, ProjectRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use vote_repository::{MockVoteRepository, MockVoteRowStore};
pub use vote_repository::{VoteRepository, VoteRepositoryError, VoteRowStore};
