//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{BallotEngine, DashboardQuery, IdentityGate, ProjectRegistry};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Signup, login and session lookups.
    pub identity: Arc<dyn IdentityGate>,
    /// Project submission and listings.
    pub projects: Arc<dyn ProjectRegistry>,
    /// Ballot casting and reads.
    pub ballots: Arc<dyn BallotEngine>,
    /// Results dashboard.
    pub dashboard: Arc<dyn DashboardQuery>,
}

impl HttpState {
    /// Bundle the driving ports.
    pub fn new(
        identity: Arc<dyn IdentityGate>,
        projects: Arc<dyn ProjectRegistry>,
        ballots: Arc<dyn BallotEngine>,
        dashboard: Arc<dyn DashboardQuery>,
    ) -> Self {
        Self {
            identity,
            projects,
            ballots,
            dashboard,
        }
    }
}
