//! Driving port for the results dashboard.

use async_trait::async_trait;

use crate::domain::{CurrentUser, DashboardSummary, Error};

/// Domain use-case port for dashboard reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardQuery: Send + Sync {
    /// Aggregate results as seen by `viewer`.
    async fn summary(&self, viewer: &CurrentUser) -> Result<DashboardSummary, Error>;
}
