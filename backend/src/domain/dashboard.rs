//! Results dashboard: chart data, participation and the viewer's own state.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::ports::{DashboardQuery, ProjectRepository, VoteRepository};
use crate::domain::{
    BallotState, CurrentUser, DisplayName, Error, Participation, Project, ProjectId,
    ProjectListing, compute_participation, compute_tallies,
};

/// Longest chart label kept before truncation.
pub const CHART_LABEL_MAX: usize = 20;

/// Shorten `name` to [`CHART_LABEL_MAX`] characters plus `...` when longer.
///
/// # Examples
/// ```
/// use vote_backend::domain::chart_label;
///
/// assert_eq!(chart_label("Short"), "Short");
/// assert_eq!(chart_label("A very long project title"), "A very long project ...");
/// ```
#[must_use]
pub fn chart_label(name: &str) -> String {
    if name.chars().count() > CHART_LABEL_MAX {
        let mut label: String = name.chars().take(CHART_LABEL_MAX).collect();
        label.push_str("...");
        label
    } else {
        name.to_owned()
    }
}

/// One bar of the results chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartEntry {
    /// Counted project.
    pub project_id: ProjectId,
    /// Display label, possibly truncated.
    pub label: String,
    /// Full project name.
    pub name: String,
    /// Votes received.
    pub votes: u64,
}

/// A project the viewer selected, with names resolved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BallotSelection {
    /// Selected project.
    pub project_id: ProjectId,
    /// Project name.
    pub project_name: String,
    /// Project owner's display name.
    pub owner_name: DisplayName,
}

/// Everything the dashboard screen shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Chart entries, most-voted first.
    pub chart: Vec<ChartEntry>,
    /// Participation against the configured cohort.
    pub participation: Participation,
    /// Number of submitted projects.
    pub project_count: u64,
    /// The viewer's project, if submitted.
    pub own_project: Option<Project>,
    /// The viewer's current selections; empty when not voted.
    pub my_votes: Vec<BallotSelection>,
}

/// [`DashboardQuery`] assembled from listings and raw vote rows.
#[derive(Clone)]
pub struct DashboardService<P, V> {
    projects: Arc<P>,
    votes: Arc<V>,
    total_eligible_voters: u64,
}

impl<P, V> DashboardService<P, V> {
    /// Create a dashboard over the given stores for a fixed cohort size.
    pub fn new(projects: Arc<P>, votes: Arc<V>, total_eligible_voters: u64) -> Self {
        Self {
            projects,
            votes,
            total_eligible_voters,
        }
    }
}

fn selections(state: &BallotState, listings: &[ProjectListing]) -> Vec<BallotSelection> {
    let by_id: HashMap<&ProjectId, &ProjectListing> = listings
        .iter()
        .map(|listing| (&listing.project.id, listing))
        .collect();
    state
        .project_ids()
        .iter()
        .filter_map(|id| by_id.get(id))
        .map(|listing| BallotSelection {
            project_id: listing.project.id,
            project_name: listing.project.name.clone(),
            owner_name: listing.owner_name.clone(),
        })
        .collect()
}

#[async_trait]
impl<P, V> DashboardQuery for DashboardService<P, V>
where
    P: ProjectRepository,
    V: VoteRepository,
{
    async fn summary(&self, viewer: &CurrentUser) -> Result<DashboardSummary, Error> {
        let listings = self.projects.list_listings().await?;
        let votes = self.votes.all_votes().await?;
        let rows = self.votes.ballot_rows(viewer.id()).await?;
        let state = BallotState::from_stored(*viewer.id(), rows)?;

        let projects: Vec<Project> = listings.iter().map(|l| l.project.clone()).collect();
        let chart = compute_tallies(&projects, &votes)
            .into_iter()
            .map(|tally| ChartEntry {
                project_id: tally.project_id,
                label: chart_label(&tally.name),
                name: tally.name,
                votes: tally.votes,
            })
            .collect();

        Ok(DashboardSummary {
            chart,
            participation: compute_participation(self.total_eligible_voters, &votes),
            project_count: projects.len() as u64,
            own_project: projects
                .iter()
                .find(|project| project.owner_id == *viewer.id())
                .cloned(),
            my_votes: selections(&state, &listings),
        })
    }
}
