//! Results dashboard handler.
//!
//! ```text
//! GET /api/v1/dashboard
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{BallotSelection, ChartEntry, DashboardSummary, Error, Participation};
use crate::inbound::http::ApiResult;
use crate::inbound::http::projects::ProjectResponse;
use crate::inbound::http::session::Viewer;
use crate::inbound::http::state::HttpState;

/// One chart bar.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChartEntryResponse {
    pub project_id: String,
    /// Name truncated to 20 characters plus `...`.
    pub label: String,
    pub name: String,
    pub votes: u64,
}

impl From<ChartEntry> for ChartEntryResponse {
    fn from(value: ChartEntry) -> Self {
        Self {
            project_id: value.project_id.to_string(),
            label: value.label,
            name: value.name,
            votes: value.votes,
        }
    }
}

/// Voter turnout against the configured cohort.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationResponse {
    pub distinct_voters: u64,
    pub total_eligible_voters: u64,
    #[schema(example = 50.0)]
    pub percentage: f64,
}

impl From<Participation> for ParticipationResponse {
    fn from(value: Participation) -> Self {
        Self {
            distinct_voters: value.distinct_voters,
            total_eligible_voters: value.total_eligible_voters,
            percentage: value.percentage,
        }
    }
}

/// A project on the caller's ballot.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BallotSelectionResponse {
    pub project_id: String,
    pub project_name: String,
    pub owner_name: String,
}

impl From<BallotSelection> for BallotSelectionResponse {
    fn from(value: BallotSelection) -> Self {
        Self {
            project_id: value.project_id.to_string(),
            project_name: value.project_name,
            owner_name: value.owner_name.to_string(),
        }
    }
}

/// Dashboard payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Most-voted first.
    pub chart: Vec<ChartEntryResponse>,
    pub participation: ParticipationResponse,
    pub project_count: u64,
    pub own_project: Option<ProjectResponse>,
    pub my_votes: Vec<BallotSelectionResponse>,
}

impl From<DashboardSummary> for DashboardResponse {
    fn from(value: DashboardSummary) -> Self {
        Self {
            chart: value.chart.into_iter().map(Into::into).collect(),
            participation: value.participation.into(),
            project_count: value.project_count,
            own_project: value.own_project.map(Into::into),
            my_votes: value.my_votes.into_iter().map(Into::into).collect(),
        }
    }
}

/// Vote chart, participation and the caller's own state.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard summary", body = DashboardResponse),
        (status = 401, description = "Login required", body = Error),
        (status = 500, description = "Caller's stored ballot is inconsistent", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["dashboard"],
    operation_id = "getDashboard"
)]
#[get("/dashboard")]
pub async fn get_dashboard(
    state: web::Data<HttpState>,
    Viewer(viewer): Viewer,
) -> ApiResult<web::Json<DashboardResponse>> {
    let summary = state.dashboard.summary(&viewer).await?;
    Ok(web::Json(summary.into()))
}
