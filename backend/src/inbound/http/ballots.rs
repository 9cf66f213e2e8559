//! Ballot handlers.
//!
//! ```text
//! PUT /api/v1/ballot  {"projectIds":["…","…","…"]}
//! GET /api/v1/ballot
//! ```
//!
//! `PUT` replaces any previous ballot wholesale.

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{BallotState, Error, ProjectId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::Viewer;
use crate::inbound::http::state::HttpState;

/// Ballot submission body.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BallotRequest {
    /// Exactly three distinct project ids, none owned by the caller.
    pub project_ids: Vec<String>,
}

/// The caller's ballot.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BallotResponse {
    pub project_ids: Vec<String>,
    pub has_voted: bool,
}

impl From<&BallotState> for BallotResponse {
    fn from(state: &BallotState) -> Self {
        Self {
            project_ids: state.project_ids().iter().map(ToString::to_string).collect(),
            has_voted: state.has_voted(),
        }
    }
}

fn parse_project_ids(raw: &[String]) -> Result<Vec<ProjectId>, Error> {
    raw.iter()
        .enumerate()
        .map(|(index, value)| {
            value.parse::<ProjectId>().map_err(|_| {
                Error::invalid_request(format!("projectIds[{index}] is not a valid id"))
                    .with_details(json!({
                        "field": "projectIds",
                        "index": index,
                        "value": value,
                        "code": "invalid_project_id",
                    }))
            })
        })
        .collect()
}

/// Cast or replace the caller's ballot.
#[utoipa::path(
    put,
    path = "/api/v1/ballot",
    request_body = BallotRequest,
    responses(
        (status = 200, description = "Ballot stored", body = BallotResponse),
        (status = 400, description = "Malformed project id", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 422, description = "Ballot breaks a voting rule", body = Error),
        (status = 500, description = "Ballot left incomplete; resubmit", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["ballot"],
    operation_id = "castBallot"
)]
#[put("/ballot")]
pub async fn cast_ballot(
    state: web::Data<HttpState>,
    Viewer(viewer): Viewer,
    payload: web::Json<BallotRequest>,
) -> ApiResult<web::Json<BallotResponse>> {
    let project_ids = parse_project_ids(&payload.project_ids)?;
    let ballot = state.ballots.cast_ballot(&viewer, &project_ids).await?;
    Ok(web::Json(BallotResponse::from(&BallotState::Voted(ballot))))
}

/// Read the caller's ballot.
#[utoipa::path(
    get,
    path = "/api/v1/ballot",
    responses(
        (status = 200, description = "Current ballot", body = BallotResponse),
        (status = 401, description = "Login required", body = Error),
        (status = 500, description = "Stored ballot is inconsistent", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["ballot"],
    operation_id = "getBallot"
)]
#[get("/ballot")]
pub async fn get_ballot(
    state: web::Data<HttpState>,
    Viewer(viewer): Viewer,
) -> ApiResult<web::Json<BallotResponse>> {
    let ballot = state.ballots.get_ballot_for(viewer.id()).await?;
    Ok(web::Json(BallotResponse::from(&ballot)))
}
