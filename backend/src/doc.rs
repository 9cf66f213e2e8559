//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` handler, the health probes, and the
//! session cookie security scheme. Swagger UI serves it in debug builds and
//! `openapi-dump` prints it for client tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::auth::{LoginRequest, SessionResponse, SignupRequest, UserResponse};
use crate::inbound::http::ballots::{BallotRequest, BallotResponse};
use crate::inbound::http::dashboard::{
    BallotSelectionResponse, ChartEntryResponse, DashboardResponse, ParticipationResponse,
};
use crate::inbound::http::projects::{ProjectListingResponse, ProjectRequest, ProjectResponse};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login or /api/v1/auth/signup.",
            ))),
        );
    }
}

/// OpenAPI document for the voting API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Peer project voting API",
        description = "Submit one project per student and cast a three-project ballot.",
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::signup,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::current_session,
        crate::inbound::http::projects::submit_project,
        crate::inbound::http::projects::list_projects,
        crate::inbound::http::projects::list_candidates,
        crate::inbound::http::projects::own_project,
        crate::inbound::http::ballots::cast_ballot,
        crate::inbound::http::ballots::get_ballot,
        crate::inbound::http::dashboard::get_dashboard,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        SignupRequest,
        LoginRequest,
        UserResponse,
        SessionResponse,
        ProjectRequest,
        ProjectResponse,
        ProjectListingResponse,
        BallotRequest,
        BallotResponse,
        ChartEntryResponse,
        ParticipationResponse,
        BallotSelectionResponse,
        DashboardResponse,
    )),
    tags(
        (name = "auth", description = "Signup, login and sessions"),
        (name = "projects", description = "Project submission and listings"),
        (name = "ballot", description = "Casting and reading ballots"),
        (name = "dashboard", description = "Vote chart and participation"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
