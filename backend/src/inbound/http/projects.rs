//! Project submission and listing handlers.
//!
//! ```text
//! POST /api/v1/projects             Submit the caller's project
//! GET  /api/v1/projects             Every project, newest first
//! GET  /api/v1/projects/candidates  Projects the caller may vote for
//! GET  /api/v1/projects/mine        The caller's project or null
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, Project, ProjectDraft, ProjectListing};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::Viewer;
use crate::inbound::http::state::HttpState;

/// Submission form body. Fields are validated server-side.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    #[schema(example = "Bike sharing map")]
    pub name: String,
    /// Up to 500 characters.
    pub summary: String,
    /// Up to 600 characters.
    pub techniques: String,
    /// Up to 1000 characters.
    pub example: String,
    /// Optional absolute URL; blank means none.
    #[serde(default)]
    pub image_url: Option<String>,
}

impl From<ProjectRequest> for ProjectDraft {
    fn from(value: ProjectRequest) -> Self {
        Self {
            name: value.name,
            summary: value.summary,
            techniques: value.techniques,
            example: value.example,
            image_url: value.image_url,
        }
    }
}

/// A stored project.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    #[schema(example = "0b8f6c2e-3f7e-4d52-9a8e-5a1c3f0c7d11")]
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub summary: String,
    pub techniques: String,
    pub example: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(value: Project) -> Self {
        Self {
            id: value.id.to_string(),
            owner_id: value.owner_id.to_string(),
            name: value.name,
            summary: value.summary,
            techniques: value.techniques,
            example: value.example,
            image_url: value.image_url.map(String::from),
            created_at: value.created_at,
        }
    }
}

/// A project with its owner and current vote count.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListingResponse {
    pub project: ProjectResponse,
    pub owner_name: String,
    pub owner_email: String,
    pub vote_count: u64,
}

impl From<ProjectListing> for ProjectListingResponse {
    fn from(value: ProjectListing) -> Self {
        Self {
            owner_name: value.owner_name.to_string(),
            owner_email: value.owner_email.to_string(),
            vote_count: value.vote_count,
            project: ProjectResponse::from(value.project),
        }
    }
}

fn listing_responses(listings: Vec<ProjectListing>) -> Vec<ProjectListingResponse> {
    listings
        .into_iter()
        .map(ProjectListingResponse::from)
        .collect()
}

/// Submit the caller's project. Each user may submit once.
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = ProjectRequest,
    responses(
        (status = 201, description = "Project stored", body = ProjectResponse),
        (status = 401, description = "Login required", body = Error),
        (status = 409, description = "Caller already submitted a project", body = Error),
        (status = 422, description = "Field validation failed", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["projects"],
    operation_id = "submitProject"
)]
#[post("/projects")]
pub async fn submit_project(
    state: web::Data<HttpState>,
    Viewer(viewer): Viewer,
    payload: web::Json<ProjectRequest>,
) -> ApiResult<HttpResponse> {
    let draft = ProjectDraft::from(payload.into_inner());
    let project = state.projects.submit_project(&viewer, &draft).await?;
    Ok(HttpResponse::Created().json(ProjectResponse::from(project)))
}

/// List every project with owner details and vote counts.
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    responses(
        (status = 200, description = "Projects, newest first", body = [ProjectListingResponse]),
        (status = 401, description = "Login required", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["projects"],
    operation_id = "listProjects"
)]
#[get("/projects")]
pub async fn list_projects(
    state: web::Data<HttpState>,
    _viewer: Viewer,
) -> ApiResult<web::Json<Vec<ProjectListingResponse>>> {
    let listings = state.projects.list_all_projects().await?;
    Ok(web::Json(listing_responses(listings)))
}

/// Projects the caller may vote for: everything except their own.
#[utoipa::path(
    get,
    path = "/api/v1/projects/candidates",
    responses(
        (status = 200, description = "Voteable projects", body = [ProjectListingResponse]),
        (status = 401, description = "Login required", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["projects"],
    operation_id = "listCandidates"
)]
#[get("/projects/candidates")]
pub async fn list_candidates(
    state: web::Data<HttpState>,
    Viewer(viewer): Viewer,
) -> ApiResult<web::Json<Vec<ProjectListingResponse>>> {
    let listings = state.projects.list_candidates(&viewer).await?;
    Ok(web::Json(listing_responses(listings)))
}

/// The caller's own project, or `null` before submission.
#[utoipa::path(
    get,
    path = "/api/v1/projects/mine",
    responses(
        (status = 200, description = "Own project or null", body = Option<ProjectResponse>),
        (status = 401, description = "Login required", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["projects"],
    operation_id = "getOwnProject"
)]
#[get("/projects/mine")]
pub async fn own_project(
    state: web::Data<HttpState>,
    Viewer(viewer): Viewer,
) -> ApiResult<web::Json<Option<ProjectResponse>>> {
    let project = state.projects.get_project_for(viewer.id()).await?;
    Ok(web::Json(project.map(ProjectResponse::from)))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for project handlers.
    use super::*;
    use crate::domain::ports::MockProjectRegistry;
    use crate::domain::{DisplayName, Email, UserId};
    use crate::inbound::http::test_utils::{
        MockPorts, identity_for, login_request, session_cookie, state_from_mocks,
        test_session_middleware, viewer,
    };
    use crate::inbound::http::auth::login;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::{Value, json};

    fn draft_body() -> Value {
        json!({
            "name": "Bike sharing map",
            "summary": "Maps bike stations",
            "techniques": "Rust",
            "example": "Find the nearest dock",
        })
    }

    fn stored_project(owner: UserId, name: &str) -> Project {
        ProjectDraft {
            name: name.into(),
            summary: "s".into(),
            techniques: "t".into(),
            example: "e".into(),
            image_url: None,
        }
        .validate()
        .expect("valid draft")
        .into_project(owner, Utc::now())
    }

    fn listing(name: &str) -> ProjectListing {
        ProjectListing {
            project: stored_project(UserId::random(), name),
            owner_name: DisplayName::new("Grace").expect("name"),
            owner_email: Email::new("grace@aluno.univesp.br").expect("email"),
            vote_count: 2,
        }
    }

    async fn call(
        projects: MockProjectRegistry,
        request: test::TestRequest,
        logged_in: bool,
    ) -> actix_web::dev::ServiceResponse {
        let state = state_from_mocks(MockPorts {
            identity: identity_for(&viewer()),
            projects,
            ..MockPorts::default()
        });
        let app = test::init_service(
            App::new()
                .app_data(state)
                .wrap(test_session_middleware())
                .service(
                    web::scope("/api/v1")
                        .service(login)
                        .service(submit_project)
                        .service(list_projects)
                        .service(list_candidates)
                        .service(own_project),
                ),
        )
        .await;
        let request = if logged_in {
            let res = test::call_service(&app, login_request().to_request()).await;
            request.cookie(session_cookie(&res))
        } else {
            request
        };
        test::call_service(&app, request.to_request()).await
    }

    #[actix_web::test]
    async fn submit_requires_login() {
        let res = call(
            MockProjectRegistry::new(),
            test::TestRequest::post()
                .uri("/api/v1/projects")
                .set_json(draft_body()),
            false,
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn submit_returns_created_project() {
        let me = viewer();
        let mut projects = MockProjectRegistry::new();
        let owner = *me.id();
        projects
            .expect_submit_project()
            .withf(move |caller, draft| *caller.id() == owner && draft.name == "Bike sharing map")
            .return_once(move |_, draft| {
                Ok(draft
                    .validate()
                    .expect("valid draft")
                    .into_project(owner, Utc::now()))
            });

        let res = call(
            projects,
            test::TestRequest::post()
                .uri("/api/v1/projects")
                .set_json(draft_body()),
            true,
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: ProjectResponse = test::read_body_json(res).await;
        assert_eq!(body.owner_id, me.id().to_string());
        assert!(body.image_url.is_none());
    }

    #[actix_web::test]
    async fn duplicate_submission_is_conflict() {
        let mut projects = MockProjectRegistry::new();
        projects
            .expect_submit_project()
            .return_once(|_, _| Err(Error::conflict("already submitted")));
        let res = call(
            projects,
            test::TestRequest::post()
                .uri("/api/v1/projects")
                .set_json(draft_body()),
            true,
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn validation_failure_is_unprocessable() {
        let mut projects = MockProjectRegistry::new();
        projects.expect_submit_project().return_once(|_, draft| {
            Err(Error::from(draft.validate().expect_err("blank name")))
        });
        let mut body = draft_body();
        body["name"] = json!("  ");
        let res = call(
            projects,
            test::TestRequest::post()
                .uri("/api/v1/projects")
                .set_json(body),
            true,
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let value: Value = test::read_body_json(res).await;
        assert_eq!(value["details"]["fields"][0]["field"], "name");
    }

    #[actix_web::test]
    async fn invalid_image_url_is_named_as_sent() {
        let mut projects = MockProjectRegistry::new();
        projects.expect_submit_project().return_once(|_, draft| {
            Err(Error::from(draft.validate().expect_err("bad url")))
        });
        let mut body = draft_body();
        body["imageUrl"] = json!("not a url");
        let res = call(
            projects,
            test::TestRequest::post()
                .uri("/api/v1/projects")
                .set_json(&body),
            true,
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let value: Value = test::read_body_json(res).await;
        let field = value["details"]["fields"][0]["field"]
            .as_str()
            .expect("field name");
        assert_eq!(field, "imageUrl");
        assert!(body.get(field).is_some());
    }

    #[actix_web::test]
    async fn candidates_are_listed() {
        let mut projects = MockProjectRegistry::new();
        projects
            .expect_list_candidates()
            .return_once(|_| Ok(vec![listing("Other")]));
        let res = call(
            projects,
            test::TestRequest::get().uri("/api/v1/projects/candidates"),
            true,
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Vec<ProjectListingResponse> = test::read_body_json(res).await;
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].owner_name, "Grace");
        assert_eq!(body[0].vote_count, 2);
    }

    #[actix_web::test]
    async fn all_projects_are_listed() {
        let mut projects = MockProjectRegistry::new();
        projects
            .expect_list_all_projects()
            .return_once(|| Ok(vec![listing("Newest"), listing("Oldest")]));
        let res = call(
            projects,
            test::TestRequest::get().uri("/api/v1/projects"),
            true,
        )
        .await;
        let body: Vec<ProjectListingResponse> = test::read_body_json(res).await;
        let names: Vec<_> = body.iter().map(|l| l.project.name.as_str()).collect();
        assert_eq!(names, ["Newest", "Oldest"]);
    }

    #[actix_web::test]
    async fn missing_own_project_is_null() {
        let mut projects = MockProjectRegistry::new();
        projects.expect_get_project_for().return_once(|_| Ok(None));
        let res = call(
            projects,
            test::TestRequest::get().uri("/api/v1/projects/mine"),
            true,
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert!(body.is_null());
    }

    #[actix_web::test]
    async fn store_outage_is_unavailable() {
        let mut projects = MockProjectRegistry::new();
        projects
            .expect_list_all_projects()
            .return_once(|| Err(Error::store_unavailable("pool exhausted")));
        let res = call(
            projects,
            test::TestRequest::get().uri("/api/v1/projects"),
            true,
        )
        .await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
