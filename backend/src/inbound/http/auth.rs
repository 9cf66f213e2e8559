//! Authentication API handlers.
//!
//! ```text
//! POST /api/v1/auth/signup  {"email":"ada@aluno.univesp.br","password":"…","name":"Ada"}
//! POST /api/v1/auth/login   {"email":"ada@aluno.univesp.br","password":"…"}
//! POST /api/v1/auth/logout
//! GET  /api/v1/auth/session
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::SignedIn;
use crate::domain::{
    Credentials, CredentialsValidationError, DisplayName, Error, User, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Signup request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[schema(example = "ada@aluno.univesp.br")]
    pub email: String,
    pub password: String,
    /// Display name shown to other voters.
    #[schema(example = "Ada Lovelace")]
    pub name: String,
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "ada@aluno.univesp.br")]
    pub email: String,
    pub password: String,
}

/// Public profile fields.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub email: String,
    pub name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            email: user.email().to_string(),
            name: user.name().to_string(),
        }
    }
}

/// Current session as seen by the client.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: UserResponse,
    pub expires_at: DateTime<Utc>,
}

impl From<&SignedIn> for SessionResponse {
    fn from(value: &SignedIn) -> Self {
        Self {
            user: UserResponse::from(&value.user),
            expires_at: value.session.expires_at,
        }
    }
}

fn map_credentials_error(err: CredentialsValidationError) -> Error {
    let (field, code) = match &err {
        CredentialsValidationError::Email(UserValidationError::EmptyEmail) => {
            ("email", "empty_email")
        }
        CredentialsValidationError::Email(_) => ("email", "malformed_email"),
        CredentialsValidationError::EmptyPassword => ("password", "empty_password"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

fn parse_name(raw: &str) -> Result<DisplayName, Error> {
    DisplayName::new(raw).map_err(|err| {
        let code = match err {
            UserValidationError::EmptyDisplayName => "empty_name",
            _ => "invalid_name",
        };
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "name", "code": code }))
    })
}

/// Create an account for an institutional email and start a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Malformed request", body = Error),
        (status = 403, description = "Email domain not allowed", body = Error),
        (status = 409, description = "Account already exists", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
#[post("/auth/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let credentials = Credentials::try_from_parts(&payload.email, &payload.password)
        .map_err(map_credentials_error)?;
    let name = parse_name(&payload.name)?;
    let signed_in = state.identity.register(&credentials, name).await?;
    session.persist_token(&signed_in.session.token)?;
    Ok(HttpResponse::Created().json(SessionResponse::from(&signed_in)))
}

/// Authenticate and start a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = SessionResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Malformed request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 403, description = "Email domain not allowed", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<SessionResponse>> {
    let credentials = Credentials::try_from_parts(&payload.email, &payload.password)
        .map_err(map_credentials_error)?;
    let signed_in = state.identity.login(&credentials).await?;
    session.persist_token(&signed_in.session.token)?;
    Ok(web::Json(SessionResponse::from(&signed_in)))
}

/// End the session. Always succeeds.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Session ended")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    if let Ok(Some(token)) = session.token() {
        state.identity.logout(&token).await;
    }
    session.clear();
    HttpResponse::NoContent().finish()
}

/// The signed-in user, or 401 when there is no live session.
#[utoipa::path(
    get,
    path = "/api/v1/auth/session",
    responses(
        (status = 200, description = "Active session", body = SessionResponse),
        (status = 401, description = "No active session", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentSession"
)]
#[get("/auth/session")]
pub async fn current_session(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<SessionResponse>> {
    let token = session
        .token()?
        .ok_or_else(|| Error::unauthorized("login required"))?;
    match state.identity.session(&token).await? {
        Some(signed_in) => Ok(web::Json(SessionResponse::from(&signed_in))),
        None => {
            session.clear();
            Err(Error::unauthorized("session expired; log in again"))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for auth handlers.
    use super::*;
    use crate::domain::ports::MockIdentityGate;
    use crate::inbound::http::test_utils::{
        TEST_TOKEN, identity_for, login_request, session_cookie, signed_in, state_with_identity,
        test_session_middleware, viewer,
    };
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::Value;

    fn test_app(
        identity: MockIdentityGate,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(state_with_identity(identity))
            .wrap(test_session_middleware())
            .service(
                web::scope("/api/v1")
                    .service(signup)
                    .service(login)
                    .service(logout)
                    .service(current_session),
            )
    }

    #[rstest]
    #[case(json!({ "email": "", "password": "pw" }), "email", "empty_email")]
    #[case(json!({ "email": "nope", "password": "pw" }), "email", "malformed_email")]
    #[case(json!({ "email": "ada@aluno.univesp.br", "password": "" }), "password", "empty_password")]
    #[actix_web::test]
    async fn malformed_login_is_bad_request(
        #[case] body: Value,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let app = test::init_service(test_app(MockIdentityGate::new())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let value: Value = test::read_body_json(res).await;
        assert_eq!(value["code"], "invalid_request");
        assert_eq!(value["details"]["field"], field);
        assert_eq!(value["details"]["code"], code);
    }

    #[rstest]
    #[case(json!({ "email": "ada@aluno.univesp.br", "password": "pw", "name": "   " }))]
    #[case(json!({ "email": "ada@aluno.univesp.br", "password": "pw" }))]
    #[actix_web::test]
    async fn signup_requires_a_name(#[case] body: Value) {
        let app = test::init_service(test_app(MockIdentityGate::new())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/signup")
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn blank_name_is_reported_on_the_name_field() {
        let app = test::init_service(test_app(MockIdentityGate::new())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/signup")
                .set_json(json!({ "email": "ada@aluno.univesp.br", "password": "pw", "name": "" }))
                .to_request(),
        )
        .await;
        let value: Value = test::read_body_json(res).await;
        assert_eq!(value["details"]["field"], "name");
        assert_eq!(value["details"]["code"], "empty_name");
    }

    #[actix_web::test]
    async fn domain_rejection_is_forbidden() {
        let mut identity = MockIdentityGate::new();
        identity
            .expect_register()
            .return_once(|_, _| Err(Error::domain_rejected("only @aluno.univesp.br")));
        let app = test::init_service(test_app(identity)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/signup")
                .set_json(json!({ "email": "ada@gmail.com", "password": "pw", "name": "Ada" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn signup_passes_trimmed_name_and_sets_cookie() {
        let me = viewer();
        let mut identity = MockIdentityGate::new();
        let registered = signed_in(&me);
        identity
            .expect_register()
            .withf(|_, name| name.as_ref() == "Ada L")
            .return_once(move |_, _| Ok(registered));
        let app = test::init_service(test_app(identity)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/signup")
                .set_json(json!({
                    "email": "ada@aluno.univesp.br",
                    "password": "pw",
                    "name": "  Ada L "
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let _ = session_cookie(&res);
        let body: SessionResponse = test::read_body_json(res).await;
        assert_eq!(body.user.id, me.id().to_string());
    }

    #[actix_web::test]
    async fn login_then_session_round_trips() {
        let me = viewer();
        let mut identity = identity_for(&me);
        let live = signed_in(&me);
        identity
            .expect_session()
            .withf(|token| token.as_ref() == TEST_TOKEN)
            .return_once(move |_| Ok(Some(live)));
        let app = test::init_service(test_app(identity)).await;

        let res = test::call_service(&app, login_request().to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = session_cookie(&res);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/auth/session")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: SessionResponse = test::read_body_json(res).await;
        assert_eq!(body.user.email, "ada@aluno.univesp.br");
        assert_eq!(body.user.name, "ada");
    }

    #[actix_web::test]
    async fn logout_without_session_is_no_content() {
        let app = test::init_service(test_app(MockIdentityGate::new())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/logout")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn logout_calls_provider_and_drops_session() {
        let me = viewer();
        let mut identity = identity_for(&me);
        identity.expect_logout().times(1).return_const(());
        let app = test::init_service(test_app(identity)).await;

        let res = test::call_service(&app, login_request().to_request()).await;
        let cookie = session_cookie(&res);
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/logout")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn session_without_cookie_is_unauthorised() {
        let app = test::init_service(test_app(MockIdentityGate::new())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/auth/session")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
