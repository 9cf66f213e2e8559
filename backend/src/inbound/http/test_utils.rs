//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::{test, web};
use chrono::{Duration, Utc};
use serde_json::json;

use crate::domain::ports::{
    MockBallotEngine, MockDashboardQuery, MockIdentityGate, MockProjectRegistry, SignedIn,
};
use crate::domain::{
    AccessToken, AuthIdentity, AuthSession, CurrentUser, DisplayName, Email, User, UserId,
};
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Mock ports handed to [`state_from_mocks`]; unset expectations panic.
#[derive(Default)]
pub struct MockPorts {
    pub identity: MockIdentityGate,
    pub projects: MockProjectRegistry,
    pub ballots: MockBallotEngine,
    pub dashboard: MockDashboardQuery,
}

/// Wrap mock ports into handler state.
pub fn state_from_mocks(ports: MockPorts) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        Arc::new(ports.identity),
        Arc::new(ports.projects),
        Arc::new(ports.ballots),
        Arc::new(ports.dashboard),
    ))
}

/// State where only the identity port is configured.
pub fn state_with_identity(identity: MockIdentityGate) -> web::Data<HttpState> {
    state_from_mocks(MockPorts {
        identity,
        ..MockPorts::default()
    })
}

/// Token handed out by [`identity_for`].
pub const TEST_TOKEN: &str = "test-token";

/// A fixed caller for handler tests.
pub fn viewer() -> CurrentUser {
    CurrentUser::new(
        UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("fixture id"),
        Email::new("ada@aluno.univesp.br").expect("fixture email"),
    )
}

/// Session and profile for `viewer`, as returned by a successful login.
pub fn signed_in(viewer: &CurrentUser) -> SignedIn {
    let identity = AuthIdentity {
        user_id: *viewer.id(),
        email: viewer.email().clone(),
        metadata_name: None,
    };
    SignedIn {
        session: AuthSession {
            token: AccessToken::new(TEST_TOKEN),
            identity,
            expires_at: Utc::now() + Duration::hours(2),
        },
        user: User::new(
            *viewer.id(),
            viewer.email().clone(),
            DisplayName::or_email_local_part(None, viewer.email()),
        ),
    }
}

/// Identity mock that logs `viewer` in and honours [`TEST_TOKEN`].
pub fn identity_for(viewer: &CurrentUser) -> MockIdentityGate {
    let mut identity = MockIdentityGate::new();
    let login_viewer = viewer.clone();
    identity
        .expect_login()
        .returning(move |_| Ok(signed_in(&login_viewer)));
    let session_viewer = viewer.clone();
    identity.expect_current_user().returning(move |token| {
        Ok((token.as_ref() == TEST_TOKEN).then(|| session_viewer.clone()))
    });
    identity
}

/// `POST /api/v1/auth/login` request for the fixture viewer.
pub fn login_request() -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "ada@aluno.univesp.br", "password": "secret" }))
}

/// Session cookie set on `res`.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}
