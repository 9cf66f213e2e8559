//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod ballots;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod projects;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` endpoint on `cfg`.
///
/// The caller wraps the scope with session middleware and registers
/// [`state::HttpState`] as app data.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::signup)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::current_session)
        .service(projects::submit_project)
        .service(projects::list_projects)
        .service(projects::list_candidates)
        .service(projects::own_project)
        .service(ballots::cast_ballot)
        .service(ballots::get_ballot)
        .service(dashboard::get_dashboard);
}
