//! Peer project voting backend.
//!
//! Students sign in with an institutional email, submit one project each and
//! cast a three-project ballot for their peers' work.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
