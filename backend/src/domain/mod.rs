//! Domain primitives, rules and services.
//!
//! Purpose: hold every voting rule independent of transport and storage.
//! Types validate on construction; services talk to the outside world only
//! through the traits in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, Email, DisplayName, Credentials, EmailDomainPolicy: identity.
//! - Project, ProjectDraft, ProjectListing: submissions.
//! - Ballot, BallotState, Vote: ballots and stored rows.
//! - compute_tallies, compute_participation: pure aggregation.
//! - IdentityGateService, ProjectRegistryService, BallotEngineService,
//!   SequentialBallotWriter, DashboardService: use-case implementations.

pub mod auth;
pub mod ballot;
pub mod ballot_engine;
pub mod ballot_writer;
pub mod dashboard;
pub mod error;
pub mod identity_gate;
pub mod ports;
pub mod project;
pub mod project_registry;
pub mod tally;
pub mod trace_id;
pub mod user;

pub use self::auth::{
    AccessToken, AuthEvent, AuthIdentity, AuthSession, Credentials, CredentialsValidationError,
    CurrentUser, DEFAULT_ALLOWED_EMAIL_SUFFIX, EmailDomainPolicy,
};
pub use self::ballot::{
    BALLOT_SIZE, Ballot, BallotAnomaly, BallotRuleViolation, BallotState, Vote,
};
pub use self::ballot_engine::BallotEngineService;
pub use self::ballot_writer::{DEFAULT_BALLOT_WRITE_RETRIES, SequentialBallotWriter};
pub use self::dashboard::{
    BallotSelection, CHART_LABEL_MAX, ChartEntry, DashboardService, DashboardSummary, chart_label,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::identity_gate::IdentityGateService;
pub use self::project::{
    EXAMPLE_MAX, FieldViolation, Project, ProjectDraft, ProjectField, ProjectId, ProjectListing,
    ProjectSubmission, ProjectValidationError, SUMMARY_MAX, TECHNIQUES_MAX,
};
pub use self::project_registry::ProjectRegistryService;
pub use self::tally::{Participation, ProjectTally, compute_participation, compute_tallies};
pub use self::trace_id::TraceId;
pub use self::user::{DISPLAY_NAME_MAX, DisplayName, Email, User, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use vote_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::unauthorized("log in first"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
