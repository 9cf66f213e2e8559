//! Project records and submission validation.
//!
//! A [`ProjectDraft`] carries raw form input. [`ProjectDraft::validate`]
//! checks every field and reports all violations at once, producing a
//! [`ProjectSubmission`] ready for persistence.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;
use uuid::Uuid;

use super::{DisplayName, Email, Error, UserId};

/// Maximum characters accepted for the summary.
pub const SUMMARY_MAX: usize = 500;
/// Maximum characters accepted for the techniques description.
pub const TECHNIQUES_MAX: usize = 600;
/// Maximum characters accepted for the example description.
pub const EXAMPLE_MAX: usize = 1000;

/// Stable project identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(Uuid);

impl ProjectId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for ProjectId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Submission form fields, named as clients send them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectField {
    /// Project name.
    Name,
    /// Short summary.
    Summary,
    /// Techniques used.
    Techniques,
    /// Example application.
    Example,
    /// Optional illustrative image.
    ImageUrl,
}

impl ProjectField {
    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Summary => "summary",
            Self::Techniques => "techniques",
            Self::Example => "example",
            Self::ImageUrl => "imageUrl",
        }
    }
}

impl fmt::Display for ProjectField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One broken rule on one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldViolation {
    /// Field was blank once trimmed.
    Required(ProjectField),
    /// Field exceeded its character limit.
    TooLong {
        /// Offending field.
        field: ProjectField,
        /// Allowed maximum.
        max: usize,
        /// Observed length.
        actual: usize,
    },
    /// Image URL did not parse.
    InvalidUrl,
}

impl FieldViolation {
    /// Field the violation applies to.
    #[must_use]
    pub const fn field(&self) -> ProjectField {
        match self {
            Self::Required(field) | Self::TooLong { field, .. } => *field,
            Self::InvalidUrl => ProjectField::ImageUrl,
        }
    }

    /// Stable machine-readable violation code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Required(_) => "required",
            Self::TooLong { .. } => "too_long",
            Self::InvalidUrl => "invalid_url",
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required(field) => write!(f, "{field} is required"),
            Self::TooLong { field, max, .. } => {
                write!(f, "{field} must be at most {max} characters")
            }
            Self::InvalidUrl => write!(f, "imageUrl must be a valid URL"),
        }
    }
}

/// Every rule a draft broke, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectValidationError {
    violations: Vec<FieldViolation>,
}

impl ProjectValidationError {
    /// Violations in the order fields were checked.
    #[must_use]
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Whether any violation names `field`.
    #[must_use]
    pub fn names(&self, field: ProjectField) -> bool {
        self.violations.iter().any(|v| v.field() == field)
    }
}

impl fmt::Display for ProjectValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.violations.iter().map(|v| v.field().as_str()).collect();
        write!(f, "invalid project fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ProjectValidationError {}

impl From<ProjectValidationError> for Error {
    fn from(value: ProjectValidationError) -> Self {
        let fields: Vec<_> = value
            .violations
            .iter()
            .map(|violation| {
                json!({
                    "field": violation.field().as_str(),
                    "code": violation.code(),
                    "message": violation.to_string(),
                })
            })
            .collect();
        Self::validation(value.to_string()).with_details(json!({ "fields": fields }))
    }
}

/// Raw project form input as typed by the owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    /// Project name.
    pub name: String,
    /// Short summary.
    pub summary: String,
    /// Techniques used.
    pub techniques: String,
    /// Example application.
    pub example: String,
    /// Optional illustrative image; blank means none.
    #[serde(default)]
    pub image_url: Option<String>,
}

fn check_text(
    violations: &mut Vec<FieldViolation>,
    field: ProjectField,
    value: &str,
    max: Option<usize>,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        violations.push(FieldViolation::Required(field));
        return String::new();
    }
    if let Some(max) = max {
        let actual = trimmed.chars().count();
        if actual > max {
            violations.push(FieldViolation::TooLong { field, max, actual });
        }
    }
    trimmed.to_owned()
}

impl ProjectDraft {
    /// Validate every field, collecting all violations.
    ///
    /// # Examples
    /// ```
    /// use vote_backend::domain::{ProjectDraft, ProjectField};
    ///
    /// let draft = ProjectDraft {
    ///     name: " ".into(),
    ///     summary: "s".repeat(501),
    ///     techniques: "rust".into(),
    ///     example: "demo".into(),
    ///     image_url: Some("not a url".into()),
    /// };
    /// let err = draft.validate().unwrap_err();
    /// assert!(err.names(ProjectField::Name));
    /// assert!(err.names(ProjectField::Summary));
    /// assert!(err.names(ProjectField::ImageUrl));
    /// assert_eq!(err.violations().len(), 3);
    /// ```
    pub fn validate(&self) -> Result<ProjectSubmission, ProjectValidationError> {
        let mut violations = Vec::new();
        let name = check_text(&mut violations, ProjectField::Name, &self.name, None);
        let summary = check_text(
            &mut violations,
            ProjectField::Summary,
            &self.summary,
            Some(SUMMARY_MAX),
        );
        let techniques = check_text(
            &mut violations,
            ProjectField::Techniques,
            &self.techniques,
            Some(TECHNIQUES_MAX),
        );
        let example = check_text(
            &mut violations,
            ProjectField::Example,
            &self.example,
            Some(EXAMPLE_MAX),
        );

        let image_url = match self.image_url.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match Url::parse(raw) {
                Ok(url) => Some(url),
                Err(_) => {
                    violations.push(FieldViolation::InvalidUrl);
                    None
                }
            },
        };

        if !violations.is_empty() {
            return Err(ProjectValidationError { violations });
        }

        Ok(ProjectSubmission {
            name,
            summary,
            techniques,
            example,
            image_url,
        })
    }
}

/// A draft that passed validation; text fields are trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSubmission {
    name: String,
    summary: String,
    techniques: String,
    example: String,
    image_url: Option<Url>,
}

impl ProjectSubmission {
    /// Materialise a project owned by `owner_id`.
    #[must_use]
    pub fn into_project(self, owner_id: UserId, created_at: DateTime<Utc>) -> Project {
        Project {
            id: ProjectId::random(),
            owner_id,
            name: self.name,
            summary: self.summary,
            techniques: self.techniques,
            example: self.example,
            image_url: self.image_url,
            created_at,
        }
    }
}

/// A stored student project.
///
/// ## Invariants
/// - At most one project exists per `owner_id`.
/// - The owner can never vote for their own project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Identifier.
    pub id: ProjectId,
    /// Submitting user.
    pub owner_id: UserId,
    /// Project name.
    pub name: String,
    /// Short summary.
    pub summary: String,
    /// Techniques used.
    pub techniques: String,
    /// Example application.
    pub example: String,
    /// Optional illustrative image.
    pub image_url: Option<Url>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

/// A project joined with its owner's profile and current vote count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListing {
    /// The project.
    pub project: Project,
    /// Owner's display name.
    pub owner_name: DisplayName,
    /// Owner's email.
    pub owner_email: Email,
    /// Votes currently targeting the project.
    pub vote_count: u64,
}
