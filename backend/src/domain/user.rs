//! User data model.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Identifier was empty.
    #[error("user id must not be empty")]
    EmptyId,
    /// Identifier was not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// Email was blank.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email did not have a `local@domain` shape.
    #[error("email must look like name@domain")]
    MalformedEmail,
    /// Display name was blank.
    #[error("display name must not be empty")]
    EmptyDisplayName,
    /// Display name exceeded the allowed length.
    #[error("display name must be at most {max} characters")]
    DisplayNameTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID, typically read back from storage.
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

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // One `@`, no whitespace, something on both sides.
        Regex::new(r"^[^@\s]+@[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Normalised email address: trimmed and lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    ///
    /// # Examples
    /// ```
    /// use vote_backend::domain::Email;
    ///
    /// let email = Email::new("  Ada@Aluno.Univesp.BR ").unwrap();
    /// assert_eq!(email.as_ref(), "ada@aluno.univesp.br");
    /// assert_eq!(email.local_part(), "ada");
    /// ```
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = email.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::MalformedEmail);
        }
        Ok(Self(normalised))
    }

    /// Text before the `@`.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or_default()
    }

    /// Whether the address ends with the given suffix, ignoring case.
    #[must_use]
    pub fn ends_with_suffix(&self, suffix: &str) -> bool {
        self.0.ends_with(suffix.trim().to_lowercase().as_str())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 80;

/// Human readable name shown next to a user's project and votes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`]; surrounding whitespace is dropped.
    pub fn new(display_name: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = display_name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Pick the provider-supplied name, falling back to the email local part.
    ///
    /// # Examples
    /// ```
    /// use vote_backend::domain::{DisplayName, Email};
    ///
    /// let email = Email::new("grace@aluno.univesp.br").unwrap();
    /// assert_eq!(DisplayName::or_email_local_part(None, &email).as_ref(), "grace");
    /// assert_eq!(DisplayName::or_email_local_part(Some("  "), &email).as_ref(), "grace");
    /// assert_eq!(
    ///     DisplayName::or_email_local_part(Some("Grace H"), &email).as_ref(),
    ///     "Grace H"
    /// );
    /// ```
    #[must_use]
    pub fn or_email_local_part(preferred: Option<&str>, email: &Email) -> Self {
        preferred
            .and_then(|name| Self::new(name).ok())
            .or_else(|| Self::new(email.local_part()).ok())
            .unwrap_or_else(|| Self(email.as_ref().to_owned()))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Profile record for an authenticated student.
///
/// ## Invariants
/// - `id` matches the identity provider's subject for this user.
/// - `email` is normalised; only `name` may change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    email: Email,
    name: DisplayName,
}

impl User {
    /// Build a new [`User`] from validated components.
    #[must_use]
    pub const fn new(id: UserId, email: Email, name: DisplayName) -> Self {
        Self { id, email, name }
    }

    /// Stable user identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Institutional email address.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Display name shown to other users.
    #[must_use]
    pub const fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Replace the display name.
    pub fn rename(&mut self, name: DisplayName) {
        self.name = name;
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for user value types.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UserValidationError::EmptyId)]
    #[case("not-a-uuid", UserValidationError::InvalidId)]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
    fn user_id_rejects_bad_input(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(UserId::new(raw).expect_err("invalid id"), expected);
    }

    #[rstest]
    #[case("", UserValidationError::EmptyEmail)]
    #[case("   ", UserValidationError::EmptyEmail)]
    #[case("no-at-sign", UserValidationError::MalformedEmail)]
    #[case("two@@signs.br", UserValidationError::MalformedEmail)]
    #[case("@aluno.univesp.br", UserValidationError::MalformedEmail)]
    #[case("spaced name@aluno.univesp.br", UserValidationError::MalformedEmail)]
    fn email_rejects_malformed_input(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(Email::new(raw).expect_err("invalid email"), expected);
    }

    #[rstest]
    #[case("ada@aluno.univesp.br", "@aluno.univesp.br", true)]
    #[case("ADA@ALUNO.UNIVESP.BR", "@aluno.univesp.br", true)]
    #[case("ada@aluno.univesp.br", "@ALUNO.univesp.br", true)]
    #[case("ada@gmail.com", "@aluno.univesp.br", false)]
    #[case("ada@univesp.br", "@aluno.univesp.br", false)]
    fn email_suffix_matching_ignores_case(
        #[case] raw: &str,
        #[case] suffix: &str,
        #[case] expected: bool,
    ) {
        let email = Email::new(raw).expect("valid email");
        assert_eq!(email.ends_with_suffix(suffix), expected);
    }

    #[rstest]
    fn display_name_trims_and_limits_length() {
        assert_eq!(
            DisplayName::new("  Ada  ").expect("valid name").as_ref(),
            "Ada"
        );
        let too_long = "a".repeat(DISPLAY_NAME_MAX + 1);
        assert_eq!(
            DisplayName::new(too_long).expect_err("too long"),
            UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX
            }
        );
    }

    #[rstest]
    fn user_serialises_camel_case() {
        let user = User::new(
            UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("id"),
            Email::new("ada@aluno.univesp.br").expect("email"),
            DisplayName::new("Ada").expect("name"),
        );
        let value = serde_json::to_value(&user).expect("serialise");
        assert_eq!(value["id"], "3fa85f64-5717-4562-b3fc-2c963f66afa6");
        assert_eq!(value["email"], "ada@aluno.univesp.br");
        assert_eq!(value["name"], "Ada");
    }
}
