//! User aggregate and its validated value objects.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors raised by the user value-object constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyUsername,
    UsernameTooShort { min: usize },
    UsernameTooLong { max: usize },
    UsernameInvalidCharacters,
    InvalidEmail,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooShort { min } => {
                write!(f, "username must be at least {min} characters")
            }
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => {
                write!(f, "username may only contain letters, numbers, or underscores")
            }
            Self::InvalidEmail => write!(f, "email address is not valid"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Minimum allowed length for a username.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 32;

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        Regex::new(r"^\w+$").expect("valid username pattern")
    })
}

/// In-game account name, unique per user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`] from raw input.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if trimmed.chars().count() < USERNAME_MIN {
            return Err(UserValidationError::UsernameTooShort { min: USERNAME_MIN });
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if !username_regex().is_match(trimmed) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Contact address used for the activation mail.
///
/// Deliverability is the mail relay's problem; this only rejects strings that
/// cannot possibly be addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`] from raw input.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        let Some((local, host)) = trimmed.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        if local.is_empty() || host.is_empty() || !host.contains('.') {
            return Err(UserValidationError::InvalidEmail);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
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

/// Application user.
///
/// ## Invariants
/// - `username` and `email` are unique across users (enforced by the
///   persistence layer).
/// - `password_hash` is a `pbkdf2_sha256$` record, never a raw password.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub password_hash: String,
    pub balance: Decimal,
    pub skin_hash: Option<String>,
    pub cloak_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Construct a freshly registered user with a zero balance.
    pub fn register(username: Username, email: Email, password_hash: String) -> Self {
        Self {
            id: UserId::random(),
            username,
            email,
            password_hash,
            balance: Decimal::ZERO,
            skin_hash: None,
            cloak_hash: None,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Username and email validation cases.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UserValidationError::EmptyUsername)]
    #[case("   ", UserValidationError::EmptyUsername)]
    #[case("ab", UserValidationError::UsernameTooShort { min: USERNAME_MIN })]
    #[case("has spaces", UserValidationError::UsernameInvalidCharacters)]
    #[case("dot.ted", UserValidationError::UsernameInvalidCharacters)]
    fn invalid_usernames(#[case] raw: &str, #[case] expected: UserValidationError) {
        let err = Username::new(raw).expect_err("invalid username must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("D3lph1")]
    #[case("  admin  ")]
    #[case("under_score")]
    fn valid_usernames_trim_input(#[case] raw: &str) {
        let name = Username::new(raw).expect("valid username");
        assert_eq!(name.as_ref(), raw.trim());
    }

    #[test]
    fn overlong_username_rejected() {
        let raw = "x".repeat(USERNAME_MAX + 1);
        let err = Username::new(&raw).expect_err("overlong username must fail");
        assert_eq!(err, UserValidationError::UsernameTooLong { max: USERNAME_MAX });
    }

    #[rstest]
    #[case("no-at-sign")]
    #[case("@host.com")]
    #[case("user@")]
    #[case("user@nodot")]
    #[case("spaced user@host.com")]
    fn invalid_emails(#[case] raw: &str) {
        assert_eq!(
            Email::new(raw).expect_err("invalid email must fail"),
            UserValidationError::InvalidEmail
        );
    }

    #[test]
    fn valid_email_roundtrips() {
        let email = Email::new(" d3lph1.contact@gmail.com ").expect("valid email");
        assert_eq!(email.as_ref(), "d3lph1.contact@gmail.com");
    }

    #[test]
    fn registered_user_starts_with_zero_balance() {
        let user = User::register(
            Username::new("D3lph1").expect("valid username"),
            Email::new("d3lph1.contact@gmail.com").expect("valid email"),
            "pbkdf2_sha256$1$salt$hash".to_owned(),
        );
        assert_eq!(user.balance, Decimal::ZERO);
        assert!(user.skin_hash.is_none());
        assert!(user.cloak_hash.is_none());
    }
}
