//! Account activation records and their one-time codes.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use uuid::Uuid;

use super::user::UserId;

/// Length of an activation code in hexadecimal characters.
pub const CODE_LEN: usize = 32;

/// Validation failure for raw activation-code input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("activation code must be {CODE_LEN} hexadecimal characters")]
pub struct InvalidActivationCode;

/// One-time code mailed to the user, unique while its activation is live.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActivationCode(String);

impl ActivationCode {
    /// Validate and wrap a code received from a request path.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, InvalidActivationCode> {
        let raw = raw.as_ref();
        if raw.len() != CODE_LEN || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(InvalidActivationCode);
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    /// Generate a fresh random code.
    pub fn generate() -> Self {
        let bytes: [u8; CODE_LEN / 2] = rand::thread_rng().r#gen();
        Self(hex::encode(bytes))
    }
}

impl AsRef<str> for ActivationCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ActivationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Pending or completed proof of account ownership for one user.
///
/// ## Invariants
/// - A user has at most one incomplete activation at a time.
/// - `completed_at` is set exactly when `completed` is true.
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    pub id: Uuid,
    pub user_id: UserId,
    pub code: ActivationCode,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Activation {
    /// Issue a fresh pending activation for a user.
    pub fn issue(user_id: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            code: ActivationCode::generate(),
            completed: false,
            created_at,
            completed_at: None,
        }
    }

    /// Mark the activation consumed.
    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.completed = true;
        self.completed_at = Some(at);
    }

    /// Whether the activation lapsed before being completed.
    ///
    /// Completed activations never expire; they are the proof of ownership.
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        !self.completed && now - self.created_at > ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn pending() -> Activation {
        Activation::issue(UserId::random(), Utc::now())
    }

    #[test]
    fn generated_codes_are_well_formed_and_distinct() {
        let first = ActivationCode::generate();
        let second = ActivationCode::generate();
        assert_ne!(first, second);
        assert_eq!(first.as_ref().len(), CODE_LEN);
        assert!(ActivationCode::parse(first.as_ref()).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("short")]
    #[case("zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz")]
    #[case("0123456789abcdef0123456789abcde")]
    fn malformed_codes_rejected(#[case] raw: &str) {
        assert_eq!(ActivationCode::parse(raw), Err(InvalidActivationCode));
    }

    #[test]
    fn parse_normalises_case() {
        let code = ActivationCode::parse("0123456789ABCDEF0123456789ABCDEF").expect("valid code");
        assert_eq!(code.as_ref(), "0123456789abcdef0123456789abcdef");
    }

    #[rstest]
    #[case(Duration::hours(1), Duration::minutes(30), false)]
    #[case(Duration::hours(1), Duration::hours(1), false)]
    #[case(Duration::hours(1), Duration::hours(2), true)]
    fn expiry_is_strictly_after_ttl(
        #[case] ttl: Duration,
        #[case] age: Duration,
        #[case] expired: bool,
    ) {
        let activation = pending();
        let now = activation.created_at + age;
        assert_eq!(activation.is_expired(ttl, now), expired);
    }

    #[test]
    fn completed_activation_never_expires() {
        let mut activation = pending();
        activation.complete(Utc::now());
        let later = activation.created_at + Duration::days(365);
        assert!(!activation.is_expired(Duration::hours(1), later));
    }
}
