//! Password hashing and verification.
//!
//! Records use Django's `pbkdf2_sha256$<iterations>$<salt>$<base64>` layout so
//! hashes remain portable between deployments and admin tooling. Comparison is
//! constant-time.

use base64::{Engine as _, engine::general_purpose};
use constant_time_eq::constant_time_eq;
use pbkdf2::hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::Rng;
use rand::distributions::Alphanumeric;
use sha2::Sha256;
use zeroize::Zeroizing;

const ALGORITHM: &str = "pbkdf2_sha256";
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Work factor for new hashes.
pub const PBKDF2_ITERATIONS: u32 = 600_000;

/// Failure while deriving a password hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to derive password hash")]
pub struct PasswordHashError;

fn derive(password: &str, salt: &str, iterations: u32) -> Result<String, PasswordHashError> {
    let mut output = Zeroizing::new([0_u8; HASH_LEN]);
    pbkdf2::<Hmac<Sha256>>(
        password.as_bytes(),
        salt.as_bytes(),
        iterations,
        output.as_mut(),
    )
    .map_err(|_| PasswordHashError)?;
    Ok(general_purpose::STANDARD.encode(output.as_ref()))
}

/// Hash a raw password into a `pbkdf2_sha256$` record with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, PasswordHashError> {
    let salt: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LEN)
        .map(char::from)
        .collect();
    let encoded = derive(password, &salt, PBKDF2_ITERATIONS)?;
    Ok(format!("{ALGORITHM}${PBKDF2_ITERATIONS}${salt}${encoded}"))
}

/// Verify a raw password against a stored `pbkdf2_sha256$` record.
///
/// Unknown formats and malformed records verify as `false`, never as an
/// error: a corrupt hash must behave like a wrong password.
pub fn verify_password(password: &str, record: &str) -> bool {
    let parts: Vec<&str> = record.split('$').collect();
    let [algorithm, iterations, salt, expected] = parts.as_slice() else {
        return false;
    };
    if *algorithm != ALGORITHM {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    match derive(password, salt, iterations) {
        Ok(computed) => constant_time_eq(computed.as_bytes(), expected.as_bytes()),
        Err(PasswordHashError) => false,
    }
}

#[cfg(test)]
mod tests {
    //! Verification against Django-formatted hash records.
    use super::*;
    use rstest::rstest;

    // Keep test rounds low; the work factor is not under test.
    fn quick_record(password: &str) -> String {
        let encoded = derive(password, "testsalt", 10).expect("derivation succeeds");
        format!("{ALGORITHM}$10$testsalt${encoded}")
    }

    #[test]
    fn hash_then_verify_roundtrip() {
        let record = quick_record("123456");
        assert!(verify_password("123456", &record));
        assert!(!verify_password("654321", &record));
    }

    #[test]
    fn record_carries_expected_shape() {
        let record = quick_record("secret");
        let parts: Vec<&str> = record.split('$').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "pbkdf2_sha256");
        assert_eq!(parts[1], "10");
    }

    #[rstest]
    #[case("")]
    #[case("plainhash")]
    #[case("sha256$abc")]
    #[case("pbkdf2_sha256$notanumber$salt$hash")]
    #[case("pbkdf2_sha256$10$salt")]
    fn malformed_records_never_verify(#[case] record: &str) {
        assert!(!verify_password("secret", record));
    }

    #[test]
    fn fresh_hashes_use_distinct_salts() {
        let first = hash_password("secret").expect("hashing succeeds");
        let second = hash_password("secret").expect("hashing succeeds");
        assert_ne!(first, second);
        assert!(verify_password("secret", &first));
        assert!(verify_password("secret", &second));
    }
}
