//! Account activation lifecycle: issue codes, consume them, answer
//! activation-state queries.
//!
//! Per user the states are `Unregistered -> PendingActivation -> Activated`.
//! Issuing replaces any live pending activation so a resend always mails a
//! working code, which also keeps "at most one incomplete activation per
//! user" true by construction.

use std::sync::Arc;

use chrono::Duration;
use mockable::Clock;

use super::activation::{Activation, ActivationCode};
use super::error::Error;
use super::ports::activation_repository::{ActivationPersistenceError, ActivationRepository};
use super::ports::user_repository::{UserPersistenceError, UserRepository};
use super::user::UserId;

/// How many times a clashing random code is re-rolled before giving up.
const CODE_RETRY_LIMIT: usize = 3;

fn map_activation_error(error: ActivationPersistenceError) -> Error {
    match error {
        ActivationPersistenceError::Connection { message } => Error::service_unavailable(message),
        ActivationPersistenceError::Query { message } => Error::internal(message),
        ActivationPersistenceError::DuplicateCode => {
            Error::internal("activation code collision persisted past retries")
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message }
        | UserPersistenceError::DuplicateUsername { username: message }
        | UserPersistenceError::DuplicateEmail { email: message } => Error::internal(message),
    }
}

fn user_not_found(id: &UserId) -> Error {
    Error::not_found("user_not_found", format!("user {id} does not exist"))
}

fn already_activated(id: &UserId) -> Error {
    Error::conflict(
        "already_activated",
        format!("user {id} is already activated"),
    )
}

/// Issues and consumes activation codes.
#[derive(Clone)]
pub struct Activator {
    users: Arc<dyn UserRepository>,
    activations: Arc<dyn ActivationRepository>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl Activator {
    /// Create an activator with the configured code lifetime.
    pub fn new(
        users: Arc<dyn UserRepository>,
        activations: Arc<dyn ActivationRepository>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            users,
            activations,
            clock,
            ttl,
        }
    }

    /// Issue a fresh pending activation for the user.
    ///
    /// Any live pending activation is invalidated and replaced. Fails with
    /// `user_not_found` for unknown users and `already_activated` for users
    /// who already completed activation.
    pub async fn make_activation(&self, user_id: &UserId) -> Result<Activation, Error> {
        if self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .is_none()
        {
            return Err(user_not_found(user_id));
        }
        if self.is_activated(user_id).await? {
            return Err(already_activated(user_id));
        }

        if let Some(pending) = self
            .activations
            .find_pending_for_user(user_id)
            .await
            .map_err(map_activation_error)?
        {
            self.activations
                .delete(&pending.id)
                .await
                .map_err(map_activation_error)?;
        }

        self.insert_with_fresh_code(user_id).await
    }

    /// Activate the user directly, bypassing the mailed code.
    ///
    /// Used by admin tooling; records a completed activation immediately.
    pub async fn activate(&self, user_id: &UserId) -> Result<Activation, Error> {
        let pending = self.make_activation(user_id).await?;
        let now = self.clock.utc();
        // The pending record was just issued, so the mark always wins here.
        let _ = self
            .activations
            .mark_completed(&pending.id, now)
            .await
            .map_err(map_activation_error)?;
        let mut completed = pending;
        completed.complete(now);
        Ok(completed)
    }

    /// Attempt to complete an activation by code.
    ///
    /// Returns `false` when the code is unknown, already consumed, or
    /// expired; completing the same code twice is a no-op returning `false`.
    pub async fn complete(&self, code: &ActivationCode) -> Result<bool, Error> {
        let Some(activation) = self
            .activations
            .find_by_code(code)
            .await
            .map_err(map_activation_error)?
        else {
            return Ok(false);
        };
        if activation.completed || self.is_expired(&activation) {
            return Ok(false);
        }

        // The repository arbitrates the race: if another request completed
        // the code between the read above and this write, it reports false.
        self.activations
            .mark_completed(&activation.id, self.clock.utc())
            .await
            .map_err(map_activation_error)
    }

    /// Whether the activation lapsed before being completed.
    pub fn is_expired(&self, activation: &Activation) -> bool {
        activation.is_expired(self.ttl, self.clock.utc())
    }

    /// Whether a completed activation exists for the user.
    pub async fn is_activated(&self, user_id: &UserId) -> Result<bool, Error> {
        Ok(self
            .activations
            .find_completed_for_user(user_id)
            .await
            .map_err(map_activation_error)?
            .is_some())
    }

    /// The user's completed activation, if any.
    pub async fn activation(&self, user_id: &UserId) -> Result<Option<Activation>, Error> {
        self.activations
            .find_completed_for_user(user_id)
            .await
            .map_err(map_activation_error)
    }

    async fn insert_with_fresh_code(&self, user_id: &UserId) -> Result<Activation, Error> {
        for _ in 0..CODE_RETRY_LIMIT {
            let activation = Activation::issue(*user_id, self.clock.utc());
            match self.activations.insert(&activation).await {
                Ok(()) => return Ok(activation),
                Err(ActivationPersistenceError::DuplicateCode) => continue,
                Err(other) => return Err(map_activation_error(other)),
            }
        }
        Err(map_activation_error(
            ActivationPersistenceError::DuplicateCode,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use mockable::MockClock;
    use uuid::Uuid;

    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::user::{Email, User, Username};

    #[derive(Default)]
    struct StubActivations {
        records: Mutex<Vec<Activation>>,
    }

    #[async_trait]
    impl ActivationRepository for StubActivations {
        async fn insert(&self, activation: &Activation) -> Result<(), ActivationPersistenceError> {
            let mut records = self.records.lock().expect("records lock");
            if records.iter().any(|a| a.code == activation.code) {
                return Err(ActivationPersistenceError::duplicate_code());
            }
            records.push(activation.clone());
            Ok(())
        }

        async fn find_by_code(
            &self,
            code: &ActivationCode,
        ) -> Result<Option<Activation>, ActivationPersistenceError> {
            let records = self.records.lock().expect("records lock");
            Ok(records.iter().find(|a| a.code == *code).cloned())
        }

        async fn find_completed_for_user(
            &self,
            user_id: &UserId,
        ) -> Result<Option<Activation>, ActivationPersistenceError> {
            let records = self.records.lock().expect("records lock");
            Ok(records
                .iter()
                .find(|a| a.user_id == *user_id && a.completed)
                .cloned())
        }

        async fn find_pending_for_user(
            &self,
            user_id: &UserId,
        ) -> Result<Option<Activation>, ActivationPersistenceError> {
            let records = self.records.lock().expect("records lock");
            Ok(records
                .iter()
                .find(|a| a.user_id == *user_id && !a.completed)
                .cloned())
        }

        async fn mark_completed(
            &self,
            id: &Uuid,
            at: DateTime<Utc>,
        ) -> Result<bool, ActivationPersistenceError> {
            let mut records = self.records.lock().expect("records lock");
            match records.iter_mut().find(|a| a.id == *id && !a.completed) {
                Some(activation) => {
                    activation.complete(at);
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn delete(&self, id: &Uuid) -> Result<(), ActivationPersistenceError> {
            let mut records = self.records.lock().expect("records lock");
            records.retain(|a| a.id != *id);
            Ok(())
        }
    }

    #[derive(Default)]
    struct StubUsers {
        users: Mutex<Vec<User>>,
    }

    impl StubUsers {
        fn with_user(user: User) -> Self {
            Self {
                users: Mutex::new(vec![user]),
            }
        }
    }

    #[async_trait]
    impl UserRepository for StubUsers {
        async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
            self.users.lock().expect("users lock").push(user.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
            let users = self.users.lock().expect("users lock");
            Ok(users.iter().find(|u| u.id == *id).cloned())
        }

        async fn find_by_username(
            &self,
            username: &Username,
        ) -> Result<Option<User>, UserPersistenceError> {
            let users = self.users.lock().expect("users lock");
            Ok(users.iter().find(|u| u.username == *username).cloned())
        }

        async fn find_by_email(
            &self,
            email: &Email,
        ) -> Result<Option<User>, UserPersistenceError> {
            let users = self.users.lock().expect("users lock");
            Ok(users.iter().find(|u| u.email == *email).cloned())
        }

        async fn set_skin_hash(
            &self,
            _id: &UserId,
            _hash: Option<&str>,
        ) -> Result<(), UserPersistenceError> {
            Ok(())
        }

        async fn set_cloak_hash(
            &self,
            _id: &UserId,
            _hash: Option<&str>,
        ) -> Result<(), UserPersistenceError> {
            Ok(())
        }
    }

    fn fixture_user() -> User {
        User::register(
            Username::new("D3lph1").expect("valid username"),
            Email::new("d3lph1.contact@gmail.com").expect("valid email"),
            "pbkdf2_sha256$1$salt$hash".to_owned(),
        )
    }

    fn fixed_clock(now: DateTime<Utc>) -> Arc<MockClock> {
        let mut clock = MockClock::new();
        clock.expect_utc().return_const(now);
        Arc::new(clock)
    }

    fn activator_at(now: DateTime<Utc>, user: &User) -> (Activator, Arc<StubActivations>) {
        let activations = Arc::new(StubActivations::default());
        let activator = Activator::new(
            Arc::new(StubUsers::with_user(user.clone())),
            activations.clone(),
            fixed_clock(now),
            Duration::hours(24),
        );
        (activator, activations)
    }

    #[tokio::test]
    async fn make_activation_for_unknown_user_is_not_found() {
        let (activator, _) = activator_at(Utc::now(), &fixture_user());
        let err = activator
            .make_activation(&UserId::random())
            .await
            .expect_err("unknown user must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.status(), "user_not_found");
    }

    #[tokio::test]
    async fn make_activation_replaces_a_live_pending_code() {
        let user = fixture_user();
        let (activator, _) = activator_at(Utc::now(), &user);

        let first = activator
            .make_activation(&user.id)
            .await
            .expect("first issue succeeds");
        let second = activator
            .make_activation(&user.id)
            .await
            .expect("reissue succeeds");

        assert_ne!(first.code, second.code);
        assert!(
            !activator
                .complete(&first.code)
                .await
                .expect("completion runs"),
            "replaced code must no longer resolve"
        );
        assert!(
            activator
                .complete(&second.code)
                .await
                .expect("completion runs"),
            "fresh code must resolve"
        );
    }

    #[tokio::test]
    async fn make_activation_for_activated_user_is_a_conflict() {
        let user = fixture_user();
        let (activator, _) = activator_at(Utc::now(), &user);
        let activation = activator
            .make_activation(&user.id)
            .await
            .expect("issue succeeds");
        assert!(activator.complete(&activation.code).await.expect("completes"));

        let err = activator
            .make_activation(&user.id)
            .await
            .expect_err("activated user must conflict");
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.status(), "already_activated");
    }

    #[tokio::test]
    async fn complete_succeeds_exactly_once_per_code() {
        let user = fixture_user();
        let (activator, _) = activator_at(Utc::now(), &user);
        let activation = activator
            .make_activation(&user.id)
            .await
            .expect("issue succeeds");

        assert!(activator.complete(&activation.code).await.expect("first"));
        assert!(!activator.complete(&activation.code).await.expect("second"));
        assert!(activator
            .is_activated(&user.id)
            .await
            .expect("activation state readable"));
    }

    #[tokio::test]
    async fn complete_with_unknown_code_is_false_not_an_error() {
        let (activator, _) = activator_at(Utc::now(), &fixture_user());
        let completed = activator
            .complete(&ActivationCode::generate())
            .await
            .expect("completion runs");
        assert!(!completed);
    }

    #[tokio::test]
    async fn expired_codes_do_not_complete() {
        let user = fixture_user();
        let issued_at = Utc::now();
        let activations = Arc::new(StubActivations::default());
        let users = Arc::new(StubUsers::with_user(user.clone()));

        let issuing = Activator::new(
            users.clone(),
            activations.clone(),
            fixed_clock(issued_at),
            Duration::hours(24),
        );
        let activation = issuing
            .make_activation(&user.id)
            .await
            .expect("issue succeeds");

        let later = Activator::new(
            users,
            activations,
            fixed_clock(issued_at + Duration::hours(25)),
            Duration::hours(24),
        );
        assert!(later.is_expired(&activation));
        assert!(!later.complete(&activation.code).await.expect("runs"));
        assert!(!later
            .is_activated(&user.id)
            .await
            .expect("activation state readable"));
    }

    #[tokio::test]
    async fn activate_records_a_completed_activation_immediately() {
        let user = fixture_user();
        let (activator, _) = activator_at(Utc::now(), &user);

        let activation = activator.activate(&user.id).await.expect("activate");
        assert!(activation.completed);
        assert!(activator
            .is_activated(&user.id)
            .await
            .expect("activation state readable"));

        let err = activator
            .activate(&user.id)
            .await
            .expect_err("second activate must conflict");
        assert_eq!(err.status(), "already_activated");
    }
}
