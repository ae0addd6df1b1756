//! Registration, login, and activation resend flows.
//!
//! Login is a three-stage gate: the user must exist (`user_not_found`), the
//! password must verify (`invalid_credentials`), and every checkpoint in the
//! injected pool must pass. Checkpoint failure is a value inside the pool and
//! only becomes a conflict error here, at the service boundary.

use std::sync::Arc;

use tracing::warn;

use super::activator::Activator;
use super::checkpoint::{CheckpointDecision, LoginContext, Pool};
use super::error::{Error, Notification};
use super::password::{hash_password, verify_password};
use super::ports::mailer::{ConfirmationMail, Mailer, MailerError};
use super::ports::user_repository::{UserPersistenceError, UserRepository};
use super::user::{Email, User, Username};

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
        UserPersistenceError::DuplicateUsername { username } => username_taken(&username),
        UserPersistenceError::DuplicateEmail { email } => email_taken(&email),
    }
}

fn map_mailer_error(error: MailerError) -> Error {
    match error {
        MailerError::Transport { message } | MailerError::Rejected { message } => {
            Error::service_unavailable(message)
                .with_notification(Notification::error("The confirmation mail could not be sent. Please try again later."))
        }
    }
}

fn username_taken(username: &str) -> Error {
    Error::conflict(
        "username_taken",
        format!("username {username} is already taken"),
    )
    .with_notification(Notification::error(format!(
        "Username {username} is already taken."
    )))
}

fn email_taken(email: &str) -> Error {
    Error::conflict("email_taken", format!("email {email} is already taken"))
        .with_notification(Notification::error(format!(
            "An account with the address {email} already exists."
        )))
}

fn user_not_found() -> Error {
    Error::not_found("user_not_found", "no user matches the supplied identity")
        .with_notification(Notification::error("There is no account with that name."))
}

/// Authenticates users and establishes their login context.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    activator: Activator,
    pool: Pool,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, activator: Activator, pool: Pool) -> Self {
        Self {
            users,
            activator,
            pool,
        }
    }

    /// Authenticate a login attempt.
    ///
    /// Unknown usernames fail with `user_not_found`, wrong passwords with
    /// `invalid_credentials`, and the first failing checkpoint turns into a
    /// conflict carrying its reason as the status string.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, Error> {
        // A name that fails validation cannot belong to any account.
        let Ok(username) = Username::new(username) else {
            return Err(user_not_found());
        };
        let Some(user) = self
            .users
            .find_by_username(&username)
            .await
            .map_err(map_user_error)?
        else {
            return Err(user_not_found());
        };

        if !verify_password(password, &user.password_hash) {
            return Err(Error::unauthorized(
                "invalid_credentials",
                format!("wrong password for user {username}"),
            )
            .with_notification(Notification::error("Invalid username or password.")));
        }

        let ctx = LoginContext {
            activated: self.activator.is_activated(&user.id).await?,
        };
        match self.pool.evaluate(&user, &ctx) {
            CheckpointDecision::Passed => Ok(user),
            CheckpointDecision::Failed {
                checkpoint,
                rejection,
            } => {
                tracing::info!(checkpoint, user = %username, reason = rejection.reason, "login rejected");
                Err(Error::conflict(
                    rejection.reason,
                    format!("checkpoint {checkpoint} rejected login for {username}"),
                )
                .with_notification(Notification::error(rejection.message)))
            }
        }
    }
}

/// Creates accounts and drives the confirmation-mail flow.
#[derive(Clone)]
pub struct RegistrationService {
    users: Arc<dyn UserRepository>,
    activator: Activator,
    mailer: Arc<dyn Mailer>,
}

impl RegistrationService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        activator: Activator,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            users,
            activator,
            mailer,
        }
    }

    /// Register a new account and mail its activation code.
    ///
    /// The account is created even when the confirmation mail bounces; the
    /// user can request a resend. Conflicting usernames and addresses fail
    /// with `username_taken` / `email_taken`.
    pub async fn register(
        &self,
        username: Username,
        email: Email,
        password: &str,
    ) -> Result<User, Error> {
        if self
            .users
            .find_by_username(&username)
            .await
            .map_err(map_user_error)?
            .is_some()
        {
            return Err(username_taken(username.as_ref()));
        }
        if self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_error)?
            .is_some()
        {
            return Err(email_taken(email.as_ref()));
        }

        let password_hash =
            hash_password(password).map_err(|e| Error::internal(e.to_string()))?;
        let user = User::register(username, email, password_hash);
        self.users.insert(&user).await.map_err(map_user_error)?;

        let activation = self.activator.make_activation(&user.id).await?;
        let mail = ConfirmationMail {
            to: user.email.clone(),
            username: user.username.clone(),
            code: activation.code,
        };
        if let Err(error) = self.mailer.send_confirmation(&mail).await {
            warn!(user = %user.username, %error, "confirmation mail failed, account left pending");
        }
        Ok(user)
    }

    /// Re-issue the activation code and mail it again.
    ///
    /// Unlike [`register`](Self::register), a mail failure here surfaces to
    /// the caller: resending is the recovery path, so a silent drop would
    /// strand the user.
    pub async fn resend_activation(&self, email: &Email) -> Result<(), Error> {
        let Some(user) = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_user_error)?
        else {
            return Err(user_not_found());
        };

        let activation = self.activator.make_activation(&user.id).await?;
        let mail = ConfirmationMail {
            to: user.email.clone(),
            username: user.username.clone(),
            code: activation.code,
        };
        self.mailer
            .send_confirmation(&mail)
            .await
            .map_err(map_mailer_error)
    }
}
