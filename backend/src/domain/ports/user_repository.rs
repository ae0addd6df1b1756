//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::user::{Email, User, UserId, Username};

use super::macros::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The unique username constraint rejected the write.
        DuplicateUsername { username: String } => "username {username} is already taken",
        /// The unique email constraint rejected the write.
        DuplicateEmail { email: String } => "email {email} is already registered",
    }
}

/// Driven port for user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user record.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by unique username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by unique email address.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;

    /// Record or clear the user's skin content hash.
    async fn set_skin_hash(
        &self,
        id: &UserId,
        hash: Option<&str>,
    ) -> Result<(), UserPersistenceError>;

    /// Record or clear the user's cloak content hash.
    async fn set_cloak_hash(
        &self,
        id: &UserId,
        hash: Option<&str>,
    ) -> Result<(), UserPersistenceError>;
}
