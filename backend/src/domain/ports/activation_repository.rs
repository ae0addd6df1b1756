//! Port abstraction for activation persistence adapters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::activation::{Activation, ActivationCode};
use crate::domain::user::UserId;

use super::macros::define_port_error;

define_port_error! {
    /// Persistence errors raised by activation repository adapters.
    pub enum ActivationPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "activation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "activation repository query failed: {message}",
        /// The unique code constraint rejected the write.
        DuplicateCode => "activation code already exists",
    }
}

/// Driven port for activation records.
///
/// Code uniqueness for live activations is backed by a unique constraint in
/// the store; adapters surface violations as [`ActivationPersistenceError::DuplicateCode`].
#[async_trait]
pub trait ActivationRepository: Send + Sync {
    /// Insert a new activation record.
    async fn insert(&self, activation: &Activation) -> Result<(), ActivationPersistenceError>;

    /// Fetch an activation by its code, completed or not.
    async fn find_by_code(
        &self,
        code: &ActivationCode,
    ) -> Result<Option<Activation>, ActivationPersistenceError>;

    /// Fetch the user's completed activation, if any.
    async fn find_completed_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Activation>, ActivationPersistenceError>;

    /// Fetch the user's incomplete activation, if any.
    async fn find_pending_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Activation>, ActivationPersistenceError>;

    /// Mark an activation consumed at the given instant.
    ///
    /// Returns `true` only when this call performed the transition; a record
    /// that was already completed (or does not exist) yields `false`, so
    /// concurrent completions of the same code resolve to a single winner.
    async fn mark_completed(
        &self,
        id: &Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, ActivationPersistenceError>;

    /// Remove an activation record.
    async fn delete(&self, id: &Uuid) -> Result<(), ActivationPersistenceError>;
}
