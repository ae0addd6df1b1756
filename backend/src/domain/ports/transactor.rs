//! Port abstraction for transactional purchase persistence.

use async_trait::async_trait;

use crate::domain::purchasing::Purchase;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by transactor adapters.
    pub enum TransactorError {
        /// The store could not be reached.
        Connection { message: String } => "transactor connection failed: {message}",
        /// The transaction failed and was rolled back.
        Query { message: String } => "transaction failed: {message}",
        /// The purchase references a user row that does not exist.
        UserMissing { user_id: String } => "user {user_id} does not exist",
    }
}

/// Driven port owning the purchase/balance database transaction.
///
/// `replenish` records the purchase and credits the user's balance inside a
/// single transaction. Callers may treat a returned `Ok` as committed.
#[async_trait]
pub trait Transactor: Send + Sync {
    /// Atomically persist the purchase and credit its sum to the user.
    async fn replenish(&self, purchase: &Purchase) -> Result<(), TransactorError>;
}
