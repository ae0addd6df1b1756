//! Balance replenishment purchases.
//!
//! A replenishment purchase credits its sum onto the user's balance. The
//! write happens inside a single database transaction owned by the
//! [`Transactor`] adapter; the created event goes out only after that
//! transaction has committed, so subscribers never observe a purchase that
//! later rolled back.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::{Error, Notification};
use super::ports::event_dispatcher::{DomainEvent, EventDispatcher};
use super::ports::transactor::{Transactor, TransactorError};
use super::user::UserId;

/// A committed balance replenishment.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub id: Uuid,
    pub user_id: UserId,
    pub sum: Decimal,
    pub ip: IpAddr,
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    /// Build a new purchase record for the user.
    pub fn new(user_id: UserId, sum: Decimal, ip: IpAddr, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            sum,
            ip,
            created_at,
        }
    }
}

/// Published after a purchase transaction commits.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseCreatedEvent {
    pub purchase: Purchase,
}

fn map_transactor_error(error: TransactorError) -> Error {
    match error {
        TransactorError::Connection { message } => Error::service_unavailable(message),
        TransactorError::Query { message } => Error::internal(message),
        TransactorError::UserMissing { user_id } => Error::not_found(
            "user_not_found",
            format!("user {user_id} does not exist"),
        ),
    }
}

/// Creates replenishment purchases and credits user balances.
#[derive(Clone)]
pub struct ReplenishmentCreator {
    transactor: Arc<dyn Transactor>,
    events: Arc<dyn EventDispatcher>,
    clock: Arc<dyn Clock>,
}

impl ReplenishmentCreator {
    pub fn new(
        transactor: Arc<dyn Transactor>,
        events: Arc<dyn EventDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transactor,
            events,
            clock,
        }
    }

    /// Record a purchase of `sum` for the user and credit their balance.
    ///
    /// The sum must be strictly positive. Persistence and the balance credit
    /// commit atomically; `PurchaseCreated` is dispatched exactly once, after
    /// the commit.
    pub async fn create(
        &self,
        sum: Decimal,
        user_id: &UserId,
        ip: IpAddr,
    ) -> Result<Purchase, Error> {
        if sum <= Decimal::ZERO {
            return Err(Error::invalid_request(
                "non_positive_sum",
                format!("replenishment sum {sum} is not positive"),
            )
            .with_notification(Notification::error(
                "Replenishment sum must be positive.",
            )));
        }

        let purchase = Purchase::new(*user_id, sum, ip, self.clock.utc());
        self.transactor
            .replenish(&purchase)
            .await
            .map_err(map_transactor_error)?;

        self.events.dispatch(DomainEvent::PurchaseCreated(PurchaseCreatedEvent {
            purchase: purchase.clone(),
        }));
        Ok(purchase)
    }
}
