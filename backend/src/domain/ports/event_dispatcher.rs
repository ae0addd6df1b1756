//! Port abstraction for publishing domain events.

use crate::domain::purchasing::PurchaseCreatedEvent;

/// Events the domain publishes for interested subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    PurchaseCreated(PurchaseCreatedEvent),
}

/// Driven port for post-commit event publication.
///
/// Dispatch is fire-and-forget: a dropped event must never fail the
/// operation that produced it.
pub trait EventDispatcher: Send + Sync {
    /// Publish an event to whoever is listening.
    fn dispatch(&self, event: DomainEvent);
}
