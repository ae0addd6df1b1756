//! Broadcast-channel event dispatcher.
//!
//! Domain events fan out over a `tokio::sync::broadcast` channel. Dispatch
//! never blocks and never fails the producing operation; with no subscribers
//! the event is simply dropped.

use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::ports::event_dispatcher::{DomainEvent, EventDispatcher};

/// Dispatcher publishing onto a broadcast channel.
#[derive(Clone)]
pub struct BroadcastDispatcher {
    sender: broadcast::Sender<DomainEvent>,
}

impl BroadcastDispatcher {
    /// Create a dispatcher buffering up to `capacity` undelivered events per
    /// subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl EventDispatcher for BroadcastDispatcher {
    fn dispatch(&self, event: DomainEvent) {
        if self.sender.send(event).is_err() {
            debug!("domain event dropped, no subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::purchasing::{Purchase, PurchaseCreatedEvent};
    use crate::domain::user::UserId;

    fn event() -> DomainEvent {
        DomainEvent::PurchaseCreated(PurchaseCreatedEvent {
            purchase: Purchase::new(
                UserId::random(),
                Decimal::ONE,
                IpAddr::V4(Ipv4Addr::LOCALHOST),
                Utc::now(),
            ),
        })
    }

    #[tokio::test]
    async fn subscribers_receive_dispatched_events() {
        let dispatcher = BroadcastDispatcher::new(16);
        let mut receiver = dispatcher.subscribe();

        let published = event();
        dispatcher.dispatch(published.clone());

        let received = receiver.recv().await.expect("event arrives");
        assert_eq!(received, published);
    }

    #[test]
    fn dispatch_without_subscribers_is_a_no_op() {
        let dispatcher = BroadcastDispatcher::new(16);
        dispatcher.dispatch(event());
    }
}
