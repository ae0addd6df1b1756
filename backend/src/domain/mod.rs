//! Domain layer: entities, services, and the ports they depend on.
//!
//! Nothing in here touches HTTP or the database; inbound adapters call the
//! services and outbound adapters implement the ports.

pub mod activation;
pub mod activator;
pub mod auth;
pub mod catalogue;
pub mod character;
pub mod checkpoint;
pub mod error;
pub mod pagination;
pub mod password;
pub mod ports;
pub mod purchasing;
pub mod roles;
pub mod user;

pub use error::{Error, ErrorCode, Notification, Severity};
