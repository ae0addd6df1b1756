//! Outbound adapters implementing the domain ports.
//!
//! - **persistence**: PostgreSQL repositories via Diesel
//! - **memory**: in-process adapters for the no-database profile
//! - **mail**: HTTP relay client and tracing fallback
//! - **events**: broadcast-channel event dispatcher
//! - **assets**: filesystem character-asset store
//!
//! Adapters translate between domain types and infrastructure; none of them
//! carry business logic.

pub mod assets;
pub mod events;
pub mod mail;
pub mod memory;
pub mod persistence;
