//! Inbound adapters driving the domain from the outside world.

pub mod http;
