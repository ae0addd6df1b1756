//! Inbound HTTP adapters: actix handlers, session plumbing, and the error
//! mapping that turns domain failures into the JSON envelope.

pub mod activation;
pub mod auth;
pub mod balance;
pub mod catalogue;
pub mod character;
pub mod error;
pub mod health;
pub mod roles;
pub mod session;
pub mod state;
pub mod test_utils;

pub use error::ApiResult;
pub use state::HttpState;
