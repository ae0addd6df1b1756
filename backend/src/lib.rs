//! Game-server goods storefront backend.
//!
//! Hexagonal layout: `domain` holds the entities, services, and ports;
//! `inbound` adapts HTTP onto the services; `outbound` implements the ports
//! against Postgres, an HTTP mail relay, the filesystem, and in-memory
//! fallbacks used by tests and database-less deployments.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
