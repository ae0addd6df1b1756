//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories here are thin translators between Diesel rows and domain
//! types; business rules stay in the domain services. Connections come from
//! a shared `bb8` pool with native async support via `diesel-async`, and all
//! failures are mapped to the typed port errors.

mod diesel_activation_repository;
mod diesel_catalogue_query;
mod diesel_role_repository;
mod diesel_transactor;
mod diesel_user_repository;
mod error_mapping;
mod models;
mod pool;
mod schema;

use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

pub use diesel_activation_repository::DieselActivationRepository;
pub use diesel_catalogue_query::DieselCatalogueQuery;
pub use diesel_role_repository::DieselRoleRepository;
pub use diesel_transactor::DieselTransactor;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

/// Migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply pending migrations over a short-lived synchronous connection.
///
/// Runs once at startup, before the async pool is built; call it from a
/// blocking context.
pub fn run_migrations(database_url: &str) -> Result<(), PoolError> {
    let mut conn = diesel::PgConnection::establish(database_url)
        .map_err(|e| PoolError::build(e.to_string()))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map(|_| ())
        .map_err(|e| PoolError::build(e.to_string()))
}
