//! Driven ports: trait seams the domain services depend on.
//!
//! Outbound adapters implement these; tests substitute stubs.

pub(crate) mod macros;

pub mod activation_repository;
pub mod asset_storage;
pub mod catalogue_query;
pub mod event_dispatcher;
pub mod mailer;
pub mod role_repository;
pub mod transactor;
pub mod user_repository;

pub use activation_repository::{ActivationPersistenceError, ActivationRepository};
pub use asset_storage::{AssetKind, AssetStorage, AssetStorageError};
pub use catalogue_query::{CatalogueQuery, CatalogueQueryError};
pub use event_dispatcher::{DomainEvent, EventDispatcher};
pub use mailer::{ConfirmationMail, Mailer, MailerError};
pub use role_repository::{RolePersistenceError, RoleRepository};
pub use transactor::{Transactor, TransactorError};
pub use user_repository::{UserPersistenceError, UserRepository};
