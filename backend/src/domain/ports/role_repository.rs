//! Port abstraction for role and permission persistence adapters.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::pagination::{Page, PageRequest};
use crate::domain::roles::{Permission, Role, RoleId};

use super::macros::define_port_error;

define_port_error! {
    /// Persistence errors raised by role repository adapters.
    pub enum RolePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "role repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "role repository query failed: {message}",
        /// The unique role-name constraint rejected the write.
        DuplicateName { name: String } => "role {name} already exists",
    }
}

/// Driven port for roles and their permission assignments.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Insert a new role record.
    async fn insert(&self, role: &Role) -> Result<(), RolePersistenceError>;

    /// Fetch a role by identifier.
    async fn find(&self, id: &RoleId) -> Result<Option<Role>, RolePersistenceError>;

    /// Fetch a role by its unique name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, RolePersistenceError>;

    /// Rename a role.
    async fn rename(&self, id: &RoleId, name: &str) -> Result<(), RolePersistenceError>;

    /// Replace the role's permission assignments.
    async fn set_permissions(
        &self,
        id: &RoleId,
        permission_ids: &[Uuid],
    ) -> Result<(), RolePersistenceError>;

    /// Delete a role and its assignments.
    async fn delete(&self, id: &RoleId) -> Result<(), RolePersistenceError>;

    /// List roles ordered by name, filtered by the optional search string.
    async fn page(&self, request: &PageRequest) -> Result<Page<Role>, RolePersistenceError>;

    /// Permissions assigned to a role; `None` when the role does not exist.
    async fn permissions_of(
        &self,
        id: &RoleId,
    ) -> Result<Option<Vec<Permission>>, RolePersistenceError>;

    /// Resolve permission records by their unique keys; unknown keys are
    /// simply absent from the result.
    async fn permissions_by_keys(
        &self,
        keys: &[String],
    ) -> Result<Vec<Permission>, RolePersistenceError>;
}
