//! Roles, permissions, and the admin role management service.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use super::error::{Error, Notification};
use super::pagination::{Page, PageRequest};
use super::ports::role_repository::{RolePersistenceError, RoleRepository};

/// Stable role identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleId(Uuid);

impl RoleId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A named access grant identified by its unique key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub id: Uuid,
    pub key: String,
}

/// A named bundle of permissions, unique by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

impl Role {
    /// Construct a fresh role with a random identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RoleId::random(),
            name: name.into(),
        }
    }
}

fn map_persistence_error(error: RolePersistenceError) -> Error {
    match error {
        RolePersistenceError::Connection { message } => Error::service_unavailable(message),
        RolePersistenceError::Query { message } => Error::internal(message),
        RolePersistenceError::DuplicateName { name } => role_already_exists(&name),
    }
}

fn role_already_exists(name: &str) -> Error {
    Error::conflict("role_already_exists", format!("role {name} already exists"))
        .with_notification(Notification::error(format!("Role {name} already exists.")))
}

fn role_not_found(id: &RoleId) -> Error {
    Error::not_found("role_not_found", format!("role {id} does not exist"))
        .with_notification(Notification::error("Role does not exist."))
}

fn permission_not_found(key: &str) -> Error {
    Error::not_found(
        "permission_not_found",
        format!("permission {key} does not exist"),
    )
    .with_notification(Notification::error(format!(
        "Permission {key} does not exist."
    )))
}

/// Admin use cases for roles: listing, creation, renaming, permission
/// assignment, and deletion.
#[derive(Clone)]
pub struct RoleService {
    roles: Arc<dyn RoleRepository>,
}

impl RoleService {
    /// Create a service backed by the given repository.
    pub fn new(roles: Arc<dyn RoleRepository>) -> Self {
        Self { roles }
    }

    /// List roles for the admin table.
    pub async fn list(&self, request: &PageRequest) -> Result<Page<Role>, Error> {
        self.roles.page(request).await.map_err(map_persistence_error)
    }

    /// Create a role and assign the permissions named by `keys`.
    ///
    /// Fails with `permission_not_found` when any key is unknown and with
    /// `role_already_exists` when the name is taken.
    pub async fn create(&self, name: &str, keys: &[String]) -> Result<Role, Error> {
        let name = validate_name(name)?;
        let permissions = self.resolve_permissions(keys).await?;

        if self
            .roles
            .find_by_name(name)
            .await
            .map_err(map_persistence_error)?
            .is_some()
        {
            return Err(role_already_exists(name));
        }

        let role = Role::new(name);
        self.roles.insert(&role).await.map_err(map_persistence_error)?;
        self.roles
            .set_permissions(&role.id, &permissions)
            .await
            .map_err(map_persistence_error)?;
        Ok(role)
    }

    /// Permissions currently assigned to a role.
    pub async fn permissions(&self, id: &RoleId) -> Result<Vec<Permission>, Error> {
        self.roles
            .permissions_of(id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| role_not_found(id))
    }

    /// Rename a role, preserving name uniqueness.
    pub async fn update_name(&self, id: &RoleId, name: &str) -> Result<(), Error> {
        let name = validate_name(name)?;
        self.require_role(id).await?;

        if let Some(existing) = self
            .roles
            .find_by_name(name)
            .await
            .map_err(map_persistence_error)?
            && existing.id != *id
        {
            return Err(role_already_exists(name));
        }

        self.roles.rename(id, name).await.map_err(map_persistence_error)
    }

    /// Replace the role's permissions with those named by `keys`.
    pub async fn update_permissions(&self, id: &RoleId, keys: &[String]) -> Result<(), Error> {
        self.require_role(id).await?;
        let permissions = self.resolve_permissions(keys).await?;
        self.roles
            .set_permissions(id, &permissions)
            .await
            .map_err(map_persistence_error)
    }

    /// Delete a role and its assignments.
    pub async fn delete(&self, id: &RoleId) -> Result<(), Error> {
        self.require_role(id).await?;
        self.roles.delete(id).await.map_err(map_persistence_error)
    }

    async fn require_role(&self, id: &RoleId) -> Result<Role, Error> {
        self.roles
            .find(id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| role_not_found(id))
    }

    /// Resolve permission keys to ids, failing on the first unknown key in
    /// input order.
    async fn resolve_permissions(&self, keys: &[String]) -> Result<Vec<Uuid>, Error> {
        let found = self
            .roles
            .permissions_by_keys(keys)
            .await
            .map_err(map_persistence_error)?;
        let mut ids = Vec::with_capacity(keys.len());
        for key in keys {
            match found.iter().find(|permission| permission.key == *key) {
                Some(permission) => ids.push(permission.id),
                None => return Err(permission_not_found(key)),
            }
        }
        Ok(ids)
    }
}

fn validate_name(name: &str) -> Result<&str, Error> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_request(
            "invalid_role_name",
            "role name must not be empty",
        ));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rstest::rstest;

    use super::*;
    use crate::domain::error::ErrorCode;

    #[derive(Default)]
    struct StubState {
        roles: Vec<Role>,
        permissions: Vec<Permission>,
        assignments: Vec<(RoleId, Uuid)>,
        failure: Option<RolePersistenceError>,
    }

    #[derive(Default)]
    struct StubRoleRepository {
        state: Mutex<StubState>,
    }

    impl StubRoleRepository {
        fn with_roles(roles: Vec<Role>) -> Self {
            Self {
                state: Mutex::new(StubState {
                    roles,
                    ..StubState::default()
                }),
            }
        }

        fn with_permissions(self, permissions: Vec<Permission>) -> Self {
            self.state.lock().expect("state lock").permissions = permissions;
            self
        }

        fn set_failure(&self, failure: RolePersistenceError) {
            self.state.lock().expect("state lock").failure = Some(failure);
        }

        fn role_names(&self) -> Vec<String> {
            self.state
                .lock()
                .expect("state lock")
                .roles
                .iter()
                .map(|role| role.name.clone())
                .collect()
        }

        fn assignment_count(&self, id: &RoleId) -> usize {
            self.state
                .lock()
                .expect("state lock")
                .assignments
                .iter()
                .filter(|(role_id, _)| role_id == id)
                .count()
        }
    }

    #[async_trait]
    impl RoleRepository for StubRoleRepository {
        async fn insert(&self, role: &Role) -> Result<(), RolePersistenceError> {
            let mut state = self.state.lock().expect("state lock");
            if let Some(failure) = state.failure.clone() {
                return Err(failure);
            }
            if state.roles.iter().any(|r| r.name == role.name) {
                return Err(RolePersistenceError::duplicate_name(role.name.clone()));
            }
            state.roles.push(role.clone());
            Ok(())
        }

        async fn find(&self, id: &RoleId) -> Result<Option<Role>, RolePersistenceError> {
            let state = self.state.lock().expect("state lock");
            if let Some(failure) = state.failure.clone() {
                return Err(failure);
            }
            Ok(state.roles.iter().find(|r| r.id == *id).cloned())
        }

        async fn find_by_name(&self, name: &str) -> Result<Option<Role>, RolePersistenceError> {
            let state = self.state.lock().expect("state lock");
            if let Some(failure) = state.failure.clone() {
                return Err(failure);
            }
            Ok(state.roles.iter().find(|r| r.name == name).cloned())
        }

        async fn rename(&self, id: &RoleId, name: &str) -> Result<(), RolePersistenceError> {
            let mut state = self.state.lock().expect("state lock");
            if let Some(role) = state.roles.iter_mut().find(|r| r.id == *id) {
                role.name = name.to_owned();
            }
            Ok(())
        }

        async fn set_permissions(
            &self,
            id: &RoleId,
            permission_ids: &[Uuid],
        ) -> Result<(), RolePersistenceError> {
            let mut state = self.state.lock().expect("state lock");
            state.assignments.retain(|(role_id, _)| role_id != id);
            state
                .assignments
                .extend(permission_ids.iter().map(|pid| (*id, *pid)));
            Ok(())
        }

        async fn delete(&self, id: &RoleId) -> Result<(), RolePersistenceError> {
            let mut state = self.state.lock().expect("state lock");
            state.roles.retain(|r| r.id != *id);
            state.assignments.retain(|(role_id, _)| role_id != id);
            Ok(())
        }

        async fn page(
            &self,
            request: &PageRequest,
        ) -> Result<Page<Role>, RolePersistenceError> {
            let state = self.state.lock().expect("state lock");
            if let Some(failure) = state.failure.clone() {
                return Err(failure);
            }
            let items: Vec<Role> = state
                .roles
                .iter()
                .filter(|r| {
                    request
                        .search()
                        .is_none_or(|needle| r.name.contains(needle))
                })
                .cloned()
                .collect();
            let total = items.len() as u64;
            Ok(Page::new(items, total, request))
        }

        async fn permissions_of(
            &self,
            id: &RoleId,
        ) -> Result<Option<Vec<Permission>>, RolePersistenceError> {
            let state = self.state.lock().expect("state lock");
            if !state.roles.iter().any(|r| r.id == *id) {
                return Ok(None);
            }
            let keys: Vec<Permission> = state
                .assignments
                .iter()
                .filter(|(role_id, _)| role_id == id)
                .filter_map(|(_, pid)| {
                    state.permissions.iter().find(|p| p.id == *pid).cloned()
                })
                .collect();
            Ok(Some(keys))
        }

        async fn permissions_by_keys(
            &self,
            keys: &[String],
        ) -> Result<Vec<Permission>, RolePersistenceError> {
            let state = self.state.lock().expect("state lock");
            Ok(state
                .permissions
                .iter()
                .filter(|p| keys.contains(&p.key))
                .cloned()
                .collect())
        }
    }

    fn permission(key: &str) -> Permission {
        Permission {
            id: Uuid::new_v4(),
            key: key.to_owned(),
        }
    }

    fn service(repository: Arc<StubRoleRepository>) -> RoleService {
        RoleService::new(repository)
    }

    #[tokio::test]
    async fn create_assigns_resolved_permissions() {
        let repository = Arc::new(
            StubRoleRepository::default()
                .with_permissions(vec![permission("admin.roles"), permission("admin.users")]),
        );
        let role = service(repository.clone())
            .create("moderator", &["admin.roles".to_owned()])
            .await
            .expect("creation succeeds");

        assert_eq!(repository.role_names(), vec!["moderator"]);
        assert_eq!(repository.assignment_count(&role.id), 1);
    }

    #[tokio::test]
    async fn create_duplicate_name_is_a_conflict_naming_the_role() {
        let repository = Arc::new(StubRoleRepository::with_roles(vec![Role::new("admin")]));
        let err = service(repository)
            .create("admin", &[])
            .await
            .expect_err("duplicate must fail");

        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.status(), "role_already_exists");
        assert!(
            err.notifications()[0].message.contains("admin"),
            "notification must name the conflicting role"
        );
    }

    #[tokio::test]
    async fn create_with_unknown_permission_names_the_key() {
        let repository =
            Arc::new(StubRoleRepository::default().with_permissions(vec![permission("known")]));
        let err = service(repository)
            .create("moderator", &["known".to_owned(), "missing".to_owned()])
            .await
            .expect_err("unknown permission must fail");

        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.status(), "permission_not_found");
        assert!(err.notifications()[0].message.contains("missing"));
    }

    #[tokio::test]
    async fn update_name_rejects_taken_names_but_allows_self() {
        let admin = Role::new("admin");
        let moderator = Role::new("moderator");
        let repository = Arc::new(StubRoleRepository::with_roles(vec![
            admin.clone(),
            moderator.clone(),
        ]));
        let svc = service(repository.clone());

        svc.update_name(&admin.id, "admin")
            .await
            .expect("renaming to own name is fine");
        let err = svc
            .update_name(&admin.id, "moderator")
            .await
            .expect_err("taken name must conflict");
        assert_eq!(err.status(), "role_already_exists");
    }

    #[tokio::test]
    async fn operations_on_missing_roles_are_not_found() {
        let repository = Arc::new(StubRoleRepository::default());
        let svc = service(repository);
        let missing = RoleId::random();

        for err in [
            svc.update_name(&missing, "x").await.expect_err("rename"),
            svc.update_permissions(&missing, &[]).await.expect_err("perms"),
            svc.delete(&missing).await.expect_err("delete"),
            svc.permissions(&missing).await.map(|_| ()).expect_err("read"),
        ] {
            assert_eq!(err.code(), ErrorCode::NotFound);
            assert_eq!(err.status(), "role_not_found");
        }
    }

    #[rstest]
    #[case(RolePersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(RolePersistenceError::query("bad sql"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn persistence_failures_map_to_domain_codes(
        #[case] failure: RolePersistenceError,
        #[case] expected: ErrorCode,
    ) {
        let repository = Arc::new(StubRoleRepository::default());
        repository.set_failure(failure);
        let err = service(repository)
            .list(&PageRequest::default())
            .await
            .expect_err("failure must surface");
        assert_eq!(err.code(), expected);
    }

    #[tokio::test]
    async fn list_applies_search_filter() {
        let repository = Arc::new(StubRoleRepository::with_roles(vec![
            Role::new("admin"),
            Role::new("moderator"),
        ]));
        let page = service(repository)
            .list(&PageRequest::default().with_search(Some("mod".to_owned())))
            .await
            .expect("listing succeeds");
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "moderator");
    }
}
