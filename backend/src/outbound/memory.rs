//! In-memory adapters backing the no-database development profile.
//!
//! Data lives in process memory and vanishes on restart. The adapters honour
//! the same uniqueness rules as the Postgres ones so the domain services
//! behave identically against either backend; service tests lean on them for
//! the same reason.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::activation::{Activation, ActivationCode};
use crate::domain::catalogue::ProductCard;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::ports::activation_repository::{
    ActivationPersistenceError, ActivationRepository,
};
use crate::domain::ports::asset_storage::{AssetKind, AssetStorage, AssetStorageError};
use crate::domain::ports::catalogue_query::{CatalogueQuery, CatalogueQueryError};
use crate::domain::ports::role_repository::{RolePersistenceError, RoleRepository};
use crate::domain::ports::transactor::{Transactor, TransactorError};
use crate::domain::ports::user_repository::{UserPersistenceError, UserRepository};
use crate::domain::purchasing::Purchase;
use crate::domain::roles::{Permission, Role, RoleId};
use crate::domain::user::{Email, User, UserId, Username};

/// Users held in a mutex-guarded vector.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `sum` onto the user's balance; `false` when the user is gone.
    pub(crate) fn credit_balance(&self, id: &UserId, sum: Decimal) -> bool {
        let mut users = self.users.lock().expect("users lock");
        match users.iter_mut().find(|u| u.id == *id) {
            Some(user) => {
                user.balance += sum;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.users.lock().expect("users lock");
        if users.iter().any(|u| u.username == user.username) {
            return Err(UserPersistenceError::duplicate_username(
                user.username.as_ref(),
            ));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(UserPersistenceError::duplicate_email(user.email.as_ref()));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let users = self.users.lock().expect("users lock");
        Ok(users.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        let users = self.users.lock().expect("users lock");
        Ok(users.iter().find(|u| u.username == *username).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let users = self.users.lock().expect("users lock");
        Ok(users.iter().find(|u| u.email == *email).cloned())
    }

    async fn set_skin_hash(
        &self,
        id: &UserId,
        hash: Option<&str>,
    ) -> Result<(), UserPersistenceError> {
        let mut users = self.users.lock().expect("users lock");
        if let Some(user) = users.iter_mut().find(|u| u.id == *id) {
            user.skin_hash = hash.map(str::to_owned);
        }
        Ok(())
    }

    async fn set_cloak_hash(
        &self,
        id: &UserId,
        hash: Option<&str>,
    ) -> Result<(), UserPersistenceError> {
        let mut users = self.users.lock().expect("users lock");
        if let Some(user) = users.iter_mut().find(|u| u.id == *id) {
            user.cloak_hash = hash.map(str::to_owned);
        }
        Ok(())
    }
}

/// Activations held in a mutex-guarded vector.
#[derive(Default)]
pub struct InMemoryActivationRepository {
    records: Mutex<Vec<Activation>>,
}

impl InMemoryActivationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivationRepository for InMemoryActivationRepository {
    async fn insert(&self, activation: &Activation) -> Result<(), ActivationPersistenceError> {
        let mut records = self.records.lock().expect("records lock");
        if records.iter().any(|a| a.code == activation.code) {
            return Err(ActivationPersistenceError::duplicate_code());
        }
        records.push(activation.clone());
        Ok(())
    }

    async fn find_by_code(
        &self,
        code: &ActivationCode,
    ) -> Result<Option<Activation>, ActivationPersistenceError> {
        let records = self.records.lock().expect("records lock");
        Ok(records.iter().find(|a| a.code == *code).cloned())
    }

    async fn find_completed_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Activation>, ActivationPersistenceError> {
        let records = self.records.lock().expect("records lock");
        Ok(records
            .iter()
            .find(|a| a.user_id == *user_id && a.completed)
            .cloned())
    }

    async fn find_pending_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Activation>, ActivationPersistenceError> {
        let records = self.records.lock().expect("records lock");
        Ok(records
            .iter()
            .find(|a| a.user_id == *user_id && !a.completed)
            .cloned())
    }

    async fn mark_completed(
        &self,
        id: &Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, ActivationPersistenceError> {
        let mut records = self.records.lock().expect("records lock");
        match records.iter_mut().find(|a| a.id == *id && !a.completed) {
            Some(activation) => {
                activation.complete(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &Uuid) -> Result<(), ActivationPersistenceError> {
        let mut records = self.records.lock().expect("records lock");
        records.retain(|a| a.id != *id);
        Ok(())
    }
}

#[derive(Default)]
struct RoleState {
    roles: Vec<Role>,
    permissions: Vec<Permission>,
    assignments: HashMap<Uuid, Vec<Uuid>>,
}

/// Roles, permissions, and their assignments in process memory.
#[derive(Default)]
pub struct InMemoryRoleRepository {
    state: Mutex<RoleState>,
}

impl InMemoryRoleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the permission catalogue the admin surface assigns from.
    pub fn with_permissions(keys: &[&str]) -> Self {
        let repository = Self::default();
        {
            let mut state = repository.state.lock().expect("state lock");
            state.permissions = keys
                .iter()
                .map(|key| Permission {
                    id: Uuid::new_v4(),
                    key: (*key).to_owned(),
                })
                .collect();
        }
        repository
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn insert(&self, role: &Role) -> Result<(), RolePersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        if state.roles.iter().any(|r| r.name == role.name) {
            return Err(RolePersistenceError::duplicate_name(role.name.clone()));
        }
        state.roles.push(role.clone());
        Ok(())
    }

    async fn find(&self, id: &RoleId) -> Result<Option<Role>, RolePersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state.roles.iter().find(|r| r.id == *id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, RolePersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state.roles.iter().find(|r| r.name == name).cloned())
    }

    async fn rename(&self, id: &RoleId, name: &str) -> Result<(), RolePersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        if state.roles.iter().any(|r| r.id != *id && r.name == name) {
            return Err(RolePersistenceError::duplicate_name(name));
        }
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
        state.assignments.insert(*id.as_uuid(), permission_ids.to_vec());
        Ok(())
    }

    async fn delete(&self, id: &RoleId) -> Result<(), RolePersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        state.roles.retain(|r| r.id != *id);
        state.assignments.remove(id.as_uuid());
        Ok(())
    }

    async fn page(&self, request: &PageRequest) -> Result<Page<Role>, RolePersistenceError> {
        let state = self.state.lock().expect("state lock");
        let needle = request.search().map(str::to_lowercase);
        let mut matching: Vec<Role> = state
            .roles
            .iter()
            .filter(|role| {
                needle
                    .as_deref()
                    .is_none_or(|n| role.name.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));
        if request.is_descending() {
            matching.reverse();
        }
        let total = matching.len() as u64;
        let items: Vec<Role> = matching
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(0))
            .take(usize::try_from(request.limit()).unwrap_or(0))
            .collect();
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
        let assigned = state.assignments.get(id.as_uuid()).cloned().unwrap_or_default();
        Ok(Some(
            state
                .permissions
                .iter()
                .filter(|p| assigned.contains(&p.id))
                .cloned()
                .collect(),
        ))
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

/// Product cards served straight from a seeded vector.
#[derive(Default)]
pub struct InMemoryCatalogueQuery {
    cards: Vec<ProductCard>,
}

impl InMemoryCatalogueQuery {
    pub fn new(cards: Vec<ProductCard>) -> Self {
        Self { cards }
    }
}

#[async_trait]
impl CatalogueQuery for InMemoryCatalogueQuery {
    async fn products(
        &self,
        request: &PageRequest,
    ) -> Result<Page<ProductCard>, CatalogueQueryError> {
        let total = self.cards.len() as u64;
        let items: Vec<ProductCard> = self
            .cards
            .iter()
            .skip(usize::try_from(request.offset()).unwrap_or(0))
            .take(usize::try_from(request.limit()).unwrap_or(0))
            .cloned()
            .collect();
        Ok(Page::new(items, total, request))
    }
}

/// Purchase transactor credited straight into [`InMemoryUserRepository`].
pub struct InMemoryTransactor {
    users: std::sync::Arc<InMemoryUserRepository>,
    purchases: Mutex<Vec<Purchase>>,
}

impl InMemoryTransactor {
    pub fn new(users: std::sync::Arc<InMemoryUserRepository>) -> Self {
        Self {
            users,
            purchases: Mutex::default(),
        }
    }

    /// Purchases recorded so far, oldest first.
    pub fn purchases(&self) -> Vec<Purchase> {
        self.purchases.lock().expect("purchases lock").clone()
    }
}

#[async_trait]
impl Transactor for InMemoryTransactor {
    async fn replenish(&self, purchase: &Purchase) -> Result<(), TransactorError> {
        if !self.users.credit_balance(&purchase.user_id, purchase.sum) {
            return Err(TransactorError::user_missing(purchase.user_id.to_string()));
        }
        self.purchases
            .lock()
            .expect("purchases lock")
            .push(purchase.clone());
        Ok(())
    }
}

/// Character assets held in a hash map keyed by kind and username.
#[derive(Default)]
pub struct InMemoryAssetStorage {
    assets: Mutex<HashMap<(&'static str, String), Vec<u8>>>,
}

impl InMemoryAssetStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssetStorage for InMemoryAssetStorage {
    async fn store(
        &self,
        kind: AssetKind,
        username: &Username,
        bytes: &[u8],
    ) -> Result<(), AssetStorageError> {
        let mut assets = self.assets.lock().expect("assets lock");
        assets.insert((kind.dir_name(), username.as_ref().to_owned()), bytes.to_vec());
        Ok(())
    }

    async fn remove(
        &self,
        kind: AssetKind,
        username: &Username,
    ) -> Result<bool, AssetStorageError> {
        let mut assets = self.assets.lock().expect("assets lock");
        Ok(assets
            .remove(&(kind.dir_name(), username.as_ref().to_owned()))
            .is_some())
    }
}
