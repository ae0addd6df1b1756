//! Diesel-backed `RoleRepository` adapter.

use async_trait::async_trait;
use diesel::OptionalExtension;
use diesel::PgTextExpressionMethods;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::pagination::{Page, PageRequest};
use crate::domain::ports::role_repository::{RolePersistenceError, RoleRepository};
use crate::domain::roles::{Permission, Role, RoleId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewRolePermissionRow, NewRoleRow, PermissionRow, RoleRow};
use super::pool::DbPool;
use super::schema::{permissions, role_permissions, roles};

/// Role and permission persistence on PostgreSQL.
#[derive(Clone)]
pub struct DieselRoleRepository {
    pool: DbPool,
}

impl DieselRoleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_query_error(error: diesel::result::Error) -> RolePersistenceError {
    map_diesel_error(
        error,
        RolePersistenceError::query,
        RolePersistenceError::connection,
    )
}

fn map_name_conflict(error: diesel::result::Error, name: &str) -> RolePersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if matches!(
        &error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    ) {
        return RolePersistenceError::duplicate_name(name);
    }
    map_query_error(error)
}

#[async_trait]
impl RoleRepository for DieselRoleRepository {
    async fn insert(&self, role: &Role) -> Result<(), RolePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, RolePersistenceError::connection))?;
        diesel::insert_into(roles::table)
            .values(NewRoleRow {
                id: *role.id.as_uuid(),
                name: &role.name,
            })
            .execute(&mut conn)
            .await
            .map_err(|e| map_name_conflict(e, &role.name))?;
        Ok(())
    }

    async fn find(&self, id: &RoleId) -> Result<Option<Role>, RolePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, RolePersistenceError::connection))?;
        let row = roles::table
            .filter(roles::id.eq(id.as_uuid()))
            .select(RoleRow::as_select())
            .first::<RoleRow>(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;
        Ok(row.map(Role::from))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, RolePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, RolePersistenceError::connection))?;
        let row = roles::table
            .filter(roles::name.eq(name))
            .select(RoleRow::as_select())
            .first::<RoleRow>(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;
        Ok(row.map(Role::from))
    }

    async fn rename(&self, id: &RoleId, name: &str) -> Result<(), RolePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, RolePersistenceError::connection))?;
        diesel::update(roles::table.filter(roles::id.eq(id.as_uuid())))
            .set(roles::name.eq(name))
            .execute(&mut conn)
            .await
            .map_err(|e| map_name_conflict(e, name))?;
        Ok(())
    }

    async fn set_permissions(
        &self,
        id: &RoleId,
        permission_ids: &[Uuid],
    ) -> Result<(), RolePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, RolePersistenceError::connection))?;
        let role_id = *id.as_uuid();
        let rows: Vec<NewRolePermissionRow> = permission_ids
            .iter()
            .map(|permission_id| NewRolePermissionRow {
                role_id,
                permission_id: *permission_id,
            })
            .collect();
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::delete(role_permissions::table.filter(role_permissions::role_id.eq(role_id)))
                    .execute(conn)
                    .await?;
                diesel::insert_into(role_permissions::table)
                    .values(&rows)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_query_error)
    }

    async fn delete(&self, id: &RoleId) -> Result<(), RolePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, RolePersistenceError::connection))?;
        let role_id = *id.as_uuid();
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::delete(role_permissions::table.filter(role_permissions::role_id.eq(role_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(roles::table.filter(roles::id.eq(role_id)))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_query_error)
    }

    async fn page(&self, request: &PageRequest) -> Result<Page<Role>, RolePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, RolePersistenceError::connection))?;

        let pattern = request.search().map(|s| format!("%{s}%"));

        let mut count_query = roles::table.into_boxed();
        if let Some(pattern) = &pattern {
            count_query = count_query.filter(roles::name.ilike(pattern.clone()));
        }
        let total: i64 = count_query
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_query_error)?;

        let mut listing = roles::table.into_boxed();
        if let Some(pattern) = &pattern {
            listing = listing.filter(roles::name.ilike(pattern.clone()));
        }
        listing = if request.is_descending() {
            listing.order(roles::name.desc())
        } else {
            listing.order(roles::name.asc())
        };
        let rows = listing
            .offset(request.offset())
            .limit(request.limit())
            .select(RoleRow::as_select())
            .load::<RoleRow>(&mut conn)
            .await
            .map_err(map_query_error)?;

        let items = rows.into_iter().map(Role::from).collect();
        Ok(Page::new(items, total.max(0) as u64, request))
    }

    async fn permissions_of(
        &self,
        id: &RoleId,
    ) -> Result<Option<Vec<Permission>>, RolePersistenceError> {
        if self.find(id).await?.is_none() {
            return Ok(None);
        }
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, RolePersistenceError::connection))?;
        let rows = role_permissions::table
            .inner_join(permissions::table)
            .filter(role_permissions::role_id.eq(id.as_uuid()))
            .select(PermissionRow::as_select())
            .load::<PermissionRow>(&mut conn)
            .await
            .map_err(map_query_error)?;
        Ok(Some(rows.into_iter().map(Permission::from).collect()))
    }

    async fn permissions_by_keys(
        &self,
        keys: &[String],
    ) -> Result<Vec<Permission>, RolePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, RolePersistenceError::connection))?;
        let rows = permissions::table
            .filter(permissions::key.eq_any(keys))
            .select(PermissionRow::as_select())
            .load::<PermissionRow>(&mut conn)
            .await
            .map_err(map_query_error)?;
        Ok(rows.into_iter().map(Permission::from).collect())
    }
}
