//! Diesel-backed `UserRepository` adapter.

use async_trait::async_trait;
use diesel::OptionalExtension;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::user_repository::{UserPersistenceError, UserRepository};
use crate::domain::user::{Email, User, UserId, Username};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// User persistence on PostgreSQL.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_query_error(error: diesel::result::Error) -> UserPersistenceError {
    map_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn map_insert_error(error: diesel::result::Error, user: &User) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = &error {
        return match info.constraint_name() {
            Some("users_email_key") => UserPersistenceError::duplicate_email(user.email.as_ref()),
            _ => UserPersistenceError::duplicate_username(user.username.as_ref()),
        };
    }
    map_query_error(error)
}

fn into_domain(row: UserRow) -> Result<User, UserPersistenceError> {
    User::try_from(row).map_err(UserPersistenceError::query)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, UserPersistenceError::connection))?;
        diesel::insert_into(users::table)
            .values(NewUserRow::from(user))
            .execute(&mut conn)
            .await
            .map_err(|e| map_insert_error(e, user))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, UserPersistenceError::connection))?;
        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;
        row.map(into_domain).transpose()
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, UserPersistenceError::connection))?;
        let row = users::table
            .filter(users::username.eq(username.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;
        row.map(into_domain).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, UserPersistenceError::connection))?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;
        row.map(into_domain).transpose()
    }

    async fn set_skin_hash(
        &self,
        id: &UserId,
        hash: Option<&str>,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, UserPersistenceError::connection))?;
        diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(users::skin_hash.eq(hash))
            .execute(&mut conn)
            .await
            .map_err(map_query_error)?;
        Ok(())
    }

    async fn set_cloak_hash(
        &self,
        id: &UserId,
        hash: Option<&str>,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, UserPersistenceError::connection))?;
        diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(users::cloak_hash.eq(hash))
            .execute(&mut conn)
            .await
            .map_err(map_query_error)?;
        Ok(())
    }
}
