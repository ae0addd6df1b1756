//! Diesel-backed `ActivationRepository` adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::OptionalExtension;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::activation::{Activation, ActivationCode};
use crate::domain::ports::activation_repository::{
    ActivationPersistenceError, ActivationRepository,
};
use crate::domain::user::UserId;

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ActivationRow, NewActivationRow};
use super::pool::DbPool;
use super::schema::activations;

/// Activation persistence on PostgreSQL.
#[derive(Clone)]
pub struct DieselActivationRepository {
    pool: DbPool,
}

impl DieselActivationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_query_error(error: diesel::result::Error) -> ActivationPersistenceError {
    map_diesel_error(
        error,
        ActivationPersistenceError::query,
        ActivationPersistenceError::connection,
    )
}

fn map_insert_error(error: diesel::result::Error) -> ActivationPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if matches!(
        &error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    ) {
        return ActivationPersistenceError::duplicate_code();
    }
    map_query_error(error)
}

fn into_domain(row: ActivationRow) -> Result<Activation, ActivationPersistenceError> {
    Activation::try_from(row).map_err(ActivationPersistenceError::query)
}

#[async_trait]
impl ActivationRepository for DieselActivationRepository {
    async fn insert(&self, activation: &Activation) -> Result<(), ActivationPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, ActivationPersistenceError::connection))?;
        diesel::insert_into(activations::table)
            .values(NewActivationRow::from(activation))
            .execute(&mut conn)
            .await
            .map_err(map_insert_error)?;
        Ok(())
    }

    async fn find_by_code(
        &self,
        code: &ActivationCode,
    ) -> Result<Option<Activation>, ActivationPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, ActivationPersistenceError::connection))?;
        let row = activations::table
            .filter(activations::code.eq(code.as_ref()))
            .select(ActivationRow::as_select())
            .first::<ActivationRow>(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;
        row.map(into_domain).transpose()
    }

    async fn find_completed_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Activation>, ActivationPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, ActivationPersistenceError::connection))?;
        let row = activations::table
            .filter(activations::user_id.eq(user_id.as_uuid()))
            .filter(activations::completed.eq(true))
            .select(ActivationRow::as_select())
            .first::<ActivationRow>(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;
        row.map(into_domain).transpose()
    }

    async fn find_pending_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Activation>, ActivationPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, ActivationPersistenceError::connection))?;
        let row = activations::table
            .filter(activations::user_id.eq(user_id.as_uuid()))
            .filter(activations::completed.eq(false))
            .select(ActivationRow::as_select())
            .first::<ActivationRow>(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;
        row.map(into_domain).transpose()
    }

    async fn mark_completed(
        &self,
        id: &Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, ActivationPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, ActivationPersistenceError::connection))?;
        // The completed guard makes the update a compare-and-set: of two
        // racing completions only one matches the row.
        let updated = diesel::update(
            activations::table
                .filter(activations::id.eq(id))
                .filter(activations::completed.eq(false)),
        )
        .set((
            activations::completed.eq(true),
            activations::completed_at.eq(Some(at)),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_query_error)?;
        Ok(updated == 1)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), ActivationPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, ActivationPersistenceError::connection))?;
        diesel::delete(activations::table.filter(activations::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(map_query_error)?;
        Ok(())
    }
}
