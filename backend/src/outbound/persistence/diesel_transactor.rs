//! Diesel-backed `Transactor` adapter.
//!
//! The purchase insert and the balance credit run inside one database
//! transaction; either both commit or neither does.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::transactor::{Transactor, TransactorError};
use crate::domain::purchasing::Purchase;

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewPurchaseRow;
use super::pool::DbPool;
use super::schema::{purchases, users};

/// Purchase transaction handling on PostgreSQL.
#[derive(Clone)]
pub struct DieselTransactor {
    pool: DbPool,
}

impl DieselTransactor {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Transactor for DieselTransactor {
    async fn replenish(&self, purchase: &Purchase) -> Result<(), TransactorError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, TransactorError::connection))?;

        let row = NewPurchaseRow {
            id: purchase.id,
            user_id: *purchase.user_id.as_uuid(),
            sum: purchase.sum,
            ip: purchase.ip.to_string(),
            created_at: purchase.created_at,
        };
        let user_id = *purchase.user_id.as_uuid();
        let sum = purchase.sum;

        let outcome = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    diesel::insert_into(purchases::table)
                        .values(&row)
                        .execute(conn)
                        .await?;
                    let credited = diesel::update(users::table.filter(users::id.eq(user_id)))
                        .set(users::balance.eq(users::balance + sum))
                        .execute(conn)
                        .await?;
                    // Zero updated rows means the user vanished; roll back.
                    if credited == 0 {
                        return Err(diesel::result::Error::NotFound);
                    }
                    Ok(())
                }
                .scope_boxed()
            })
            .await;

        use diesel::result::{DatabaseErrorKind, Error as DieselError};
        outcome.map_err(|error| match error {
            // The foreign key case fires when the insert races a user delete.
            DieselError::NotFound
            | DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                TransactorError::user_missing(purchase.user_id.to_string())
            }
            other => map_diesel_error(other, TransactorError::query, TransactorError::connection),
        })
    }
}
