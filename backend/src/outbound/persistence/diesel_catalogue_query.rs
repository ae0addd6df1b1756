//! Diesel-backed `CatalogueQuery` adapter joining products with items.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::catalogue::ProductCard;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::ports::catalogue_query::{CatalogueQuery, CatalogueQueryError};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::ProductCardRow;
use super::pool::DbPool;
use super::schema::{items, products};

/// Storefront listing reads on PostgreSQL.
#[derive(Clone)]
pub struct DieselCatalogueQuery {
    pool: DbPool,
}

impl DieselCatalogueQuery {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_query_error(error: diesel::result::Error) -> CatalogueQueryError {
    map_diesel_error(
        error,
        CatalogueQueryError::query,
        CatalogueQueryError::connection,
    )
}

#[async_trait]
impl CatalogueQuery for DieselCatalogueQuery {
    async fn products(
        &self,
        request: &PageRequest,
    ) -> Result<Page<ProductCard>, CatalogueQueryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, CatalogueQueryError::connection))?;

        let total: i64 = products::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_query_error)?;

        let rows = products::table
            .inner_join(items::table)
            .order(items::name.asc())
            .offset(request.offset())
            .limit(request.limit())
            .select((
                products::id,
                items::name,
                items::kind,
                items::image,
                products::price,
                products::stack,
            ))
            .load::<ProductCardRow>(&mut conn)
            .await
            .map_err(map_query_error)?;

        let items = rows
            .into_iter()
            .map(ProductCard::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(CatalogueQueryError::query)?;
        Ok(Page::new(items, total.max(0) as u64, request))
    }
}
