//! Storefront catalogue handlers.

use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use serde_json::json;

use crate::domain::Error;
use crate::domain::pagination::{DEFAULT_PER_PAGE, PageRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Query parameters for the product listing.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListingQuery {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Items per page, clamped server-side.
    pub per_page: Option<u32>,
}

impl From<ListingQuery> for PageRequest {
    fn from(query: ListingQuery) -> Self {
        Self::new(
            query.page.unwrap_or(1),
            query.per_page.unwrap_or(DEFAULT_PER_PAGE),
        )
    }
}

/// One page of products for the storefront.
#[utoipa::path(
    get,
    path = "/api/v1/catalogue/products",
    params(ListingQuery),
    responses(
        (status = 200, description = "Product page"),
        (status = 503, description = "Catalogue store unavailable", body = Error),
    ),
    tags = ["catalogue"],
    operation_id = "listProducts",
    security([])
)]
#[get("/catalogue/products")]
pub async fn products(
    state: web::Data<HttpState>,
    query: web::Query<ListingQuery>,
) -> ApiResult<HttpResponse> {
    let request = PageRequest::from(query.into_inner());
    let page = state.catalogue.products(&request).await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "products": page.items,
        "total": page.total,
        "total_pages": page.total_pages(),
        "page": page.page,
        "per_page": page.per_page,
    })))
}
