//! Port abstraction for the storefront product listing.

use async_trait::async_trait;

use crate::domain::catalogue::ProductCard;
use crate::domain::pagination::{Page, PageRequest};

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by catalogue query adapters.
    pub enum CatalogueQueryError {
        /// The store could not be reached.
        Connection { message: String } => "catalogue connection failed: {message}",
        /// The listing query failed.
        Query { message: String } => "catalogue query failed: {message}",
    }
}

/// Driven port producing the customer-facing product listing.
#[async_trait]
pub trait CatalogueQuery: Send + Sync {
    /// One page of products joined with their items.
    async fn products(
        &self,
        request: &PageRequest,
    ) -> Result<Page<ProductCard>, CatalogueQueryError>;
}
