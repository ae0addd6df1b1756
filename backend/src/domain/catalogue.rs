//! Storefront catalogue: sellable items and the products that package them.
//!
//! An item is the in-game essence (a block, a permission group, currency); a
//! product binds an item to a price and stack size. Items are never sold
//! directly, only through a product.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::Error;
use super::pagination::{Page, PageRequest};
use super::ports::catalogue_query::{CatalogueQuery, CatalogueQueryError};

/// What an item represents inside the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A common block or inventory item.
    Item,
    /// A permission group granted to the buyer.
    Permgroup,
    /// In-game currency.
    Currency,
    /// Ownership of a protected region.
    RegionOwner,
    /// Membership of a protected region.
    RegionMember,
    /// A server command executed on delivery.
    Command,
}

impl ItemKind {
    /// Stable string form used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Permgroup => "permgroup",
            Self::Currency => "currency",
            Self::RegionOwner => "region_owner",
            Self::RegionMember => "region_member",
            Self::Command => "command",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored item kind string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown item kind: {0}")]
pub struct UnknownItemKind(pub String);

impl FromStr for ItemKind {
    type Err = UnknownItemKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "item" => Ok(Self::Item),
            "permgroup" => Ok(Self::Permgroup),
            "currency" => Ok(Self::Currency),
            "region_owner" => Ok(Self::RegionOwner),
            "region_member" => Ok(Self::RegionMember),
            "command" => Ok(Self::Command),
            other => Err(UnknownItemKind(other.to_owned())),
        }
    }
}

/// A sellable in-game essence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub kind: ItemKind,
    /// Image file name shown on store pages; `None` falls back to a default.
    pub image: Option<String>,
    /// In-game identification data: an item id, a permission group name, or
    /// a region identifier depending on `kind`.
    pub signature: Option<String>,
    /// Extra delivery data, e.g. NBT tags.
    pub extra: Option<String>,
}

/// A priced packaging of an item for sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub item_id: Uuid,
    pub price: Decimal,
    /// How many units one purchase delivers.
    pub stack: i32,
}

/// Product joined with its item for the customer-facing listing.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProductCard {
    pub product_id: Uuid,
    pub name: String,
    pub kind: ItemKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub price: Decimal,
    pub stack: i32,
}

fn map_query_error(error: CatalogueQueryError) -> Error {
    match error {
        CatalogueQueryError::Connection { message } => Error::service_unavailable(message),
        CatalogueQueryError::Query { message } => Error::internal(message),
    }
}

/// Read-side service behind the storefront listing.
#[derive(Clone)]
pub struct CatalogueService {
    query: Arc<dyn CatalogueQuery>,
}

impl CatalogueService {
    pub fn new(query: Arc<dyn CatalogueQuery>) -> Self {
        Self { query }
    }

    /// One page of products for the storefront.
    pub async fn products(&self, request: &PageRequest) -> Result<Page<ProductCard>, Error> {
        self.query.products(request).await.map_err(map_query_error)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use rstest::rstest;

    use super::*;
    use crate::domain::error::ErrorCode;

    #[rstest]
    #[case(ItemKind::Item, "item")]
    #[case(ItemKind::Permgroup, "permgroup")]
    #[case(ItemKind::RegionOwner, "region_owner")]
    #[case(ItemKind::Command, "command")]
    fn kind_string_form_roundtrips(#[case] kind: ItemKind, #[case] s: &str) {
        assert_eq!(kind.as_str(), s);
        assert_eq!(s.parse::<ItemKind>().expect("known kind"), kind);
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let err = "enchantment".parse::<ItemKind>().expect_err("must fail");
        assert_eq!(err, UnknownItemKind("enchantment".to_owned()));
    }

    struct FailingQuery;

    #[async_trait]
    impl CatalogueQuery for FailingQuery {
        async fn products(
            &self,
            _request: &PageRequest,
        ) -> Result<Page<ProductCard>, CatalogueQueryError> {
            Err(CatalogueQueryError::connection("refused"))
        }
    }

    #[tokio::test]
    async fn connection_failure_maps_to_service_unavailable() {
        let service = CatalogueService::new(Arc::new(FailingQuery));
        let err = service
            .products(&PageRequest::default())
            .await
            .expect_err("query failure must surface");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
