//! Internal Diesel row structs and their domain conversions.
//!
//! These types never leave the persistence layer; repositories convert them
//! to domain values at the boundary. Conversions can fail when a stored
//! value no longer satisfies domain validation, which repositories surface
//! as query errors rather than panicking.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::activation::{Activation, ActivationCode};
use crate::domain::catalogue::ProductCard;
use crate::domain::roles::{Permission, Role, RoleId};
use crate::domain::user::{Email, User, UserId, Username};

use super::schema::{activations, permissions, purchases, role_permissions, roles, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub balance: Decimal,
    pub skin_hash: Option<String>,
    pub cloak_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::from_uuid(row.id),
            username: Username::new(&row.username).map_err(|e| e.to_string())?,
            email: Email::new(&row.email).map_err(|e| e.to_string())?,
            password_hash: row.password_hash,
            balance: row.balance,
            skin_hash: row.skin_hash,
            cloak_hash: row.cloak_hash,
            created_at: row.created_at,
        })
    }
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            username: user.username.as_ref(),
            email: user.email.as_ref(),
            password_hash: &user.password_hash,
            balance: user.balance,
            created_at: user.created_at,
        }
    }
}

/// Row struct for reading from the activations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = activations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ActivationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<ActivationRow> for Activation {
    type Error = String;

    fn try_from(row: ActivationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: UserId::from_uuid(row.user_id),
            code: ActivationCode::parse(&row.code).map_err(|e| e.to_string())?,
            completed: row.completed,
            created_at: row.created_at,
            completed_at: row.completed_at,
        })
    }
}

/// Insertable struct for creating activation records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = activations)]
pub(crate) struct NewActivationRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: &'a str,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a Activation> for NewActivationRow<'a> {
    fn from(activation: &'a Activation) -> Self {
        Self {
            id: activation.id,
            user_id: *activation.user_id.as_uuid(),
            code: activation.code.as_ref(),
            completed: activation.completed,
            created_at: activation.created_at,
        }
    }
}

/// Insertable struct for recording purchases.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = purchases)]
pub(crate) struct NewPurchaseRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub sum: Decimal,
    pub ip: String,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the roles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RoleRow {
    pub id: Uuid,
    pub name: String,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Self {
            id: RoleId::from_uuid(row.id),
            name: row.name,
        }
    }
}

/// Insertable struct for creating role records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = roles)]
pub(crate) struct NewRoleRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
}

/// Row struct for reading from the permissions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = permissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PermissionRow {
    pub id: Uuid,
    pub key: String,
}

impl From<PermissionRow> for Permission {
    fn from(row: PermissionRow) -> Self {
        Self {
            id: row.id,
            key: row.key,
        }
    }
}

/// Insertable struct for role-permission assignments.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = role_permissions)]
pub(crate) struct NewRolePermissionRow {
    pub role_id: Uuid,
    pub permission_id: Uuid,
}

/// Joined product/item row feeding the storefront listing.
#[derive(Debug, Clone, Queryable)]
pub(crate) struct ProductCardRow {
    pub product_id: Uuid,
    pub name: String,
    pub kind: String,
    pub image: Option<String>,
    pub price: Decimal,
    pub stack: i32,
}

impl TryFrom<ProductCardRow> for ProductCard {
    type Error = String;

    fn try_from(row: ProductCardRow) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: row.product_id,
            name: row.name,
            kind: row.kind.parse().map_err(|e: crate::domain::catalogue::UnknownItemKind| e.to_string())?,
            image: row.image,
            price: row.price,
            stack: row.stack,
        })
    }
}
