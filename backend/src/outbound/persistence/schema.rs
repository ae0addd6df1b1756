//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match the migrations exactly; `diesel print-schema` can
//! regenerate them from a live database after a migration change.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        password_hash -> Varchar,
        balance -> Numeric,
        skin_hash -> Nullable<Varchar>,
        cloak_hash -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Activation codes, pending and completed.
    activations (id) {
        id -> Uuid,
        user_id -> Uuid,
        code -> Varchar,
        completed -> Bool,
        created_at -> Timestamptz,
        completed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Balance replenishment purchases.
    purchases (id) {
        id -> Uuid,
        user_id -> Uuid,
        sum -> Numeric,
        ip -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Access-control roles.
    roles (id) {
        id -> Uuid,
        name -> Varchar,
    }
}

diesel::table! {
    /// Permission catalogue keyed by dotted permission strings.
    permissions (id) {
        id -> Uuid,
        key -> Varchar,
    }
}

diesel::table! {
    /// Role to permission assignments.
    role_permissions (role_id, permission_id) {
        role_id -> Uuid,
        permission_id -> Uuid,
    }
}

diesel::table! {
    /// Sellable in-game essences.
    items (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Nullable<Text>,
        kind -> Varchar,
        image -> Nullable<Varchar>,
        signature -> Nullable<Varchar>,
        extra -> Nullable<Text>,
    }
}

diesel::table! {
    /// Priced packagings of items.
    products (id) {
        id -> Uuid,
        item_id -> Uuid,
        price -> Numeric,
        stack -> Int4,
    }
}

diesel::joinable!(activations -> users (user_id));
diesel::joinable!(purchases -> users (user_id));
diesel::joinable!(role_permissions -> roles (role_id));
diesel::joinable!(role_permissions -> permissions (permission_id));
diesel::joinable!(products -> items (item_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    activations,
    purchases,
    roles,
    permissions,
    role_permissions,
    items,
    products,
);
