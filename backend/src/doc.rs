//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] assembles the specification from the inbound handler
//! annotations. Swagger UI serves it in debug builds at `/docs`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::catalogue::ProductCard;
use crate::domain::{Error, ErrorCode, Notification, Severity};
use crate::inbound::http::activation::RepeatRequest;
use crate::inbound::http::auth::{LoginRequest, RegisterRequest};
use crate::inbound::http::balance::ReplenishRequest;
use crate::inbound::http::roles::{
    CreateRoleRequest, PermissionBody, RenameRoleRequest, RoleBody, SetPermissionsRequest,
};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the storefront API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Hardcraft storefront API",
        description = "Accounts, catalogue, balance, and admin endpoints for the game server store."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::activation::repeat,
        crate::inbound::http::activation::complete,
        crate::inbound::http::activation::notifications,
        crate::inbound::http::catalogue::products,
        crate::inbound::http::balance::replenish,
        crate::inbound::http::roles::list,
        crate::inbound::http::roles::create,
        crate::inbound::http::roles::permissions,
        crate::inbound::http::roles::rename,
        crate::inbound::http::roles::set_permissions,
        crate::inbound::http::roles::delete_role,
        crate::inbound::http::character::upload_skin,
        crate::inbound::http::character::delete_cloak,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Notification,
        Severity,
        ProductCard,
        RegisterRequest,
        LoginRequest,
        RepeatRequest,
        ReplenishRequest,
        RoleBody,
        PermissionBody,
        CreateRoleRequest,
        RenameRoleRequest,
        SetPermissionsRequest,
    )),
    tags(
        (name = "auth", description = "Registration, activation, and sessions"),
        (name = "catalogue", description = "Storefront product listings"),
        (name = "balance", description = "Balance replenishment"),
        (name = "admin", description = "Role, permission, and character administration"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Structure checks over the generated document.

    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    use super::*;

    #[test]
    fn error_schema_exposes_only_the_public_envelope() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error = schemas.get("Error").expect("Error schema");
        match error {
            RefOr::T(Schema::Object(obj)) => {
                assert!(obj.properties.contains_key("status"));
                assert!(
                    !obj.properties.contains_key("message"),
                    "log message must not appear in the public schema"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn all_storefront_paths_are_registered() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/auth/register",
            "/api/v1/auth/login",
            "/api/v1/auth/activation/repeat",
            "/api/v1/auth/activation/complete/{code}",
            "/api/v1/catalogue/products",
            "/api/v1/balance/replenish",
            "/api/v1/admin/roles",
            "/api/v1/admin/roles/{role}/permissions",
            "/api/v1/admin/users/{user}/skin",
            "/health/ready",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "missing path {path} in the OpenAPI document"
            );
        }
    }
}
