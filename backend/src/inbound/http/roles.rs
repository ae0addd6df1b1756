//! Admin role and permission handlers.
//!
//! ```text
//! GET    /api/v1/admin/roles?page=&per_page=&search=&descending=
//! POST   /api/v1/admin/roles {"name":"moderator","permissions":["users.ban"]}
//! GET    /api/v1/admin/roles/{role}/permissions
//! PUT    /api/v1/admin/roles/{role}/name {"name":"helper"}
//! PUT    /api/v1/admin/roles/{role}/permissions {"permissions":["users.ban"]}
//! DELETE /api/v1/admin/roles/{role}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::pagination::{DEFAULT_PER_PAGE, PageRequest};
use crate::domain::roles::{Permission, Role, RoleId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Query parameters for the role listing.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct RoleListingQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub descending: Option<bool>,
}

impl From<RoleListingQuery> for PageRequest {
    fn from(query: RoleListingQuery) -> Self {
        Self::new(
            query.page.unwrap_or(1),
            query.per_page.unwrap_or(DEFAULT_PER_PAGE),
        )
        .with_search(query.search)
        .descending(query.descending.unwrap_or(false))
    }
}

/// Role representation returned by the admin endpoints.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RoleBody {
    pub id: Uuid,
    pub name: String,
}

impl From<Role> for RoleBody {
    fn from(role: Role) -> Self {
        Self {
            id: *role.id.as_uuid(),
            name: role.name,
        }
    }
}

/// Permission representation returned by the admin endpoints.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PermissionBody {
    pub id: Uuid,
    pub key: String,
}

impl From<Permission> for PermissionBody {
    fn from(permission: Permission) -> Self {
        Self {
            id: permission.id,
            key: permission.key,
        }
    }
}

/// Request body for role creation.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Request body for renaming a role.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RenameRoleRequest {
    pub name: String,
}

/// Request body for replacing a role's permissions.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SetPermissionsRequest {
    pub permissions: Vec<String>,
}

/// Paginated role listing.
#[utoipa::path(
    get,
    path = "/api/v1/admin/roles",
    params(RoleListingQuery),
    responses((status = 200, description = "Role page")),
    tags = ["admin"],
    operation_id = "listRoles"
)]
#[get("/admin/roles")]
pub async fn list(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<RoleListingQuery>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let page = state.roles.list(&query.into_inner().into()).await?;
    let total_pages = page.total_pages();
    let roles: Vec<RoleBody> = page.map(RoleBody::from).items;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "roles": roles,
        "total_pages": total_pages,
    })))
}

/// Create a role with an initial permission set.
#[utoipa::path(
    post,
    path = "/api/v1/admin/roles",
    request_body = CreateRoleRequest,
    responses(
        (status = 200, description = "Role created", body = RoleBody),
        (status = 404, description = "Unknown permission key", body = Error),
        (status = 409, description = "Role name already exists", body = Error),
    ),
    tags = ["admin"],
    operation_id = "createRole"
)]
#[post("/admin/roles")]
pub async fn create(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateRoleRequest>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let payload = payload.into_inner();
    let role = state.roles.create(&payload.name, &payload.permissions).await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "role": RoleBody::from(role),
    })))
}

/// Permissions assigned to a role.
#[utoipa::path(
    get,
    path = "/api/v1/admin/roles/{role}/permissions",
    params(("role" = Uuid, Path, description = "Role identifier")),
    responses(
        (status = 200, description = "Assigned permissions", body = [PermissionBody]),
        (status = 404, description = "Unknown role", body = Error),
    ),
    tags = ["admin"],
    operation_id = "rolePermissions"
)]
#[get("/admin/roles/{role}/permissions")]
pub async fn permissions(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let id = RoleId::from_uuid(path.into_inner());
    let permissions: Vec<PermissionBody> = state
        .roles
        .permissions(&id)
        .await?
        .into_iter()
        .map(PermissionBody::from)
        .collect();
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "permissions": permissions,
    })))
}

/// Rename a role.
#[utoipa::path(
    put,
    path = "/api/v1/admin/roles/{role}/name",
    params(("role" = Uuid, Path, description = "Role identifier")),
    request_body = RenameRoleRequest,
    responses(
        (status = 200, description = "Role renamed"),
        (status = 404, description = "Unknown role", body = Error),
        (status = 409, description = "Name already taken", body = Error),
    ),
    tags = ["admin"],
    operation_id = "renameRole"
)]
#[put("/admin/roles/{role}/name")]
pub async fn rename(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<RenameRoleRequest>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let id = RoleId::from_uuid(path.into_inner());
    state.roles.update_name(&id, &payload.name).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success" })))
}

/// Replace a role's permission assignments.
#[utoipa::path(
    put,
    path = "/api/v1/admin/roles/{role}/permissions",
    params(("role" = Uuid, Path, description = "Role identifier")),
    request_body = SetPermissionsRequest,
    responses(
        (status = 200, description = "Permissions replaced"),
        (status = 404, description = "Unknown role or permission key", body = Error),
    ),
    tags = ["admin"],
    operation_id = "setRolePermissions"
)]
#[put("/admin/roles/{role}/permissions")]
pub async fn set_permissions(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<SetPermissionsRequest>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let id = RoleId::from_uuid(path.into_inner());
    state
        .roles
        .update_permissions(&id, &payload.permissions)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success" })))
}

/// Delete a role and its assignments.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/roles/{role}",
    params(("role" = Uuid, Path, description = "Role identifier")),
    responses(
        (status = 200, description = "Role deleted"),
        (status = 404, description = "Unknown role", body = Error),
    ),
    tags = ["admin"],
    operation_id = "deleteRole"
)]
#[delete("/admin/roles/{role}")]
pub async fn delete_role(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let id = RoleId::from_uuid(path.into_inner());
    state.roles.delete(&id).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success" })))
}
