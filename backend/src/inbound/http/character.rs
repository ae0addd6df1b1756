//! Admin character asset handlers.

use actix_web::{HttpResponse, delete, post, web};
use serde_json::json;
use uuid::Uuid;

use crate::domain::user::UserId;
use crate::domain::{Error, Notification};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Store a new skin for the user.
#[utoipa::path(
    post,
    path = "/api/v1/admin/users/{user}/skin",
    params(("user" = Uuid, Path, description = "User identifier")),
    request_body(content = Vec<u8>, content_type = "image/png"),
    responses(
        (status = 200, description = "Skin stored and hash recorded"),
        (status = 400, description = "Not a PNG or wrong aspect ratio", body = Error),
        (status = 404, description = "Unknown user", body = Error),
    ),
    tags = ["admin"],
    operation_id = "uploadSkin"
)]
#[post("/admin/users/{user}/skin")]
pub async fn upload_skin(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let user_id = UserId::from_uuid(path.into_inner());
    state.character.upload_skin(&user_id, &body).await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "notifications": [Notification::success("Skin updated.")],
    })))
}

/// Remove the user's cloak.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{user}/cloak",
    params(("user" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Cloak removed, or nothing to remove"),
        (status = 404, description = "Unknown user", body = Error),
    ),
    tags = ["admin"],
    operation_id = "deleteCloak"
)]
#[delete("/admin/users/{user}/cloak")]
pub async fn delete_cloak(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let user_id = UserId::from_uuid(path.into_inner());
    let deleted = state.character.delete_cloak(&user_id).await?;
    let notification = if deleted {
        Notification::success("Cloak removed.")
    } else {
        Notification::info("This user has no cloak.")
    };
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "deleted": deleted,
        "notifications": [notification],
    })))
}
