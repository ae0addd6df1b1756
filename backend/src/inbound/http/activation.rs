//! Activation resend and completion handlers.
//!
//! Completion is a browser-facing GET: the outcome is flashed into the
//! session as a notification and the user is redirected to the storefront,
//! which collects the flash on its next request.

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use serde_json::json;

use crate::domain::activation::ActivationCode;
use crate::domain::user::Email;
use crate::domain::{Error, Notification};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/v1/auth/activation/repeat`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RepeatRequest {
    pub email: String,
}

/// Re-issue the activation code and mail it again.
#[utoipa::path(
    post,
    path = "/api/v1/auth/activation/repeat",
    request_body = RepeatRequest,
    responses(
        (status = 200, description = "Fresh code mailed"),
        (status = 404, description = "No account with that email", body = Error),
        (status = 409, description = "Account already activated", body = Error),
    ),
    tags = ["auth"],
    operation_id = "repeatActivation",
    security([])
)]
#[post("/auth/activation/repeat")]
pub async fn repeat(
    state: web::Data<HttpState>,
    payload: web::Json<RepeatRequest>,
) -> ApiResult<HttpResponse> {
    let email = Email::new(&payload.email).map_err(|e| {
        Error::invalid_request("invalid_email", e.to_string())
            .with_notification(Notification::error(e.to_string()))
    })?;
    state.registration.resend_activation(&email).await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "notifications": [Notification::success("A new confirmation mail is on its way.")],
    })))
}

/// Collect notifications flashed across a redirect.
///
/// The storefront calls this after following the activation redirect; the
/// queue is emptied by the read.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    responses((status = 200, description = "Pending notifications, flashed at most once")),
    tags = ["auth"],
    operation_id = "collectNotifications",
    security([])
)]
#[get("/notifications")]
pub async fn notifications(session: SessionContext) -> ApiResult<HttpResponse> {
    let notifications = session.take_notifications()?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "notifications": notifications,
    })))
}

fn redirect_to(app_url: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, app_url.to_owned()))
        .finish()
}

/// Complete an activation from the mailed link and redirect to the app.
#[utoipa::path(
    get,
    path = "/api/v1/auth/activation/complete/{code}",
    params(("code" = String, Path, description = "Activation code from the confirmation mail")),
    responses((status = 302, description = "Redirect to the storefront with a flashed outcome")),
    tags = ["auth"],
    operation_id = "completeActivation",
    security([])
)]
#[get("/auth/activation/complete/{code}")]
pub async fn complete(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let Ok(code) = ActivationCode::parse(path.into_inner()) else {
        session.flash(Notification::error("That activation link is not valid."))?;
        return Ok(redirect_to(&state.app_url));
    };

    if state.activator.complete(&code).await? {
        session.flash(Notification::success("Your account is now activated."))?;
    } else {
        session.flash(Notification::error(
            "That activation link has expired or was already used.",
        ))?;
    }
    Ok(redirect_to(&state.app_url))
}
