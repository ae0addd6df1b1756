//! Registration, login, and logout handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"username":"D3lph1","email":"a@b.com","password":"secret"}
//! POST /api/v1/auth/login    {"username":"D3lph1","password":"secret"}
//! POST /api/v1/auth/logout
//! ```

use actix_web::{HttpResponse, post, web};
use serde::Deserialize;
use serde_json::json;

use crate::domain::user::{Email, Username, UserValidationError};
use crate::domain::{Error, Notification};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/v1/auth/register`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

fn map_validation_error(status: &'static str, err: &UserValidationError) -> Error {
    Error::invalid_request(status, err.to_string())
        .with_notification(Notification::error(err.to_string()))
}

/// Create an account and mail its activation code.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created, confirmation mail sent"),
        (status = 400, description = "Invalid username, email, or password", body = Error),
        (status = 409, description = "Username or email already taken", body = Error),
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let username = Username::new(&payload.username)
        .map_err(|e| map_validation_error("invalid_username", &e))?;
    let email =
        Email::new(&payload.email).map_err(|e| map_validation_error("invalid_email", &e))?;
    if payload.password.is_empty() {
        return Err(Error::invalid_request("invalid_password", "empty password")
            .with_notification(Notification::error("Password must not be empty.")));
    }

    let user = state
        .registration
        .register(username, email, &payload.password)
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "user_id": user.id,
        "notifications": [Notification::success(
            "Account created. Follow the link in your mailbox to activate it.",
        )],
    })))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 401, description = "Wrong password", body = Error),
        (status = 404, description = "Unknown username", body = Error),
        (status = 409, description = "A login checkpoint rejected the attempt", body = Error),
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let user = state
        .auth
        .login(&payload.username, &payload.password)
        .await?;
    session.persist_user(&user.id)?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "user_id": user.id,
        "username": user.username,
    })))
}

/// Drop the current session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 200, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.clear();
    Ok(HttpResponse::Ok().json(json!({ "status": "success" })))
}
