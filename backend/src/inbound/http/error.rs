//! HTTP adapter mapping for domain errors.
//!
//! Keeps the domain error type HTTP-agnostic while letting actix handlers
//! return it directly. The response body is the JSON envelope with the
//! machine-readable `status` and any user-facing notifications; the internal
//! log message never leaves the process.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(err: &Error) -> Error {
    if matches!(err.code(), ErrorCode::InternalError) {
        error!(message = err.message(), "internal error redacted from response");
        Error::internal("internal server error")
    } else {
        err.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("internal server error")
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the JSON error envelope.
    use actix_web::body::to_bytes;
    use rstest::rstest;

    use super::*;
    use crate::domain::Notification;

    #[rstest]
    #[case(Error::not_found("user_not_found", "gone"), StatusCode::NOT_FOUND)]
    #[case(Error::conflict("role_already_exists", "dup"), StatusCode::CONFLICT)]
    #[case(Error::unauthorized("invalid_credentials", "no"), StatusCode::UNAUTHORIZED)]
    #[case(Error::invalid_request("invalid_ratio", "bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn categories_map_to_status_codes(#[case] err: Error, #[case] expected: StatusCode) {
        assert_eq!(err.status_code(), expected);
    }

    #[actix_web::test]
    async fn response_body_carries_status_and_notifications() {
        let err = Error::conflict("user_not_activated", "pending activation")
            .with_notification(Notification::error("Confirm your email address."));
        let body = to_bytes(err.error_response().into_body())
            .await
            .expect("body bytes");
        let value: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(value["status"], "user_not_activated");
        assert_eq!(
            value["notifications"][0]["message"],
            "Confirm your email address."
        );
    }

    #[actix_web::test]
    async fn internal_details_are_redacted() {
        let err = Error::internal("connection string leaked");
        let body = to_bytes(err.error_response().into_body())
            .await
            .expect("body bytes");
        let value: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(value["status"], "internal_error");
        assert!(!body.iter().eq(b"connection string leaked".iter()));
    }
}
