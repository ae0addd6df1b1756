//! Domain-level error and notification types.
//!
//! These types are transport agnostic. Inbound adapters map them to HTTP
//! status codes and the JSON envelope; the domain only decides the failure
//! category, the machine-readable status string, and what the user should be
//! told about it.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stable machine-readable error category describing the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// The operation conflicts with existing state.
    Conflict,
    /// A backing dependency is temporarily unavailable.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// How a notification should be presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Info,
    Error,
}

/// A human-readable message surfaced alongside a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    /// Build a success notification.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    /// Build an informational notification.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    /// Build an error notification.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Domain error payload.
///
/// The `status` string is what clients switch on (`user_not_found`,
/// `role_already_exists`, ...); the `code` decides the HTTP status; the
/// `message` is for logs and is never serialised to clients.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Error {
    #[serde(skip)]
    code: ErrorCode,
    #[schema(example = "user_not_found")]
    status: String,
    #[serde(skip)]
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    notifications: Vec<Notification>,
}

impl Error {
    /// Create a new error with an explicit category and status string.
    pub fn new(code: ErrorCode, status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            status: status.into(),
            message: message.into(),
            notifications: Vec::new(),
        }
    }

    /// Failure category used for HTTP status mapping.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Machine-readable status string for the JSON envelope.
    pub fn status(&self) -> &str {
        self.status.as_str()
    }

    /// Log-facing description of the failure.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// User-facing notifications attached to the failure.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Attach a user-facing notification.
    #[must_use]
    pub fn with_notification(mut self, notification: Notification) -> Self {
        self.notifications.push(notification);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, status, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, status, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, status, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, status, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, status, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, "service_unavailable", message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, "internal_error", message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

impl std::error::Error for Error {}
