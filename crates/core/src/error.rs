//! Public error taxonomy.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Result type used across the service.
pub type ApiResult<T> = Result<T, ApiError>;

/// The closed set of failures a client can observe.
///
/// Every error that crosses the HTTP boundary is one of these five kinds.
/// Anything else must be wrapped as [`ApiError::Internal`] before it gets
/// anywhere near a response.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A requested resource does not exist.
    #[error("{message}")]
    NotFound { message: String, action: String },

    /// Input failed a business rule (e.g. a username already in use).
    #[error("{message}")]
    Validation { message: String, action: String },

    /// The caller is not authenticated, or credentials do not match.
    #[error("{message}")]
    Unauthorized { message: String, action: String },

    /// The route exists but does not support the request method.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// An unexpected failure. The cause is logged under `error_id`, never
    /// returned to the client.
    #[error("unexpected internal error ({error_id})")]
    Internal {
        error_id: Uuid,
        cause: anyhow::Error,
    },
}

impl ApiError {
    pub fn not_found(message: impl Into<String>, action: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            action: action.into(),
        }
    }

    /// Canonical catch-all for unknown resources and paths.
    pub fn resource_not_found() -> Self {
        Self::not_found(
            "The requested resource could not be found in the system.",
            "Check that the query parameters are correct.",
        )
    }

    pub fn validation(message: impl Into<String>, action: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            action: action.into(),
        }
    }

    /// Canonical validation failure when no more specific text applies.
    pub fn validation_failed() -> Self {
        Self::validation(
            "A validation error occurred.",
            "Adjust the data sent and try again.",
        )
    }

    pub fn unauthorized(message: impl Into<String>, action: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            action: action.into(),
        }
    }

    /// Canonical unauthenticated failure when no more specific text applies.
    pub fn not_authenticated() -> Self {
        Self::unauthorized("User is not authenticated.", "Log in again to continue.")
    }

    pub fn method_not_allowed() -> Self {
        Self::MethodNotAllowed
    }

    /// Wraps an unexpected failure, minting a fresh correlation id.
    pub fn internal(cause: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            error_id: Uuid::new_v4(),
            cause: cause.into(),
        }
    }

    /// Wire-level error name, stable per kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NotFoundError",
            Self::Validation { .. } => "ValidationError",
            Self::Unauthorized { .. } => "UnauthorizedError",
            Self::MethodNotAllowed => "MethodNotAllowedError",
            Self::Internal { .. } => "InternalServerError",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation { .. } => 400,
            Self::Unauthorized { .. } => 401,
            Self::MethodNotAllowed => 405,
            Self::Internal { .. } => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Projects to the stable client-facing shape. Internal causes are
    /// dropped here; only the fixed support text and the reference id go
    /// out.
    pub fn to_public(&self) -> PublicError {
        match self {
            Self::NotFound { message, action }
            | Self::Validation { message, action }
            | Self::Unauthorized { message, action } => PublicError {
                name: self.name(),
                message: message.clone(),
                action: action.clone(),
                status_code: self.status_code(),
                error_id: None,
            },
            Self::MethodNotAllowed => PublicError {
                name: self.name(),
                message: "Method not allowed for this endpoint.".to_owned(),
                action: "Check that the HTTP method sent is valid for this endpoint.".to_owned(),
                status_code: self.status_code(),
                error_id: None,
            },
            Self::Internal { error_id, .. } => PublicError {
                name: self.name(),
                message: "An unexpected internal error occurred.".to_owned(),
                action: "Contact support.".to_owned(),
                status_code: self.status_code(),
                error_id: Some(*error_id),
            },
        }
    }
}

/// The exact JSON body clients receive for any failure.
///
/// `error_id` appears only on `InternalServerError`: an opaque reference the
/// caller can quote to support, matched against the logged cause. The cause
/// itself never serializes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PublicError {
    pub name: &'static str,
    pub message: String,
    pub action: String,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_id: Option<Uuid>,
}
