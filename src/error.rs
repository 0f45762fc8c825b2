use reqwest::StatusCode;
use thiserror::Error;

use crate::api::dto;

/// Tag callers branch on instead of searching error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NoAvailableBatch,
    AlreadyEnrolled,
    Validation,
    Network,
    Unauthorized,
    NotFound,
    Decode,
    Config,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    NoAvailableBatch { course_id: i64, message: String },

    #[error("{0}")]
    AlreadyEnrolled(String),

    #[error("Validation failed ({status}): {message}")]
    Validation { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub const NO_AVAILABLE_BATCH_MESSAGE: &str = "No available batches for this course";

impl AppError {
    pub fn no_available_batch(course_id: i64) -> Self {
        AppError::NoAvailableBatch {
            course_id,
            message: NO_AVAILABLE_BATCH_MESSAGE.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NoAvailableBatch { .. } => ErrorKind::NoAvailableBatch,
            AppError::AlreadyEnrolled(_) => ErrorKind::AlreadyEnrolled,
            AppError::Validation { .. } => ErrorKind::Validation,
            // 5xx is a transport-level failure from the client's point of view
            AppError::Network(_) | AppError::Server { .. } => ErrorKind::Network,
            AppError::Unauthorized(_) => ErrorKind::Unauthorized,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Decode(_) => ErrorKind::Decode,
            AppError::Config(_) => ErrorKind::Config,
        }
    }

    /// The user-facing text, without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            AppError::NoAvailableBatch { message, .. } => message.clone(),
            AppError::AlreadyEnrolled(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Config(msg) => msg.clone(),
            AppError::Validation { message, .. } | AppError::Server { message, .. } => {
                message.clone()
            }
            AppError::Network(e) => e.to_string(),
            AppError::Decode(e) => e.to_string(),
        }
    }

    /// HTTP status reported by the backend, if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Validation { status, .. } | AppError::Server { status, .. } => Some(*status),
            AppError::Unauthorized(_) => Some(401),
            AppError::NotFound(_) => Some(404),
            AppError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Build an error from a non-success response.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = dto::extract_error_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Unauthorized(message),
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            s if s.is_client_error() => AppError::Validation {
                status: s.as_u16(),
                message,
            },
            s => AppError::Server {
                status: s.as_u16(),
                message,
            },
        }
    }
}
