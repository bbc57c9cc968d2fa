//! Error types for message queue operations

use crate::error::AppError;
use crate::messagequeue::events::{EntityFamily, UpdateType};

/// Result type for message queue operations
pub type MessagingResult<T> = std::result::Result<T, MessagingError>;

/// Errors that can occur while constructing a backend or publishing an update
#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    /// Unsupported kind or incomplete backend configuration
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The bus or the configured topic could not be reached
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The transport rejected the message
    #[error("Publish failed: {0}")]
    PublishFailed(String),

    /// No acknowledgement within the publish timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// The snapshot cannot be mapped to an envelope variant
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// A received payload is not a valid envelope
    #[error("Invalid message format: {0}")]
    InvalidMessage(String),
}

impl MessagingError {
    pub(crate) fn unsupported(family: EntityFamily, update_type: UpdateType) -> Self {
        MessagingError::EncodingError(format!(
            "{} updates of type '{}' cannot be published",
            family, update_type
        ))
    }

    /// Short label used in metrics
    pub fn kind(&self) -> &'static str {
        match self {
            MessagingError::ConfigurationError(_) => "configuration",
            MessagingError::ConnectionFailed(_) => "connection",
            MessagingError::PublishFailed(_) => "publish",
            MessagingError::Timeout(_) => "timeout",
            MessagingError::EncodingError(_) => "encoding",
            MessagingError::InvalidMessage(_) => "invalid_message",
        }
    }
}

/// Transport failures of a publish request
impl From<reqwest::Error> for MessagingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MessagingError::Timeout(err.to_string())
        } else if err.is_connect() {
            MessagingError::ConnectionFailed(err.to_string())
        } else {
            MessagingError::PublishFailed(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for MessagingError {
    fn from(err: validator::ValidationErrors) -> Self {
        MessagingError::ConfigurationError(err.to_string())
    }
}

impl From<MessagingError> for AppError {
    fn from(err: MessagingError) -> Self {
        match err {
            MessagingError::ConfigurationError(msg) => AppError::Configuration(msg),
            MessagingError::Timeout(msg) => AppError::Timeout(msg),
            MessagingError::ConnectionFailed(msg) => AppError::Network(msg),
            _ => AppError::Internal(err.to_string()),
        }
    }
}
