//! Error handling for searchpane.
//!
//! This module provides:
//! - [`SpError`]: The main error enum for all searchpane operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`StructuredError`]: Serializable error payload for robot mode

mod codes;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::ErrorCode;

/// Main error type for searchpane operations.
#[derive(Error, Debug)]
pub enum SpError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),

    #[error("Invalid share link: {0}")]
    ShareLink(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),
}

impl SpError {
    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::SerializationError,
            Self::Http(_) => ErrorCode::NetworkUnreachable,
            Self::Status { status: 401 | 403, .. } => ErrorCode::NetworkAuthFailed,
            Self::Status { .. } => ErrorCode::RemoteError,
            Self::MalformedResponse { .. } => ErrorCode::RemoteMalformed,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::MissingConfig(_) => ErrorCode::ConfigMissingRequired,
            Self::ShareLink(_) => ErrorCode::ShareLinkInvalid,
            Self::Storage(_) => ErrorCode::StorageFailed,
            Self::ValidationFailed(_) => ErrorCode::ValidationFailed,
            Self::Timeout(_) => ErrorCode::SearchTimeout,
        }
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::Status { endpoint, status } => {
                Some(serde_json::json!({ "endpoint": endpoint, "status": status }))
            }
            Self::MalformedResponse { endpoint, .. } => {
                Some(serde_json::json!({ "endpoint": endpoint }))
            }
            Self::MissingConfig(key) => Some(serde_json::json!({ "config_key": key })),
            _ => None,
        }
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_sp_error(self)
    }
}

/// A structured error with machine-readable code and context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Always `true`, so consumers can branch on a single key.
    pub error: bool,

    /// The error code (e.g., "CONFIG_MISSING_REQUIRED")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 304)
    pub numeric_code: u16,

    /// Human-readable message
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    #[must_use]
    pub fn from_sp_error(err: &SpError) -> Self {
        let code = err.code();
        Self {
            error: true,
            code,
            numeric_code: code.numeric(),
            message: err.to_string(),
            context: err.context(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SpError>;
