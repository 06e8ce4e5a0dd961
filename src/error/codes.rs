//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 3xx: Config errors
//! - 4xx: Search errors
//! - 5xx: Network errors
//! - 6xx: Storage errors
//! - 8xx: Validation errors
//! - 9xx: Internal errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for robot mode output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E302: Config file has invalid syntax or values
    ConfigInvalid,
    /// E304: Required config value is missing
    ConfigMissingRequired,

    // ========================================
    // Search errors (4xx)
    // ========================================
    /// E402: Search did not settle before the deadline
    SearchTimeout,
    /// E404: Share link could not be decoded
    ShareLinkInvalid,

    // ========================================
    // Network errors (5xx)
    // ========================================
    /// E501: Cannot reach remote server
    NetworkUnreachable,
    /// E503: Authentication with remote failed
    NetworkAuthFailed,
    /// E504: Remote returned a non-success status
    RemoteError,
    /// E505: Remote returned a body we could not parse
    RemoteMalformed,

    // ========================================
    // Storage errors (6xx)
    // ========================================
    /// E601: Persisted state could not be read or written
    StorageFailed,

    // ========================================
    // Validation errors (8xx)
    // ========================================
    /// E801: Input failed validation
    ValidationFailed,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E901: Filesystem error
    IoError,
    /// E902: JSON encode/decode error
    SerializationError,
}

impl ErrorCode {
    /// Numeric code for this error.
    #[must_use]
    pub const fn numeric(self) -> u16 {
        match self {
            Self::ConfigInvalid => 302,
            Self::ConfigMissingRequired => 304,
            Self::SearchTimeout => 402,
            Self::ShareLinkInvalid => 404,
            Self::NetworkUnreachable => 501,
            Self::NetworkAuthFailed => 503,
            Self::RemoteError => 504,
            Self::RemoteMalformed => 505,
            Self::StorageFailed => 601,
            Self::ValidationFailed => 801,
            Self::IoError => 901,
            Self::SerializationError => 902,
        }
    }

    /// Short category name, derived from the numeric range.
    #[must_use]
    pub const fn category(self) -> &'static str {
        match self.numeric() / 100 {
            3 => "config",
            4 => "search",
            5 => "network",
            6 => "storage",
            8 => "validation",
            _ => "internal",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E{}", self.numeric())
    }
}
