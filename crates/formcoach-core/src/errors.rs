// ABOUTME: Unified error types for FormCoach with stable error codes
// ABOUTME: Provides AppError, ErrorCode, and configuration errors shared by all crates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Errors in the per-frame path never abort a session; they are resolved to
//! neutral outcomes where they occur. The types here cover the places where a
//! failure must reach the caller: configuration changes, file input, and
//! calibration.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// A value fell outside its documented range
    #[serde(rename = "VALUE_OUT_OF_RANGE")]
    ValueOutOfRange = 3003,

    // Configuration (6000-6999)
    /// Configuration rejected by validation
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,

    // Session (7000-7999)
    /// Operation requires an active session
    #[serde(rename = "SESSION_NOT_ACTIVE")]
    SessionNotActive = 7000,

    // Internal Errors (9000-9999)
    /// File or stream access failed
    #[serde(rename = "STORAGE_ERROR")]
    StorageError = 9002,
    /// Serialization or deserialization failed
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::ValueOutOfRange => "The provided value is outside the acceptable range",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::SessionNotActive => "No coaching session is active",
            Self::StorageError => "Storage operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying error
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Operation attempted outside an active session
    #[must_use]
    pub fn session_not_active() -> Self {
        Self::new(ErrorCode::SessionNotActive, "no active coaching session")
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        let code = match error {
            ConfigError::ValueOutOfRange { .. } => ErrorCode::ValueOutOfRange,
            ConfigError::Io(_) => ErrorCode::StorageError,
            ConfigError::Json(_) => ErrorCode::SerializationError,
            _ => ErrorCode::ConfigInvalid,
        };
        Self::new(code, error.to_string()).with_source(error)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, error.to_string()).with_source(error)
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::new(ErrorCode::StorageError, error.to_string()).with_source(error)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Errors raised while building or changing analysis configuration
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// A parameter lies outside its documented valid range
    #[error("{key} = {value} is outside the valid range [{min}, {max}]")]
    ValueOutOfRange {
        /// Parameter key
        key: String,
        /// Rejected value
        value: f64,
        /// Lower bound of the valid range
        min: f64,
        /// Upper bound of the valid range
        max: f64,
    },

    /// The parameter key is not part of the catalog
    #[error("unknown threshold parameter: {0}")]
    UnknownParameter(String),

    /// A weight distribution does not sum to one or contains invalid entries
    #[error("invalid weight distribution: {0}")]
    InvalidWeights(String),

    /// Related thresholds are in the wrong order
    #[error("invalid threshold ordering: {0}")]
    InvalidOrdering(&'static str),

    /// A value could not be parsed
    #[error("cannot parse {key} from '{value}'")]
    Parse {
        /// Parameter or variable being parsed
        key: String,
        /// Raw value that failed to parse
        value: String,
    },

    /// A file could not be read or written
    #[error("configuration I/O failed: {0}")]
    Io(String),

    /// A JSON document could not be decoded
    #[error("configuration JSON is invalid: {0}")]
    Json(String),
}

impl ConfigError {
    /// Build a `ValueOutOfRange` error
    #[must_use]
    pub fn out_of_range(key: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        Self::ValueOutOfRange {
            key: key.into(),
            value,
            min,
            max,
        }
    }

    /// Build a `Parse` error
    #[must_use]
    pub fn parse(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Parse {
            key: key.into(),
            value: value.into(),
        }
    }
}
