//! Error types and error codes for apigraph.
//!
//! `ApiError` is the single error type the CLI renders. Subsystem errors
//! (the adapter, the pipeline, file loading, MRO computation) convert into it
//! through `From` bridges that live next to those subsystems.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad options, unreadable config)
//! - `3`: Input errors (missing trees directory, malformed program tree)
//! - `10`: Internal errors (violated structural invariants, IO failures)

use std::fmt;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable error codes. These double as CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller.
    InvalidArguments = 2,
    /// The input could not be found or read as a program tree.
    InputError = 3,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    #[error("input not found: {path}")]
    InputNotFound { path: String },

    /// A program tree could not be parsed or violates the input contract.
    #[error("malformed input {path}: {message}")]
    MalformedInput { path: String, message: String },

    /// A structural invariant of the model builder was violated.
    #[error("internal invariant violated: {message}")]
    InternalInvariant { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<&ApiError> for OutputErrorCode {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            ApiError::InputNotFound { .. } => OutputErrorCode::InputError,
            ApiError::MalformedInput { .. } => OutputErrorCode::InputError,
            ApiError::InternalInvariant { .. } => OutputErrorCode::InternalError,
            ApiError::Io(_) => OutputErrorCode::InternalError,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InternalInvariant {
            message: format!("JSON error: {}", err),
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl ApiError {
    pub fn invalid_args(message: impl Into<String>) -> Self {
        ApiError::InvalidArguments {
            message: message.into(),
        }
    }

    pub fn input_not_found(path: impl Into<String>) -> Self {
        ApiError::InputNotFound { path: path.into() }
    }

    pub fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::MalformedInput {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        ApiError::InternalInvariant {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }

    /// Render this error as the JSON object the CLI prints on failure.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "status": "error",
            "error": {
                "code": self.error_code().code(),
                "message": self.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
