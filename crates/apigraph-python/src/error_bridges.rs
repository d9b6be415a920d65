//! Error bridge implementations for the typed-tree subsystems.
//!
//! This module provides `impl From<X> for ApiError` conversions. They live
//! here rather than in `apigraph-core` because the source error types
//! belong to this crate.

use apigraph_core::error::ApiError;

use crate::adapter::AdapterError;
use crate::files::FileError;
use crate::pipeline::PipelineError;

// ============================================================================
// Bridge: AdapterError -> ApiError
// ============================================================================

impl From<AdapterError> for ApiError {
    fn from(err: AdapterError) -> Self {
        ApiError::invariant(err.to_string())
    }
}

// ============================================================================
// Bridge: FileError -> ApiError
// ============================================================================

impl From<FileError> for ApiError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::NotFound { path } => ApiError::InputNotFound { path },
            FileError::Parse { path, message } => ApiError::MalformedInput { path, message },
            FileError::Io(e) => ApiError::Io(e),
        }
    }
}

// ============================================================================
// Bridge: PipelineError -> ApiError
// ============================================================================

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Adapter { path, source } => {
                ApiError::invariant(format!("{}: {}", path, source))
            }
            PipelineError::Files(e) => ApiError::from(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apigraph_core::error::OutputErrorCode;

    #[test]
    fn adapter_errors_are_internal() {
        let err = ApiError::from(PipelineError::Adapter {
            path: "pkg/a.py".to_string(),
            source: AdapterError::StackUnderflow,
        });
        assert_eq!(err.error_code(), OutputErrorCode::InternalError);
        assert!(err.to_string().contains("pkg/a.py"));
    }

    #[test]
    fn file_errors_are_input_errors() {
        let missing = ApiError::from(FileError::NotFound {
            path: "trees".to_string(),
        });
        assert_eq!(missing.error_code(), OutputErrorCode::InputError);

        let malformed = ApiError::from(PipelineError::Files(FileError::Parse {
            path: "a.json".to_string(),
            message: "expected value".to_string(),
        }));
        assert_eq!(malformed.error_code(), OutputErrorCode::InputError);
    }
}
