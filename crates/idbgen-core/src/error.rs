//! Error types and error code constants for idbgen.
//!
//! This module provides a unified error type (`IdbError`) that bridges
//! domain-specific errors from different subsystems (store, config, runtime
//! loading) into a common format suitable for JSON output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad flags, bad config file)
//! - `3`: Resolution errors (runtime description or module not found)
//! - `4`: Write errors (output store could not be written)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! Per-module failures during a generation run are not errors at this level:
//! the driver skips the module and reports it in the response.

use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;
use crate::store::StoreError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed config).
    InvalidArguments = 2,
    /// Resolution errors (runtime snapshot or module not found).
    ResolutionError = 3,
    /// Write errors (failed to persist a store file).
    WriteError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
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

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum IdbError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Module could not be resolved by the module provider.
    #[error("module not found: {name}")]
    ModuleNotFound { name: String },

    /// Runtime description could not be loaded.
    #[error("runtime load error: {message}")]
    RuntimeLoad { message: String },

    /// Store file could not be read or written.
    #[error("store error: {message}")]
    StoreError {
        message: String,
        module: Option<String>,
    },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&IdbError> for OutputErrorCode {
    fn from(err: &IdbError) -> Self {
        match err {
            IdbError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            IdbError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            IdbError::ModuleNotFound { .. } => OutputErrorCode::ResolutionError,
            IdbError::RuntimeLoad { .. } => OutputErrorCode::ResolutionError,
            IdbError::StoreError { .. } => OutputErrorCode::WriteError,
            IdbError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<IdbError> for OutputErrorCode {
    fn from(err: IdbError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridges: core errors -> IdbError
// ============================================================================

impl From<StoreError> for IdbError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::Io { .. } => IdbError::StoreError {
                message: err.to_string(),
                module: None,
            },
            StoreError::Codec { module, .. } => IdbError::StoreError {
                module: Some(module.clone()),
                message: err.to_string(),
            },
        }
    }
}

impl From<ConfigError> for IdbError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io { path, .. } => IdbError::FileNotFound {
                path: path.to_string_lossy().into_owned(),
            },
            other => IdbError::InvalidArguments {
                message: other.to_string(),
            },
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl IdbError {
    pub fn invalid_args(message: impl Into<String>) -> Self {
        IdbError::InvalidArguments {
            message: message.into(),
        }
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        IdbError::FileNotFound { path: path.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        IdbError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
