//! JSON output types for CLI responses.
//!
//! Every response has `status` as its first field and carries the schema
//! version, so callers can parse stdout without knowing which command ran.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::IdbError;
use crate::types::ModuleRecord;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

/// A module the driver did not write, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedModule {
    pub name: String,
    pub reason: String,
}

/// Response for `generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    /// Modules written, in the order they were generated.
    pub modules_written: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modules_skipped: Vec<SkippedModule>,
    /// Members whose kind differed from the baseline (fresh entry kept).
    pub kind_conflicts: usize,
}

impl GenerateResponse {
    pub fn new(
        modules_written: Vec<String>,
        modules_skipped: Vec<SkippedModule>,
        kind_conflicts: usize,
    ) -> Self {
        GenerateResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            modules_written,
            modules_skipped,
            kind_conflicts,
        }
    }
}

/// Response for `dump`: the decoded record of one store file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpResponse {
    pub status: String,
    pub schema_version: String,
    pub module: String,
    pub record: ModuleRecord,
}

impl DumpResponse {
    pub fn new(module: impl Into<String>, record: ModuleRecord) -> Self {
        DumpResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            module: module.into(),
            record,
        }
    }
}

/// Error information within an error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: u8,
    pub message: String,
}

impl ErrorInfo {
    pub fn from_error(err: &IdbError) -> Self {
        ErrorInfo {
            code: err.error_code().code(),
            message: err.to_string(),
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &IdbError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Emit a response as pretty JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}
