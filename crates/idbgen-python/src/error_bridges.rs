//! Conversions from reflection-side errors into the unified `IdbError`.
//!
//! These live here because `idbgen-core` does not depend on the reflection
//! crate.

use std::io;

use idbgen_core::error::IdbError;

use crate::runtime::ScrapeError;
use crate::snapshot::SnapshotError;

// ============================================================================
// Bridge: ScrapeError -> IdbError
// ============================================================================

impl From<ScrapeError> for IdbError {
    fn from(err: ScrapeError) -> Self {
        match err {
            ScrapeError::ModuleNotFound { name } => IdbError::ModuleNotFound { name },
        }
    }
}

// ============================================================================
// Bridge: SnapshotError -> IdbError
// ============================================================================

impl From<SnapshotError> for IdbError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::Io { path, source } if source.kind() == io::ErrorKind::NotFound => {
                IdbError::FileNotFound {
                    path: path.to_string_lossy().into_owned(),
                }
            }
            other => IdbError::RuntimeLoad {
                message: other.to_string(),
            },
        }
    }
}
