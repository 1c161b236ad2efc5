//! One-file-per-module persistence for completion databases.
//!
//! A [`DatabaseStore`] is a directory holding `<module>.idb` files, each the
//! [`codec`](crate::codec) encoding of one [`ModuleRecord`]. The same type
//! serves the output directory of a run and the baseline directory consulted
//! for merging.
//!
//! Writes go through a temp file and a rename, so a reader sees either the
//! previous file or the complete new one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::codec::{decode_module, encode_module, CodecError};
use crate::types::ModuleRecord;

/// File extension of store files.
pub const STORE_EXTENSION: &str = "idb";

/// Errors from reading or writing a store file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The record could not be encoded or the file could not be decoded.
    #[error("codec error for module '{module}': {source}")]
    Codec {
        module: String,
        #[source]
        source: CodecError,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A directory of per-module store files.
#[derive(Debug, Clone)]
pub struct DatabaseStore {
    root: PathBuf,
}

impl DatabaseStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DatabaseStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the store file for `module`.
    pub fn path_for(&self, module: &str) -> PathBuf {
        self.root.join(format!("{}.{}", module, STORE_EXTENSION))
    }

    /// Whether a store file exists for `module`.
    pub fn contains(&self, module: &str) -> bool {
        self.path_for(module).is_file()
    }

    /// Load the record for `module`.
    ///
    /// A missing file is not an error: it yields `Ok(None)`.
    pub fn load(&self, module: &str) -> StoreResult<Option<ModuleRecord>> {
        let path = self.path_for(module);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        decode_module(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Codec {
                module: module.to_string(),
                source,
            })
    }

    /// Encode and write the record for `module`, creating the directory if needed.
    ///
    /// Encoding happens before anything touches the filesystem, so an encode
    /// failure leaves no partial file behind.
    pub fn save(&self, module: &str, record: &ModuleRecord) -> StoreResult<PathBuf> {
        let bytes = encode_module(record).map_err(|source| StoreError::Codec {
            module: module.to_string(),
            source,
        })?;
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;
        let path = self.path_for(module);
        atomic_write(&path, &bytes).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Module names with a store file in this directory, sorted.
    pub fn list_modules(&self) -> StoreResult<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut modules = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| StoreError::Io {
                path: self.root.clone(),
                source: e.into(),
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(STORE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                modules.push(stem.to_string());
            }
        }
        modules.sort();
        Ok(modules)
    }
}

/// Write content to a file atomically using temp + rename.
///
/// The temp file name includes the PID so two generators pointed at the
/// same directory do not clobber each other's temp files.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let temp_path = path.with_file_name(format!(
        ".{}.{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy(),
        std::process::id(),
    ));
    fs::write(&temp_path, content)?;
    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }
    Ok(())
}
