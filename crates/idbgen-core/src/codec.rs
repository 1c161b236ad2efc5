//! Versioned binary encoding for module records.
//!
//! Layout of an encoded record:
//!
//! ```text
//! +---------+----------------+------------------------------+
//! | "IDB\0" | version u16 LE | MessagePack payload (named)  |
//! +---------+----------------+------------------------------+
//! ```
//!
//! The payload is written with struct field names so that optional fields
//! can be omitted without shifting positions. Decoding rejects unknown magic
//! and any version other than [`FORMAT_VERSION`].

use thiserror::Error;

use crate::types::ModuleRecord;

/// Leading bytes of every store file.
pub const MAGIC: [u8; 4] = *b"IDB\0";

/// Current encoding version. Bump when the record shape changes incompatibly.
pub const FORMAT_VERSION: u16 = 1;

const HEADER_LEN: usize = MAGIC.len() + 2;

/// Errors from encoding or decoding a record.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Input is shorter than the fixed header.
    #[error("truncated input: {len} bytes, header needs {}", HEADER_LEN)]
    Truncated { len: usize },

    /// Input does not start with [`MAGIC`].
    #[error("not an idb file (bad magic)")]
    BadMagic,

    /// Encoded with a format version this build cannot read.
    #[error("unsupported format version {found} (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },

    #[error("encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Encode a module record with the versioned header.
pub fn encode_module(record: &ModuleRecord) -> CodecResult<Vec<u8>> {
    let payload = rmp_serde::to_vec_named(record)?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Decode a module record, validating the header first.
pub fn decode_module(bytes: &[u8]) -> CodecResult<ModuleRecord> {
    if bytes.len() < HEADER_LEN {
        return Err(CodecError::Truncated { len: bytes.len() });
    }
    if bytes[..MAGIC.len()] != MAGIC {
        return Err(CodecError::BadMagic);
    }
    let found = u16::from_le_bytes([bytes[MAGIC.len()], bytes[MAGIC.len() + 1]]);
    if found != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion {
            found,
            expected: FORMAT_VERSION,
        });
    }
    Ok(rmp_serde::from_slice(&bytes[HEADER_LEN..])?)
}
