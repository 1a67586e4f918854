//! Error types for LotStore operations
//!
//! All LotStore errors are represented by the LotError enum, which provides
//! detailed path/offset context for debugging.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// LotStore error types with detailed context
#[derive(Debug, Clone)]
pub enum LotError {
    /// I/O operation failed
    Io {
        /// The file path where the error occurred
        path: Option<PathBuf>,
        /// The underlying I/O error kind
        kind: std::io::ErrorKind,
        /// Human-readable description
        message: String,
    },

    /// Serialized record does not fit in the 500-byte slot budget
    RecordTooLarge {
        /// Size of the serialized record
        len: usize,
        /// Maximum serialized size a slot can hold
        max: usize,
        /// Record file the write was aimed at
        path: PathBuf,
    },

    /// Offset is not slot-aligned or lies outside the file
    InvalidOffset {
        /// Record file being addressed
        path: PathBuf,
        /// The offending byte offset
        offset: u64,
        /// Description of the violation
        reason: String,
    },

    /// An index file line could not be parsed
    IndexCorrupted {
        /// Path to the index file
        path: PathBuf,
        /// One-based line number of the bad entry
        line: usize,
        /// Description of the corruption
        reason: String,
    },

    /// Record serialization or deserialization failed
    Codec {
        /// Entity kind being encoded or decoded
        entity: &'static str,
        /// Description of the failure
        reason: String,
    },

    /// Natural key resolved to nothing
    NotFound {
        /// Entity kind that was looked up
        entity: &'static str,
        /// The key that failed to resolve
        key: String,
    },

    /// Strict mode rejected an append with an already-indexed key
    DuplicateKey {
        /// Entity kind being appended
        entity: &'static str,
        /// The duplicated key
        key: String,
    },

    /// Invalid configuration
    Config(String),
}

impl fmt::Display for LotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LotError::Io { path, kind, message } => {
                if let Some(path) = path {
                    write!(f, "I/O error in {}: {} ({})", path.display(), message, kind)
                } else {
                    write!(f, "I/O error: {} ({})", message, kind)
                }
            }

            LotError::RecordTooLarge { len, max, path } => {
                write!(f, "Record too large for {}: {} bytes exceeds slot budget of {} bytes",
                       path.display(), len, max)
            }

            LotError::InvalidOffset { path, offset, reason } => {
                write!(f, "Invalid offset {} in {}: {}", offset, path.display(), reason)
            }

            LotError::IndexCorrupted { path, line, reason } => {
                write!(f, "Index corrupted in {} at line {}: {}", path.display(), line, reason)
            }

            LotError::Codec { entity, reason } => {
                write!(f, "Failed to encode/decode {}: {}", entity, reason)
            }

            LotError::NotFound { entity, key } => {
                write!(f, "{} not found: {}", entity, key)
            }

            LotError::DuplicateKey { entity, key } => {
                write!(f, "Duplicate {} key rejected in strict mode: {}", entity, key)
            }

            LotError::Config(reason) => {
                write!(f, "Invalid configuration: {}", reason)
            }
        }
    }
}

impl Error for LotError {}

/// Convert std::io::Error to LotError::Io
impl From<std::io::Error> for LotError {
    fn from(err: std::io::Error) -> Self {
        LotError::Io {
            path: None,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for LotStore operations
pub type LotResult<T> = Result<T, LotError>;
