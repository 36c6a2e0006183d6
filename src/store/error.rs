//! # store::error
//!
//! Failures of the flat-file trade store.
//!
//! A file that cannot be decoded during a listing is not an error: it is
//! logged and left out of the result.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A required field is missing or invalid. Detected before any write.
    #[error("{0}")]
    Validation(String),

    /// The referenced trade file does not exist in its collection.
    #[error("Trade file not found: {0}")]
    NotFound(String),

    /// Read, write or delete failed at the file system.
    #[error("Storage error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    /// `Validation` listing the offending field names.
    pub fn missing(fields: &[&str]) -> Self {
        StoreError::Validation(format!("Missing required fields: {}", fields.join(", ")))
    }

    pub fn io(path: &Path, source: io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Maps `ErrorKind::NotFound` on a trade file to [`StoreError::NotFound`].
    pub fn from_file_io(filename: &str, path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound(filename.to_string())
        } else {
            StoreError::io(path, source)
        }
    }
}
