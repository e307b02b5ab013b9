//! Storage errors.

use std::path::PathBuf;

use dermabot_core::Section;
use thiserror::Error;

/// Errors that can occur during content storage operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backup of {path} failed: {message}")]
    Backup { path: PathBuf, message: String },

    #[error("Malformed {section} collection: {message}")]
    Invalid { section: Section, message: String },

    #[error("Item '{name}' not found in section {section}")]
    ItemNotFound { section: Section, name: String },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is a lookup miss rather than a storage fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::ItemNotFound { .. })
    }

    /// Whether the underlying file does not exist.
    pub fn is_missing_file(&self) -> bool {
        matches!(self, StoreError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
