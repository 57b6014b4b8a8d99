use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum KitStoreError {
    #[error("malformed owner file {}: {reason}", .path.display())]
    MalformedOwnerFile { path: PathBuf, reason: String },
    #[error("malformed kit record {kit:?} for owner {owner}: {reason}")]
    MalformedKitRecord { owner: Uuid, kit: String, reason: String },
    #[error("codec error: {0}")]
    Codec(String),
    #[error("failed to persist kits for owner {owner}: {source}")]
    Persistence {
        owner: Uuid,
        #[source]
        source: std::io::Error,
    },
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl KitStoreError {
    pub fn malformed_file(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::MalformedOwnerFile { path: path.into(), reason: reason.to_string() }
    }

    /// Whether the error left memory and disk out of sync.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }
}
