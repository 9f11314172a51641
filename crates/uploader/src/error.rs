//! Upload error types.

use ethfs_protocol::{B256, StorageMode, UploadType};

/// Errors produced by the upload pipeline and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transfer error: {0}")]
    Transfer(#[from] ethfs_transfer::TransferError),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("transaction {tx_hash} failed on-chain")]
    Reverted { tx_hash: B256 },

    #[error("{file} is stored as {mode:?} and cannot be uploaded as {upload_type}")]
    StorageModeMismatch {
        file: String,
        mode: StorageMode,
        upload_type: UploadType,
    },

    #[error("failed to remove {file}: {reason}")]
    RemoveFailed { file: String, reason: String },

    #[error("the directory contract does not support blob uploads")]
    BlobUnsupported,

    #[error("blob uploads need a blob submitter, none is configured")]
    NoBlobSubmitter,

    #[error("blob encoder returned {got} blobs for {expected} chunks")]
    BlobCount { expected: usize, got: usize },

    #[error("estimate failed for {file}: {message}")]
    Estimate { file: String, message: String },
}

impl UploadError {
    /// Wraps `err` as an estimation failure of `file`.
    pub fn estimate(file: &str, err: UploadError) -> Self {
        match err {
            e @ UploadError::Estimate { .. } => e,
            other => UploadError::Estimate {
                file: file.to_string(),
                message: excerpt(&other.to_string()),
            },
        }
    }

    /// Name of the file the error is attributed to, if any.
    pub fn file(&self) -> Option<&str> {
        match self {
            UploadError::StorageModeMismatch { file, .. }
            | UploadError::RemoveFailed { file, .. }
            | UploadError::Estimate { file, .. } => Some(file),
            _ => None,
        }
    }
}

const EXCERPT_LIMIT: usize = 400;
const EXCERPT_HEAD: usize = 200;
const EXCERPT_TAIL: usize = 190;

/// Shortens long RPC error messages to their head and tail.
pub fn excerpt(message: &str) -> String {
    let chars: Vec<char> = message.chars().collect();
    if chars.len() <= EXCERPT_LIMIT {
        return message.to_string();
    }
    let head: String = chars[..EXCERPT_HEAD].iter().collect();
    let tail: String = chars[chars.len() - EXCERPT_TAIL..].iter().collect();
    format!("{head} ... {tail}")
}
