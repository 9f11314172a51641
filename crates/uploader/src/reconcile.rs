//! Reconciliation of local plans with on-chain state.

use ethfs_protocol::StorageMode;

/// What the contract currently holds for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteFileState {
    pub storage_mode: StorageMode,
    pub chunk_count: u64,
}

/// How a file's planned chunks relate to its stored chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Nothing stored; every chunk is written without hash checks.
    New,
    /// More chunks stored than planned; the stored file must be removed
    /// before anything is written, after which it is [`New`](Self::New).
    ShrinkDetected,
    /// Chunks below the stored count are compared by hash first.
    InPlaceUpdate,
}

impl Reconciliation {
    /// Whether chunk `index` has to be compared against a stored hash.
    ///
    /// Indices at or past `remote_count` cannot match anything stored.
    pub fn needs_hash_check(self, index: u64, remote_count: u64) -> bool {
        self == Self::InPlaceUpdate && index < remote_count
    }
}

/// Classifies a file stored as `remote_count` chunks and planned as
/// `planned_count`.
pub fn classify(remote_count: u64, planned_count: u64) -> Reconciliation {
    if remote_count > planned_count {
        Reconciliation::ShrinkDetected
    } else if remote_count == 0 {
        Reconciliation::New
    } else {
        Reconciliation::InPlaceUpdate
    }
}
