//! Chunk planning and chunk I/O for flat directory uploads.
//!
//! The same planner drives both the uploader and the cost estimator, so
//! the two always agree on chunk counts and byte ranges.

mod change;
mod chunked;
mod plan;
mod validation;

pub use change::{chunk_hash, should_skip};
pub use chunked::{ChunkReader, read_range};
pub use plan::{ChunkPlan, ChunkRange, TxBatch, calldata_stake, max_chunk_size};
pub use validation::validate_file_name;

/// Largest calldata chunk on ordinary chains: 24 KiB minus room for the
/// transaction envelope and stake encoding.
pub const CALLDATA_CHUNK_SIZE: u64 = 24 * 1024 - 326;

/// Largest calldata chunk on the low-gas-limit network.
pub const GALILEO_CHUNK_SIZE: u64 = 475 * 1024;

/// Usable bytes per EIP-4844 blob (4096 field elements of 31 bytes).
pub const BLOB_DATA_SIZE: u64 = 31 * 4096;

/// Blobs carried by a single transaction.
pub const MAX_BLOBS_PER_TX: usize = 3;

/// One ether in wei.
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid range {start}..{end} for a {size}-byte file")]
    InvalidRange { start: u64, end: u64, size: u64 },
}
