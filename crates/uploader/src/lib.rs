//! Upload pipeline for on-chain flat directories.
//!
//! This crate implements the **business logic** of pushing local files
//! into a flat directory contract. It has no RPC or wallet dependency:
//! the binary provides [`DirectoryClient`] (and optionally
//! [`BlobClient`]) implementations that bridge to the actual chain.
//!
//! # Pipeline
//!
//! 1. **Scan**: enumerate the path into [`FileEntry`] records
//! 2. **Plan**: split each file into chain-specific chunks
//! 3. **Reconcile**: compare the remote chunk count with the plan,
//!    removing the remote file first if it shrank
//! 4. **Detect**: skip chunks whose content hash is already on-chain
//! 5. **Submit**: write changed chunks, bounded across files,
//!    sequential within a file
//!
//! The [`Uploader::estimate_cost`] path runs steps 1-4 identically and
//! replaces submission with gas estimation.
//!
//! [`FileEntry`]: ethfs_protocol::FileEntry

pub mod client;
pub mod error;
pub mod estimate;
pub mod nonce;
pub mod reconcile;
pub mod retry;
pub mod scanner;
pub mod summary;
pub mod uploader;

// Re-export primary types for convenience.
pub use client::{Blob, BlobClient, ChunkKey, ClientFuture, DirectoryClient};
pub use error::{UploadError, excerpt};
pub use estimate::EstimateReport;
pub use nonce::NonceCounter;
pub use reconcile::{Reconciliation, RemoteFileState};
pub use retry::RetryPolicy;
pub use scanner::enumerate_files;
pub use summary::UploadSummary;
pub use uploader::{MAX_POOL_CHUNKS, UploadMode, Uploader};
