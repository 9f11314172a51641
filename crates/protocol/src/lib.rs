//! Shared vocabulary for the ethfs workspace.
//!
//! Chain constants, the flat directory contract surface, and the value
//! types exchanged between the uploader pipeline and its chain
//! collaborators.

pub mod constants;
pub mod contract;
pub mod types;
pub mod validation;

// Re-export primary types for convenience.
pub use constants::{DEFAULT_CHAIN_ID, GALILEO_CHAIN_ID};
pub use contract::DirectoryCall;
pub use types::{
    B256, EstimateResult, FeeData, FileEntry, FileOutcome, StorageMode, TxOptions, TxReceipt,
    UploadResult, UploadType,
};
pub use validation::{DirectoryAddress, is_private_key, parse_directory_address};

/// Errors produced while interpreting user-supplied protocol values.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unknown network short name: {0}")]
    UnknownShortName(String),

    #[error("invalid upload type: {0}")]
    InvalidUploadType(String),
}
