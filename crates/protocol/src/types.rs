use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::ProtocolError;

/// A 32-byte word: chunk hashes and transaction hashes.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct B256(pub [u8; 32]);

impl B256 {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for B256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for B256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for B256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// How chunks are carried on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadType {
    Calldata,
    Blob,
}

impl UploadType {
    /// Storage mode recorded on-chain for files written this way.
    pub fn storage_mode(self) -> StorageMode {
        match self {
            Self::Calldata => StorageMode::Calldata,
            Self::Blob => StorageMode::Blob,
        }
    }
}

impl fmt::Display for UploadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Calldata => f.write_str("calldata"),
            Self::Blob => f.write_str("blob"),
        }
    }
}

impl FromStr for UploadType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "calldata" | "1" => Ok(Self::Calldata),
            "blob" | "2" => Ok(Self::Blob),
            other => Err(ProtocolError::InvalidUploadType(other.to_string())),
        }
    }
}

/// Per-file storage flag kept by the contract (`getStorageMode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageMode {
    Unset,
    Calldata,
    Blob,
    /// A value this client does not know; treated as incompatible.
    Unknown(u64),
}

impl StorageMode {
    pub fn from_raw(raw: u64) -> Self {
        match raw {
            0 => Self::Unset,
            1 => Self::Calldata,
            2 => Self::Blob,
            other => Self::Unknown(other),
        }
    }

    /// Whether a file in this mode may be written with `upload_type`.
    pub fn accepts(self, upload_type: UploadType) -> bool {
        self == Self::Unset || self == upload_type.storage_mode()
    }
}

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Location on the local filesystem.
    pub path: PathBuf,
    /// Key under which the file is stored remotely (posix-style).
    pub name: String,
    /// Size in bytes.
    pub size: u64,
}

impl FileEntry {
    /// Contract-level key bytes (UTF-8 of `name`).
    pub fn key(&self) -> Vec<u8> {
        self.name.as_bytes().to_vec()
    }
}

/// Terminal state of one file's upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Every planned chunk was written or confirmed unchanged.
    Completed,
    /// A prefix succeeded, then the chunk `failed_chunk` failed.
    PartiallyFailed { failed_chunk: u64 },
    /// Nothing succeeded.
    Failed,
    /// Storage-mode mismatch; no chunk was touched.
    Rejected,
}

/// Per-file upload report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub file_name: String,
    pub total_chunk_count: u64,
    /// Last chunk index confirmed or skipped as unchanged; -1 if none.
    pub current_success_index: i64,
    /// Chunks actually transmitted (unchanged chunks excluded).
    pub total_upload_count: u64,
    /// Bytes actually transmitted.
    pub total_upload_size: u64,
    /// Native value sent with the writes, in wei.
    pub total_storage_cost: u128,
    pub rejected: bool,
    /// Shortened error message of the failure that stopped the file.
    pub error: Option<String>,
}

impl UploadResult {
    /// A fresh record for a file planned into `total_chunk_count` chunks.
    pub fn new(file_name: impl Into<String>, total_chunk_count: u64) -> Self {
        Self {
            file_name: file_name.into(),
            total_chunk_count,
            current_success_index: -1,
            total_upload_count: 0,
            total_upload_size: 0,
            total_storage_cost: 0,
            rejected: false,
            error: None,
        }
    }

    /// A file refused before any chunk was touched.
    pub fn rejected(file_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            rejected: true,
            error: Some(reason.into()),
            ..Self::new(file_name, 0)
        }
    }

    /// A file that failed before its first chunk.
    pub fn failed(
        file_name: impl Into<String>,
        total_chunk_count: u64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            error: Some(reason.into()),
            ..Self::new(file_name, total_chunk_count)
        }
    }

    /// Records chunks up to `last` as already present on-chain.
    pub fn mark_skipped(&mut self, last: u64) {
        self.current_success_index = last as i64;
    }

    /// Records a confirmed write of `chunks` chunks ending at index `last`.
    pub fn mark_uploaded(&mut self, last: u64, chunks: u64, bytes: u64, cost: u128) {
        self.current_success_index = last as i64;
        self.total_upload_count += chunks;
        self.total_upload_size += bytes;
        self.total_storage_cost += cost;
    }

    pub fn is_complete(&self) -> bool {
        !self.rejected && self.current_success_index + 1 == self.total_chunk_count as i64
    }

    pub fn outcome(&self) -> FileOutcome {
        if self.rejected {
            FileOutcome::Rejected
        } else if self.is_complete() {
            FileOutcome::Completed
        } else if self.current_success_index < 0 {
            FileOutcome::Failed
        } else {
            FileOutcome::PartiallyFailed {
                failed_chunk: (self.current_success_index + 1) as u64,
            }
        }
    }
}

/// Aggregate projected cost of an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EstimateResult {
    pub total_file_count: u64,
    /// Transactions the upload would send.
    pub total_tx_count: u64,
    /// Native value attached to the writes, in wei.
    pub total_storage_cost: u128,
    /// Gas cost, in wei.
    pub total_gas_cost: u128,
}

impl EstimateResult {
    pub fn total_cost(&self) -> u128 {
        self.total_storage_cost.saturating_add(self.total_gas_cost)
    }

    pub fn absorb(&mut self, other: &EstimateResult) {
        self.total_file_count += other.total_file_count;
        self.total_tx_count += other.total_tx_count;
        self.total_storage_cost = self.total_storage_cost.saturating_add(other.total_storage_cost);
        self.total_gas_cost = self.total_gas_cost.saturating_add(other.total_gas_cost);
    }
}

/// Current network fee parameters, in wei.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeData {
    pub gas_price: u128,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

impl FeeData {
    /// Scales every fee by `(100 + pct) / 100`.
    pub fn inflated(self, pct: u32) -> Self {
        let scale = |v: u128| v.saturating_mul(100 + pct as u128) / 100;
        Self {
            gas_price: scale(self.gas_price),
            max_fee_per_gas: scale(self.max_fee_per_gas),
            max_priority_fee_per_gas: scale(self.max_priority_fee_per_gas),
        }
    }
}

/// Transaction parameters chosen by the pipeline.
///
/// `None` fields are left for the RPC layer to fill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxOptions {
    pub nonce: Option<u64>,
    pub value: u128,
    pub gas_limit: Option<u64>,
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub success: bool,
}
