//! Flat directory contract surface.
//!
//! State-changing calls are modeled as [`DirectoryCall`] values so the
//! pipeline can both estimate and submit the same call. View functions
//! are exposed as signature constants for the RPC layer.

pub const SIG_WRITE_CHUNK: &str = "writeChunk(bytes,uint256,bytes)";
pub const SIG_WRITE_CHUNKS: &str = "writeChunks(bytes,uint256[],uint256[])";
pub const SIG_REMOVE: &str = "remove(bytes)";
pub const SIG_SET_DEFAULT: &str = "setDefault(bytes)";
pub const SIG_REFUND: &str = "refund()";

pub const SIG_COUNT_CHUNKS: &str = "countChunks(bytes)";
pub const SIG_GET_CHUNK_HASH: &str = "getChunkHash(bytes,uint256)";
pub const SIG_IS_SUPPORT_BLOB: &str = "isSupportBlob()";
pub const SIG_GET_STORAGE_MODE: &str = "getStorageMode(bytes)";
pub const SIG_UPFRONT_PAYMENT: &str = "upfrontPayment()";
pub const SIG_READ_CHUNK: &str = "readChunk(bytes,uint256)";

/// A state-changing call on the flat directory contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryCall {
    /// Stores one calldata chunk.
    WriteChunk {
        name: Vec<u8>,
        chunk_id: u64,
        data: Vec<u8>,
    },
    /// Registers blob-carried chunks; the data travels in the blobs.
    WriteChunks {
        name: Vec<u8>,
        chunk_ids: Vec<u64>,
        sizes: Vec<u64>,
    },
    /// Drops every chunk stored under `name`.
    Remove { name: Vec<u8> },
    /// Sets the file served for the directory root.
    SetDefault { name: Vec<u8> },
    /// Returns the directory's unused storage deposit to its owner.
    Refund,
}

impl DirectoryCall {
    /// Solidity signature of the called function.
    pub fn signature(&self) -> &'static str {
        match self {
            Self::WriteChunk { .. } => SIG_WRITE_CHUNK,
            Self::WriteChunks { .. } => SIG_WRITE_CHUNKS,
            Self::Remove { .. } => SIG_REMOVE,
            Self::SetDefault { .. } => SIG_SET_DEFAULT,
            Self::Refund => SIG_REFUND,
        }
    }

    /// File key the call operates on, if any.
    pub fn file_key(&self) -> Option<&[u8]> {
        match self {
            Self::WriteChunk { name, .. }
            | Self::WriteChunks { name, .. }
            | Self::Remove { name }
            | Self::SetDefault { name } => Some(name),
            Self::Refund => None,
        }
    }

    /// Chunk indices written by the call (empty for non-write calls).
    pub fn chunk_ids(&self) -> Vec<u64> {
        match self {
            Self::WriteChunk { chunk_id, .. } => vec![*chunk_id],
            Self::WriteChunks { chunk_ids, .. } => chunk_ids.clone(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_chunk_metadata() {
        let call = DirectoryCall::WriteChunk {
            name: b"index.html".to_vec(),
            chunk_id: 3,
            data: vec![1, 2, 3],
        };
        assert_eq!(call.signature(), SIG_WRITE_CHUNK);
        assert_eq!(call.file_key(), Some(&b"index.html"[..]));
        assert_eq!(call.chunk_ids(), vec![3]);
    }

    #[test]
    fn refund_has_no_key() {
        assert_eq!(DirectoryCall::Refund.file_key(), None);
        assert!(DirectoryCall::Refund.chunk_ids().is_empty());
    }
}
