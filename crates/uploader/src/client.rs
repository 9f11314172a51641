//! Chain-facing collaborator traits.
//!
//! The CLI implements these on top of its RPC provider and wallet. Using
//! traits keeps the pipeline decoupled from the transport and testable
//! with in-memory mocks.
//!
//! Implementations must copy any borrowed argument they need before
//! building the returned future; futures borrow only `self`.

use std::future::Future;
use std::pin::Pin;

use ethfs_protocol::{B256, DirectoryCall, FeeData, StorageMode, TxOptions, TxReceipt};

use crate::error::UploadError;

/// Boxed future returned by collaborator methods.
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, UploadError>> + Send + 'a>>;

/// Identifies one stored chunk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChunkKey {
    pub name: Vec<u8>,
    pub chunk_id: u64,
}

/// Read and write access to one flat directory contract for one account.
pub trait DirectoryClient: Send + Sync {
    /// Chain the contract lives on.
    fn chain_id(&self) -> u64;

    /// Next nonce of the sending account, counting pending transactions.
    fn pending_nonce(&self) -> ClientFuture<'_, u64>;

    fn fee_data(&self) -> ClientFuture<'_, FeeData>;

    fn is_support_blob(&self) -> ClientFuture<'_, bool>;

    fn storage_mode(&self, name: &[u8]) -> ClientFuture<'_, StorageMode>;

    fn count_chunks(&self, name: &[u8]) -> ClientFuture<'_, u64>;

    /// Hash of a stored chunk; [`B256::ZERO`] when the chunk is absent.
    fn chunk_hash(&self, name: &[u8], chunk_id: u64) -> ClientFuture<'_, B256>;

    /// Hashes of many chunks, in the order of `keys`.
    ///
    /// The default issues one [`chunk_hash`](Self::chunk_hash) call per
    /// key; implementations backed by a multicall contract should batch.
    fn chunk_hashes(&self, keys: &[ChunkKey]) -> ClientFuture<'_, Vec<B256>> {
        let keys = keys.to_vec();
        Box::pin(async move {
            let mut hashes = Vec::with_capacity(keys.len());
            for key in &keys {
                hashes.push(self.chunk_hash(&key.name, key.chunk_id).await?);
            }
            Ok(hashes)
        })
    }

    /// Per-blob payment required by a blob-backed directory, in wei.
    fn upfront_payment(&self) -> ClientFuture<'_, u128>;

    /// Gas the call would consume when sent with `value` wei attached.
    fn estimate_gas(&self, call: &DirectoryCall, value: u128) -> ClientFuture<'_, u64>;

    /// Signs and broadcasts `call`, returning the transaction hash.
    fn send(&self, call: DirectoryCall, options: TxOptions) -> ClientFuture<'_, B256>;

    /// Waits until `tx_hash` is mined.
    fn wait_receipt(&self, tx_hash: B256) -> ClientFuture<'_, TxReceipt>;
}

/// An encoded EIP-4844 blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob(pub Vec<u8>);

/// Encoding and submission of blob-carrying transactions.
pub trait BlobClient: Send + Sync {
    /// Encodes `data` into blobs of at most `BLOB_DATA_SIZE` payload bytes
    /// each. Always returns at least one blob, so empty input yields one
    /// empty blob.
    fn encode_blobs(&self, data: &[u8]) -> Result<Vec<Blob>, UploadError>;

    /// Versioned hash of the blob's KZG commitment in the form the
    /// contract stores it: the first 24 bytes, then zeros.
    fn blob_hash(&self, blob: &Blob) -> Result<B256, UploadError>;

    /// Sends `call` as a type-3 transaction carrying `blobs`.
    fn send_blob_tx(
        &self,
        call: DirectoryCall,
        options: TxOptions,
        blobs: Vec<Blob>,
    ) -> ClientFuture<'_, B256>;

    fn wait_receipt(&self, tx_hash: B256) -> ClientFuture<'_, TxReceipt>;
}
