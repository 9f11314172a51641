//! Submission scheduler.
//!
//! [`Uploader`] drives every file through plan, reconcile, change
//! detection and submission. Files run concurrently up to the caller's
//! limit; chunks of one file are always written in index order, each
//! confirmed before the next is attempted.

use std::fmt;
use std::sync::Arc;

use ethfs_protocol::{
    B256, DirectoryCall, FileEntry, TxOptions, TxReceipt, UploadResult, UploadType,
};
use ethfs_transfer::{
    ChunkPlan, ChunkRange, MAX_BLOBS_PER_TX, TxBatch, calldata_stake, read_range, should_skip,
};
use futures_util::future::join_all;
use futures_util::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::client::{Blob, BlobClient, ChunkKey, DirectoryClient};
use crate::error::{UploadError, excerpt};
use crate::nonce::NonceCounter;
use crate::reconcile::{Reconciliation, RemoteFileState, classify};
use crate::retry::RetryPolicy;

/// Cap on the planned chunks of one blob scan window, i.e. on the
/// stored hashes fetched per round trip.
pub const MAX_POOL_CHUNKS: u64 = 48;

/// Gas limit sent with a write: the estimate plus 20%.
pub(crate) fn padded_gas_limit(estimate: u64) -> u64 {
    estimate.saturating_add(estimate / 5)
}

/// How chunks are carried, chosen once per [`Uploader`].
#[derive(Clone)]
pub enum UploadMode {
    Calldata,
    Blob(Arc<dyn BlobClient>),
}

impl UploadMode {
    pub fn upload_type(&self) -> UploadType {
        match self {
            UploadMode::Calldata => UploadType::Calldata,
            UploadMode::Blob(_) => UploadType::Blob,
        }
    }
}

impl fmt::Debug for UploadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UploadMode::{}", self.upload_type())
    }
}

/// Result of one write step.
enum ChunkWrite {
    /// Stored content already matches; no transaction was sent.
    Unchanged,
    Written { bytes: u64, value: u128, tx_hash: B256 },
}

/// What the pipeline knows about one file once it is reconciled.
pub(crate) struct ReconciledFile {
    pub(crate) key: Vec<u8>,
    pub(crate) state: Reconciliation,
    pub(crate) remote_count: u64,
    /// Stored hashes fetched ahead of time, indexed by chunk id.
    pub(crate) prefetched: Option<Vec<B256>>,
}

impl ReconciledFile {
    pub(crate) fn needs_hash_check(&self, index: u64) -> bool {
        self.state.needs_hash_check(index, self.remote_count)
    }

    /// Whether every chunk of `batch` has a stored hash to compare with.
    pub(crate) fn batch_needs_hash_check(&self, batch: &TxBatch) -> bool {
        !batch.is_empty() && batch.chunks.iter().all(|c| self.needs_hash_check(c.index))
    }
}

/// A blob-mode file with its remote state looked up.
struct PreparedFile {
    file: FileEntry,
    plan: ChunkPlan,
    remote: Result<RemoteFileState, UploadError>,
    prefetched: Option<Vec<B256>>,
}

/// Uploads files into one flat directory from one account.
pub struct Uploader {
    pub(crate) client: Arc<dyn DirectoryClient>,
    pub(crate) mode: UploadMode,
    pub(crate) chain_id: u64,
    pub(crate) nonce: NonceCounter,
    pub(crate) retry: RetryPolicy,
}

impl Uploader {
    /// Resolves the upload mode and seeds the nonce counter.
    ///
    /// An explicit [`UploadType::Blob`] fails unless the contract supports
    /// blobs and a blob submitter is given. Without an explicit type, blob
    /// mode is chosen when both are available.
    pub async fn create(
        client: Arc<dyn DirectoryClient>,
        blob_client: Option<Arc<dyn BlobClient>>,
        requested: Option<UploadType>,
        retry: RetryPolicy,
    ) -> Result<Self, UploadError> {
        let supports_blob = retry
            .run("isSupportBlob", || client.is_support_blob())
            .await?;

        let mode = match (requested, blob_client) {
            (Some(UploadType::Blob), _) if !supports_blob => {
                return Err(UploadError::BlobUnsupported);
            }
            (Some(UploadType::Blob), Some(blob)) => UploadMode::Blob(blob),
            (Some(UploadType::Blob), None) => return Err(UploadError::NoBlobSubmitter),
            (Some(UploadType::Calldata), _) => UploadMode::Calldata,
            (None, Some(blob)) if supports_blob => UploadMode::Blob(blob),
            (None, _) => UploadMode::Calldata,
        };

        let start_nonce = retry.run("pendingNonce", || client.pending_nonce()).await?;
        let chain_id = client.chain_id();
        info!(chain_id, mode = ?mode, start_nonce, "uploader ready");

        Ok(Self {
            client,
            mode,
            chain_id,
            nonce: NonceCounter::new(start_nonce),
            retry,
        })
    }

    pub fn upload_type(&self) -> UploadType {
        self.mode.upload_type()
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Chunk plan for `file` under this uploader's chain and mode.
    pub fn plan(&self, file: &FileEntry) -> ChunkPlan {
        ChunkPlan::new(file.size, self.chain_id, self.upload_type())
    }

    /// Uploads `files` with at most `concurrency` files in flight.
    ///
    /// Returns one result per file, in completion order. Per-file failures
    /// are reported in the results and never stop sibling files.
    pub async fn upload(
        &self,
        files: Vec<FileEntry>,
        gas_inc_pct: u32,
        concurrency: usize,
    ) -> Vec<UploadResult> {
        let concurrency = concurrency.max(1);
        info!(
            files = files.len(),
            concurrency,
            mode = ?self.mode,
            "starting upload"
        );

        match &self.mode {
            UploadMode::Calldata => {
                stream::iter(files)
                    .map(|file| self.upload_calldata_file(file, gas_inc_pct))
                    .buffer_unordered(concurrency)
                    .collect()
                    .await
            }
            UploadMode::Blob(blob) => {
                let windows = scan_windows(files, |f| self.plan(f).chunk_count(), MAX_POOL_CHUNKS);
                stream::iter(windows)
                    .then(|window| self.prepare_window(window))
                    .flat_map(stream::iter)
                    .map(|prepared| self.upload_blob_file(blob.as_ref(), prepared, gas_inc_pct))
                    .buffer_unordered(concurrency)
                    .collect()
                    .await
            }
        }
    }

    /// Reads the stored mode and chunk count of `file`.
    ///
    /// Fails with [`UploadError::StorageModeMismatch`] if the file is
    /// stored in a mode this uploader cannot write.
    pub(crate) async fn remote_state(
        &self,
        file: &FileEntry,
    ) -> Result<RemoteFileState, UploadError> {
        let key = file.key();
        let storage_mode = self
            .retry
            .run("getStorageMode", || self.client.storage_mode(&key))
            .await?;

        let upload_type = self.upload_type();
        if !storage_mode.accepts(upload_type) {
            return Err(UploadError::StorageModeMismatch {
                file: file.name.clone(),
                mode: storage_mode,
                upload_type,
            });
        }

        let chunk_count = self
            .retry
            .run("countChunks", || self.client.count_chunks(&key))
            .await?;

        Ok(RemoteFileState {
            storage_mode,
            chunk_count,
        })
    }

    /// Stored hash of chunk `index`, from the prefetch if available.
    pub(crate) async fn stored_hash(
        &self,
        target: &ReconciledFile,
        index: u64,
    ) -> Result<B256, UploadError> {
        if let Some(hash) = target
            .prefetched
            .as_ref()
            .and_then(|hashes| hashes.get(index as usize))
        {
            return Ok(*hash);
        }
        self.retry
            .run("getChunkHash", || self.client.chunk_hash(&target.key, index))
            .await
    }

    /// Whether every blob of `batch` matches the hash stored for its chunk.
    pub(crate) async fn blobs_unchanged(
        &self,
        blob: &dyn BlobClient,
        target: &ReconciledFile,
        batch: &TxBatch,
        blobs: &[Blob],
    ) -> Result<bool, UploadError> {
        if !target.batch_needs_hash_check(batch) {
            return Ok(false);
        }
        for (chunk, encoded) in batch.chunks.iter().zip(blobs) {
            let stored = self.stored_hash(target, chunk.index).await?;
            if blob.blob_hash(encoded)? != stored {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Applies the reconciler decision, removing the stored file if it
    /// shrank.
    async fn reconcile(
        &self,
        file: &FileEntry,
        remote: RemoteFileState,
        plan: &ChunkPlan,
        gas_inc_pct: u32,
    ) -> Result<Reconciliation, UploadError> {
        let state = classify(remote.chunk_count, plan.chunk_count());
        if state != Reconciliation::ShrinkDetected {
            debug!(file = %file.name, ?state, stored = remote.chunk_count, "reconciled");
            return Ok(state);
        }

        info!(
            file = %file.name,
            stored = remote.chunk_count,
            planned = plan.chunk_count(),
            "file shrank, removing stored chunks"
        );
        let call = DirectoryCall::Remove { name: file.key() };
        let receipt = self
            .submit(call, 0, gas_inc_pct)
            .await
            .map_err(|e| UploadError::RemoveFailed {
                file: file.name.clone(),
                reason: e.to_string(),
            })?;
        debug!(file = %file.name, tx = %receipt.tx_hash, "stored chunks removed");
        Ok(Reconciliation::New)
    }

    /// Sends a calldata transaction and waits for a successful receipt.
    async fn submit(
        &self,
        call: DirectoryCall,
        value: u128,
        gas_inc_pct: u32,
    ) -> Result<TxReceipt, UploadError> {
        let gas = self.client.estimate_gas(&call, value).await?;
        let mut options = TxOptions {
            value,
            gas_limit: Some(padded_gas_limit(gas)),
            ..TxOptions::default()
        };
        self.apply_fees(&mut options, gas_inc_pct).await?;
        options.nonce = Some(self.nonce.reserve().await);

        let tx_hash = self.client.send(call, options).await?;
        let receipt = self.client.wait_receipt(tx_hash).await?;
        if !receipt.success {
            return Err(UploadError::Reverted { tx_hash });
        }
        Ok(receipt)
    }

    async fn apply_fees(&self, options: &mut TxOptions, gas_inc_pct: u32) -> Result<(), UploadError> {
        if gas_inc_pct == 0 {
            return Ok(());
        }
        let fees = self.client.fee_data().await?.inflated(gas_inc_pct);
        options.max_fee_per_gas = Some(fees.max_fee_per_gas);
        options.max_priority_fee_per_gas = Some(fees.max_priority_fee_per_gas);
        Ok(())
    }

    async fn upload_calldata_file(&self, file: FileEntry, gas_inc_pct: u32) -> UploadResult {
        let plan = self.plan(&file);
        let remote = match self.remote_state(&file).await {
            Ok(remote) => remote,
            Err(e) => return stopped_before_first_chunk(&file, &plan, e),
        };
        let state = match self.reconcile(&file, remote, &plan, gas_inc_pct).await {
            Ok(state) => state,
            Err(e) => return stopped_before_first_chunk(&file, &plan, e),
        };
        let target = ReconciledFile {
            key: file.key(),
            state,
            remote_count: remote.chunk_count,
            prefetched: None,
        };

        let mut result = UploadResult::new(&file.name, plan.chunk_count());
        for chunk in plan.chunks() {
            match self
                .write_calldata_chunk(&file, &target, chunk, gas_inc_pct)
                .await
            {
                Ok(ChunkWrite::Unchanged) => {
                    debug!(file = %file.name, chunk = chunk.index, "chunk unchanged, skipped");
                    result.mark_skipped(chunk.index);
                }
                Ok(ChunkWrite::Written {
                    bytes,
                    value,
                    tx_hash,
                }) => {
                    info!(file = %file.name, chunk = chunk.index, tx = %tx_hash, "chunk written");
                    result.mark_uploaded(chunk.index, 1, bytes, value);
                }
                Err(e) => {
                    record_failure(&mut result, chunk.index, e);
                    break;
                }
            }
        }

        log_finished(&result);
        result
    }

    async fn write_calldata_chunk(
        &self,
        file: &FileEntry,
        target: &ReconciledFile,
        chunk: ChunkRange,
        gas_inc_pct: u32,
    ) -> Result<ChunkWrite, UploadError> {
        let data = read_range(file.path.clone(), chunk.byte_range()).await?;

        if target.needs_hash_check(chunk.index) {
            let stored = self.stored_hash(target, chunk.index).await?;
            if should_skip(&data, &stored) {
                return Ok(ChunkWrite::Unchanged);
            }
        }

        let value = calldata_stake(self.chain_id, chunk.len());
        let call = DirectoryCall::WriteChunk {
            name: target.key.clone(),
            chunk_id: chunk.index,
            data,
        };
        let receipt = self.submit(call, value, gas_inc_pct).await?;
        Ok(ChunkWrite::Written {
            bytes: chunk.len(),
            value,
            tx_hash: receipt.tx_hash,
        })
    }

    /// Looks up the remote state of a scan window, fetching the stored
    /// hashes of every in-place file in one batched call.
    async fn prepare_window(&self, window: Vec<FileEntry>) -> Vec<PreparedFile> {
        let remotes = join_all(window.iter().map(|file| self.remote_state(file))).await;

        let mut prepared: Vec<PreparedFile> = window
            .into_iter()
            .zip(remotes)
            .map(|(file, remote)| PreparedFile {
                plan: self.plan(&file),
                file,
                remote,
                prefetched: None,
            })
            .collect();

        let mut keys = Vec::new();
        for p in &prepared {
            if let Some(count) = p.in_place_count() {
                let name = p.file.key();
                keys.extend((0..count).map(|chunk_id| ChunkKey {
                    name: name.clone(),
                    chunk_id,
                }));
            }
        }
        if keys.is_empty() {
            return prepared;
        }

        match self
            .retry
            .run("getChunkHashes", || self.client.chunk_hashes(&keys))
            .await
        {
            Ok(hashes) if hashes.len() == keys.len() => {
                let mut hashes = hashes.into_iter();
                for p in &mut prepared {
                    if let Some(count) = p.in_place_count() {
                        p.prefetched = Some(hashes.by_ref().take(count as usize).collect());
                    }
                }
            }
            Ok(hashes) => warn!(
                expected = keys.len(),
                got = hashes.len(),
                "batched hash lookup returned a short list, falling back to per-chunk reads"
            ),
            Err(e) => warn!("batched hash lookup failed, falling back to per-chunk reads: {e}"),
        }
        prepared
    }

    async fn upload_blob_file(
        &self,
        blob: &dyn BlobClient,
        prepared: PreparedFile,
        gas_inc_pct: u32,
    ) -> UploadResult {
        let PreparedFile {
            file,
            plan,
            remote,
            prefetched,
        } = prepared;

        let remote = match remote {
            Ok(remote) => remote,
            Err(e) => return stopped_before_first_chunk(&file, &plan, e),
        };
        let state = match self.reconcile(&file, remote, &plan, gas_inc_pct).await {
            Ok(state) => state,
            Err(e) => return stopped_before_first_chunk(&file, &plan, e),
        };
        let upfront = match self
            .retry
            .run("upfrontPayment", || self.client.upfront_payment())
            .await
        {
            Ok(cost) => cost,
            Err(e) => return stopped_before_first_chunk(&file, &plan, e),
        };
        let target = ReconciledFile {
            key: file.key(),
            state,
            remote_count: remote.chunk_count,
            prefetched: prefetched.filter(|_| state == Reconciliation::InPlaceUpdate),
        };

        let mut result = UploadResult::new(&file.name, plan.chunk_count());
        for batch in plan.tx_batches(MAX_BLOBS_PER_TX) {
            match self
                .write_blob_batch(blob, &file, &target, &batch, upfront, gas_inc_pct)
                .await
            {
                Ok(ChunkWrite::Unchanged) => {
                    debug!(file = %file.name, chunks = ?batch.chunk_ids(), "blobs unchanged, skipped");
                    result.mark_skipped(batch.last_index());
                }
                Ok(ChunkWrite::Written {
                    bytes,
                    value,
                    tx_hash,
                }) => {
                    info!(file = %file.name, chunks = ?batch.chunk_ids(), tx = %tx_hash, "blobs written");
                    result.mark_uploaded(batch.last_index(), batch.len() as u64, bytes, value);
                }
                Err(e) => {
                    record_failure(&mut result, batch.first_index(), e);
                    break;
                }
            }
        }

        log_finished(&result);
        result
    }

    async fn write_blob_batch(
        &self,
        blob: &dyn BlobClient,
        file: &FileEntry,
        target: &ReconciledFile,
        batch: &TxBatch,
        upfront: u128,
        gas_inc_pct: u32,
    ) -> Result<ChunkWrite, UploadError> {
        let data = read_range(file.path.clone(), batch.byte_range()).await?;
        let blobs = encode_batch(blob, batch, &data)?;

        if self.blobs_unchanged(blob, target, batch, &blobs).await? {
            return Ok(ChunkWrite::Unchanged);
        }

        let value = upfront.saturating_mul(blobs.len() as u128);
        let call = DirectoryCall::WriteChunks {
            name: target.key.clone(),
            chunk_ids: batch.chunk_ids(),
            sizes: batch.sizes(),
        };
        let mut options = TxOptions {
            value,
            ..TxOptions::default()
        };
        self.apply_fees(&mut options, gas_inc_pct).await?;
        options.nonce = Some(self.nonce.reserve().await);

        let tx_hash = blob.send_blob_tx(call, options, blobs).await?;
        let receipt = blob.wait_receipt(tx_hash).await?;
        if !receipt.success {
            return Err(UploadError::Reverted { tx_hash });
        }
        Ok(ChunkWrite::Written {
            bytes: batch.byte_len(),
            value,
            tx_hash,
        })
    }
}

impl PreparedFile {
    /// Stored chunk count if this file will be updated in place.
    fn in_place_count(&self) -> Option<u64> {
        match &self.remote {
            Ok(remote)
                if classify(remote.chunk_count, self.plan.chunk_count())
                    == Reconciliation::InPlaceUpdate =>
            {
                Some(remote.chunk_count)
            }
            _ => None,
        }
    }
}

/// Encodes a batch into exactly one blob per chunk.
pub(crate) fn encode_batch(
    blob: &dyn BlobClient,
    batch: &TxBatch,
    data: &[u8],
) -> Result<Vec<Blob>, UploadError> {
    let blobs = blob.encode_blobs(data)?;
    if blobs.len() != batch.len() {
        return Err(UploadError::BlobCount {
            expected: batch.len(),
            got: blobs.len(),
        });
    }
    Ok(blobs)
}

/// Splits `items` into consecutive windows whose summed chunk counts stay
/// within `limit`. An item larger than `limit` gets a window of its own.
pub(crate) fn scan_windows<T>(
    items: Vec<T>,
    chunk_count: impl Fn(&T) -> u64,
    limit: u64,
) -> Vec<Vec<T>> {
    let mut windows = Vec::new();
    let mut current = Vec::new();
    let mut used = 0;

    for item in items {
        let count = chunk_count(&item);
        if !current.is_empty() && used + count > limit {
            windows.push(std::mem::take(&mut current));
            used = 0;
        }
        used += count;
        current.push(item);
    }
    if !current.is_empty() {
        windows.push(current);
    }
    windows
}

fn stopped_before_first_chunk(file: &FileEntry, plan: &ChunkPlan, err: UploadError) -> UploadResult {
    let message = excerpt(&err.to_string());
    match err {
        UploadError::StorageModeMismatch { .. } => {
            warn!(file = %file.name, "rejected: {message}");
            UploadResult::rejected(&file.name, message)
        }
        _ => {
            error!(file = %file.name, "upload failed before the first chunk: {message}");
            UploadResult::failed(&file.name, plan.chunk_count(), message)
        }
    }
}

fn record_failure(result: &mut UploadResult, chunk: u64, err: UploadError) {
    let message = excerpt(&err.to_string());
    error!(file = %result.file_name, chunk, "upload failed: {message}");
    result.error = Some(message);
}

fn log_finished(result: &UploadResult) {
    if result.is_complete() {
        info!(
            file = %result.file_name,
            chunks = result.total_chunk_count,
            uploaded = result.total_upload_count,
            bytes = result.total_upload_size,
            "file complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethfs_protocol::{FeeData, StorageMode};
    use std::sync::Mutex;

    use crate::client::ClientFuture;

    /// Answers only the calls `Uploader::create` makes.
    struct SetupClient {
        supports_blob: bool,
        nonce: u64,
        calls: Mutex<Vec<&'static str>>,
    }

    impl SetupClient {
        fn new(supports_blob: bool) -> Arc<Self> {
            Arc::new(Self {
                supports_blob,
                nonce: 11,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn unsupported(&self, what: &'static str) -> ClientFuture<'_, B256> {
            self.calls.lock().unwrap().push(what);
            Box::pin(async move { Err(UploadError::Rpc(format!("{what} not mocked"))) })
        }
    }

    impl DirectoryClient for SetupClient {
        fn chain_id(&self) -> u64 {
            11155111
        }

        fn pending_nonce(&self) -> ClientFuture<'_, u64> {
            self.calls.lock().unwrap().push("pendingNonce");
            Box::pin(async move { Ok(self.nonce) })
        }

        fn fee_data(&self) -> ClientFuture<'_, FeeData> {
            Box::pin(async { Ok(FeeData::default()) })
        }

        fn is_support_blob(&self) -> ClientFuture<'_, bool> {
            self.calls.lock().unwrap().push("isSupportBlob");
            Box::pin(async move { Ok(self.supports_blob) })
        }

        fn storage_mode(&self, _name: &[u8]) -> ClientFuture<'_, StorageMode> {
            Box::pin(async { Ok(StorageMode::Unset) })
        }

        fn count_chunks(&self, _name: &[u8]) -> ClientFuture<'_, u64> {
            Box::pin(async { Ok(0) })
        }

        fn chunk_hash(&self, _name: &[u8], _chunk_id: u64) -> ClientFuture<'_, B256> {
            self.unsupported("getChunkHash")
        }

        fn upfront_payment(&self) -> ClientFuture<'_, u128> {
            Box::pin(async { Ok(0) })
        }

        fn estimate_gas(&self, _call: &DirectoryCall, _value: u128) -> ClientFuture<'_, u64> {
            Box::pin(async { Ok(21_000) })
        }

        fn send(&self, _call: DirectoryCall, _options: TxOptions) -> ClientFuture<'_, B256> {
            self.unsupported("send")
        }

        fn wait_receipt(&self, tx_hash: B256) -> ClientFuture<'_, TxReceipt> {
            Box::pin(async move {
                Ok(TxReceipt {
                    tx_hash,
                    success: true,
                })
            })
        }
    }

    struct NullBlobs;

    impl BlobClient for NullBlobs {
        fn encode_blobs(&self, _data: &[u8]) -> Result<Vec<Blob>, UploadError> {
            Ok(vec![Blob(Vec::new())])
        }

        fn blob_hash(&self, _blob: &Blob) -> Result<B256, UploadError> {
            Ok(B256::ZERO)
        }

        fn send_blob_tx(
            &self,
            _call: DirectoryCall,
            _options: TxOptions,
            _blobs: Vec<Blob>,
        ) -> ClientFuture<'_, B256> {
            Box::pin(async { Ok(B256::ZERO) })
        }

        fn wait_receipt(&self, tx_hash: B256) -> ClientFuture<'_, TxReceipt> {
            Box::pin(async move {
                Ok(TxReceipt {
                    tx_hash,
                    success: true,
                })
            })
        }
    }

    fn blobs() -> Option<Arc<dyn BlobClient>> {
        Some(Arc::new(NullBlobs))
    }

    #[tokio::test]
    async fn default_mode_prefers_blob_when_available() {
        let client = SetupClient::new(true);
        let uploader = Uploader::create(client.clone(), blobs(), None, RetryPolicy::default())
            .await
            .unwrap();
        assert_eq!(uploader.upload_type(), UploadType::Blob);
        assert_eq!(uploader.nonce.peek().await, 11);
        assert_eq!(
            *client.calls.lock().unwrap(),
            vec!["isSupportBlob", "pendingNonce"]
        );
    }

    #[tokio::test]
    async fn default_mode_falls_back_to_calldata() {
        let unsupported = Uploader::create(SetupClient::new(false), blobs(), None, RetryPolicy::default())
            .await
            .unwrap();
        assert_eq!(unsupported.upload_type(), UploadType::Calldata);

        let no_submitter = Uploader::create(SetupClient::new(true), None, None, RetryPolicy::default())
            .await
            .unwrap();
        assert_eq!(no_submitter.upload_type(), UploadType::Calldata);
    }

    #[tokio::test]
    async fn explicit_blob_needs_contract_support_and_submitter() {
        let err = Uploader::create(
            SetupClient::new(false),
            blobs(),
            Some(UploadType::Blob),
            RetryPolicy::default(),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, UploadError::BlobUnsupported));

        let err = Uploader::create(
            SetupClient::new(true),
            None,
            Some(UploadType::Blob),
            RetryPolicy::default(),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, UploadError::NoBlobSubmitter));
    }

    #[tokio::test]
    async fn explicit_calldata_wins_over_blob_support() {
        let uploader = Uploader::create(
            SetupClient::new(true),
            blobs(),
            Some(UploadType::Calldata),
            RetryPolicy::default(),
        )
        .await
        .unwrap();
        assert_eq!(uploader.upload_type(), UploadType::Calldata);
    }

    #[test]
    fn gas_limit_padding() {
        assert_eq!(padded_gas_limit(100_000), 120_000);
        assert_eq!(padded_gas_limit(21_001), 25_201);
        assert_eq!(padded_gas_limit(u64::MAX), u64::MAX);
        assert_eq!(padded_gas_limit(u64::MAX / 2), u64::MAX / 2 + u64::MAX / 10);
    }

    #[test]
    fn scan_windows_respect_chunk_cap() {
        let counts = vec![10u64, 20, 18, 1, 60, 5, 5];
        let windows = scan_windows(counts, |c| *c, MAX_POOL_CHUNKS);
        assert_eq!(
            windows,
            vec![vec![10, 20, 18], vec![1], vec![60], vec![5, 5]]
        );
    }

    #[test]
    fn scan_windows_of_nothing() {
        let windows = scan_windows(Vec::<u64>::new(), |c| *c, MAX_POOL_CHUNKS);
        assert!(windows.is_empty());
    }
}
