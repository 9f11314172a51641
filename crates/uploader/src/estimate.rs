//! Cost estimation.
//!
//! Runs the same plan, reconcile and change-detection steps as the
//! upload path, but replaces each write with a gas estimate. Gas is
//! sampled at chunk index 0 and reused for chunks of identical length
//! within a file, so totals are an approximation for files whose chunks
//! would cost differently at different indices.

use std::collections::HashMap;

use ethfs_protocol::{DirectoryCall, EstimateResult, FileEntry};
use ethfs_transfer::{ChunkPlan, MAX_BLOBS_PER_TX, calldata_stake, read_range, should_skip};
use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::client::BlobClient;
use crate::error::UploadError;
use crate::reconcile::{Reconciliation, classify};
use crate::uploader::{ReconciledFile, UploadMode, Uploader, encode_batch};

/// Outcome of [`Uploader::estimate_cost`].
#[derive(Debug, Default)]
pub struct EstimateReport {
    /// Totals over every file that could be estimated.
    pub totals: EstimateResult,
    /// One [`UploadError::Estimate`] per file that could not.
    pub failures: Vec<UploadError>,
}

impl EstimateReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Prices shared by every file of one estimate.
struct Prices {
    gas_price: u128,
    upfront_payment: u128,
}

impl Uploader {
    /// Projects the storage and gas cost of uploading `files`.
    ///
    /// Fails only if the shared fee lookups fail. A file that cannot be
    /// estimated is reported in [`EstimateReport::failures`] without
    /// affecting the others.
    pub async fn estimate_cost(
        &self,
        files: Vec<FileEntry>,
        gas_inc_pct: u32,
        concurrency: usize,
    ) -> Result<EstimateReport, UploadError> {
        let fees = self
            .retry
            .run("feeData", || self.client.fee_data())
            .await?
            .inflated(gas_inc_pct);
        let upfront_payment = match self.mode {
            UploadMode::Blob(_) => {
                self.retry
                    .run("upfrontPayment", || self.client.upfront_payment())
                    .await?
            }
            UploadMode::Calldata => 0,
        };
        let prices = &Prices {
            gas_price: fees.gas_price,
            upfront_payment,
        };

        let outcomes: Vec<Result<EstimateResult, UploadError>> = stream::iter(files)
            .map(|file| async move {
                self.estimate_file(&file, prices)
                    .await
                    .map_err(|e| UploadError::estimate(&file.name, e))
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        let mut report = EstimateReport::default();
        for outcome in outcomes {
            match outcome {
                Ok(estimate) => report.totals.absorb(&estimate),
                Err(e) => {
                    warn!("{e}");
                    report.failures.push(e);
                }
            }
        }

        info!(
            files = report.totals.total_file_count,
            txs = report.totals.total_tx_count,
            storage_cost = report.totals.total_storage_cost,
            gas_cost = report.totals.total_gas_cost,
            failures = report.failures.len(),
            "estimate complete"
        );
        Ok(report)
    }

    async fn estimate_file(
        &self,
        file: &FileEntry,
        prices: &Prices,
    ) -> Result<EstimateResult, UploadError> {
        let plan = self.plan(file);
        let remote = self.remote_state(file).await?;
        let mut estimate = EstimateResult {
            total_file_count: 1,
            ..EstimateResult::default()
        };

        let mut state = classify(remote.chunk_count, plan.chunk_count());
        if state == Reconciliation::ShrinkDetected {
            let call = DirectoryCall::Remove { name: file.key() };
            let gas = self.client.estimate_gas(&call, 0).await?;
            add_tx(&mut estimate, gas, 0, prices);
            state = Reconciliation::New;
        }
        let target = ReconciledFile {
            key: file.key(),
            state,
            remote_count: remote.chunk_count,
            prefetched: None,
        };

        match &self.mode {
            UploadMode::Calldata => {
                self.estimate_calldata(file, &plan, &target, prices, &mut estimate)
                    .await?
            }
            UploadMode::Blob(blob) => {
                self.estimate_blob(blob.as_ref(), file, &plan, &target, prices, &mut estimate)
                    .await?
            }
        }

        debug!(
            file = %file.name,
            txs = estimate.total_tx_count,
            gas_cost = estimate.total_gas_cost,
            "file estimated"
        );
        Ok(estimate)
    }

    async fn estimate_calldata(
        &self,
        file: &FileEntry,
        plan: &ChunkPlan,
        target: &ReconciledFile,
        prices: &Prices,
        estimate: &mut EstimateResult,
    ) -> Result<(), UploadError> {
        // Gas samples by chunk length.
        let mut samples: HashMap<u64, u64> = HashMap::new();

        for chunk in plan.chunks() {
            let mut data = None;
            if target.needs_hash_check(chunk.index) {
                let bytes = read_range(file.path.clone(), chunk.byte_range()).await?;
                let stored = self.stored_hash(target, chunk.index).await?;
                if should_skip(&bytes, &stored) {
                    continue;
                }
                data = Some(bytes);
            }

            let value = calldata_stake(self.chain_id, chunk.len());
            let gas = match samples.get(&chunk.len()) {
                Some(&gas) => gas,
                None => {
                    let data = match data {
                        Some(data) => data,
                        None => read_range(file.path.clone(), chunk.byte_range()).await?,
                    };
                    let call = DirectoryCall::WriteChunk {
                        name: target.key.clone(),
                        chunk_id: 0,
                        data,
                    };
                    let gas = self.client.estimate_gas(&call, value).await?;
                    samples.insert(chunk.len(), gas);
                    gas
                }
            };
            add_tx(estimate, gas, value, prices);
        }
        Ok(())
    }

    async fn estimate_blob(
        &self,
        blob: &dyn BlobClient,
        file: &FileEntry,
        plan: &ChunkPlan,
        target: &ReconciledFile,
        prices: &Prices,
        estimate: &mut EstimateResult,
    ) -> Result<(), UploadError> {
        // Gas samples by the chunk sizes of a batch.
        let mut samples: HashMap<Vec<u64>, u64> = HashMap::new();

        for batch in plan.tx_batches(MAX_BLOBS_PER_TX) {
            if target.batch_needs_hash_check(&batch) {
                let data = read_range(file.path.clone(), batch.byte_range()).await?;
                let blobs = encode_batch(blob, &batch, &data)?;
                if self.blobs_unchanged(blob, target, &batch, &blobs).await? {
                    continue;
                }
            }

            let value = prices
                .upfront_payment
                .saturating_mul(batch.len() as u128);
            let sizes = batch.sizes();
            let gas = match samples.get(&sizes) {
                Some(&gas) => gas,
                None => {
                    let call = DirectoryCall::WriteChunks {
                        name: target.key.clone(),
                        chunk_ids: (0..batch.len() as u64).collect(),
                        sizes: sizes.clone(),
                    };
                    let gas = self.client.estimate_gas(&call, value).await?;
                    samples.insert(sizes, gas);
                    gas
                }
            };
            add_tx(estimate, gas, value, prices);
        }
        Ok(())
    }
}

fn add_tx(estimate: &mut EstimateResult, gas: u64, value: u128, prices: &Prices) {
    estimate.total_tx_count += 1;
    estimate.total_storage_cost = estimate.total_storage_cost.saturating_add(value);
    estimate.total_gas_cost = estimate
        .total_gas_cost
        .saturating_add((gas as u128).saturating_mul(prices.gas_price));
}
