use std::ops::Range;

use ethfs_protocol::{GALILEO_CHAIN_ID, UploadType};

use crate::{BLOB_DATA_SIZE, CALLDATA_CHUNK_SIZE, GALILEO_CHUNK_SIZE, WEI_PER_ETHER};

/// Maximum chunk size for a chain and upload type.
pub fn max_chunk_size(chain_id: u64, upload_type: UploadType) -> u64 {
    match upload_type {
        UploadType::Blob => BLOB_DATA_SIZE,
        UploadType::Calldata if chain_id == GALILEO_CHAIN_ID => GALILEO_CHUNK_SIZE,
        UploadType::Calldata => CALLDATA_CHUNK_SIZE,
    }
}

/// Native value (wei) that must accompany a calldata chunk write.
///
/// Only the low-gas-limit network charges a stake, and only for chunks
/// larger than the free calldata threshold.
pub fn calldata_stake(chain_id: u64, chunk_len: u64) -> u128 {
    if chain_id != GALILEO_CHAIN_ID || chunk_len <= CALLDATA_CHUNK_SIZE {
        return 0;
    }
    let ether = (chunk_len + 326) / 1024 / 24;
    ether as u128 * WEI_PER_ETHER
}

/// How a file of a given size splits into chunks.
///
/// Every file has at least one chunk; a zero-byte file plans a single
/// empty chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    file_size: u64,
    chunk_size: u64,
    chunk_count: u64,
}

impl ChunkPlan {
    /// Plans `file_size` bytes for the given chain and upload type.
    pub fn new(file_size: u64, chain_id: u64, upload_type: UploadType) -> Self {
        Self::split(file_size, max_chunk_size(chain_id, upload_type))
    }

    /// Splits `file_size` bytes into chunks of at most `max_chunk` bytes.
    pub fn split(file_size: u64, max_chunk: u64) -> Self {
        let max_chunk = max_chunk.max(1);
        let chunk_count = file_size.div_ceil(max_chunk).max(1);
        Self {
            file_size,
            chunk_size: max_chunk,
            chunk_count,
        }
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Size of every chunk except possibly the last.
    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn chunk_count(&self) -> u64 {
        self.chunk_count
    }

    /// Byte range of chunk `index`, or `None` past the end of the plan.
    pub fn chunk(&self, index: u64) -> Option<ChunkRange> {
        if index >= self.chunk_count {
            return None;
        }
        let start = index * self.chunk_size;
        let end = (start + self.chunk_size).min(self.file_size);
        Some(ChunkRange {
            index,
            start,
            end,
            is_last: index + 1 == self.chunk_count,
        })
    }

    /// All chunks in index order.
    pub fn chunks(&self) -> impl Iterator<Item = ChunkRange> + '_ {
        (0..self.chunk_count).filter_map(|i| self.chunk(i))
    }

    /// Groups consecutive chunks into transactions of at most `per_tx` chunks.
    pub fn tx_batches(&self, per_tx: usize) -> Vec<TxBatch> {
        let per_tx = per_tx.max(1) as u64;
        (0..self.chunk_count)
            .step_by(per_tx as usize)
            .map(|first| {
                let last = (first + per_tx).min(self.chunk_count);
                TxBatch {
                    chunks: (first..last).filter_map(|i| self.chunk(i)).collect(),
                }
            })
            .collect()
    }
}

/// One chunk of a [`ChunkPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub index: u64,
    pub start: u64,
    pub end: u64,
    pub is_last: bool,
}

impl ChunkRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn byte_range(&self) -> Range<u64> {
        self.start..self.end
    }
}

/// Consecutive chunks submitted in one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxBatch {
    pub chunks: Vec<ChunkRange>,
}

impl TxBatch {
    pub fn chunk_ids(&self) -> Vec<u64> {
        self.chunks.iter().map(|c| c.index).collect()
    }

    /// Logical size of each chunk.
    pub fn sizes(&self) -> Vec<u64> {
        self.chunks.iter().map(ChunkRange::len).collect()
    }

    pub fn first_index(&self) -> u64 {
        self.chunks.first().map_or(0, |c| c.index)
    }

    pub fn last_index(&self) -> u64 {
        self.chunks.last().map_or(0, |c| c.index)
    }

    /// Contiguous file bytes covered by the batch.
    pub fn byte_range(&self) -> Range<u64> {
        let start = self.chunks.first().map_or(0, |c| c.start);
        let end = self.chunks.last().map_or(0, |c| c.end);
        start..end
    }

    pub fn byte_len(&self) -> u64 {
        let range = self.byte_range();
        range.end - range.start
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethfs_protocol::constants::{ETHEREUM_CHAIN_ID, SEPOLIA_CHAIN_ID};

    fn assert_covers(plan: &ChunkPlan) {
        let mut expected_start = 0;
        let mut total = 0;
        for chunk in plan.chunks() {
            assert_eq!(chunk.start, expected_start, "gap or overlap at {}", chunk.index);
            expected_start = chunk.end;
            total += chunk.len();
        }
        assert_eq!(total, plan.file_size());
    }

    #[test]
    fn small_file_is_one_chunk() {
        let plan = ChunkPlan::new(1000, ETHEREUM_CHAIN_ID, UploadType::Calldata);
        assert_eq!(plan.chunk_count(), 1);
        let only = plan.chunk(0).unwrap();
        assert_eq!(only.byte_range(), 0..1000);
        assert!(only.is_last);
    }

    #[test]
    fn threshold_is_inclusive() {
        let plan = ChunkPlan::new(CALLDATA_CHUNK_SIZE, ETHEREUM_CHAIN_ID, UploadType::Calldata);
        assert_eq!(plan.chunk_count(), 1);
        let plan = ChunkPlan::new(CALLDATA_CHUNK_SIZE + 1, ETHEREUM_CHAIN_ID, UploadType::Calldata);
        assert_eq!(plan.chunk_count(), 2);
        assert_eq!(plan.chunk(1).unwrap().len(), 1);
    }

    #[test]
    fn galileo_uses_large_chunks() {
        let size = 600 * 1024;
        let plan = ChunkPlan::new(size, GALILEO_CHAIN_ID, UploadType::Calldata);
        assert_eq!(plan.chunk_size(), 475 * 1024);
        assert_eq!(plan.chunk_count(), 2);
        assert_eq!(plan.chunk(1).unwrap().len(), size - 475 * 1024);
        assert_covers(&plan);
    }

    #[test]
    fn six_hundred_kib_on_ordinary_chain() {
        let size = 600 * 1024;
        let plan = ChunkPlan::new(size, SEPOLIA_CHAIN_ID, UploadType::Calldata);
        assert_eq!(plan.chunk_count(), size.div_ceil(24 * 1024 - 326));
        assert_covers(&plan);
    }

    #[test]
    fn coverage_and_determinism_over_many_sizes() {
        for size in [0, 1, 2, 24_249, 24_250, 24_251, 126_975, 126_976, 126_977, 1_000_003] {
            for upload_type in [UploadType::Calldata, UploadType::Blob] {
                for chain in [ETHEREUM_CHAIN_ID, GALILEO_CHAIN_ID] {
                    let a = ChunkPlan::new(size, chain, upload_type);
                    let b = ChunkPlan::new(size, chain, upload_type);
                    assert_eq!(a, b);
                    assert!(a.chunk_count() >= 1);
                    assert_covers(&a);
                }
            }
        }
    }

    #[test]
    fn blob_last_chunk_size() {
        let size = BLOB_DATA_SIZE * 4 + 10;
        let plan = ChunkPlan::new(size, SEPOLIA_CHAIN_ID, UploadType::Blob);
        assert_eq!(plan.chunk_count(), 5);
        let last = plan.chunk(4).unwrap();
        assert!(last.is_last);
        assert_eq!(last.len(), size - BLOB_DATA_SIZE * 4);
        for i in 0..4 {
            assert_eq!(plan.chunk(i).unwrap().len(), BLOB_DATA_SIZE);
        }
    }

    #[test]
    fn zero_byte_file_has_one_empty_chunk() {
        let plan = ChunkPlan::new(0, SEPOLIA_CHAIN_ID, UploadType::Blob);
        assert_eq!(plan.chunk_count(), 1);
        assert!(plan.chunk(0).unwrap().is_empty());
        assert!(plan.chunk(1).is_none());
    }

    #[test]
    fn tx_batches_group_blobs() {
        let plan = ChunkPlan::new(BLOB_DATA_SIZE * 7, SEPOLIA_CHAIN_ID, UploadType::Blob);
        let batches = plan.tx_batches(3);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].chunk_ids(), vec![0, 1, 2]);
        assert_eq!(batches[1].chunk_ids(), vec![3, 4, 5]);
        assert_eq!(batches[2].chunk_ids(), vec![6]);
        assert_eq!(batches[1].byte_range(), BLOB_DATA_SIZE * 3..BLOB_DATA_SIZE * 6);
        assert_eq!(batches[2].sizes(), vec![BLOB_DATA_SIZE]);
        assert_eq!(batches[2].last_index(), 6);
    }

    #[test]
    fn single_chunk_batches_mirror_chunks() {
        let plan = ChunkPlan::new(100_000, ETHEREUM_CHAIN_ID, UploadType::Calldata);
        let batches = plan.tx_batches(1);
        assert_eq!(batches.len() as u64, plan.chunk_count());
        for (batch, chunk) in batches.iter().zip(plan.chunks()) {
            assert_eq!(batch.chunks, vec![chunk]);
        }
    }

    #[test]
    fn stake_only_on_galileo_above_threshold() {
        assert_eq!(calldata_stake(ETHEREUM_CHAIN_ID, GALILEO_CHUNK_SIZE), 0);
        assert_eq!(calldata_stake(GALILEO_CHAIN_ID, CALLDATA_CHUNK_SIZE), 0);
        // (486400 + 326) / 1024 / 24 = 19 ether.
        assert_eq!(
            calldata_stake(GALILEO_CHAIN_ID, GALILEO_CHUNK_SIZE),
            19 * WEI_PER_ETHER
        );
        // (24251 + 326) / 1024 / 24 = 1 ether.
        assert_eq!(
            calldata_stake(GALILEO_CHAIN_ID, CALLDATA_CHUNK_SIZE + 1),
            WEI_PER_ETHER
        );
    }
}
