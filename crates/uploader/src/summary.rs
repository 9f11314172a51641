//! Aggregate report over per-file upload results.

use ethfs_protocol::{FileOutcome, UploadResult};

/// Totals and failures of one upload run.
///
/// Totals only count files that committed at least one chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub total_file_count: usize,
    pub total_upload_count: u64,
    pub total_upload_size: u64,
    pub total_storage_cost: u128,
    pub completed: Vec<String>,
    /// Files that stopped at the given chunk index.
    pub partially_failed: Vec<(String, u64)>,
    /// Files with nothing committed, including rejected ones.
    pub failed: Vec<String>,
}

impl UploadSummary {
    pub fn from_results(results: &[UploadResult]) -> Self {
        let mut summary = Self {
            total_file_count: results.len(),
            ..Self::default()
        };

        for result in results {
            if result.current_success_index >= 0 {
                summary.total_upload_count += result.total_upload_count;
                summary.total_upload_size += result.total_upload_size;
                summary.total_storage_cost = summary
                    .total_storage_cost
                    .saturating_add(result.total_storage_cost);
            }

            match result.outcome() {
                FileOutcome::Completed => summary.completed.push(result.file_name.clone()),
                FileOutcome::PartiallyFailed { failed_chunk } => summary
                    .partially_failed
                    .push((result.file_name.clone(), failed_chunk)),
                FileOutcome::Failed | FileOutcome::Rejected => {
                    summary.failed.push(result.file_name.clone())
                }
            }
        }

        summary.completed.sort();
        summary.partially_failed.sort();
        summary.failed.sort();
        summary
    }

    pub fn is_success(&self) -> bool {
        self.partially_failed.is_empty() && self.failed.is_empty()
    }
}
