use crate::dispatch::{collect_batch, ParseGate};
use crate::error::PipelineError;
use crate::models::{BillType, IngestOptions};
use crate::traits::BillStore;
use std::path::Path;
use tracing::info;

#[derive(Debug, Default, Clone)]
pub struct IngestSummary {
    /// (congress, category) pairs that had at least one candidate document.
    pub categories_loaded: usize,
    pub documents_discovered: usize,
    pub documents_skipped: usize,
    pub rows_written: usize,
}

/// Drives the outer loop: every congress in the configured range crossed with
/// every category, dispatch then load, strictly sequential across categories.
/// Only files within one category are parallelized, which keeps one
/// category's records resident at a time and makes the shared gate meaningful.
pub struct IngestPipeline<S: BillStore> {
    store: S,
    options: IngestOptions,
}

impl<S: BillStore + Send + Sync> IngestPipeline<S> {
    pub fn new(store: S, options: IngestOptions) -> Self {
        Self { store, options }
    }

    pub async fn run(&self, root: &Path) -> Result<IngestSummary, PipelineError> {
        self.store.ensure_schema().await?;

        let gate = ParseGate::new(self.options.parallel_parses);
        let mut summary = IngestSummary::default();

        for congress in self.options.first_congress..=self.options.last_congress {
            for bill_type in BillType::ALL {
                let report =
                    collect_batch(root, congress, bill_type, &gate, &self.options).await?;
                let discovered = report.candidate_count();
                if discovered == 0 {
                    continue;
                }

                // A store failure is fatal to the whole run; there is no
                // compensating rollback for already-committed batches.
                let written = self.store.insert_batch(&report.bills).await?;

                summary.categories_loaded += 1;
                summary.documents_discovered += discovered;
                summary.documents_skipped += report.skipped.len();
                summary.rows_written += written;

                info!(
                    congress,
                    bill_type = bill_type.as_str(),
                    candidates = discovered,
                    skipped = report.skipped.len(),
                    rows = written,
                    "category batch loaded"
                );
            }
        }

        Ok(summary)
    }
}
