use crate::error::StoreError;
use crate::models::Bill;
use async_trait::async_trait;

/// Write-side seam over the destination store. The pipeline is the only
/// caller and never runs two batches concurrently.
#[async_trait]
pub trait BillStore {
    /// Provision partition tables and search indexes. Safe to call repeatedly.
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Persist one category batch as a single bulk write, returning the number
    /// of rows written. An empty batch is a no-op, not an error.
    async fn insert_batch(&self, bills: &[Bill]) -> Result<usize, StoreError>;
}
