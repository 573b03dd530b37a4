pub mod adapters;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod stores;
pub mod traits;
pub mod updater;

pub use adapters::{parse_data_json, parse_status_xml, DATA_JSON_FILE, STATUS_XML_FILE};
pub use dispatch::{collect_batch, BatchReport, ParseGate, SkippedDocument};
pub use error::{IngestError, PipelineError, StoreError};
pub use models::{
    normalize_date, Bill, BillAction, BillSponsor, BillSummary, BillType, FilePolicy,
    IngestOptions,
};
pub use pipeline::{IngestPipeline, IngestSummary};
pub use stores::SqliteBillStore;
pub use traits::BillStore;
pub use updater::CorpusUpdater;
