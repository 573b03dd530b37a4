use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed document {path}: {reason}")]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("document {path} has no actions to derive a status date from")]
    MissingActions { path: PathBuf },

    #[error("document {path} is missing identity field `{field}`")]
    MissingIdentity { path: PathBuf, field: &'static str },

    #[error("parsing {path} exceeded the {seconds}s job timeout")]
    ParseTimeout { path: PathBuf, seconds: u64 },

    #[error("parse task failed to join: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("corpus update tool failed and a fresh corpus is required")]
    StaleCorpus,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
