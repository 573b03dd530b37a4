use crate::adapters::{parse_data_json, parse_status_xml, DATA_JSON_FILE, STATUS_XML_FILE};
use crate::error::IngestError;
use crate::models::{Bill, BillType, FilePolicy, IngestOptions};
use futures_util::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::timeout;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Run-wide cap on concurrent parse jobs. Constructed once per ingestion run
/// and cloned into every job; there is no process-global gate state.
#[derive(Clone)]
pub struct ParseGate {
    permits: Arc<Semaphore>,
}

impl ParseGate {
    pub fn new(size: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(size.max(1))),
        }
    }

    async fn admit(&self) -> OwnedSemaphorePermit {
        self.permits
            .clone()
            .acquire_owned()
            .await
            .expect("parse gate semaphore is never closed")
    }

    #[cfg(test)]
    fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Xml,
    Json,
}

#[derive(Debug, Clone)]
struct Candidate {
    path: PathBuf,
    format: DocumentFormat,
}

pub struct SkippedDocument {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything one (congress, category) pair produced. Every discovered
/// candidate lands in exactly one of the two lists.
pub struct BatchReport {
    pub bills: Vec<Bill>,
    pub skipped: Vec<SkippedDocument>,
}

impl BatchReport {
    pub fn candidate_count(&self) -> usize {
        self.bills.len() + self.skipped.len()
    }

    fn empty() -> Self {
        Self {
            bills: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Each immediate subdirectory of the category directory is one candidate
/// item. The structured status file wins when both formats are present.
fn discover_candidates(category_dir: &Path) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for entry in WalkDir::new(category_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_dir() {
            continue;
        }

        let status_xml = entry.path().join(STATUS_XML_FILE);
        if status_xml.is_file() {
            candidates.push(Candidate {
                path: status_xml,
                format: DocumentFormat::Xml,
            });
        } else {
            candidates.push(Candidate {
                path: entry.path().join(DATA_JSON_FILE),
                format: DocumentFormat::Json,
            });
        }
    }

    candidates
}

/// Parse every candidate document for one (congress, category) pair, at most
/// `gate`-many jobs in flight at once, and return only after all of them have
/// finished. Results keep discovery order; each job owns its own slot, so the
/// aggregate needs no lock.
pub async fn collect_batch(
    root: &Path,
    congress: u16,
    bill_type: BillType,
    gate: &ParseGate,
    options: &IngestOptions,
) -> Result<BatchReport, IngestError> {
    let category_dir = root
        .join(congress.to_string())
        .join("bills")
        .join(bill_type.as_str());

    // Early congresses are missing whole categories; that is expected.
    let candidates = discover_candidates(&category_dir);
    if candidates.is_empty() {
        debug!(
            congress,
            bill_type = bill_type.as_str(),
            dir = %category_dir.display(),
            "no candidate documents"
        );
        return Ok(BatchReport::empty());
    }

    let parse_timeout = options.parse_timeout;
    let jobs = candidates.into_iter().map(|candidate| {
        let gate = gate.clone();
        async move {
            let _permit = gate.admit().await;

            let display_path = candidate.path.clone();
            let parse = tokio::task::spawn_blocking(move || match candidate.format {
                DocumentFormat::Xml => parse_status_xml(&candidate.path),
                DocumentFormat::Json => parse_data_json(&candidate.path),
            });

            let outcome = match timeout(parse_timeout, parse).await {
                Ok(Ok(result)) => result,
                Ok(Err(join_error)) => Err(IngestError::TaskJoin(join_error)),
                Err(_) => Err(IngestError::ParseTimeout {
                    path: display_path.clone(),
                    seconds: parse_timeout.as_secs(),
                }),
            };

            (display_path, outcome)
        }
    });

    // join_all is the barrier: it completes only once every job has, and it
    // hands results back in discovery order.
    let outcomes = join_all(jobs).await;

    let mut bills = Vec::with_capacity(outcomes.len());
    let mut skipped = Vec::new();
    for (path, outcome) in outcomes {
        match outcome {
            Ok(bill) => bills.push(bill),
            Err(error) => {
                if options.file_policy == FilePolicy::Abort {
                    return Err(error);
                }
                warn!(path = %path.display(), reason = %error, "skipping document");
                skipped.push(SkippedDocument {
                    path,
                    reason: error.to_string(),
                });
            }
        }
    }

    Ok(BatchReport { bills, skipped })
}
