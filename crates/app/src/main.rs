use bill_search_core::{
    CorpusUpdater, FilePolicy, IngestOptions, IngestPipeline, SqliteBillStore,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "bill-search-loader", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// SQLite database file receiving the bill partitions.
    #[arg(long, default_value = "bills.db")]
    database: PathBuf,

    /// Root of the downloaded document corpus.
    #[arg(long, default_value = "/congress/data")]
    corpus_root: PathBuf,

    /// External tool invoked to refresh the corpus before ingestion.
    #[arg(long, default_value = "./run")]
    update_tool: PathBuf,

    /// Working directory the update tool runs in.
    #[arg(long, default_value = "/congress")]
    update_workdir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Refresh the on-disk corpus with the external update tool.
    Update {
        /// Congress targeted by the latest-only fallback pass.
        #[arg(long, default_value = "117")]
        latest_congress: u16,

        /// Treat update-tool failure as fatal.
        #[arg(long, default_value_t = false)]
        require_fresh_corpus: bool,
    },
    /// Parse the corpus and bulk-load every category batch into the store.
    Ingest {
        /// First congress of the range to process.
        #[arg(long, default_value = "93")]
        first_congress: u16,

        /// Last congress of the range to process.
        #[arg(long, default_value = "117")]
        last_congress: u16,

        /// Parse jobs allowed in flight across the whole run.
        #[arg(long, default_value = "64")]
        parallel_parses: usize,

        /// Seconds before a single document parse is abandoned.
        #[arg(long, default_value = "60")]
        parse_timeout_secs: u64,

        /// Abort a category on the first malformed document instead of
        /// skipping it.
        #[arg(long, default_value_t = false)]
        strict_files: bool,

        /// Ingest what is already on disk without refreshing first.
        #[arg(long, default_value_t = false)]
        skip_update: bool,

        /// Treat update-tool failure as fatal.
        #[arg(long, default_value_t = false)]
        require_fresh_corpus: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "bill-search-loader boot"
    );

    match cli.command {
        Command::Update {
            latest_congress,
            require_fresh_corpus,
        } => {
            let updater = CorpusUpdater::new(&cli.update_tool, &cli.update_workdir, latest_congress)
                .require_success(require_fresh_corpus);
            updater
                .refresh()
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            println!("corpus refreshed at {}", Utc::now().to_rfc3339());
        }
        Command::Ingest {
            first_congress,
            last_congress,
            parallel_parses,
            parse_timeout_secs,
            strict_files,
            skip_update,
            require_fresh_corpus,
        } => {
            if !skip_update {
                let updater =
                    CorpusUpdater::new(&cli.update_tool, &cli.update_workdir, last_congress)
                        .require_success(require_fresh_corpus);
                updater
                    .refresh()
                    .await
                    .map_err(|error| anyhow::anyhow!(error.to_string()))?;
            }

            let options = IngestOptions {
                first_congress,
                last_congress,
                parallel_parses,
                parse_timeout: Duration::from_secs(parse_timeout_secs),
                file_policy: if strict_files {
                    FilePolicy::Abort
                } else {
                    FilePolicy::Skip
                },
            };

            let store = SqliteBillStore::open(&cli.database)
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;
            let pipeline = IngestPipeline::new(store, options);

            let summary = pipeline
                .run(&cli.corpus_root)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            if summary.documents_skipped > 0 {
                warn!(
                    skipped = summary.documents_skipped,
                    "some documents were skipped; see warnings above"
                );
            }

            println!(
                "{} rows loaded across {} category batches ({} of {} documents skipped) at {}",
                summary.rows_written,
                summary.categories_loaded,
                summary.documents_skipped,
                summary.documents_discovered,
                Utc::now().to_rfc3339()
            );
        }
    }

    Ok(())
}
