use crate::error::IngestError;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{info, warn};

/// Runs the external corpus update tool before ingestion. The tool owns the
/// on-disk document tree; ingestion only needs it present and readable once
/// `refresh` returns.
pub struct CorpusUpdater {
    program: PathBuf,
    workdir: PathBuf,
    latest_congress: u16,
    require_success: bool,
}

impl CorpusUpdater {
    pub fn new(
        program: impl Into<PathBuf>,
        workdir: impl Into<PathBuf>,
        latest_congress: u16,
    ) -> Self {
        Self {
            program: program.into(),
            workdir: workdir.into(),
            latest_congress,
            require_success: false,
        }
    }

    /// Treat a failed refresh as fatal instead of ingesting a possibly stale
    /// corpus.
    pub fn require_success(mut self, required: bool) -> Self {
        self.require_success = required;
        self
    }

    /// Full bulk-status refresh, then a latest-congress-only pass to pick up
    /// recent items the full pass may have left behind.
    pub async fn refresh(&self) -> Result<(), IngestError> {
        let full_ok = self
            .run_tool(&["govinfo".to_string(), "--bulkdata=BILLSTATUS".to_string()])
            .await?;

        let latest_ok = self
            .run_tool(&[
                "govinfo".to_string(),
                "--bulkdata=BILLSTATUS".to_string(),
                format!("--congress={}", self.latest_congress),
            ])
            .await?;

        if self.require_success && !full_ok && !latest_ok {
            return Err(IngestError::StaleCorpus);
        }

        Ok(())
    }

    async fn run_tool(&self, args: &[String]) -> Result<bool, IngestError> {
        info!(program = %self.program.display(), ?args, "running corpus update tool");

        let mut child = Command::new(&self.program)
            .args(args)
            .current_dir(&self.workdir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_task = tokio::spawn(stream_lines(stdout, "stdout"));
        let stderr_task = tokio::spawn(stream_lines(stderr, "stderr"));

        let status = child.wait().await?;
        let _ = stdout_task.await;
        let _ = stderr_task.await;

        if !status.success() {
            warn!(%status, "corpus update tool exited with failure");
        }
        Ok(status.success())
    }
}

async fn stream_lines<R: AsyncRead + Unpin>(pipe: Option<R>, channel: &'static str) {
    let Some(pipe) = pipe else {
        return;
    };

    let mut lines = BufReader::new(pipe).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        info!(target: "corpus_update", channel, "{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::CorpusUpdater;
    use tempfile::tempdir;

    #[tokio::test]
    async fn exit_status_is_reported_without_failing_the_call() {
        let dir = tempdir().expect("tempdir");
        let updater = CorpusUpdater::new("sh", dir.path(), 117);

        let ok = updater
            .run_tool(&["-c".to_string(), "echo refreshed".to_string()])
            .await
            .expect("tool should spawn");
        assert!(ok);

        let failed = updater
            .run_tool(&["-c".to_string(), "echo broken 1>&2; exit 3".to_string()])
            .await
            .expect("tool should spawn");
        assert!(!failed);
    }

    #[tokio::test]
    async fn missing_tool_is_an_io_error() {
        let dir = tempdir().expect("tempdir");
        let updater = CorpusUpdater::new(dir.path().join("no-such-tool"), dir.path(), 117);
        let result = updater.run_tool(&[]).await;
        assert!(result.is_err());
    }
}
