use crate::core::Pipeline;
use crate::domain::model::RunReport;
use crate::utils::error::Result;
use std::cell::Cell;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Fetching,
    Writing,
    Uploading,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Pending => "PENDING",
            RunState::Fetching => "FETCHING",
            RunState::Writing => "WRITING",
            RunState::Uploading => "UPLOADING",
            RunState::Done => "DONE",
            RunState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Drives one run through FETCHING → WRITING → UPLOADING → DONE.
/// The first error moves the run to FAILED; earlier steps are not rolled back.
pub struct IngestEngine<P: Pipeline> {
    pipeline: P,
    state: Cell<RunState>,
}

impl<P: Pipeline> IngestEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            state: Cell::new(RunState::Pending),
        }
    }

    pub fn state(&self) -> RunState {
        self.state.get()
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    fn enter(&self, next: RunState) {
        tracing::debug!("Run state {} -> {}", self.state.get(), next);
        self.state.set(next);
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("🚀 Starting ingestion run");

        match self.run_steps().await {
            Ok(report) => {
                self.enter(RunState::Done);
                tracing::info!(
                    "Ingestion finished: {} records, {} -> {}",
                    report.records,
                    report.artifact.path.display(),
                    report.remote
                );
                Ok(report)
            }
            Err(e) => {
                let failed_in = self.state();
                self.enter(RunState::Failed);
                tracing::error!("❌ Ingestion failed during {}: {}", failed_in, e);
                Err(e)
            }
        }
    }

    async fn run_steps(&self) -> Result<RunReport> {
        self.enter(RunState::Fetching);
        let batch = self.pipeline.fetch().await?;
        let records = batch.len();
        tracing::info!("Fetched {} records", records);

        self.enter(RunState::Writing);
        let artifact = self.pipeline.write(batch).await?;
        tracing::info!("📁 Saved {} rows to {}", artifact.rows, artifact.path.display());

        self.enter(RunState::Uploading);
        let remote = self.pipeline.upload(&artifact).await?;

        Ok(RunReport {
            records,
            artifact,
            remote,
        })
    }
}
