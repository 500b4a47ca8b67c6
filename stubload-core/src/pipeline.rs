//! The driver: drains the candidate rows one at a time through materialize, publish and
//! acknowledge.
//!
//! ```text
//! Fetched -> Materialized -> Published -> Acknowledged
//!     \_____________\______________\____> Failed(stage)
//! ```
//!
//! A failure at any stage is logged, reported through the [ErrorRecorder] and the run moves on
//! to the next row. Only failing to fetch the rows ends the run early.
use std::fmt;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::Result;
use crate::error::Error;
use crate::materializer::{materialize, stub_id};
use crate::publisher::{ConfirmationId, Publisher, RecordPublisher};
use crate::reporter::{ErrorRecorder, FailureReport};
use crate::row::{CandidateRow, StubId};
use crate::store::{Acknowledger, RowSource};

/// The stage a row failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Materialize,
    Publish,
    Acknowledge,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Materialize => write!(f, "materialize"),
            Stage::Publish => write!(f, "publish"),
            Stage::Acknowledge => write!(f, "acknowledge"),
        }
    }
}

/// What happened to one row.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    Delivered {
        stub_id: StubId,
        confirmation_id: ConfirmationId,
    },
    Failed {
        stage: Stage,
        error: Error,
    },
}

/// Counters for one run. `fetched == processed + failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub fetched: usize,
    /// Rows that were published and acknowledged.
    pub processed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Stamped on every failure report.
    pub environment: String,
    pub submission_topic_arn: String,
}

pub struct Pipeline<S, A, P, R> {
    config: PipelineConfig,
    source: S,
    acknowledger: A,
    publisher: RecordPublisher<P>,
    recorder: R,
}

impl<S, A, P, R> Pipeline<S, A, P, R>
where
    S: RowSource + Sync,
    A: Acknowledger + Sync,
    P: Publisher + Sync,
    R: ErrorRecorder + Sync,
{
    pub fn new(config: PipelineConfig, source: S, acknowledger: A, publisher: P, recorder: R) -> Self {
        Self {
            config,
            source,
            acknowledger,
            publisher: RecordPublisher::new(publisher),
            recorder,
        }
    }

    /// Runs once over the current candidate set.
    pub async fn run(&self) -> Result<RunSummary> {
        let rows = match self.source.fetch_candidates().await {
            Ok(rows) => rows,
            Err(e) => {
                error!(?e, kind = %e.kind(), "Failed to fetch candidate rows");
                return Err(e);
            }
        };
        info!(count = rows.len(), "Fetched candidate rows");

        let mut summary = RunSummary {
            fetched: rows.len(),
            ..Default::default()
        };

        for row in &rows {
            match self.dispatch(row).await {
                DispatchOutcome::Delivered {
                    stub_id,
                    confirmation_id,
                } => {
                    summary.processed += 1;
                    debug!(%stub_id, %confirmation_id, "Row dispatched");
                }
                DispatchOutcome::Failed { stage, error } => {
                    summary.failed += 1;
                    self.report(stage, &error, row).await;
                }
            }
        }

        info!(
            processed = summary.processed,
            failed = summary.failed,
            "Finished processing rows"
        );
        Ok(summary)
    }

    /// Moves one row through all three stages. Never panics and never returns early without
    /// an outcome.
    pub async fn dispatch(&self, row: &CandidateRow) -> DispatchOutcome {
        match self.try_dispatch(row).await {
            Ok((stub_id, confirmation_id)) => DispatchOutcome::Delivered {
                stub_id,
                confirmation_id,
            },
            Err((stage, error)) => DispatchOutcome::Failed { stage, error },
        }
    }

    async fn try_dispatch(
        &self,
        row: &CandidateRow,
    ) -> std::result::Result<(StubId, ConfirmationId), (Stage, Error)> {
        let (stub_id, record) = stub_id(row)
            .and_then(|id| Ok((id, materialize(row)?)))
            .map_err(|e| (Stage::Materialize, e.into()))?;

        let confirmation_id = self
            .publisher
            .publish(&record, &self.config.submission_topic_arn)
            .await
            .map_err(|e| (Stage::Publish, e))?;

        if let Err(e) = self.acknowledger.acknowledge(stub_id, &confirmation_id).await {
            warn!(
                %stub_id,
                %confirmation_id,
                "Row was published but not acknowledged, it will be published again on the next run"
            );
            return Err((Stage::Acknowledge, e));
        }

        Ok((stub_id, confirmation_id))
    }

    async fn report(&self, stage: Stage, error: &Error, row: &CandidateRow) {
        let kind = error.kind();
        match stub_id(row) {
            Ok(stub_id) => error!(%stub_id, %stage, %kind, ?error, "Failed to process row: {error}"),
            Err(_) => error!(%stage, %kind, ?error, "Failed to process row: {error}"),
        }

        let report = FailureReport::new(&self.config.environment, stage, error, row);
        self.recorder.notify_and_record(&report).await;
    }
}
