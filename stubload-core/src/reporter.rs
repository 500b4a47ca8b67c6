//! Reporting of per-row failures to the outside world.
//!
//! Reporting is best-effort: a failure to notify or to record is logged and dropped, it never
//! changes the outcome of the row or of the run.
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::COMPONENT_NAME;
use crate::error::{Error, ErrorKind};
use crate::pipeline::Stage;
use crate::publisher::Publisher;
use crate::row::CandidateRow;
use crate::store::ErrorStore;

/// Everything known about one failed row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    pub environment: String,
    pub error_message: String,
    pub component: String,
    pub stage: Stage,
    pub kind: ErrorKind,
    /// JSON snapshot of the offending row.
    pub context: String,
    /// `Debug` rendering of the underlying error.
    pub cause: String,
}

impl FailureReport {
    pub fn new(environment: &str, stage: Stage, error: &Error, row: &CandidateRow) -> Self {
        let kind = error.kind();
        Self {
            environment: environment.to_string(),
            error_message: format!("{kind}: {error}."),
            component: COMPONENT_NAME.to_string(),
            stage,
            kind,
            context: row.snapshot(),
            cause: format!("{error:?}"),
        }
    }
}

/// Receives one report per caught failure.
#[trait_variant::make(ErrorRecorder: Send)]
#[allow(dead_code)]
pub trait LocalErrorRecorder {
    async fn notify_and_record(&self, report: &FailureReport);
}

/// Publishes each report to the failure topic, then inserts it into the error store.
pub struct NotifyingErrorRecorder<P, S> {
    publisher: P,
    store: S,
    failure_topic_arn: String,
}

impl<P, S> NotifyingErrorRecorder<P, S> {
    pub fn new(publisher: P, store: S, failure_topic_arn: impl Into<String>) -> Self {
        Self {
            publisher,
            store,
            failure_topic_arn: failure_topic_arn.into(),
        }
    }
}

impl<P, S> ErrorRecorder for NotifyingErrorRecorder<P, S>
where
    P: Publisher + Sync,
    S: ErrorStore + Sync,
{
    async fn notify_and_record(&self, report: &FailureReport) {
        match serde_json::to_string(report) {
            Ok(payload) => {
                let key = notification_key(&report.component, Utc::now());
                match self
                    .publisher
                    .publish(&key, &payload, &self.failure_topic_arn)
                    .await
                {
                    Ok(confirmation_id) => {
                        debug!(%confirmation_id, "Failure notification sent")
                    }
                    Err(e) => warn!(?e, kind = %report.kind, "Failed to send failure notification"),
                }
            }
            Err(e) => warn!(?e, kind = %report.kind, "Failed to serialize failure report"),
        }

        if let Err(e) = self.store.insert_error(report).await {
            warn!(?e, kind = %report.kind, "Failed to record failure in the error store");
        }
    }
}

fn notification_key(component: &str, sent_at: DateTime<Utc>) -> String {
    format!(
        "error_{component}_{}",
        sent_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}
