//! Drains the stub records table. Every candidate row is materialized into a
//! [record::MotorCustomer], published to the submission topic and acknowledged back in the
//! store. A row that fails any of these steps is reported and skipped, and the run carries on.
use tracing::{error, info};

pub use self::error::{Error, ErrorKind, Result, ValidationError};

mod error;

pub mod config;
pub mod materializer;
pub mod pipeline;
pub mod publisher;
pub mod record;
pub mod reporter;
pub mod row;
pub mod store;

#[cfg(test)]
mod test_utils;

use crate::pipeline::{Pipeline, RunSummary};
use crate::reporter::NotifyingErrorRecorder;
use crate::store::postgres::PgStore;
use stubload_sns::publisher::SnsPublisherBuilder;

/// Runs the pipeline once against the configured database and topics.
pub async fn run() -> Result<RunSummary> {
    let settings = match config::config() {
        Ok(settings) => settings,
        Err(e) => {
            error!(?e, kind = %e.kind(), "Failed to load configuration");
            return Err(e);
        }
    };
    info!(?settings, "Loaded configuration");

    let store = PgStore::connect(&settings.database_url).await?;
    let sns_publisher = SnsPublisherBuilder::new(settings.sns.clone()).build().await?;

    let recorder = NotifyingErrorRecorder::new(
        sns_publisher.clone(),
        store.clone(),
        settings.failure_topic_arn.clone(),
    );
    let pipeline = Pipeline::new(
        settings.pipeline_config(),
        store.clone(),
        store,
        sns_publisher,
        recorder,
    );

    pipeline.run().await
}
