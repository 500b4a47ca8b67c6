use std::error::Error;

use tracing::{error, info};

mod setup_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_tracing::register();

    match stubload_core::run().await {
        Ok(summary) => {
            info!(
                fetched = summary.fetched,
                processed = summary.processed,
                failed = summary.failed,
                "Exiting..."
            );
            Ok(())
        }
        Err(e) => {
            error!("{e:?}");
            Err(format!("Error running stubload: {e}").into())
        }
    }
}
