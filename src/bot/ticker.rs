//! Periodic reconciliation.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::bridge::Bridge;
use crate::catalog::MovieCategory;
use crate::error::BridgeError;

/// Spawn a task running a pass over `category` every `interval`.
///
/// The first pass happens one interval after startup.
pub fn spawn_reconcile_ticker(
    bridge: Arc<Bridge>,
    category: MovieCategory,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    info!(
        "Periodic reconciliation enabled: {} movies every {:?}",
        category, interval
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);

        // Skip the first immediate tick, wait for the first interval
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.cancelled() => break,
            }

            match bridge.run_pass(category).await {
                Ok(_) => {}
                Err(BridgeError::PassInFlight) => {
                    debug!("Skipping scheduled pass, another pass is still running");
                }
                // Already logged by the pass itself.
                Err(e) => debug!("Scheduled pass over {} movies failed: {}", category, e),
            }
        }

        info!("Reconciliation ticker stopped");
    })
}
