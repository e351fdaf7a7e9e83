//! Recurring trigger: run `check_all_ongoing_tournaments` on a fixed cadence.

use crate::logic::{ProgressionCoordinator, SweepReport};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Run one sweep on a blocking worker. Errors are logged, never propagated.
pub async fn run_sweep(coordinator: Arc<ProgressionCoordinator>) -> Option<SweepReport> {
    match tokio::task::spawn_blocking(move || coordinator.check_all_ongoing_tournaments()).await {
        Ok(Ok(report)) => {
            if report.failures > 0 {
                log::warn!("Sweep finished with {} failure(s)", report.failures);
            }
            Some(report)
        }
        Ok(Err(e)) => {
            log::error!("Sweep failed: {}", e);
            None
        }
        Err(e) => {
            log::error!("Sweep task panicked: {}", e);
            None
        }
    }
}

/// Sweep forever every `every`. A slow sweep delays the next tick rather than overlapping it.
pub async fn run_periodic(coordinator: Arc<ProgressionCoordinator>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    log::info!("Progression sweep every {}s", every.as_secs());
    loop {
        interval.tick().await;
        run_sweep(coordinator.clone()).await;
    }
}
