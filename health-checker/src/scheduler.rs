use crate::health_monitor::HealthMonitor;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::info;

/// Runs a bulk check, then waits `interval` before the next one.
pub fn spawn_scheduler(monitor: Arc<HealthMonitor>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval = ?interval, "health check scheduler started");
        loop {
            let checked = monitor.monitor_all_targets().await;
            info!(checked, "health check cycle completed");

            time::sleep(interval).await;
        }
    })
}
