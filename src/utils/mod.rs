use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Scoped stopwatch around one fetch or command. Emits a `debug!` on start
/// and an `info!` carrying `elapsed_ms` when dropped.
pub struct Timer {
    label: String,
    started: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        debug!(label = %label, "started");
        Self {
            label,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!(
            label = %self.label,
            elapsed_ms = self.elapsed().as_millis() as u64,
            "finished"
        );
    }
}
