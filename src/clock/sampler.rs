//! Background location sampler for open shifts.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::repository::TimeEntryRepository;
use crate::verify::LocationProvider;

/// Handle to a running sampler task. Aborts the task when stopped or
/// dropped.
pub struct SamplerHandle {
    task: JoinHandle<()>,
}

impl SamplerHandle {
    /// Starts sampling the given entry every `interval_secs` seconds.
    ///
    /// Each tick acquires a fix and appends it via
    /// [`TimeEntryRepository::append_sample`]; the task stops on its own
    /// once the entry closes, so it cannot race a check-out. Failed
    /// acquisitions and failed writes skip the tick; the periodic trail is
    /// best-effort.
    pub fn start(
        entry_id: Uuid,
        provider: Arc<dyn LocationProvider>,
        repository: Arc<dyn TimeEntryRepository>,
        interval_secs: u64,
    ) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
            // The first tick fires immediately; the check-in sample already
            // covers that instant.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let sample = match provider.acquire().await {
                    Ok(sample) => sample,
                    Err(err) => {
                        warn!(%entry_id, error = %err, "periodic sample acquisition failed");
                        continue;
                    }
                };
                match repository.append_sample(entry_id, sample).await {
                    Ok(true) => debug!(%entry_id, "periodic sample appended"),
                    Ok(false) => {
                        debug!(%entry_id, "entry closed, sampler stopping");
                        break;
                    }
                    Err(err) => {
                        warn!(%entry_id, error = %err, "periodic sample write failed");
                    }
                }
            }
        });
        Self { task }
    }

    /// Stops the sampler immediately.
    pub fn stop(self) {
        self.task.abort();
    }

    /// Whether the task has finished on its own.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
