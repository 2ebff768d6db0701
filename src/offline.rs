//! Offline event queue with idempotent replay.
//!
//! When the repository is unreachable, clock transitions are captured as
//! [`QueuedEvent`]s carrying the full entry snapshot and replayed once
//! connectivity returns. Replay is idempotent: events are deduplicated on
//! `(guard_id, recorded_at)` at enqueue time, and applying an event whose
//! effect is already present in the repository counts as skipped, not as a
//! second application.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::TimeEntry;
use crate::repository::TimeEntryRepository;

/// The clock transition a queued event captures.
///
/// Every variant carries the entry as it looked immediately after the
/// transition, so replay never has to re-derive state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClockEventKind {
    /// A new entry was opened.
    CheckIn {
        /// The freshly created entry.
        entry: TimeEntry,
    },
    /// A break was started on the open entry.
    BreakStarted {
        /// The entry with the new open break appended.
        entry: TimeEntry,
    },
    /// The open break was closed.
    BreakEnded {
        /// The entry with the break closed.
        entry: TimeEntry,
    },
    /// The entry was closed and priced.
    CheckOut {
        /// The final, closed entry.
        entry: TimeEntry,
    },
}

impl ClockEventKind {
    /// The entry snapshot this event carries.
    pub fn entry(&self) -> &TimeEntry {
        match self {
            Self::CheckIn { entry }
            | Self::BreakStarted { entry }
            | Self::BreakEnded { entry }
            | Self::CheckOut { entry } => entry,
        }
    }
}

/// A clock transition waiting for the repository to come back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedEvent {
    /// The guard the transition belongs to.
    pub guard_id: String,
    /// When the transition happened on the device. Together with
    /// `guard_id` this is the event's identity.
    pub recorded_at: DateTime<Utc>,
    /// The captured transition.
    pub kind: ClockEventKind,
}

impl QueuedEvent {
    /// The deduplication key.
    pub fn key(&self) -> (String, DateTime<Utc>) {
        (self.guard_id.clone(), self.recorded_at)
    }
}

/// Storage port for pending events.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Appends an event unless one with the same key is already queued.
    /// Returns whether the event was actually stored.
    async fn append(&self, event: QueuedEvent) -> EngineResult<bool>;

    /// Removes and returns all pending events, ordered by `recorded_at`.
    async fn drain(&self) -> EngineResult<Vec<QueuedEvent>>;

    /// Puts events back, preserving their identity. Used for events whose
    /// replay failed.
    async fn requeue(&self, events: Vec<QueuedEvent>) -> EngineResult<()>;

    /// Number of pending events.
    async fn len(&self) -> usize;
}

/// HashMap-backed queue store.
#[derive(Default)]
pub struct InMemoryQueueStore {
    events: RwLock<HashMap<(String, DateTime<Utc>), QueuedEvent>>,
}

impl InMemoryQueueStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueueStore for InMemoryQueueStore {
    async fn append(&self, event: QueuedEvent) -> EngineResult<bool> {
        let mut events = self.events.write().await;
        let key = event.key();
        if events.contains_key(&key) {
            return Ok(false);
        }
        events.insert(key, event);
        Ok(true)
    }

    async fn drain(&self) -> EngineResult<Vec<QueuedEvent>> {
        let mut events = self.events.write().await;
        let mut drained: Vec<QueuedEvent> = events.drain().map(|(_, e)| e).collect();
        drained.sort_by_key(|e| e.recorded_at);
        Ok(drained)
    }

    async fn requeue(&self, pending: Vec<QueuedEvent>) -> EngineResult<()> {
        let mut events = self.events.write().await;
        for event in pending {
            events.insert(event.key(), event);
        }
        Ok(())
    }

    async fn len(&self) -> usize {
        self.events.read().await.len()
    }
}

/// Outcome of a replay pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Events whose effect was written to the repository.
    pub applied: usize,
    /// Events whose effect was already present.
    pub skipped: usize,
    /// Events that failed and remain queued.
    pub failed: usize,
}

/// Captures failed writes and replays them against the repository.
pub struct OfflineQueue {
    store: Box<dyn QueueStore>,
}

impl OfflineQueue {
    /// Creates a queue over the given store.
    pub fn new(store: Box<dyn QueueStore>) -> Self {
        Self { store }
    }

    /// Queues a transition for later replay. Duplicate keys are dropped
    /// silently, which makes retried transitions safe.
    pub async fn enqueue(&self, event: QueuedEvent) -> EngineResult<()> {
        let stored = self.store.append(event).await?;
        if !stored {
            info!("dropped duplicate offline event");
        }
        Ok(())
    }

    /// Number of pending events.
    pub async fn pending(&self) -> usize {
        self.store.len().await
    }

    /// Replays all pending events in `recorded_at` order.
    ///
    /// Events that fail (typically because the repository is still
    /// unavailable) are requeued and reported in
    /// [`ReplayReport::failed`]; a later replay picks them up again.
    pub async fn replay(&self, repository: &dyn TimeEntryRepository) -> EngineResult<ReplayReport> {
        let pending = self.store.drain().await?;
        let mut report = ReplayReport::default();
        let mut retry = Vec::new();

        for event in pending {
            match self.apply(repository, &event).await {
                Ok(applied) => {
                    if applied {
                        report.applied += 1;
                    } else {
                        report.skipped += 1;
                    }
                }
                Err(err) => {
                    warn!(guard_id = %event.guard_id, error = %err, "offline replay failed");
                    report.failed += 1;
                    retry.push(event);
                }
            }
        }

        if !retry.is_empty() {
            self.store.requeue(retry).await?;
        }
        info!(
            applied = report.applied,
            skipped = report.skipped,
            failed = report.failed,
            "offline replay finished"
        );
        Ok(report)
    }

    /// Applies one event. Returns whether the repository changed.
    async fn apply(
        &self,
        repository: &dyn TimeEntryRepository,
        event: &QueuedEvent,
    ) -> EngineResult<bool> {
        let snapshot = event.kind.entry();
        match &event.kind {
            ClockEventKind::CheckIn { entry } => {
                // A check-in replayed twice, or raced by a successful online
                // write, must not open a second entry.
                if repository.get(entry.id).await.is_ok() {
                    return Ok(false);
                }
                if let Some(open) = repository.find_open_entry(&entry.guard_id).await? {
                    if open.checked_in_at == entry.checked_in_at {
                        return Ok(false);
                    }
                }
                repository.create(entry.clone()).await?;
                Ok(true)
            }
            _ => match repository.get(snapshot.id).await {
                Ok(stored) if stored == *snapshot => Ok(false),
                Ok(_) => {
                    repository.update(snapshot.clone()).await?;
                    Ok(true)
                }
                // The check-in itself never reached storage; the snapshot
                // contains the whole entry, so create it outright.
                Err(EngineError::EntryNotFound { .. }) => {
                    repository.create(snapshot.clone()).await?;
                    Ok(true)
                }
                Err(err) => Err(err),
            },
        }
    }
}
