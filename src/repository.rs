//! Time-entry persistence port and the in-memory adapter used by tests
//! and the offline replay path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{GpsSample, TimeEntry, TimeEntryStatus};

/// Storage port for time entries.
///
/// The clock mutates entries as immutable values: callers build the next
/// version of an entry and hand it to [`update`](Self::update) whole, so an
/// adapter never needs field-level patching.
#[async_trait]
pub trait TimeEntryRepository: Send + Sync {
    /// Persists a new entry. Fails with [`EngineError::InvalidEntry`] if the
    /// id already exists.
    async fn create(&self, entry: TimeEntry) -> EngineResult<()>;

    /// Replaces an existing entry by id.
    async fn update(&self, entry: TimeEntry) -> EngineResult<()>;

    /// Fetches an entry by id.
    async fn get(&self, entry_id: Uuid) -> EngineResult<TimeEntry>;

    /// Returns the guard's open entry, if any. At most one entry per guard
    /// is ever open.
    async fn find_open_entry(&self, guard_id: &str) -> EngineResult<Option<TimeEntry>>;

    /// Returns the guard's entries whose check-in falls in `[from, to)`,
    /// ordered by check-in time.
    async fn entries_for_guard_between(
        &self,
        guard_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> EngineResult<Vec<TimeEntry>>;

    /// Appends a periodic location sample to an open entry.
    ///
    /// Returns `Ok(false)` once the entry has closed, which tells the
    /// sampler to stop without treating it as an error.
    async fn append_sample(&self, entry_id: Uuid, sample: GpsSample) -> EngineResult<bool>;
}

/// HashMap-backed repository behind a [`tokio::sync::RwLock`].
///
/// Supports failure injection via [`set_unavailable`](Self::set_unavailable)
/// so the offline queue path can be exercised.
#[derive(Default)]
pub struct InMemoryTimeEntryRepository {
    entries: RwLock<HashMap<Uuid, TimeEntry>>,
    unavailable: AtomicBool,
}

impl InMemoryTimeEntryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles failure injection. While unavailable, every operation fails
    /// with [`EngineError::RepositoryUnavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when no entries are stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn check_available(&self) -> EngineResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(EngineError::RepositoryUnavailable {
                message: "storage offline".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TimeEntryRepository for InMemoryTimeEntryRepository {
    async fn create(&self, entry: TimeEntry) -> EngineResult<()> {
        self.check_available()?;
        let mut entries = self.entries.write().await;
        if entries.contains_key(&entry.id) {
            return Err(EngineError::InvalidEntry {
                entry_id: entry.id,
                message: "entry id already exists".to_string(),
            });
        }
        entries.insert(entry.id, entry);
        Ok(())
    }

    async fn update(&self, entry: TimeEntry) -> EngineResult<()> {
        self.check_available()?;
        let mut entries = self.entries.write().await;
        if !entries.contains_key(&entry.id) {
            return Err(EngineError::EntryNotFound { entry_id: entry.id });
        }
        entries.insert(entry.id, entry);
        Ok(())
    }

    async fn get(&self, entry_id: Uuid) -> EngineResult<TimeEntry> {
        self.check_available()?;
        self.entries
            .read()
            .await
            .get(&entry_id)
            .cloned()
            .ok_or(EngineError::EntryNotFound { entry_id })
    }

    async fn find_open_entry(&self, guard_id: &str) -> EngineResult<Option<TimeEntry>> {
        self.check_available()?;
        let entries = self.entries.read().await;
        Ok(entries
            .values()
            .find(|e| e.guard_id == guard_id && !e.is_closed())
            .cloned())
    }

    async fn entries_for_guard_between(
        &self,
        guard_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> EngineResult<Vec<TimeEntry>> {
        self.check_available()?;
        let entries = self.entries.read().await;
        let mut matching: Vec<TimeEntry> = entries
            .values()
            .filter(|e| e.guard_id == guard_id && e.checked_in_at >= from && e.checked_in_at < to)
            .cloned()
            .collect();
        matching.sort_by_key(|e| e.checked_in_at);
        Ok(matching)
    }

    async fn append_sample(&self, entry_id: Uuid, sample: GpsSample) -> EngineResult<bool> {
        self.check_available()?;
        let mut entries = self.entries.write().await;
        let entry = entries
            .get_mut(&entry_id)
            .ok_or(EngineError::EntryNotFound { entry_id })?;
        if entry.status == TimeEntryStatus::CheckedOut {
            return Ok(false);
        }
        entry.location_samples.push(sample);
        Ok(true)
    }
}
