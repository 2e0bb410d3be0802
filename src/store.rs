//! External collaborators: entry store, roster provider, notification sink.
//!
//! The engine is storage-agnostic. Implement [`EntryStore`] over the
//! school's database; [`InMemoryStore`] is the reference implementation
//! used in tests and single-process tools.

use std::sync::Mutex;

use crate::error::{NotifyError, StoreError};
use crate::models::{EntryId, ScheduleEntry, Teacher};

/// Persistent schedule entry store.
///
/// Writes are applied one entry at a time; the engine never assumes
/// multi-entry transactions.
pub trait EntryStore {
    /// Inserts a new entry. Fails with [`StoreError::Duplicate`] if the id exists.
    fn create(&mut self, entry: &ScheduleEntry) -> Result<(), StoreError>;

    /// Reads one entry.
    fn read(&self, id: &EntryId) -> Result<Option<ScheduleEntry>, StoreError>;

    /// Replaces an existing entry. Fails with [`StoreError::NotFound`] if absent.
    fn update(&mut self, entry: &ScheduleEntry) -> Result<(), StoreError>;

    /// Deletes an entry. Returns whether it existed.
    fn delete(&mut self, id: &EntryId) -> Result<bool, StoreError>;

    /// All entries in insertion order.
    fn list_all(&self) -> Result<Vec<ScheduleEntry>, StoreError>;
}

/// Source of the teaching roster.
pub trait RosterProvider {
    /// Active teachers with their subjects and class-sections.
    fn list_active_teachers(&self) -> Result<Vec<Teacher>, String>;
}

/// Best-effort notification delivery.
///
/// Failures are logged by the engine and never fail a transition.
pub trait NotificationSink {
    fn notify(&self, target_id: &str, message: &str) -> Result<(), NotifyError>;
}

/// Vector-backed entry store preserving insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entries: Vec<ScheduleEntry>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with entries (ids assumed unique).
    pub fn with_entries(entries: Vec<ScheduleEntry>) -> Self {
        Self { entries }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, id: &EntryId) -> Option<usize> {
        self.entries.iter().position(|e| &e.id == id)
    }
}

impl EntryStore for InMemoryStore {
    fn create(&mut self, entry: &ScheduleEntry) -> Result<(), StoreError> {
        if self.position(&entry.id).is_some() {
            return Err(StoreError::Duplicate(entry.id.clone()));
        }
        self.entries.push(entry.clone());
        Ok(())
    }

    fn read(&self, id: &EntryId) -> Result<Option<ScheduleEntry>, StoreError> {
        Ok(self.position(id).map(|i| self.entries[i].clone()))
    }

    fn update(&mut self, entry: &ScheduleEntry) -> Result<(), StoreError> {
        match self.position(&entry.id) {
            Some(i) => {
                self.entries[i] = entry.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(entry.id.clone())),
        }
    }

    fn delete(&mut self, id: &EntryId) -> Result<bool, StoreError> {
        match self.position(id) {
            Some(i) => {
                self.entries.remove(i);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn list_all(&self) -> Result<Vec<ScheduleEntry>, StoreError> {
        Ok(self.entries.clone())
    }
}

/// Fixed roster; inactive teachers are filtered out on listing.
#[derive(Debug, Clone, Default)]
pub struct StaticRoster {
    teachers: Vec<Teacher>,
}

impl StaticRoster {
    pub fn new(teachers: Vec<Teacher>) -> Self {
        Self { teachers }
    }
}

impl RosterProvider for StaticRoster {
    fn list_active_teachers(&self) -> Result<Vec<Teacher>, String> {
        Ok(self.teachers.iter().filter(|t| t.active).cloned().collect())
    }
}

/// Sink that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl NotificationSink for NoopSink {
    fn notify(&self, _target_id: &str, _message: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Sink that records notifications in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far as `(target, message)` pairs.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, target_id: &str, message: &str) -> Result<(), NotifyError> {
        let mut sent = self.sent.lock().map_err(|_| NotifyError {
            target: target_id.to_string(),
            message: "recording sink poisoned".to_string(),
        })?;
        sent.push((target_id.to_string(), message.to_string()));
        Ok(())
    }
}
