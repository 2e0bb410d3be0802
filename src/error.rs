//! Error types for jadwal.
//!
//! Capacity problems (unplaceable hours, unresolvable conflicts) are not
//! errors: they are reported in [`GenerateReport`](crate::scheduler::GenerateReport).
//! The types here cover persistence, configuration and workflow denials.

use thiserror::Error;

use crate::models::{ClassSectionId, EntryId, EntryStatus, Track};
use crate::validation::ValidationError;

/// Persistent entry store failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No entry with this id.
    #[error("entry not found: {0}")]
    NotFound(EntryId),

    /// An entry with this id already exists.
    #[error("entry already exists: {0}")]
    Duplicate(EntryId),

    /// Backend-specific failure (I/O, database, network).
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Notification sink failure. Never fails a state transition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("notification to '{target}' failed: {message}")]
pub struct NotifyError {
    pub target: String,
    pub message: String,
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// TOML could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed values are out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Hard failures of engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Entry store failure; in-memory reservations were rolled back first.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Roster provider failure.
    #[error("roster unavailable: {0}")]
    Roster(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A manually added entry failed validation.
    #[error("invalid entry ({} problems)", .0.len())]
    InvalidEntry(Vec<ValidationError>),
}

/// Per-entry approval workflow failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// No entry with this id.
    #[error("entry not found: {0}")]
    NotFound(EntryId),

    /// The entry's current status does not allow the transition.
    #[error("cannot move entry from {from} to {to}")]
    InvalidTransition { from: EntryStatus, to: EntryStatus },

    /// Reviewer acted outside their track. Entry left unchanged.
    #[error("reviewer of track {reviewer} may not act on {section} (track {entry})")]
    TrackMismatch {
        reviewer: Track,
        entry: Track,
        section: ClassSectionId,
    },

    /// The class-section name does not yield a track.
    #[error("cannot resolve track of class-section '{0}'")]
    UnresolvableTrack(ClassSectionId),

    /// Rejection without a reason.
    #[error("rejection requires a reason")]
    MissingReason,

    /// Store failure for this entry.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl TransitionError {
    /// Whether this is an authorization denial.
    pub fn is_denial(&self) -> bool {
        matches!(self, TransitionError::TrackMismatch { .. })
    }
}
