//! Lifecycle events emitted by successful transitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{ClassSectionId, EntryId, TeacherId, Track};

/// A state change worth telling someone about.
///
/// Events are collected during a batch and delivered after every entry
/// has been written, so a failed delivery never affects stored state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// Entries of one class-section were submitted for review.
    Submitted {
        class_section: ClassSectionId,
        track: Track,
        entries: Vec<EntryId>,
        by: String,
    },
    Approved {
        entry_id: EntryId,
        class_section: ClassSectionId,
        teacher: Option<TeacherId>,
        by: String,
    },
    Rejected {
        entry_id: EntryId,
        class_section: ClassSectionId,
        teacher: Option<TeacherId>,
        by: String,
        reason: String,
    },
    Published {
        entry_id: EntryId,
        class_section: ClassSectionId,
        teacher: Option<TeacherId>,
        by: String,
    },
}

impl LifecycleEvent {
    /// Recipient id passed to the notification sink.
    ///
    /// Submissions go to the track's reviewers; everything else goes to
    /// the entry's teacher, or the class-section for fixed entries.
    pub fn target(&self) -> String {
        match self {
            LifecycleEvent::Submitted { track, .. } => format!("reviewers:{track}"),
            LifecycleEvent::Approved { teacher, class_section, .. }
            | LifecycleEvent::Rejected { teacher, class_section, .. }
            | LifecycleEvent::Published { teacher, class_section, .. } => match teacher {
                Some(t) => t.to_string(),
                None => format!("section:{class_section}"),
            },
        }
    }

    /// Human-readable notification text.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleEvent::Submitted { class_section, entries, by, .. } => write!(
                f,
                "{by} submitted {} entries of {class_section} for approval",
                entries.len()
            ),
            LifecycleEvent::Approved { entry_id, class_section, by, .. } => {
                write!(f, "entry {entry_id} of {class_section} approved by {by}")
            }
            LifecycleEvent::Rejected { entry_id, class_section, by, reason, .. } => {
                write!(f, "entry {entry_id} of {class_section} rejected by {by}: {reason}")
            }
            LifecycleEvent::Published { entry_id, class_section, by, .. } => {
                write!(f, "entry {entry_id} of {class_section} published by {by}")
            }
        }
    }
}
