//! Schedule entry model.
//!
//! A schedule entry is one placed unit (a lesson or a fixed special
//! activity) for a class-section at a (day, period). Entries carry
//! their lifecycle status and the audit trail of the approval workflow.
//!
//! # Lifecycle
//!
//! ```text
//! Draft ──► Submitted ──► Approved ──► Published
//!               │
//!               └──────► Rejected
//! ```
//!
//! Transitions only move forward; see [`EntryStatus::can_advance_to`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ClassSectionId, Day, PeriodKey, Room, TeacherId, TimeRange};

/// Stable entry identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// What an entry schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A taught subject with a teacher.
    Lesson,
    /// A fixed, teacher-less special activity (assembly, break, ...).
    Fixed,
}

/// Lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
    Published,
}

impl EntryStatus {
    /// Whether `next` is a legal forward transition from `self`.
    pub fn can_advance_to(self, next: EntryStatus) -> bool {
        use EntryStatus::*;
        matches!(
            (self, next),
            (Draft, Submitted)
                | (Submitted, Approved)
                | (Submitted, Rejected)
                | (Approved, Published)
        )
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, EntryStatus::Rejected | EntryStatus::Published)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryStatus::Draft => "draft",
            EntryStatus::Submitted => "submitted",
            EntryStatus::Approved => "approved",
            EntryStatus::Rejected => "rejected",
            EntryStatus::Published => "published",
        };
        f.write_str(s)
    }
}

/// Reviewer verdict, tracked alongside the lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Who performed an action, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stamp {
    pub by: String,
    pub at: DateTime<Utc>,
}

impl Stamp {
    /// Stamps an action by `by` at the current time.
    pub fn now(by: impl Into<String>) -> Self {
        Self {
            by: by.into(),
            at: Utc::now(),
        }
    }
}

/// Approval workflow audit trail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub submitted: Option<Stamp>,
    pub approved: Option<Stamp>,
    pub rejected: Option<Stamp>,
    pub rejection_reason: Option<String>,
    pub rejection_notes: Option<String>,
    pub published: Option<Stamp>,
}

/// One placed lesson or fixed activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Stable identifier.
    pub id: EntryId,
    /// Subject name, or the special period label for fixed entries.
    pub subject: String,
    /// Lesson or fixed activity.
    pub kind: ActivityKind,
    /// Teacher; `None` for fixed special activities.
    pub teacher_id: Option<TeacherId>,
    /// Class-section attending.
    pub class_section: ClassSectionId,
    /// Room used.
    pub room: Room,
    /// Day of the week.
    pub day: Day,
    /// Period within the day.
    pub period: PeriodKey,
    /// Wall-clock time, derived from the period table.
    pub time: TimeRange,
    /// Academic term tag (e.g. `"2025/2026-ganjil"`).
    pub term: String,
    /// Lifecycle status.
    pub status: EntryStatus,
    /// Reviewer verdict.
    pub approval: ApprovalStatus,
    /// Visible to teachers and students.
    pub published: bool,
    /// Workflow audit trail.
    pub audit: Audit,
}

impl ScheduleEntry {
    /// Creates a draft lesson entry with a fresh id.
    pub fn lesson(
        teacher_id: TeacherId,
        subject: impl Into<String>,
        class_section: ClassSectionId,
        day: Day,
        period: PeriodKey,
        time: TimeRange,
    ) -> Self {
        Self {
            id: EntryId::generate(),
            subject: subject.into(),
            kind: ActivityKind::Lesson,
            teacher_id: Some(teacher_id),
            class_section,
            room: Room::Homeroom,
            day,
            period,
            time,
            term: String::new(),
            status: EntryStatus::Draft,
            approval: ApprovalStatus::Pending,
            published: false,
            audit: Audit {
                created_at: Some(Utc::now()),
                ..Audit::default()
            },
        }
    }

    /// Creates a draft fixed (teacher-less) entry.
    pub fn fixed(
        label: impl Into<String>,
        class_section: ClassSectionId,
        day: Day,
        period: PeriodKey,
        time: TimeRange,
    ) -> Self {
        Self {
            kind: ActivityKind::Fixed,
            teacher_id: None,
            ..Self::lesson(TeacherId::new(""), label, class_section, day, period, time)
        }
    }

    /// Sets an explicit id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = EntryId(id.into());
        self
    }

    /// Sets the room.
    pub fn with_room(mut self, room: Room) -> Self {
        self.room = room;
        self
    }

    /// Sets the term tag.
    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = term.into();
        self
    }

    /// Whether this is a fixed special activity.
    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.kind == ActivityKind::Fixed
    }

    /// The (day, period) slot.
    #[inline]
    pub fn slot(&self) -> (Day, PeriodKey) {
        (self.day, self.period)
    }

    /// Whether this entry belongs to the (teacher, subject, class-section) triple.
    pub fn matches_triple(
        &self,
        teacher: &TeacherId,
        subject: &str,
        section: &ClassSectionId,
    ) -> bool {
        self.kind == ActivityKind::Lesson
            && self.teacher_id.as_ref() == Some(teacher)
            && self.subject == subject
            && &self.class_section == section
    }
}
