//! Double-booking constraints.
//!
//! A timetable must not double-book any resource along three axes:
//!
//! | Axis | Resource | Exemptions |
//! |------|----------|------------|
//! | Teacher | teacher id | fixed (teacher-less) entries |
//! | ClassSection | class-section id | none: a class's timeline is exclusive |
//! | Room | shared room id | the class's own homeroom |
//!
//! A [`Conflict`] records two or more entries claiming the same
//! (axis, resource, day, period).
//!
//! # Reference
//! Schaerf (1999), "A Survey of Automated Timetabling", §2 (class–teacher model)

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Day, EntryId, PeriodKey};

/// A resource axis along which double-booking must not occur.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Teacher,
    ClassSection,
    Room,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Teacher, Axis::ClassSection, Axis::Room];

    pub fn name(self) -> &'static str {
        match self {
            Axis::Teacher => "teacher",
            Axis::ClassSection => "class_section",
            Axis::Room => "room",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Two or more entries claiming the same resource slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Axis of the clash.
    pub axis: Axis,
    /// Clashing resource (teacher, class-section, or room id).
    pub resource_id: String,
    /// Day of the clash.
    pub day: Day,
    /// Period of the clash.
    pub period: PeriodKey,
    /// Entries claiming the slot, in reservation order.
    pub participants: Vec<EntryId>,
}

impl Conflict {
    /// Whether an entry takes part in this conflict.
    pub fn involves(&self, id: &EntryId) -> bool {
        self.participants.contains(id)
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' double-booked on {} period {} by {} entries",
            self.axis,
            self.resource_id,
            self.day,
            self.period,
            self.participants.len()
        )
    }
}

/// Aggregate view over detected conflicts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictSummary {
    /// Number of conflicts.
    pub total: usize,
    /// Conflict count per axis. Axes without conflicts are absent.
    pub by_axis: BTreeMap<Axis, usize>,
    /// Every conflict, ordered by (axis, resource, day, period).
    pub detail: Vec<Conflict>,
}

impl ConflictSummary {
    /// Builds a summary from conflicts already in canonical order.
    pub fn from_conflicts(detail: Vec<Conflict>) -> Self {
        let mut by_axis = BTreeMap::new();
        for c in &detail {
            *by_axis.entry(c.axis).or_insert(0) += 1;
        }
        Self {
            total: detail.len(),
            by_axis,
            detail,
        }
    }

    /// Conflict count on one axis.
    pub fn count(&self, axis: Axis) -> usize {
        self.by_axis.get(&axis).copied().unwrap_or(0)
    }

    /// Whether the timetable is clash-free.
    pub fn is_clear(&self) -> bool {
        self.total == 0
    }
}
