//! Generation statistics and timetable quality metrics.
//!
//! # Run Report
//!
//! [`GenerateReport`] records what a generation run did: entries
//! created, hours placed per triple, shortfalls, relocations, and the
//! conflicts left over. Capacity problems surface here, never as errors.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Fill rate | placed hours / required hours over all triples |
//! | Class fill | lesson entries / lesson slots per class-section |
//! | Teacher load | lesson entries per teacher |
//! | Published rate | published entries / all entries |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    ActivityKind, ClassSectionId, Conflict, Day, EntryId, PeriodKey, ScheduleEntry, TeacherId,
    TimeGrid,
};
use crate::validation::ValidationError;

/// One unit of teaching load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub teacher: TeacherId,
    pub subject: String,
    pub class_section: ClassSectionId,
}

impl Triple {
    pub fn new(
        teacher: TeacherId,
        subject: impl Into<String>,
        class_section: ClassSectionId,
    ) -> Self {
        Self {
            teacher,
            subject: subject.into(),
            class_section,
        }
    }
}

/// Hours placed for a triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriplePlacement {
    pub triple: Triple,
    /// Required weekly periods.
    pub required: u32,
    /// Periods held after the run, including pre-existing entries.
    pub placed: u32,
}

/// A triple left with fewer hours than required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub triple: Triple,
    pub required: u32,
    pub placed: u32,
}

impl Shortfall {
    /// Hours still missing.
    pub fn missing(&self) -> u32 {
        self.required.saturating_sub(self.placed)
    }
}

/// An entry moved by the conflict resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relocation {
    pub entry_id: EntryId,
    pub from: (Day, PeriodKey),
    pub to: (Day, PeriodKey),
}

/// Outcome of a conflict resolution pass sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionReport {
    /// Entries moved, in order.
    pub relocations: Vec<Relocation>,
    /// Conflicts for which no participant could be moved.
    pub unresolved: Vec<Conflict>,
    /// Conflicts remaining after the last pass.
    pub remaining: usize,
    /// Passes run.
    pub passes: u32,
}

/// Statistics of one generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateReport {
    /// Entries created (lessons and fixed).
    pub created_count: usize,
    /// Existing entries deleted by `clear_existing`.
    pub deleted_count: usize,
    /// Hours per triple, in roster order.
    pub placed_hours: Vec<TriplePlacement>,
    /// Triples short of their required hours.
    pub shortfalls: Vec<Shortfall>,
    /// Entries moved by the resolver.
    pub relocations: Vec<Relocation>,
    /// Conflicts left after resolution.
    pub remaining_conflicts: usize,
    /// Conflicts the resolver gave up on.
    pub unresolved: Vec<Conflict>,
    /// Roster items skipped for invalid data.
    pub skipped: Vec<ValidationError>,
}

impl GenerateReport {
    /// Placed / required hours over all triples (1.0 when nothing is required).
    pub fn fill_rate(&self) -> f64 {
        let required: u32 = self.placed_hours.iter().map(|p| p.required).sum();
        if required == 0 {
            return 1.0;
        }
        let placed: u32 = self
            .placed_hours
            .iter()
            .map(|p| p.placed.min(p.required))
            .sum();
        f64::from(placed) / f64::from(required)
    }

    /// Whether every triple is fully placed and no conflict remains.
    pub fn is_complete(&self) -> bool {
        self.shortfalls.is_empty() && self.remaining_conflicts == 0
    }

    /// Placement record of a triple.
    pub fn placement(&self, triple: &Triple) -> Option<&TriplePlacement> {
        self.placed_hours.iter().find(|p| &p.triple == triple)
    }
}

/// Timetable quality indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableKpi {
    /// Lesson entries.
    pub lesson_count: usize,
    /// Fixed special-activity entries.
    pub fixed_count: usize,
    /// Mean share of lesson slots filled per class-section (0.0..1.0).
    pub avg_class_fill: f64,
    /// Lesson slots filled per class-section (0.0..1.0).
    pub fill_by_class: BTreeMap<ClassSectionId, f64>,
    /// Lesson entries per teacher.
    pub load_by_teacher: BTreeMap<TeacherId, usize>,
    /// Published entries / all entries (0.0..1.0).
    pub published_rate: f64,
}

impl TimetableKpi {
    /// Computes indicators from stored entries.
    pub fn calculate(entries: &[ScheduleEntry], grid: &TimeGrid) -> Self {
        let capacity = grid.lesson_slots().len();
        let mut lessons_by_class: BTreeMap<ClassSectionId, usize> = BTreeMap::new();
        let mut load_by_teacher: BTreeMap<TeacherId, usize> = BTreeMap::new();
        let mut lesson_count = 0;
        let mut fixed_count = 0;
        let mut published = 0;

        for e in entries {
            if e.published {
                published += 1;
            }
            match e.kind {
                ActivityKind::Fixed => {
                    fixed_count += 1;
                    lessons_by_class.entry(e.class_section.clone()).or_insert(0);
                }
                ActivityKind::Lesson => {
                    lesson_count += 1;
                    *lessons_by_class.entry(e.class_section.clone()).or_insert(0) += 1;
                    if let Some(t) = &e.teacher_id {
                        *load_by_teacher.entry(t.clone()).or_insert(0) += 1;
                    }
                }
            }
        }

        let fill_by_class: BTreeMap<ClassSectionId, f64> = lessons_by_class
            .into_iter()
            .map(|(c, n)| {
                let fill = if capacity == 0 {
                    0.0
                } else {
                    n as f64 / capacity as f64
                };
                (c, fill)
            })
            .collect();
        let avg_class_fill = if fill_by_class.is_empty() {
            0.0
        } else {
            fill_by_class.values().sum::<f64>() / fill_by_class.len() as f64
        };
        let published_rate = if entries.is_empty() {
            0.0
        } else {
            published as f64 / entries.len() as f64
        };

        Self {
            lesson_count,
            fixed_count,
            avg_class_fill,
            fill_by_class,
            load_by_teacher,
            published_rate,
        }
    }
}
