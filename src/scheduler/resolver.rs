//! Priority-based conflict resolution.
//!
//! # Algorithm
//!
//! For each conflict still present:
//!
//! 1. Score every participant: subject priority (catalog weight plus
//!    category bonus), +3 in the midday block, −2 on the first or last
//!    lesson of the day.
//! 2. Evict the lowest-scoring movable participant. Fixed entries and
//!    entries past `Draft` never move. Ties evict the later reservation.
//! 3. Release the evictee, rank its jointly-free lesson slots (+3 midday,
//!    −2 edge, −1 abbreviated day, earliest wins ties) and move it to the
//!    best one.
//! 4. If no slot is free, restore the original holding and report the
//!    conflict unresolved.
//!
//! Passes repeat until the conflict count stops decreasing or the pass
//! limit is reached.

use chrono::Utc;
use tracing::{debug, info, warn};

use super::occupancy::ConstraintManager;
use super::report::{Relocation, ResolutionReport};
use crate::error::EngineError;
use crate::models::{
    ActivityKind, Conflict, Day, DayType, EntryStatus, PeriodKey, ScheduleEntry, SubjectCatalog,
    TimeGrid, TimeRange,
};
use crate::store::EntryStore;

const MIDDAY_BONUS: i32 = 3;
const EDGE_PENALTY: i32 = 2;
const ABBREVIATED_PENALTY: i32 = 1;

/// Moves lower-priority entries out of conflicting slots.
#[derive(Debug, Clone, Copy)]
pub struct ConflictResolver<'a> {
    catalog: &'a SubjectCatalog,
}

impl<'a> ConflictResolver<'a> {
    pub fn new(catalog: &'a SubjectCatalog) -> Self {
        Self { catalog }
    }

    /// Priority of an entry where it currently sits.
    pub fn priority(&self, entry: &ScheduleEntry, grid: &TimeGrid) -> i32 {
        let mut score = self.catalog.policy(&entry.subject).priority();
        if grid.is_midday(entry.day, entry.period) {
            score += MIDDAY_BONUS;
        }
        if grid.is_edge(entry.day, entry.period) {
            score -= EDGE_PENALTY;
        }
        score
    }

    /// Desirability of a candidate slot.
    pub fn slot_score(grid: &TimeGrid, day: Day, period: PeriodKey) -> i32 {
        let mut score = 0;
        if grid.is_midday(day, period) {
            score += MIDDAY_BONUS;
        }
        if grid.is_edge(day, period) {
            score -= EDGE_PENALTY;
        }
        if day.day_type() == DayType::Abbreviated {
            score -= ABBREVIATED_PENALTY;
        }
        score
    }

    /// Runs resolution passes over the manager's current conflicts.
    pub fn resolve<S: EntryStore + ?Sized>(
        &self,
        cm: &mut ConstraintManager,
        store: &mut S,
        max_passes: u32,
    ) -> Result<ResolutionReport, EngineError> {
        let mut report = ResolutionReport::default();
        let mut remaining = cm.conflict_count();

        while remaining > 0 && report.passes < max_passes {
            report.passes += 1;
            for conflict in cm.conflicts() {
                if !cm.is_conflicted(
                    conflict.axis,
                    &conflict.resource_id,
                    conflict.day,
                    conflict.period,
                ) {
                    continue;
                }
                if let Some(relocation) = self.resolve_conflict(cm, store, &conflict)? {
                    report.relocations.push(relocation);
                }
            }
            cm.rebuild_conflicts();
            let now = cm.conflict_count();
            debug!(pass = report.passes, before = remaining, after = now, "resolution pass");
            let improved = now < remaining;
            remaining = now;
            if !improved {
                break;
            }
        }

        report.unresolved = cm.conflicts();
        report.remaining = remaining;
        info!(
            passes = report.passes,
            relocations = report.relocations.len(),
            remaining,
            "conflict resolution finished"
        );
        Ok(report)
    }

    /// Tries to clear one conflict by relocating one participant.
    ///
    /// Returns `Ok(None)` when no participant can move. A failed store
    /// write restores the evictee's original slot before returning the error.
    pub fn resolve_conflict<S: EntryStore + ?Sized>(
        &self,
        cm: &mut ConstraintManager,
        store: &mut S,
        conflict: &Conflict,
    ) -> Result<Option<Relocation>, EngineError> {
        let mut victim: Option<(i32, ScheduleEntry)> = None;
        for id in &conflict.participants {
            let Some(entry) = store.read(id)? else {
                continue;
            };
            if entry.kind != ActivityKind::Lesson || entry.status != EntryStatus::Draft {
                continue;
            }
            let score = self.priority(&entry, cm.grid());
            // `<=` so the later reservation loses ties
            if victim.as_ref().map_or(true, |(best, _)| score <= *best) {
                victim = Some((score, entry));
            }
        }
        let Some((_, entry)) = victim else {
            warn!(%conflict, "no movable participant");
            return Ok(None);
        };

        let Some(original) = cm.release(&entry.id) else {
            return Ok(None);
        };

        let grid = cm.grid();
        let target = cm
            .available_slots(entry.teacher_id.as_ref(), &entry.class_section, &entry.room)
            .into_iter()
            .filter_map(|(day, period)| {
                let time = grid.period(day, period)?.range;
                Some((Self::slot_score(grid, day, period), day, period, time))
            })
            .fold(None, |best: Option<(i32, Day, PeriodKey, TimeRange)>, cand| match best {
                Some(b) if b.0 >= cand.0 => Some(b),
                _ => Some(cand),
            });

        let Some((_, day, period, time)) = target else {
            cm.restore(&entry.id, original);
            warn!(entry = %entry.id, %conflict, "no free slot to relocate into");
            return Ok(None);
        };

        cm.reserve(
            &entry.id,
            entry.teacher_id.as_ref(),
            &entry.class_section,
            &entry.room,
            day,
            period,
        );
        let mut moved = entry.clone();
        moved.day = day;
        moved.period = period;
        moved.time = time;
        moved.audit.updated_at = Some(Utc::now());
        if let Err(err) = store.update(&moved) {
            cm.release(&entry.id);
            cm.restore(&entry.id, original);
            return Err(err.into());
        }

        debug!(entry = %entry.id, from = %entry.day, to = %day, "relocated entry");
        Ok(Some(Relocation {
            entry_id: entry.id,
            from: (entry.day, entry.period),
            to: (day, period),
        }))
    }
}
