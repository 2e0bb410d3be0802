//! Greedy timetable generator.
//!
//! # Algorithm
//!
//! For each (teacher, subject, class-section) triple, in roster order:
//!
//! 1. Look up required weekly hours in the [`SubjectCatalog`]. Lessons
//!    already stored for the triple count as placed.
//! 2. Consecutive blocks: for each day Mon→Fri, take the longest run of
//!    adjacent lesson periods (2..=`max_block_len`, never more than the
//!    hours remaining, never across a special period) that is free on
//!    every axis. Earliest start wins ties. The run is reserved and
//!    written as a unit.
//! 3. Single periods: scan day by day, period by period, skipping slots
//!    already attempted for this triple, and take the first free one.
//! 4. A scan without progress triggers a bounded retry governed by
//!    [`RetryPolicy`].
//!
//! Then special periods are materialized as fixed entries for every
//! class-section, conflicts are rescanned, and the
//! [`ConflictResolver`] runs if requested.
//!
//! # Complexity
//! O(t · s) where t = triples and s = lesson slots per week.
//!
//! # Reference
//! de Werra (1985), "An introduction to timetabling", EJOR 19(2)

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::occupancy::ConstraintManager;
use super::report::{GenerateReport, Shortfall, Triple, TriplePlacement};
use super::resolver::ConflictResolver;
use crate::error::EngineError;
use crate::models::{
    ActivityKind, ClassSectionId, Day, PeriodKey, Room, ScheduleEntry, SubjectCatalog, Teacher,
    TimeGrid,
};
use crate::store::EntryStore;
use crate::validation::{validate_roster, ValidationError, ValidationErrorKind};

/// How the visited-slot set is reset between retries of a triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryPolicy {
    /// Forget the most recent `n` attempted slots.
    ForgetRecent(usize),
    /// Forget every attempted slot.
    ForgetAll,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::ForgetRecent(2)
    }
}

impl RetryPolicy {
    /// Makes attempted slots eligible again.
    fn apply(self, visited: &mut HashSet<(Day, PeriodKey)>, attempts: &mut Vec<(Day, PeriodKey)>) {
        let keep = match self {
            RetryPolicy::ForgetRecent(n) => attempts.len().saturating_sub(n),
            RetryPolicy::ForgetAll => 0,
        };
        for slot in attempts.drain(keep..) {
            visited.remove(&slot);
        }
    }
}

/// Options for a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Delete every stored entry before generating.
    pub clear_existing: bool,
    /// Run the conflict resolver after placement.
    pub resolve_existing_conflicts: bool,
    /// Retries per triple after a scan without progress.
    pub max_retries: u32,
    /// Place contiguous blocks before single periods.
    pub prefer_consecutive: bool,
    /// Longest block placed at once.
    pub max_block_len: usize,
    /// Visited-set reset between retries.
    pub retry_policy: RetryPolicy,
    /// Upper bound on resolver passes.
    pub max_resolution_passes: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            clear_existing: false,
            resolve_existing_conflicts: true,
            max_retries: 3,
            prefer_consecutive: true,
            max_block_len: 3,
            retry_policy: RetryPolicy::default(),
            max_resolution_passes: 10,
        }
    }
}

impl GenerateOptions {
    pub fn with_clear_existing(mut self, clear: bool) -> Self {
        self.clear_existing = clear;
        self
    }

    pub fn with_resolution(mut self, resolve: bool) -> Self {
        self.resolve_existing_conflicts = resolve;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_consecutive(mut self, prefer: bool) -> Self {
        self.prefer_consecutive = prefer;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }
}

/// Greedy, deterministic timetable generator.
///
/// Works against a caller-provided [`ConstraintManager`] that is already
/// seeded with the stored entries. Every created entry is reserved and
/// then written; a failed write releases the reservation before the
/// error propagates.
///
/// # Example
///
/// ```
/// use jadwal::models::{SubjectCatalog, Teacher, TimeGrid};
/// use jadwal::scheduler::{ConstraintManager, GenerateOptions, Generator};
/// use jadwal::store::InMemoryStore;
///
/// let roster = vec![
///     Teacher::new("T1").with_subject("Matematika").with_class_section("X TKJ 1"),
/// ];
/// let catalog = SubjectCatalog::new();
/// let options = GenerateOptions::default();
/// let mut cm = ConstraintManager::new(TimeGrid::standard());
/// let mut store = InMemoryStore::new();
///
/// let report = Generator::new(&catalog, &options)
///     .run(&mut cm, &mut store, &roster)
///     .unwrap();
/// assert!(report.shortfalls.is_empty());
/// assert_eq!(report.placed_hours[0].placed, 4);
/// ```
#[derive(Debug, Clone)]
pub struct Generator<'a> {
    catalog: &'a SubjectCatalog,
    options: &'a GenerateOptions,
    term: String,
}

impl<'a> Generator<'a> {
    /// Creates a generator.
    pub fn new(catalog: &'a SubjectCatalog, options: &'a GenerateOptions) -> Self {
        Self {
            catalog,
            options,
            term: String::new(),
        }
    }

    /// Sets the term tag written on created entries.
    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = term.into();
        self
    }

    /// Places every triple of the roster, materializes special periods,
    /// and resolves conflicts if configured.
    pub fn run<S: EntryStore + ?Sized>(
        &self,
        cm: &mut ConstraintManager,
        store: &mut S,
        teachers: &[Teacher],
    ) -> Result<GenerateReport, EngineError> {
        let grid = cm.grid().clone();
        let mut report = GenerateReport::default();
        let existing = store.list_all()?;

        let mut already: HashMap<Triple, u32> = HashMap::new();
        let mut fixed_slots: HashSet<(ClassSectionId, Day, PeriodKey)> = HashSet::new();
        for e in &existing {
            match (e.kind, &e.teacher_id) {
                (ActivityKind::Lesson, Some(t)) => {
                    *already
                        .entry(Triple::new(t.clone(), e.subject.clone(), e.class_section.clone()))
                        .or_insert(0) += 1;
                }
                (ActivityKind::Fixed, _) => {
                    fixed_slots.insert((e.class_section.clone(), e.day, e.period));
                }
                _ => {}
            }
        }

        let roster = self.screen_roster(teachers, &mut report.skipped);
        info!(
            teachers = roster.len(),
            skipped = report.skipped.len(),
            existing = existing.len(),
            "generating timetable"
        );

        let mut sections: BTreeSet<ClassSectionId> = BTreeSet::new();
        let mut seen: HashSet<Triple> = HashSet::new();
        for teacher in &roster {
            for subject in &teacher.subjects {
                for section in &teacher.class_sections {
                    sections.insert(section.clone());
                    let triple =
                        Triple::new(teacher.id.clone(), subject.clone(), section.clone());
                    if !seen.insert(triple.clone()) {
                        debug!(
                            teacher = %triple.teacher,
                            subject = %triple.subject,
                            class_section = %triple.class_section,
                            "repeated triple ignored"
                        );
                        continue;
                    }
                    let placed_before = already.get(&triple).copied().unwrap_or(0);
                    let (required, placed, created) =
                        self.place_triple(cm, store, &grid, &triple, placed_before)?;
                    report.created_count += created;
                    if placed < required {
                        warn!(
                            teacher = %triple.teacher,
                            subject = %triple.subject,
                            class_section = %triple.class_section,
                            required,
                            placed,
                            "shortfall"
                        );
                        report.shortfalls.push(Shortfall {
                            triple: triple.clone(),
                            required,
                            placed,
                        });
                    }
                    report.placed_hours.push(TriplePlacement {
                        triple,
                        required,
                        placed,
                    });
                }
            }
        }

        report.created_count +=
            self.materialize_specials(cm, store, &grid, &sections, &fixed_slots)?;

        cm.rebuild_conflicts();
        if self.options.resolve_existing_conflicts {
            let resolution = ConflictResolver::new(self.catalog).resolve(
                cm,
                store,
                self.options.max_resolution_passes,
            )?;
            report.relocations = resolution.relocations;
            report.unresolved = resolution.unresolved;
            report.remaining_conflicts = resolution.remaining;
        } else {
            report.unresolved = cm.conflicts();
            report.remaining_conflicts = report.unresolved.len();
        }

        info!(
            created = report.created_count,
            shortfalls = report.shortfalls.len(),
            relocations = report.relocations.len(),
            remaining_conflicts = report.remaining_conflicts,
            "generation finished"
        );
        Ok(report)
    }

    /// Drops duplicate and incomplete teachers, recording why.
    fn screen_roster<'t>(
        &self,
        teachers: &'t [Teacher],
        skipped: &mut Vec<ValidationError>,
    ) -> Vec<&'t Teacher> {
        let mut seen = HashSet::new();
        let mut kept = Vec::new();
        for t in teachers {
            if !seen.insert(t.id.as_str()) {
                skipped.push(ValidationError {
                    kind: ValidationErrorKind::DuplicateId,
                    item_id: t.id.to_string(),
                    message: format!("Duplicate teacher ID: {}", t.id),
                });
                continue;
            }
            match validate_roster(std::slice::from_ref(t)) {
                Ok(()) => kept.push(t),
                Err(errors) => {
                    warn!(teacher = %t.id, errors = errors.len(), "skipping roster entry");
                    skipped.extend(errors);
                }
            }
        }
        kept
    }

    /// Places one triple. Returns (required, placed, created).
    fn place_triple<S: EntryStore + ?Sized>(
        &self,
        cm: &mut ConstraintManager,
        store: &mut S,
        grid: &TimeGrid,
        triple: &Triple,
        placed_before: u32,
    ) -> Result<(u32, u32, usize), EngineError> {
        let policy = self.catalog.policy(&triple.subject);
        let required = policy.hours;
        let room = policy.placement_room();
        let mut placed = placed_before;
        let mut created = 0;

        if self.options.prefer_consecutive && self.options.max_block_len >= 2 {
            for &day in grid.days() {
                let remaining = required.saturating_sub(placed) as usize;
                if remaining < 2 {
                    break;
                }
                let target = remaining.min(self.options.max_block_len);
                if let Some(run) = longest_free_run(cm, grid, triple, &room, day, target) {
                    self.commit(cm, store, grid, triple, &room, day, &run)?;
                    debug!(
                        teacher = %triple.teacher,
                        class_section = %triple.class_section,
                        %day,
                        len = run.len(),
                        "placed block"
                    );
                    placed += run.len() as u32;
                    created += run.len();
                }
            }
        }

        let mut visited: HashSet<(Day, PeriodKey)> = HashSet::new();
        let mut attempts: Vec<(Day, PeriodKey)> = Vec::new();
        let mut retries = 0;
        while placed < required {
            let mut progressed = false;
            'scan: for &day in grid.days() {
                for period in grid.lesson_periods(day) {
                    let slot = (day, period.key);
                    if !visited.insert(slot) {
                        continue;
                    }
                    attempts.push(slot);
                    if cm.is_available(
                        Some(&triple.teacher),
                        &triple.class_section,
                        &room,
                        day,
                        period.key,
                    ) {
                        self.commit(cm, store, grid, triple, &room, day, &[period.key])?;
                        placed += 1;
                        created += 1;
                        progressed = true;
                        if placed >= required {
                            break 'scan;
                        }
                    }
                }
            }
            if !progressed {
                if retries >= self.options.max_retries {
                    break;
                }
                retries += 1;
                self.options.retry_policy.apply(&mut visited, &mut attempts);
            }
        }

        Ok((required, placed, created))
    }

    /// Reserves and writes one lesson per period of a run, as a unit.
    ///
    /// On a failed write, unwritten entries are released and written ones
    /// are deleted again before the error is returned.
    #[allow(clippy::too_many_arguments)]
    fn commit<S: EntryStore + ?Sized>(
        &self,
        cm: &mut ConstraintManager,
        store: &mut S,
        grid: &TimeGrid,
        triple: &Triple,
        room: &Room,
        day: Day,
        run: &[PeriodKey],
    ) -> Result<(), EngineError> {
        let entries: Vec<ScheduleEntry> = run
            .iter()
            .filter_map(|&key| {
                let time = grid.period(day, key)?.range;
                Some(
                    ScheduleEntry::lesson(
                        triple.teacher.clone(),
                        triple.subject.clone(),
                        triple.class_section.clone(),
                        day,
                        key,
                        time,
                    )
                    .with_room(room.clone())
                    .with_term(self.term.clone()),
                )
            })
            .collect();

        for e in &entries {
            cm.reserve_entry(e);
        }
        for (i, e) in entries.iter().enumerate() {
            if let Err(err) = store.create(e) {
                for pending in &entries[i..] {
                    cm.release(&pending.id);
                }
                for written in &entries[..i] {
                    if store.delete(&written.id).is_ok() {
                        cm.release(&written.id);
                    }
                }
                return Err(err.into());
            }
        }
        Ok(())
    }

    /// Creates a fixed entry per special period per class-section.
    fn materialize_specials<S: EntryStore + ?Sized>(
        &self,
        cm: &mut ConstraintManager,
        store: &mut S,
        grid: &TimeGrid,
        sections: &BTreeSet<ClassSectionId>,
        existing: &HashSet<(ClassSectionId, Day, PeriodKey)>,
    ) -> Result<usize, EngineError> {
        let mut created = 0;
        for section in sections {
            for &day in grid.days() {
                for period in grid.special_periods(day) {
                    if existing.contains(&(section.clone(), day, period.key)) {
                        continue;
                    }
                    let entry = ScheduleEntry::fixed(
                        period.label.clone(),
                        section.clone(),
                        day,
                        period.key,
                        period.range,
                    )
                    .with_term(self.term.clone());
                    cm.reserve_entry(&entry);
                    if let Err(err) = store.create(&entry) {
                        cm.release(&entry.id);
                        return Err(err.into());
                    }
                    created += 1;
                }
            }
        }
        debug!(sections = sections.len(), created, "materialized special periods");
        Ok(created)
    }
}

/// Longest jointly-free run of adjacent lessons on a day, capped at `target`.
///
/// Returns `None` unless the run has at least two periods.
fn longest_free_run(
    cm: &ConstraintManager,
    grid: &TimeGrid,
    triple: &Triple,
    room: &Room,
    day: Day,
    target: usize,
) -> Option<Vec<PeriodKey>> {
    let mut best: Vec<PeriodKey> = Vec::new();
    for block in grid.lesson_blocks(day) {
        let mut current: Vec<PeriodKey> = Vec::new();
        for key in block {
            if cm.is_available(Some(&triple.teacher), &triple.class_section, room, day, key) {
                current.push(key);
                if current.len() > best.len() {
                    best = current.clone();
                }
                if best.len() >= target {
                    return Some(best);
                }
            } else {
                current.clear();
            }
        }
    }
    (best.len() >= 2).then_some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Axis, SubjectCategory, SubjectPolicy, TeacherId};
    use crate::store::InMemoryStore;

    fn roster_one(subject: &str, sections: &[&str]) -> Vec<Teacher> {
        let mut t = Teacher::new("T1").with_subject(subject);
        for s in sections {
            t = t.with_class_section(*s);
        }
        vec![t]
    }

    fn run(
        teachers: &[Teacher],
        catalog: &SubjectCatalog,
        options: &GenerateOptions,
    ) -> (GenerateReport, ConstraintManager, InMemoryStore) {
        let mut cm = ConstraintManager::new(TimeGrid::standard());
        let mut store = InMemoryStore::new();
        let report = Generator::new(catalog, options)
            .run(&mut cm, &mut store, teachers)
            .unwrap();
        (report, cm, store)
    }

    fn lessons(store: &InMemoryStore) -> Vec<ScheduleEntry> {
        store
            .list_all()
            .unwrap()
            .into_iter()
            .filter(|e| e.kind == ActivityKind::Lesson)
            .collect()
    }

    #[test]
    fn test_core_subject_gets_four_hours_in_blocks() {
        let (report, _, store) = run(
            &roster_one("Matematika", &["X TKJ 1"]),
            &SubjectCatalog::new(),
            &GenerateOptions::default(),
        );
        assert_eq!(report.placed_hours[0].required, 4);
        assert_eq!(report.placed_hours[0].placed, 4);

        let placed = lessons(&store);
        assert_eq!(placed.len(), 4);
        // First block: Senin 1-3, then remaining 1 hour → no block on Selasa,
        // single placed at earliest free slot.
        let slots: Vec<(Day, PeriodKey)> = placed.iter().map(|e| e.slot()).collect();
        assert_eq!(
            slots,
            vec![
                (Day::Senin, PeriodKey::Lesson(1)),
                (Day::Senin, PeriodKey::Lesson(2)),
                (Day::Senin, PeriodKey::Lesson(3)),
                (Day::Senin, PeriodKey::Lesson(4)),
            ]
        );
    }

    #[test]
    fn test_general_subject_gets_two_hours() {
        let (report, _, store) = run(
            &roster_one("Seni Budaya", &["X TKJ 1"]),
            &SubjectCatalog::new(),
            &GenerateOptions::default(),
        );
        assert_eq!(report.placed_hours[0].required, 2);
        assert_eq!(lessons(&store).len(), 2);
    }

    #[test]
    fn test_singles_only_without_consecutive_preference() {
        let options = GenerateOptions::default().with_consecutive(false);
        let (report, _, store) = run(
            &roster_one("Matematika", &["X TKJ 1"]),
            &SubjectCatalog::new(),
            &options,
        );
        assert!(report.shortfalls.is_empty());
        assert_eq!(lessons(&store).len(), 4);
    }

    #[test]
    fn test_block_does_not_cross_break() {
        let catalog = SubjectCatalog::new()
            .with_subject("Produktif", SubjectPolicy::new(3, SubjectCategory::Practical));
        let mut cm = ConstraintManager::new(TimeGrid::standard());
        // Occupy Senin 1-2 for the class so the first free run is 3-4 (len 2)
        // and 5-7 (len 3) lies after the break.
        let sec = ClassSectionId::new("X TKJ 1");
        for p in [1, 2] {
            cm.reserve(
                &crate::models::EntryId::from(format!("X{p}").as_str()),
                Some(&TeacherId::new("T9")),
                &sec,
                &Room::Homeroom,
                Day::Senin,
                PeriodKey::Lesson(p),
            );
        }
        let mut store = InMemoryStore::new();
        let options = GenerateOptions::default();
        Generator::new(&catalog, &options)
            .run(&mut cm, &mut store, &roster_one("Produktif", &["X TKJ 1"]))
            .unwrap();
        let slots: Vec<(Day, PeriodKey)> = lessons(&store).iter().map(|e| e.slot()).collect();
        assert_eq!(
            slots,
            vec![
                (Day::Senin, PeriodKey::Lesson(5)),
                (Day::Senin, PeriodKey::Lesson(6)),
                (Day::Senin, PeriodKey::Lesson(7)),
            ]
        );
    }

    #[test]
    fn test_no_double_booking_across_sections() {
        let teachers = vec![
            Teacher::new("T1")
                .with_subject("Matematika")
                .with_subject("Fisika")
                .with_class_section("X TKJ 1")
                .with_class_section("X TKJ 2"),
            Teacher::new("T2")
                .with_subject("Bahasa Inggris")
                .with_class_section("X TKJ 1")
                .with_class_section("X TKJ 2"),
        ];
        let (report, cm, store) =
            run(&teachers, &SubjectCatalog::new(), &GenerateOptions::default());
        assert!(report.is_complete());
        assert_eq!(cm.conflict_count(), 0);
        assert_eq!(lessons(&store).len(), 6 * 4);

        let mut teacher_slots = HashSet::new();
        let mut class_slots = HashSet::new();
        for e in store.list_all().unwrap() {
            if let Some(t) = &e.teacher_id {
                assert!(teacher_slots.insert((t.clone(), e.day, e.period)));
            }
            assert!(class_slots.insert((e.class_section.clone(), e.day, e.period)));
        }
    }

    #[test]
    fn test_shared_room_serialized() {
        let catalog = SubjectCatalog::new().with_subject(
            "Praktik Jaringan",
            SubjectPolicy::new(2, SubjectCategory::Practical).in_room("LAB"),
        );
        let teachers = vec![
            Teacher::new("T1").with_subject("Praktik Jaringan").with_class_section("X TKJ 1"),
            Teacher::new("T2").with_subject("Praktik Jaringan").with_class_section("X TKJ 2"),
        ];
        let (report, cm, store) = run(&teachers, &catalog, &GenerateOptions::default());
        assert!(report.is_complete());
        assert_eq!(cm.conflicts_summary().count(Axis::Room), 0);
        let mut room_slots = HashSet::new();
        for e in lessons(&store) {
            assert_eq!(e.room, Room::shared("LAB"));
            assert!(room_slots.insert((e.day, e.period)));
        }
    }

    #[test]
    fn test_shortfall_reported_not_raised() {
        // 52 hours cannot fit into 51 lesson slots of one class.
        let catalog = SubjectCatalog::new()
            .with_subject("Produktif", SubjectPolicy::new(52, SubjectCategory::Practical));
        let (report, _, store) = run(
            &roster_one("Produktif", &["X TKJ 1"]),
            &catalog,
            &GenerateOptions::default(),
        );
        assert_eq!(report.shortfalls.len(), 1);
        assert_eq!(report.shortfalls[0].placed, 51);
        assert_eq!(report.shortfalls[0].missing(), 1);
        assert_eq!(lessons(&store).len(), 51);
    }

    #[test]
    fn test_specials_materialized_per_section() {
        let (report, _, store) = run(
            &roster_one("Seni Budaya", &["X TKJ 1", "X TKJ 2"]),
            &SubjectCatalog::new(),
            &GenerateOptions::default(),
        );
        let fixed: Vec<ScheduleEntry> = store
            .list_all()
            .unwrap()
            .into_iter()
            .filter(|e| e.is_fixed())
            .collect();
        // 4 regular days × 3 specials + Friday × 4 specials, per section
        assert_eq!(fixed.len(), 2 * (4 * 3 + 4));
        assert!(fixed.iter().all(|e| e.teacher_id.is_none()));
        assert_eq!(report.created_count, 2 * 2 + fixed.len());
    }

    #[test]
    fn test_existing_entries_count_toward_hours() {
        let options = GenerateOptions::default();
        let catalog = SubjectCatalog::new();
        let teachers = roster_one("Seni Budaya", &["X TKJ 1"]);

        let mut cm = ConstraintManager::new(TimeGrid::standard());
        let mut store = InMemoryStore::new();
        Generator::new(&catalog, &options).run(&mut cm, &mut store, &teachers).unwrap();
        let count = store.len();

        let mut cm =
            ConstraintManager::from_entries(TimeGrid::standard(), &store.list_all().unwrap());
        let report = Generator::new(&catalog, &options)
            .run(&mut cm, &mut store, &teachers)
            .unwrap();
        assert_eq!(report.created_count, 0);
        assert_eq!(store.len(), count);
        assert_eq!(report.placed_hours[0].placed, 2);
    }

    #[test]
    fn test_invalid_roster_items_skipped() {
        let teachers = vec![
            Teacher::new("T1").with_subject("Seni Budaya").with_class_section("X TKJ 1"),
            Teacher::new("T1").with_subject("Fisika").with_class_section("X TKJ 2"),
            Teacher::new("T2").with_class_section("X TKJ 1"),
        ];
        let (report, _, _) = run(&teachers, &SubjectCatalog::new(), &GenerateOptions::default());
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.placed_hours.len(), 1);
    }

    #[test]
    fn test_term_written() {
        let options = GenerateOptions::default();
        let catalog = SubjectCatalog::new();
        let mut cm = ConstraintManager::new(TimeGrid::standard());
        let mut store = InMemoryStore::new();
        Generator::new(&catalog, &options)
            .with_term("2025/2026-ganjil")
            .run(&mut cm, &mut store, &roster_one("Seni Budaya", &["X TKJ 1"]))
            .unwrap();
        assert!(store.list_all().unwrap().iter().all(|e| e.term == "2025/2026-ganjil"));
    }

    #[test]
    fn test_retry_policy_forgets_tail() {
        let mut visited: HashSet<(Day, PeriodKey)> = HashSet::new();
        let mut attempts = Vec::new();
        for p in 1..=4 {
            let slot = (Day::Senin, PeriodKey::Lesson(p));
            visited.insert(slot);
            attempts.push(slot);
        }
        RetryPolicy::ForgetRecent(2).apply(&mut visited, &mut attempts);
        assert_eq!(visited.len(), 2);
        assert!(visited.contains(&(Day::Senin, PeriodKey::Lesson(1))));
        assert!(!visited.contains(&(Day::Senin, PeriodKey::Lesson(4))));

        RetryPolicy::ForgetAll.apply(&mut visited, &mut attempts);
        assert!(visited.is_empty());
        assert!(attempts.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let teachers = vec![
            Teacher::new("T1").with_subject("Matematika").with_class_section("X TKJ 1"),
            Teacher::new("T2").with_subject("Fisika").with_class_section("X TKJ 1"),
        ];
        let slots = |store: &InMemoryStore| -> Vec<(String, Day, PeriodKey)> {
            lessons(store).iter().map(|e| (e.subject.clone(), e.day, e.period)).collect()
        };
        let (_, _, a) = run(&teachers, &SubjectCatalog::new(), &GenerateOptions::default());
        let (_, _, b) = run(&teachers, &SubjectCatalog::new(), &GenerateOptions::default());
        assert_eq!(slots(&a), slots(&b));
    }

    #[test]
    fn test_repeated_subject_placed_once() {
        let teachers = vec![Teacher::new("T1")
            .with_subject("Matematika")
            .with_subject("Matematika")
            .with_class_section("X TKJ 1")
            .with_class_section("X TKJ 1")];
        let (report, cm, store) =
            run(&teachers, &SubjectCatalog::new(), &GenerateOptions::default());
        assert_eq!(report.placed_hours.len(), 1);
        assert_eq!(report.placed_hours[0].placed, 4);
        assert_eq!(lessons(&store).len(), 4);
        assert_eq!(cm.len(), store.list_all().unwrap().len());
    }
}
