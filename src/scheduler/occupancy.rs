//! Occupancy index over the teacher, class-section and room axes.
//!
//! # Data Structure
//!
//! A sparse map keyed by `(axis, resource, day, period)` holding the ids
//! of every entry that claims the slot, plus a per-entry holdings table
//! used for release and replay. A slot with two or more holders is a
//! conflict.
//!
//! # Complexity
//!
//! | Operation | Cost |
//! |-----------|------|
//! | `is_available`, `reserve`, `release` | O(1) expected (≤ 3 axes) |
//! | `available_slots` | O(lesson slots) |
//! | `rebuild_conflicts` | O(n log n) in held entries |
//!
//! One instance belongs to one run: build it with
//! [`ConstraintManager::from_entries`] and drop it afterwards.

use std::collections::{BTreeSet, HashMap};

use crate::models::{
    Axis, ClassSectionId, Conflict, ConflictSummary, Day, EntryId, PeriodKey, Room,
    ScheduleEntry, TeacherId, TimeGrid,
};

/// A resource slot on one axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    pub axis: Axis,
    pub resource: String,
    pub day: Day,
    pub period: PeriodKey,
}

/// What an entry holds in the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holding {
    pub teacher: Option<TeacherId>,
    pub class_section: ClassSectionId,
    pub room: Room,
    pub day: Day,
    pub period: PeriodKey,
    seq: u64,
}

impl Holding {
    /// Slot keys on every applicable axis.
    fn keys(&self) -> Vec<SlotKey> {
        slot_keys(
            self.teacher.as_ref(),
            &self.class_section,
            &self.room,
            self.day,
            self.period,
        )
    }
}

fn slot_keys(
    teacher: Option<&TeacherId>,
    class_section: &ClassSectionId,
    room: &Room,
    day: Day,
    period: PeriodKey,
) -> Vec<SlotKey> {
    let key = |axis, resource: &str| SlotKey {
        axis,
        resource: resource.to_string(),
        day,
        period,
    };
    let mut keys = Vec::with_capacity(3);
    if let Some(t) = teacher.filter(|t| !t.as_str().is_empty() && !period.is_special()) {
        keys.push(key(Axis::Teacher, t.as_str()));
    }
    keys.push(key(Axis::ClassSection, class_section.as_str()));
    if let Some(r) = room.shared_id() {
        keys.push(key(Axis::Room, r.as_str()));
    }
    keys
}

/// In-memory occupancy and conflict tracker.
#[derive(Debug, Clone)]
pub struct ConstraintManager {
    grid: TimeGrid,
    slots: HashMap<SlotKey, Vec<EntryId>>,
    holdings: HashMap<EntryId, Holding>,
    conflicted: BTreeSet<SlotKey>,
    next_seq: u64,
}

impl ConstraintManager {
    /// Creates an empty index over a time grid.
    pub fn new(grid: TimeGrid) -> Self {
        Self {
            grid,
            slots: HashMap::new(),
            holdings: HashMap::new(),
            conflicted: BTreeSet::new(),
            next_seq: 0,
        }
    }

    /// Creates an index seeded with existing entries, in order.
    ///
    /// Clashes among the entries are recorded as conflicts.
    pub fn from_entries(grid: TimeGrid, entries: &[ScheduleEntry]) -> Self {
        let mut cm = Self::new(grid);
        for e in entries {
            cm.reserve_entry(e);
        }
        cm
    }

    /// The time grid this index enumerates.
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Whether every applicable axis is free at (day, period).
    ///
    /// The teacher check is skipped for `None` or empty ids, and the
    /// room check for the class's own homeroom.
    pub fn is_available(
        &self,
        teacher: Option<&TeacherId>,
        class_section: &ClassSectionId,
        room: &Room,
        day: Day,
        period: PeriodKey,
    ) -> bool {
        slot_keys(teacher, class_section, room, day, period)
            .iter()
            .all(|k| self.slots.get(k).map_or(true, |holders| holders.is_empty()))
    }

    /// Records an entry on every applicable axis.
    ///
    /// An axis already held is not overwritten: both holders are kept and
    /// the slot becomes a conflict. Reserving an id that is already held
    /// moves it. Returns `true` when no conflict was introduced.
    pub fn reserve(
        &mut self,
        entry_id: &EntryId,
        teacher: Option<&TeacherId>,
        class_section: &ClassSectionId,
        room: &Room,
        day: Day,
        period: PeriodKey,
    ) -> bool {
        self.release(entry_id);
        let holding = Holding {
            teacher: teacher.cloned(),
            class_section: class_section.clone(),
            room: room.clone(),
            day,
            period,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.insert(entry_id.clone(), holding)
    }

    /// Reserves an entry's own (teacher, class-section, room, day, period).
    pub fn reserve_entry(&mut self, entry: &ScheduleEntry) -> bool {
        self.reserve(
            &entry.id,
            entry.teacher_id.as_ref(),
            &entry.class_section,
            &entry.room,
            entry.day,
            entry.period,
        )
    }

    /// Removes an entry from every axis it occupies.
    ///
    /// Returns the released holding, which [`restore`](Self::restore)
    /// accepts to undo the release.
    pub fn release(&mut self, entry_id: &EntryId) -> Option<Holding> {
        let holding = self.holdings.remove(entry_id)?;
        for key in holding.keys() {
            if let Some(holders) = self.slots.get_mut(&key) {
                holders.retain(|id| id != entry_id);
                if holders.len() < 2 {
                    self.conflicted.remove(&key);
                }
                if holders.is_empty() {
                    self.slots.remove(&key);
                }
            }
        }
        Some(holding)
    }

    /// Re-inserts a released holding, keeping its original reservation order.
    pub fn restore(&mut self, entry_id: &EntryId, holding: Holding) -> bool {
        self.release(entry_id);
        self.insert(entry_id.clone(), holding)
    }

    fn insert(&mut self, entry_id: EntryId, holding: Holding) -> bool {
        let mut clean = true;
        for key in holding.keys() {
            let holders = self.slots.entry(key.clone()).or_default();
            holders.push(entry_id.clone());
            if holders.len() > 1 {
                clean = false;
                self.conflicted.insert(key);
            }
        }
        self.holdings.insert(entry_id, holding);
        clean
    }

    /// Every jointly-free lesson slot for the resource triple.
    ///
    /// Ordered Monday first, periods ascending. Special periods are never
    /// offered.
    pub fn available_slots(
        &self,
        teacher: Option<&TeacherId>,
        class_section: &ClassSectionId,
        room: &Room,
    ) -> Vec<(Day, PeriodKey)> {
        self.grid
            .lesson_slots()
            .into_iter()
            .filter(|&(day, period)| self.is_available(teacher, class_section, room, day, period))
            .collect()
    }

    /// Clears conflicts and recomputes them by replaying every held entry
    /// in original reservation order.
    pub fn rebuild_conflicts(&mut self) {
        let mut held: Vec<(EntryId, Holding)> = self.holdings.drain().collect();
        held.sort_by_key(|(_, h)| h.seq);
        self.slots.clear();
        self.conflicted.clear();
        for (id, holding) in held {
            self.insert(id, holding);
        }
    }

    /// Current conflicts, ordered by (axis, resource, day, period).
    pub fn conflicts(&self) -> Vec<Conflict> {
        self.conflicted
            .iter()
            .filter_map(|key| {
                let holders = self.slots.get(key)?;
                (holders.len() > 1).then(|| Conflict {
                    axis: key.axis,
                    resource_id: key.resource.clone(),
                    day: key.day,
                    period: key.period,
                    participants: holders.clone(),
                })
            })
            .collect()
    }

    /// Number of current conflicts.
    pub fn conflict_count(&self) -> usize {
        self.conflicted.len()
    }

    /// Totals, per-axis counts and detail of current conflicts.
    pub fn conflicts_summary(&self) -> ConflictSummary {
        ConflictSummary::from_conflicts(self.conflicts())
    }

    /// Whether the conflict on this slot still exists.
    pub fn is_conflicted(&self, axis: Axis, resource: &str, day: Day, period: PeriodKey) -> bool {
        self.conflicted.contains(&SlotKey {
            axis,
            resource: resource.to_string(),
            day,
            period,
        })
    }

    /// Entries claiming a slot.
    pub fn holders(&self, axis: Axis, resource: &str, day: Day, period: PeriodKey) -> &[EntryId] {
        self.slots
            .get(&SlotKey {
                axis,
                resource: resource.to_string(),
                day,
                period,
            })
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// What an entry currently holds.
    pub fn holding(&self, entry_id: &EntryId) -> Option<&Holding> {
        self.holdings.get(entry_id)
    }

    /// Whether an entry is held.
    pub fn is_held(&self, entry_id: &EntryId) -> bool {
        self.holdings.contains_key(entry_id)
    }

    /// Number of held entries.
    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    /// Whether no entry is held.
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SpecialKind;

    fn cm() -> ConstraintManager {
        ConstraintManager::new(TimeGrid::standard())
    }

    fn t(id: &str) -> TeacherId {
        TeacherId::new(id)
    }

    fn c(id: &str) -> ClassSectionId {
        ClassSectionId::new(id)
    }

    const P3: PeriodKey = PeriodKey::Lesson(3);

    #[test]
    fn test_reserve_and_availability() {
        let mut cm = cm();
        let e1 = EntryId::from("E1");
        assert!(cm.is_available(Some(&t("T1")), &c("X TKJ 1"), &Room::Homeroom, Day::Senin, P3));
        assert!(cm.reserve(&e1, Some(&t("T1")), &c("X TKJ 1"), &Room::Homeroom, Day::Senin, P3));

        // Teacher busy
        assert!(!cm.is_available(Some(&t("T1")), &c("X TKJ 2"), &Room::Homeroom, Day::Senin, P3));
        // Class busy
        assert!(!cm.is_available(Some(&t("T2")), &c("X TKJ 1"), &Room::Homeroom, Day::Senin, P3));
        // Neither busy
        assert!(cm.is_available(Some(&t("T2")), &c("X TKJ 2"), &Room::Homeroom, Day::Senin, P3));
        // Other period
        assert!(cm.is_available(
            Some(&t("T1")),
            &c("X TKJ 1"),
            &Room::Homeroom,
            Day::Senin,
            PeriodKey::Lesson(4)
        ));
    }

    #[test]
    fn test_homeroom_exempt_shared_room_checked() {
        let mut cm = cm();
        let lab = Room::shared("LAB-1");
        cm.reserve(&EntryId::from("E1"), Some(&t("T1")), &c("X TKJ 1"), &lab, Day::Senin, P3);

        assert!(!cm.is_available(Some(&t("T2")), &c("X TKJ 2"), &lab, Day::Senin, P3));
        assert!(cm.is_available(Some(&t("T2")), &c("X TKJ 2"), &Room::Homeroom, Day::Senin, P3));
    }

    #[test]
    fn test_teacher_check_skipped_when_absent() {
        let mut cm = cm();
        cm.reserve(
            &EntryId::from("E1"),
            Some(&t("T1")),
            &c("X TKJ 1"),
            &Room::Homeroom,
            Day::Senin,
            P3,
        );
        assert!(cm.is_available(None, &c("X TKJ 2"), &Room::Homeroom, Day::Senin, P3));
        assert!(cm.is_available(Some(&t("")), &c("X TKJ 2"), &Room::Homeroom, Day::Senin, P3));
    }

    #[test]
    fn test_double_reserve_records_conflict() {
        let mut cm = cm();
        assert!(cm.reserve(
            &EntryId::from("E1"),
            Some(&t("T1")),
            &c("X TKJ 1"),
            &Room::Homeroom,
            Day::Senin,
            P3,
        ));
        assert!(!cm.reserve(
            &EntryId::from("E2"),
            Some(&t("T1")),
            &c("X TKJ 2"),
            &Room::Homeroom,
            Day::Senin,
            P3,
        ));

        let summary = cm.conflicts_summary();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.count(Axis::Teacher), 1);
        let conflict = &summary.detail[0];
        assert_eq!(conflict.resource_id, "T1");
        assert_eq!(conflict.participants, vec![EntryId::from("E1"), EntryId::from("E2")]);
        // Both holders kept, nothing overwritten
        assert_eq!(cm.holders(Axis::Teacher, "T1", Day::Senin, P3).len(), 2);
    }

    #[test]
    fn test_release_clears_conflict() {
        let mut cm = cm();
        cm.reserve(
            &EntryId::from("E1"),
            Some(&t("T1")),
            &c("X TKJ 1"),
            &Room::Homeroom,
            Day::Senin,
            P3,
        );
        cm.reserve(
            &EntryId::from("E2"),
            Some(&t("T1")),
            &c("X TKJ 2"),
            &Room::Homeroom,
            Day::Senin,
            P3,
        );
        assert_eq!(cm.conflict_count(), 1);

        let holding = cm.release(&EntryId::from("E2")).unwrap();
        assert_eq!(cm.conflict_count(), 0);
        assert!(!cm.is_held(&EntryId::from("E2")));
        assert!(cm.release(&EntryId::from("E2")).is_none());

        cm.restore(&EntryId::from("E2"), holding);
        assert_eq!(cm.conflict_count(), 1);
    }

    #[test]
    fn test_release_frees_all_axes() {
        let mut cm = cm();
        let lab = Room::shared("LAB-1");
        let e1 = EntryId::from("E1");
        cm.reserve(&e1, Some(&t("T1")), &c("X TKJ 1"), &lab, Day::Rabu, P3);
        cm.release(&e1);
        assert!(cm.is_available(Some(&t("T1")), &c("X TKJ 1"), &lab, Day::Rabu, P3));
        assert!(cm.is_empty());
    }

    #[test]
    fn test_reserve_same_id_moves_entry() {
        let mut cm = cm();
        let e1 = EntryId::from("E1");
        cm.reserve(&e1, Some(&t("T1")), &c("X TKJ 1"), &Room::Homeroom, Day::Senin, P3);
        cm.reserve(&e1, Some(&t("T1")), &c("X TKJ 1"), &Room::Homeroom, Day::Selasa, P3);
        assert_eq!(cm.len(), 1);
        assert!(cm.is_available(Some(&t("T1")), &c("X TKJ 1"), &Room::Homeroom, Day::Senin, P3));
        assert_eq!(cm.conflict_count(), 0);
    }

    #[test]
    fn test_special_period_skips_teacher_axis() {
        let mut cm = cm();
        let assembly = PeriodKey::Special(SpecialKind::Assembly);
        cm.reserve(
            &EntryId::from("F1"),
            None,
            &c("X TKJ 1"),
            &Room::Homeroom,
            Day::Senin,
            assembly,
        );
        cm.reserve(
            &EntryId::from("F2"),
            None,
            &c("X TKJ 2"),
            &Room::Homeroom,
            Day::Senin,
            assembly,
        );
        assert_eq!(cm.conflict_count(), 0);
    }

    #[test]
    fn test_available_slots_excludes_taken_and_special() {
        let mut cm = cm();
        cm.reserve(
            &EntryId::from("E1"),
            Some(&t("T1")),
            &c("X TKJ 2"),
            &Room::Homeroom,
            Day::Senin,
            PeriodKey::Lesson(1),
        );
        let slots = cm.available_slots(Some(&t("T1")), &c("X TKJ 1"), &Room::Homeroom);
        assert_eq!(slots.len(), 4 * 11 + 7 - 1);
        assert_eq!(slots[0], (Day::Senin, PeriodKey::Lesson(2)));
        assert!(slots.iter().all(|(_, p)| !p.is_special()));
        assert_eq!(slots.last(), Some(&(Day::Jumat, PeriodKey::Lesson(7))));
    }

    #[test]
    fn test_rebuild_conflicts_is_stable() {
        let mut cm = cm();
        cm.reserve(
            &EntryId::from("E1"),
            Some(&t("T1")),
            &c("X TKJ 1"),
            &Room::Homeroom,
            Day::Senin,
            P3,
        );
        cm.reserve(
            &EntryId::from("E2"),
            Some(&t("T1")),
            &c("X TKJ 1"),
            &Room::Homeroom,
            Day::Senin,
            P3,
        );
        let before = cm.conflicts_summary();
        assert_eq!(before.total, 2); // teacher + class-section

        cm.rebuild_conflicts();
        let after = cm.conflicts_summary();
        assert_eq!(before, after);
        assert_eq!(after.detail[0].participants[0], EntryId::from("E1"));
    }

    #[test]
    fn test_from_entries_discovers_conflicts() {
        let grid = TimeGrid::standard();
        let time = grid.period(Day::Senin, P3).unwrap().range;
        let a = ScheduleEntry::lesson(t("T1"), "Matematika", c("X TKJ 1"), Day::Senin, P3, time);
        let b = ScheduleEntry::lesson(t("T1"), "Matematika", c("X TKJ 2"), Day::Senin, P3, time);
        let cm = ConstraintManager::from_entries(grid, &[a, b]);
        assert_eq!(cm.len(), 2);
        assert_eq!(cm.conflicts_summary().count(Axis::Teacher), 1);
        assert!(cm.is_conflicted(Axis::Teacher, "T1", Day::Senin, P3));
    }
}
