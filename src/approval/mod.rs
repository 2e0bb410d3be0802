//! Entry lifecycle and approval workflow.
//!
//! # State Machine
//!
//! | From | To | Actor | Guard |
//! |------|----|-------|-------|
//! | Draft | Submitted | [`Administrator`] | class-section track resolvable |
//! | Submitted | Approved | [`Reviewer`] | reviewer track = section track |
//! | Submitted | Rejected | [`Reviewer`] | same, plus a non-blank reason |
//! | Approved | Published | [`Administrator`] | none |
//!
//! Every operation takes a batch of ids and returns one outcome per id.
//! A failure on one id never rolls back the others. Authorization is
//! checked before any mutation, so a denied entry is left untouched.
//!
//! Successful transitions produce [`LifecycleEvent`]s; delivering them is
//! the caller's concern.

mod events;

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TransitionError;
use crate::models::{
    ApprovalStatus, ClassSectionId, EntryId, EntryStatus, ScheduleEntry, Stamp, Track,
};
use crate::store::EntryStore;

pub use events::LifecycleEvent;

/// School administrator: submits and publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Administrator {
    pub name: String,
}

impl Administrator {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Program head: approves or rejects entries of one track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reviewer {
    pub name: String,
    pub track: Track,
}

impl Reviewer {
    pub fn new(name: impl Into<String>, track: impl AsRef<str>) -> Self {
        Self {
            name: name.into(),
            track: Track::new(track),
        }
    }

    /// Checks that a class-section belongs to this reviewer's track.
    pub fn authorize(&self, section: &ClassSectionId) -> Result<(), TransitionError> {
        let track = section
            .track()
            .ok_or_else(|| TransitionError::UnresolvableTrack(section.clone()))?;
        if track == self.track {
            Ok(())
        } else {
            Err(TransitionError::TrackMismatch {
                reviewer: self.track.clone(),
                entry: track,
                section: section.clone(),
            })
        }
    }
}

/// Result of a successful call for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    /// Status changed.
    Applied { from: EntryStatus, to: EntryStatus },
    /// Nothing to do; the entry keeps its status.
    Unchanged { status: EntryStatus },
}

/// Per-id outcomes of a batch call plus the events it produced.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// One result per requested id, in request order.
    pub results: Vec<(EntryId, Result<Transition, TransitionError>)>,
    /// Events for the notification sink.
    pub events: Vec<LifecycleEvent>,
}

impl BatchOutcome {
    /// Number of entries whose status changed.
    pub fn applied_count(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, r)| matches!(r, Ok(Transition::Applied { .. })))
            .count()
    }

    /// Number of authorization denials.
    pub fn denied_count(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, r)| r.as_ref().is_err_and(TransitionError::is_denial))
            .count()
    }

    /// Failed ids with their errors.
    pub fn errors(&self) -> impl Iterator<Item = (&EntryId, &TransitionError)> {
        self.results
            .iter()
            .filter_map(|(id, r)| r.as_ref().err().map(|e| (id, e)))
    }

    /// Outcome for one id.
    pub fn get(&self, id: &EntryId) -> Option<&Result<Transition, TransitionError>> {
        self.results.iter().find(|(i, _)| i == id).map(|(_, r)| r)
    }
}

fn load<S: EntryStore + ?Sized>(store: &S, id: &EntryId) -> Result<ScheduleEntry, TransitionError> {
    store
        .read(id)?
        .ok_or_else(|| TransitionError::NotFound(id.clone()))
}

/// Moves `entry` to `to` if the lifecycle allows it, then writes it.
fn advance<S: EntryStore + ?Sized>(
    store: &mut S,
    entry: &mut ScheduleEntry,
    to: EntryStatus,
    stamp: impl FnOnce(&mut ScheduleEntry),
) -> Result<Transition, TransitionError> {
    let from = entry.status;
    if !from.can_advance_to(to) {
        return Err(TransitionError::InvalidTransition { from, to });
    }
    entry.status = to;
    stamp(entry);
    entry.audit.updated_at = Some(Utc::now());
    store.update(entry)?;
    debug!(entry = %entry.id, %from, %to, "transition");
    Ok(Transition::Applied { from, to })
}

/// Submits draft entries for review, grouped by class-section.
///
/// Entries whose class-section name yields no track fail with
/// [`TransitionError::UnresolvableTrack`]. One
/// [`LifecycleEvent::Submitted`] is produced per class-section.
pub fn submit_for_approval<S: EntryStore + ?Sized>(
    store: &mut S,
    ids: &[EntryId],
    by: &Administrator,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    let mut groups: BTreeMap<ClassSectionId, (Track, Vec<EntryId>)> = BTreeMap::new();

    for id in ids {
        let result = load(store, id).and_then(|mut entry| {
            let track = entry
                .class_section
                .track()
                .ok_or_else(|| TransitionError::UnresolvableTrack(entry.class_section.clone()))?;
            let transition = advance(store, &mut entry, EntryStatus::Submitted, |e| {
                e.approval = ApprovalStatus::Pending;
                e.audit.submitted = Some(Stamp::now(&by.name));
            })?;
            groups
                .entry(entry.class_section.clone())
                .or_insert_with(|| (track, Vec::new()))
                .1
                .push(entry.id.clone());
            Ok(transition)
        });
        outcome.results.push((id.clone(), result));
    }

    outcome.events = groups
        .into_iter()
        .map(|(class_section, (track, entries))| LifecycleEvent::Submitted {
            class_section,
            track,
            entries,
            by: by.name.clone(),
        })
        .collect();
    outcome
}

/// Approves submitted entries of the reviewer's track.
///
/// Does not publish.
pub fn approve<S: EntryStore + ?Sized>(
    store: &mut S,
    ids: &[EntryId],
    by: &Reviewer,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for id in ids {
        let result = load(store, id).and_then(|mut entry| {
            by.authorize(&entry.class_section)?;
            let transition = advance(store, &mut entry, EntryStatus::Approved, |e| {
                e.approval = ApprovalStatus::Approved;
                e.audit.approved = Some(Stamp::now(&by.name));
            })?;
            outcome.events.push(LifecycleEvent::Approved {
                entry_id: entry.id.clone(),
                class_section: entry.class_section.clone(),
                teacher: entry.teacher_id.clone(),
                by: by.name.clone(),
            });
            Ok(transition)
        });
        outcome.results.push((id.clone(), result));
    }
    outcome
}

/// Rejects submitted entries of the reviewer's track.
///
/// A blank `reason` fails every id with [`TransitionError::MissingReason`].
pub fn reject<S: EntryStore + ?Sized>(
    store: &mut S,
    ids: &[EntryId],
    by: &Reviewer,
    reason: &str,
    notes: Option<&str>,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    let reason = reason.trim();
    for id in ids {
        let result = if reason.is_empty() {
            Err(TransitionError::MissingReason)
        } else {
            load(store, id).and_then(|mut entry| {
                by.authorize(&entry.class_section)?;
                let transition = advance(store, &mut entry, EntryStatus::Rejected, |e| {
                    e.approval = ApprovalStatus::Rejected;
                    e.audit.rejected = Some(Stamp::now(&by.name));
                    e.audit.rejection_reason = Some(reason.to_string());
                    e.audit.rejection_notes = notes.map(str::to_string);
                })?;
                outcome.events.push(LifecycleEvent::Rejected {
                    entry_id: entry.id.clone(),
                    class_section: entry.class_section.clone(),
                    teacher: entry.teacher_id.clone(),
                    by: by.name.clone(),
                    reason: reason.to_string(),
                });
                Ok(transition)
            })
        };
        outcome.results.push((id.clone(), result));
    }
    outcome
}

/// Publishes approved entries.
///
/// Entries in any other status are left as they are and reported as
/// [`Transition::Unchanged`].
pub fn publish<S: EntryStore + ?Sized>(
    store: &mut S,
    ids: &[EntryId],
    by: &Administrator,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for id in ids {
        let result = load(store, id).and_then(|mut entry| {
            if entry.status != EntryStatus::Approved {
                return Ok(Transition::Unchanged {
                    status: entry.status,
                });
            }
            let transition = advance(store, &mut entry, EntryStatus::Published, |e| {
                e.published = true;
                e.audit.published = Some(Stamp::now(&by.name));
            })?;
            outcome.events.push(LifecycleEvent::Published {
                entry_id: entry.id.clone(),
                class_section: entry.class_section.clone(),
                teacher: entry.teacher_id.clone(),
                by: by.name.clone(),
            });
            Ok(transition)
        });
        outcome.results.push((id.clone(), result));
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::{Day, PeriodKey, TeacherId, TimeRange};
    use crate::store::InMemoryStore;

    fn entry(id: &str, section: &str) -> ScheduleEntry {
        ScheduleEntry::lesson(
            TeacherId::new("T1"),
            "Matematika",
            ClassSectionId::new(section),
            Day::Senin,
            PeriodKey::Lesson(1),
            TimeRange::hm((7, 30), (8, 10)),
        )
        .with_id(id)
    }

    fn ids(list: &[&str]) -> Vec<EntryId> {
        list.iter().map(|s| EntryId::from(*s)).collect()
    }

    fn status(store: &InMemoryStore, id: &str) -> EntryStatus {
        store.read(&EntryId::from(id)).unwrap().unwrap().status
    }

    fn admin() -> Administrator {
        Administrator::new("admin")
    }

    #[test]
    fn test_full_lifecycle() {
        let mut store = InMemoryStore::with_entries(vec![entry("E1", "X TKJ 1")]);
        let kaprog = Reviewer::new("kaprog-tkj", "tkj");

        let out = submit_for_approval(&mut store, &ids(&["E1"]), &admin());
        assert_eq!(out.applied_count(), 1);
        assert_eq!(out.events.len(), 1);

        let out = approve(&mut store, &ids(&["E1"]), &kaprog);
        assert_eq!(
            out.get(&EntryId::from("E1")),
            Some(&Ok(Transition::Applied {
                from: EntryStatus::Submitted,
                to: EntryStatus::Approved
            }))
        );
        let e = store.read(&EntryId::from("E1")).unwrap().unwrap();
        assert_eq!(e.approval, ApprovalStatus::Approved);
        assert!(!e.published);
        assert_eq!(e.audit.approved.as_ref().map(|s| s.by.as_str()), Some("kaprog-tkj"));

        let out = publish(&mut store, &ids(&["E1"]), &admin());
        assert_eq!(out.applied_count(), 1);
        let e = store.read(&EntryId::from("E1")).unwrap().unwrap();
        assert_eq!(e.status, EntryStatus::Published);
        assert!(e.published);
        assert!(e.audit.published.is_some());
    }

    #[test]
    fn test_submit_groups_events_by_section() {
        let mut store = InMemoryStore::with_entries(vec![
            entry("E1", "X TKJ 1"),
            entry("E2", "X TKJ 1"),
            entry("E3", "XI RPL 2"),
        ]);
        let out = submit_for_approval(&mut store, &ids(&["E1", "E2", "E3"]), &admin());
        assert_eq!(out.applied_count(), 3);
        assert_eq!(out.events.len(), 2);
        match &out.events[0] {
            LifecycleEvent::Submitted { entries, track, .. } => {
                assert_eq!(entries.len(), 2);
                assert_eq!(track.as_str(), "TKJ");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_submit_unresolvable_track() {
        let mut store =
            InMemoryStore::with_entries(vec![entry("E1", "X 1"), entry("E2", "X TKJ 1")]);
        let out = submit_for_approval(&mut store, &ids(&["E1", "E2"]), &admin());
        assert!(matches!(
            out.get(&EntryId::from("E1")),
            Some(Err(TransitionError::UnresolvableTrack(_)))
        ));
        assert_eq!(status(&store, "E1"), EntryStatus::Draft);
        // Other ids still proceed
        assert_eq!(status(&store, "E2"), EntryStatus::Submitted);
    }

    #[test]
    fn test_track_mismatch_denied_unchanged() {
        let mut store = InMemoryStore::with_entries(vec![entry("E1", "X RPL 1")]);
        submit_for_approval(&mut store, &ids(&["E1"]), &admin());
        let before = store.read(&EntryId::from("E1")).unwrap().unwrap();

        let out = approve(&mut store, &ids(&["E1"]), &Reviewer::new("kaprog-tkj", "TKJ"));
        assert_eq!(out.denied_count(), 1);
        assert!(out.events.is_empty());
        assert_eq!(store.read(&EntryId::from("E1")).unwrap().unwrap(), before);

        let out = reject(&mut store, &ids(&["E1"]), &Reviewer::new("kaprog-tkj", "TKJ"), "x", None);
        assert_eq!(out.denied_count(), 1);
        assert_eq!(status(&store, "E1"), EntryStatus::Submitted);
    }

    #[test]
    fn test_approve_requires_submitted() {
        let mut store = InMemoryStore::with_entries(vec![entry("E1", "X TKJ 1")]);
        let out = approve(&mut store, &ids(&["E1"]), &Reviewer::new("k", "TKJ"));
        assert_eq!(
            out.get(&EntryId::from("E1")),
            Some(&Err(TransitionError::InvalidTransition {
                from: EntryStatus::Draft,
                to: EntryStatus::Approved
            }))
        );
    }

    #[test]
    fn test_reject_records_reason_and_is_terminal() {
        let mut store = InMemoryStore::with_entries(vec![entry("E1", "X TKJ 1")]);
        let kaprog = Reviewer::new("kaprog", "TKJ");
        submit_for_approval(&mut store, &ids(&["E1"]), &admin());

        let out = reject(&mut store, &ids(&["E1"]), &kaprog, "  ", None);
        assert_eq!(out.get(&EntryId::from("E1")), Some(&Err(TransitionError::MissingReason)));
        assert_eq!(status(&store, "E1"), EntryStatus::Submitted);

        let out = reject(
            &mut store,
            &ids(&["E1"]),
            &kaprog,
            "guru bentrok",
            Some("pindah ke Rabu"),
        );
        assert_eq!(out.applied_count(), 1);
        let e = store.read(&EntryId::from("E1")).unwrap().unwrap();
        assert_eq!(e.status, EntryStatus::Rejected);
        assert_eq!(e.approval, ApprovalStatus::Rejected);
        assert_eq!(e.audit.rejection_reason.as_deref(), Some("guru bentrok"));
        assert_eq!(e.audit.rejection_notes.as_deref(), Some("pindah ke Rabu"));

        // Terminal: cannot be approved afterwards
        let out = approve(&mut store, &ids(&["E1"]), &kaprog);
        assert!(out.get(&EntryId::from("E1")).unwrap().is_err());
    }

    #[test]
    fn test_publish_non_approved_is_noop() {
        let mut store = InMemoryStore::with_entries(vec![entry("E1", "X TKJ 1")]);
        let out = publish(&mut store, &ids(&["E1"]), &admin());
        assert_eq!(
            out.get(&EntryId::from("E1")),
            Some(&Ok(Transition::Unchanged {
                status: EntryStatus::Draft
            }))
        );
        assert!(out.events.is_empty());
        assert!(!store.read(&EntryId::from("E1")).unwrap().unwrap().published);
    }

    #[test]
    fn test_missing_id_does_not_stop_batch() {
        let mut store = InMemoryStore::with_entries(vec![entry("E1", "X TKJ 1")]);
        let out = submit_for_approval(&mut store, &ids(&["NOPE", "E1"]), &admin());
        assert_eq!(
            out.get(&EntryId::from("NOPE")),
            Some(&Err(TransitionError::NotFound(EntryId::from("NOPE"))))
        );
        assert_eq!(out.applied_count(), 1);
        assert_eq!(out.errors().count(), 1);
    }

    #[test]
    fn test_store_error_reported_per_id() {
        struct Frozen(InMemoryStore);
        impl EntryStore for Frozen {
            fn create(&mut self, e: &ScheduleEntry) -> Result<(), StoreError> {
                self.0.create(e)
            }
            fn read(&self, id: &EntryId) -> Result<Option<ScheduleEntry>, StoreError> {
                self.0.read(id)
            }
            fn update(&mut self, _: &ScheduleEntry) -> Result<(), StoreError> {
                Err(StoreError::Backend("frozen".into()))
            }
            fn delete(&mut self, id: &EntryId) -> Result<bool, StoreError> {
                self.0.delete(id)
            }
            fn list_all(&self) -> Result<Vec<ScheduleEntry>, StoreError> {
                self.0.list_all()
            }
        }
        let mut store = Frozen(InMemoryStore::with_entries(vec![entry("E1", "X TKJ 1")]));
        let out = submit_for_approval(&mut store, &ids(&["E1"]), &admin());
        assert!(matches!(
            out.get(&EntryId::from("E1")),
            Some(Err(TransitionError::Store(_)))
        ));
        assert!(out.events.is_empty());
    }
}
