//! The timetable engine facade.
//!
//! [`Timetable`] owns the collaborators (entry store, roster provider,
//! notification sink), the time grid and the subject catalog, and exposes
//! every engine operation. It keeps an occupancy index in step with the
//! store for manual edits; generation and conflict detection always start
//! from a fresh index built from the store.

use tracing::{info, warn};

use crate::approval::{self, Administrator, BatchOutcome, LifecycleEvent, Reviewer};
use crate::config::EngineConfig;
use crate::error::{EngineError, StoreError};
use crate::models::{ConflictSummary, EntryId, ScheduleEntry, SubjectCatalog, TimeGrid};
use crate::scheduler::{ConstraintManager, GenerateOptions, GenerateReport, Generator, TimetableKpi};
use crate::store::{EntryStore, NotificationSink, RosterProvider};
use crate::validation::validate_entries;

/// School timetable engine over a store, a roster and a notification sink.
///
/// # Example
///
/// ```
/// use jadwal::approval::{Administrator, Reviewer};
/// use jadwal::models::Teacher;
/// use jadwal::scheduler::GenerateOptions;
/// use jadwal::store::{InMemoryStore, NoopSink, StaticRoster};
/// use jadwal::Timetable;
///
/// let roster = StaticRoster::new(vec![
///     Teacher::new("T1").with_subject("Matematika").with_class_section("X TKJ 1"),
/// ]);
/// let mut tt = Timetable::new(InMemoryStore::new(), roster, NoopSink).unwrap();
///
/// let report = tt.generate(&GenerateOptions::default()).unwrap();
/// assert!(report.is_complete());
///
/// let ids: Vec<_> = tt.entries().unwrap().into_iter().map(|e| e.id).collect();
/// let admin = Administrator::new("admin");
/// tt.submit_for_approval(&ids, &admin);
/// tt.approve(&ids, &Reviewer::new("kaprog", "TKJ"));
/// tt.publish(&ids, &admin);
/// assert_eq!(tt.published_entries().unwrap().len(), ids.len());
/// ```
pub struct Timetable<S, R, N> {
    store: S,
    roster: R,
    sink: N,
    grid: TimeGrid,
    catalog: SubjectCatalog,
    term: String,
    defaults: GenerateOptions,
    occupancy: ConstraintManager,
}

impl<S: EntryStore, R: RosterProvider, N: NotificationSink> Timetable<S, R, N> {
    /// Creates an engine on the standard grid with the default policy.
    ///
    /// The occupancy index is seeded from the store.
    pub fn new(store: S, roster: R, sink: N) -> Result<Self, EngineError> {
        let grid = TimeGrid::standard();
        let occupancy = ConstraintManager::from_entries(grid.clone(), &store.list_all()?);
        Ok(Self {
            store,
            roster,
            sink,
            grid,
            catalog: SubjectCatalog::default(),
            term: String::new(),
            defaults: GenerateOptions::default(),
            occupancy,
        })
    }

    /// Applies a configuration: term, generation defaults and catalog.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.term = config.term;
        self.defaults = config.generate;
        self.catalog = config.catalog;
        self
    }

    /// Replaces the time grid and re-seeds the occupancy index.
    pub fn with_grid(mut self, grid: TimeGrid) -> Result<Self, EngineError> {
        self.occupancy = ConstraintManager::from_entries(grid.clone(), &self.store.list_all()?);
        self.grid = grid;
        Ok(self)
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn catalog(&self) -> &SubjectCatalog {
        &self.catalog
    }

    /// Generation options from the configuration.
    pub fn default_options(&self) -> &GenerateOptions {
        &self.defaults
    }

    /// The underlying entry store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Occupancy index matching the store.
    pub fn occupancy(&self) -> &ConstraintManager {
        &self.occupancy
    }

    /// Builds the timetable for the active roster.
    ///
    /// Capacity shortfalls and unresolved conflicts are reported, not
    /// returned as errors. A store or roster failure aborts the run; the
    /// occupancy index still matches whatever was written or deleted.
    pub fn generate(&mut self, options: &GenerateOptions) -> Result<GenerateReport, EngineError> {
        let teachers = self
            .roster
            .list_active_teachers()
            .map_err(EngineError::Roster)?;

        let mut deleted = 0;
        if options.clear_existing {
            for e in self.store.list_all()? {
                if self.store.delete(&e.id)? {
                    deleted += 1;
                }
                self.occupancy.release(&e.id);
            }
            info!(deleted, "cleared existing entries");
        }

        let existing = self.store.list_all()?;
        if let Err(errors) = validate_entries(&self.grid, &existing) {
            for e in &errors {
                warn!(entry = %e.item_id, "{}", e.message);
            }
        }

        let mut cm = ConstraintManager::from_entries(self.grid.clone(), &existing);
        let result = Generator::new(&self.catalog, options)
            .with_term(self.term.clone())
            .run(&mut cm, &mut self.store, &teachers);
        self.occupancy = cm;

        let mut report = result?;
        report.deleted_count = deleted;
        Ok(report)
    }

    /// Generates with the configured default options.
    pub fn generate_default(&mut self) -> Result<GenerateReport, EngineError> {
        let options = self.defaults.clone();
        self.generate(&options)
    }

    /// Scans the stored entries for conflicts. Read-only.
    pub fn detect_conflicts(&self) -> Result<ConflictSummary, EngineError> {
        let entries = self.store.list_all()?;
        let cm = ConstraintManager::from_entries(self.grid.clone(), &entries);
        Ok(cm.conflicts_summary())
    }

    /// Adds a manually authored entry.
    ///
    /// Returns `true` when the entry is conflict-free. A conflicting entry
    /// is still stored and shows up in [`detect_conflicts`](Self::detect_conflicts).
    pub fn add_entry(&mut self, entry: ScheduleEntry) -> Result<bool, EngineError> {
        validate_entries(&self.grid, std::slice::from_ref(&entry))
            .map_err(EngineError::InvalidEntry)?;
        if self.occupancy.is_held(&entry.id) {
            return Err(StoreError::Duplicate(entry.id).into());
        }
        let clean = self.occupancy.reserve_entry(&entry);
        if let Err(err) = self.store.create(&entry) {
            self.occupancy.release(&entry.id);
            return Err(err.into());
        }
        if !clean {
            warn!(entry = %entry.id, "added entry conflicts with existing entries");
        }
        Ok(clean)
    }

    /// Deletes an entry and frees its slots. Returns whether it existed.
    pub fn delete_entry(&mut self, id: &EntryId) -> Result<bool, EngineError> {
        let existed = self.store.delete(id)?;
        self.occupancy.release(id);
        Ok(existed)
    }

    /// All stored entries.
    pub fn entries(&self) -> Result<Vec<ScheduleEntry>, EngineError> {
        Ok(self.store.list_all()?)
    }

    /// Entries visible to teachers and students.
    pub fn published_entries(&self) -> Result<Vec<ScheduleEntry>, EngineError> {
        Ok(self
            .store
            .list_all()?
            .into_iter()
            .filter(|e| e.published)
            .collect())
    }

    /// Quality indicators of the stored timetable.
    pub fn kpi(&self) -> Result<TimetableKpi, EngineError> {
        Ok(TimetableKpi::calculate(&self.store.list_all()?, &self.grid))
    }

    /// Submits draft entries for review.
    pub fn submit_for_approval(&mut self, ids: &[EntryId], by: &Administrator) -> BatchOutcome {
        let outcome = approval::submit_for_approval(&mut self.store, ids, by);
        self.dispatch(&outcome.events);
        outcome
    }

    /// Approves submitted entries of the reviewer's track.
    pub fn approve(&mut self, ids: &[EntryId], by: &Reviewer) -> BatchOutcome {
        let outcome = approval::approve(&mut self.store, ids, by);
        self.dispatch(&outcome.events);
        outcome
    }

    /// Rejects submitted entries of the reviewer's track.
    pub fn reject(
        &mut self,
        ids: &[EntryId],
        by: &Reviewer,
        reason: &str,
        notes: Option<&str>,
    ) -> BatchOutcome {
        let outcome = approval::reject(&mut self.store, ids, by, reason, notes);
        self.dispatch(&outcome.events);
        outcome
    }

    /// Publishes approved entries; others are left unchanged.
    pub fn publish(&mut self, ids: &[EntryId], by: &Administrator) -> BatchOutcome {
        let outcome = approval::publish(&mut self.store, ids, by);
        self.dispatch(&outcome.events);
        outcome
    }

    fn dispatch(&self, events: &[LifecycleEvent]) {
        for event in events {
            let target = event.target();
            if let Err(err) = self.sink.notify(&target, &event.message()) {
                warn!(%target, error = %err, "notification failed");
            }
        }
    }
}
