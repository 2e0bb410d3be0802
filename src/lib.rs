//! School timetable engine.
//!
//! Builds a weekly timetable for a vocational school from a teaching
//! roster, keeps it free of double bookings, and moves entries through a
//! draft → review → publish workflow.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `TimeGrid`, `Period`, `Teacher`,
//!   `ScheduleEntry`, `Conflict`, `SubjectCatalog`
//! - **`scheduler`**: `ConstraintManager` occupancy index, greedy
//!   `Generator`, `ConflictResolver`, run reports and KPIs
//! - **`approval`**: Lifecycle transitions with track-scoped reviewers
//! - **`store`**: `EntryStore`, `RosterProvider`, `NotificationSink` seams
//! - **`validation`**: Roster and entry integrity checks
//! - **`config`**: TOML configuration
//! - **`timetable`**: The `Timetable` facade
//!
//! # Architecture
//!
//! Single-writer and in-process. Every generation run builds its own
//! occupancy index from the store, so no state leaks between runs.
//! Persistence goes through [`store::EntryStore`]; the crate ships an
//! in-memory implementation.
//!
//! # References
//!
//! - de Werra (1985), "An introduction to timetabling", EJOR 19(2)
//! - Schaerf (1999), "A Survey of Automated Timetabling", AI Review 13(2)

pub mod approval;
pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod store;
pub mod timetable;
pub mod validation;

pub use config::EngineConfig;
pub use error::EngineError;
pub use timetable::Timetable;
