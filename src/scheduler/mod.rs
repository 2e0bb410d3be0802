//! Timetable construction: occupancy tracking, greedy generation,
//! conflict resolution, and run statistics.
//!
//! # Pipeline
//!
//! 1. [`ConstraintManager`] indexes every entry on the teacher,
//!    class-section and shared-room axes.
//! 2. [`Generator`] places each teaching triple, blocks first, then
//!    singles, then materializes special periods.
//! 3. [`ConflictResolver`] moves lower-priority entries out of doubly
//!    booked slots.
//! 4. [`GenerateReport`] and [`TimetableKpi`] summarize the result.
//!
//! # References
//!
//! - de Werra (1985), "An introduction to timetabling", EJOR 19(2)
//! - Schaerf (1999), "A Survey of Automated Timetabling", AI Review 13(2)

mod generator;
mod occupancy;
mod report;
mod resolver;

pub use generator::{GenerateOptions, Generator, RetryPolicy};
pub use occupancy::{ConstraintManager, Holding, SlotKey};
pub use report::{
    GenerateReport, Relocation, ResolutionReport, Shortfall, TimetableKpi, Triple,
    TriplePlacement,
};
pub use resolver::ConflictResolver;
