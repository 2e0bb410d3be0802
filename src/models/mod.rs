//! Timetable domain models.
//!
//! Provides the core data types for representing a school week, its
//! roster, and the placed schedule.
//!
//! # Domain Mappings
//!
//! | jadwal | Generic scheduling |
//! |--------|--------------------|
//! | Period | Time slot |
//! | Teacher / ClassSection / Room | Resources |
//! | ScheduleEntry | Assignment |
//! | Conflict | Capacity violation |

mod calendar;
mod constraint;
mod resource;
mod schedule;
mod subject;

pub use calendar::{
    Day, DayType, ParseDayError, Period, PeriodKey, SpecialKind, TimeGrid, TimeRange,
};
pub use constraint::{Axis, Conflict, ConflictSummary};
pub use resource::{ClassSectionId, Room, RoomId, Teacher, TeacherId, Track};
pub use schedule::{
    ActivityKind, ApprovalStatus, Audit, EntryId, EntryStatus, ScheduleEntry, Stamp,
};
pub use subject::{SubjectCatalog, SubjectCategory, SubjectPolicy};
