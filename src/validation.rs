//! Input validation for rosters and stored entries.
//!
//! Checks structural integrity before generation and after loading
//! persisted entries. Detects:
//! - Duplicate teacher or entry IDs
//! - Teachers without subjects or class-sections
//! - Entries on a period the day does not have
//! - Lessons placed on special periods, or without a teacher
//!
//! Errors are collected, not short-circuited, so callers can skip the
//! offending items and continue.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{ActivityKind, ScheduleEntry, Teacher, TimeGrid};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Offending teacher or entry id.
    pub item_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Two items share the same ID.
    DuplicateId,
    /// A required roster field is empty.
    MissingField,
    /// An entry references a period its day type does not have.
    InvalidPeriod,
    /// A lesson sits on a special (non-assignable) period.
    LessonOnSpecialPeriod,
    /// A lesson has no teacher.
    MissingTeacher,
}

impl ValidationError {
    fn new(
        kind: ValidationErrorKind,
        item_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            item_id: item_id.into(),
            message: message.into(),
        }
    }
}

/// Validates a teaching roster.
///
/// Checks:
/// 1. No blank teacher IDs
/// 2. No duplicate teacher IDs
/// 3. Every teacher has at least one subject and one class-section
/// 4. No blank subject or class-section names
pub fn validate_roster(teachers: &[Teacher]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for t in teachers {
        let id = t.id.as_str();
        if id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingField,
                id,
                format!("Teacher '{}' has a blank id", t.name),
            ));
            continue;
        }
        if !ids.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                id,
                format!("Duplicate teacher ID: {id}"),
            ));
        }
        if t.subjects.is_empty() || t.subjects.iter().any(|s| s.trim().is_empty()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingField,
                id,
                format!("Teacher '{id}' has missing or blank subjects"),
            ));
        }
        if t.class_sections.is_empty()
            || t.class_sections.iter().any(|c| c.as_str().trim().is_empty())
        {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingField,
                id,
                format!("Teacher '{id}' has missing or blank class-sections"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates stored entries against the time grid.
///
/// Checks:
/// 1. No duplicate entry IDs
/// 2. Every (day, period) exists in the day's period table
/// 3. Lessons are not on special periods
/// 4. Lessons have a teacher
pub fn validate_entries(grid: &TimeGrid, entries: &[ScheduleEntry]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for e in entries {
        let id = e.id.as_str();
        if !ids.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                id,
                format!("Duplicate entry ID: {id}"),
            ));
        }

        if !grid.contains(e.day, e.period) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidPeriod,
                id,
                format!("Entry '{id}' uses period {} which {} does not have", e.period, e.day),
            ));
        }

        if e.kind == ActivityKind::Lesson {
            if e.period.is_special() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::LessonOnSpecialPeriod,
                    id,
                    format!("Lesson '{id}' is placed on special period {}", e.period),
                ));
            }
            if e.teacher_id.as_ref().map_or(true, |t| t.as_str().trim().is_empty()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MissingTeacher,
                    id,
                    format!("Lesson '{id}' has no teacher"),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
