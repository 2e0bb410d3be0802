//! Weekly time grid.
//!
//! Defines the school week: five days mapped onto two day types, each
//! with an ordered period table mixing lesson periods and fixed special
//! periods (assembly, feedback, communal cleaning, breaks).
//!
//! # Time Model
//! Period times are minutes since midnight, local school time. A
//! [`TimeRange`] is half-open: `[start, end)`.
//!
//! # Day Types
//!
//! | Day type | Days | Order |
//! |----------|------|-------|
//! | Regular | Senin–Kamis | assembly, 1–4, break, 5–7, break, 8–11 |
//! | Abbreviated | Jumat | feedback, green clean, break, 1–3, long break, 4–7 |

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// A time interval [start, end) in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Interval start (minutes, inclusive).
    pub start_min: u16,
    /// Interval end (minutes, exclusive).
    pub end_min: u16,
}

impl TimeRange {
    /// Creates a range from minute offsets.
    pub fn new(start_min: u16, end_min: u16) -> Self {
        Self { start_min, end_min }
    }

    /// Creates a range from `(hour, minute)` pairs.
    pub fn hm(start: (u16, u16), end: (u16, u16)) -> Self {
        Self::new(start.0 * 60 + start.1, end.0 * 60 + end.1)
    }

    /// Duration in minutes.
    #[inline]
    pub fn duration_min(&self) -> u16 {
        self.end_min.saturating_sub(self.start_min)
    }

    /// Whether a minute offset falls within this range.
    #[inline]
    pub fn contains(&self, minute: u16) -> bool {
        minute >= self.start_min && minute < self.end_min
    }

    /// Whether two ranges overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_min < other.end_min && other.start_min < self.end_min
    }

    /// Start as a wall-clock time.
    pub fn start_time(&self) -> NaiveTime {
        NaiveTime::MIN + TimeDelta::minutes(i64::from(self.start_min))
    }

    /// End as a wall-clock time.
    pub fn end_time(&self) -> NaiveTime {
        NaiveTime::MIN + TimeDelta::minutes(i64::from(self.end_min))
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start_min / 60,
            self.start_min % 60,
            self.end_min / 60,
            self.end_min % 60
        )
    }
}

/// A school day.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Day {
    Senin,
    Selasa,
    Rabu,
    Kamis,
    Jumat,
}

impl Day {
    /// All school days, Monday first.
    pub const ALL: [Day; 5] = [Day::Senin, Day::Selasa, Day::Rabu, Day::Kamis, Day::Jumat];

    /// Day type governing this day's period table.
    pub fn day_type(self) -> DayType {
        match self {
            Day::Jumat => DayType::Abbreviated,
            _ => DayType::Regular,
        }
    }

    /// Day name as used on printed timetables.
    pub fn name(self) -> &'static str {
        match self {
            Day::Senin => "Senin",
            Day::Selasa => "Selasa",
            Day::Rabu => "Rabu",
            Day::Kamis => "Kamis",
            Day::Jumat => "Jumat",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a day name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown school day: {0}")]
pub struct ParseDayError(pub String);

impl FromStr for Day {
    type Err = ParseDayError;

    /// Accepts Indonesian and English day names, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "senin" | "monday" | "mon" => Ok(Day::Senin),
            "selasa" | "tuesday" | "tue" => Ok(Day::Selasa),
            "rabu" | "wednesday" | "wed" => Ok(Day::Rabu),
            "kamis" | "thursday" | "thu" => Ok(Day::Kamis),
            "jumat" | "friday" | "fri" => Ok(Day::Jumat),
            _ => Err(ParseDayError(s.to_string())),
        }
    }
}

/// Period table selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayType {
    /// Senin–Kamis: opening assembly, 11 lesson periods, 2 breaks.
    Regular,
    /// Jumat: feedback and green-clean slots, 7 lesson periods, 2 breaks.
    Abbreviated,
}

/// Non-teaching period kinds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SpecialKind {
    /// Monday–Thursday opening assembly (upacara).
    Assembly,
    /// Friday homeroom feedback session.
    FeedBack,
    /// Friday communal cleaning activity.
    GreenClean,
    /// First break (istirahat 1).
    Break1,
    /// Second break (istirahat 2).
    Break2,
}

impl SpecialKind {
    /// Subject label used for materialized fixed entries.
    pub fn label(self) -> &'static str {
        match self {
            SpecialKind::Assembly => "Upacara",
            SpecialKind::FeedBack => "Feed Back",
            SpecialKind::GreenClean => "Green Clean",
            SpecialKind::Break1 => "Istirahat 1",
            SpecialKind::Break2 => "Istirahat 2",
        }
    }
}

/// Period key: a lesson ordinal or a special slot tag.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKey {
    Lesson(u8),
    Special(SpecialKind),
}

impl PeriodKey {
    /// Whether this key denotes a non-assignable special period.
    #[inline]
    pub fn is_special(self) -> bool {
        matches!(self, PeriodKey::Special(_))
    }

    /// Lesson ordinal, if this is a lesson period.
    pub fn lesson(self) -> Option<u8> {
        match self {
            PeriodKey::Lesson(n) => Some(n),
            PeriodKey::Special(_) => None,
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKey::Lesson(n) => write!(f, "{n}"),
            PeriodKey::Special(kind) => f.write_str(kind.label()),
        }
    }
}

/// A named time slot within a day type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    /// Period key.
    pub key: PeriodKey,
    /// Wall-clock range.
    pub range: TimeRange,
    /// Display label.
    pub label: String,
}

impl Period {
    /// Creates a lesson period.
    pub fn lesson(n: u8, range: TimeRange) -> Self {
        Self {
            key: PeriodKey::Lesson(n),
            range,
            label: format!("Jam ke-{n}"),
        }
    }

    /// Creates a special (non-assignable) period.
    pub fn special(kind: SpecialKind, range: TimeRange) -> Self {
        Self {
            key: PeriodKey::Special(kind),
            range,
            label: kind.label().to_string(),
        }
    }

    /// Whether subjects may not be assigned here.
    #[inline]
    pub fn is_special(&self) -> bool {
        self.key.is_special()
    }
}

/// The weekly period structure.
///
/// Holds one ordered period table per [`DayType`] and the lesson range
/// treated as the midday block when scoring placements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeGrid {
    regular: Vec<Period>,
    abbreviated: Vec<Period>,
    midday_regular: (u8, u8),
    midday_abbreviated: (u8, u8),
}

impl TimeGrid {
    /// Creates a grid from explicit period tables.
    ///
    /// Midday blocks default to the middle third of each day's lessons.
    pub fn new(regular: Vec<Period>, abbreviated: Vec<Period>) -> Self {
        let midday_regular = middle_third(&regular);
        let midday_abbreviated = middle_third(&abbreviated);
        Self {
            regular,
            abbreviated,
            midday_regular,
            midday_abbreviated,
        }
    }

    /// The standard school week.
    pub fn standard() -> Self {
        use SpecialKind::*;
        let regular = vec![
            Period::special(Assembly, TimeRange::hm((7, 0), (7, 30))),
            Period::lesson(1, TimeRange::hm((7, 30), (8, 10))),
            Period::lesson(2, TimeRange::hm((8, 10), (8, 50))),
            Period::lesson(3, TimeRange::hm((8, 50), (9, 30))),
            Period::lesson(4, TimeRange::hm((9, 30), (10, 10))),
            Period::special(Break1, TimeRange::hm((10, 10), (10, 25))),
            Period::lesson(5, TimeRange::hm((10, 25), (11, 5))),
            Period::lesson(6, TimeRange::hm((11, 5), (11, 45))),
            Period::lesson(7, TimeRange::hm((11, 45), (12, 25))),
            Period::special(Break2, TimeRange::hm((12, 25), (13, 0))),
            Period::lesson(8, TimeRange::hm((13, 0), (13, 40))),
            Period::lesson(9, TimeRange::hm((13, 40), (14, 20))),
            Period::lesson(10, TimeRange::hm((14, 20), (15, 0))),
            Period::lesson(11, TimeRange::hm((15, 0), (15, 40))),
        ];
        let abbreviated = vec![
            Period::special(FeedBack, TimeRange::hm((7, 0), (7, 30))),
            Period::special(GreenClean, TimeRange::hm((7, 30), (8, 0))),
            Period::special(Break1, TimeRange::hm((8, 0), (8, 15))),
            Period::lesson(1, TimeRange::hm((8, 15), (8, 50))),
            Period::lesson(2, TimeRange::hm((8, 50), (9, 25))),
            Period::lesson(3, TimeRange::hm((9, 25), (10, 0))),
            Period::special(Break2, TimeRange::hm((10, 0), (11, 0))),
            Period::lesson(4, TimeRange::hm((11, 0), (11, 35))),
            Period::lesson(5, TimeRange::hm((11, 35), (12, 10))),
            Period::lesson(6, TimeRange::hm((12, 10), (12, 45))),
            Period::lesson(7, TimeRange::hm((12, 45), (13, 20))),
        ];
        Self {
            regular,
            abbreviated,
            midday_regular: (4, 7),
            midday_abbreviated: (3, 5),
        }
    }

    /// Overrides the midday lesson block for a day type (inclusive).
    pub fn with_midday(mut self, day_type: DayType, first: u8, last: u8) -> Self {
        match day_type {
            DayType::Regular => self.midday_regular = (first, last),
            DayType::Abbreviated => self.midday_abbreviated = (first, last),
        }
        self
    }

    /// School days in scan order.
    pub fn days(&self) -> &'static [Day] {
        &Day::ALL
    }

    /// Ordered period table of a day type.
    pub fn periods(&self, day_type: DayType) -> &[Period] {
        match day_type {
            DayType::Regular => &self.regular,
            DayType::Abbreviated => &self.abbreviated,
        }
    }

    /// Ordered period table for a day.
    pub fn periods_for(&self, day: Day) -> &[Period] {
        self.periods(day.day_type())
    }

    /// Lesson periods of a day, ascending.
    pub fn lesson_periods(&self, day: Day) -> impl Iterator<Item = &Period> {
        self.periods_for(day).iter().filter(|p| !p.is_special())
    }

    /// Special periods of a day, in table order.
    pub fn special_periods(&self, day: Day) -> impl Iterator<Item = &Period> {
        self.periods_for(day).iter().filter(|p| p.is_special())
    }

    /// Looks up a period.
    pub fn period(&self, day: Day, key: PeriodKey) -> Option<&Period> {
        self.periods_for(day).iter().find(|p| p.key == key)
    }

    /// Whether the day's table contains the key.
    pub fn contains(&self, day: Day, key: PeriodKey) -> bool {
        self.period(day, key).is_some()
    }

    /// Every lesson slot of the week, Monday first, periods ascending.
    pub fn lesson_slots(&self) -> Vec<(Day, PeriodKey)> {
        self.days()
            .iter()
            .flat_map(|&day| self.lesson_periods(day).map(move |p| (day, p.key)))
            .collect()
    }

    /// Maximal runs of adjacent lesson periods not split by a special period.
    pub fn lesson_blocks(&self, day: Day) -> Vec<Vec<PeriodKey>> {
        let mut blocks = Vec::new();
        let mut current = Vec::new();
        for p in self.periods_for(day) {
            if p.is_special() {
                if !current.is_empty() {
                    blocks.push(std::mem::take(&mut current));
                }
            } else {
                current.push(p.key);
            }
        }
        if !current.is_empty() {
            blocks.push(current);
        }
        blocks
    }

    /// Whether a lesson falls inside the day's midday block.
    pub fn is_midday(&self, day: Day, key: PeriodKey) -> bool {
        let (first, last) = match day.day_type() {
            DayType::Regular => self.midday_regular,
            DayType::Abbreviated => self.midday_abbreviated,
        };
        key.lesson().is_some_and(|n| n >= first && n <= last)
    }

    /// Whether a lesson is the first or last lesson of its day.
    pub fn is_edge(&self, day: Day, key: PeriodKey) -> bool {
        let mut lessons = self.lesson_periods(day).map(|p| p.key);
        let first = lessons.next();
        let last = lessons.last().or(first);
        first == Some(key) || last == Some(key)
    }
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self::standard()
    }
}

fn middle_third(periods: &[Period]) -> (u8, u8) {
    let lessons: Vec<u8> = periods.iter().filter_map(|p| p.key.lesson()).collect();
    if lessons.is_empty() {
        return (0, 0);
    }
    let third = lessons.len() / 3;
    let last = lessons.len().saturating_sub(third + 1).max(third);
    (lessons[third], lessons[last])
}
