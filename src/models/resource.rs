//! Roster resources.
//!
//! The three resource axes along which double-booking is checked:
//! teachers, class-sections, and shared rooms. A class-section's own
//! classroom (its homeroom) is exempt from the room axis.
//!
//! Class-sections also carry the program **track** used for approval
//! scoping. The track is parsed from the section name: grade tokens
//! (roman numerals `X`, `XI`, `XII` or plain digits) are skipped and the
//! first remaining token is the track, so `"XII TKJ 1"` belongs to `TKJ`.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Creates an id from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrowed id text.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

id_newtype!(
    /// Teacher identifier.
    TeacherId
);
id_newtype!(
    /// Class-section (cohort) identifier, e.g. `"XI RPL 2"`.
    ClassSectionId
);
id_newtype!(
    /// Shared specialty room identifier.
    RoomId
);

/// Program/department a class-section and a reviewer belong to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Track(String);

impl Track {
    /// Creates a track, normalized to upper case.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ClassSectionId {
    /// Derives the section's track from its name.
    ///
    /// Returns `None` when only grade tokens (or nothing) remain.
    pub fn track(&self) -> Option<Track> {
        self.0
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .filter(|t| !t.is_empty())
            .find(|t| !is_grade_token(t))
            .map(Track::new)
    }
}

fn is_grade_token(token: &str) -> bool {
    let upper = token.to_uppercase();
    matches!(upper.as_str(), "X" | "XI" | "XII" | "XIII")
        || token.chars().all(|c| c.is_ascii_digit())
}

/// Where an entry takes place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Room {
    /// The class-section's own classroom. Exempt from the room axis.
    #[default]
    Homeroom,
    /// A shared specialty room (lab, workshop). Participates in the room axis.
    Shared(RoomId),
}

impl Room {
    /// Creates a shared room reference.
    pub fn shared(id: impl Into<String>) -> Self {
        Room::Shared(RoomId::new(id))
    }

    /// Room id if this room participates in the room axis.
    pub fn shared_id(&self) -> Option<&RoomId> {
        match self {
            Room::Homeroom => None,
            Room::Shared(id) => Some(id),
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Room::Homeroom => f.write_str("homeroom"),
            Room::Shared(id) => id.fmt(f),
        }
    }
}

/// A teacher with their teaching load.
///
/// Every combination of `subjects × class_sections` is one
/// (teacher, subject, class-section) triple for generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: TeacherId,
    /// Display name.
    pub name: String,
    /// Subjects taught.
    pub subjects: Vec<String>,
    /// Assigned class-sections.
    pub class_sections: Vec<ClassSectionId>,
    /// Inactive teachers are excluded from generation.
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl Teacher {
    /// Creates an active teacher with an empty load.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: TeacherId::new(id),
            name: String::new(),
            subjects: Vec::new(),
            class_sections: Vec::new(),
            active: true,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subjects.push(subject.into());
        self
    }

    /// Adds an assigned class-section.
    pub fn with_class_section(mut self, section: impl Into<String>) -> Self {
        self.class_sections.push(ClassSectionId::new(section));
        self
    }

    /// Marks the teacher inactive.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Number of (subject, class-section) pairs taught.
    pub fn load(&self) -> usize {
        self.subjects.len() * self.class_sections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_parsing() {
        assert_eq!(ClassSectionId::from("XII TKJ 1").track(), Some(Track::new("TKJ")));
        assert_eq!(ClassSectionId::from("x rpl 2").track(), Some(Track::new("RPL")));
        assert_eq!(ClassSectionId::from("11-AKL-3").track(), Some(Track::new("AKL")));
        assert_eq!(ClassSectionId::from("XI 2").track(), None);
        assert_eq!(ClassSectionId::from("").track(), None);
    }

    #[test]
    fn test_track_normalized() {
        assert_eq!(Track::new(" tkj "), Track::new("TKJ"));
        assert_eq!(Track::new("tkj").to_string(), "TKJ");
    }

    #[test]
    fn test_room_axis_membership() {
        assert_eq!(Room::Homeroom.shared_id(), None);
        let lab = Room::shared("LAB-1");
        assert_eq!(lab.shared_id(), Some(&RoomId::new("LAB-1")));
        assert_eq!(lab.to_string(), "LAB-1");
    }

    #[test]
    fn test_teacher_builder() {
        let t = Teacher::new("T1")
            .with_name("Bu Sari")
            .with_subject("Matematika")
            .with_subject("Fisika")
            .with_class_section("X TKJ 1")
            .with_class_section("X TKJ 2")
            .with_class_section("X RPL 1");

        assert_eq!(t.id, TeacherId::new("T1"));
        assert!(t.active);
        assert_eq!(t.load(), 6);
        assert!(!t.clone().inactive().active);
    }

    #[test]
    fn test_ids_serialize_transparent() {
        let json = serde_json::to_string(&TeacherId::new("T1")).unwrap();
        assert_eq!(json, "\"T1\"");
        let room: Room = serde_json::from_str("{\"shared\":\"LAB\"}").unwrap();
        assert_eq!(room, Room::shared("LAB"));
    }
}
