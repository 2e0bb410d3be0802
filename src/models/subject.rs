//! Subject policy catalog.
//!
//! Maps subject names to weekly hours, category, priority weight and
//! room. Explicit entries always win; keyword substring matching is the
//! last-resort default for subjects the table does not list.
//!
//! # Default Policy
//!
//! | Category | Keyword match | Weekly hours | Priority bonus |
//! |----------|---------------|--------------|----------------|
//! | Core | core-academic keyword | 4 | +10 |
//! | Practical | hands-on/workshop keyword | 4 | +5 |
//! | General | none | 2 | 0 |
//!
//! These numbers are placeholder policy. Schools override them per
//! subject through [`EngineConfig`](crate::config::EngineConfig).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Room, RoomId};

/// Subject classification used for hours and eviction priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectCategory {
    /// Core academic subject (mathematics, languages, sciences).
    Core,
    /// Practical / hands-on subject (workshops, labs).
    Practical,
    #[default]
    General,
}

impl SubjectCategory {
    /// Eviction-priority bonus for the category.
    pub fn priority_bonus(self) -> i32 {
        match self {
            SubjectCategory::Core => 10,
            SubjectCategory::Practical => 5,
            SubjectCategory::General => 0,
        }
    }
}

/// Resolved policy for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectPolicy {
    /// Required periods per week for each class-section.
    pub hours: u32,
    /// Category.
    #[serde(default)]
    pub category: SubjectCategory,
    /// Base priority weight added before category bonus.
    #[serde(default)]
    pub weight: i32,
    /// Shared room the subject is taught in; `None` = homeroom.
    #[serde(default)]
    pub room: Option<RoomId>,
}

impl SubjectPolicy {
    /// Creates a policy with no weight and homeroom placement.
    pub fn new(hours: u32, category: SubjectCategory) -> Self {
        Self {
            hours,
            category,
            weight: 0,
            room: None,
        }
    }

    /// Sets the base priority weight.
    pub fn with_weight(mut self, weight: i32) -> Self {
        self.weight = weight;
        self
    }

    /// Places the subject in a shared room.
    pub fn in_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(RoomId::new(room));
        self
    }

    /// Base eviction priority: weight plus category bonus.
    pub fn priority(&self) -> i32 {
        self.weight + self.category.priority_bonus()
    }

    /// Room entries of this subject use.
    pub fn placement_room(&self) -> Room {
        match &self.room {
            Some(id) => Room::Shared(id.clone()),
            None => Room::Homeroom,
        }
    }
}

/// Subject → policy lookup table with keyword fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectCatalog {
    /// Explicit per-subject policies (matched case-insensitively).
    #[serde(default)]
    pub subjects: HashMap<String, SubjectPolicy>,
    /// Substrings classifying unlisted subjects as core.
    #[serde(default = "default_core_keywords")]
    pub core_keywords: Vec<String>,
    /// Substrings classifying unlisted subjects as practical.
    #[serde(default = "default_practical_keywords")]
    pub practical_keywords: Vec<String>,
    /// Weekly hours of unlisted core/practical subjects.
    #[serde(default = "default_intensive_hours")]
    pub intensive_hours: u32,
    /// Weekly hours of unlisted general subjects.
    #[serde(default = "default_general_hours")]
    pub general_hours: u32,
}

fn default_core_keywords() -> Vec<String> {
    [
        "matematika",
        "bahasa indonesia",
        "bahasa inggris",
        "fisika",
        "kimia",
        "biologi",
        "ipa",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_practical_keywords() -> Vec<String> {
    ["praktik", "workshop", "bengkel", "produktif", "kejuruan", "lab"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_intensive_hours() -> u32 {
    4
}

fn default_general_hours() -> u32 {
    2
}

impl Default for SubjectCatalog {
    fn default() -> Self {
        Self {
            subjects: HashMap::new(),
            core_keywords: default_core_keywords(),
            practical_keywords: default_practical_keywords(),
            intensive_hours: default_intensive_hours(),
            general_hours: default_general_hours(),
        }
    }
}

impl SubjectCatalog {
    /// Creates a catalog with the default keyword policy and no explicit entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an explicit subject policy.
    pub fn with_subject(mut self, name: impl Into<String>, policy: SubjectPolicy) -> Self {
        self.subjects.insert(name.into(), policy);
        self
    }

    /// Resolves the policy for a subject.
    ///
    /// Explicit entries first, then keyword classification.
    pub fn policy(&self, subject: &str) -> SubjectPolicy {
        let needle = subject.trim().to_lowercase();
        if let Some(policy) = self
            .subjects
            .iter()
            .find(|(name, _)| name.trim().to_lowercase() == needle)
            .map(|(_, p)| p)
        {
            return policy.clone();
        }

        let category = self.classify(&needle);
        let hours = match category {
            SubjectCategory::General => self.general_hours,
            _ => self.intensive_hours,
        };
        SubjectPolicy::new(hours, category)
    }

    /// Required weekly periods for a subject.
    pub fn weekly_hours(&self, subject: &str) -> u32 {
        self.policy(subject).hours
    }

    fn classify(&self, lowered: &str) -> SubjectCategory {
        let hit = |keywords: &[String]| {
            keywords
                .iter()
                .any(|k| !k.is_empty() && lowered.contains(&k.to_lowercase()))
        };
        if hit(&self.core_keywords) {
            SubjectCategory::Core
        } else if hit(&self.practical_keywords) {
            SubjectCategory::Practical
        } else {
            SubjectCategory::General
        }
    }
}
