//! TOML-based engine configuration.
//!
//! ```toml
//! term = "2025/2026-ganjil"
//!
//! [generate]
//! clear_existing = false
//! max_retries = 3
//! retry_policy = { forget_recent = 2 }
//!
//! [catalog]
//! general_hours = 2
//!
//! [catalog.subjects."Praktik Jaringan"]
//! hours = 6
//! category = "practical"
//! room = "LAB-TKJ"
//! ```
//!
//! Every field is optional; [`EngineConfig::default`] is the built-in
//! policy.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::SubjectCatalog;
use crate::scheduler::{GenerateOptions, RetryPolicy};

/// Engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Term tag written on generated entries.
    #[serde(default)]
    pub term: String,
    /// Defaults for [`Timetable::generate`](crate::timetable::Timetable::generate).
    #[serde(default)]
    pub generate: GenerateOptions,
    /// Subject policy table.
    #[serde(default)]
    pub catalog: SubjectCatalog,
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Rejects values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.generate;
        if g.max_block_len == 0 {
            return Err(ConfigError::Invalid("generate.max_block_len must be at least 1".into()));
        }
        if let RetryPolicy::ForgetRecent(0) = g.retry_policy {
            return Err(ConfigError::Invalid(
                "generate.retry_policy forget_recent must be at least 1".into(),
            ));
        }
        let c = &self.catalog;
        if c.intensive_hours == 0 || c.general_hours == 0 {
            return Err(ConfigError::Invalid("catalog default hours must be at least 1".into()));
        }
        if let Some((name, _)) = c.subjects.iter().find(|(_, p)| p.hours == 0) {
            return Err(ConfigError::Invalid(format!("subject '{name}' has zero hours")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Room, SubjectCategory};

    #[test]
    fn test_empty_document_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert!(config.term.is_empty());
        assert_eq!(config.generate, GenerateOptions::default());
        assert_eq!(config.catalog.weekly_hours("Matematika"), 4);
        assert_eq!(config.catalog.weekly_hours("Seni Budaya"), 2);
    }

    #[test]
    fn test_full_document() {
        let config = EngineConfig::from_toml_str(
            r#"
            term = "2025/2026-ganjil"

            [generate]
            clear_existing = true
            max_retries = 5
            retry_policy = "forget_all"

            [catalog]
            general_hours = 3

            [catalog.subjects."Praktik Jaringan"]
            hours = 6
            category = "practical"
            weight = 2
            room = "LAB-TKJ"
            "#,
        )
        .unwrap();

        assert_eq!(config.term, "2025/2026-ganjil");
        assert!(config.generate.clear_existing);
        assert_eq!(config.generate.max_retries, 5);
        assert_eq!(config.generate.retry_policy, RetryPolicy::ForgetAll);
        // Unspecified options keep their defaults
        assert!(config.generate.prefer_consecutive);
        assert_eq!(config.generate.max_block_len, 3);

        let policy = config.catalog.policy("praktik jaringan");
        assert_eq!(policy.hours, 6);
        assert_eq!(policy.category, SubjectCategory::Practical);
        assert_eq!(policy.priority(), 7);
        assert_eq!(policy.placement_room(), Room::shared("LAB-TKJ"));
        assert_eq!(config.catalog.weekly_hours("Seni Budaya"), 3);
    }

    #[test]
    fn test_forget_recent_table() {
        let config = EngineConfig::from_toml_str(
            r#"
            [generate]
            retry_policy = { forget_recent = 4 }
            "#,
        )
        .unwrap();
        assert_eq!(config.generate.retry_policy, RetryPolicy::ForgetRecent(4));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let zero_block = EngineConfig::from_toml_str("[generate]\nmax_block_len = 0\n");
        assert!(matches!(zero_block, Err(ConfigError::Invalid(_))));

        let zero_hours = EngineConfig::from_toml_str("[catalog.subjects.Fisika]\nhours = 0\n");
        assert!(matches!(zero_hours, Err(ConfigError::Invalid(_))));

        let garbage = EngineConfig::from_toml_str("term = [");
        assert!(matches!(garbage, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = EngineConfig::load("/nonexistent/jadwal.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
