//! Projection settings.
//!
//! Settings are plain serde structs, so hosts can embed them in their own
//! configuration files. [`ProjectionConfig::from_toml_str`] reads a
//! standalone TOML document:
//!
//! ```
//! use strata::model::{ProjectionConfig, SectionBatchPolicy};
//!
//! let config = ProjectionConfig::from_toml_str(r#"
//! section_batches = "single"
//! verify_patches = true
//! "#).unwrap();
//!
//! assert_eq!(config.section_batches, SectionBatchPolicy::Single);
//! assert!(config.verify_patches);
//! ```

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// How a section-level event carrying several sections is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionBatchPolicy {
    /// Patch every section of the batch; one notification covers them all.
    #[default]
    Expand,
    /// Only single-section events are patched; batches force a rebuild.
    Single,
}

/// Settings for a [`FlatProjection`](super::FlatProjection).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Handling of multi-section add/remove events.
    pub section_batches: SectionBatchPolicy,

    /// Compare every incremental patch against a rebuild and heal on mismatch.
    ///
    /// This costs a full derivation per event; meant for tests and debugging.
    pub verify_patches: bool,
}

impl ProjectionConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Sets the section batch policy.
    pub fn with_section_batches(mut self, policy: SectionBatchPolicy) -> Self {
        self.section_batches = policy;
        self
    }

    /// Enables or disables patch verification.
    pub fn with_verify_patches(mut self, verify: bool) -> Self {
        self.verify_patches = verify;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProjectionConfig::new();
        assert_eq!(config.section_batches, SectionBatchPolicy::Expand);
        assert!(!config.verify_patches);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ProjectionConfig::from_toml_str("").unwrap();
        assert_eq!(config, ProjectionConfig::default());
    }

    #[test]
    fn test_builder() {
        let config = ProjectionConfig::new()
            .with_section_batches(SectionBatchPolicy::Single)
            .with_verify_patches(true);
        assert_eq!(config.section_batches, SectionBatchPolicy::Single);
        assert!(config.verify_patches);
    }

    #[test]
    fn test_invalid_policy() {
        let err = ProjectionConfig::from_toml_str("section_batches = \"sometimes\"").unwrap_err();
        assert!(err.to_string().starts_with("invalid projection config"));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = ProjectionConfig::new().with_verify_patches(true);
        let text = toml::to_string(&config).unwrap();
        assert_eq!(ProjectionConfig::from_toml_str(&text).unwrap(), config);
    }
}
