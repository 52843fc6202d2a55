//! Error types for sectioned sources and flat projections.

use super::item::Shape;
use super::section::SectionId;

/// Result type alias for projection operations.
pub type ProjectionResult<T> = std::result::Result<T, ProjectionError>;

/// Result type alias for source model mutations.
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Errors raised while patching a flat projection.
///
/// None of these escape the change translator: each one aborts the patch
/// in progress and is recovered by a full rebuild.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    /// A computed index falls outside the rows it addresses.
    #[error("index {index} is out of range for {len} rows")]
    IndexOutOfRange { index: usize, len: usize },

    /// A flat range falls outside the store.
    #[error("flat range of {count} rows at {start} is out of range for {len} rows")]
    RangeOutOfBounds {
        start: usize,
        count: usize,
        len: usize,
    },

    /// An in-place replacement references a shape with no code yet.
    #[error("shape '{shape}' has no classification code")]
    UnclassifiedShape { shape: Shape },

    /// An item event names a section that is not materialized.
    #[error("section {section} is not present in the projection")]
    SectionNotFound { section: SectionId },

    /// The rows at a computed position do not belong to the expected section.
    #[error("rows at flat index {index} do not belong to the expected section")]
    SectionMismatch { index: usize },

    /// The event does not map deterministically to a flat range.
    #[error("ambiguous event: {reason}")]
    AmbiguousEvent { reason: &'static str },

    /// A multi-section batch arrived while batches are not accepted.
    #[error("section-level event carries {count} sections, expected one")]
    SectionBatch { count: usize },
}

impl ProjectionError {
    /// Create an ambiguous-event error.
    pub fn ambiguous(reason: &'static str) -> Self {
        Self::AmbiguousEvent { reason }
    }

    /// Returns `true` for the designed fallback path rather than a desync.
    pub fn is_designed_fallback(&self) -> bool {
        matches!(self, Self::AmbiguousEvent { .. })
    }
}

/// Errors raised by source model mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The index is outside the collection.
    #[error("index {index} is out of range for {len} elements")]
    IndexOutOfRange { index: usize, len: usize },

    /// The section is already part of the collection.
    #[error("section {section} is already present")]
    DuplicateSection { section: SectionId },
}

/// Errors raised while loading a [`ProjectionConfig`](super::ProjectionConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("invalid projection config: {0}")]
    Parse(#[from] toml::de::Error),
}
