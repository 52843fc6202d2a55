//! Logging and debugging facilities for strata.
//!
//! This module provides:
//! - Target and span names for the `tracing` integration
//! - Formatting options for tree-shaped debug dumps
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! strata uses the `tracing` crate for instrumentation. To see logs,
//! you need to install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("strata::projection=debug")
//!         .init();
//!
//!     // Your application code...
//! }
//! ```

/// Span names used throughout strata for tracing.
pub mod span_names {
    /// Full rebuild of a projection.
    pub const REBUILD: &str = "strata::rebuild";
    /// Incremental patch of a projection.
    pub const PATCH: &str = "strata::patch";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "strata_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "strata::signal";
    /// Sectioned source model target.
    pub const SOURCE: &str = "strata::source";
    /// Flat projection target.
    pub const PROJECTION: &str = "strata::projection";
    /// Performance spans target.
    pub const PERF: &str = "strata::perf";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

impl TreeStyle {
    /// Returns the connector drawn in front of a child node.
    pub fn connector(self, is_last: bool) -> &'static str {
        match (self, is_last) {
            (Self::Ascii, false) => "+-- ",
            (Self::Ascii, true) => "`-- ",
            (Self::Unicode, false) => "\u{251c}\u{2500}\u{2500} ",
            (Self::Unicode, true) => "\u{2514}\u{2500}\u{2500} ",
            (Self::Compact, _) => "- ",
        }
    }
}

/// Configuration for tree-shaped debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show flat indices.
    pub show_indices: bool,
    /// Whether to show classification codes.
    pub show_codes: bool,
    /// Whether to show item type names.
    pub show_types: bool,
    /// Maximum number of items listed per section (None for unlimited).
    pub max_items: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_indices: true,
            show_codes: true,
            show_types: true,
            max_items: None,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_indices: false,
            show_codes: false,
            show_types: false,
            ..Default::default()
        }
    }

    /// Sets the tree style.
    pub fn with_style(mut self, style: TreeStyle) -> Self {
        self.style = style;
        self
    }

    /// Limits how many items are listed per section.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Macros for common tracing patterns.
///
/// These are just wrappers around the `tracing` crate macros with
/// consistent target naming.
#[macro_export]
macro_rules! strata_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[macro_export]
macro_rules! strata_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[macro_export]
macro_rules! strata_info {
    ($($arg:tt)*) => {
        tracing::info!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[macro_export]
macro_rules! strata_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[macro_export]
macro_rules! strata_error {
    ($($arg:tt)*) => {
        tracing::error!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectors() {
        assert_eq!(TreeStyle::Ascii.connector(false), "+-- ");
        assert_eq!(TreeStyle::Ascii.connector(true), "`-- ");
        assert_eq!(TreeStyle::Compact.connector(true), "- ");
        assert!(TreeStyle::Unicode.connector(true).starts_with('\u{2514}'));
    }

    #[test]
    fn test_minimal_options() {
        let options = TreeFormatOptions::minimal().with_max_items(3);
        assert!(!options.show_indices);
        assert!(!options.show_codes);
        assert_eq!(options.max_items, Some(3));
        assert_eq!(options.style, TreeStyle::Unicode);
    }

    #[test]
    fn test_targets_share_the_crate_prefix() {
        for target in [
            targets::CORE,
            targets::SIGNAL,
            targets::SOURCE,
            targets::PROJECTION,
            targets::PERF,
        ] {
            assert!(target.starts_with("strata"), "{target}");
        }
        strata_debug!(checked = true, "macro routes through the core target");
    }

    #[test]
    fn test_perf_span() {
        let _span = PerfSpan::new("test_operation");
        strata_trace!(inside = true, "inside perf span");
    }
}
