//! Sectioned models and their flat projections.
//!
//! A grouped settings list is naturally a tree: sections, each holding a
//! header, a run of items and a footer. List widgets want a flat sequence
//! addressed by a single index. This module keeps the two in step:
//!
//! - Sources publish structured change events
//! - The projection patches only the affected flat range
//! - Consumers hear one range notification per event
//!
//! # Core Types
//!
//! - `Section`: An ordered run of items with a title and optional custom boundary views
//! - `SectionSource`: The trait hierarchical sources implement
//! - `SectionedModel`: The stock source, an ordered list of sections
//! - `CollectionChange` / `ItemChange`: Structured change events
//! - `FlatProjection`: The flat, incrementally maintained row sequence
//! - `ViewTypeRegistry`: Stable integer codes per item shape
//! - `RowsDebug`: Tree-shaped dumps of the rows
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use strata::model::{FlatProjection, ItemRef, RowKind, Section, SectionedModel};
//!
//! let a: ItemRef = Arc::new("A".to_string());
//! let b: ItemRef = Arc::new("B".to_string());
//! let general = Arc::new(Section::new("General").with_items(vec![a, b]));
//! let model = Arc::new(SectionedModel::with_sections(vec![general.clone()]).unwrap());
//! let projection = FlatProjection::attach(model);
//!
//! projection.signals().range_inserted.connect(|(start, count)| {
//!     println!("{count} rows inserted at {start}");
//! });
//!
//! let c: ItemRef = Arc::new("C".to_string());
//! general.insert(1, c).unwrap();
//!
//! assert_eq!(projection.kind_at(0), Some(RowKind::TextHeader));
//! assert_eq!(projection.len(), 5);
//! ```
//!
//! # Architecture Overview
//!
//! ```text
//! ┌───────────────┐  sections_changed  ┌────────────────┐  range_*   ┌──────────┐
//! │ SectionSource │───────────────────>│ FlatProjection │───────────>│ Consumer │
//! │   (sections)  │  items_changed     │ RowStore       │            │          │
//! └───────────────┘───────────────────>│ ViewTypeReg.   │<───────────│          │
//!                                      └────────────────┘  rows()    └──────────┘
//! ```

mod change;
mod config;
mod debug;
mod error;
mod item;
mod projection;
mod registry;
mod row;
mod section;
mod source;
mod store;

pub use change::{ChangeAction, CollectionChange, ItemChange};
pub use config::{ProjectionConfig, SectionBatchPolicy};
pub use debug::RowsDebug;
pub use error::{ConfigError, ProjectionError, ProjectionResult, SourceError, SourceResult};
pub use item::{Item, ItemRef, Shape};
pub use projection::{FlatProjection, ProjectionSignals, RowsChange};
pub use registry::ViewTypeRegistry;
pub use row::{RESERVED_CODES, Row, RowKind, RowSnapshot};
pub use section::{Section, SectionId};
pub use source::{SectionSource, SectionedModel, SourceSignals};
pub use store::RowStore;
