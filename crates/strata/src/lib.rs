//! Strata - flat row projections of sectioned collections.
//!
//! This is the main crate that re-exports the core primitives and provides
//! the sectioned model and projection types.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use strata::model::{FlatProjection, Section, SectionedModel};
//!
//! let model = Arc::new(SectionedModel::new());
//! let projection = FlatProjection::attach(model.clone());
//!
//! model.push_section(Arc::new(Section::new("Account"))).unwrap();
//! assert_eq!(projection.rows().codes(), vec![0, 1]);
//! ```

pub use strata_core::*;

pub mod model;

pub use model::{
    ChangeAction, CollectionChange, FlatProjection, Item, ItemChange, ItemRef, ProjectionConfig,
    RowKind, RowsChange, Section, SectionSource, SectionedModel, Shape,
};
