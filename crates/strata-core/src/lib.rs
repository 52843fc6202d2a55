//! Core systems for strata.
//!
//! This crate provides the foundational components shared by the strata
//! model crates:
//!
//! - **Signal/Slot System**: Type-safe, synchronous change notification
//! - **Logging**: Tracing targets, performance spans and tree formatting options
//!
//! # Signal/Slot Example
//!
//! ```
//! use strata_core::Signal;
//!
//! // Create a signal that notifies when rows are removed
//! let range_removed = Signal::<(usize, usize)>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = range_removed.connect(|(start, count)| {
//!     println!("removed {count} rows at {start}");
//! });
//!
//! // Emit the signal
//! range_removed.emit((0, 2));
//!
//! // Disconnect when done
//! range_removed.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;

pub use logging::{PerfSpan, TreeFormatOptions, TreeStyle};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
