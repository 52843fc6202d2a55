//! Flat projection of a sectioned source.
//!
//! `FlatProjection` mirrors a [`SectionSource`] as one ordered sequence of
//! rows: section 0 header, section 0 items, section 0 footer, section 1
//! header, and so on. It listens to both change streams of the source and
//! translates every event into the smallest flat patch that keeps the rows
//! equal to a full rebuild, then tells its consumer which flat range changed.
//!
//! Events that cannot be mapped to a flat range (moves, resets, missing
//! indices) and patches that fail a bounds check are answered with a full
//! rebuild followed by `everything_changed`.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use strata::model::{FlatProjection, ItemRef, Section, SectionedModel};
//!
//! let model = Arc::new(SectionedModel::new());
//! let projection = FlatProjection::attach(model.clone());
//!
//! projection.signals().range_inserted.connect(|(start, count)| {
//!     println!("{count} rows inserted at {start}");
//! });
//!
//! let general = Arc::new(Section::new("General"));
//! model.push_section(general.clone()).unwrap();
//! let name: ItemRef = Arc::new("Name".to_string());
//! general.push(name);
//!
//! // header, item, footer
//! assert_eq!(projection.len(), 3);
//! ```

use parking_lot::Mutex;
use std::sync::Arc;

use strata_core::logging::{span_names, targets};
use strata_core::{ConnectionId, PerfSpan, Signal};

use super::change::{ChangeAction, CollectionChange, ItemChange};
use super::config::{ProjectionConfig, SectionBatchPolicy};
use super::error::{ProjectionError, ProjectionResult};
use super::registry::ViewTypeRegistry;
use super::row::{Row, RowKind, RowSnapshot};
use super::section::{Section, SectionId};
use super::source::SectionSource;
use super::store::RowStore;

/// A change of the flat row sequence, as reported to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowsChange {
    /// `count` rows were inserted at `start`.
    Inserted { start: usize, count: usize },
    /// `count` rows were removed at `start`.
    Removed { start: usize, count: usize },
    /// `count` rows starting at `start` were overwritten in place.
    Replaced { start: usize, count: usize },
    /// The rows were rebuilt; no finer range is known.
    Everything,
}

/// Signals emitted by a [`FlatProjection`].
///
/// Exactly one of them fires per source event the projection handles.
pub struct ProjectionSignals {
    /// Args: (start index, row count)
    pub range_inserted: Signal<(usize, usize)>,

    /// Args: (start index, row count)
    pub range_removed: Signal<(usize, usize)>,

    /// Args: (start index, row count)
    pub range_replaced: Signal<(usize, usize)>,

    /// Emitted after a full rebuild.
    pub everything_changed: Signal<()>,
}

impl Default for ProjectionSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectionSignals {
    /// Creates a new set of projection signals.
    pub fn new() -> Self {
        Self {
            range_inserted: Signal::new(),
            range_removed: Signal::new(),
            range_replaced: Signal::new(),
            everything_changed: Signal::new(),
        }
    }

    /// Emits the signal matching `change`.
    pub fn emit(&self, change: RowsChange) {
        match change {
            RowsChange::Inserted { start, count } => self.range_inserted.emit((start, count)),
            RowsChange::Removed { start, count } => self.range_removed.emit((start, count)),
            RowsChange::Replaced { start, count } => self.range_replaced.emit((start, count)),
            RowsChange::Everything => self.everything_changed.emit(()),
        }
    }
}

struct ProjectionState {
    store: RowStore,
    registry: ViewTypeRegistry,
    attached: bool,
}

struct Subscriptions {
    sections: ConnectionId,
    items: ConnectionId,
}

/// A flat, incrementally maintained projection of a [`SectionSource`].
///
/// The projection owns its rows and its [`ViewTypeRegistry`]; the only
/// writers are the change handlers and [`rebuild`](Self::rebuild). Hosts
/// must deliver source events on a single logical thread; every handler
/// leaves the rows consistent with all events seen so far before it
/// notifies the consumer.
pub struct FlatProjection<S: SectionSource + 'static> {
    source: Arc<S>,
    config: ProjectionConfig,
    state: Mutex<ProjectionState>,
    subscriptions: Mutex<Option<Subscriptions>>,
    signals: ProjectionSignals,
}

impl<S: SectionSource + 'static> FlatProjection<S> {
    /// Attaches a projection with the default configuration.
    pub fn attach(source: Arc<S>) -> Arc<Self> {
        Self::attach_with_config(source, ProjectionConfig::default())
    }

    /// Builds the initial rows and subscribes to both change streams.
    ///
    /// The initial build is not announced.
    pub fn attach_with_config(source: Arc<S>, config: ProjectionConfig) -> Arc<Self> {
        let projection = Arc::new(Self {
            source,
            config,
            state: Mutex::new(ProjectionState {
                store: RowStore::new(),
                registry: ViewTypeRegistry::new(),
                attached: true,
            }),
            subscriptions: Mutex::new(None),
            signals: ProjectionSignals::new(),
        });

        projection.rebuild_locked(&mut projection.state.lock());

        let signals = projection.source.signals();
        let weak = Arc::downgrade(&projection);
        let sections = signals.sections_changed.connect(move |change| {
            if let Some(projection) = weak.upgrade() {
                projection.handle_section_change(change);
            }
        });
        let weak = Arc::downgrade(&projection);
        let items = signals.items_changed.connect(move |change| {
            if let Some(projection) = weak.upgrade() {
                projection.handle_item_change(change);
            }
        });
        *projection.subscriptions.lock() = Some(Subscriptions { sections, items });

        tracing::debug!(
            target: targets::PROJECTION,
            rows = projection.len(),
            "projection attached"
        );
        projection
    }

    /// Returns the source this projection mirrors.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Returns the signals consumers connect to.
    pub fn signals(&self) -> &ProjectionSignals {
        &self.signals
    }

    /// Returns `true` until [`teardown`](Self::teardown) runs.
    pub fn is_attached(&self) -> bool {
        self.state.lock().attached
    }

    /// Returns an immutable snapshot of the rows.
    pub fn rows(&self) -> RowSnapshot {
        RowSnapshot::new(self.state.lock().store.rows())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.state.lock().store.len()
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.state.lock().store.is_empty()
    }

    /// The row at flat `index`.
    pub fn row(&self, index: usize) -> Option<Row> {
        self.state.lock().store.get(index).cloned()
    }

    /// The classification of the row at flat `index`.
    pub fn kind_at(&self, index: usize) -> Option<RowKind> {
        self.state.lock().store.get(index).map(|row| row.kind)
    }

    /// Number of distinct codes consumers must be prepared to handle.
    pub fn view_type_count(&self) -> usize {
        self.state.lock().registry.view_type_count()
    }

    /// A copy of the classification registry.
    pub fn registry_snapshot(&self) -> ViewTypeRegistry {
        self.state.lock().registry.clone()
    }

    /// Flat index of the header of the section at `ordinal`.
    ///
    /// See [`RowStore::section_start_index`].
    pub fn section_start_index(&self, ordinal: usize) -> usize {
        self.state.lock().store.section_start_index(ordinal)
    }

    /// Flat index of item `local_index` of `section`, if the section is present.
    pub fn row_index_within_section(&self, section: SectionId, local_index: usize) -> Option<usize> {
        self.state
            .lock()
            .store
            .row_index_within_section(section, local_index)
    }

    /// Rebuilds every row from the source and emits `everything_changed`.
    pub fn rebuild(&self) {
        {
            let mut state = self.state.lock();
            if !state.attached {
                return;
            }
            self.rebuild_locked(&mut state);
        }
        self.signals.emit(RowsChange::Everything);
    }

    /// Handles a section-level event.
    ///
    /// Returns the change reported to the consumer, or `None` after teardown.
    pub fn handle_section_change(&self, change: &CollectionChange<Arc<Section>>) -> Option<RowsChange> {
        let notice = {
            let mut state = self.state.lock();
            if !state.attached {
                tracing::trace!(target: targets::PROJECTION, "detached, ignoring section event");
                return None;
            }
            let _perf = PerfSpan::new(span_names::PATCH);
            let patched = self.patch_sections(&mut state, change);
            self.settle(&mut state, patched, "section")
        };
        self.signals.emit(notice);
        Some(notice)
    }

    /// Handles an item-level event.
    ///
    /// Returns the change reported to the consumer, or `None` after teardown.
    pub fn handle_item_change(&self, change: &ItemChange) -> Option<RowsChange> {
        let notice = {
            let mut state = self.state.lock();
            if !state.attached {
                tracing::trace!(target: targets::PROJECTION, "detached, ignoring item event");
                return None;
            }
            let _perf = PerfSpan::new(span_names::PATCH);
            let patched = self.patch_items(&mut state, change);
            self.settle(&mut state, patched, "item")
        };
        self.signals.emit(notice);
        Some(notice)
    }

    /// Unsubscribes from the source and releases the rows and registry.
    ///
    /// Safe to call more than once; also runs on drop.
    pub fn teardown(&self) {
        if let Some(subscriptions) = self.subscriptions.lock().take() {
            let signals = self.source.signals();
            signals.sections_changed.disconnect(subscriptions.sections);
            signals.items_changed.disconnect(subscriptions.items);
        }

        let mut state = self.state.lock();
        if state.attached {
            state.attached = false;
            state.store.clear();
            state.registry.clear();
            tracing::debug!(target: targets::PROJECTION, "projection torn down");
        }
    }

    fn patch_sections(
        &self,
        state: &mut ProjectionState,
        change: &CollectionChange<Arc<Section>>,
    ) -> ProjectionResult<RowsChange> {
        match change.action {
            ChangeAction::Add => {
                let start = change
                    .new_start
                    .ok_or(ProjectionError::ambiguous("section add without start index"))?;
                let sections = change
                    .new_items
                    .as_deref()
                    .filter(|sections| !sections.is_empty())
                    .ok_or(ProjectionError::ambiguous("section add without sections"))?;
                self.check_section_batch(sections.len())?;

                // The source already holds the new sections at `start..`.
                let at = state.store.section_start_index(start);
                let mut rows = Vec::new();
                for (offset, section) in sections.iter().enumerate() {
                    let (header, footer) = boundary_kinds(self.source.as_ref(), start + offset);
                    rows.push(Row::boundary(section, header));
                    for item in section.items() {
                        let code = state.registry.code_for(&item.shape());
                        rows.push(Row::item(section, item, code));
                    }
                    rows.push(Row::boundary(section, footer));
                }
                let count = rows.len();
                state.store.insert_rows(at, rows)?;
                Ok(RowsChange::Inserted { start: at, count })
            }
            ChangeAction::Remove => {
                let start = change
                    .old_start
                    .ok_or(ProjectionError::ambiguous("section remove without start index"))?;
                let at = state.store.section_start_index(start);

                let count = match change.old_items.as_deref() {
                    Some([]) => {
                        return Err(ProjectionError::ambiguous("section remove without sections"));
                    }
                    Some(sections) => {
                        self.check_section_batch(sections.len())?;
                        let mut count = 0;
                        for section in sections {
                            count += removed_section_rows(&state.store, section, at + count)?;
                        }
                        count
                    }
                    None => {
                        let header = state.store.get(at).ok_or(ProjectionError::IndexOutOfRange {
                            index: at,
                            len: state.store.len(),
                        })?;
                        state.store.section_row_count(header.section_id())
                    }
                };

                state.store.remove_rows(at, count)?;
                Ok(RowsChange::Removed { start: at, count })
            }
            ChangeAction::Replace => Err(ProjectionError::ambiguous("section replace")),
            ChangeAction::Move => Err(ProjectionError::ambiguous("section move")),
            ChangeAction::Reset => Err(ProjectionError::ambiguous("section reset")),
        }
    }

    fn patch_items(&self, state: &mut ProjectionState, change: &ItemChange) -> ProjectionResult<RowsChange> {
        let section = &change.section;
        let id = section.id();
        let change = &change.change;

        match change.action {
            ChangeAction::Add => {
                let start = change
                    .new_start
                    .ok_or(ProjectionError::ambiguous("item add without start index"))?;
                let items = change
                    .new_items
                    .as_deref()
                    .filter(|items| !items.is_empty())
                    .ok_or(ProjectionError::ambiguous("item add without items"))?;

                let at = state.store.item_insert_index(id, start)?;
                let rows: Vec<Row> = items
                    .iter()
                    .map(|item| {
                        let code = state.registry.code_for(&item.shape());
                        Row::item(section, item.clone(), code)
                    })
                    .collect();
                let count = rows.len();
                state.store.insert_rows(at, rows)?;
                Ok(RowsChange::Inserted { start: at, count })
            }
            ChangeAction::Remove => {
                let start = change
                    .old_start
                    .ok_or(ProjectionError::ambiguous("item remove without start index"))?;
                let count = change.old_items.as_ref().map_or(1, Vec::len);
                if count == 0 {
                    return Err(ProjectionError::ambiguous("item remove without items"));
                }

                let at = state.store.item_row_index(id, start)?;
                state.store.item_row_index(id, start + count - 1)?;
                state.store.remove_rows(at, count)?;
                Ok(RowsChange::Removed { start: at, count })
            }
            ChangeAction::Replace => {
                let start = change
                    .old_start
                    .ok_or(ProjectionError::ambiguous("item replace without start index"))?;
                let items = change
                    .new_items
                    .as_deref()
                    .filter(|items| !items.is_empty())
                    .ok_or(ProjectionError::ambiguous("item replace without new items"))?;
                if change.old_items.as_ref().is_some_and(|old| old.len() != items.len()) {
                    return Err(ProjectionError::ambiguous("item replace changes the item count"));
                }

                let at = state.store.item_row_index(id, start)?;
                for (offset, item) in items.iter().enumerate() {
                    let shape = item.shape();
                    let code = state
                        .registry
                        .lookup(&shape)
                        .ok_or(ProjectionError::UnclassifiedShape { shape })?;
                    let index = state.store.item_row_index(id, start + offset)?;
                    state
                        .store
                        .replace_row(index, Row::item(section, item.clone(), code))?;
                }
                Ok(RowsChange::Replaced {
                    start: at,
                    count: items.len(),
                })
            }
            ChangeAction::Move => Err(ProjectionError::ambiguous("item move")),
            ChangeAction::Reset => Err(ProjectionError::ambiguous("item reset")),
        }
    }

    fn check_section_batch(&self, count: usize) -> ProjectionResult<()> {
        if count > 1 && self.config.section_batches == SectionBatchPolicy::Single {
            return Err(ProjectionError::SectionBatch { count });
        }
        Ok(())
    }

    /// Turns a patch outcome into the change reported to the consumer.
    fn settle(
        &self,
        state: &mut ProjectionState,
        patched: ProjectionResult<RowsChange>,
        stream: &'static str,
    ) -> RowsChange {
        match patched {
            Ok(notice) => {
                if self.config.verify_patches && !self.matches_source(state) {
                    tracing::error!(
                        target: targets::PROJECTION,
                        stream,
                        ?notice,
                        "incremental patch diverged from the source, rebuilding"
                    );
                    self.rebuild_locked(state);
                    return RowsChange::Everything;
                }
                tracing::debug!(target: targets::PROJECTION, stream, ?notice, "patched");
                notice
            }
            Err(err) => {
                if err.is_designed_fallback() {
                    tracing::debug!(target: targets::PROJECTION, stream, %err, "rebuilding");
                } else {
                    tracing::warn!(
                        target: targets::PROJECTION,
                        stream,
                        %err,
                        "patch failed, rebuilding"
                    );
                }
                self.rebuild_locked(state);
                RowsChange::Everything
            }
        }
    }

    fn rebuild_locked(&self, state: &mut ProjectionState) {
        let _perf = PerfSpan::new(span_names::REBUILD);
        let ProjectionState { store, registry, .. } = state;
        store.clear();
        for row in derive_rows(self.source.as_ref(), registry) {
            store.push(row);
        }
        tracing::debug!(
            target: targets::PROJECTION,
            rows = store.len(),
            view_types = registry.view_type_count(),
            "rebuilt"
        );
    }

    fn matches_source(&self, state: &ProjectionState) -> bool {
        let mut registry = state.registry.clone();
        let expected = derive_rows(self.source.as_ref(), &mut registry);
        expected.as_slice() == state.store.rows()
    }
}

impl<S: SectionSource + 'static> Drop for FlatProjection<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Derives the complete row sequence of `source`, classifying items with `registry`.
fn derive_rows<S: SectionSource + ?Sized>(source: &S, registry: &mut ViewTypeRegistry) -> Vec<Row> {
    let mut rows = Vec::new();
    for index in 0..source.section_count() {
        let Some(section) = source.section(index) else {
            continue;
        };
        let (header, footer) = boundary_kinds(source, index);
        rows.push(Row::boundary(&section, header));

        for item_index in 0..source.item_count(index) {
            if let Some(item) = source.item(index, item_index) {
                let code = registry.code_for(&item.shape());
                rows.push(Row::item(&section, item, code));
            }
        }

        rows.push(Row::boundary(&section, footer));
    }
    rows
}

/// Header and footer kinds of the section at `index`, as the source reports them.
fn boundary_kinds<S: SectionSource + ?Sized>(source: &S, index: usize) -> (RowKind, RowKind) {
    let header = if source.has_custom_header(index) {
        RowKind::CustomHeader
    } else {
        RowKind::TextHeader
    };
    let footer = if source.has_custom_footer(index) {
        RowKind::CustomFooter
    } else {
        RowKind::TextFooter
    };
    (header, footer)
}

/// Row count of a removed `section` whose header is expected at `at`.
fn removed_section_rows(store: &RowStore, section: &Section, at: usize) -> ProjectionResult<usize> {
    let header = store.get(at).ok_or(ProjectionError::IndexOutOfRange {
        index: at,
        len: store.len(),
    })?;
    let count = section.len() + 2;
    if header.section_id() != section.id() || store.section_row_count(section.id()) != count {
        return Err(ProjectionError::SectionMismatch { index: at });
    }
    Ok(count)
}
