//! Sectioned source models.
//!
//! A [`SectionSource`] is the hierarchical collection a
//! [`FlatProjection`](super::FlatProjection) mirrors: an ordered list of
//! sections, each holding ordered items, plus two change streams bundled in
//! [`SourceSignals`]. [`SectionedModel`] is the stock implementation.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::{Arc, Weak};

use strata_core::logging::targets;
use strata_core::{ConnectionId, Signal};

use super::change::{CollectionChange, ItemChange};
use super::error::{SourceError, SourceResult};
use super::item::ItemRef;
use super::section::{Section, SectionId};

/// Change streams published by a [`SectionSource`].
///
/// Sources must emit only after their own state reflects the change, and
/// must not hold internal locks while emitting: slots read the source back.
pub struct SourceSignals {
    /// Sections were added to, removed from, replaced in or moved within
    /// the top-level collection.
    pub sections_changed: Signal<CollectionChange<Arc<Section>>>,

    /// Items of one section changed.
    pub items_changed: Signal<ItemChange>,
}

impl Default for SourceSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceSignals {
    /// Creates a new set of source signals.
    pub fn new() -> Self {
        Self {
            sections_changed: Signal::new(),
            items_changed: Signal::new(),
        }
    }
}

/// The hierarchical collection a flat projection is derived from.
///
/// At minimum, implement [`section_count`](SectionSource::section_count),
/// [`section`](SectionSource::section) and [`signals`](SectionSource::signals);
/// the remaining queries default to reading the section itself.
pub trait SectionSource: Send + Sync {
    /// Returns the number of sections.
    fn section_count(&self) -> usize;

    /// Returns the section at `index`.
    fn section(&self, index: usize) -> Option<Arc<Section>>;

    /// Returns the signals announcing changes.
    fn signals(&self) -> &SourceSignals;

    /// Returns the number of items in the section at `section`.
    fn item_count(&self, section: usize) -> usize {
        self.section(section).map_or(0, |s| s.len())
    }

    /// Returns item `item` of the section at `section`.
    fn item(&self, section: usize, item: usize) -> Option<ItemRef> {
        self.section(section)?.item(item)
    }

    /// Returns `true` if the section at `section` has a custom header view.
    fn has_custom_header(&self, section: usize) -> bool {
        self.section(section).is_some_and(|s| s.has_custom_header())
    }

    /// Returns `true` if the section at `section` has a custom footer view.
    fn has_custom_footer(&self, section: usize) -> bool {
        self.section(section).is_some_and(|s| s.has_custom_footer())
    }
}

/// An ordered collection of sections.
///
/// Item changes of every owned section are re-published on
/// [`SourceSignals::items_changed`] until the section is removed.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use strata::model::{ItemRef, Section, SectionSource, SectionedModel};
///
/// let model = SectionedModel::new();
/// let general = Arc::new(Section::new("General"));
/// model.push_section(general.clone()).unwrap();
///
/// model.signals().items_changed.connect(|change| {
///     println!("items of {} changed", change.section.title());
/// });
///
/// let name: ItemRef = Arc::new("Name".to_string());
/// general.push(name);
/// assert_eq!(model.item_count(0), 1);
/// ```
pub struct SectionedModel {
    sections: RwLock<Vec<Arc<Section>>>,
    forwarders: Mutex<HashMap<SectionId, ConnectionId>>,
    signals: Arc<SourceSignals>,
}

impl Default for SectionedModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionedModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self {
            sections: RwLock::new(Vec::new()),
            forwarders: Mutex::new(HashMap::new()),
            signals: Arc::new(SourceSignals::new()),
        }
    }

    /// Creates a model holding `sections`. No change is announced.
    pub fn with_sections(sections: Vec<Arc<Section>>) -> SourceResult<Self> {
        let model = Self::new();
        check_distinct(&[], &sections)?;
        for section in &sections {
            model.forward(section);
        }
        *model.sections.write() = sections;
        Ok(model)
    }

    /// Returns the number of sections.
    pub fn len(&self) -> usize {
        self.sections.read().len()
    }

    /// Returns `true` if the model holds no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.read().is_empty()
    }

    /// Returns a snapshot of all sections.
    pub fn sections(&self) -> Vec<Arc<Section>> {
        self.sections.read().clone()
    }

    /// Returns the position of `section`.
    pub fn position(&self, section: SectionId) -> Option<usize> {
        self.sections.read().iter().position(|s| s.id() == section)
    }

    /// Appends a section.
    pub fn push_section(&self, section: Arc<Section>) -> SourceResult<()> {
        let index = self.len();
        self.insert_sections(index, vec![section])
    }

    /// Inserts a section at `index`.
    pub fn insert_section(&self, index: usize, section: Arc<Section>) -> SourceResult<()> {
        self.insert_sections(index, vec![section])
    }

    /// Inserts several sections at `index`, announced as one batch.
    pub fn insert_sections(&self, index: usize, new_sections: Vec<Arc<Section>>) -> SourceResult<()> {
        {
            let mut sections = self.sections.write();
            if index > sections.len() {
                return Err(SourceError::IndexOutOfRange {
                    index,
                    len: sections.len(),
                });
            }
            check_distinct(&sections, &new_sections)?;
            sections.splice(index..index, new_sections.iter().cloned());
        }
        for section in &new_sections {
            self.forward(section);
        }
        tracing::trace!(target: targets::SOURCE, index, count = new_sections.len(), "sections inserted");
        self.signals
            .sections_changed
            .emit(CollectionChange::added(index, new_sections));
        Ok(())
    }

    /// Removes and returns the section at `index`.
    pub fn remove_section(&self, index: usize) -> Option<Arc<Section>> {
        let removed = {
            let mut sections = self.sections.write();
            if index >= sections.len() {
                return None;
            }
            sections.remove(index)
        };
        self.unforward(&removed);
        tracing::trace!(target: targets::SOURCE, index, "section removed");
        self.signals
            .sections_changed
            .emit(CollectionChange::removed(index, vec![removed.clone()]));
        Some(removed)
    }

    /// Replaces the section at `index`, returning the old one.
    pub fn replace_section(&self, index: usize, section: Arc<Section>) -> SourceResult<Arc<Section>> {
        let old = {
            let mut sections = self.sections.write();
            let len = sections.len();
            if index >= len {
                return Err(SourceError::IndexOutOfRange { index, len });
            }
            let others: Vec<_> = sections
                .iter()
                .enumerate()
                .filter(|(n, _)| *n != index)
                .map(|(_, s)| s.clone())
                .collect();
            check_distinct(&others, std::slice::from_ref(&section))?;
            std::mem::replace(&mut sections[index], section.clone())
        };
        self.unforward(&old);
        self.forward(&section);
        self.signals.sections_changed.emit(CollectionChange::replaced(
            index,
            vec![old.clone()],
            vec![section],
        ));
        Ok(old)
    }

    /// Moves the section at `from` so that it ends up at `to`.
    pub fn move_section(&self, from: usize, to: usize) -> SourceResult<()> {
        let moved = {
            let mut sections = self.sections.write();
            let len = sections.len();
            if from >= len || to >= len {
                return Err(SourceError::IndexOutOfRange {
                    index: from.max(to),
                    len,
                });
            }
            let section = sections.remove(from);
            sections.insert(to, section.clone());
            section
        };
        self.signals
            .sections_changed
            .emit(CollectionChange::moved(from, to, vec![moved]));
        Ok(())
    }

    /// Replaces all sections, announced as a reset.
    pub fn set_sections(&self, new_sections: Vec<Arc<Section>>) -> SourceResult<()> {
        check_distinct(&[], &new_sections)?;
        let old = std::mem::replace(&mut *self.sections.write(), new_sections.clone());
        for section in &old {
            self.unforward(section);
        }
        for section in &new_sections {
            self.forward(section);
        }
        tracing::trace!(target: targets::SOURCE, count = new_sections.len(), "sections reset");
        self.signals.sections_changed.emit(CollectionChange::reset());
        Ok(())
    }

    /// Removes all sections, announced as a reset.
    pub fn clear(&self) {
        // An empty list has no duplicates.
        let _ = self.set_sections(Vec::new());
    }

    /// Re-publishes item changes of `section` on this model's signals.
    fn forward(&self, section: &Arc<Section>) {
        let weak: Weak<Section> = Arc::downgrade(section);
        let signals = self.signals.clone();
        let id = section.items_changed().connect(move |change| {
            if let Some(section) = weak.upgrade() {
                signals
                    .items_changed
                    .emit(ItemChange::new(section, change.clone()));
            }
        });
        if let Some(previous) = self.forwarders.lock().insert(section.id(), id) {
            section.items_changed().disconnect(previous);
        }
    }

    fn unforward(&self, section: &Arc<Section>) {
        if let Some(id) = self.forwarders.lock().remove(&section.id()) {
            section.items_changed().disconnect(id);
        }
    }
}

impl SectionSource for SectionedModel {
    fn section_count(&self) -> usize {
        self.len()
    }

    fn section(&self, index: usize) -> Option<Arc<Section>> {
        self.sections.read().get(index).cloned()
    }

    fn signals(&self) -> &SourceSignals {
        &self.signals
    }
}

impl Drop for SectionedModel {
    fn drop(&mut self) {
        for section in self.sections.get_mut().drain(..) {
            if let Some(id) = self.forwarders.get_mut().remove(&section.id()) {
                section.items_changed().disconnect(id);
            }
        }
    }
}

/// Fails if a section would appear twice.
fn check_distinct(existing: &[Arc<Section>], new: &[Arc<Section>]) -> SourceResult<()> {
    for (n, section) in new.iter().enumerate() {
        let id = section.id();
        let duplicate = existing.iter().any(|s| s.id() == id)
            || new[..n].iter().any(|s| s.id() == id);
        if duplicate {
            return Err(SourceError::DuplicateSection { section: id });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChangeAction;

    fn text(s: &str) -> ItemRef {
        Arc::new(s.to_string())
    }

    fn section(title: &str, items: &[&str]) -> Arc<Section> {
        Arc::new(Section::new(title).with_items(items.iter().map(|s| text(s)).collect()))
    }

    #[test]
    fn test_queries() {
        let model = SectionedModel::with_sections(vec![
            section("A", &["a1", "a2"]),
            Arc::new(Section::new("B").with_header_view(text("banner"))),
        ])
        .unwrap();

        assert_eq!(model.section_count(), 2);
        assert_eq!(model.item_count(0), 2);
        assert_eq!(model.item_count(1), 0);
        assert_eq!(model.item_count(5), 0);
        assert!(model.item(0, 1).is_some());
        assert!(model.item(0, 2).is_none());
        assert!(!model.has_custom_header(0));
        assert!(model.has_custom_header(1));
        assert!(!model.has_custom_footer(1));
    }

    #[test]
    fn test_section_events() {
        let model = SectionedModel::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let recv = events.clone();
        model.signals().sections_changed.connect(move |change| {
            recv.lock().push((
                change.action,
                change.new_start.or(change.old_start),
                change.new_len().max(change.old_len()),
            ));
        });

        model.push_section(section("A", &[])).unwrap();
        model
            .insert_sections(0, vec![section("B", &[]), section("C", &[])])
            .unwrap();
        model.move_section(2, 0).unwrap();
        model.replace_section(1, section("D", &[])).unwrap();
        model.remove_section(0).unwrap();
        model.clear();

        assert_eq!(
            *events.lock(),
            vec![
                (ChangeAction::Add, Some(0), 1),
                (ChangeAction::Add, Some(0), 2),
                (ChangeAction::Move, Some(0), 1),
                (ChangeAction::Replace, Some(1), 1),
                (ChangeAction::Remove, Some(0), 1),
                (ChangeAction::Reset, None, 0),
            ]
        );
    }

    #[test]
    fn test_item_changes_are_forwarded_until_removed() {
        let a = section("A", &[]);
        let model = SectionedModel::with_sections(vec![a.clone()]).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recv = seen.clone();
        model.signals().items_changed.connect(move |change| {
            recv.lock().push((change.section.id(), change.change.action));
        });

        a.push(text("x"));
        model.remove_section(0);
        a.push(text("y"));

        assert_eq!(*seen.lock(), vec![(a.id(), ChangeAction::Add)]);
        assert_eq!(a.items_changed().connection_count(), 0);
    }

    #[test]
    fn test_slots_may_read_the_model() {
        let model = Arc::new(SectionedModel::new());
        let counts = Arc::new(Mutex::new(Vec::new()));
        let reader = model.clone();
        let recv = counts.clone();
        model.signals().sections_changed.connect(move |_| {
            recv.lock().push(reader.section_count());
        });

        model.push_section(section("A", &[])).unwrap();
        model.push_section(section("B", &[])).unwrap();

        assert_eq!(*counts.lock(), vec![1, 2]);
    }

    #[test]
    fn test_rejects_duplicate_sections() {
        let a = section("A", &[]);
        let model = SectionedModel::with_sections(vec![a.clone()]).unwrap();
        assert_eq!(
            model.push_section(a.clone()),
            Err(SourceError::DuplicateSection { section: a.id() })
        );
        assert!(model.replace_section(0, a.clone()).is_ok());
        assert!(SectionedModel::with_sections(vec![a.clone(), a]).is_err());
    }

    #[test]
    fn test_out_of_range() {
        let model = SectionedModel::new();
        assert!(model.insert_section(1, section("A", &[])).is_err());
        assert!(model.remove_section(0).is_none());
        assert!(model.move_section(0, 0).is_err());
        assert!(model.replace_section(0, section("B", &[])).is_err());
    }

    #[test]
    fn test_drop_disconnects_forwarders() {
        let a = section("A", &[]);
        let model = SectionedModel::with_sections(vec![a.clone()]).unwrap();
        assert_eq!(a.items_changed().connection_count(), 1);
        drop(model);
        assert_eq!(a.items_changed().connection_count(), 0);
    }
}
