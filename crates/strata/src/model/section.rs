//! Sections: ordered, identity-bearing groups of items.
//!
//! A [`Section`] owns its items and announces every mutation on
//! [`items_changed`](Section::items_changed). Sections are shared as
//! `Arc<Section>`; identity is the [`SectionId`], never the contents.

use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use strata_core::Signal;

use super::change::CollectionChange;
use super::error::{SourceError, SourceResult};
use super::item::ItemRef;

/// Counter for generating unique section IDs.
static SECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(u64);

impl SectionId {
    fn next() -> Self {
        Self(SECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An ordered group of items with optional custom header and footer views.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use strata::model::{ItemRef, Section};
///
/// let section = Arc::new(Section::new("General").with_footer_text("Applies to all users"));
/// let name: ItemRef = Arc::new("Name".to_string());
/// section.push(name);
/// assert_eq!(section.len(), 1);
/// ```
pub struct Section {
    id: SectionId,
    title: String,
    footer_text: Option<String>,
    header_view: Option<ItemRef>,
    footer_view: Option<ItemRef>,
    items: RwLock<Vec<ItemRef>>,
    items_changed: Signal<CollectionChange<ItemRef>>,
}

impl Section {
    /// Creates an empty section with a text header.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: SectionId::next(),
            title: title.into(),
            footer_text: None,
            header_view: None,
            footer_view: None,
            items: RwLock::new(Vec::new()),
            items_changed: Signal::new(),
        }
    }

    /// Sets the footer text.
    pub fn with_footer_text(mut self, text: impl Into<String>) -> Self {
        self.footer_text = Some(text.into());
        self
    }

    /// Uses a custom view instead of the text header.
    pub fn with_header_view(mut self, view: ItemRef) -> Self {
        self.header_view = Some(view);
        self
    }

    /// Uses a custom view instead of the text footer.
    pub fn with_footer_view(mut self, view: ItemRef) -> Self {
        self.footer_view = Some(view);
        self
    }

    /// Sets the initial items. No change is announced.
    pub fn with_items(mut self, items: Vec<ItemRef>) -> Self {
        self.items = RwLock::new(items);
        self
    }

    /// Returns the identity of this section.
    pub fn id(&self) -> SectionId {
        self.id
    }

    /// Returns the header title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the footer text, if any.
    pub fn footer_text(&self) -> Option<&str> {
        self.footer_text.as_deref()
    }

    /// Returns the custom header view, if any.
    pub fn header_view(&self) -> Option<&ItemRef> {
        self.header_view.as_ref()
    }

    /// Returns the custom footer view, if any.
    pub fn footer_view(&self) -> Option<&ItemRef> {
        self.footer_view.as_ref()
    }

    /// Returns `true` if the header is a custom view.
    pub fn has_custom_header(&self) -> bool {
        self.header_view.is_some()
    }

    /// Returns `true` if the footer is a custom view.
    pub fn has_custom_footer(&self) -> bool {
        self.footer_view.is_some()
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns `true` if the section holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Returns the item at `index`.
    pub fn item(&self, index: usize) -> Option<ItemRef> {
        self.items.read().get(index).cloned()
    }

    /// Returns a snapshot of all items.
    pub fn items(&self) -> Vec<ItemRef> {
        self.items.read().clone()
    }

    /// The signal announcing item mutations.
    pub fn items_changed(&self) -> &Signal<CollectionChange<ItemRef>> {
        &self.items_changed
    }

    /// Appends an item.
    pub fn push(&self, item: ItemRef) {
        let index = {
            let mut items = self.items.write();
            items.push(item.clone());
            items.len() - 1
        };
        self.items_changed
            .emit(CollectionChange::added(index, vec![item]));
    }

    /// Inserts an item at `index`.
    pub fn insert(&self, index: usize, item: ItemRef) -> SourceResult<()> {
        self.insert_many(index, vec![item])
    }

    /// Inserts several items at `index`, announced as one batch.
    pub fn insert_many(&self, index: usize, new_items: Vec<ItemRef>) -> SourceResult<()> {
        {
            let mut items = self.items.write();
            if index > items.len() {
                return Err(SourceError::IndexOutOfRange {
                    index,
                    len: items.len(),
                });
            }
            items.splice(index..index, new_items.iter().cloned());
        }
        self.items_changed
            .emit(CollectionChange::added(index, new_items));
        Ok(())
    }

    /// Removes and returns the item at `index`.
    pub fn remove(&self, index: usize) -> Option<ItemRef> {
        let removed = {
            let mut items = self.items.write();
            if index >= items.len() {
                return None;
            }
            items.remove(index)
        };
        self.items_changed
            .emit(CollectionChange::removed(index, vec![removed.clone()]));
        Some(removed)
    }

    /// Replaces the item at `index`, returning the old one.
    pub fn replace(&self, index: usize, item: ItemRef) -> Option<ItemRef> {
        let old = {
            let mut items = self.items.write();
            let slot = items.get_mut(index)?;
            std::mem::replace(slot, item.clone())
        };
        self.items_changed.emit(CollectionChange::replaced(
            index,
            vec![old.clone()],
            vec![item],
        ));
        Some(old)
    }

    /// Moves the item at `from` so that it ends up at `to`.
    pub fn move_item(&self, from: usize, to: usize) -> SourceResult<()> {
        let moved = {
            let mut items = self.items.write();
            let len = items.len();
            if from >= len || to >= len {
                return Err(SourceError::IndexOutOfRange {
                    index: from.max(to),
                    len,
                });
            }
            let item = items.remove(from);
            items.insert(to, item.clone());
            item
        };
        self.items_changed
            .emit(CollectionChange::moved(from, to, vec![moved]));
        Ok(())
    }

    /// Replaces all items, announced as a reset.
    pub fn set_items(&self, items: Vec<ItemRef>) {
        *self.items.write() = items;
        self.items_changed.emit(CollectionChange::reset());
    }

    /// Removes all items, announced as a reset.
    pub fn clear(&self) {
        self.set_items(Vec::new());
    }
}

impl fmt::Debug for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Section")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("items", &self.len())
            .field("custom_header", &self.has_custom_header())
            .field("custom_footer", &self.has_custom_footer())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChangeAction;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn text(s: &str) -> ItemRef {
        Arc::new(s.to_string())
    }

    fn record(section: &Section) -> Arc<Mutex<Vec<(ChangeAction, Option<usize>, usize)>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let recv = events.clone();
        section.items_changed().connect(move |change| {
            let start = change.new_start.or(change.old_start);
            recv.lock()
                .push((change.action, start, change.new_len().max(change.old_len())));
        });
        events
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Section::new("A");
        let b = Section::new("B");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_custom_views() {
        let section = Section::new("S").with_header_view(text("banner"));
        assert!(section.has_custom_header());
        assert!(!section.has_custom_footer());
        assert_eq!(section.title(), "S");
        assert_eq!(section.footer_text(), None);
    }

    #[test]
    fn test_mutations_emit_changes() {
        let section = Section::new("S");
        let events = record(&section);

        section.push(text("a"));
        section.push(text("c"));
        section.insert(1, text("b")).unwrap();
        section.replace(0, text("A")).unwrap();
        section.move_item(2, 0).unwrap();
        section.remove(1).unwrap();
        section.clear();

        let events = events.lock();
        assert_eq!(
            *events,
            vec![
                (ChangeAction::Add, Some(0), 1),
                (ChangeAction::Add, Some(1), 1),
                (ChangeAction::Add, Some(1), 1),
                (ChangeAction::Replace, Some(0), 1),
                (ChangeAction::Move, Some(0), 1),
                (ChangeAction::Remove, Some(1), 1),
                (ChangeAction::Reset, None, 0),
            ]
        );
        assert!(section.is_empty());
    }

    #[test]
    fn test_insert_many_is_one_batch() {
        let section = Section::new("S").with_items(vec![text("a")]);
        let events = record(&section);

        section
            .insert_many(1, vec![text("b"), text("c"), text("d")])
            .unwrap();

        assert_eq!(section.len(), 4);
        assert_eq!(*events.lock(), vec![(ChangeAction::Add, Some(1), 3)]);
    }

    #[test]
    fn test_out_of_range_mutations() {
        let section = Section::new("S");
        let events = record(&section);

        assert_eq!(
            section.insert(1, text("x")),
            Err(SourceError::IndexOutOfRange { index: 1, len: 0 })
        );
        assert!(section.remove(0).is_none());
        assert!(section.replace(0, text("x")).is_none());
        assert!(section.move_item(0, 0).is_err());
        assert!(events.lock().is_empty());
    }
}
