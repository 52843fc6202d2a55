//! Structured change events delivered by sectioned sources.
//!
//! A [`CollectionChange`] describes one mutation of an ordered collection,
//! either the top-level list of sections or the items of one section. Start
//! indices are optional: `None` means the source could not report where the
//! change happened, which consumers must treat as "anything may have moved".

use std::sync::Arc;

use super::item::ItemRef;
use super::section::Section;

/// The kind of mutation a [`CollectionChange`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeAction {
    /// Elements were inserted.
    Add,
    /// Elements were removed.
    Remove,
    /// Elements were replaced in place.
    Replace,
    /// Elements were moved to a different position.
    Move,
    /// The collection changed drastically; re-read everything.
    Reset,
}

/// One mutation of an ordered collection.
#[derive(Debug, Clone)]
pub struct CollectionChange<T> {
    /// What happened.
    pub action: ChangeAction,
    /// Index of the first new element, if known.
    pub new_start: Option<usize>,
    /// The new elements (Add, Replace, Move).
    pub new_items: Option<Vec<T>>,
    /// Index of the first old element, if known.
    pub old_start: Option<usize>,
    /// The old elements (Remove, Replace, Move).
    pub old_items: Option<Vec<T>>,
}

impl<T> CollectionChange<T> {
    /// `items` were inserted starting at `start`.
    pub fn added(start: usize, items: Vec<T>) -> Self {
        Self {
            action: ChangeAction::Add,
            new_start: Some(start),
            new_items: Some(items),
            old_start: None,
            old_items: None,
        }
    }

    /// `items` were removed starting at `start`.
    pub fn removed(start: usize, items: Vec<T>) -> Self {
        Self {
            action: ChangeAction::Remove,
            new_start: None,
            new_items: None,
            old_start: Some(start),
            old_items: Some(items),
        }
    }

    /// `old` was replaced by `new` starting at `start`.
    pub fn replaced(start: usize, old: Vec<T>, new: Vec<T>) -> Self {
        Self {
            action: ChangeAction::Replace,
            new_start: Some(start),
            new_items: Some(new),
            old_start: Some(start),
            old_items: Some(old),
        }
    }

    /// `items` moved from `from` to `to`.
    pub fn moved(from: usize, to: usize, items: Vec<T>) -> Self
    where
        T: Clone,
    {
        Self {
            action: ChangeAction::Move,
            new_start: Some(to),
            new_items: Some(items.clone()),
            old_start: Some(from),
            old_items: Some(items),
        }
    }

    /// The whole collection changed.
    pub fn reset() -> Self {
        Self {
            action: ChangeAction::Reset,
            new_start: None,
            new_items: None,
            old_start: None,
            old_items: None,
        }
    }

    /// Drops both start indices, as hosts that cannot track positions do.
    pub fn with_unknown_index(mut self) -> Self {
        self.new_start = None;
        self.old_start = None;
        self
    }

    /// Drops the payload of new elements.
    pub fn without_new_items(mut self) -> Self {
        self.new_items = None;
        self
    }

    /// Number of new elements carried by the event.
    pub fn new_len(&self) -> usize {
        self.new_items.as_ref().map_or(0, Vec::len)
    }

    /// Number of old elements carried by the event.
    pub fn old_len(&self) -> usize {
        self.old_items.as_ref().map_or(0, Vec::len)
    }
}

/// An item-level change, tagged with the section it happened in.
#[derive(Debug, Clone)]
pub struct ItemChange {
    /// The section whose items changed.
    pub section: Arc<Section>,
    /// The change itself.
    pub change: CollectionChange<ItemRef>,
}

impl ItemChange {
    /// Creates an item-level change for `section`.
    pub fn new(section: Arc<Section>, change: CollectionChange<ItemRef>) -> Self {
        Self { section, change }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_added() {
        let change = CollectionChange::added(2, vec!["a", "b"]);
        assert_eq!(change.action, ChangeAction::Add);
        assert_eq!(change.new_start, Some(2));
        assert_eq!(change.new_len(), 2);
        assert_eq!(change.old_len(), 0);
        assert_eq!(change.old_start, None);
    }

    #[test]
    fn test_replaced_reports_both_sides() {
        let change = CollectionChange::replaced(1, vec![10], vec![20]);
        assert_eq!(change.old_start, Some(1));
        assert_eq!(change.new_start, Some(1));
        assert_eq!(change.old_items, Some(vec![10]));
        assert_eq!(change.new_items, Some(vec![20]));
    }

    #[test]
    fn test_unknown_index() {
        let change = CollectionChange::removed(4, vec![1]).with_unknown_index();
        assert_eq!(change.action, ChangeAction::Remove);
        assert_eq!(change.old_start, None);
        assert_eq!(change.old_len(), 1);
    }

    #[test]
    fn test_reset_has_no_payload() {
        let change = CollectionChange::<u8>::reset();
        assert_eq!(change.action, ChangeAction::Reset);
        assert!(change.new_items.is_none());
        assert!(change.old_items.is_none());
    }
}
