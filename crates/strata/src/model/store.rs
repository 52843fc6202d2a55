//! The flat row store and its coordinate translation.
//!
//! `RowStore` holds the rows of a projection in depth-first order and maps
//! hierarchical coordinates (section ordinal, item index) to flat indices.
//! Every mutation is bounds-checked so a desynchronised patch fails instead
//! of corrupting the sequence.

use std::collections::HashSet;

use super::error::{ProjectionError, ProjectionResult};
use super::row::Row;
use super::section::SectionId;

/// Ordered storage for the rows of a flat projection.
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    rows: Vec<Row>,
}

impl RowStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows, in flat order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The row at `index`.
    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Removes every row.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Appends a row.
    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Inserts a contiguous block of rows at `at`.
    pub fn insert_rows(&mut self, at: usize, rows: Vec<Row>) -> ProjectionResult<()> {
        if at > self.rows.len() {
            return Err(ProjectionError::IndexOutOfRange {
                index: at,
                len: self.rows.len(),
            });
        }
        self.rows.splice(at..at, rows);
        Ok(())
    }

    /// Removes `count` contiguous rows starting at `at`.
    pub fn remove_rows(&mut self, at: usize, count: usize) -> ProjectionResult<Vec<Row>> {
        self.check_range(at, count)?;
        Ok(self.rows.drain(at..at + count).collect())
    }

    /// Overwrites the row at `at`, returning the old one.
    pub fn replace_row(&mut self, at: usize, row: Row) -> ProjectionResult<Row> {
        let len = self.rows.len();
        let slot = self
            .rows
            .get_mut(at)
            .ok_or(ProjectionError::IndexOutOfRange { index: at, len })?;
        Ok(std::mem::replace(slot, row))
    }

    /// Fails unless `at..at + count` lies within the store.
    pub fn check_range(&self, at: usize, count: usize) -> ProjectionResult<()> {
        let len = self.rows.len();
        match at.checked_add(count) {
            Some(end) if end <= len => Ok(()),
            _ => Err(ProjectionError::RangeOutOfBounds {
                start: at,
                count,
                len,
            }),
        }
    }

    /// Flat index of the header of the section at `ordinal`.
    ///
    /// Sections are counted in order of first appearance. When fewer than
    /// `ordinal + 1` distinct sections are stored, the current length is
    /// returned, i.e. the position a new trailing section would take.
    pub fn section_start_index(&self, ordinal: usize) -> usize {
        let mut seen = HashSet::new();
        for (index, row) in self.rows.iter().enumerate() {
            if seen.insert(row.section_id()) && seen.len() == ordinal + 1 {
                return index;
            }
        }
        self.rows.len()
    }

    /// Flat index of the header of `section`, if it is stored.
    pub fn section_header_index(&self, section: SectionId) -> Option<usize> {
        self.rows.iter().position(|row| row.section_id() == section)
    }

    /// Flat index of item `local_index` of `section`.
    ///
    /// This is `local_index + header index + 1`; the header row is skipped.
    /// Returns `None` if the section is not stored.
    pub fn row_index_within_section(&self, section: SectionId, local_index: usize) -> Option<usize> {
        self.section_header_index(section)
            .map(|start| start + local_index + 1)
    }

    /// Flat index of the existing item `local_index` of `section`.
    pub fn item_row_index(&self, section: SectionId, local_index: usize) -> ProjectionResult<usize> {
        self.checked_item_index(section, local_index, false)
    }

    /// Flat index at which an item inserted at `local_index` of `section` lands.
    ///
    /// Unlike [`item_row_index`](Self::item_row_index), `local_index` may equal
    /// the item count, which addresses the footer position.
    pub fn item_insert_index(&self, section: SectionId, local_index: usize) -> ProjectionResult<usize> {
        self.checked_item_index(section, local_index, true)
    }

    fn checked_item_index(
        &self,
        section: SectionId,
        local_index: usize,
        insertion: bool,
    ) -> ProjectionResult<usize> {
        let at = self
            .row_index_within_section(section, local_index)
            .ok_or(ProjectionError::SectionNotFound { section })?;
        let items = self.section_row_count(section).saturating_sub(2);
        let in_range = if insertion {
            local_index <= items
        } else {
            local_index < items
        };
        if in_range {
            Ok(at)
        } else {
            Err(ProjectionError::IndexOutOfRange {
                index: local_index,
                len: items,
            })
        }
    }

    /// Number of rows belonging to `section`, boundaries included.
    pub fn section_row_count(&self, section: SectionId) -> usize {
        self.rows
            .iter()
            .filter(|row| row.section_id() == section)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemRef, RowKind, Section};
    use std::sync::Arc;

    fn section_rows(section: &Arc<Section>, items: usize) -> Vec<Row> {
        let mut rows = vec![Row::boundary(section, RowKind::TextHeader)];
        for n in 0..items {
            let item: ItemRef = Arc::new(format!("item {n}"));
            rows.push(Row::item(section, item, 4));
        }
        rows.push(Row::boundary(section, RowKind::TextFooter));
        rows
    }

    fn two_sections() -> (RowStore, Arc<Section>, Arc<Section>) {
        let a = Arc::new(Section::new("A"));
        let b = Arc::new(Section::new("B"));
        let mut store = RowStore::new();
        store.insert_rows(0, section_rows(&a, 2)).unwrap();
        store.insert_rows(4, section_rows(&b, 1)).unwrap();
        (store, a, b)
    }

    #[test]
    fn test_section_start_index() {
        let (store, _, _) = two_sections();
        assert_eq!(store.len(), 7);
        assert_eq!(store.section_start_index(0), 0);
        assert_eq!(store.section_start_index(1), 4);
        assert_eq!(store.section_start_index(2), 7);
        assert_eq!(store.section_start_index(10), 7);
    }

    #[test]
    fn test_row_index_within_section() {
        let (store, a, b) = two_sections();
        assert_eq!(store.row_index_within_section(a.id(), 0), Some(1));
        assert_eq!(store.row_index_within_section(a.id(), 2), Some(3));
        assert_eq!(store.row_index_within_section(b.id(), 0), Some(5));

        let missing = Section::new("missing");
        assert_eq!(store.row_index_within_section(missing.id(), 0), None);
    }

    #[test]
    fn test_checked_item_indices() {
        let (store, a, b) = two_sections();
        assert_eq!(store.item_row_index(a.id(), 1), Ok(2));
        assert_eq!(
            store.item_row_index(a.id(), 2),
            Err(ProjectionError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(store.item_insert_index(a.id(), 2), Ok(3));
        assert_eq!(store.item_insert_index(b.id(), 1), Ok(6));
        assert!(store.item_insert_index(b.id(), 2).is_err());

        let missing = Section::new("missing");
        assert_eq!(
            store.item_row_index(missing.id(), 0),
            Err(ProjectionError::SectionNotFound {
                section: missing.id()
            })
        );
    }

    #[test]
    fn test_insert_out_of_range() {
        let (mut store, a, _) = two_sections();
        let err = store.insert_rows(8, vec![Row::boundary(&a, RowKind::TextHeader)]).unwrap_err();
        assert_eq!(err, ProjectionError::IndexOutOfRange { index: 8, len: 7 });
        assert_eq!(store.len(), 7);
    }

    #[test]
    fn test_remove_rows() {
        let (mut store, a, b) = two_sections();
        let removed = store.remove_rows(0, 4).unwrap();
        assert_eq!(removed.len(), 4);
        assert!(removed.iter().all(|row| row.section_id() == a.id()));
        assert_eq!(store.section_start_index(0), 0);
        assert_eq!(store.get(0).unwrap().section_id(), b.id());

        let err = store.remove_rows(1, 3).unwrap_err();
        assert_eq!(
            err,
            ProjectionError::RangeOutOfBounds {
                start: 1,
                count: 3,
                len: 3
            }
        );
    }

    #[test]
    fn test_replace_row() {
        let (mut store, a, _) = two_sections();
        let item: ItemRef = Arc::new("replacement".to_string());
        let old = store.replace_row(1, Row::item(&a, item, 5)).unwrap();
        assert_eq!(old.kind.code(), 4);
        assert_eq!(store.get(1).unwrap().kind.code(), 5);

        assert!(store.replace_row(7, Row::boundary(&a, RowKind::TextHeader)).is_err());
    }

    #[test]
    fn test_section_row_count() {
        let (store, a, b) = two_sections();
        assert_eq!(store.section_row_count(a.id()), 4);
        assert_eq!(store.section_row_count(b.id()), 3);
    }
}
