//! Rows of a flat projection and their classification.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use super::item::{ItemRef, same_item};
use super::section::{Section, SectionId};

/// Number of codes reserved for section boundary rows.
pub const RESERVED_CODES: u32 = 4;

/// Classification of a row.
///
/// Boundary rows have fixed codes `0..=3`; item rows carry the code the
/// [`ViewTypeRegistry`](super::ViewTypeRegistry) assigned to their shape,
/// which is always at least [`RESERVED_CODES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    /// Header rendered from the section title.
    TextHeader,
    /// Footer rendered from the section footer text.
    TextFooter,
    /// Header rendered by a custom view.
    CustomHeader,
    /// Footer rendered by a custom view.
    CustomFooter,
    /// An item row with its shape's code.
    Item(u32),
}

impl RowKind {
    /// Returns the integer code consumers pool strategies by.
    pub fn code(self) -> u32 {
        match self {
            Self::TextHeader => 0,
            Self::TextFooter => 1,
            Self::CustomHeader => 2,
            Self::CustomFooter => 3,
            Self::Item(code) => code,
        }
    }

    /// Returns `true` for header rows.
    pub fn is_header(self) -> bool {
        matches!(self, Self::TextHeader | Self::CustomHeader)
    }

    /// Returns `true` for footer rows.
    pub fn is_footer(self) -> bool {
        matches!(self, Self::TextFooter | Self::CustomFooter)
    }

    /// Returns `true` for item rows.
    pub fn is_item(self) -> bool {
        matches!(self, Self::Item(_))
    }
}

/// One entry of a flat projection.
#[derive(Clone)]
pub struct Row {
    /// The owning section.
    pub section: Arc<Section>,
    /// The item, absent for boundary rows.
    pub item: Option<ItemRef>,
    /// Classification of the row.
    pub kind: RowKind,
}

impl Row {
    /// A header or footer row of `section` with an already resolved kind.
    pub fn boundary(section: &Arc<Section>, kind: RowKind) -> Self {
        Self {
            section: section.clone(),
            item: None,
            kind,
        }
    }

    /// An item row with an already resolved code.
    pub fn item(section: &Arc<Section>, item: ItemRef, code: u32) -> Self {
        Self {
            section: section.clone(),
            item: Some(item),
            kind: RowKind::Item(code),
        }
    }

    /// Identity of the owning section.
    pub fn section_id(&self) -> SectionId {
        self.section.id()
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        let same_items = match (&self.item, &other.item) {
            (Some(a), Some(b)) => same_item(a, b),
            (None, None) => true,
            _ => false,
        };
        self.section_id() == other.section_id() && same_items && self.kind == other.kind
    }
}

impl Eq for Row {}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Row");
        s.field("section", &self.section_id());
        if let Some(item) = &self.item {
            s.field("item", item);
        }
        s.field("kind", &self.kind).finish()
    }
}

/// An immutable snapshot of a projection's rows.
///
/// Snapshots are cheap to clone and never change after they are taken.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RowSnapshot {
    rows: Arc<[Row]>,
}

impl RowSnapshot {
    pub(crate) fn new(rows: &[Row]) -> Self {
        Self { rows: rows.into() }
    }

    /// The codes of all rows, in order.
    pub fn codes(&self) -> Vec<u32> {
        self.rows.iter().map(|row| row.kind.code()).collect()
    }
}

impl Deref for RowSnapshot {
    type Target = [Row];

    fn deref(&self) -> &Self::Target {
        &self.rows
    }
}

impl fmt::Debug for RowSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rows.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a RowSnapshot {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_codes() {
        assert_eq!(RowKind::TextHeader.code(), 0);
        assert_eq!(RowKind::TextFooter.code(), 1);
        assert_eq!(RowKind::CustomHeader.code(), 2);
        assert_eq!(RowKind::CustomFooter.code(), 3);
        assert_eq!(RowKind::Item(RESERVED_CODES).code(), 4);
    }

    #[test]
    fn test_boundary_kinds() {
        let section = Arc::new(Section::new("custom"));
        let header = Row::boundary(&section, RowKind::CustomHeader);
        let footer = Row::boundary(&section, RowKind::TextFooter);

        assert!(header.item.is_none());
        assert!(header.kind.is_header() && !header.kind.is_footer());
        assert!(footer.kind.is_footer() && !footer.kind.is_item());
        assert_eq!(header.section_id(), section.id());
    }

    #[test]
    fn test_row_equality_uses_identity() {
        let section = Arc::new(Section::new("S"));
        let item: ItemRef = Arc::new("a".to_string());
        let same_text: ItemRef = Arc::new("a".to_string());

        assert_eq!(
            Row::item(&section, item.clone(), 4),
            Row::item(&section, item.clone(), 4)
        );
        assert_ne!(Row::item(&section, item.clone(), 4), Row::item(&section, same_text, 4));
        assert_ne!(Row::item(&section, item, 4), Row::boundary(&section, RowKind::TextHeader));

        let other = Arc::new(Section::new("S"));
        assert_ne!(
            Row::boundary(&section, RowKind::TextHeader),
            Row::boundary(&other, RowKind::TextHeader)
        );
    }

    #[test]
    fn test_snapshot_is_detached() {
        let section = Arc::new(Section::new("S"));
        let mut rows = vec![
            Row::boundary(&section, RowKind::TextHeader),
            Row::boundary(&section, RowKind::TextFooter),
        ];
        let snapshot = RowSnapshot::new(&rows);
        rows.clear();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.codes(), vec![0, 1]);
    }
}
