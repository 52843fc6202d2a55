//! Tree-shaped dumps of flat rows for debugging.
//!
//! ```
//! use std::sync::Arc;
//! use strata::model::{FlatProjection, ItemRef, RowsDebug, Section, SectionedModel};
//! use strata::TreeFormatOptions;
//!
//! let name: ItemRef = Arc::new("Name".to_string());
//! let general = Arc::new(Section::new("General").with_items(vec![name]));
//! let model = Arc::new(SectionedModel::with_sections(vec![general]).unwrap());
//! let projection = FlatProjection::attach(model);
//!
//! let dump = RowsDebug::with_options(TreeFormatOptions::minimal()).format(&projection.rows());
//! assert!(dump.starts_with("General"));
//! ```

use std::fmt;

use strata_core::TreeFormatOptions;

use super::row::{Row, RowKind};

/// Renders rows as one tree per section.
#[derive(Debug, Clone, Default)]
pub struct RowsDebug {
    options: TreeFormatOptions,
}

impl RowsDebug {
    /// Creates a formatter with the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a formatter with `options`.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Formats `rows` into a string.
    pub fn format(&self, rows: &[Row]) -> String {
        Tree {
            rows,
            options: &self.options,
        }
        .to_string()
    }
}

struct Tree<'a> {
    rows: &'a [Row],
    options: &'a TreeFormatOptions,
}

impl Tree<'_> {
    fn write_label(&self, f: &mut fmt::Formatter<'_>, index: usize, row: &Row) -> fmt::Result {
        if self.options.show_indices {
            write!(f, "[{index}] ")?;
        }
        match (row.kind, &row.item) {
            (RowKind::TextHeader | RowKind::CustomHeader, _) => write!(f, "{}", row.section.title())?,
            (RowKind::TextFooter | RowKind::CustomFooter, _) => match row.section.footer_text() {
                Some(text) => write!(f, "footer: {text}")?,
                None => write!(f, "footer")?,
            },
            (RowKind::Item(_), Some(item)) => {
                if self.options.show_types {
                    write!(f, "{} ", item.shape().short_name())?;
                }
                write!(f, "{item:?}")?;
            }
            (RowKind::Item(_), None) => write!(f, "<missing item>")?,
        }
        if self.options.show_codes {
            write!(f, " ({:?} {})", row.kind, row.kind.code())?;
        }
        Ok(())
    }
}

impl fmt::Display for Tree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let style = self.options.style;
        let mut index = 0;
        while index < self.rows.len() {
            let header = &self.rows[index];
            let id = header.section_id();
            let end = self.rows[index..]
                .iter()
                .position(|row| row.section_id() != id)
                .map_or(self.rows.len(), |offset| index + offset);

            self.write_label(f, index, header)?;
            writeln!(f)?;

            let children = &self.rows[index + 1..end];
            let (items, footer) = match children.split_last() {
                Some((last, items)) if last.kind.is_footer() => (items, Some(last)),
                _ => (children, None),
            };
            let shown = self
                .options
                .max_items
                .map_or(items.len(), |max| max.min(items.len()));
            let hidden = items.len() - shown;

            for (offset, row) in items[..shown].iter().enumerate() {
                let is_last = offset + 1 == shown && hidden == 0 && footer.is_none();
                write!(f, "{}", style.connector(is_last))?;
                self.write_label(f, index + 1 + offset, row)?;
                writeln!(f)?;
            }
            if hidden > 0 {
                writeln!(f, "{}({hidden} more)", style.connector(footer.is_none()))?;
            }
            if let Some(footer) = footer {
                write!(f, "{}", style.connector(true))?;
                self.write_label(f, end - 1, footer)?;
                writeln!(f)?;
            }
            index = end;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemRef, Section};
    use std::sync::Arc;
    use strata_core::TreeStyle;

    fn rows() -> Vec<Row> {
        let section = Arc::new(Section::new("General").with_footer_text("Shown to others"));
        let mut rows = vec![Row::boundary(&section, RowKind::TextHeader)];
        for text in ["a", "b", "c"] {
            let item: ItemRef = Arc::new(text.to_string());
            rows.push(Row::item(&section, item, 4));
        }
        rows.push(Row::boundary(&section, RowKind::TextFooter));
        rows
    }

    #[test]
    fn test_minimal_ascii() {
        let options = TreeFormatOptions::minimal().with_style(TreeStyle::Ascii);
        let dump = RowsDebug::with_options(options).format(&rows());
        assert_eq!(
            dump,
            "General\n+-- \"a\"\n+-- \"b\"\n+-- \"c\"\n`-- footer: Shown to others\n"
        );
    }

    #[test]
    fn test_max_items() {
        let options = TreeFormatOptions::minimal()
            .with_style(TreeStyle::Compact)
            .with_max_items(1);
        let dump = RowsDebug::with_options(options).format(&rows());
        assert_eq!(dump, "General\n- \"a\"\n- (2 more)\n- footer: Shown to others\n");
    }

    #[test]
    fn test_full_labels() {
        let dump = RowsDebug::new().format(&rows());
        let first = dump.lines().next().unwrap();
        assert_eq!(first, "[0] General (TextHeader 0)");
        assert!(dump.contains("[1] String \"a\" (Item(4) 4)"));
        assert!(dump.contains("[4] footer: Shown to others (TextFooter 1)"));
    }

    #[test]
    fn test_empty() {
        assert_eq!(RowsDebug::new().format(&[]), "");
    }
}
