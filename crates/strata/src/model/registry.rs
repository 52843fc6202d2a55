//! Classification registry: stable integer codes for item shapes.

use std::collections::HashMap;

use strata_core::logging::targets;

use super::item::Shape;
use super::row::RESERVED_CODES;

/// Maps item shapes to integer view-type codes.
///
/// Codes `0..RESERVED_CODES` belong to the boundary rows. The first unseen
/// shape gets `RESERVED_CODES`, the next one the code after that, and so
/// on. A code, once assigned, is never reassigned or reused, even when
/// every row of that shape disappears.
#[derive(Debug, Clone, Default)]
pub struct ViewTypeRegistry {
    codes: HashMap<Shape, u32>,
    shapes: Vec<Shape>,
}

impl ViewTypeRegistry {
    /// Creates a registry holding only the reserved codes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the code for `shape`, allocating the next one if unseen.
    pub fn code_for(&mut self, shape: &Shape) -> u32 {
        if let Some(&code) = self.codes.get(shape) {
            return code;
        }
        let code = self.next_code();
        self.codes.insert(*shape, code);
        self.shapes.push(*shape);
        tracing::debug!(
            target: targets::PROJECTION,
            shape = shape.name(),
            code,
            "allocated view type"
        );
        code
    }

    /// Returns the code for `shape` without allocating.
    pub fn lookup(&self, shape: &Shape) -> Option<u32> {
        self.codes.get(shape).copied()
    }

    /// Returns the shape holding `code`, if it is an item code.
    pub fn shape_of(&self, code: u32) -> Option<Shape> {
        let offset = code.checked_sub(RESERVED_CODES)?;
        self.shapes.get(offset as usize).copied()
    }

    /// Number of item shapes seen so far.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns `true` if no item shape has been seen.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Number of distinct codes in use, reserved ones included.
    pub fn view_type_count(&self) -> usize {
        RESERVED_CODES as usize + self.shapes.len()
    }

    /// All item shapes, ordered by code.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Forgets every item shape.
    pub(crate) fn clear(&mut self) {
        self.codes.clear();
        self.shapes.clear();
    }

    fn next_code(&self) -> u32 {
        // Codes are dense, so the maximum is the last one handed out.
        RESERVED_CODES + self.shapes.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct B;

    #[test]
    fn test_first_codes_follow_reserved_range() {
        let mut registry = ViewTypeRegistry::new();
        assert_eq!(registry.view_type_count(), 4);
        assert_eq!(registry.code_for(&Shape::of::<A>()), 4);
        assert_eq!(registry.code_for(&Shape::of::<B>()), 5);
        assert_eq!(registry.code_for(&Shape::of::<A>()), 4);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.view_type_count(), 6);
    }

    #[test]
    fn test_lookup_does_not_allocate() {
        let mut registry = ViewTypeRegistry::new();
        assert_eq!(registry.lookup(&Shape::tagged("x")), None);
        assert!(registry.is_empty());

        registry.code_for(&Shape::tagged("x"));
        assert_eq!(registry.lookup(&Shape::tagged("x")), Some(4));
    }

    #[test]
    fn test_shape_of_code() {
        let mut registry = ViewTypeRegistry::new();
        registry.code_for(&Shape::tagged("x"));
        registry.code_for(&Shape::tagged("y"));

        assert_eq!(registry.shape_of(5), Some(Shape::tagged("y")));
        assert_eq!(registry.shape_of(0), None);
        assert_eq!(registry.shape_of(9), None);
        assert_eq!(registry.shapes(), &[Shape::tagged("x"), Shape::tagged("y")]);
    }
}
