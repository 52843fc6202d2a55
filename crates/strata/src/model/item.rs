//! Items and item shapes.
//!
//! An item is any value a section can hold. Its [`Shape`] identifies which
//! processing or rendering strategy applies to it; shapes are what the
//! [`ViewTypeRegistry`](super::ViewTypeRegistry) hands out codes for.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Shared handle to an item stored in a section.
pub type ItemRef = Arc<dyn Item>;

/// Trait for values stored in a [`Section`](super::Section).
///
/// The default [`shape`](Item::shape) is the concrete Rust type, so every
/// distinct item type is classified separately. Override it to classify by
/// a tag instead, e.g. when one enum carries several visual shapes.
///
/// # Example
///
/// ```
/// use strata::model::{Item, Shape};
///
/// #[derive(Debug)]
/// struct SwitchCell {
///     on: bool,
/// }
///
/// impl Item for SwitchCell {}
///
/// let cell = SwitchCell { on: true };
/// assert_eq!(cell.shape(), Shape::of::<SwitchCell>());
/// ```
pub trait Item: Any + Send + Sync + fmt::Debug {
    /// Returns the shape used to classify this item.
    fn shape(&self) -> Shape {
        Shape::of::<Self>()
    }
}

impl Item for String {}

/// Identity of an item shape.
#[derive(Clone, Copy)]
pub struct Shape {
    key: ShapeKey,
    name: &'static str,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum ShapeKey {
    Type(TypeId),
    Tag(&'static str),
}

impl Shape {
    /// The shape of every value of type `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            key: ShapeKey::Type(TypeId::of::<T>()),
            name: std::any::type_name::<T>(),
        }
    }

    /// A shape identified by a static tag rather than a type.
    pub const fn tagged(tag: &'static str) -> Self {
        Self {
            key: ShapeKey::Tag(tag),
            name: tag,
        }
    }

    /// Human-readable name, for diagnostics only.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The name without its module path.
    pub fn short_name(&self) -> &'static str {
        match self.key {
            ShapeKey::Type(_) => self.name.rsplit("::").next().unwrap_or(self.name),
            ShapeKey::Tag(tag) => tag,
        }
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Shape {}

impl Hash for Shape {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shape").field(&self.name).finish()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Returns `true` if both handles point at the same item.
pub(crate) fn same_item(a: &ItemRef, b: &ItemRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
