#![forbid(unsafe_code)]

//! Host element handles.
//!
//! The controller never owns UI nodes. It sees them through [`Element`]: a
//! way to measure the node's current layout rectangle and a way to write a
//! 2-D translation onto its visual transform.

use std::fmt;
use std::rc::{Rc, Weak};

use dragline_core::geometry::{Offset, Rect};

/// A host UI node the controller can measure and move.
///
/// Methods take `&self`; implementations use interior mutability the same
/// way a retained UI tree does.
pub trait Element {
    /// The node's current layout rectangle in client space.
    ///
    /// Returns `None` if the node is detached or cannot be measured.
    fn bounding_rect(&self) -> Option<Rect>;

    /// Write a translation onto the node's visual transform.
    fn set_translation(&self, translation: Offset);

    /// Name used in diagnostics.
    fn debug_name(&self) -> &str {
        "element"
    }
}

/// Shared handle to a host element.
pub type ElementRef = Rc<dyn Element>;

/// Non-owning handle to a host element.
pub type WeakElement = Weak<dyn Element>;

/// Where the controller finds its element at mount time.
///
/// The element may not exist yet when the controller is configured (for
/// example when it sits behind a conditional render), so it is resolved
/// once, lazily, at mount.
#[derive(Clone, Default)]
pub enum ElementSource {
    /// A node known up front.
    Present(ElementRef),
    /// No node; mounting installs nothing.
    #[default]
    Absent,
    /// A node looked up when mounting.
    Getter(Rc<dyn Fn() -> Option<ElementRef>>),
}

impl ElementSource {
    /// Resolve from a getter evaluated at mount time.
    #[must_use]
    pub fn getter(f: impl Fn() -> Option<ElementRef> + 'static) -> Self {
        Self::Getter(Rc::new(f))
    }

    /// Produce the element, if there is one right now.
    #[must_use]
    pub fn resolve(&self) -> Option<ElementRef> {
        match self {
            Self::Present(element) => Some(Rc::clone(element)),
            Self::Absent => None,
            Self::Getter(f) => f(),
        }
    }
}

impl From<ElementRef> for ElementSource {
    fn from(element: ElementRef) -> Self {
        Self::Present(element)
    }
}

impl From<Option<ElementRef>> for ElementSource {
    fn from(element: Option<ElementRef>) -> Self {
        element.map_or(Self::Absent, Self::Present)
    }
}

impl fmt::Debug for ElementSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present(e) => f.debug_tuple("Present").field(&e.debug_name()).finish(),
            Self::Absent => f.write_str("Absent"),
            Self::Getter(_) => f.write_str("Getter(..)"),
        }
    }
}
