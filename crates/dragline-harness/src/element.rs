#![forbid(unsafe_code)]

//! Scriptable element double.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use dragline::{Element, ElementRef};
use dragline_core::geometry::{Offset, Rect};

/// Element whose rectangle tests control and whose transform writes are
/// recorded.
pub struct TestElement {
    name: String,
    rect: Cell<Option<Rect>>,
    translations: RefCell<Vec<Offset>>,
}

impl TestElement {
    /// A laid-out element.
    #[must_use]
    pub fn at(name: impl Into<String>, rect: Rect) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            rect: Cell::new(Some(rect)),
            translations: RefCell::new(Vec::new()),
        })
    }

    /// An element that is not in the layout tree.
    #[must_use]
    pub fn detached(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            rect: Cell::new(None),
            translations: RefCell::new(Vec::new()),
        })
    }

    /// The element as the trait object the controller binds to.
    #[must_use]
    pub fn to_ref(self: &Rc<Self>) -> ElementRef {
        Rc::clone(self) as ElementRef
    }

    /// Move or resize the element (scrolling, layout shifts).
    pub fn set_rect(&self, rect: Rect) {
        self.rect.set(Some(rect));
    }

    /// Take the element out of layout.
    pub fn detach(&self) {
        self.rect.set(None);
    }

    /// Most recent translation written, if any.
    #[must_use]
    pub fn translation(&self) -> Option<Offset> {
        self.translations.borrow().last().copied()
    }

    /// Every translation written, oldest first.
    #[must_use]
    pub fn translations(&self) -> Vec<Offset> {
        self.translations.borrow().clone()
    }

    #[must_use]
    pub fn write_count(&self) -> usize {
        self.translations.borrow().len()
    }
}

impl Element for TestElement {
    fn bounding_rect(&self) -> Option<Rect> {
        self.rect.get()
    }

    fn set_translation(&self, translation: Offset) {
        self.translations.borrow_mut().push(translation);
    }

    fn debug_name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for TestElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestElement")
            .field("name", &self.name)
            .field("rect", &self.rect.get())
            .field("writes", &self.write_count())
            .finish()
    }
}
