#![forbid(unsafe_code)]

//! Interaction state: the single source of truth for a bound element.
//!
//! [`InteractionState`] holds the observable cells a host reads (`state`,
//! `preview`, `preview_element`) and the derived geometry the projector
//! consumes (`pointer`, `offset`). Only the gesture source and drop surface
//! bound to the same element write into it.
//!
//! # Invariants
//!
//! 1. Exactly one of `Idle`, `Dragging`, `Over` is visible at a time; `Idle`
//!    is the default and every finished gesture returns to it.
//! 2. [`reset`](InteractionState::reset) clears `pointer`, `offset`, `preview`
//!    and `preview_element` together and leaves `state` alone.
//! 3. Hover changes never touch geometry.
//!
//! # Self-drop precedence
//!
//! When the source and drop surface share one element, the element's own
//! gesture can hover the element. [`SelfDropPrecedence`] decides what the
//! state cell shows then; leaving the element during its own gesture always
//! returns to `Dragging`, never `Idle`.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use dragline_core::event::PointerSample;
use dragline_core::geometry::{Offset, Rect};
use dragline_core::observable::Observable;

use crate::element::{ElementRef, WeakElement};

/// Externally visible interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DraggableState {
    /// No gesture involves this element.
    #[default]
    Idle,
    /// This element is the one being dragged.
    Dragging,
    /// A gesture is hovering this element as a drop target.
    Over,
}

impl DraggableState {
    /// Lowercase name, as hosts typically bind it into class names.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging => "dragging",
            Self::Over => "over",
        }
    }
}

impl fmt::Display for DraggableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the state cell shows while an element's own gesture hovers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelfDropPrecedence {
    /// Show `Over`; pointer moves do not flip it back to `Dragging`.
    #[default]
    OverWins,
    /// Keep showing `Dragging` for the whole self-hover.
    DraggingWins,
}

/// The visual that follows the pointer, captured when a preview is requested.
#[derive(Clone)]
pub struct PreviewDescriptor {
    /// Non-owning reference to the node used for the preview.
    pub element: WeakElement,
    /// The node's bounds when the preview was generated.
    pub bounds: Rect,
}

impl PreviewDescriptor {
    /// The preview node, if it is still alive.
    #[must_use]
    pub fn element(&self) -> Option<ElementRef> {
        self.element.upgrade()
    }
}

impl PartialEq for PreviewDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.element, &other.element) && self.bounds == other.bounds
    }
}

impl fmt::Debug for PreviewDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewDescriptor")
            .field("alive", &(self.element.strong_count() > 0))
            .field("bounds", &self.bounds)
            .finish()
    }
}

/// Observable state and geometry for one bound element.
///
/// Cloning produces another handle to the same cells.
#[derive(Clone)]
pub struct InteractionState {
    state: Observable<DraggableState>,
    pointer: Observable<Option<PointerSample>>,
    offset: Observable<Option<Offset>>,
    preview: Observable<Option<PreviewDescriptor>>,
    preview_element: Observable<Option<WeakElement>>,
    source_active: Rc<Cell<bool>>,
    hovered: Rc<Cell<bool>>,
    precedence: SelfDropPrecedence,
}

impl InteractionState {
    /// Fresh, idle state.
    #[must_use]
    pub fn new(precedence: SelfDropPrecedence) -> Self {
        Self {
            state: Observable::new(DraggableState::Idle),
            pointer: Observable::new(None),
            offset: Observable::new(None),
            preview: Observable::new(None),
            preview_element: Observable::new(None),
            source_active: Rc::new(Cell::new(false)),
            hovered: Rc::new(Cell::new(false)),
            precedence,
        }
    }

    /// Visible interaction state of the element.
    pub fn state(&self) -> &Observable<DraggableState> {
        &self.state
    }

    /// Latest pointer sample of this element's own gesture.
    pub fn pointer(&self) -> &Observable<Option<PointerSample>> {
        &self.pointer
    }

    /// Grab offset of this element's own gesture.
    pub fn offset(&self) -> &Observable<Option<Offset>> {
        &self.offset
    }

    /// Preview requested by the gesture, if any.
    pub fn preview(&self) -> &Observable<Option<PreviewDescriptor>> {
        &self.preview
    }

    /// Binding target for the node the projector moves.
    pub fn preview_element(&self) -> &Observable<Option<WeakElement>> {
        &self.preview_element
    }

    /// Rule applied when the element hovers over itself.
    #[must_use]
    pub fn precedence(&self) -> SelfDropPrecedence {
        self.precedence
    }

    /// Whether this element's own gesture is in flight.
    #[must_use]
    pub fn is_source_active(&self) -> bool {
        self.source_active.get()
    }

    /// Whether a gesture is hovering this element.
    #[must_use]
    pub fn is_hovered(&self) -> bool {
        self.hovered.get()
    }

    /// Unconditional state write. Subscribers are notified only on change.
    pub(crate) fn transition(&self, to: DraggableState) {
        if self.state.set_if_changed(to) {
            dragline_core::trace!(state = to.as_str(), "interaction state changed");
        }
    }

    /// Clear all geometry. Does not touch `state`.
    pub(crate) fn reset(&self) {
        self.preview_element.set(None);
        self.preview.set(None);
        self.pointer.set(None);
        self.offset.set(None);
    }

    pub(crate) fn set_source_active(&self, active: bool) {
        self.source_active.set(active);
    }

    pub(crate) fn set_hovered(&self, hovered: bool) {
        self.hovered.set(hovered);
    }

    /// The state implied by the current source and hover flags.
    pub(crate) fn settled(&self) -> DraggableState {
        match (self.source_active.get(), self.hovered.get()) {
            (true, true) => match self.precedence {
                SelfDropPrecedence::OverWins => DraggableState::Over,
                SelfDropPrecedence::DraggingWins => DraggableState::Dragging,
            },
            (true, false) => DraggableState::Dragging,
            (false, true) => DraggableState::Over,
            (false, false) => DraggableState::Idle,
        }
    }

    /// Whether every geometry cell is empty.
    #[must_use]
    pub fn is_geometry_clear(&self) -> bool {
        self.pointer.with(Option::is_none)
            && self.offset.with(Option::is_none)
            && self.preview.with(Option::is_none)
            && self.preview_element.with(Option::is_none)
    }
}

impl Default for InteractionState {
    fn default() -> Self {
        Self::new(SelfDropPrecedence::default())
    }
}

impl fmt::Debug for InteractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionState")
            .field("state", &self.state.get())
            .field("pointer", &self.pointer.get())
            .field("offset", &self.offset.get())
            .field("preview", &self.preview.get())
            .field(
                "preview_element",
                &self.preview_element.with(|e| e.as_ref().map(|w| w.strong_count() > 0)),
            )
            .field("source_active", &self.source_active.get())
            .field("hovered", &self.hovered.get())
            .finish()
    }
}
