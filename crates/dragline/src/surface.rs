#![forbid(unsafe_code)]

//! The drop-surface role.
//!
//! [`DropSurface`] binds one element as a [`DropTarget`]. Enter and leave flip
//! the hover flag and re-settle the state cell. A drop clears the flag and
//! moves straight to idle, even when the element dropped onto itself. No
//! callback touches the geometry cells, which belong to the element's own
//! gesture.

use std::fmt;
use std::rc::Rc;

use crate::data::DragData;
use crate::drag::{DropTarget, DropTargetArgs, GestureArgs, PayloadFn, Predicate};
use crate::element::ElementRef;
use crate::state::{DraggableState, InteractionState};

/// Drop surface bound to one element.
pub struct DropSurface {
    element: ElementRef,
    can_accept: Option<Predicate<DropTargetArgs>>,
    context_payload: Option<PayloadFn<DropTargetArgs>>,
    state: InteractionState,
}

impl DropSurface {
    /// Bind `element`, writing into `state`.
    #[must_use]
    pub fn new(element: ElementRef, state: InteractionState) -> Self {
        Self {
            element,
            can_accept: None,
            context_payload: None,
            state,
        }
    }

    /// Gate which gestures this surface accepts.
    #[must_use]
    pub fn with_can_accept(mut self, predicate: Option<Predicate<DropTargetArgs>>) -> Self {
        self.can_accept = predicate;
        self
    }

    /// Attach data the drop callback receives.
    #[must_use]
    pub fn with_context_payload(mut self, payload: Option<PayloadFn<DropTargetArgs>>) -> Self {
        self.context_payload = payload;
        self
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    fn settle_hover(&self, hovered: bool) {
        self.state.set_hovered(hovered);
        self.state.transition(self.state.settled());
    }
}

impl DropTarget for DropSurface {
    fn element(&self) -> ElementRef {
        Rc::clone(&self.element)
    }

    fn can_accept(&self, args: &DropTargetArgs) -> bool {
        self.can_accept.as_ref().is_none_or(|p| p(args))
    }

    fn context_payload(&self, args: &DropTargetArgs) -> DragData {
        self.context_payload
            .as_ref()
            .map(|f| f(args))
            .unwrap_or_default()
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn on_gesture_enter(&self, args: &GestureArgs) {
        dragline_core::debug!(
            source = args.source.id.0,
            target = self.element.debug_name(),
            "gesture entered drop surface"
        );
        self.settle_hover(true);
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn on_gesture_leave(&self, args: &GestureArgs) {
        dragline_core::debug!(
            source = args.source.id.0,
            target = self.element.debug_name(),
            "gesture left drop surface"
        );
        self.settle_hover(false);
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn on_gesture_dropped(&self, args: &GestureArgs) {
        dragline_core::debug!(
            source = args.source.id.0,
            target = self.element.debug_name(),
            "gesture dropped on surface"
        );
        self.state.set_hovered(false);
        self.state.transition(DraggableState::Idle);
    }
}

impl fmt::Debug for DropSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropSurface")
            .field("element", &self.element.debug_name())
            .field("state", &self.state)
            .finish()
    }
}
