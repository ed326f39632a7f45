#![forbid(unsafe_code)]

//! The drag controller: one element, both roles, one state.
//!
//! [`DragController`] is what host components use. It owns an
//! [`InteractionState`], a [`PreviewProjector`] watching it, and, once
//! mounted, the registrations of a [`GestureSource`] and a [`DropSurface`]
//! bound to the same element.
//!
//! # Lifecycle
//!
//! 1. `new` creates the state cells and starts the projector. Nothing is
//!    bound yet; the element may not exist.
//! 2. `mount` resolves the element once. If it is absent, nothing is
//!    installed and the controller stays `Idle` until a later mount finds it.
//! 3. `unmount` (or drop) uninstalls both roles and returns to `Idle` with
//!    cleared geometry.

use std::fmt;
use std::rc::Rc;

use dragline_core::frame::FrameScheduler;
use dragline_core::observable::Observable;

use crate::data::DragData;
use crate::drag::{DragStartArgs, DropTargetArgs, GestureCapture, Registration, combine};
use crate::element::{ElementRef, ElementSource, WeakElement};
use crate::projector::PreviewProjector;
use crate::source::GestureSource;
use crate::state::{DraggableState, InteractionState, PreviewDescriptor, SelfDropPrecedence};
use crate::surface::DropSurface;

// ---------------------------------------------------------------------------
// DraggableOptions
// ---------------------------------------------------------------------------

/// Host configuration for a [`DragController`].
///
/// Every hook is optional; the defaults allow every gesture and attach no
/// data.
#[derive(Clone, Default)]
pub struct DraggableOptions {
    element: ElementSource,
    handle: Option<ElementRef>,
    can_drag: Option<Rc<dyn Fn(&DragStartArgs) -> bool>>,
    can_drop: Option<Rc<dyn Fn(&DropTargetArgs) -> bool>>,
    get_initial_data: Option<Rc<dyn Fn(&DragStartArgs) -> DragData>>,
    get_data: Option<Rc<dyn Fn(&DropTargetArgs) -> DragData>>,
    self_drop: SelfDropPrecedence,
}

impl DraggableOptions {
    /// Options for the element `element` resolves to at mount time.
    #[must_use]
    pub fn new(element: impl Into<ElementSource>) -> Self {
        Self {
            element: element.into(),
            ..Self::default()
        }
    }

    /// Restrict grabbing to a sub-element.
    #[must_use]
    pub fn with_handle(mut self, handle: ElementRef) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Gate gesture start.
    #[must_use]
    pub fn with_can_drag(mut self, f: impl Fn(&DragStartArgs) -> bool + 'static) -> Self {
        self.can_drag = Some(Rc::new(f));
        self
    }

    /// Gate which gestures the element accepts as a drop surface.
    #[must_use]
    pub fn with_can_drop(mut self, f: impl Fn(&DropTargetArgs) -> bool + 'static) -> Self {
        self.can_drop = Some(Rc::new(f));
        self
    }

    /// Data visible to drop surfaces while this element is dragged.
    #[must_use]
    pub fn with_initial_data(mut self, f: impl Fn(&DragStartArgs) -> DragData + 'static) -> Self {
        self.get_initial_data = Some(Rc::new(f));
        self
    }

    /// Data this element contributes when something is dropped on it.
    #[must_use]
    pub fn with_data(mut self, f: impl Fn(&DropTargetArgs) -> DragData + 'static) -> Self {
        self.get_data = Some(Rc::new(f));
        self
    }

    /// What the state shows while the element's own gesture hovers it.
    #[must_use]
    pub fn with_self_drop_precedence(mut self, precedence: SelfDropPrecedence) -> Self {
        self.self_drop = precedence;
        self
    }
}

impl fmt::Debug for DraggableOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraggableOptions")
            .field("element", &self.element)
            .field("has_handle", &self.handle.is_some())
            .field("can_drag", &self.can_drag.is_some())
            .field("can_drop", &self.can_drop.is_some())
            .field("get_initial_data", &self.get_initial_data.is_some())
            .field("get_data", &self.get_data.is_some())
            .field("self_drop", &self.self_drop)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// DragController
// ---------------------------------------------------------------------------

/// Binds one element as drag source and drop surface.
pub struct DragController {
    options: DraggableOptions,
    state: InteractionState,
    projector: PreviewProjector,
    element: Option<ElementRef>,
    registration: Option<Registration>,
}

impl DragController {
    /// Create an unmounted controller.
    ///
    /// The projector starts immediately and writes through `scheduler`.
    #[must_use]
    pub fn new(options: DraggableOptions, scheduler: Rc<dyn FrameScheduler>) -> Self {
        let state = InteractionState::new(options.self_drop);
        let projector = PreviewProjector::attach(&state, scheduler);
        Self {
            options,
            state,
            projector,
            element: None,
            registration: None,
        }
    }

    /// Resolve the element and install both roles into `capture`.
    ///
    /// Returns `true` if the roles are installed. Mounting an already
    /// mounted controller does nothing.
    pub fn mount(&mut self, capture: &dyn GestureCapture) -> bool {
        if self.registration.is_some() {
            return true;
        }

        let Some(element) = self.options.element.resolve() else {
            dragline_core::debug!("no element at mount; drag binding skipped");
            return false;
        };

        let source = GestureSource::new(Rc::clone(&element), self.state.clone())
            .with_handle(self.options.handle.clone())
            .with_can_start(self.options.can_drag.clone())
            .with_initial_payload(self.options.get_initial_data.clone());
        let surface = DropSurface::new(Rc::clone(&element), self.state.clone())
            .with_can_accept(self.options.can_drop.clone())
            .with_context_payload(self.options.get_data.clone());

        self.registration = Some(combine([
            capture.register_draggable(Rc::new(source)),
            capture.register_drop_target(Rc::new(surface)),
        ]));

        dragline_core::debug!(element = element.debug_name(), "drag binding installed");
        self.element = Some(element);
        true
    }

    /// Uninstall both roles and return to `Idle` with cleared geometry.
    pub fn unmount(&mut self) {
        let Some(registration) = self.registration.take() else {
            return;
        };
        registration.cleanup();
        self.element = None;

        self.state.set_source_active(false);
        self.state.set_hovered(false);
        self.state.transition(DraggableState::Idle);
        self.state.reset();
        dragline_core::debug!("drag binding removed");
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.registration.is_some()
    }

    /// The element resolved at mount, if mounted.
    #[must_use]
    pub fn element(&self) -> Option<&ElementRef> {
        self.element.as_ref()
    }

    /// `idle`, `dragging` or `over`.
    pub fn state(&self) -> &Observable<DraggableState> {
        self.state.state()
    }

    /// Descriptor published when a preview was requested.
    pub fn preview(&self) -> &Observable<Option<PreviewDescriptor>> {
        self.state.preview()
    }

    /// Binding target for the node that should follow the pointer.
    pub fn preview_element(&self) -> &Observable<Option<WeakElement>> {
        self.state.preview_element()
    }

    /// Bind `element` as the node that follows the pointer.
    pub fn bind_preview_element(&self, element: &ElementRef) {
        self.state
            .preview_element()
            .set(Some(Rc::downgrade(element)));
    }

    /// Full interaction state, including pointer and offset.
    pub fn interaction(&self) -> &InteractionState {
        &self.state
    }

    pub fn projector(&self) -> &PreviewProjector {
        &self.projector
    }
}

impl fmt::Debug for DragController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragController")
            .field("options", &self.options)
            .field("mounted", &self.is_mounted())
            .field("state", &self.state)
            .field("projector", &self.projector)
            .finish()
    }
}
