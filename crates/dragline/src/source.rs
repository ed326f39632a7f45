#![forbid(unsafe_code)]

//! The drag-source role.
//!
//! [`GestureSource`] binds one element as a [`Draggable`] and writes the
//! gesture's geometry into an [`InteractionState`].
//!
//! The grab offset is measured once, at start, from the element's rectangle
//! at that instant. Bind-time measurement would be wrong after scrolling or
//! layout shifts between mount and press.

use std::fmt;
use std::rc::Rc;

use dragline_core::geometry::Rect;

use crate::data::DragData;
use crate::drag::{
    DragStartArgs, Draggable, DropOutcome, GestureArgs, PayloadFn, Predicate, PreviewArgs,
};
use crate::element::ElementRef;
use crate::state::{DraggableState, InteractionState, PreviewDescriptor};

/// Drag source bound to one element.
pub struct GestureSource {
    element: ElementRef,
    handle: Option<ElementRef>,
    can_start: Option<Predicate<DragStartArgs>>,
    initial_payload: Option<PayloadFn<DragStartArgs>>,
    state: InteractionState,
}

impl GestureSource {
    /// Bind `element`, writing into `state`.
    #[must_use]
    pub fn new(element: ElementRef, state: InteractionState) -> Self {
        Self {
            element,
            handle: None,
            can_start: None,
            initial_payload: None,
            state,
        }
    }

    /// Only presses on `handle` may start a gesture.
    #[must_use]
    pub fn with_handle(mut self, handle: Option<ElementRef>) -> Self {
        self.handle = handle;
        self
    }

    /// Gate gesture start.
    #[must_use]
    pub fn with_can_start(mut self, predicate: Option<Predicate<DragStartArgs>>) -> Self {
        self.can_start = predicate;
        self
    }

    /// Attach data visible to drop targets.
    #[must_use]
    pub fn with_initial_payload(mut self, payload: Option<PayloadFn<DragStartArgs>>) -> Self {
        self.initial_payload = payload;
        self
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }
}

impl Draggable for GestureSource {
    fn element(&self) -> ElementRef {
        Rc::clone(&self.element)
    }

    fn drag_handle(&self) -> Option<ElementRef> {
        self.handle.clone()
    }

    fn can_start(&self, args: &DragStartArgs) -> bool {
        self.can_start.as_ref().is_none_or(|p| p(args))
    }

    fn initial_payload(&self, args: &DragStartArgs) -> DragData {
        self.initial_payload
            .as_ref()
            .map(|f| f(args))
            .unwrap_or_default()
    }

    fn on_preview_requested(&self, args: &mut PreviewArgs<'_>) {
        args.native.suppress();

        let Some(bounds) = args
            .source
            .element
            .bounding_rect()
            .filter(|r| !r.is_empty())
        else {
            dragline_core::debug!(
                element = args.source.element.debug_name(),
                "preview source not measurable; no preview published"
            );
            return;
        };

        self.state.preview().set(Some(PreviewDescriptor {
            element: Rc::downgrade(&args.source.element),
            bounds,
        }));
    }

    fn on_gesture_start(&self, args: &GestureArgs) {
        self.state.set_source_active(true);
        self.state.transition(self.state.settled());

        let input = args.location.current;
        let offset = self
            .element
            .bounding_rect()
            .filter(Rect::is_finite)
            .map(|rect| rect.offset_to(input.client()));

        dragline_core::debug!(
            source = args.source.id.0,
            x = input.client_x,
            y = input.client_y,
            ?offset,
            "gesture started"
        );

        self.state.offset().set(offset);
        self.state.pointer().set(Some(input));
    }

    fn on_gesture_move(&self, args: &GestureArgs) {
        self.state.transition(self.state.settled());
        self.state.pointer().set(Some(args.location.current));
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn on_gesture_end(&self, args: &GestureArgs, outcome: DropOutcome) {
        dragline_core::debug!(source = args.source.id.0, ?outcome, "gesture ended");

        self.state.set_source_active(false);
        self.state.set_hovered(false);
        self.state.transition(DraggableState::Idle);
        self.state.reset();
    }
}

impl fmt::Debug for GestureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureSource")
            .field("element", &self.element.debug_name())
            .field("has_handle", &self.handle.is_some())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::{DragLocation, NativeDragImage, SourceId, SourceInfo};
    use dragline_core::event::PointerSample;
    use dragline_core::geometry::Offset;
    use std::cell::Cell;

    struct Node {
        rect: Cell<Option<Rect>>,
    }

    impl crate::element::Element for Node {
        fn bounding_rect(&self) -> Option<Rect> {
            self.rect.get()
        }

        fn set_translation(&self, _translation: Offset) {}
    }

    #[derive(Default)]
    struct NativeFlag(bool);

    impl NativeDragImage for NativeFlag {
        fn suppress(&mut self) {
            self.0 = true;
        }
    }

    fn node(rect: Option<Rect>) -> Rc<Node> {
        Rc::new(Node {
            rect: Cell::new(rect),
        })
    }

    fn args(element: &ElementRef, initial: PointerSample, current: PointerSample) -> GestureArgs {
        GestureArgs {
            location: DragLocation { initial, current },
            source: SourceInfo {
                id: SourceId(1),
                element: Rc::clone(element),
                drag_handle: None,
                data: DragData::default(),
            },
            drop_targets: Vec::new(),
        }
    }

    #[test]
    fn start_computes_offset_from_rect_at_start() {
        let n = node(Some(Rect::new(0.0, 0.0, 50.0, 50.0)));
        let element: ElementRef = n.clone();
        let source = GestureSource::new(Rc::clone(&element), InteractionState::default());

        // Layout shifted between bind and press.
        n.rect.set(Some(Rect::new(100.0, 50.0, 50.0, 50.0)));
        let start = PointerSample::new(140.0, 70.0);
        source.on_gesture_start(&args(&element, start, start));

        let state = source.state();
        assert_eq!(state.state().get(), DraggableState::Dragging);
        assert_eq!(state.offset().get(), Some(Offset::new(40.0, 20.0)));
        assert_eq!(state.pointer().get(), Some(start));
    }

    #[test]
    fn move_updates_pointer_only() {
        let element: ElementRef = node(Some(Rect::new(100.0, 50.0, 50.0, 50.0)));
        let source = GestureSource::new(Rc::clone(&element), InteractionState::default());
        let start = PointerSample::new(140.0, 70.0);
        source.on_gesture_start(&args(&element, start, start));

        let next = PointerSample::new(200.0, 130.0);
        source.on_gesture_move(&args(&element, start, next));
        assert_eq!(source.state().pointer().get(), Some(next));
        assert_eq!(source.state().offset().get(), Some(Offset::new(40.0, 20.0)));
    }

    #[test]
    fn end_resets_and_is_idempotent() {
        let element: ElementRef = node(Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
        let source = GestureSource::new(Rc::clone(&element), InteractionState::default());
        let start = PointerSample::new(5.0, 5.0);
        let a = args(&element, start, start);
        source.on_gesture_start(&a);

        for _ in 0..2 {
            source.on_gesture_end(&a, DropOutcome::Cancelled);
            assert_eq!(source.state().state().get(), DraggableState::Idle);
            assert!(source.state().is_geometry_clear());
        }
    }

    #[test]
    fn unmeasurable_element_leaves_offset_empty() {
        let element: ElementRef = node(None);
        let source = GestureSource::new(Rc::clone(&element), InteractionState::default());
        let start = PointerSample::new(5.0, 5.0);
        source.on_gesture_start(&args(&element, start, start));
        assert_eq!(source.state().state().get(), DraggableState::Dragging);
        assert_eq!(source.state().offset().get(), None);
        assert_eq!(source.state().pointer().get(), Some(start));
    }

    #[test]
    fn preview_suppresses_native_and_publishes_bounds() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        let element: ElementRef = node(Some(rect));
        let source = GestureSource::new(Rc::clone(&element), InteractionState::default());
        let mut native = NativeFlag::default();
        let s = PointerSample::new(15.0, 25.0);
        let base = args(&element, s, s);
        source.on_preview_requested(&mut PreviewArgs {
            location: base.location,
            source: base.source.clone(),
            native: &mut native,
        });

        assert!(native.0);
        let preview = source.state().preview().get().expect("published");
        assert_eq!(preview.bounds, rect);
        assert!(preview.element().is_some());
    }

    #[test]
    fn zero_size_preview_publishes_nothing() {
        let element: ElementRef = node(Some(Rect::new(10.0, 20.0, 0.0, 0.0)));
        let source = GestureSource::new(Rc::clone(&element), InteractionState::default());
        let mut native = NativeFlag::default();
        let s = PointerSample::new(10.0, 20.0);
        let base = args(&element, s, s);
        source.on_preview_requested(&mut PreviewArgs {
            location: base.location,
            source: base.source.clone(),
            native: &mut native,
        });

        assert!(native.0);
        assert!(source.state().preview().get().is_none());
    }

    #[test]
    fn predicates_default_to_allow_and_empty() {
        let element: ElementRef = node(Some(Rect::new(0.0, 0.0, 1.0, 1.0)));
        let source = GestureSource::new(Rc::clone(&element), InteractionState::default());
        let start_args = DragStartArgs {
            input: PointerSample::new(0.5, 0.5),
            element: Rc::clone(&element),
            drag_handle: None,
        };
        assert!(source.can_start(&start_args));
        assert!(source.initial_payload(&start_args).is_empty());

        let gated = GestureSource::new(Rc::clone(&element), InteractionState::default())
            .with_can_start(Some(Rc::new(|a: &DragStartArgs| a.input.client_x > 1.0)))
            .with_initial_payload(Some(Rc::new(|_: &DragStartArgs| {
                DragData::new().with("id", 9)
            })));
        assert!(!gated.can_start(&start_args));
        assert_eq!(gated.initial_payload(&start_args).get_int("id"), Some(9));
    }
}
