#![forbid(unsafe_code)]

//! Protocol probes.
//!
//! [`ProbeSource`] and [`ProbeTarget`] implement the drag roles by writing
//! one line per callback into a shared [`CallLog`], so tests can assert
//! on the exact callback order a capture delivers.
//!
//! | Callback | Line |
//! |----------|------|
//! | preview request | `<name>:preview` |
//! | start / move | `<name>:start`, `<name>:move` |
//! | end | `<name>:end(dropped)`, `<name>:end(cancelled)` |
//! | enter / leave / drop | `<name>:enter`, `<name>:leave`, `<name>:drop` |

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use dragline::{
    DragData, DragStartArgs, Draggable, DropOutcome, DropTarget, DropTargetArgs, ElementRef,
    GestureArgs, PreviewArgs, TargetId,
};

/// Shared, ordered record of callbacks.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    lines: Rc<RefCell<Vec<String>>>,
}

impl CallLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, line: impl Into<String>) {
        self.lines.borrow_mut().push(line.into());
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Return the recorded lines and start over.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.borrow_mut())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.borrow().is_empty()
    }
}

// ---------------------------------------------------------------------------
// ProbeSource
// ---------------------------------------------------------------------------

/// Draggable that logs its callbacks.
pub struct ProbeSource {
    name: String,
    element: ElementRef,
    handle: Option<ElementRef>,
    allow: Cell<bool>,
    payload: DragData,
    suppress_native: bool,
    log: CallLog,
    last_targets: RefCell<Vec<TargetId>>,
}

impl ProbeSource {
    #[must_use]
    pub fn new(name: impl Into<String>, element: ElementRef, log: &CallLog) -> Self {
        Self {
            name: name.into(),
            element,
            handle: None,
            allow: Cell::new(true),
            payload: DragData::new(),
            suppress_native: false,
            log: log.clone(),
            last_targets: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_handle(mut self, handle: ElementRef) -> Self {
        self.handle = Some(handle);
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: DragData) -> Self {
        self.payload = payload;
        self
    }

    /// Suppress the native drag image when a preview is requested.
    #[must_use]
    pub fn suppressing_native(mut self) -> Self {
        self.suppress_native = true;
        self
    }

    /// Make `can_start` answer `allow`.
    pub fn set_allow(&self, allow: bool) {
        self.allow.set(allow);
    }

    /// Targets listed in the most recent callback's arguments.
    #[must_use]
    pub fn last_targets(&self) -> Vec<TargetId> {
        self.last_targets.borrow().clone()
    }

    fn record(&self, what: &str, args: &GestureArgs) {
        *self.last_targets.borrow_mut() = args.drop_targets.iter().map(|t| t.id).collect();
        self.log.push(format!("{}:{what}", self.name));
    }
}

impl Draggable for ProbeSource {
    fn element(&self) -> ElementRef {
        Rc::clone(&self.element)
    }

    fn drag_handle(&self) -> Option<ElementRef> {
        self.handle.clone()
    }

    fn can_start(&self, _args: &DragStartArgs) -> bool {
        self.allow.get()
    }

    fn initial_payload(&self, _args: &DragStartArgs) -> DragData {
        self.payload.clone()
    }

    fn on_preview_requested(&self, args: &mut PreviewArgs<'_>) {
        if self.suppress_native {
            args.native.suppress();
        }
        self.log.push(format!("{}:preview", self.name));
    }

    fn on_gesture_start(&self, args: &GestureArgs) {
        self.record("start", args);
    }

    fn on_gesture_move(&self, args: &GestureArgs) {
        self.record("move", args);
    }

    fn on_gesture_end(&self, args: &GestureArgs, outcome: DropOutcome) {
        let what = match outcome {
            DropOutcome::Dropped => "end(dropped)",
            DropOutcome::Cancelled => "end(cancelled)",
        };
        self.record(what, args);
    }
}

// ---------------------------------------------------------------------------
// ProbeTarget
// ---------------------------------------------------------------------------

/// Drop target that logs its callbacks.
pub struct ProbeTarget {
    name: String,
    element: ElementRef,
    accept: Option<Rc<dyn Fn(&DropTargetArgs) -> bool>>,
    context: DragData,
    log: CallLog,
    dropped_payloads: RefCell<Vec<DragData>>,
}

impl ProbeTarget {
    #[must_use]
    pub fn new(name: impl Into<String>, element: ElementRef, log: &CallLog) -> Self {
        Self {
            name: name.into(),
            element,
            accept: None,
            context: DragData::new(),
            log: log.clone(),
            dropped_payloads: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_accept(mut self, accept: impl Fn(&DropTargetArgs) -> bool + 'static) -> Self {
        self.accept = Some(Rc::new(accept));
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: DragData) -> Self {
        self.context = context;
        self
    }

    /// Source payloads seen by `on_gesture_dropped`.
    #[must_use]
    pub fn dropped_payloads(&self) -> Vec<DragData> {
        self.dropped_payloads.borrow().clone()
    }
}

impl DropTarget for ProbeTarget {
    fn element(&self) -> ElementRef {
        Rc::clone(&self.element)
    }

    fn can_accept(&self, args: &DropTargetArgs) -> bool {
        self.accept.as_ref().is_none_or(|f| f(args))
    }

    fn context_payload(&self, _args: &DropTargetArgs) -> DragData {
        self.context.clone()
    }

    fn on_gesture_enter(&self, _args: &GestureArgs) {
        self.log.push(format!("{}:enter", self.name));
    }

    fn on_gesture_leave(&self, _args: &GestureArgs) {
        self.log.push(format!("{}:leave", self.name));
    }

    fn on_gesture_dropped(&self, args: &GestureArgs) {
        self.dropped_payloads
            .borrow_mut()
            .push(args.source.data.clone());
        self.log.push(format!("{}:drop", self.name));
    }
}
