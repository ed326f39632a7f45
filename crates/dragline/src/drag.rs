#![forbid(unsafe_code)]

//! Drag-and-drop protocol.
//!
//! Defines the [`Draggable`] trait for drag sources and the [`DropTarget`]
//! trait for drop surfaces, the argument types passed to their callbacks, and
//! the [`GestureCapture`] seam through which they are installed.
//!
//! # Design
//!
//! Pointer capture and hit-testing are not part of the controller. Whatever
//! implements [`GestureCapture`] owns them and calls back into the registered
//! roles. [`GestureRouter`](crate::router::GestureRouter) is the implementation
//! shipped with this crate.
//!
//! ## Invariants
//!
//! A capture implementation must uphold these; the roles rely on them.
//!
//! 1. A gesture is well-formed: one `on_preview_requested`, one
//!    `on_gesture_start`, zero or more `on_gesture_move`, then exactly one
//!    `on_gesture_end` (dropped or cancelled).
//! 2. At most one gesture is in flight at a time.
//! 3. A drop target only receives `on_gesture_enter` after its
//!    `can_accept` returned `true` for the current gesture, and every enter is
//!    matched by exactly one `on_gesture_leave` or `on_gesture_dropped`
//!    while the target stays registered.
//! 4. If `can_start` returns `false`, no callback fires for that press.
//!
//! ## Failure Modes
//!
//! | Failure | Cause | Fallback |
//! |---------|-------|----------|
//! | No draggable under the press | Click on empty space | Gesture not initiated |
//! | Press outside the handle | Handle restricts grabbing | Gesture not initiated |
//! | Source unregistered mid-gesture | Host unmounted the source | End still delivered |
//! | Target unregistered while hovered | Host unmounted the target | Target silently dropped from the hover set |

use std::fmt;
use std::rc::Rc;

use dragline_core::event::PointerSample;

use crate::data::DragData;
use crate::element::ElementRef;

/// Predicate supplied by the host.
pub type Predicate<A> = Rc<dyn Fn(&A) -> bool>;

/// Payload builder supplied by the host.
pub type PayloadFn<A> = Rc<dyn Fn(&A) -> DragData>;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Identifies a registered drag source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u64);

/// Identifies a registered drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

// ---------------------------------------------------------------------------
// Callback arguments
// ---------------------------------------------------------------------------

/// Pointer samples at gesture start and now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragLocation {
    /// Sample at the press that started the gesture.
    pub initial: PointerSample,
    /// Most recent sample.
    pub current: PointerSample,
}

impl DragLocation {
    /// A location where the gesture has not moved yet.
    #[must_use]
    pub const fn at(sample: PointerSample) -> Self {
        Self {
            initial: sample,
            current: sample,
        }
    }
}

/// Arguments for deciding whether a press may become a gesture.
#[derive(Clone)]
pub struct DragStartArgs {
    /// The press sample.
    pub input: PointerSample,
    /// The draggable element.
    pub element: ElementRef,
    /// The handle element, if the draggable has one.
    pub drag_handle: Option<ElementRef>,
}

/// The source side of an in-flight gesture.
#[derive(Clone)]
pub struct SourceInfo {
    pub id: SourceId,
    pub element: ElementRef,
    pub drag_handle: Option<ElementRef>,
    /// Data the source attached at start.
    pub data: DragData,
}

/// A drop target currently under the pointer.
#[derive(Clone)]
pub struct DropTargetRecord {
    pub id: TargetId,
    pub element: ElementRef,
    /// Data the target attached when it accepted the gesture.
    pub data: DragData,
}

/// Arguments delivered with every lifecycle callback.
#[derive(Clone)]
pub struct GestureArgs {
    pub location: DragLocation,
    pub source: SourceInfo,
    /// Targets under the pointer, topmost first.
    pub drop_targets: Vec<DropTargetRecord>,
}

/// Arguments for a drop target's accept predicate and payload builder.
#[derive(Clone)]
pub struct DropTargetArgs {
    /// Current pointer sample.
    pub input: PointerSample,
    /// The gesture's source.
    pub source: SourceInfo,
    /// The drop target's own element.
    pub element: ElementRef,
}

/// How a gesture finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Released normally; `GestureArgs::drop_targets` lists the receivers.
    Dropped,
    /// Abandoned before release.
    Cancelled,
}

/// Platform-native drag image control handed to the preview callback.
pub trait NativeDragImage {
    /// Suppress the platform's own drag image so a custom preview can be
    /// drawn instead.
    fn suppress(&mut self);
}

/// Arguments for the preview-generation callback.
pub struct PreviewArgs<'a> {
    pub location: DragLocation,
    pub source: SourceInfo,
    pub native: &'a mut dyn NativeDragImage,
}

impl fmt::Debug for DragStartArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragStartArgs")
            .field("input", &self.input)
            .field("element", &self.element.debug_name())
            .field("drag_handle", &self.drag_handle.as_ref().map(|h| h.debug_name()))
            .finish()
    }
}

impl fmt::Debug for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceInfo")
            .field("id", &self.id)
            .field("element", &self.element.debug_name())
            .field("data", &self.data)
            .finish()
    }
}

impl fmt::Debug for DropTargetRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropTargetRecord")
            .field("id", &self.id)
            .field("element", &self.element.debug_name())
            .field("data", &self.data)
            .finish()
    }
}

impl fmt::Debug for GestureArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureArgs")
            .field("location", &self.location)
            .field("source", &self.source)
            .field("drop_targets", &self.drop_targets)
            .finish()
    }
}

impl fmt::Debug for DropTargetArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropTargetArgs")
            .field("input", &self.input)
            .field("source", &self.source)
            .field("element", &self.element.debug_name())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Draggable trait
// ---------------------------------------------------------------------------

/// A drag source.
///
/// The capture implementation calls these during the gesture lifecycle; see
/// the module docs for the ordering guarantees.
pub trait Draggable {
    /// The element a press must land on.
    fn element(&self) -> ElementRef;

    /// Optional sub-element that a press must land on to start a gesture.
    fn drag_handle(&self) -> Option<ElementRef> {
        None
    }

    /// Whether a press may become a gesture. Defaults to always.
    fn can_start(&self, _args: &DragStartArgs) -> bool {
        true
    }

    /// Data visible to drop targets for the whole gesture. Defaults to empty.
    fn initial_payload(&self, _args: &DragStartArgs) -> DragData {
        DragData::default()
    }

    /// Called once, right before `on_gesture_start`, to set up a preview.
    fn on_preview_requested(&self, _args: &mut PreviewArgs<'_>) {}

    /// The gesture began.
    fn on_gesture_start(&self, args: &GestureArgs);

    /// The pointer moved during the gesture.
    fn on_gesture_move(&self, args: &GestureArgs);

    /// The gesture ended. Called exactly once per started gesture.
    fn on_gesture_end(&self, args: &GestureArgs, outcome: DropOutcome);
}

// ---------------------------------------------------------------------------
// DropTarget trait
// ---------------------------------------------------------------------------

/// A drop surface.
pub trait DropTarget {
    /// The region this target occupies.
    fn element(&self) -> ElementRef;

    /// Whether the current gesture may enter this target. Defaults to always.
    ///
    /// Called on every pointer move while the pointer is over the element,
    /// so it must be cheap.
    fn can_accept(&self, _args: &DropTargetArgs) -> bool {
        true
    }

    /// Data this target contributes to the drop. Defaults to empty.
    fn context_payload(&self, _args: &DropTargetArgs) -> DragData {
        DragData::default()
    }

    /// An accepted gesture entered this target.
    fn on_gesture_enter(&self, _args: &GestureArgs) {}

    /// An accepted gesture left this target without dropping.
    fn on_gesture_leave(&self, _args: &GestureArgs) {}

    /// An accepted gesture was released over this target.
    fn on_gesture_dropped(&self, _args: &GestureArgs) {}
}

// ---------------------------------------------------------------------------
// Capture seam
// ---------------------------------------------------------------------------

/// Installs drag roles into whatever captures pointer input.
pub trait GestureCapture {
    /// Start delivering gesture callbacks to `source`.
    fn register_draggable(&self, source: Rc<dyn Draggable>) -> Registration;

    /// Start delivering hover and drop callbacks to `target`.
    fn register_drop_target(&self, target: Rc<dyn DropTarget>) -> Registration;
}

/// Guard for an installed role.
///
/// Dropping the guard, or calling [`cleanup`](Registration::cleanup),
/// uninstalls the role.
#[must_use = "dropping a Registration uninstalls immediately"]
#[derive(Default)]
pub struct Registration {
    cleanups: Vec<Box<dyn FnOnce()>>,
}

impl Registration {
    /// A registration that runs `cleanup` when released.
    pub fn new(cleanup: impl FnOnce() + 'static) -> Self {
        Self {
            cleanups: vec![Box::new(cleanup)],
        }
    }

    /// A registration with nothing to release.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether there is nothing left to release.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cleanups.is_empty()
    }

    /// Release now, in reverse registration order.
    pub fn cleanup(mut self) {
        self.release();
    }

    fn release(&mut self) {
        while let Some(cleanup) = self.cleanups.pop() {
            cleanup();
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("pending", &self.cleanups.len())
            .finish()
    }
}

/// Merge several registrations into one guard.
pub fn combine(registrations: impl IntoIterator<Item = Registration>) -> Registration {
    let mut merged = Registration::empty();
    for mut registration in registrations {
        merged.cleanups.append(&mut registration.cleanups);
    }
    merged
}
