#![forbid(unsafe_code)]

//! Drag-interaction controller.
//!
//! A [`DragController`] binds one host element as both a drag source and a
//! drop surface, tracks the gesture through an observable state machine
//! (`Idle`, `Dragging`, `Over`), and keeps a bound preview element translated
//! to follow the pointer.
//!
//! Pointer capture and hit-testing are injected through [`GestureCapture`].
//! [`GestureRouter`] is a complete implementation driven by raw
//! [`PointerEvent`]s; hosts with their own drag machinery implement the trait
//! instead.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use dragline::{DragController, DraggableOptions, GestureRouter, PointerSample};
//! use dragline_core::frame::FrameQueue;
//!
//! let router = GestureRouter::new();
//! let frames = FrameQueue::new();
//! let mut card = DragController::new(
//!     DraggableOptions::new(card_element.clone()),
//!     Rc::new(frames.clone()),
//! );
//! card.mount(&router);
//!
//! router.pointer_down(PointerSample::new(140.0, 70.0))?;
//! router.pointer_move(PointerSample::new(200.0, 130.0));
//! frames.run_frame(); // preview element now translated to (160, 110)
//! ```

use std::fmt;

pub mod controller;
pub mod data;
pub mod drag;
pub mod element;
pub mod projector;
pub mod router;
pub mod source;
pub mod state;
pub mod surface;

pub use controller::{DragController, DraggableOptions};
pub use data::{DataValue, DragData};
pub use drag::{
    DragLocation, DragStartArgs, Draggable, DropOutcome, DropTarget, DropTargetArgs,
    DropTargetRecord, GestureArgs, GestureCapture, NativeDragImage, PreviewArgs, Registration,
    SourceId, SourceInfo, TargetId, combine,
};
pub use element::{Element, ElementRef, ElementSource, WeakElement};
pub use projector::PreviewProjector;
pub use router::{GestureConfig, GestureRouter};
pub use source::GestureSource;
pub use state::{DraggableState, InteractionState, PreviewDescriptor, SelfDropPrecedence};
pub use surface::DropSurface;

pub use dragline_core::event::{Modifiers, PointerButton, PointerEvent, PointerSample};
pub use dragline_core::geometry::{Offset, Point, Rect};

// --- Errors ---------------------------------------------------------------

/// Errors reported at the router boundary.
///
/// The controller itself never fails: every rejected or impossible step
/// inside a gesture is a silent no-op.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A press arrived while another gesture was pending or active.
    GestureInFlight,
    /// Gesture configuration failed validation.
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GestureInFlight => write!(f, "a drag gesture is already in flight"),
            Self::InvalidConfig(msg) => write!(f, "invalid gesture config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// Standard result type for dragline APIs.
pub type Result<T> = std::result::Result<T, Error>;
