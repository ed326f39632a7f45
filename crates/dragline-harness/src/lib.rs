#![forbid(unsafe_code)]

//! Scripted pointer scenarios for Dragline.
//!
//! - **Test doubles**: [`TestElement`] with a scriptable rectangle and a
//!   record of transform writes; [`ProbeSource`] / [`ProbeTarget`] that log
//!   protocol callbacks into a [`CallLog`].
//! - **Frames**: [`RecordingFrames`], a frame queue that counts requests.
//! - **Observation**: [`Timeline`] records every value a cell publishes.
//! - **Driver**: [`DragHarness`] owns a [`GestureRouter`] and a frame queue
//!   and replays [`Step`] scripts against them.
//!
//! # Quick Start
//!
//! ```ignore
//! use dragline_harness::{DragHarness, Step, TestElement};
//!
//! let h = DragHarness::new();
//! let card = TestElement::at("card", Rect::new(100.0, 50.0, 50.0, 50.0));
//! let controller = h.controller(DraggableOptions::new(card.to_ref()));
//!
//! h.run(&[Step::Press(140.0, 70.0), Step::Move(200.0, 130.0)])?;
//! assert_eq!(controller.state().get(), DraggableState::Dragging);
//! ```

pub mod element;
pub mod frames;
pub mod probe;
pub mod timeline;

use std::rc::Rc;

use dragline::{
    DragController, DraggableOptions, DropTarget, Draggable, GestureCapture, GestureConfig,
    GestureRouter, PointerSample, Registration, Result,
};

pub use element::TestElement;
pub use frames::RecordingFrames;
pub use probe::{CallLog, ProbeSource, ProbeTarget};
pub use timeline::Timeline;

// ============================================================================
// Scenario steps
// ============================================================================

/// One scripted input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Primary-button press at client coordinates.
    Press(f64, f64),
    /// Pointer move to client coordinates.
    Move(f64, f64),
    /// Release at client coordinates.
    Release(f64, f64),
    /// Platform cancel.
    Cancel,
    /// Escape key.
    Escape,
    /// Drain one frame.
    Frame,
}

// ============================================================================
// DragHarness
// ============================================================================

/// A router and a frame queue wired together for tests.
#[derive(Debug, Default)]
pub struct DragHarness {
    router: GestureRouter,
    frames: RecordingFrames,
}

impl DragHarness {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Harness whose router uses `config`.
    pub fn with_config(config: GestureConfig) -> Result<Self> {
        Ok(Self {
            router: GestureRouter::with_config(config)?,
            frames: RecordingFrames::new(),
        })
    }

    #[must_use]
    pub fn router(&self) -> &GestureRouter {
        &self.router
    }

    #[must_use]
    pub fn frames(&self) -> &RecordingFrames {
        &self.frames
    }

    /// A controller on this harness's frame queue, mounted into the router.
    ///
    /// If the element cannot be resolved the controller comes back unmounted.
    #[must_use]
    pub fn controller(&self, options: DraggableOptions) -> DragController {
        let mut controller = DragController::new(options, self.frames.scheduler());
        controller.mount(&self.router);
        controller
    }

    /// Register a probe source directly with the router.
    pub fn register_source(&self, source: Rc<dyn Draggable>) -> Registration {
        self.router.register_draggable(source)
    }

    /// Register a probe target directly with the router.
    pub fn register_target(&self, target: Rc<dyn DropTarget>) -> Registration {
        self.router.register_drop_target(target)
    }

    pub fn press(&self, x: f64, y: f64) -> Result<bool> {
        self.router.pointer_down(PointerSample::new(x, y))
    }

    pub fn move_to(&self, x: f64, y: f64) {
        self.router.pointer_move(PointerSample::new(x, y));
    }

    pub fn release(&self, x: f64, y: f64) {
        self.router.pointer_up(PointerSample::new(x, y));
    }

    pub fn cancel(&self) -> bool {
        self.router.cancel()
    }

    /// Drain one frame; returns how many callbacks ran.
    pub fn frame(&self) -> usize {
        self.frames.run_frame()
    }

    /// Replay `steps` in order, stopping at the first rejected press.
    pub fn run(&self, steps: &[Step]) -> Result<()> {
        for step in steps {
            match *step {
                Step::Press(x, y) => {
                    self.press(x, y)?;
                }
                Step::Move(x, y) => self.move_to(x, y),
                Step::Release(x, y) => self.release(x, y),
                Step::Cancel => {
                    self.cancel();
                }
                Step::Escape => {
                    self.router.escape();
                }
                Step::Frame => {
                    self.frame();
                }
            }
        }
        Ok(())
    }

    /// Press at `from`, then move through `path` without releasing.
    pub fn drag_through(&self, from: (f64, f64), path: &[(f64, f64)]) -> Result<bool> {
        let pressed = self.press(from.0, from.1)?;
        for &(x, y) in path {
            self.move_to(x, y);
        }
        Ok(pressed)
    }
}
