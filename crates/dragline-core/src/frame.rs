#![forbid(unsafe_code)]

//! Frame scheduling.
//!
//! Visual writes driven by pointer movement are deferred to "just before the
//! next paint" through a [`FrameScheduler`]. The host owns the real frame loop;
//! this module only defines the request interface and two implementations:
//!
//! - [`ImmediateFrames`] runs callbacks synchronously (tests, headless hosts).
//! - [`FrameQueue`] collects callbacks until the host calls
//!   [`run_frame`](FrameQueue::run_frame) from its frame loop.
//!
//! # Ordering
//!
//! Callbacks requested for the same frame run in request order. A callback
//! requested while a frame is running is deferred to the following frame,
//! which matches how animation-frame callbacks behave in browser hosts.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// A unit of work to run before the next paint.
pub type FrameCallback = Box<dyn FnOnce()>;

/// Something that can run a callback before the next paint.
pub trait FrameScheduler {
    /// Request that `callback` runs before the next frame is presented.
    fn request_frame(&self, callback: FrameCallback);
}

impl<S: FrameScheduler + ?Sized> FrameScheduler for Rc<S> {
    fn request_frame(&self, callback: FrameCallback) {
        (**self).request_frame(callback);
    }
}

/// Scheduler that runs every callback immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateFrames;

impl FrameScheduler for ImmediateFrames {
    fn request_frame(&self, callback: FrameCallback) {
        callback();
    }
}

/// Scheduler that queues callbacks until the host drains a frame.
///
/// Cloning produces another handle to the same queue, so the controller and
/// the host loop can each hold one.
#[derive(Clone, Default)]
pub struct FrameQueue {
    pending: Rc<RefCell<VecDeque<FrameCallback>>>,
    frames: Rc<Cell<u64>>,
}

impl FrameQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting for the next frame.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Whether no callback is waiting.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Number of frames drained so far.
    #[must_use]
    pub fn frames_run(&self) -> u64 {
        self.frames.get()
    }

    /// Run every callback queued before this call and return how many ran.
    pub fn run_frame(&self) -> usize {
        let batch = std::mem::take(&mut *self.pending.borrow_mut());
        self.frames.set(self.frames.get() + 1);
        let count = batch.len();
        for callback in batch {
            callback();
        }
        count
    }

    /// Drop every queued callback without running it.
    pub fn clear(&self) {
        self.pending.borrow_mut().clear();
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&self, callback: FrameCallback) {
        self.pending.borrow_mut().push_back(callback);
    }
}

impl fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameQueue")
            .field("pending", &self.pending())
            .field("frames_run", &self.frames_run())
            .finish()
    }
}
