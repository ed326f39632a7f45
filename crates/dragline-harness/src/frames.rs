#![forbid(unsafe_code)]

//! Recording frame scheduler.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use dragline_core::frame::{FrameCallback, FrameQueue, FrameScheduler};

/// [`FrameQueue`] that also counts every request it receives.
///
/// Cloning produces another handle to the same queue and counter.
#[derive(Clone, Default)]
pub struct RecordingFrames {
    queue: FrameQueue,
    requests: Rc<Cell<u64>>,
}

impl RecordingFrames {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total frame requests received.
    #[must_use]
    pub fn requests(&self) -> u64 {
        self.requests.get()
    }

    /// Callbacks waiting for the next frame.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.pending()
    }

    /// Drain one frame; returns how many callbacks ran.
    pub fn run_frame(&self) -> usize {
        self.queue.run_frame()
    }

    #[must_use]
    pub fn frames_run(&self) -> u64 {
        self.queue.frames_run()
    }

    /// This scheduler as the trait object controllers take.
    #[must_use]
    pub fn scheduler(&self) -> Rc<dyn FrameScheduler> {
        Rc::new(self.clone())
    }
}

impl FrameScheduler for RecordingFrames {
    fn request_frame(&self, callback: FrameCallback) {
        self.requests.set(self.requests.get() + 1);
        self.queue.request_frame(callback);
    }
}

impl fmt::Debug for RecordingFrames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingFrames")
            .field("requests", &self.requests())
            .field("queue", &self.queue)
            .finish()
    }
}
