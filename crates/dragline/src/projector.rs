#![forbid(unsafe_code)]

//! Preview projection.
//!
//! [`PreviewProjector`] keeps a bound preview element translated to
//! `pointer - offset` while a gesture is in flight.
//!
//! # Algorithm
//!
//! 1. Subscribe to `pointer`, `offset` and `preview_element`.
//! 2. On any change, if all three are present, compute the translation and
//!    store it as the pending write (latest wins). Otherwise clear the
//!    pending write.
//! 3. If no frame request is outstanding, request one.
//! 4. When the frame runs, re-read `preview_element`; write the pending
//!    translation only if the element is still bound and alive.
//!
//! # Invariants
//!
//! - At most one frame request is outstanding, so at most one transform
//!   write happens per frame no matter how many pointer samples arrive.
//! - A preview unbound or dropped between scheduling and execution is never
//!   written.
//! - A request ends when its callback runs or is dropped. A scheduler that
//!   discards queued callbacks does not stall later projections.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use dragline_core::event::PointerSample;
use dragline_core::frame::FrameScheduler;
use dragline_core::geometry::Offset;
use dragline_core::observable::{Observable, Subscription};

use crate::element::WeakElement;
use crate::state::InteractionState;

/// Translation that places a preview under the pointer at the grab offset.
#[must_use]
pub fn project(pointer: &PointerSample, offset: Offset) -> Offset {
    Offset::new(pointer.client_x - offset.x, pointer.client_y - offset.y)
}

struct Shared {
    pointer: Observable<Option<PointerSample>>,
    offset: Observable<Option<Offset>>,
    preview_element: Observable<Option<WeakElement>>,
    scheduler: Rc<dyn FrameScheduler>,
    pending: Cell<Option<Offset>>,
    outstanding: Cell<Option<u64>>,
    next_request: Cell<u64>,
    writes: Cell<u64>,
}

/// Lives inside the frame callback. Releases the outstanding request when
/// the callback runs or when the scheduler drops it unrun.
struct FrameRequest {
    shared: Weak<Shared>,
    id: u64,
}

impl FrameRequest {
    fn run(self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.flush(self.id);
        }
    }
}

impl Drop for FrameRequest {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.release(self.id);
        }
    }
}

impl Shared {
    fn recompute(self: &Rc<Self>) {
        let translation = match (self.pointer.get(), self.offset.get()) {
            (Some(pointer), Some(offset)) if self.preview_element.with(Option::is_some) => {
                Some(project(&pointer, offset))
            }
            _ => None,
        };
        self.pending.set(translation);
        if translation.is_none() || self.outstanding.get().is_some() {
            return;
        }

        let id = self.next_request.get();
        self.next_request.set(id.wrapping_add(1));
        self.outstanding.set(Some(id));
        let request = FrameRequest {
            shared: Rc::downgrade(self),
            id,
        };
        self.scheduler.request_frame(Box::new(move || request.run()));
    }

    fn release(&self, id: u64) {
        if self.outstanding.get() == Some(id) {
            self.outstanding.set(None);
        }
    }

    fn flush(&self, id: u64) {
        self.release(id);
        let Some(translation) = self.pending.take() else {
            return;
        };
        let Some(element) = self.preview_element.get().and_then(|w| w.upgrade()) else {
            dragline_core::trace!("preview element gone before frame; write skipped");
            return;
        };
        dragline_core::trace!(
            x = translation.x,
            y = translation.y,
            element = element.debug_name(),
            "preview translated"
        );
        element.set_translation(translation);
        self.writes.set(self.writes.get() + 1);
    }
}

/// Moves the bound preview element to follow the pointer.
///
/// Dropping the projector unsubscribes it; a frame already requested then
/// does nothing.
pub struct PreviewProjector {
    shared: Rc<Shared>,
    _subscriptions: Vec<Subscription>,
}

impl PreviewProjector {
    /// Start projecting `state`'s geometry through `scheduler`.
    #[must_use]
    pub fn attach(state: &InteractionState, scheduler: Rc<dyn FrameScheduler>) -> Self {
        let shared = Rc::new(Shared {
            pointer: state.pointer().clone(),
            offset: state.offset().clone(),
            preview_element: state.preview_element().clone(),
            scheduler,
            pending: Cell::new(None),
            outstanding: Cell::new(None),
            next_request: Cell::new(0),
            writes: Cell::new(0),
        });

        let weak = Rc::downgrade(&shared);
        let trigger = Rc::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.recompute();
            }
        });
        let subscriptions = vec![
            {
                let t = Rc::clone(&trigger);
                state.pointer().subscribe(move |_| t())
            },
            {
                let t = Rc::clone(&trigger);
                state.offset().subscribe(move |_| t())
            },
            state.preview_element().subscribe(move |_| trigger()),
        ];

        Self {
            shared,
            _subscriptions: subscriptions,
        }
    }

    /// The translation the next frame would write, if any.
    #[must_use]
    pub fn pending_translation(&self) -> Option<Offset> {
        self.shared.pending.get()
    }

    /// Whether a frame request is outstanding.
    #[must_use]
    pub fn has_pending_frame(&self) -> bool {
        self.shared.outstanding.get().is_some()
    }

    /// Number of transform writes performed.
    #[must_use]
    pub fn writes(&self) -> u64 {
        self.shared.writes.get()
    }
}

impl fmt::Debug for PreviewProjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewProjector")
            .field("pending", &self.shared.pending.get())
            .field("outstanding", &self.shared.outstanding.get())
            .field("writes", &self.shared.writes.get())
            .finish()
    }
}
