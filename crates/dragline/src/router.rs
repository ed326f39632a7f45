#![forbid(unsafe_code)]

//! Reference gesture capture.
//!
//! [`GestureRouter`] turns raw pointer input into the drag protocol of
//! [`crate::drag`]: it finds the draggable under a press, waits for the
//! movement threshold, hit-tests drop targets on every move and delivers the
//! lifecycle callbacks in protocol order.
//!
//! # State machine
//!
//! ```text
//!            press on draggable          move >= threshold
//!   Idle ─────────────────────────▶ Pressed ─────────────────▶ Active
//!    ▲        (can_start = true)       │                         │
//!    │                                 │ release / cancel        │ release → drop
//!    └─────────────────────────────────┴─────────────────────────┘ cancel  → leave + end
//! ```
//!
//! # Callback order
//!
//! | Trigger | Callbacks |
//! |---------|-----------|
//! | Threshold crossed | `on_preview_requested`, `on_gesture_start`, then the move below |
//! | Move while active | `on_gesture_leave` (old targets), `on_gesture_enter` (new targets), `on_gesture_move` |
//! | Release while active | `on_gesture_dropped` (hovered targets), `on_gesture_end(Dropped)` |
//! | Cancel while active | `on_gesture_leave` (hovered targets), `on_gesture_end(Cancelled)` |
//!
//! Hit-testing treats the most recently registered element as topmost.
//! Callbacks run with no router borrow held, but must not feed pointer input
//! back into the router that is delivering them.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use dragline_core::event::{PointerButton, PointerEvent, PointerSample};

use crate::drag::{
    DragLocation, DragStartArgs, Draggable, DropOutcome, DropTarget, DropTargetArgs,
    DropTargetRecord, GestureArgs, GestureCapture, NativeDragImage, PreviewArgs, Registration,
    SourceId, SourceInfo, TargetId,
};
use crate::{Error, Result};

// ---------------------------------------------------------------------------
// GestureConfig
// ---------------------------------------------------------------------------

/// Configuration for gesture detection.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureConfig {
    /// Minimum pointer travel in pixels before a press becomes a drag
    /// (default: 3.0). Zero starts the drag on the first move.
    pub threshold: f64,
    /// Whether [`GestureRouter::escape`] cancels an active drag (default: true).
    pub cancel_on_escape: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            threshold: 3.0,
            cancel_on_escape: true,
        }
    }
}

impl GestureConfig {
    /// Set the movement threshold.
    #[must_use]
    pub fn with_threshold(mut self, pixels: f64) -> Self {
        self.threshold = pixels;
        self
    }

    /// Make Escape leave active drags alone.
    #[must_use]
    pub fn no_escape_cancel(mut self) -> Self {
        self.cancel_on_escape = false;
        self
    }

    /// Check the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "threshold must be a finite, non-negative pixel distance (got {})",
                self.threshold
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

/// Records whether the preview callback suppressed the native image.
#[derive(Debug, Default)]
struct NativeImageSlot {
    suppressed: bool,
}

impl NativeDragImage for NativeImageSlot {
    fn suppress(&mut self) {
        self.suppressed = true;
    }
}

struct Pressed {
    source: Rc<dyn Draggable>,
    info: SourceInfo,
    initial: PointerSample,
}

struct Hovered {
    target: Rc<dyn DropTarget>,
    record: DropTargetRecord,
}

struct Active {
    source: Rc<dyn Draggable>,
    info: SourceInfo,
    location: DragLocation,
    hovered: Vec<Hovered>,
}

impl Active {
    fn args(&self) -> GestureArgs {
        GestureArgs {
            location: self.location,
            source: self.info.clone(),
            drop_targets: self.hovered.iter().map(|h| h.record.clone()).collect(),
        }
    }
}

#[derive(Default)]
enum Phase {
    #[default]
    Idle,
    Pressed(Pressed),
    Active(Active),
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    sources: Vec<(SourceId, Rc<dyn Draggable>)>,
    targets: Vec<(TargetId, Rc<dyn DropTarget>)>,
    phase: Phase,
    last_native_suppressed: bool,
}

impl Inner {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

// ---------------------------------------------------------------------------
// GestureRouter
// ---------------------------------------------------------------------------

/// Pointer-driven implementation of [`GestureCapture`].
///
/// Cloning produces another handle to the same router.
#[derive(Clone)]
pub struct GestureRouter {
    inner: Rc<RefCell<Inner>>,
    config: GestureConfig,
}

impl Default for GestureRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureRouter {
    /// Create a router with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner::default())),
            config: GestureConfig::default(),
        }
    }

    /// Create a router with a validated configuration.
    pub fn with_config(config: GestureConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: Rc::new(RefCell::new(Inner::default())),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Feed one raw pointer event.
    pub fn handle_event(&self, event: PointerEvent) -> Result<()> {
        match event {
            PointerEvent::Down(sample) => self.pointer_down(sample).map(|_| ()),
            PointerEvent::Move(sample) => {
                self.pointer_move(sample);
                Ok(())
            }
            PointerEvent::Up(sample) => {
                self.pointer_up(sample);
                Ok(())
            }
            PointerEvent::Cancel => {
                self.cancel();
                Ok(())
            }
        }
    }

    /// A button was pressed.
    ///
    /// Returns `Ok(true)` if the press landed on a draggable that allowed it
    /// and is now waiting for movement. A press while another gesture is
    /// pending or active is rejected with [`Error::GestureInFlight`].
    pub fn pointer_down(&self, sample: PointerSample) -> Result<bool> {
        if !matches!(self.inner.borrow().phase, Phase::Idle) {
            dragline_core::warn!(
                x = sample.client_x,
                y = sample.client_y,
                "press while a gesture is in flight"
            );
            return Err(Error::GestureInFlight);
        }
        if sample.button != Some(PointerButton::Primary) {
            return Ok(false);
        }

        let Some((id, source)) = self.draggable_at(&sample) else {
            return Ok(false);
        };

        let element = source.element();
        let drag_handle = source.drag_handle();
        if let Some(handle) = &drag_handle {
            let on_handle = handle
                .bounding_rect()
                .is_some_and(|r| r.contains(sample.client()));
            if !on_handle {
                dragline_core::debug!(source = id.0, "press outside drag handle");
                return Ok(false);
            }
        }

        let start_args = DragStartArgs {
            input: sample,
            element: Rc::clone(&element),
            drag_handle: drag_handle.clone(),
        };
        if !source.can_start(&start_args) {
            dragline_core::debug!(source = id.0, "gesture start denied");
            return Ok(false);
        }
        let data = source.initial_payload(&start_args);

        self.inner.borrow_mut().phase = Phase::Pressed(Pressed {
            source,
            info: SourceInfo {
                id,
                element,
                drag_handle,
                data,
            },
            initial: sample,
        });
        Ok(true)
    }

    /// The pointer moved.
    pub fn pointer_move(&self, sample: PointerSample) {
        let phase = std::mem::take(&mut self.inner.borrow_mut().phase);
        let active = match phase {
            Phase::Idle => return,
            Phase::Pressed(pressed) => {
                if pressed.initial.client().distance(sample.client()) < self.config.threshold {
                    self.inner.borrow_mut().phase = Phase::Pressed(pressed);
                    return;
                }
                self.begin(pressed)
            }
            Phase::Active(active) => active,
        };
        let active = self.update(active, sample);
        self.inner.borrow_mut().phase = Phase::Active(active);
    }

    /// The button was released.
    pub fn pointer_up(&self, sample: PointerSample) {
        let phase = std::mem::take(&mut self.inner.borrow_mut().phase);
        let Phase::Active(mut active) = phase else {
            return;
        };
        active.location.current = sample;
        let _span =
            dragline_core::debug_span!("gesture_drop", source = active.info.id.0).entered();

        let args = active.args();
        for hovered in &active.hovered {
            hovered.target.on_gesture_dropped(&args);
        }
        dragline_core::debug!(
            source = active.info.id.0,
            targets = args.drop_targets.len(),
            "gesture dropped"
        );
        active.source.on_gesture_end(&args, DropOutcome::Dropped);
    }

    /// The platform abandoned the interaction.
    ///
    /// Returns `true` if an active drag was cancelled.
    pub fn cancel(&self) -> bool {
        let phase = std::mem::take(&mut self.inner.borrow_mut().phase);
        let Phase::Active(mut active) = phase else {
            return false;
        };

        let leave_args = active.args();
        for h in &active.hovered {
            h.target.on_gesture_leave(&leave_args);
        }
        active.hovered.clear();
        dragline_core::debug!(source = active.info.id.0, "gesture cancelled");
        active
            .source
            .on_gesture_end(&active.args(), DropOutcome::Cancelled);
        true
    }

    /// Escape was pressed. Cancels an active drag unless configured not to.
    pub fn escape(&self) -> bool {
        self.config.cancel_on_escape && self.cancel()
    }

    /// Whether a press is waiting for the movement threshold.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        matches!(self.inner.borrow().phase, Phase::Pressed(_))
    }

    /// Whether a drag is in flight.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.inner.borrow().phase, Phase::Active(_))
    }

    /// Drop targets under the pointer, topmost first.
    #[must_use]
    pub fn hovered_targets(&self) -> Vec<TargetId> {
        match &self.inner.borrow().phase {
            Phase::Active(active) => active.hovered.iter().map(|h| h.record.id).collect(),
            _ => Vec::new(),
        }
    }

    /// Whether the most recent preview callback suppressed the native image.
    #[must_use]
    pub fn native_preview_suppressed(&self) -> bool {
        self.inner.borrow().last_native_suppressed
    }

    #[must_use]
    pub fn source_count(&self) -> usize {
        self.inner.borrow().sources.len()
    }

    #[must_use]
    pub fn target_count(&self) -> usize {
        self.inner.borrow().targets.len()
    }

    // --- internals --------------------------------------------------------

    fn draggable_at(&self, sample: &PointerSample) -> Option<(SourceId, Rc<dyn Draggable>)> {
        let candidates: Vec<(SourceId, Rc<dyn Draggable>)> = self.inner.borrow().sources.clone();
        candidates.into_iter().rev().find(|(_, source)| {
            source
                .element()
                .bounding_rect()
                .is_some_and(|r| r.contains(sample.client()))
        })
    }

    fn begin(&self, pressed: Pressed) -> Active {
        let Pressed {
            source,
            info,
            initial,
        } = pressed;
        let location = DragLocation::at(initial);

        let mut native = NativeImageSlot::default();
        source.on_preview_requested(&mut PreviewArgs {
            location,
            source: info.clone(),
            native: &mut native,
        });
        self.inner.borrow_mut().last_native_suppressed = native.suppressed;
        dragline_core::debug!(
            source = info.id.0,
            native_suppressed = native.suppressed,
            "gesture began"
        );

        let active = Active {
            source,
            info,
            location,
            hovered: Vec::new(),
        };
        active.source.on_gesture_start(&active.args());
        active
    }

    fn update(&self, mut active: Active, sample: PointerSample) -> Active {
        active.location.current = sample;

        let targets: Vec<(TargetId, Rc<dyn DropTarget>)> = self.inner.borrow().targets.clone();
        let mut next: Vec<Hovered> = Vec::new();
        for (id, target) in targets.into_iter().rev() {
            let element = target.element();
            let over = element
                .bounding_rect()
                .is_some_and(|r| r.contains(sample.client()));
            if !over {
                continue;
            }
            let args = DropTargetArgs {
                input: sample,
                source: active.info.clone(),
                element: Rc::clone(&element),
            };
            if !target.can_accept(&args) {
                continue;
            }
            let data = target.context_payload(&args);
            next.push(Hovered {
                target,
                record: DropTargetRecord { id, element, data },
            });
        }

        let previous = std::mem::take(&mut active.hovered);
        let left: Vec<&Hovered> = previous
            .iter()
            .filter(|p| !next.iter().any(|n| n.record.id == p.record.id))
            .collect();
        let entered: Vec<&Hovered> = next
            .iter()
            .filter(|n| !previous.iter().any(|p| p.record.id == n.record.id))
            .collect();

        if !left.is_empty() || !entered.is_empty() {
            // Leave callbacks see the hover set being vacated.
            let leave_args = GestureArgs {
                location: active.location,
                source: active.info.clone(),
                drop_targets: previous.iter().map(|h| h.record.clone()).collect(),
            };
            for h in &left {
                h.target.on_gesture_leave(&leave_args);
            }
            let enter_args = GestureArgs {
                location: active.location,
                source: active.info.clone(),
                drop_targets: next.iter().map(|h| h.record.clone()).collect(),
            };
            for h in &entered {
                h.target.on_gesture_enter(&enter_args);
            }
        }

        active.hovered = next;
        dragline_core::trace!(
            source = active.info.id.0,
            x = sample.client_x,
            y = sample.client_y,
            hovered = active.hovered.len(),
            "gesture moved"
        );
        active.source.on_gesture_move(&active.args());
        active
    }

    fn unregister_source(inner: &Weak<RefCell<Inner>>, id: SourceId) {
        if let Some(inner) = inner.upgrade() {
            let mut inner = inner.borrow_mut();
            inner.sources.retain(|(sid, _)| *sid != id);
            if matches!(&inner.phase, Phase::Pressed(p) if p.info.id == id) {
                inner.phase = Phase::Idle;
            }
        }
    }

    fn unregister_target(inner: &Weak<RefCell<Inner>>, id: TargetId) {
        if let Some(inner) = inner.upgrade() {
            let mut inner = inner.borrow_mut();
            inner.targets.retain(|(tid, _)| *tid != id);
            if let Phase::Active(active) = &mut inner.phase {
                active.hovered.retain(|h| h.record.id != id);
            }
        }
    }
}

impl GestureCapture for GestureRouter {
    fn register_draggable(&self, source: Rc<dyn Draggable>) -> Registration {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = SourceId(inner.allocate_id());
            inner.sources.push((id, source));
            id
        };
        let weak = Rc::downgrade(&self.inner);
        Registration::new(move || Self::unregister_source(&weak, id))
    }

    fn register_drop_target(&self, target: Rc<dyn DropTarget>) -> Registration {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = TargetId(inner.allocate_id());
            inner.targets.push((id, target));
            id
        };
        let weak = Rc::downgrade(&self.inner);
        Registration::new(move || Self::unregister_target(&weak, id))
    }
}

impl fmt::Debug for GestureRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        let phase = match &inner.phase {
            Phase::Idle => "idle",
            Phase::Pressed(_) => "pressed",
            Phase::Active(_) => "active",
        };
        f.debug_struct("GestureRouter")
            .field("config", &self.config)
            .field("phase", &phase)
            .field("sources", &inner.sources.len())
            .field("targets", &inner.targets.len())
            .finish()
    }
}
