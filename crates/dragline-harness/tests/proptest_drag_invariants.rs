//! Property-based invariants of a drag driven through the router.
//!
//! 1. The grab offset is fixed for the whole gesture.
//! 2. Consecutive projected translations differ by exactly the pointer delta.
//! 3. A completed gesture publishes `Dragging` then `Idle` and clears geometry.
//! 4. Each frame writes at most once regardless of move count.

use std::rc::Rc;

use dragline::{DraggableOptions, DraggableState, Offset, Rect};
use dragline_harness::{DragHarness, TestElement, Timeline};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

// Integral coordinates keep the float comparisons exact.
fn coord() -> impl Strategy<Value = f64> {
    (-1000i32..=1000).prop_map(f64::from)
}

fn card_strategy() -> impl Strategy<Value = Rect> {
    (coord(), coord(), 10i32..=200, 10i32..=200)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, f64::from(w), f64::from(h)))
}

/// A card plus a press point strictly inside it.
fn press_strategy() -> impl Strategy<Value = (Rect, (f64, f64))> {
    card_strategy().prop_flat_map(|card| {
        let w = card.width as i32;
        let h = card.height as i32;
        (Just(card), (0..w, 0..h)).prop_map(|(card, (dx, dy))| {
            (card, (card.x + f64::from(dx), card.y + f64::from(dy)))
        })
    })
}

/// Moves far enough from anything near the card to clear the threshold.
fn path_strategy() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((3000i32..=4000, 3000i32..=4000), 1..20).prop_map(|v| {
        v.into_iter()
            .map(|(x, y)| (f64::from(x), f64::from(y)))
            .collect()
    })
}

struct Setup {
    h: DragHarness,
    card: Rc<TestElement>,
    preview: Rc<TestElement>,
    controller: dragline::DragController,
}

fn setup(card_rect: Rect) -> Setup {
    let h = DragHarness::new();
    let card = TestElement::at("card", card_rect);
    let preview = TestElement::at("preview", card_rect);
    let controller = h.controller(DraggableOptions::new(card.to_ref()));
    controller.bind_preview_element(&preview.to_ref());
    Setup {
        h,
        card,
        preview,
        controller,
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Offset is invariant across moves
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn offset_fixed_for_gesture((card, press) in press_strategy(), path in path_strategy()) {
        let s = setup(card);
        prop_assert!(s.h.press(press.0, press.1).unwrap());

        let expected = Offset::new(press.0 - card.x, press.1 - card.y);
        for &(x, y) in &path {
            s.h.move_to(x, y);
            prop_assert_eq!(s.controller.interaction().offset().get(), Some(expected));
        }

        // Layout changes mid-gesture do not re-measure.
        s.card.set_rect(Rect::new(card.x + 7.0, card.y + 9.0, card.width, card.height));
        s.h.move_to(3500.0, 3500.0);
        prop_assert_eq!(s.controller.interaction().offset().get(), Some(expected));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Translation deltas equal pointer deltas
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn translation_tracks_pointer_delta((card, press) in press_strategy(), path in path_strategy()) {
        let s = setup(card);
        s.h.press(press.0, press.1).unwrap();

        let mut previous: Option<((f64, f64), Offset)> = None;
        for &(x, y) in &path {
            s.h.move_to(x, y);
            s.h.frame();
            let Some(written) = s.preview.translation() else {
                return Err(TestCaseError::fail("no translation written"));
            };
            if let Some(((px, py), prev)) = previous {
                prop_assert_eq!(written.x - prev.x, x - px);
                prop_assert_eq!(written.y - prev.y, y - py);
            }
            previous = Some(((x, y), written));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Idle → Dragging → Idle with clear geometry
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn gesture_round_trips_state(
        (card, press) in press_strategy(),
        path in path_strategy(),
        cancel in any::<bool>(),
    ) {
        let s = setup(card);
        let states = Timeline::record(s.controller.state());

        s.h.press(press.0, press.1).unwrap();
        for &(x, y) in &path {
            s.h.move_to(x, y);
        }
        if cancel {
            prop_assert!(s.h.cancel());
        } else {
            let &(x, y) = path.last().unwrap_or(&press);
            s.h.release(x, y);
        }

        prop_assert_eq!(states.values(), vec![DraggableState::Dragging, DraggableState::Idle]);
        prop_assert!(s.controller.interaction().is_geometry_clear());
        prop_assert!(!s.h.router().is_dragging());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. At most one write per frame
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn one_write_per_frame((card, press) in press_strategy(), path in path_strategy()) {
        let s = setup(card);
        s.h.press(press.0, press.1).unwrap();
        for &(x, y) in &path {
            s.h.move_to(x, y);
        }
        prop_assert!(s.h.frames().pending() <= 1);
        s.h.frame();
        prop_assert_eq!(s.preview.write_count(), 1);

        let &(x, y) = path.last().unwrap_or(&press);
        prop_assert_eq!(
            s.preview.translation(),
            Some(Offset::new(x - (press.0 - card.x), y - (press.1 - card.y)))
        );
    }
}
