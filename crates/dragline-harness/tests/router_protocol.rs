#![forbid(unsafe_code)]

//! Callback ordering and hit-testing of the reference router.

use std::rc::Rc;

use dragline::{
    DragData, Error, GestureConfig, PointerButton, PointerEvent, PointerSample, Rect,
};
use dragline_harness::{CallLog, DragHarness, ProbeSource, ProbeTarget, TestElement};

fn lines(log: &CallLog) -> Vec<String> {
    log.take()
}

struct Board {
    h: DragHarness,
    log: CallLog,
    source: Rc<ProbeSource>,
    target: Rc<ProbeTarget>,
    _regs: Vec<dragline::Registration>,
}

/// Source `a` at (0,0,50,50), target `t` at (100,0,50,50).
fn board() -> Board {
    let h = DragHarness::new();
    let log = CallLog::new();
    let a = TestElement::at("a", Rect::new(0.0, 0.0, 50.0, 50.0));
    let t = TestElement::at("t", Rect::new(100.0, 0.0, 50.0, 50.0));
    let source = Rc::new(
        ProbeSource::new("a", a.to_ref(), &log)
            .with_payload(DragData::new().with("kind", "card")),
    );
    let target = Rc::new(ProbeTarget::new("t", t.to_ref(), &log));
    let regs = vec![
        h.register_source(source.clone()),
        h.register_target(target.clone()),
    ];
    Board {
        h,
        log,
        source,
        target,
        _regs: regs,
    }
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn start_sequence_is_preview_start_enter_move() {
    let b = board();
    assert!(b.h.press(10.0, 10.0).unwrap());
    assert!(b.log.is_empty());

    b.h.move_to(120.0, 10.0);
    assert_eq!(lines(&b.log), ["a:preview", "a:start", "t:enter", "a:move"]);

    b.h.move_to(130.0, 10.0);
    assert_eq!(lines(&b.log), ["a:move"]);
}

#[test]
fn release_delivers_drop_then_end() {
    let b = board();
    b.h.drag_through((10.0, 10.0), &[(120.0, 10.0)]).unwrap();
    let hovered = b.h.router().hovered_targets();
    assert_eq!(hovered.len(), 1);
    b.log.take();

    b.h.release(120.0, 10.0);
    assert_eq!(lines(&b.log), ["t:drop", "a:end(dropped)"]);
    assert_eq!(b.source.last_targets(), hovered);
    assert_eq!(
        b.target.dropped_payloads()[0].get_text("kind"),
        Some("card")
    );
}

#[test]
fn cancel_delivers_leave_then_end() {
    let b = board();
    b.h.drag_through((10.0, 10.0), &[(120.0, 10.0)]).unwrap();
    b.log.take();

    assert!(b.h.cancel());
    assert_eq!(lines(&b.log), ["t:leave", "a:end(cancelled)"]);
    assert!(b.source.last_targets().is_empty());
    assert!(b.target.dropped_payloads().is_empty());
    assert!(!b.h.cancel());
}

#[test]
fn leaving_a_target_delivers_leave_before_move() {
    let b = board();
    b.h.drag_through((10.0, 10.0), &[(120.0, 10.0)]).unwrap();
    b.log.take();

    b.h.move_to(300.0, 300.0);
    assert_eq!(lines(&b.log), ["t:leave", "a:move"]);
    b.h.release(300.0, 300.0);
    assert_eq!(lines(&b.log), ["a:end(dropped)"]);
}

// ============================================================================
// Threshold and hit-testing
// ============================================================================

#[test]
fn release_below_threshold_is_a_click() {
    let b = board();
    b.h.press(10.0, 10.0).unwrap();
    b.h.move_to(11.0, 12.0);
    b.h.release(11.0, 12.0);
    assert!(b.log.is_empty());
    assert!(!b.h.router().is_pressed());
}

#[test]
fn custom_threshold_delays_start() {
    let h = DragHarness::with_config(GestureConfig::default().with_threshold(20.0)).unwrap();
    let log = CallLog::new();
    let a = TestElement::at("a", Rect::new(0.0, 0.0, 50.0, 50.0));
    let _reg = h.register_source(Rc::new(ProbeSource::new("a", a.to_ref(), &log)));

    h.drag_through((10.0, 10.0), &[(20.0, 10.0)]).unwrap();
    assert!(log.is_empty());
    h.move_to(30.0, 10.0);
    assert_eq!(log.take(), ["a:preview", "a:start", "a:move"]);
}

#[test]
fn press_outside_any_source_is_ignored() {
    let b = board();
    assert!(!b.h.press(300.0, 300.0).unwrap());
    b.h.move_to(10.0, 10.0);
    assert!(b.log.is_empty());
}

#[test]
fn topmost_source_wins() {
    let h = DragHarness::new();
    let log = CallLog::new();
    let rect = Rect::new(0.0, 0.0, 50.0, 50.0);
    let _below = h.register_source(Rc::new(ProbeSource::new(
        "below",
        TestElement::at("below", rect).to_ref(),
        &log,
    )));
    let _above = h.register_source(Rc::new(ProbeSource::new(
        "above",
        TestElement::at("above", rect).to_ref(),
        &log,
    )));

    h.drag_through((10.0, 10.0), &[(30.0, 30.0)]).unwrap();
    assert_eq!(log.take(), ["above:preview", "above:start", "above:move"]);
}

#[test]
fn handle_restricts_press_area() {
    let h = DragHarness::new();
    let log = CallLog::new();
    let body = TestElement::at("body", Rect::new(0.0, 0.0, 50.0, 50.0));
    let grip = TestElement::at("grip", Rect::new(0.0, 0.0, 10.0, 10.0));
    let _reg = h.register_source(Rc::new(
        ProbeSource::new("a", body.to_ref(), &log).with_handle(grip.to_ref()),
    ));

    assert!(!h.press(30.0, 30.0).unwrap());
    assert!(h.press(5.0, 5.0).unwrap());
}

#[test]
fn can_start_is_consulted_at_press() {
    let b = board();
    b.source.set_allow(false);
    assert!(!b.h.press(10.0, 10.0).unwrap());
    b.h.move_to(120.0, 10.0);
    assert!(b.log.is_empty());
}

#[test]
fn can_accept_filters_targets() {
    let h = DragHarness::new();
    let log = CallLog::new();
    let a = TestElement::at("a", Rect::new(0.0, 0.0, 50.0, 50.0));
    let t = TestElement::at("t", Rect::new(100.0, 0.0, 50.0, 50.0));
    let _s = h.register_source(Rc::new(
        ProbeSource::new("a", a.to_ref(), &log)
            .with_payload(DragData::new().with("kind", "file")),
    ));
    let _t = h.register_target(Rc::new(
        ProbeTarget::new("t", t.to_ref(), &log)
            .with_accept(|args| args.source.data.get_text("kind") == Some("card")),
    ));

    h.drag_through((10.0, 10.0), &[(120.0, 10.0)]).unwrap();
    assert_eq!(log.take(), ["a:preview", "a:start", "a:move"]);
}

#[test]
fn overlapping_targets_listed_topmost_first() {
    let h = DragHarness::new();
    let log = CallLog::new();
    let a = TestElement::at("a", Rect::new(0.0, 0.0, 50.0, 50.0));
    let outer = TestElement::at("outer", Rect::new(100.0, 0.0, 100.0, 100.0));
    let inner = TestElement::at("inner", Rect::new(120.0, 20.0, 20.0, 20.0));
    let _s = h.register_source(Rc::new(ProbeSource::new("a", a.to_ref(), &log)));
    let _o = h.register_target(Rc::new(ProbeTarget::new("outer", outer.to_ref(), &log)));
    let _i = h.register_target(Rc::new(ProbeTarget::new("inner", inner.to_ref(), &log)));

    h.drag_through((10.0, 10.0), &[(130.0, 30.0)]).unwrap();
    assert_eq!(
        log.take(),
        ["a:preview", "a:start", "inner:enter", "outer:enter", "a:move"]
    );
    assert_eq!(h.router().hovered_targets().len(), 2);
}

// ============================================================================
// Registration churn
// ============================================================================

#[test]
fn unregistered_source_still_gets_end() {
    let h = DragHarness::new();
    let log = CallLog::new();
    let a = TestElement::at("a", Rect::new(0.0, 0.0, 50.0, 50.0));
    let reg = h.register_source(Rc::new(ProbeSource::new("a", a.to_ref(), &log)));

    h.drag_through((10.0, 10.0), &[(30.0, 30.0)]).unwrap();
    drop(reg);
    log.take();
    h.release(30.0, 30.0);
    assert_eq!(log.take(), ["a:end(dropped)"]);
}

#[test]
fn unregistered_source_abandons_pending_press() {
    let h = DragHarness::new();
    let log = CallLog::new();
    let a = TestElement::at("a", Rect::new(0.0, 0.0, 50.0, 50.0));
    let reg = h.register_source(Rc::new(ProbeSource::new("a", a.to_ref(), &log)));

    h.press(10.0, 10.0).unwrap();
    reg.cleanup();
    assert!(!h.router().is_pressed());
    h.move_to(40.0, 40.0);
    assert!(log.is_empty());
}

#[test]
fn unregistered_target_leaves_hover_set_silently() {
    let h = DragHarness::new();
    let log = CallLog::new();
    let a = TestElement::at("a", Rect::new(0.0, 0.0, 50.0, 50.0));
    let t = TestElement::at("t", Rect::new(100.0, 0.0, 50.0, 50.0));
    let _s = h.register_source(Rc::new(ProbeSource::new("a", a.to_ref(), &log)));
    let treg = h.register_target(Rc::new(ProbeTarget::new("t", t.to_ref(), &log)));

    h.drag_through((10.0, 10.0), &[(120.0, 10.0)]).unwrap();
    drop(treg);
    assert!(h.router().hovered_targets().is_empty());
    log.take();

    h.release(120.0, 10.0);
    assert_eq!(log.take(), ["a:end(dropped)"]);
}

// ============================================================================
// Input edge cases
// ============================================================================

#[test]
fn second_press_is_rejected() {
    let b = board();
    b.h.press(10.0, 10.0).unwrap();
    assert_eq!(b.h.press(20.0, 20.0), Err(Error::GestureInFlight));
    b.h.move_to(120.0, 10.0);
    assert_eq!(b.h.press(20.0, 20.0), Err(Error::GestureInFlight));
}

#[test]
fn non_primary_button_does_not_press() {
    let b = board();
    let sample = PointerSample::new(10.0, 10.0).with_button(Some(PointerButton::Auxiliary));
    b.h.router().handle_event(PointerEvent::Down(sample)).unwrap();
    assert!(!b.h.router().is_pressed());
}

#[test]
fn escape_honours_config() {
    let h = DragHarness::with_config(GestureConfig::default().no_escape_cancel()).unwrap();
    let log = CallLog::new();
    let a = TestElement::at("a", Rect::new(0.0, 0.0, 50.0, 50.0));
    let _reg = h.register_source(Rc::new(ProbeSource::new("a", a.to_ref(), &log)));

    h.drag_through((10.0, 10.0), &[(30.0, 30.0)]).unwrap();
    assert!(!h.router().escape());
    assert!(h.router().is_dragging());
}

#[test]
fn native_image_kept_unless_suppressed() {
    let h = DragHarness::new();
    let log = CallLog::new();
    let a = TestElement::at("a", Rect::new(0.0, 0.0, 50.0, 50.0));
    let b = TestElement::at("b", Rect::new(100.0, 0.0, 50.0, 50.0));
    let _a = h.register_source(Rc::new(ProbeSource::new("a", a.to_ref(), &log)));
    let _b = h.register_source(Rc::new(
        ProbeSource::new("b", b.to_ref(), &log).suppressing_native(),
    ));

    h.drag_through((10.0, 10.0), &[(30.0, 30.0)]).unwrap();
    assert!(!h.router().native_preview_suppressed());
    h.cancel();

    h.drag_through((110.0, 10.0), &[(130.0, 30.0)]).unwrap();
    assert!(h.router().native_preview_suppressed());
}
