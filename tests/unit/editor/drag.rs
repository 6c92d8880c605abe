use super::*;
use crate::foundation::error::PosterError;

/// Minimal store double, recording every write.
#[derive(Default)]
struct FakeStore {
    transform: Transform,
    natural: Option<Size>,
    writes: Vec<Transform>,
}

impl FakeStore {
    fn with_overlay(x: f64, y: f64, scale: f64, w: f64, h: f64) -> Self {
        Self {
            transform: Transform {
                position: Point::new(x, y),
                scale,
            },
            natural: Some(Size::new(w, h)),
            writes: Vec::new(),
        }
    }
}

impl TransformAccess for FakeStore {
    fn get(&self) -> Transform {
        self.transform
    }

    fn set(&mut self, transform: Transform) -> PosterResult<()> {
        transform.validate()?;
        self.transform = transform;
        self.writes.push(transform);
        Ok(())
    }

    fn natural_size(&self) -> Option<Size> {
        self.natural
    }
}

fn scenario_store() -> FakeStore {
    FakeStore::with_overlay(54.0, 286.0, 1.0, 220.0, 220.0)
}

#[test]
fn drag_moves_position_by_pointer_minus_grab_offset() {
    let mut store = scenario_store();
    let mut drag = DragController::new(600);

    let r = drag.handle(&PointerEvent::down(100.0, 300.0), &mut store).unwrap();
    assert!(r.consumed && r.prevent_default && !r.changed);
    let DragState::Dragging(session) = drag.state() else {
        panic!("expected drag to start");
    };
    assert_eq!(session.grab_offset, Vec2::new(46.0, 14.0));

    let r = drag.handle(&PointerEvent::moved(150.0, 350.0), &mut store).unwrap();
    assert!(r.changed && r.prevent_default);
    assert_eq!(store.get().position, Point::new(104.0, 336.0));
    assert_eq!(store.get().scale, 1.0);

    // The grab offset stays fixed for the whole gesture.
    for (x, y) in [(10.0, 20.0), (-300.0, 900.0), (600.0, 600.0)] {
        drag.handle(&PointerEvent::moved(x, y), &mut store).unwrap();
        assert_eq!(store.get().position, Point::new(x - 46.0, y - 14.0));
        assert_eq!(drag.state(), DragState::Dragging(session));
    }

    let r = drag.handle(&PointerEvent::up(0.0, 0.0), &mut store).unwrap();
    assert!(r.consumed && !r.changed);
    assert_eq!(drag.state(), DragState::Idle);
    assert_eq!(store.writes.len(), 4);
}

#[test]
fn pointer_down_on_or_outside_edge_does_not_start_drag() {
    let mut store = scenario_store();
    let mut drag = DragController::new(600);
    for (x, y) in [(54.0, 300.0), (274.0, 300.0), (100.0, 286.0), (100.0, 506.0), (10.0, 10.0)] {
        let r = drag.handle(&PointerEvent::down(x, y), &mut store).unwrap();
        assert_eq!(r, PointerResponse::default(), "({x},{y})");
        assert!(!drag.is_dragging());
    }
    // Moves while idle never write.
    drag.handle(&PointerEvent::moved(150.0, 350.0), &mut store).unwrap();
    assert!(store.writes.is_empty());
}

#[test]
fn pointer_down_without_overlay_is_noop() {
    let mut store = FakeStore::default();
    let mut drag = DragController::new(600);
    let r = drag.handle(&PointerEvent::down(1.0, 1.0), &mut store).unwrap();
    assert!(!r.consumed);
    assert!(!drag.is_dragging());
}

#[test]
fn hit_test_uses_scaled_bbox() {
    let mut store = FakeStore::with_overlay(54.0, 286.0, 2.0, 220.0, 220.0);
    let mut drag = DragController::new(600);
    // Outside the scale-1 bbox but inside the scale-2 one.
    drag.handle(&PointerEvent::down(400.0, 450.0), &mut store).unwrap();
    assert!(drag.is_dragging());
}

#[test]
fn viewport_scaling_applies_to_hit_test_and_moves() {
    let mut store = scenario_store();
    let mut drag = DragController::new(600);
    drag.set_viewport(CanvasViewport {
        left: 10.0,
        top: 20.0,
        width: 300.0,
        height: 300.0,
    })
    .unwrap();

    // Client (60, 170) is canvas (100, 300).
    drag.handle(&PointerEvent::down(60.0, 170.0), &mut store).unwrap();
    assert!(drag.is_dragging());
    // Client (85, 195) is canvas (150, 350).
    drag.handle(&PointerEvent::moved(85.0, 195.0), &mut store).unwrap();
    assert_eq!(store.get().position, Point::new(104.0, 336.0));
}

#[test]
fn cancel_ends_session_without_moving() {
    let mut store = scenario_store();
    let mut drag = DragController::new(600);
    drag.handle(&PointerEvent::down(100.0, 300.0), &mut store).unwrap();
    let r = drag.handle(&PointerEvent::cancel(), &mut store).unwrap();
    assert!(r.consumed && !r.changed);
    assert!(!drag.is_dragging());
    assert_eq!(store.get().position, Point::new(54.0, 286.0));
}

#[test]
fn other_pointers_are_ignored_mid_drag() {
    let mut store = scenario_store();
    let mut drag = DragController::new(600);
    drag.handle(&PointerEvent::down(100.0, 300.0).with_pointer_id(1), &mut store)
        .unwrap();

    let r = drag
        .handle(&PointerEvent::moved(500.0, 500.0).with_pointer_id(2), &mut store)
        .unwrap();
    assert!(!r.changed);
    let r = drag
        .handle(&PointerEvent::up(500.0, 500.0).with_pointer_id(2), &mut store)
        .unwrap();
    assert!(!r.consumed);
    assert!(drag.is_dragging());

    drag.handle(&PointerEvent::moved(150.0, 350.0).with_pointer_id(1), &mut store)
        .unwrap();
    assert_eq!(store.get().position, Point::new(104.0, 336.0));
}

#[test]
fn non_finite_pointer_is_rejected_and_state_kept() {
    let mut store = scenario_store();
    let mut drag = DragController::new(600);
    drag.handle(&PointerEvent::down(100.0, 300.0), &mut store).unwrap();
    let err = drag
        .handle(&PointerEvent::moved(f64::NAN, 1.0), &mut store)
        .unwrap_err();
    assert!(matches!(err, PosterError::Validation(_)));
    assert!(drag.is_dragging());
    assert!(store.writes.is_empty());
}

#[test]
fn keep_overlap_clamps_to_canvas() {
    let mut store = scenario_store();
    let mut drag = DragController::new(600).with_clamp(Box::new(KeepOverlap { min_visible: 20.0 }));
    drag.handle(&PointerEvent::down(100.0, 300.0), &mut store).unwrap();

    drag.handle(&PointerEvent::moved(5000.0, -5000.0), &mut store).unwrap();
    assert_eq!(store.get().position, Point::new(580.0, -200.0));

    drag.handle(&PointerEvent::moved(-5000.0, 5000.0), &mut store).unwrap();
    assert_eq!(store.get().position, Point::new(-200.0, 580.0));

    // Moves that already overlap pass through unchanged.
    drag.handle(&PointerEvent::moved(150.0, 350.0), &mut store).unwrap();
    assert_eq!(store.get().position, Point::new(104.0, 336.0));
}

#[test]
fn closures_act_as_clamp_policies() {
    let mut store = scenario_store();
    let snap = |t: Transform| {
        t.with_position(Point::new(
            (t.position.x / 10.0).round() * 10.0,
            (t.position.y / 10.0).round() * 10.0,
        ))
    };
    let mut drag = DragController::new(600).with_clamp(Box::new(snap));
    drag.handle(&PointerEvent::down(100.0, 300.0), &mut store).unwrap();
    drag.handle(&PointerEvent::moved(150.0, 350.0), &mut store).unwrap();
    assert_eq!(store.get().position, Point::new(100.0, 340.0));
}

#[test]
fn strict_hit_test() {
    let bbox = Rect::new(54.0, 286.0, 274.0, 506.0);
    assert!(hit_test(bbox, Point::new(100.0, 300.0)));
    assert!(hit_test(bbox, Point::new(54.001, 286.001)));
    assert!(!hit_test(bbox, Point::new(54.0, 300.0)));
    assert!(!hit_test(bbox, Point::new(274.0, 506.0)));
}
