use super::*;

#[test]
fn unscaled_viewport_is_identity() {
    let vp = CanvasViewport::unscaled(600);
    assert_eq!(
        vp.to_canvas(Point::new(100.0, 300.0), 600).unwrap(),
        Point::new(100.0, 300.0)
    );
}

#[test]
fn offset_and_css_scale_are_removed() {
    // 600px canvas shown at 300x300, 20px from the left and 40px from the top.
    let vp = CanvasViewport {
        left: 20.0,
        top: 40.0,
        width: 300.0,
        height: 300.0,
    };
    assert_eq!(
        vp.to_canvas(Point::new(70.0, 190.0), 600).unwrap(),
        Point::new(100.0, 300.0)
    );
    assert_eq!(
        vp.to_canvas(Point::new(20.0, 40.0), 600).unwrap(),
        Point::ORIGIN
    );
}

#[test]
fn non_uniform_display_scales_axes_independently() {
    let vp = CanvasViewport {
        left: 0.0,
        top: 0.0,
        width: 1200.0,
        height: 300.0,
    };
    assert_eq!(
        vp.to_canvas(Point::new(600.0, 150.0), 600).unwrap(),
        Point::new(300.0, 300.0)
    );
}

#[test]
fn rejects_degenerate_viewport_and_input() {
    let mut vp = CanvasViewport::unscaled(600);
    assert!(vp.validate().is_ok());
    vp.width = 0.0;
    assert!(vp.validate().is_err());
    assert!(
        CanvasViewport::unscaled(600)
            .to_canvas(Point::new(f64::NAN, 1.0), 600)
            .is_err()
    );
}

#[test]
fn event_constructors() {
    let e = PointerEvent::down(1.0, 2.0).with_pointer_id(7);
    assert_eq!(e.phase, PointerPhase::Down);
    assert_eq!(e.client, Point::new(1.0, 2.0));
    assert_eq!(e.pointer_id, 7);
    assert_eq!(PointerEvent::cancel().phase, PointerPhase::Cancel);
}
