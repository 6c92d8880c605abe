use super::*;

#[test]
fn transform_rejects_degenerate_scale() {
    assert!(Transform::new(Point::new(0.0, 0.0), 0.0).is_err());
    assert!(Transform::new(Point::new(0.0, 0.0), -1.0).is_err());
    assert!(Transform::new(Point::new(0.0, 0.0), f64::NAN).is_err());
    assert!(Transform::new(Point::new(f64::INFINITY, 0.0), 1.0).is_err());
    assert!(Transform::new(Point::new(-40.0, 900.0), 0.01).is_ok());
}

#[test]
fn bbox_scales_uniformly() {
    let t = Transform::new(Point::new(54.0, 286.0), 1.0).unwrap();
    let natural = Size::new(220.0, 220.0);
    assert_eq!(t.bbox(natural), Rect::new(54.0, 286.0, 274.0, 506.0));

    let t = t.with_scale(2.0);
    let size = t.effective_size(Size::new(300.0, 150.0));
    assert_eq!(size, Size::new(600.0, 300.0));
    assert_eq!(t.bbox(natural).origin(), Point::new(54.0, 286.0));
    assert_eq!(t.bbox(natural).size(), Size::new(440.0, 440.0));
}

#[test]
fn affine_maps_overlay_corners_to_bbox() {
    let t = Transform::new(Point::new(10.0, 20.0), 0.5).unwrap();
    assert_eq!(t.to_affine() * Point::ORIGIN, Point::new(10.0, 20.0));
    assert_eq!(t.to_affine() * Point::new(100.0, 40.0), Point::new(60.0, 40.0));
}

#[test]
fn straight_to_premul_rounds() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c.to_array(), [128, 64, 0, 128]);
    assert_eq!(Rgba8Premul::WHITE.to_array(), [255; 4]);
    assert_eq!(Rgba8Premul::transparent().a, 0);
}
