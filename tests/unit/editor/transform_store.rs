use super::*;
use crate::foundation::core::Point;

fn default_store() -> TransformStore {
    TransformStore::new(
        Transform::new(Point::new(54.0, 286.0), 1.0).unwrap(),
        ScaleBounds::default(),
    )
    .unwrap()
}

#[test]
fn overlay_bbox_matches_natural_size_times_scale() {
    let mut store = default_store();
    assert_eq!(store.overlay_bbox(), None);

    store
        .reset_for_overlay(
            Size::new(220.0, 220.0),
            Transform::new(Point::new(54.0, 286.0), 1.0).unwrap(),
        )
        .unwrap();
    assert_eq!(
        store.overlay_bbox(),
        Some(Rect::new(54.0, 286.0, 274.0, 506.0))
    );

    store.set(store.get().with_scale(2.0)).unwrap();
    let bbox = store.overlay_bbox().unwrap();
    assert_eq!(bbox.origin(), Point::new(54.0, 286.0));
    assert_eq!(bbox.size(), Size::new(440.0, 440.0));
}

#[test]
fn set_rejects_non_positive_scale_and_keeps_state() {
    let mut store = default_store();
    let before = store.get();
    let rev = store.revision();
    assert!(store.set(before.with_scale(0.0)).is_err());
    assert!(store.set(before.with_scale(-1.0)).is_err());
    assert!(store.set(before.with_scale(f64::NAN)).is_err());
    assert!(
        store
            .set(before.with_position(Point::new(f64::INFINITY, 0.0)))
            .is_err()
    );
    assert_eq!(store.get(), before);
    assert_eq!(store.revision(), rev);
}

#[test]
fn set_clamps_scale_into_bounds() {
    let mut store = TransformStore::new(
        Transform::default(),
        ScaleBounds { min: 0.5, max: 3.0 },
    )
    .unwrap();
    store.set(Transform::default().with_scale(10.0)).unwrap();
    assert_eq!(store.get().scale, 3.0);
    store.set(Transform::default().with_scale(0.1)).unwrap();
    assert_eq!(store.get().scale, 0.5);
}

#[test]
fn every_accepted_set_bumps_revision() {
    let mut store = default_store();
    let t = store.get();
    store.set(t).unwrap();
    store.set(t).unwrap();
    assert_eq!(store.revision(), 2);
}

#[test]
fn bounds_validation() {
    assert!(ScaleBounds { min: 0.0, max: 1.0 }.validate().is_err());
    assert!(ScaleBounds { min: 2.0, max: 1.0 }.validate().is_err());
    assert!(
        ScaleBounds {
            min: 0.1,
            max: f64::INFINITY
        }
        .validate()
        .is_err()
    );
    assert!(ScaleBounds { min: 1.0, max: 1.0 }.validate().is_ok());
}

#[test]
fn reset_rejects_empty_overlay() {
    let mut store = default_store();
    assert!(
        store
            .reset_for_overlay(Size::new(0.0, 10.0), Transform::default())
            .is_err()
    );
    assert_eq!(store.natural_size(), None);
}
