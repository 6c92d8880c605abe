use super::*;

#[test]
fn empty_object_gives_defaults() {
    let cfg = EditorConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, EditorConfig::default());
    assert_eq!(cfg.canvas_size, 600);
    assert_eq!(cfg.initial_position, Point::new(54.0, 286.0));
    assert_eq!(cfg.initial_scale, 1.0);
    assert_eq!(cfg.clip, ClipGeometry::Circle { diameter: 220.0 });
    assert_eq!(cfg.background_path, PathBuf::from("candidate.jpg"));
    assert_eq!(cfg.export.file_name, "election-compare.jpg");
    assert_eq!(cfg.drag_policy, DragPolicy::Unbounded);
    assert!(cfg.fit_overlay_to_clip);
}

#[test]
fn parses_full_document() {
    let cfg = EditorConfig::from_json_str(
        r#"{
            "canvas_size": 800,
            "clip": {"rounded_rect": {"width": 300, "height": 200, "corner_radius": 24}},
            "initial_position": {"x": 10, "y": 20},
            "initial_scale": 0.5,
            "scale_bounds": {"min": 0.25, "max": 4},
            "background_path": "templates/bg.svg",
            "drag_policy": {"keep_overlap": {"min_visible": 32}},
            "fit_overlay_to_clip": false,
            "decode_threads": 2,
            "export": {"file_name": "out.jpg", "jpeg_quality": 80},
            "share": {"title": "t", "text": "x", "url": "https://example.org"}
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.canvas_size, 800);
    assert_eq!(
        cfg.clip,
        ClipGeometry::RoundedRect {
            width: 300.0,
            height: 200.0,
            corner_radius: 24.0
        }
    );
    assert_eq!(
        cfg.initial_transform().unwrap(),
        Transform {
            position: Point::new(10.0, 20.0),
            scale: 0.5
        }
    );
    assert_eq!(cfg.drag_policy, DragPolicy::KeepOverlap { min_visible: 32.0 });
    assert_eq!(cfg.export.jpeg_quality, 80);
    assert_eq!(cfg.share.url, "https://example.org");
    assert!(!cfg.fit_overlay_to_clip);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = EditorConfig::from_json_str(r#"{"canvas": 600}"#).unwrap_err();
    assert!(matches!(err, PosterError::Serde(_)));
}

#[test]
fn invalid_values_are_rejected() {
    for json in [
        r#"{"canvas_size": 0}"#,
        r#"{"canvas_size": 20000}"#,
        r#"{"initial_scale": 0}"#,
        r#"{"initial_scale": -2}"#,
        r#"{"scale_bounds": {"min": 2, "max": 1}}"#,
        r#"{"clip": {"circle": {"diameter": -5}}}"#,
        r#"{"clip": {"rounded_rect": {"width": 10, "height": 10, "corner_radius": 6}}}"#,
        r#"{"export": {"jpeg_quality": 0}}"#,
        r#"{"drag_policy": {"keep_overlap": {"min_visible": -1}}}"#,
        r#"{"decode_threads": 0}"#,
    ] {
        let err = EditorConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, PosterError::Validation(_)), "{json}: {err}");
    }
}

#[test]
fn missing_file_is_a_validation_error() {
    let err = EditorConfig::from_json_file("/nonexistent/posterkit.json").unwrap_err();
    assert!(matches!(err, PosterError::Validation(_)));
}

#[test]
fn serializes_back_to_equal_config() {
    let cfg = EditorConfig::default();
    let json = serde_json::to_string_pretty(&cfg).unwrap();
    assert_eq!(EditorConfig::from_json_str(&json).unwrap(), cfg);
}
