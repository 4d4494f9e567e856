use super::*;

const CANVAS: Canvas = Canvas {
    width: 100,
    height: 100,
};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn identity_transform_places_source_at_origin() {
    let p = compute_placement(&Transform::default(), Size::new(10.0, 20.0), CANVAS);
    assert_eq!(p.affine, Affine::IDENTITY);
    assert_eq!(p.src_rect, Rect::new(0.0, 0.0, 10.0, 20.0));
    assert_eq!(p.paint_rect, Rect::new(0.0, 0.0, 10.0, 20.0));
    assert!(!p.is_degenerate());
}

#[test]
fn position_and_scale_move_the_box() {
    let t = Transform {
        position: Vec2::new(5.0, 7.0),
        scale: Vec2::new(2.0, 0.5),
        ..Transform::default()
    };
    let p = compute_placement(&t, Size::new(10.0, 10.0), CANVAS);
    assert_eq!(p.paint_rect, Rect::new(5.0, 7.0, 25.0, 12.0));
}

#[test]
fn center_alignment_anchors_box_center_at_position() {
    let t = Transform {
        position: Vec2::new(50.0, 50.0),
        alignment: Alignment::Center,
        ..Transform::default()
    };
    let p = compute_placement(&t, Size::new(20.0, 10.0), CANVAS);
    assert_eq!(p.paint_rect, Rect::new(40.0, 45.0, 60.0, 55.0));
}

#[test]
fn rotation_about_center_anchor_keeps_center_fixed() {
    let t = Transform {
        position: Vec2::new(50.0, 50.0),
        alignment: Alignment::Center,
        rotation_deg: 90.0,
        ..Transform::default()
    };
    let p = compute_placement(&t, Size::new(20.0, 10.0), CANVAS);
    let center = p.affine * Point::new(10.0, 5.0);
    assert!(approx(center.x, 50.0) && approx(center.y, 50.0));
    // 20x10 rotated a quarter turn becomes 10x20.
    assert!(approx(p.paint_rect.width(), 10.0));
    assert!(approx(p.paint_rect.height(), 20.0));
}

#[test]
fn crop_shrinks_sampled_region_and_box() {
    let t = Transform {
        crop: Crop {
            left: 2.0,
            right: 3.0,
            top: 1.0,
            bottom: 0.0,
        },
        ..Transform::default()
    };
    let p = compute_placement(&t, Size::new(10.0, 10.0), CANVAS);
    assert_eq!(p.src_rect, Rect::new(2.0, 1.0, 7.0, 10.0));
    // Cropped content starts at the item origin.
    assert_eq!(p.paint_rect, Rect::new(0.0, 0.0, 5.0, 9.0));
}

#[test]
fn bounds_scale_fits_and_centers() {
    let t = Transform::fit_to(Canvas {
        width: 100,
        height: 50,
    });
    let p = compute_placement(&t, Size::new(10.0, 10.0), CANVAS);
    assert_eq!(p.paint_rect, Rect::new(25.0, 0.0, 75.0, 50.0));
}

#[test]
fn bounds_stretch_fills_exactly() {
    let t = Transform::stretch_to(Canvas {
        width: 100,
        height: 50,
    });
    let p = compute_placement(&t, Size::new(10.0, 10.0), CANVAS);
    assert_eq!(p.paint_rect, Rect::new(0.0, 0.0, 100.0, 50.0));
}

#[test]
fn bounds_crop_covers_and_clips_source() {
    let t = Transform {
        bounds_type: BoundsType::Crop,
        bounds: Vec2::new(100.0, 50.0),
        ..Transform::default()
    };
    let p = compute_placement(&t, Size::new(10.0, 10.0), CANVAS);
    // Scale 10 covers 100x100; centered vertically, only source rows 2.5..7.5 remain.
    let close = |a: Rect, b: Rect| {
        approx(a.x0, b.x0) && approx(a.y0, b.y0) && approx(a.x1, b.x1) && approx(a.y1, b.y1)
    };
    assert!(close(p.src_rect, Rect::new(0.0, 2.5, 10.0, 7.5)));
    assert!(close(p.paint_rect, Rect::new(0.0, 0.0, 100.0, 50.0)));
}

#[test]
fn degenerate_inputs_paint_nothing() {
    let zero_scale = Transform {
        scale: Vec2::new(0.0, 1.0),
        ..Transform::default()
    };
    assert!(compute_placement(&zero_scale, Size::new(10.0, 10.0), CANVAS).is_degenerate());

    let negative = Transform {
        scale: Vec2::new(-3.0, 1.0),
        ..Transform::default()
    };
    assert!(compute_placement(&negative, Size::new(10.0, 10.0), CANVAS).is_degenerate());

    let over_cropped = Transform {
        crop: Crop {
            left: 6.0,
            right: 6.0,
            ..Crop::default()
        },
        ..Transform::default()
    };
    assert!(compute_placement(&over_cropped, Size::new(10.0, 10.0), CANVAS).is_degenerate());

    let empty_bounds = Transform {
        bounds_type: BoundsType::Stretch,
        ..Transform::default()
    };
    assert!(compute_placement(&empty_bounds, Size::new(10.0, 10.0), CANVAS).is_degenerate());

    let off_canvas = Transform {
        position: Vec2::new(500.0, 500.0),
        ..Transform::default()
    };
    assert!(compute_placement(&off_canvas, Size::new(10.0, 10.0), CANVAS).is_degenerate());
}

#[test]
fn normalized_enforces_value_invariants() {
    let t = Transform {
        scale: Vec2::new(-1.0, f64::NAN),
        rotation_deg: -30.0,
        bounds: Vec2::new(-5.0, 4.0),
        ..Transform::default()
    }
    .normalized();
    assert_eq!(t.scale, Vec2::new(0.0, 0.0));
    assert_eq!(t.rotation_deg, 330.0);
    assert_eq!(t.bounds, Vec2::new(0.0, 4.0));
}

#[test]
fn patch_merges_only_set_fields() {
    let base = Transform {
        position: Vec2::new(1.0, 2.0),
        rotation_deg: 10.0,
        ..Transform::default()
    };
    let patch = TransformPatch {
        rotation_deg: Some(370.0),
        ..TransformPatch::default()
    };
    let merged = patch.merge(base);
    assert_eq!(merged.position, Vec2::new(1.0, 2.0));
    assert_eq!(merged.rotation_deg, 10.0);
    assert!(TransformPatch::default().is_empty());
    assert!(!patch.is_empty());
}

#[test]
fn corners_follow_affine() {
    let t = Transform {
        position: Vec2::new(10.0, 10.0),
        ..Transform::default()
    };
    let p = compute_placement(&t, Size::new(4.0, 2.0), CANVAS);
    let c = placement_corners(&p);
    assert_eq!(c[0], Point::new(10.0, 10.0));
    assert_eq!(c[2], Point::new(14.0, 12.0));
}
