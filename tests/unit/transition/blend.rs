use serde_json::json;

use super::*;
use crate::foundation::core::Canvas;
use crate::transition::descriptor::parse_transition;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn canvas() -> Canvas {
    Canvas {
        width: 4,
        height: 2,
    }
}

fn frames() -> (FrameRGBA, FrameRGBA) {
    (
        FrameRGBA::filled(canvas(), Rgba8Premul::from_straight_rgba(255, 0, 0, 255)),
        FrameRGBA::filled(canvas(), Rgba8Premul::from_straight_rgba(0, 0, 255, 255)),
    )
}

fn desc(kind: &str, ms: u64, settings: serde_json::Value) -> TransitionDescriptor {
    parse_transition(kind, ms, &settings).unwrap()
}

#[test]
fn every_kind_starts_at_outgoing_and_ends_at_incoming() {
    let (a, b) = frames();
    let kinds = [
        desc("fade", 100, json!(null)),
        desc("wipe", 100, json!({ "soft_edge": 0.2 })),
        desc("luma_wipe", 100, json!({ "pattern": "diamond" })),
        desc("slide", 100, json!({ "direction": "right" })),
        desc("swipe", 100, json!({ "direction": "down" })),
        desc("swipe", 100, json!({ "swipe_in": false })),
        desc("stinger", 100, json!({ "transition_point_ms": 40 })),
        desc("fade_to_color", 100, json!(null)),
    ];
    for d in &kinds {
        let start = blend_frames(&a, &b, d, 0.0).unwrap();
        assert_eq!(start, a, "{:?} at 0", d.kind);
        let end = blend_frames(&a, &b, d, 1.0).unwrap();
        assert_eq!(end, b, "{:?} at 1", d.kind);
    }
}

#[test]
fn cut_is_always_incoming() {
    let (a, b) = frames();
    assert_eq!(blend_frames(&a, &b, &TransitionDescriptor::cut(), 0.0).unwrap(), b);
}

#[test]
fn slide_moves_both_frames() {
    let (a, b) = frames();
    let d = desc("slide", 100, json!({ "direction": "left" }));
    let mid = blend_frames(&a, &b, &d, 0.5).unwrap();
    assert_eq!(mid.pixel(0, 0), RED);
    assert_eq!(mid.pixel(1, 1), RED);
    assert_eq!(mid.pixel(2, 0), BLUE);
    assert_eq!(mid.pixel(3, 1), BLUE);
}

#[test]
fn stinger_switches_at_transition_point() {
    let (a, b) = frames();
    let d = desc("stinger", 1000, json!({ "transition_point_ms": 300 }));
    assert_eq!(blend_frames(&a, &b, &d, 0.29).unwrap(), a);
    assert_eq!(blend_frames(&a, &b, &d, 0.3).unwrap(), b);
}

#[test]
fn fade_to_color_passes_through_the_color() {
    let (a, b) = frames();
    let d = desc("fade_to_color", 1000, json!({ "color": "#00ff00" }));
    let mid = blend_frames(&a, &b, &d, 0.5).unwrap();
    assert_eq!(mid.pixel(0, 0), [0, 255, 0, 255]);
}

#[test]
fn ease_shapes_visual_progress() {
    let (a, b) = frames();
    let linear = desc("fade", 100, json!(null));
    let eased = desc("fade", 100, json!({ "ease": "in_cubic" }));
    let l = blend_frames(&a, &b, &linear, 0.5).unwrap().pixel(0, 0);
    let e = blend_frames(&a, &b, &eased, 0.5).unwrap().pixel(0, 0);
    assert!(e[0] > l[0]);
}

#[test]
fn size_mismatch_is_an_error() {
    let (a, _) = frames();
    let small = FrameRGBA::transparent(Canvas {
        width: 1,
        height: 1,
    });
    assert!(blend_frames(&a, &small, &TransitionDescriptor::fade(10), 0.5).is_err());
}
