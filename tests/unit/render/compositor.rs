use super::*;
use crate::effects::filters::{Filter, FilterKind};
use crate::foundation::core::Vec2;
use crate::scene::store::SceneGraph;
use crate::sources::content::NoContent;
use crate::sources::registry::{SourceRegistry, SourceSettings};
use crate::transform::affine::Transform;

const CANVAS: Canvas = Canvas {
    width: 8,
    height: 8,
};

struct Fixture {
    graph: SceneGraph,
    reg: SourceRegistry,
    scene: SceneId,
    cam: SceneItemId,
    logo: SceneItemId,
}

// "Intro": cam fills the canvas (blue), logo is a 2x2 white block at (1,1).
fn intro() -> Fixture {
    let mut reg = SourceRegistry::new();
    let cam_src = reg.add("cam", SourceSettings::color([0, 0, 255, 255], 8, 8));
    let logo_src = reg.add("logo", SourceSettings::color([255, 255, 255, 255], 2, 2));
    let mut graph = SceneGraph::new();
    let scene = graph.create_scene("Intro");
    let cam = graph.add_source(&reg, scene, cam_src).unwrap();
    let logo = graph
        .add_source_with(
            &reg,
            scene,
            logo_src,
            Transform {
                position: Vec2::new(1.0, 1.0),
                ..Transform::default()
            },
        )
        .unwrap();
    Fixture {
        graph,
        reg,
        scene,
        cam,
        logo,
    }
}

#[test]
fn hidden_items_are_skipped_and_order_is_back_to_front() {
    let mut f = intro();
    f.graph.set_item_visible(f.scene, f.logo, false);
    let c = Compositor::default();

    let out = c.composite(f.graph.scene(f.scene).unwrap(), CANVAS, &f.reg);
    assert_eq!(out.paint_order(), vec![f.cam]);
    assert_eq!(out.frame.pixel(1, 1), [0, 0, 255, 255]);

    f.graph.set_item_visible(f.scene, f.logo, true);
    let out = c.composite(f.graph.scene(f.scene).unwrap(), CANVAS, &f.reg);
    assert_eq!(out.paint_order(), vec![f.cam, f.logo]);
    assert_eq!(out.frame.pixel(1, 1), [255, 255, 255, 255]);
    assert_eq!(out.frame.pixel(0, 0), [0, 0, 255, 255]);
    assert_eq!(out.kind, FrameKind::Scene { scene: f.scene });
}

#[test]
fn reordering_changes_what_is_on_top() {
    let mut f = intro();
    f.graph.reorder_item(f.scene, f.cam, 1);
    let out = Compositor::default().composite(f.graph.scene(f.scene).unwrap(), CANVAS, &f.reg);
    assert_eq!(out.paint_order(), vec![f.logo, f.cam]);
    assert_eq!(out.frame.pixel(1, 1), [0, 0, 255, 255]);
}

#[test]
fn composite_is_deterministic() {
    let f = intro();
    let c = Compositor::default();
    let scene = f.graph.scene(f.scene).unwrap();
    let a = c.composite(scene, CANVAS, &f.reg);
    let b = c.composite(scene, CANVAS, &f.reg);
    assert_eq!(a.frame.digest(), b.frame.digest());
    assert_eq!(a.paint_order(), b.paint_order());
    let rects = |o: &CompositeOutput| o.items.iter().map(|p| p.paint_rect).collect::<Vec<_>>();
    assert_eq!(rects(&a), rects(&b));
}

#[test]
fn empty_scene_is_distinguishable() {
    let mut graph = SceneGraph::new();
    let s = graph.create_scene("Standby");
    let bg = Rgba8Premul::from_straight_rgba(10, 20, 30, 255);

    let out = Compositor::new(bg, true).composite(graph.scene(s).unwrap(), CANVAS, &NoContent);
    assert_eq!(
        out.kind,
        FrameKind::EmptyScene {
            scene: s,
            label: Some("Standby".into())
        }
    );
    assert_eq!(out.frame.pixel(4, 4), bg.to_array());

    let out = Compositor::new(bg, false).composite(graph.scene(s).unwrap(), CANVAS, &NoContent);
    assert_eq!(out.kind, FrameKind::EmptyScene { scene: s, label: None });
}

#[test]
fn unresolved_sources_degrade_per_item() {
    let mut f = intro();
    let cam_src = f.graph.scene(f.scene).unwrap().item(f.cam).unwrap().source;
    f.reg.remove(cam_src);
    let out = Compositor::default().composite(f.graph.scene(f.scene).unwrap(), CANVAS, &f.reg);
    assert_eq!(out.items[0].skipped, Some(SkipReason::Unresolved));
    assert_eq!(out.painted_items(), vec![f.logo]);
    assert_eq!(out.frame.pixel(0, 0), Rgba8Premul::black().to_array());
    assert_eq!(out.frame.pixel(1, 1), [255, 255, 255, 255]);
}

#[test]
fn degenerate_items_are_recorded() {
    let mut f = intro();
    let patch = crate::transform::affine::TransformPatch {
        scale: Some(Vec2::ZERO),
        ..Default::default()
    };
    f.graph.update_item_transform(f.scene, f.logo, &patch);
    let out = Compositor::default().composite(f.graph.scene(f.scene).unwrap(), CANVAS, &f.reg);
    assert_eq!(out.items[1].skipped, Some(SkipReason::Degenerate));
    assert_eq!(out.items[1].pixels, 0);
}

#[test]
fn filters_apply_before_painting() {
    let f = intro();
    let mut reg = f.reg;
    let logo_src = f.graph.scene(f.scene).unwrap().item(f.logo).unwrap().source;
    reg.add_filter(logo_src, Filter::new("invert", FilterKind::Invert));
    let out = Compositor::default().composite(f.graph.scene(f.scene).unwrap(), CANVAS, &reg);
    assert_eq!(out.frame.pixel(1, 1), [0, 0, 0, 255]);
}

#[test]
fn transition_composite_blends_both_scenes() {
    let f = intro();
    let mut graph = f.graph;
    let empty = graph.create_scene("Empty");
    let c = Compositor::default();
    let from = graph.scene(f.scene);
    let to = graph.scene(empty).unwrap();

    let out = c.composite_transition(
        from,
        to,
        &TransitionDescriptor::fade(100),
        0.0,
        CANVAS,
        &f.reg,
    );
    assert_eq!(out.frame.pixel(0, 0), [0, 0, 255, 255]);
    assert_eq!(out.paint_order(), vec![f.cam, f.logo]);
    assert!(matches!(out.kind, FrameKind::Transition { to, .. } if to == empty));

    let out = c.composite_transition(None, to, &TransitionDescriptor::fade(100), 1.0, CANVAS, &f.reg);
    assert_eq!(out.frame.pixel(0, 0), Rgba8Premul::black().to_array());
}
