use super::*;
use crate::sources::registry::SourceSettings;
use crate::foundation::core::Vec2;

fn setup() -> (SceneGraph, SourceRegistry, SourceId, SourceId) {
    let mut reg = SourceRegistry::new();
    let cam = reg.add("cam", SourceSettings::color([0, 0, 255, 255], 4, 4));
    let logo = reg.add("logo", SourceSettings::color([255, 255, 255, 255], 2, 2));
    (SceneGraph::new(), reg, cam, logo)
}

#[test]
fn deleting_active_scene_falls_back_to_first_remaining() {
    let (mut g, _, _, _) = setup();
    let a = g.create_scene("A");
    let b = g.create_scene("B");
    let c = g.create_scene("C");
    assert!(g.set_active_scene(c));
    assert!(g.delete_scene(c));
    assert_eq!(g.active_scene_id(), Some(a));

    assert!(g.delete_scene(a));
    assert_eq!(g.active_scene_id(), Some(b));
    assert!(g.delete_scene(b));
    assert_eq!(g.active_scene_id(), None);
    assert!(g.active_scene().is_none());
    assert!(!g.delete_scene(b));
}

#[test]
fn unknown_ids_are_ignored() {
    let (mut g, reg, cam, _) = setup();
    let a = g.create_scene("A");
    let ghost = SceneId(999);
    assert!(!g.set_active_scene(ghost));
    assert!(!g.rename_scene(ghost, "x"));
    assert!(g.duplicate_scene(ghost).is_none());
    assert!(g.add_source(&reg, ghost, cam).is_none());
    assert!(!g.remove_item(a, SceneItemId(999)));
    assert_eq!(g.active_scene_id(), None);
}

#[test]
fn add_source_rejects_unknown_source() {
    let (mut g, mut reg, cam, _) = setup();
    let a = g.create_scene("A");
    reg.remove(cam);
    assert!(g.add_source(&reg, a, cam).is_none());
    assert!(g.scene(a).unwrap().items().is_empty());
}

#[test]
fn items_are_appended_on_top_with_dense_order() {
    let (mut g, reg, cam, logo) = setup();
    let a = g.create_scene("A");
    let i1 = g.add_source(&reg, a, cam).unwrap();
    let i2 = g.add_source(&reg, a, logo).unwrap();
    let i3 = g.add_source(&reg, a, cam).unwrap();
    let s = g.scene(a).unwrap();
    assert_eq!(s.order_sequence(), vec![i1, i2, i3]);
    let orders: Vec<u32> = s.items().iter().map(|i| i.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);

    assert!(g.remove_item(a, i2));
    let orders: Vec<u32> = g.scene(a).unwrap().items().iter().map(|i| i.order).collect();
    assert_eq!(orders, vec![0, 1]);
}

#[test]
fn reorder_clamps_and_is_idempotent() {
    let (mut g, reg, cam, logo) = setup();
    let a = g.create_scene("A");
    let i1 = g.add_source(&reg, a, cam).unwrap();
    let i2 = g.add_source(&reg, a, logo).unwrap();
    let i3 = g.add_source(&reg, a, cam).unwrap();

    assert!(g.reorder_item(a, i1, 99));
    let once = g.scene(a).unwrap().order_sequence();
    assert_eq!(once, vec![i2, i3, i1]);

    assert!(g.reorder_item(a, i1, 99));
    assert_eq!(g.scene(a).unwrap().order_sequence(), once);

    assert!(g.reorder_item(a, i1, 0));
    assert_eq!(g.scene(a).unwrap().order_sequence(), vec![i1, i2, i3]);
}

#[test]
fn move_item_steps_through_ranks() {
    let (mut g, reg, cam, logo) = setup();
    let a = g.create_scene("A");
    let i1 = g.add_source(&reg, a, cam).unwrap();
    let i2 = g.add_source(&reg, a, logo).unwrap();

    assert!(g.move_item(a, i1, ItemMove::Up));
    assert_eq!(g.scene(a).unwrap().order_sequence(), vec![i2, i1]);
    assert!(g.move_item(a, i1, ItemMove::Up));
    assert_eq!(g.scene(a).unwrap().order_sequence(), vec![i2, i1]);
    assert!(g.move_item(a, i1, ItemMove::Bottom));
    assert_eq!(g.scene(a).unwrap().order_sequence(), vec![i1, i2]);
    assert!(g.move_item(a, i2, ItemMove::Down));
    assert_eq!(g.scene(a).unwrap().order_sequence(), vec![i2, i1]);
    assert!(g.move_item(a, i2, ItemMove::Top));
    assert_eq!(g.scene(a).unwrap().order_sequence(), vec![i1, i2]);
}

#[test]
fn duplicate_is_deep_and_independent() {
    let (mut g, reg, cam, logo) = setup();
    let a = g.create_scene("Intro");
    let i1 = g.add_source(&reg, a, cam).unwrap();
    g.add_source(&reg, a, logo).unwrap();

    let copy = g.duplicate_scene(a).unwrap();
    assert_eq!(g.scene(copy).unwrap().name, "Intro (Copy)");
    let copy_items = g.scene(copy).unwrap().order_sequence();
    assert_eq!(copy_items.len(), 2);
    assert!(!copy_items.contains(&i1));

    let patch = TransformPatch {
        position: Some(Vec2::new(100.0, 0.0)),
        ..TransformPatch::default()
    };
    assert!(g.update_item_transform(copy, copy_items[0], &patch));
    assert_eq!(g.scene(a).unwrap().item(i1).unwrap().transform.position, Vec2::ZERO);
    assert_eq!(
        g.scene(copy).unwrap().item(copy_items[0]).unwrap().source,
        cam
    );

    let second = g.duplicate_scene(a).unwrap();
    assert_eq!(g.scene(second).unwrap().name, "Intro (Copy 2)");
}

#[test]
fn locked_scene_rejects_structure_changes() {
    let (mut g, reg, cam, _) = setup();
    let a = g.create_scene("A");
    let i1 = g.add_source(&reg, a, cam).unwrap();
    assert!(g.set_scene_locked(a, true));
    assert!(g.add_source(&reg, a, cam).is_none());
    assert!(!g.remove_item(a, i1));
    assert!(!g.reorder_item(a, i1, 0));
    assert!(g.set_scene_locked(a, false));
    assert!(g.remove_item(a, i1));
}

#[test]
fn locked_item_rejects_transform_updates() {
    let (mut g, reg, cam, _) = setup();
    let a = g.create_scene("A");
    let i1 = g.add_source(&reg, a, cam).unwrap();
    assert!(g.set_item_locked(a, i1, true));
    let patch = TransformPatch {
        rotation_deg: Some(45.0),
        ..TransformPatch::default()
    };
    assert!(!g.update_item_transform(a, i1, &patch));
    assert!(g.set_item_locked(a, i1, false));
    assert!(g.update_item_transform(a, i1, &patch));
    assert_eq!(g.scene(a).unwrap().item(i1).unwrap().transform.rotation_deg, 45.0);
}

#[test]
fn transform_patch_is_normalized() {
    let (mut g, reg, cam, _) = setup();
    let a = g.create_scene("A");
    let i1 = g.add_source(&reg, a, cam).unwrap();
    let patch = TransformPatch {
        rotation_deg: Some(-90.0),
        scale: Some(Vec2::new(-2.0, 3.0)),
        ..TransformPatch::default()
    };
    assert!(g.update_item_transform(a, i1, &patch));
    let t = g.scene(a).unwrap().item(i1).unwrap().transform;
    assert_eq!(t.rotation_deg, 270.0);
    assert_eq!(t.scale, Vec2::new(0.0, 3.0));
}

#[test]
fn groups_can_be_formed_hidden_and_dissolved() {
    let (mut g, reg, cam, logo) = setup();
    let a = g.create_scene("A");
    let i1 = g.add_source(&reg, a, cam).unwrap();
    let i2 = g.add_source(&reg, a, logo).unwrap();

    let group = g.group_items(a, &[i1, i2, SceneItemId(77)]).unwrap();
    assert!(g.set_group_visible(a, group, false));
    assert!(g.scene(a).unwrap().visible_items().is_empty());
    assert!(g.ungroup(a, group));
    assert!(!g.ungroup(a, group));
    assert!(g.scene(a).unwrap().items().iter().all(|i| i.group.is_none()));
    assert!(g.group_items(a, &[SceneItemId(77)]).is_none());
}

#[test]
fn purge_drops_items_with_stale_sources() {
    let (mut g, mut reg, cam, logo) = setup();
    let a = g.create_scene("A");
    g.add_source(&reg, a, cam).unwrap();
    let keep = g.add_source(&reg, a, logo).unwrap();
    reg.remove(cam);
    assert_eq!(g.purge_stale_items(&reg), 1);
    assert_eq!(g.scene(a).unwrap().order_sequence(), vec![keep]);
    assert_eq!(g.scene(a).unwrap().item(keep).unwrap().order, 0);
    assert_eq!(g.item_for_source(a, logo), Some(keep));
    assert_eq!(g.item_for_source(a, cam), None);
}

#[test]
fn events_record_mutations_in_order() {
    let (mut g, _, _, _) = setup();
    let a = g.create_scene("A");
    g.set_active_scene(a);
    g.rename_scene(a, "Main");
    let events = g.take_events();
    assert_eq!(
        events,
        vec![
            StudioEvent::SceneCreated { scene: a },
            StudioEvent::ActiveSceneChanged {
                previous: None,
                current: Some(a)
            },
            StudioEvent::SceneRenamed {
                scene: a,
                name: "Main".into()
            },
        ]
    );
    assert!(g.take_events().is_empty());
    assert_eq!(g.scene_by_name("Main").map(|s| s.id), Some(a));
}

#[test]
fn collections_switch_working_sets() {
    let (mut g, reg, cam, _) = setup();
    let a = g.create_scene("A");
    g.add_source(&reg, a, cam).unwrap();
    g.set_active_scene(a);
    assert_eq!(g.current_collection(), DEFAULT_COLLECTION);

    assert!(g.create_collection("Show 2"));
    assert!(!g.create_collection("Show 2"));
    assert!(g.scenes().is_empty());
    assert_eq!(g.active_scene_id(), None);
    let b = g.create_scene("B");
    assert_ne!(a, b);

    assert!(g.load_collection(DEFAULT_COLLECTION));
    assert_eq!(g.active_scene_id(), Some(a));
    assert_eq!(g.scenes().len(), 1);
    assert_eq!(
        g.collection_names(),
        vec!["Show 2".to_owned(), DEFAULT_COLLECTION.to_owned()]
    );

    assert!(!g.delete_collection(DEFAULT_COLLECTION));
    assert!(g.delete_collection("Show 2"));
    assert!(!g.load_collection("Show 2"));
}

#[test]
fn imported_collections_do_not_collide_with_new_ids() {
    let (mut g, _, _, _) = setup();
    let mut donor = SceneGraph::new();
    for n in 0..5 {
        donor.create_scene(format!("S{n}"));
    }
    let mut snapshot = donor.collection_snapshot();
    snapshot.name = "Imported".into();
    assert!(g.import_collection(snapshot));
    let fresh = g.create_scene("fresh");
    assert!(fresh.0 > 5);
    assert!(g.load_collection("Imported"));
    assert_eq!(g.scenes().len(), 5);
}
