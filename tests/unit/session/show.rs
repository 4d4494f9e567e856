use super::*;
use crate::foundation::clock::ManualClock;
use crate::transition::descriptor::TransitionType;

const SHOW: &str = r#"{
    "config": { "canvas": { "width": 8, "height": 8 }, "target_fps": 30 },
    "sources": [
        { "name": "cam", "settings": { "type": "color", "rgba": [0, 0, 255, 255], "width": 8, "height": 8 } },
        { "name": "logo", "settings": { "type": "color", "rgba": [255, 255, 255, 255], "width": 2, "height": 2 },
          "filters": [ { "name": "dim", "kind": { "type": "opacity", "value": 0.5 } } ],
          "volume": 0.25 }
    ],
    "scenes": [
        { "name": "Intro", "items": [
            { "source": "cam" },
            { "source": "logo", "transform": { "position": { "x": 1.0, "y": 1.0 } }, "visible": false }
        ] },
        { "name": "Outro", "items": [ { "source": "cam", "locked": true } ], "locked": true }
    ],
    "active": "Outro",
    "studio": { "preview": "Intro", "transition": { "type": "cut", "duration_ms": 0 } }
}"#;

#[test]
fn builds_sources_scenes_and_studio_mode() {
    let show = ShowFile::from_json(SHOW).unwrap();
    let studio = show.build(ManualClock::shared()).unwrap();

    let logo = studio.sources().find_by_name("logo").unwrap();
    let logo_src = studio.sources().get(logo).unwrap();
    assert_eq!(logo_src.filters.len(), 1);
    assert_eq!(logo_src.volume, 0.25);

    let graph = studio.graph();
    let intro = graph.scene_by_name("Intro").unwrap();
    assert_eq!(intro.items().len(), 2);
    assert!(!intro.items()[1].visible);
    assert_eq!(intro.items()[1].transform.position.x, 1.0);

    let outro = graph.scene_by_name("Outro").unwrap();
    assert!(outro.locked);
    assert!(outro.items()[0].locked);

    let state = studio.studio_state();
    assert!(state.enabled);
    assert_eq!(state.program_scene, Some(outro.id));
    assert_eq!(state.preview_scene, Some(intro.id));
    assert_eq!(state.transition.transition_type(), TransitionType::Cut);
}

#[test]
fn active_defaults_to_first_scene() {
    let show = ShowFile::from_json(
        r#"{ "scenes": [ { "name": "One" }, { "name": "Two" } ] }"#,
    )
    .unwrap();
    let studio = show.build(ManualClock::shared()).unwrap();
    let one = studio.graph().scene_by_name("One").unwrap().id;
    assert_eq!(studio.graph().active_scene_id(), Some(one));
    assert!(!studio.studio_state().enabled);
}

#[test]
fn empty_show_builds_an_empty_studio() {
    let studio = ShowFile::from_json("{}")
        .unwrap()
        .build(ManualClock::shared())
        .unwrap();
    assert!(studio.graph().scenes().is_empty());
    assert_eq!(studio.graph().active_scene_id(), None);
}

#[test]
fn unknown_names_and_duplicates_are_validation_errors() {
    let cases = [
        r#"{ "scenes": [ { "name": "A", "items": [ { "source": "ghost" } ] } ] }"#,
        r#"{ "scenes": [ { "name": "A" } ], "active": "B" }"#,
        r#"{ "scenes": [ { "name": "A" }, { "name": "A" } ] }"#,
        r#"{ "sources": [
              { "name": "x", "settings": { "type": "color", "rgba": [0,0,0,255], "width": 1, "height": 1 } },
              { "name": "x", "settings": { "type": "color", "rgba": [0,0,0,255], "width": 1, "height": 1 } } ] }"#,
        r#"{ "scenes": [ { "name": "A" } ], "studio": { "preview": "Z" } }"#,
        r#"{ "studio": {} }"#,
    ];
    for text in cases {
        let err = ShowFile::from_json(text)
            .unwrap()
            .build(ManualClock::shared())
            .unwrap_err();
        assert!(
            matches!(err, StudioError::Validation(_)),
            "{text}: unexpected {err}"
        );
    }
}

#[test]
fn invalid_filters_fail_the_build() {
    let text = r#"{ "sources": [
        { "name": "x", "settings": { "type": "color", "rgba": [0,0,0,255], "width": 1, "height": 1 },
          "filters": [ { "name": "bad", "kind": { "type": "opacity", "value": 2.0 } } ] } ] }"#;
    let show = ShowFile::from_json(text).unwrap();
    assert!(show.build(ManualClock::shared()).is_err());
}

#[test]
fn oversized_source_dimensions_fail_the_build() {
    let cases = [
        r#"{ "sources": [ { "name": "x", "settings":
              { "type": "color", "rgba": [0,0,0,255], "width": 4294967295, "height": 4294967295 } } ] }"#,
        r#"{ "sources": [ { "name": "x", "settings":
              { "type": "browser", "url": "about:blank", "width": 100000, "height": 720 } } ] }"#,
    ];
    for text in cases {
        let err = ShowFile::from_json(text)
            .unwrap()
            .build(ManualClock::shared())
            .unwrap_err();
        assert!(matches!(err, StudioError::Validation(_)), "{text}: unexpected {err}");
    }
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(ShowFile::from_json(r#"{ "scenez": [] }"#).is_err());
}

#[test]
fn relative_media_paths_resolve_against_the_show_directory() {
    let mut show = ShowFile::from_json(
        r#"{ "sources": [
            { "name": "clip", "settings": { "type": "media", "path": "clips/a.mp4" } },
            { "name": "abs", "settings": { "type": "media", "path": "/srv/b.mp4" } },
            { "name": "bg", "settings": { "type": "color", "rgba": [0,0,0,255], "width": 1, "height": 1 } }
        ] }"#,
    )
    .unwrap();
    show.resolve_paths(Path::new("/shows/tonight"));

    let path_of = |i: usize| match &show.sources[i].settings {
        SourceSettings::Media { path, .. } => path.clone(),
        other => panic!("unexpected settings {other:?}"),
    };
    assert_eq!(path_of(0), Path::new("/shows/tonight/clips/a.mp4"));
    assert_eq!(path_of(1), Path::new("/srv/b.mp4"));
}
