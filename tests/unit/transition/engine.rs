use std::sync::Arc;

use super::*;
use crate::foundation::clock::ManualClock;

fn setup() -> (Arc<ManualClock>, TransitionEngine, SceneGraph, [SceneId; 3]) {
    let clock = ManualClock::shared();
    let engine = TransitionEngine::new(clock.clone());
    let mut graph = SceneGraph::new();
    let a = graph.create_scene("A");
    let b = graph.create_scene("B");
    let c = graph.create_scene("C");
    graph.set_active_scene(a);
    graph.take_events();
    (clock, engine, graph, [a, b, c])
}

#[test]
fn unknown_target_is_rejected_and_engine_stays_idle() {
    let (_, mut engine, mut graph, [a, ..]) = setup();
    assert!(!engine.transition_to(
        &mut graph,
        Bus::Program,
        SceneId(404),
        TransitionDescriptor::fade(100)
    ));
    assert_eq!(engine.state(Bus::Program), TransitionState::Idle);
    assert_eq!(graph.active_scene_id(), Some(a));
    assert!(engine.take_events().is_empty());
}

#[test]
fn cut_commits_inside_the_request() {
    let (_, mut engine, mut graph, [_, b, _]) = setup();
    assert!(engine.transition_to(&mut graph, Bus::Program, b, TransitionDescriptor::cut()));
    assert_eq!(graph.active_scene_id(), Some(b));
    assert!(!engine.is_running(Bus::Program));
    assert_eq!(engine.progress(Bus::Program), 0.0);
    let events = engine.take_events();
    assert!(matches!(events[0], StudioEvent::TransitionStarted { .. }));
    assert_eq!(
        events[1],
        StudioEvent::TransitionCompleted {
            bus: Bus::Program,
            scene: b
        }
    );
}

#[test]
fn cut_with_a_stray_duration_still_commits_inside_the_request() {
    let (clock, mut engine, mut graph, [_, b, _]) = setup();
    let mut cut = TransitionDescriptor::cut();
    cut.duration_ms = 500;
    assert!(cut.is_instant());

    assert!(engine.transition_to(&mut graph, Bus::Program, b, cut));
    assert_eq!(graph.active_scene_id(), Some(b));
    assert_eq!(engine.state(Bus::Program), TransitionState::Idle);
    assert!(matches!(
        engine.take_events()[0],
        StudioEvent::TransitionStarted { duration_ms: 0, .. }
    ));

    clock.advance_ms(100);
    assert!(engine.advance(&mut graph).is_empty());
    assert_eq!(graph.active_scene_id(), Some(b));
}

#[test]
fn progress_is_monotonic_and_commit_waits_for_duration() {
    let (clock, mut engine, mut graph, [a, b, _]) = setup();
    assert!(engine.transition_to(&mut graph, Bus::Program, b, TransitionDescriptor::fade(500)));

    let mut last = 0.0;
    for _ in 0..9 {
        clock.advance_ms(50);
        let p = engine.progress(Bus::Program);
        assert!(p >= last);
        assert!(p < 1.0);
        last = p;
        assert!(engine.advance(&mut graph).is_empty());
        assert_eq!(graph.active_scene_id(), Some(a));
    }

    clock.advance_ms(50);
    assert_eq!(engine.progress(Bus::Program), 1.0);
    let outcomes = engine.advance(&mut graph);
    assert_eq!(
        outcomes,
        vec![TransitionOutcome {
            bus: Bus::Program,
            target: b,
            state: TransitionState::Completed
        }]
    );
    assert_eq!(graph.active_scene_id(), Some(b));
    assert_eq!(engine.state(Bus::Program), TransitionState::Idle);
    assert_eq!(engine.progress(Bus::Program), 0.0);
}

#[test]
fn same_target_while_running_is_rejected() {
    let (clock, mut engine, mut graph, [_, b, _]) = setup();
    assert!(engine.transition_to(&mut graph, Bus::Program, b, TransitionDescriptor::fade(500)));
    clock.advance_ms(200);
    assert!(!engine.transition_to(&mut graph, Bus::Program, b, TransitionDescriptor::fade(500)));
    assert!((engine.progress(Bus::Program) - 0.4).abs() < 1e-9);
}

#[test]
fn retargeting_cancels_and_restarts_from_zero() {
    let (clock, mut engine, mut graph, [a, b, c]) = setup();
    assert!(engine.transition_to(&mut graph, Bus::Program, b, TransitionDescriptor::fade(500)));
    clock.advance_ms(300);
    assert!(engine.transition_to(&mut graph, Bus::Program, c, TransitionDescriptor::fade(500)));
    assert_eq!(engine.progress(Bus::Program), 0.0);
    assert_eq!(graph.active_scene_id(), Some(a));
    assert_eq!(engine.running(Bus::Program).map(|t| t.to), Some(c));

    for _ in 0..10 {
        clock.advance_ms(50);
        engine.advance(&mut graph);
        assert_ne!(graph.active_scene_id(), Some(b));
    }
    assert_eq!(graph.active_scene_id(), Some(c));
    assert!(
        engine
            .take_events()
            .contains(&StudioEvent::TransitionCancelled {
                bus: Bus::Program,
                target: b
            })
    );
}

#[test]
fn buses_run_independently() {
    let (clock, mut engine, mut graph, [a, b, c]) = setup();
    assert!(engine.transition_to(&mut graph, Bus::Program, b, TransitionDescriptor::fade(100)));
    assert!(engine.transition_to(&mut graph, Bus::Preview, c, TransitionDescriptor::fade(300)));
    assert_eq!(engine.running(Bus::Program).and_then(|t| t.from), Some(a));

    clock.advance_ms(100);
    let outcomes = engine.advance(&mut graph);
    assert_eq!(outcomes.len(), 1);
    assert_eq!(graph.active_scene_id(), Some(b));
    assert!(engine.is_running(Bus::Preview));

    clock.advance_ms(200);
    engine.advance(&mut graph);
    assert_eq!(graph.preview_scene_id(), Some(c));
}

#[test]
fn vanished_target_cancels_at_commit_time() {
    let (clock, mut engine, mut graph, [a, b, _]) = setup();
    assert!(engine.transition_to(&mut graph, Bus::Program, b, TransitionDescriptor::fade(100)));
    graph.delete_scene(b);
    clock.advance_ms(150);
    let outcomes = engine.advance(&mut graph);
    assert_eq!(outcomes[0].state, TransitionState::Cancelled);
    assert_eq!(graph.active_scene_id(), Some(a));
}

#[test]
fn explicit_cancel_keeps_pointer() {
    let (clock, mut engine, mut graph, [a, b, _]) = setup();
    assert!(engine.cancel(Bus::Program).is_none());
    engine.transition_to(&mut graph, Bus::Program, b, TransitionDescriptor::fade(100));
    clock.advance_ms(50);
    let outcome = engine.cancel(Bus::Program).unwrap();
    assert_eq!(outcome.state, TransitionState::Cancelled);
    clock.advance_ms(100);
    assert!(engine.advance(&mut graph).is_empty());
    assert_eq!(graph.active_scene_id(), Some(a));
}
