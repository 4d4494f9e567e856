use std::sync::{Arc, Mutex};

use super::*;

#[test]
fn observers_receive_events_until_unsubscribed() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut obs = Observers::default();
    let sink = Arc::clone(&seen);
    let id = obs.subscribe(move |ev| sink.lock().unwrap().push(ev.clone()));
    assert_eq!(obs.len(), 1);

    let ev = StudioEvent::SceneCreated { scene: SceneId(1) };
    obs.dispatch(std::slice::from_ref(&ev));
    assert!(obs.unsubscribe(id));
    assert!(!obs.unsubscribe(id));
    obs.dispatch(&[StudioEvent::SceneRemoved { scene: SceneId(1) }]);

    assert_eq!(*seen.lock().unwrap(), vec![ev]);
    assert!(obs.is_empty());
}
