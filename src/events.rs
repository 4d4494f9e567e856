//! Change notifications.
//!
//! Components record what changed into an outbox; the [`crate::Studio`] session drains those
//! outboxes after every command and tick and hands each event to the registered observers.

use crate::foundation::ids::{SceneId, SceneItemId, SubscriptionId};
use crate::transition::descriptor::TransitionType;
use crate::transition::engine::Bus;

/// Something observable changed.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum StudioEvent {
    SceneCreated {
        scene: SceneId,
    },
    SceneRemoved {
        scene: SceneId,
    },
    SceneRenamed {
        scene: SceneId,
        name: String,
    },
    SceneDuplicated {
        original: SceneId,
        copy: SceneId,
    },
    /// Item list of a scene changed (add, remove, reorder, visibility, lock, grouping).
    SceneItemsChanged {
        scene: SceneId,
    },
    ItemTransformChanged {
        scene: SceneId,
        item: SceneItemId,
    },
    /// The active (program) pointer moved.
    ActiveSceneChanged {
        previous: Option<SceneId>,
        current: Option<SceneId>,
    },
    PreviewSceneChanged {
        previous: Option<SceneId>,
        current: Option<SceneId>,
    },
    CollectionChanged {
        name: String,
    },
    TransitionStarted {
        bus: Bus,
        from: Option<SceneId>,
        to: SceneId,
        kind: TransitionType,
        duration_ms: u64,
    },
    TransitionCompleted {
        bus: Bus,
        scene: SceneId,
    },
    TransitionCancelled {
        bus: Bus,
        target: SceneId,
    },
    StudioModeChanged {
        enabled: bool,
    },
}

type Callback = Box<dyn FnMut(&StudioEvent) + Send>;

/// Registered observer callbacks.
#[derive(Default)]
pub struct Observers {
    next: u64,
    callbacks: Vec<(SubscriptionId, Callback)>,
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.callbacks.len())
            .finish()
    }
}

impl Observers {
    /// Register a callback. It is invoked for every event, in registration order.
    pub fn subscribe(&mut self, f: impl FnMut(&StudioEvent) + Send + 'static) -> SubscriptionId {
        self.next += 1;
        let id = SubscriptionId(self.next);
        self.callbacks.push((id, Box::new(f)));
        id
    }

    /// Remove a callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sid, _)| *sid != id);
        self.callbacks.len() != before
    }

    /// Deliver events to every callback.
    pub fn dispatch(&mut self, events: &[StudioEvent]) {
        for ev in events {
            for (_, cb) in &mut self.callbacks {
                cb(ev);
            }
        }
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// `true` when nobody listens.
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

#[cfg(test)]
#[path = "../tests/unit/events.rs"]
mod tests;
