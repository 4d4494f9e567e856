//! Transition state machine.
//!
//! Each output bus owns at most one running transition. Progress is derived from the shared
//! [`Clock`](crate::foundation::clock::Clock), so it advances with wall-clock time regardless of
//! how often it is sampled. Commits only happen inside [`TransitionEngine::transition_to`] (for
//! instant transitions) and [`TransitionEngine::advance`], which the session calls between
//! composites, so a single composite always sees one consistent set of bus pointers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::events::StudioEvent;
use crate::foundation::clock::SharedClock;
use crate::foundation::ids::SceneId;
use crate::scene::store::SceneGraph;
use crate::transition::descriptor::TransitionDescriptor;

/// Output bus a transition drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bus {
    /// Live output; the scene graph's active pointer.
    Program,
    /// Staged output in Studio Mode.
    Preview,
}

impl Bus {
    fn pointer(self, graph: &SceneGraph) -> Option<SceneId> {
        match self {
            Self::Program => graph.active_scene_id(),
            Self::Preview => graph.preview_scene_id(),
        }
    }

    fn commit(self, graph: &mut SceneGraph, scene: SceneId) -> bool {
        match self {
            Self::Program => graph.set_active_scene(scene),
            Self::Preview => graph.set_preview_scene(scene),
        }
    }
}

/// Transition lifecycle. `Completed` and `Cancelled` are reported through
/// [`TransitionOutcome`]; a bus at rest is always `Idle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionState {
    /// Nothing running.
    Idle,
    /// Animating towards a target.
    Running,
    /// Target committed.
    Completed,
    /// Abandoned without commit.
    Cancelled,
}

/// How a transition ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// Bus the transition ran on.
    pub bus: Bus,
    /// Scene it was heading to.
    pub target: SceneId,
    /// `Completed` or `Cancelled`.
    pub state: TransitionState,
}

/// A transition in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveTransition {
    /// Bus pointer value when the transition started.
    pub from: Option<SceneId>,
    /// Scene committed on completion.
    pub to: SceneId,
    /// Style and duration.
    pub descriptor: TransitionDescriptor,
    started_at: Duration,
}

impl ActiveTransition {
    fn progress_at(&self, now: Duration) -> f64 {
        let total = self.descriptor.duration_ms;
        if total == 0 {
            return 1.0;
        }
        let elapsed_ms = now.saturating_sub(self.started_at).as_secs_f64() * 1000.0;
        (elapsed_ms / total as f64).clamp(0.0, 1.0)
    }

    /// Milliseconds elapsed since start, saturating at the duration.
    pub fn elapsed_ms_at(&self, now: Duration) -> u64 {
        let elapsed = now.saturating_sub(self.started_at).as_millis();
        u64::try_from(elapsed)
            .unwrap_or(u64::MAX)
            .min(self.descriptor.duration_ms)
    }
}

/// Drives scene switches on the program and preview buses.
pub struct TransitionEngine {
    clock: SharedClock,
    program: Option<ActiveTransition>,
    preview: Option<ActiveTransition>,
    events: Vec<StudioEvent>,
}

impl std::fmt::Debug for TransitionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionEngine")
            .field("program", &self.program)
            .field("preview", &self.preview)
            .finish_non_exhaustive()
    }
}

impl TransitionEngine {
    /// Engine reading time from `clock`.
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            program: None,
            preview: None,
            events: Vec::new(),
        }
    }

    fn slot(&self, bus: Bus) -> &Option<ActiveTransition> {
        match bus {
            Bus::Program => &self.program,
            Bus::Preview => &self.preview,
        }
    }

    fn slot_mut(&mut self, bus: Bus) -> &mut Option<ActiveTransition> {
        match bus {
            Bus::Program => &mut self.program,
            Bus::Preview => &mut self.preview,
        }
    }

    /// Start a transition of `bus` to `target`.
    ///
    /// Returns `false` (and changes nothing) when `target` is not a scene or when the same target
    /// is already running on this bus. A running transition to a different target is cancelled
    /// and the new one starts from progress 0. Instant transitions commit before returning.
    #[tracing::instrument(level = "debug", skip(self, graph, descriptor), fields(kind = %descriptor.transition_type()))]
    pub fn transition_to(
        &mut self,
        graph: &mut SceneGraph,
        bus: Bus,
        target: SceneId,
        descriptor: TransitionDescriptor,
    ) -> bool {
        if !graph.contains_scene(target) {
            tracing::debug!("transition rejected: unknown target scene");
            return false;
        }
        if let Some(running) = self.slot(bus) {
            if running.to == target {
                tracing::debug!("transition rejected: already running to this target");
                return false;
            }
            self.cancel(bus);
        }

        let from = bus.pointer(graph);
        let duration_ms = descriptor.effective_duration_ms();
        tracing::info!(?bus, ?from, to = %target, duration_ms, "transition started");
        self.events.push(StudioEvent::TransitionStarted {
            bus,
            from,
            to: target,
            kind: descriptor.transition_type(),
            duration_ms,
        });

        let active = ActiveTransition {
            from,
            to: target,
            descriptor,
            started_at: self.clock.now(),
        };
        if active.descriptor.is_instant() {
            self.finish(graph, bus, active);
        } else {
            *self.slot_mut(bus) = Some(active);
        }
        true
    }

    /// Abandon the running transition on `bus` without committing. No-op when idle.
    pub fn cancel(&mut self, bus: Bus) -> Option<TransitionOutcome> {
        let running = self.slot_mut(bus).take()?;
        tracing::info!(?bus, target = %running.to, "transition cancelled");
        self.events.push(StudioEvent::TransitionCancelled {
            bus,
            target: running.to,
        });
        Some(TransitionOutcome {
            bus,
            target: running.to,
            state: TransitionState::Cancelled,
        })
    }

    /// Commit every transition whose duration has elapsed.
    pub fn advance(&mut self, graph: &mut SceneGraph) -> Vec<TransitionOutcome> {
        let now = self.clock.now();
        let mut outcomes = Vec::new();
        for bus in [Bus::Program, Bus::Preview] {
            let done = self
                .slot(bus)
                .as_ref()
                .is_some_and(|t| t.progress_at(now) >= 1.0);
            if !done {
                continue;
            }
            if let Some(active) = self.slot_mut(bus).take() {
                outcomes.push(self.finish(graph, bus, active));
            }
        }
        outcomes
    }

    fn finish(
        &mut self,
        graph: &mut SceneGraph,
        bus: Bus,
        active: ActiveTransition,
    ) -> TransitionOutcome {
        let target = active.to;
        let state = if bus.commit(graph, target) {
            tracing::info!(?bus, scene = %target, "transition committed");
            self.events
                .push(StudioEvent::TransitionCompleted { bus, scene: target });
            TransitionState::Completed
        } else {
            tracing::warn!(?bus, scene = %target, "transition target vanished before commit");
            self.events
                .push(StudioEvent::TransitionCancelled { bus, target });
            TransitionState::Cancelled
        };
        TransitionOutcome { bus, target, state }
    }

    /// Current state of `bus`: `Running` or `Idle`.
    pub fn state(&self, bus: Bus) -> TransitionState {
        if self.slot(bus).is_some() {
            TransitionState::Running
        } else {
            TransitionState::Idle
        }
    }

    /// `true` while a transition runs on `bus`.
    pub fn is_running(&self, bus: Bus) -> bool {
        self.slot(bus).is_some()
    }

    /// Linear progress in `[0, 1]` of the transition on `bus`; `0.0` when idle.
    pub fn progress(&self, bus: Bus) -> f64 {
        self.slot(bus)
            .as_ref()
            .map_or(0.0, |t| t.progress_at(self.clock.now()))
    }

    /// The transition running on `bus`, if any.
    pub fn running(&self, bus: Bus) -> Option<&ActiveTransition> {
        self.slot(bus).as_ref()
    }

    /// Current clock reading.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Drain pending notifications.
    pub fn take_events(&mut self) -> Vec<StudioEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transition/engine.rs"]
mod tests;
