//! Studio Mode: a staged preview bus in front of the live program bus.
//!
//! The controller owns only mode flags and the default transition. The bus pointers live in the
//! [`SceneGraph`] (program is the active pointer) and animated switches go through the
//! [`TransitionEngine`], so the session passes both in on every call.

use serde::Serialize;

use crate::events::StudioEvent;
use crate::foundation::error::{StudioError, StudioResult};
use crate::foundation::ids::SceneId;
use crate::scene::store::SceneGraph;
use crate::transition::descriptor::TransitionDescriptor;
use crate::transition::engine::{Bus, TransitionEngine};

/// UI-facing snapshot of the studio buses.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StudioState {
    /// Studio Mode toggle.
    pub enabled: bool,
    /// Staged scene; always `None` while disabled.
    pub preview_scene: Option<SceneId>,
    /// Live scene (the active scene when Studio Mode is off).
    pub program_scene: Option<SceneId>,
    /// A program transition is running.
    pub in_transition: bool,
    /// Linear progress of the program transition, `0.0` when idle.
    pub transition_progress: f64,
    /// Transition `take` uses.
    pub transition: TransitionDescriptor,
    /// Layout preference for hosts; has no effect on composition.
    pub vertical_layout: bool,
}

/// Studio Mode controller.
#[derive(Clone, Debug)]
pub struct StudioMode {
    enabled: bool,
    default_transition: TransitionDescriptor,
    vertical_layout: bool,
    events: Vec<StudioEvent>,
}

impl Default for StudioMode {
    fn default() -> Self {
        Self::new(TransitionDescriptor::default(), false)
    }
}

impl StudioMode {
    /// Disabled controller.
    pub fn new(default_transition: TransitionDescriptor, vertical_layout: bool) -> Self {
        Self {
            enabled: false,
            default_transition,
            vertical_layout,
            events: Vec::new(),
        }
    }

    /// `true` while Studio Mode is on.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn Studio Mode on with `program` live and `preview` staged.
    ///
    /// `preview` defaults to `program`. Returns `false` without changing anything when either
    /// scene does not exist. Calling it while enabled re-points both buses. Transitions running
    /// on either bus are cancelled so they cannot commit over the chosen scenes.
    pub fn enable(
        &mut self,
        graph: &mut SceneGraph,
        engine: &mut TransitionEngine,
        program: SceneId,
        preview: Option<SceneId>,
    ) -> bool {
        let preview = preview.unwrap_or(program);
        if !graph.contains_scene(program) || !graph.contains_scene(preview) {
            tracing::debug!(%program, %preview, "studio enable ignored: unknown scene");
            return false;
        }
        engine.cancel(Bus::Program);
        engine.cancel(Bus::Preview);
        graph.set_active_scene(program);
        graph.set_preview_scene(preview);
        if !self.enabled {
            self.enabled = true;
            tracing::info!(%program, %preview, "studio mode enabled");
            self.events
                .push(StudioEvent::StudioModeChanged { enabled: true });
        }
        true
    }

    /// Turn Studio Mode off. The program scene stays live; the preview bus is cleared and any
    /// preview transition is cancelled. No-op when already disabled.
    pub fn disable(&mut self, graph: &mut SceneGraph, engine: &mut TransitionEngine) {
        if !self.enabled {
            return;
        }
        engine.cancel(Bus::Preview);
        graph.clear_preview();
        self.enabled = false;
        tracing::info!("studio mode disabled");
        self.events
            .push(StudioEvent::StudioModeChanged { enabled: false });
    }

    fn require_enabled(&self, op: &str) -> StudioResult<()> {
        if self.enabled {
            Ok(())
        } else {
            Err(StudioError::illegal_mode(format!(
                "{op} requires studio mode to be enabled"
            )))
        }
    }

    /// Stage `scene` on the preview bus immediately.
    ///
    /// Fails with [`StudioError::IllegalMode`] while disabled. Unknown scenes are a logged
    /// no-op (`Ok(false)`).
    pub fn set_preview(
        &mut self,
        graph: &mut SceneGraph,
        engine: &mut TransitionEngine,
        scene: SceneId,
    ) -> StudioResult<bool> {
        self.require_enabled("set_preview")?;
        if !graph.contains_scene(scene) {
            tracing::debug!(%scene, "set_preview ignored: unknown scene");
            return Ok(false);
        }
        engine.cancel(Bus::Preview);
        Ok(graph.set_preview_scene(scene))
    }

    /// Transition program to the current preview scene with the default transition.
    ///
    /// Preview keeps its value. Returns `Ok(false)` when there is nothing staged or the engine
    /// rejected the request (e.g. the same take is already running).
    pub fn take(
        &mut self,
        graph: &mut SceneGraph,
        engine: &mut TransitionEngine,
    ) -> StudioResult<bool> {
        let descriptor = self.default_transition.clone();
        self.take_with(graph, engine, descriptor)
    }

    /// [`take`](Self::take) with an explicit transition.
    pub fn take_with(
        &mut self,
        graph: &mut SceneGraph,
        engine: &mut TransitionEngine,
        descriptor: TransitionDescriptor,
    ) -> StudioResult<bool> {
        self.require_enabled("take")?;
        let Some(target) = graph.preview_scene_id() else {
            tracing::debug!("take ignored: no preview scene");
            return Ok(false);
        };
        Ok(engine.transition_to(graph, Bus::Program, target, descriptor))
    }

    /// Exchange preview and program instantly, without a transition.
    ///
    /// A running program transition is cancelled first. Returns `Ok(false)` when either bus is
    /// empty.
    pub fn swap(
        &mut self,
        graph: &mut SceneGraph,
        engine: &mut TransitionEngine,
    ) -> StudioResult<bool> {
        self.require_enabled("swap")?;
        let (Some(program), Some(preview)) = (graph.active_scene_id(), graph.preview_scene_id())
        else {
            tracing::debug!("swap ignored: a bus is empty");
            return Ok(false);
        };
        engine.cancel(Bus::Program);
        engine.cancel(Bus::Preview);
        graph.set_active_scene(preview);
        graph.set_preview_scene(program);
        tracing::info!(program = %preview, preview = %program, "studio buses swapped");
        Ok(true)
    }

    /// Transition used by [`take`](Self::take).
    pub fn default_transition(&self) -> &TransitionDescriptor {
        &self.default_transition
    }

    /// Replace the transition used by [`take`](Self::take).
    pub fn set_default_transition(&mut self, descriptor: TransitionDescriptor) {
        tracing::debug!(kind = %descriptor.transition_type(), duration_ms = descriptor.duration_ms, "default transition set");
        self.default_transition = descriptor;
    }

    /// Layout preference for hosts.
    pub fn vertical_layout(&self) -> bool {
        self.vertical_layout
    }

    /// Set the layout preference for hosts.
    pub fn set_vertical_layout(&mut self, vertical: bool) {
        self.vertical_layout = vertical;
    }

    /// Snapshot for UI binding.
    pub fn state(&self, graph: &SceneGraph, engine: &TransitionEngine) -> StudioState {
        StudioState {
            enabled: self.enabled,
            preview_scene: if self.enabled {
                graph.preview_scene_id()
            } else {
                None
            },
            program_scene: graph.active_scene_id(),
            in_transition: engine.is_running(Bus::Program),
            transition_progress: engine.progress(Bus::Program),
            transition: self.default_transition.clone(),
            vertical_layout: self.vertical_layout,
        }
    }

    /// Drain pending notifications.
    pub fn take_events(&mut self) -> Vec<StudioEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/studio/controller.rs"]
mod tests;
