//! The studio session: one explicit context object owning every engine component.
//!
//! Commands mutate state synchronously and then deliver the resulting [`StudioEvent`]s to the
//! registered observers. [`Studio::tick`] is the only place where transitions commit and frames
//! are produced, so a composite always sees one consistent set of bus pointers.

use std::time::{Duration, Instant};

use crate::config::StudioConfig;
use crate::events::{Observers, StudioEvent};
use crate::foundation::clock::{SharedClock, SystemClock};
use crate::foundation::core::Canvas;
use crate::foundation::error::StudioResult;
use crate::foundation::ids::{GroupId, SceneId, SceneItemId, SourceId, SubscriptionId};
use crate::output::sink::{FrameSink, SinkConfig};
use crate::render::compositor::{CompositeOutput, Compositor, FrameKind};
use crate::render::render_loop::{RenderLoop, RenderStats};
use crate::scene::store::{ItemMove, SceneGraph};
use crate::sources::content::PixelContent;
use crate::sources::registry::{SourceRegistry, SourceSettings};
use crate::studio::controller::{StudioMode, StudioState};
use crate::transform::affine::{Transform, TransformPatch};
use crate::transition::descriptor::TransitionDescriptor;
use crate::transition::engine::{Bus, TransitionEngine};

/// Why a tick painted nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipCause {
    /// No sink attached, or the sink is not ready.
    NoSurface,
    /// No active scene.
    NoScene,
    /// The sink refused the frame.
    SinkError,
}

/// Result of one tick.
#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    /// A frame was composited and handed to the sink.
    Rendered {
        /// Sequence number passed to the sink.
        frame_number: u64,
        /// What the frame shows.
        kind: FrameKind,
    },
    /// The paint step was skipped; the loop keeps going.
    Skipped(SkipCause),
}

/// A running studio.
pub struct Studio {
    config: StudioConfig,
    clock: SharedClock,
    graph: SceneGraph,
    sources: SourceRegistry,
    engine: TransitionEngine,
    studio: StudioMode,
    compositor: Compositor,
    render_loop: RenderLoop,
    sink: Option<Box<dyn FrameSink>>,
    observers: Observers,
    last_output: Option<CompositeOutput>,
    next_frame_number: u64,
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("config", &self.config)
            .field("graph", &self.graph)
            .field("engine", &self.engine)
            .field("studio", &self.studio)
            .field("render_loop", &self.render_loop)
            .field("sink", &self.sink.is_some())
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

impl Studio {
    /// Build a session from a validated config, reading time from `clock`.
    pub fn new(config: StudioConfig, clock: SharedClock) -> StudioResult<Self> {
        config.validate()?;
        let fps = config.fps()?;
        Ok(Self {
            graph: SceneGraph::new(),
            sources: SourceRegistry::new(),
            engine: TransitionEngine::new(clock.clone()),
            studio: StudioMode::new(config.default_transition.clone(), config.vertical_layout),
            compositor: Compositor::new(config.background_premul(), config.empty_scene_label),
            render_loop: RenderLoop::new(fps),
            sink: None,
            observers: Observers::default(),
            last_output: None,
            next_frame_number: 0,
            config,
            clock,
        })
    }

    /// Build a session on the wall clock.
    pub fn with_system_clock(config: StudioConfig) -> StudioResult<Self> {
        Self::new(config, std::sync::Arc::new(SystemClock::new()))
    }

    // ---- accessors -----------------------------------------------------------------------

    /// Active configuration.
    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Output canvas size.
    pub fn canvas(&self) -> Canvas {
        self.config.canvas
    }

    /// Scene graph, read-only.
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Source registry, read-only.
    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    /// Source registry for property edits (volume, filters, settings, ...).
    pub fn sources_mut(&mut self) -> &mut SourceRegistry {
        &mut self.sources
    }

    /// Transition engine, read-only.
    pub fn engine(&self) -> &TransitionEngine {
        &self.engine
    }

    /// Session clock.
    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// The output of the most recent rendered tick.
    pub fn last_output(&self) -> Option<&CompositeOutput> {
        self.last_output.as_ref()
    }

    // ---- observers -----------------------------------------------------------------------

    /// Register a change callback.
    pub fn subscribe(
        &mut self,
        f: impl FnMut(&StudioEvent) + Send + 'static,
    ) -> SubscriptionId {
        self.observers.subscribe(f)
    }

    /// Remove a change callback.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn flush_events(&mut self) {
        let mut events = self.graph.take_events();
        events.extend(self.engine.take_events());
        events.extend(self.studio.take_events());
        if !events.is_empty() {
            self.observers.dispatch(&events);
        }
    }

    fn command<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let out = f(self);
        self.flush_events();
        out
    }

    // ---- sources -------------------------------------------------------------------------

    /// Register a source.
    pub fn add_source(&mut self, name: impl Into<String>, settings: SourceSettings) -> SourceId {
        self.sources.add(name, settings)
    }

    /// Remove a source. Items referencing it stay in their scenes and paint nothing until
    /// [`purge_stale_items`](Self::purge_stale_items) removes them.
    pub fn remove_source(&mut self, id: SourceId) -> bool {
        self.sources.remove(id)
    }

    /// Feed the latest frame of a live source.
    pub fn push_content(&mut self, id: SourceId, content: PixelContent) -> bool {
        self.sources.push_content(id, content)
    }

    /// Drop scene items whose source no longer exists.
    pub fn purge_stale_items(&mut self) -> usize {
        self.command(|s| s.graph.purge_stale_items(&s.sources))
    }

    // ---- scenes --------------------------------------------------------------------------

    /// Run arbitrary scene graph edits, then notify observers.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut SceneGraph, &SourceRegistry) -> R) -> R {
        self.command(|s| f(&mut s.graph, &s.sources))
    }

    /// Create an empty scene.
    pub fn create_scene(&mut self, name: impl Into<String>) -> SceneId {
        self.command(|s| s.graph.create_scene(name))
    }

    /// Delete a scene; bus pointers fall back deterministically.
    pub fn delete_scene(&mut self, id: SceneId) -> bool {
        self.command(|s| s.graph.delete_scene(id))
    }

    /// Rename a scene.
    pub fn rename_scene(&mut self, id: SceneId, name: impl Into<String>) -> bool {
        self.command(|s| s.graph.rename_scene(id, name))
    }

    /// Deep-copy a scene.
    pub fn duplicate_scene(&mut self, id: SceneId) -> Option<SceneId> {
        self.command(|s| s.graph.duplicate_scene(id))
    }

    /// Point the program bus at `id` without a transition.
    pub fn set_active_scene(&mut self, id: SceneId) -> bool {
        self.command(|s| s.graph.set_active_scene(id))
    }

    /// Place a source in a scene with a default transform.
    pub fn add_to_scene(&mut self, scene: SceneId, source: SourceId) -> Option<SceneItemId> {
        self.command(|s| s.graph.add_source(&s.sources, scene, source))
    }

    /// Place a source in a scene.
    pub fn add_to_scene_with(
        &mut self,
        scene: SceneId,
        source: SourceId,
        transform: Transform,
    ) -> Option<SceneItemId> {
        self.command(|s| s.graph.add_source_with(&s.sources, scene, source, transform))
    }

    /// Remove an item from a scene.
    pub fn remove_item(&mut self, scene: SceneId, item: SceneItemId) -> bool {
        self.command(|s| s.graph.remove_item(scene, item))
    }

    /// Move an item to an explicit paint rank.
    pub fn reorder_item(&mut self, scene: SceneId, item: SceneItemId, rank: u32) -> bool {
        self.command(|s| s.graph.reorder_item(scene, item, rank))
    }

    /// Move an item relative to its neighbours.
    pub fn move_item(&mut self, scene: SceneId, item: SceneItemId, mv: ItemMove) -> bool {
        self.command(|s| s.graph.move_item(scene, item, mv))
    }

    /// Merge a partial transform into an item.
    pub fn update_item_transform(
        &mut self,
        scene: SceneId,
        item: SceneItemId,
        patch: &TransformPatch,
    ) -> bool {
        self.command(|s| s.graph.update_item_transform(scene, item, patch))
    }

    /// Show or hide an item.
    pub fn set_item_visible(&mut self, scene: SceneId, item: SceneItemId, visible: bool) -> bool {
        self.command(|s| s.graph.set_item_visible(scene, item, visible))
    }

    /// Lock or unlock an item.
    pub fn set_item_locked(&mut self, scene: SceneId, item: SceneItemId, locked: bool) -> bool {
        self.command(|s| s.graph.set_item_locked(scene, item, locked))
    }

    /// Group items of a scene.
    pub fn group_items(&mut self, scene: SceneId, items: &[SceneItemId]) -> Option<GroupId> {
        self.command(|s| s.graph.group_items(scene, items))
    }

    /// Create a new empty scene collection and switch to it.
    pub fn create_collection(&mut self, name: impl Into<String>) -> bool {
        self.command(|s| {
            s.cancel_all_transitions();
            s.graph.create_collection(name)
        })
    }

    /// Switch to another scene collection.
    pub fn load_collection(&mut self, name: &str) -> bool {
        self.command(|s| {
            if name != s.graph.current_collection() {
                s.cancel_all_transitions();
            }
            s.graph.load_collection(name)
        })
    }

    /// Delete a collection that is not loaded.
    pub fn delete_collection(&mut self, name: &str) -> bool {
        self.command(|s| s.graph.delete_collection(name))
    }

    fn cancel_all_transitions(&mut self) {
        self.engine.cancel(Bus::Program);
        self.engine.cancel(Bus::Preview);
    }

    // ---- transitions ---------------------------------------------------------------------

    /// Transition the program bus to `scene`.
    pub fn transition_to(&mut self, scene: SceneId, descriptor: TransitionDescriptor) -> bool {
        self.command(|s| {
            s.engine
                .transition_to(&mut s.graph, Bus::Program, scene, descriptor)
        })
    }

    /// Transition the preview bus to `scene`. Ignored (`false`) while Studio Mode is disabled.
    pub fn transition_preview(&mut self, scene: SceneId, descriptor: TransitionDescriptor) -> bool {
        if !self.studio.is_enabled() {
            tracing::debug!(%scene, "preview transition ignored: studio mode disabled");
            return false;
        }
        self.command(|s| {
            s.engine
                .transition_to(&mut s.graph, Bus::Preview, scene, descriptor)
        })
    }

    /// Abandon the transition running on `bus`.
    pub fn cancel_transition(&mut self, bus: Bus) -> bool {
        self.command(|s| s.engine.cancel(bus).is_some())
    }

    /// Linear progress of the program transition.
    pub fn transition_progress(&self) -> f64 {
        self.engine.progress(Bus::Program)
    }

    // ---- studio mode ---------------------------------------------------------------------

    /// Enable Studio Mode.
    pub fn enable_studio_mode(&mut self, program: SceneId, preview: Option<SceneId>) -> bool {
        self.command(|s| s.studio.enable(&mut s.graph, &mut s.engine, program, preview))
    }

    /// Disable Studio Mode.
    pub fn disable_studio_mode(&mut self) {
        self.command(|s| s.studio.disable(&mut s.graph, &mut s.engine))
    }

    /// Stage a preview scene. Fails while Studio Mode is disabled.
    pub fn set_preview(&mut self, scene: SceneId) -> StudioResult<bool> {
        self.command(|s| s.studio.set_preview(&mut s.graph, &mut s.engine, scene))
    }

    /// Transition preview into program with the default transition.
    pub fn take(&mut self) -> StudioResult<bool> {
        self.command(|s| s.studio.take(&mut s.graph, &mut s.engine))
    }

    /// Transition preview into program with `descriptor`.
    pub fn take_with(&mut self, descriptor: TransitionDescriptor) -> StudioResult<bool> {
        self.command(|s| s.studio.take_with(&mut s.graph, &mut s.engine, descriptor))
    }

    /// Exchange preview and program instantly.
    pub fn swap(&mut self) -> StudioResult<bool> {
        self.command(|s| s.studio.swap(&mut s.graph, &mut s.engine))
    }

    /// Replace the transition `take` uses.
    pub fn set_default_transition(&mut self, descriptor: TransitionDescriptor) {
        self.studio.set_default_transition(descriptor);
    }

    /// Set the Studio Mode layout preference.
    pub fn set_vertical_layout(&mut self, vertical: bool) {
        self.studio.set_vertical_layout(vertical);
    }

    /// Studio Mode snapshot for UI binding.
    pub fn studio_state(&self) -> StudioState {
        self.studio.state(&self.graph, &self.engine)
    }

    // ---- output --------------------------------------------------------------------------

    fn sink_config(&self) -> StudioResult<SinkConfig> {
        Ok(SinkConfig {
            width: self.config.canvas.width,
            height: self.config.canvas.height,
            fps: self.config.fps()?,
        })
    }

    /// Attach the frame sink, replacing (and ending) any previous one.
    pub fn attach_sink(&mut self, mut sink: Box<dyn FrameSink>) -> StudioResult<()> {
        sink.begin(self.sink_config()?)?;
        self.detach_sink();
        self.sink = Some(sink);
        Ok(())
    }

    /// Detach the frame sink, ending it.
    pub fn detach_sink(&mut self) -> Option<Box<dyn FrameSink>> {
        let mut sink = self.sink.take()?;
        if let Err(err) = sink.end() {
            tracing::warn!(error = %err, "frame sink failed to end cleanly");
        }
        Some(sink)
    }

    /// Composite the current output without touching the sink, the stats or the clock.
    ///
    /// `None` when there is no active scene.
    pub fn render_output(&self) -> Option<CompositeOutput> {
        let scene = self.graph.active_scene()?;
        let canvas = self.config.canvas;
        let running = self
            .engine
            .running(Bus::Program)
            .and_then(|t| self.graph.scene(t.to).map(|to| (t, to)));
        Some(match running {
            Some((t, to)) => {
                let from = t.from.and_then(|id| self.graph.scene(id));
                self.compositor.composite_transition(
                    from,
                    to,
                    &t.descriptor,
                    self.engine.progress(Bus::Program),
                    canvas,
                    &self.sources,
                )
            }
            None => self.compositor.composite(scene, canvas, &self.sources),
        })
    }

    // ---- render loop ---------------------------------------------------------------------

    /// Start the render loop. Idempotent.
    pub fn start(&mut self) -> bool {
        self.render_loop.start(self.clock.now())
    }

    /// Stop the render loop. Safe when not running.
    pub fn stop(&mut self) -> bool {
        self.render_loop.stop()
    }

    /// `true` while the render loop is running.
    pub fn is_running(&self) -> bool {
        self.render_loop.is_running()
    }

    /// Render statistics.
    pub fn render_stats(&self) -> RenderStats {
        self.render_loop.stats()
    }

    /// Zero the render statistics.
    pub fn reset_stats(&mut self) {
        self.render_loop.reset_stats();
    }

    /// Run one tick now: commit finished transitions, composite the output scene and hand the
    /// frame to the attached sink.
    pub fn tick(&mut self) -> TickOutcome {
        let mut sink = self.sink.take();
        let outcome = match sink.as_deref_mut() {
            Some(s) => self.tick_with(Some(s)),
            None => self.tick_with(None),
        };
        self.sink = sink;
        outcome
    }

    /// Tick if the render loop is running and a tick is due, then schedule the next one.
    pub fn pump(&mut self) -> Option<TickOutcome> {
        if !self.render_loop.is_due(self.clock.now()) {
            return None;
        }
        let outcome = self.tick();
        self.render_loop.schedule_next(self.clock.now());
        Some(outcome)
    }

    #[tracing::instrument(level = "trace", skip_all, fields(frame = self.next_frame_number))]
    fn tick_with(&mut self, sink: Option<&mut dyn FrameSink>) -> TickOutcome {
        let started_at = self.clock.now();
        let started = Instant::now();

        let outcomes = self.engine.advance(&mut self.graph);
        if !outcomes.is_empty() {
            tracing::debug!(count = outcomes.len(), "transitions finished");
        }
        self.flush_events();

        let Some(sink) = sink.filter(|s| s.is_ready()) else {
            self.render_loop.record_skip();
            return TickOutcome::Skipped(SkipCause::NoSurface);
        };
        let Some(output) = self.render_output() else {
            self.render_loop.record_skip();
            return TickOutcome::Skipped(SkipCause::NoScene);
        };

        let frame_number = self.next_frame_number;
        if let Err(err) = sink.push_frame(frame_number, &output.frame) {
            tracing::warn!(error = %err, frame_number, "frame sink rejected frame");
            self.render_loop.record_skip();
            return TickOutcome::Skipped(SkipCause::SinkError);
        }
        self.next_frame_number += 1;
        self.render_loop.record_frame(started_at, started.elapsed());

        let kind = output.kind.clone();
        self.last_output = Some(output);
        TickOutcome::Rendered { frame_number, kind }
    }

    /// Drive the render loop on the calling thread for `duration` of wall-clock time, feeding
    /// `sink`, and return the final statistics.
    ///
    /// The attached sink (if any) is left untouched. The loop keeps its running state if it
    /// was already started; otherwise it is started and stopped around the run.
    pub fn run_realtime(
        &mut self,
        duration: Duration,
        sink: &mut dyn FrameSink,
    ) -> StudioResult<RenderStats> {
        sink.begin(self.sink_config()?)?;
        let started_here = self.start();
        let run_start = Instant::now();
        tracing::info!(seconds = duration.as_secs_f64(), "realtime run started");

        while run_start.elapsed() < duration {
            let now = self.clock.now();
            if self.render_loop.is_due(now) {
                self.tick_with(Some(&mut *sink));
                self.render_loop.schedule_next(self.clock.now());
                continue;
            }
            let until_deadline = self
                .render_loop
                .next_deadline()
                .map_or(self.render_loop.interval(), |d| d.saturating_sub(now));
            let remaining = duration.saturating_sub(run_start.elapsed());
            std::thread::sleep(until_deadline.min(remaining));
        }

        if started_here {
            self.stop();
        }
        sink.end()?;
        let stats = self.render_stats();
        tracing::info!(
            frames = stats.total_frames,
            dropped = stats.dropped_frames,
            fps = stats.fps,
            "realtime run finished"
        );
        Ok(stats)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/studio.rs"]
mod tests;
