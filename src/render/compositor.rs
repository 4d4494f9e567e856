//! Scene compositor.
//!
//! Paints the visible items of one scene, back to front, into a fresh frame. Failures of a
//! single item (unresolvable source, degenerate placement, empty filtered content) degrade to
//! painting nothing for that item; a composite never fails as a whole.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::foundation::core::{Canvas, Rect, Rgba8Premul};
use crate::foundation::ids::{SceneId, SceneItemId, SourceId};
use crate::render::backend::FrameRGBA;
use crate::render::raster::paint_content;
use crate::scene::model::Scene;
use crate::sources::content::SourceContentProvider;
use crate::sources::registry::resolve_filtered;
use crate::transform::affine::compute_placement;
use crate::transition::blend::blend_frames;
use crate::transition::descriptor::{TransitionDescriptor, TransitionType};

/// What a composited frame shows.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FrameKind {
    /// A scene with at least one visible item.
    Scene {
        /// Painted scene.
        scene: SceneId,
    },
    /// A scene with no visible items: background plus an optional placeholder label.
    EmptyScene {
        /// The empty scene.
        scene: SceneId,
        /// Placeholder text (the scene name) when labels are enabled.
        label: Option<String>,
    },
    /// A blend of two scenes during a running program transition.
    Transition {
        /// Outgoing scene, if there was one.
        from: Option<SceneId>,
        /// Incoming scene.
        to: SceneId,
        /// Transition style.
        kind: TransitionType,
        /// Linear progress at composite time.
        progress: f64,
    },
}

/// Why an item painted nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The provider had no content for the source (missing, stale, disabled, not yet fed).
    Unresolved,
    /// The transform collapses the item to zero area or moves it off canvas.
    Degenerate,
}

/// Per-item paint record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ItemPaint {
    /// Painted item.
    pub item: SceneItemId,
    /// Its source.
    pub source: SourceId,
    /// Paint rank.
    pub order: u32,
    /// Canvas box touched by the item (zero when skipped).
    pub paint_rect: Rect,
    /// Frame pixels written.
    pub pixels: usize,
    /// Set when the item painted nothing.
    pub skipped: Option<SkipReason>,
    /// Time spent on this item.
    pub elapsed: Duration,
}

/// A finished composite.
#[derive(Clone, Debug)]
pub struct CompositeOutput {
    /// The pixels.
    pub frame: FrameRGBA,
    /// What the pixels show.
    pub kind: FrameKind,
    /// Paint records in paint order. During a transition, outgoing items come first.
    pub items: Vec<ItemPaint>,
}

impl CompositeOutput {
    /// Item ids in the order they were painted.
    pub fn paint_order(&self) -> Vec<SceneItemId> {
        self.items.iter().map(|p| p.item).collect()
    }

    /// Items that actually wrote pixels.
    pub fn painted_items(&self) -> Vec<SceneItemId> {
        self.items
            .iter()
            .filter(|p| p.skipped.is_none() && p.pixels > 0)
            .map(|p| p.item)
            .collect()
    }
}

/// Software compositor.
#[derive(Clone, Debug)]
pub struct Compositor {
    background: Rgba8Premul,
    empty_scene_label: bool,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(Rgba8Premul::black(), true)
    }
}

impl Compositor {
    /// Compositor filling frames with `background`.
    pub fn new(background: Rgba8Premul, empty_scene_label: bool) -> Self {
        Self {
            background,
            empty_scene_label,
        }
    }

    /// Background fill.
    pub fn background(&self) -> Rgba8Premul {
        self.background
    }

    /// A frame holding only the background.
    pub fn blank(&self, canvas: Canvas) -> FrameRGBA {
        FrameRGBA::filled(canvas, self.background)
    }

    /// Composite `scene` onto a `canvas`-sized frame.
    #[tracing::instrument(level = "trace", skip_all, fields(scene = %scene.id, items = scene.items().len()))]
    pub fn composite(
        &self,
        scene: &Scene,
        canvas: Canvas,
        provider: &dyn SourceContentProvider,
    ) -> CompositeOutput {
        let mut frame = self.blank(canvas);
        let visible = scene.visible_items();
        if visible.is_empty() {
            let label = self.empty_scene_label.then(|| scene.name.clone());
            return CompositeOutput {
                frame,
                kind: FrameKind::EmptyScene {
                    scene: scene.id,
                    label,
                },
                items: Vec::new(),
            };
        }

        let mut items = Vec::with_capacity(visible.len());
        for item in visible {
            let started = Instant::now();
            let mut record = ItemPaint {
                item: item.id,
                source: item.source,
                order: item.order,
                paint_rect: Rect::ZERO,
                pixels: 0,
                skipped: None,
                elapsed: Duration::ZERO,
            };

            match resolve_filtered(provider, item.source) {
                None => {
                    tracing::trace!(item = %item.id, source = %item.source, "source unresolved");
                    record.skipped = Some(SkipReason::Unresolved);
                }
                Some(content) => {
                    let placement = compute_placement(&item.transform, content.size(), canvas);
                    if placement.is_degenerate() {
                        record.skipped = Some(SkipReason::Degenerate);
                    } else {
                        record.paint_rect = placement.paint_rect;
                        record.pixels = paint_content(&mut frame, &content, &placement);
                    }
                }
            }

            record.elapsed = started.elapsed();
            items.push(record);
        }

        CompositeOutput {
            frame,
            kind: FrameKind::Scene { scene: scene.id },
            items,
        }
    }

    /// Composite a program transition from `from` to `to` at linear `progress`.
    ///
    /// Both scenes are painted in full and blended per the descriptor. A missing outgoing scene
    /// blends from the background. If blending fails the outgoing frame is shown unchanged.
    #[tracing::instrument(level = "trace", skip_all, fields(to = %to.id, progress = progress))]
    pub fn composite_transition(
        &self,
        from: Option<&Scene>,
        to: &Scene,
        descriptor: &TransitionDescriptor,
        progress: f64,
        canvas: Canvas,
        provider: &dyn SourceContentProvider,
    ) -> CompositeOutput {
        let (outgoing, mut items) = match from {
            Some(scene) => {
                let out = self.composite(scene, canvas, provider);
                (out.frame, out.items)
            }
            None => (self.blank(canvas), Vec::new()),
        };
        let incoming = self.composite(to, canvas, provider);
        items.extend(incoming.items);

        let frame = match blend_frames(&outgoing, &incoming.frame, descriptor, progress) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!(error = %err, "transition blend failed, holding outgoing frame");
                outgoing
            }
        };

        CompositeOutput {
            frame,
            kind: FrameKind::Transition {
                from: from.map(|s| s.id),
                to: to.id,
                kind: descriptor.transition_type(),
                progress,
            },
            items,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
