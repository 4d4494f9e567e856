//! Scenecut is a scene composition and transition engine for live studio production.
//!
//! A [`Studio`] session owns everything needed to go live:
//!
//! - a [`SourceRegistry`] of content producers (captures, images, colors, ...)
//! - a [`SceneGraph`] of scenes, each an ordered list of placed sources
//! - a [`TransitionEngine`] that animates switches of the program and preview buses
//! - Studio Mode (Preview/Program with `take` and `swap`)
//! - a CPU [`Compositor`] and a fixed-rate [`RenderLoop`] feeding a [`FrameSink`]
//!
//! Pixels are premultiplied RGBA8 end to end. Time is read through an injected [`Clock`], so the
//! whole engine can be driven deterministically with a [`ManualClock`].
#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Studio configuration.
pub mod config;
/// Pixel kernels and source filters.
pub mod effects;
/// Change notifications and observer registration.
pub mod events;
/// Shared primitives.
pub mod foundation;
/// Frame sinks.
pub mod output;
/// Compositor, frame buffers and render loop.
pub mod render;
/// Scene model and store.
pub mod scene;
/// Session context and show files.
pub mod session;
/// Source registry and content.
pub mod sources;
/// Studio Mode.
pub mod studio;
/// Item transforms.
pub mod transform;
/// Transitions.
pub mod transition;

pub use crate::config::StudioConfig;
pub use crate::effects::filters::{Filter, FilterKind};
pub use crate::events::{Observers, StudioEvent};
pub use crate::foundation::clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use crate::foundation::core::{Canvas, Fps, Point, Rect, Rgba8Premul, Size, Vec2};
pub use crate::foundation::error::{StudioError, StudioResult};
pub use crate::foundation::ids::{GroupId, SceneId, SceneItemId, SourceId, SubscriptionId};
pub use crate::output::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::render::backend::FrameRGBA;
pub use crate::render::compositor::{CompositeOutput, Compositor, FrameKind};
pub use crate::render::render_loop::{RenderLoop, RenderStats};
pub use crate::scene::model::{Scene, SceneItem};
pub use crate::scene::store::{ItemMove, SceneGraph};
pub use crate::session::show::ShowFile;
pub use crate::session::studio::{SkipCause, Studio, TickOutcome};
pub use crate::sources::content::{PixelContent, SourceContentProvider};
pub use crate::sources::registry::{Source, SourceKind, SourceRegistry, SourceSettings};
pub use crate::studio::controller::{StudioMode, StudioState};
pub use crate::transform::affine::{Alignment, BoundsType, Crop, Transform, TransformPatch};
pub use crate::transition::descriptor::{
    TransitionDescriptor, TransitionKind, TransitionType, parse_transition,
};
pub use crate::transition::ease::Ease;
pub use crate::transition::engine::{Bus, TransitionEngine, TransitionState};
