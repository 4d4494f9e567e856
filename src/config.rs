//! Studio configuration.

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Fps, Rgba8Premul};
use crate::foundation::error::{StudioError, StudioResult};
use crate::transition::descriptor::TransitionDescriptor;

const MAX_CANVAS_DIM: u32 = 16_384;
const MAX_FPS: u32 = 1_000;

/// Recognized studio options.
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    /// Output canvas size.
    pub canvas: Canvas,
    /// Render loop target rate in frames per second.
    pub target_fps: u32,
    /// Transition used by Studio Mode `take`.
    pub default_transition: TransitionDescriptor,
    /// Studio Mode layout preference for hosts. Does not affect composition.
    pub vertical_layout: bool,
    /// Background fill, straight-alpha RGBA.
    pub background: [u8; 4],
    /// Carry the scene name as a placeholder label on empty-scene frames.
    pub empty_scene_label: bool,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            target_fps: 60,
            default_transition: TransitionDescriptor::default(),
            vertical_layout: false,
            background: [0, 0, 0, 255],
            empty_scene_label: true,
        }
    }
}

impl StudioConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(text: &str) -> StudioResult<Self> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> StudioResult<()> {
        if self.canvas.is_empty() {
            return Err(StudioError::validation("canvas width and height must be > 0"));
        }
        if self.canvas.width > MAX_CANVAS_DIM || self.canvas.height > MAX_CANVAS_DIM {
            return Err(StudioError::validation(format!(
                "canvas dimensions must be <= {MAX_CANVAS_DIM}"
            )));
        }
        if self.target_fps == 0 || self.target_fps > MAX_FPS {
            return Err(StudioError::validation(format!(
                "target_fps must be in 1..={MAX_FPS}"
            )));
        }
        Ok(())
    }

    /// Target rate as [`Fps`].
    pub fn fps(&self) -> StudioResult<Fps> {
        Fps::integer(self.target_fps)
    }

    /// Background fill, premultiplied.
    pub fn background_premul(&self) -> Rgba8Premul {
        let [r, g, b, a] = self.background;
        Rgba8Premul::from_straight_rgba(r, g, b, a)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
