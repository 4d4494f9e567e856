use serde::{Deserialize, Serialize};

use crate::foundation::error::{StudioError, StudioResult};
use crate::foundation::math::{mul_div255_u8, unit_to_u8};
use crate::sources::content::PixelContent;
use crate::transform::affine::Crop;

/// A filter attached to a source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Operator-facing name.
    pub name: String,
    /// Disabled filters are kept but skipped.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// What the filter does.
    pub kind: FilterKind,
}

fn default_enabled() -> bool {
    true
}

/// Supported filter operations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterKind {
    /// Multiply alpha (and premultiplied color) by `value` in `[0, 1]`.
    Opacity {
        /// Opacity factor.
        value: f32,
    },
    /// Brightness/contrast/gamma adjustment on straight color.
    ColorCorrection {
        /// Additive brightness in `[-1, 1]`.
        #[serde(default)]
        brightness: f32,
        /// Contrast in `[-1, 1]`, 0 is neutral.
        #[serde(default)]
        contrast: f32,
        /// Gamma exponent, must be > 0. 1 is neutral.
        #[serde(default = "default_gamma")]
        gamma: f32,
    },
    /// Make pixels close to `key` transparent.
    ColorKey {
        /// Key color (straight RGB).
        key: [u8; 3],
        /// Euclidean RGB distance under which a pixel is keyed out.
        similarity: f32,
    },
    /// Remove edges of the source content.
    Crop {
        /// Insets in content pixels.
        crop: Crop,
    },
    /// Invert color channels.
    Invert,
}

fn default_gamma() -> f32 {
    1.0
}

impl Filter {
    /// Construct an enabled filter.
    pub fn new(name: impl Into<String>, kind: FilterKind) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            kind,
        }
    }

    /// Reject parameter values that cannot be applied.
    pub fn validate(&self) -> StudioResult<()> {
        match &self.kind {
            FilterKind::Opacity { value } => {
                if !value.is_finite() || !(0.0..=1.0).contains(value) {
                    return Err(StudioError::validation(
                        "opacity filter value must be finite and in [0, 1]",
                    ));
                }
            }
            FilterKind::ColorCorrection {
                brightness,
                contrast,
                gamma,
            } => {
                if ![*brightness, *contrast, *gamma].iter().all(|v| v.is_finite()) {
                    return Err(StudioError::validation(
                        "color correction parameters must be finite",
                    ));
                }
                if *gamma <= 0.0 {
                    return Err(StudioError::validation("color correction gamma must be > 0"));
                }
            }
            FilterKind::ColorKey { similarity, .. } => {
                if !similarity.is_finite() || *similarity < 0.0 {
                    return Err(StudioError::validation(
                        "color key similarity must be finite and >= 0",
                    ));
                }
            }
            FilterKind::Crop { .. } | FilterKind::Invert => {}
        }
        Ok(())
    }
}

/// Apply every enabled filter in order.
///
/// Returns the input unchanged (same shared buffer) when no filter is enabled.
pub fn apply_filters(content: &PixelContent, filters: &[Filter]) -> PixelContent {
    let mut out = content.clone();
    for f in filters.iter().filter(|f| f.enabled) {
        out = apply_filter(&out, &f.kind);
    }
    out
}

fn apply_filter(content: &PixelContent, kind: &FilterKind) -> PixelContent {
    match kind {
        FilterKind::Opacity { value } => {
            let op = unit_to_u8(*value);
            map_pixels(content, |px| {
                [
                    mul_div255_u8(u16::from(px[0]), op),
                    mul_div255_u8(u16::from(px[1]), op),
                    mul_div255_u8(u16::from(px[2]), op),
                    mul_div255_u8(u16::from(px[3]), op),
                ]
            })
        }
        FilterKind::ColorCorrection {
            brightness,
            contrast,
            gamma,
        } => {
            let lut = color_correction_lut(*brightness, *contrast, *gamma);
            map_straight(content, |rgb| {
                [
                    lut[rgb[0] as usize],
                    lut[rgb[1] as usize],
                    lut[rgb[2] as usize],
                ]
            })
        }
        FilterKind::ColorKey { key, similarity } => {
            let limit = similarity * similarity;
            map_pixels(content, |px| {
                let a = px[3];
                if a == 0 {
                    return px;
                }
                let straight = unpremul(px);
                let d2: f32 = (0..3)
                    .map(|i| {
                        let d = f32::from(straight[i]) - f32::from(key[i]);
                        d * d
                    })
                    .sum();
                if d2 <= limit { [0, 0, 0, 0] } else { px }
            })
        }
        FilterKind::Crop { crop } => crop_content(content, *crop),
        FilterKind::Invert => map_straight(content, |rgb| [255 - rgb[0], 255 - rgb[1], 255 - rgb[2]]),
    }
}

fn color_correction_lut(brightness: f32, contrast: f32, gamma: f32) -> [u8; 256] {
    let brightness = brightness.clamp(-1.0, 1.0);
    let contrast = contrast.clamp(-1.0, 1.0) + 1.0;
    let inv_gamma = 1.0 / gamma.max(1e-3);
    let mut lut = [0u8; 256];
    for (i, v) in lut.iter_mut().enumerate() {
        let c = i as f32 / 255.0;
        let c = c.powf(inv_gamma);
        let c = (c - 0.5) * contrast + 0.5 + brightness;
        *v = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
    lut
}

fn map_pixels(content: &PixelContent, f: impl Fn([u8; 4]) -> [u8; 4]) -> PixelContent {
    let mut data = Vec::with_capacity(content.data().len());
    for px in content.data().chunks_exact(4) {
        data.extend_from_slice(&f([px[0], px[1], px[2], px[3]]));
    }
    content.with_pixels(data)
}

fn map_straight(content: &PixelContent, f: impl Fn([u8; 3]) -> [u8; 3]) -> PixelContent {
    map_pixels(content, |px| {
        let a = px[3];
        if a == 0 {
            return px;
        }
        let s = unpremul(px);
        let rgb = f([s[0], s[1], s[2]]);
        let a16 = u16::from(a);
        [
            mul_div255_u8(u16::from(rgb[0]), a16),
            mul_div255_u8(u16::from(rgb[1]), a16),
            mul_div255_u8(u16::from(rgb[2]), a16),
            a,
        ]
    })
}

fn unpremul(px: [u8; 4]) -> [u8; 4] {
    let a = u16::from(px[3]);
    if a == 0 || a == 255 {
        return px;
    }
    let un = |c: u8| ((u16::from(c) * 255 + a / 2) / a).min(255) as u8;
    [un(px[0]), un(px[1]), un(px[2]), px[3]]
}

fn crop_content(content: &PixelContent, crop: Crop) -> PixelContent {
    let clamp_px = |v: f64| -> u32 {
        if v.is_finite() && v > 0.0 {
            v.round().min(f64::from(u32::MAX)) as u32
        } else {
            0
        }
    };
    let (width, height) = (content.width(), content.height());
    let left = clamp_px(crop.left).min(width);
    let top = clamp_px(crop.top).min(height);
    let right = clamp_px(crop.right).min(width - left);
    let bottom = clamp_px(crop.bottom).min(height - top);
    let w = width - left - right;
    let h = height - top - bottom;

    let src = content.data();
    let mut data = Vec::with_capacity((w as usize) * (h as usize) * 4);
    for y in top..top + h {
        let row = (y as usize) * (width as usize);
        let start = (row + left as usize) * 4;
        let end = start + (w as usize) * 4;
        data.extend_from_slice(&src[start..end]);
    }
    match PixelContent::new(w, h, data) {
        Ok(cropped) => cropped,
        Err(e) => {
            tracing::warn!(error = %e, "crop produced no content");
            PixelContent::empty()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/filters.rs"]
mod tests;
