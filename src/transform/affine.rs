//! Scene item placement math.
//!
//! A [`Transform`] describes where a source lands on the canvas. [`compute_placement`] turns it
//! into a source-to-canvas [`Affine`] plus the source region that is actually sampled and the
//! canvas-space box that needs painting.
//!
//! Composition order, applied to a point in source pixel space:
//!
//! ```text
//! T(position) * R(rotation) * T(-anchor) * T(bounds_offset) * S(scale) * T(-crop_origin)
//! ```
//!
//! where `anchor` is the alignment point of the item box. Out-of-range values never fail; they
//! collapse to a zero-area placement that paints nothing.

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Affine, Canvas, Point, Rect, Size, Vec2};
use crate::foundation::math::{finite_or, normalize_degrees};

/// Nine-point alignment of an item box (or of content inside its bounds).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Top-left corner.
    #[default]
    TopLeft,
    /// Top edge center.
    Top,
    /// Top-right corner.
    TopRight,
    /// Left edge center.
    Left,
    /// Box center.
    Center,
    /// Right edge center.
    Right,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom edge center.
    Bottom,
    /// Bottom-right corner.
    BottomRight,
}

impl Alignment {
    /// Anchor as a fraction of the box size.
    pub fn fraction(self) -> Vec2 {
        let (x, y) = match self {
            Self::TopLeft => (0.0, 0.0),
            Self::Top => (0.5, 0.0),
            Self::TopRight => (1.0, 0.0),
            Self::Left => (0.0, 0.5),
            Self::Center => (0.5, 0.5),
            Self::Right => (1.0, 0.5),
            Self::BottomLeft => (0.0, 1.0),
            Self::Bottom => (0.5, 1.0),
            Self::BottomRight => (1.0, 1.0),
        };
        Vec2::new(x, y)
    }
}

/// How an item is fitted into its bounds box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsType {
    /// No bounds; the item size is the cropped source size times `scale`.
    #[default]
    None,
    /// Stretch to exactly fill the bounds, ignoring aspect ratio.
    Stretch,
    /// Scale uniformly to fit inside the bounds.
    Scale,
    /// Scale uniformly to cover the bounds and clip the overflow.
    Crop,
}

/// Crop insets in source pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Crop {
    /// Pixels removed from the top edge.
    pub top: f64,
    /// Pixels removed from the bottom edge.
    pub bottom: f64,
    /// Pixels removed from the left edge.
    pub left: f64,
    /// Pixels removed from the right edge.
    pub right: f64,
}

impl Crop {
    fn normalized(self) -> Self {
        let clean = |v: f64| finite_or(v, 0.0).max(0.0);
        Self {
            top: clean(self.top),
            bottom: clean(self.bottom),
            left: clean(self.left),
            right: clean(self.right),
        }
    }
}

/// Placement of a source inside a scene.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    /// Canvas position of the alignment anchor.
    pub position: Vec2,
    /// Non-negative scale factors (ignored when a bounds mode is active).
    pub scale: Vec2,
    /// Clockwise rotation in degrees, normalized to `[0, 360)`.
    pub rotation_deg: f64,
    /// Crop insets applied to the source before scaling.
    pub crop: Crop,
    /// Which point of the item box sits at `position`.
    pub alignment: Alignment,
    /// Where content sits inside its bounds box when it does not fill it.
    pub bounds_alignment: Alignment,
    /// Bounds fitting mode.
    pub bounds_type: BoundsType,
    /// Bounds box size in canvas pixels.
    pub bounds: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::new(1.0, 1.0),
            rotation_deg: 0.0,
            crop: Crop::default(),
            alignment: Alignment::TopLeft,
            bounds_alignment: Alignment::Center,
            bounds_type: BoundsType::None,
            bounds: Vec2::ZERO,
        }
    }
}

impl Transform {
    /// Transform that fits the source inside the canvas, centered, preserving aspect.
    pub fn fit_to(canvas: Canvas) -> Self {
        Self::bounded(canvas, BoundsType::Scale)
    }

    /// Transform that stretches the source over the whole canvas.
    pub fn stretch_to(canvas: Canvas) -> Self {
        Self::bounded(canvas, BoundsType::Stretch)
    }

    fn bounded(canvas: Canvas, bounds_type: BoundsType) -> Self {
        Self {
            bounds_type,
            bounds: Vec2::new(f64::from(canvas.width), f64::from(canvas.height)),
            ..Self::default()
        }
    }

    /// Return a copy that satisfies the value invariants.
    ///
    /// Scale and bounds are clamped to be non-negative, rotation is wrapped into `[0, 360)`, and
    /// non-finite inputs are replaced with neutral values.
    pub fn normalized(self) -> Self {
        let non_neg = |v: f64| finite_or(v, 0.0).max(0.0);
        Self {
            position: Vec2::new(
                finite_or(self.position.x, 0.0),
                finite_or(self.position.y, 0.0),
            ),
            scale: Vec2::new(non_neg(self.scale.x), non_neg(self.scale.y)),
            rotation_deg: normalize_degrees(self.rotation_deg),
            crop: self.crop.normalized(),
            bounds: Vec2::new(non_neg(self.bounds.x), non_neg(self.bounds.y)),
            ..self
        }
    }
}

/// Partial transform update. `None` fields keep their current value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformPatch {
    /// New position.
    pub position: Option<Vec2>,
    /// New scale.
    pub scale: Option<Vec2>,
    /// New rotation in degrees.
    pub rotation_deg: Option<f64>,
    /// New crop insets.
    pub crop: Option<Crop>,
    /// New item alignment.
    pub alignment: Option<Alignment>,
    /// New bounds alignment.
    pub bounds_alignment: Option<Alignment>,
    /// New bounds mode.
    pub bounds_type: Option<BoundsType>,
    /// New bounds size.
    pub bounds: Option<Vec2>,
}

impl TransformPatch {
    /// Merge this patch into `base` and normalize the result.
    pub fn merge(&self, base: Transform) -> Transform {
        Transform {
            position: self.position.unwrap_or(base.position),
            scale: self.scale.unwrap_or(base.scale),
            rotation_deg: self.rotation_deg.unwrap_or(base.rotation_deg),
            crop: self.crop.unwrap_or(base.crop),
            alignment: self.alignment.unwrap_or(base.alignment),
            bounds_alignment: self.bounds_alignment.unwrap_or(base.bounds_alignment),
            bounds_type: self.bounds_type.unwrap_or(base.bounds_type),
            bounds: self.bounds.unwrap_or(base.bounds),
        }
        .normalized()
    }

    /// `true` when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Result of placing a source on the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Maps source pixel coordinates to canvas coordinates.
    pub affine: Affine,
    /// Region of the source that is sampled (crop and bounds clipping applied).
    pub src_rect: Rect,
    /// Canvas-space box that covers the painted pixels, clipped to the canvas.
    pub paint_rect: Rect,
}

impl Placement {
    fn degenerate() -> Self {
        Self {
            affine: Affine::scale(0.0),
            src_rect: Rect::ZERO,
            paint_rect: Rect::ZERO,
        }
    }

    /// `true` when this placement paints nothing.
    pub fn is_degenerate(&self) -> bool {
        self.src_rect.area() <= 0.0 || self.paint_rect.area() <= 0.0
    }
}

/// Place a source of `source_size` pixels on `canvas` according to `transform`.
pub fn compute_placement(transform: &Transform, source_size: Size, canvas: Canvas) -> Placement {
    let t = transform.normalized();
    let (sw, sh) = (
        finite_or(source_size.width, 0.0).max(0.0),
        finite_or(source_size.height, 0.0).max(0.0),
    );

    let crop_rect = Rect::new(t.crop.left, t.crop.top, sw - t.crop.right, sh - t.crop.bottom);
    let (cw, ch) = (crop_rect.width(), crop_rect.height());
    if cw <= 0.0 || ch <= 0.0 || canvas.is_empty() {
        return Placement::degenerate();
    }

    // Item box size, content scale, and content offset inside the box.
    let (box_size, scale, offset, clip_to_box) = match t.bounds_type {
        BoundsType::None => {
            let scale = t.scale;
            (Vec2::new(cw * scale.x, ch * scale.y), scale, Vec2::ZERO, false)
        }
        bounds_type => {
            let (bw, bh) = (t.bounds.x, t.bounds.y);
            if bw <= 0.0 || bh <= 0.0 {
                return Placement::degenerate();
            }
            let (sx, sy) = (bw / cw, bh / ch);
            let scale = match bounds_type {
                BoundsType::Stretch => Vec2::new(sx, sy),
                BoundsType::Scale => Vec2::new(sx.min(sy), sx.min(sy)),
                BoundsType::Crop | BoundsType::None => Vec2::new(sx.max(sy), sx.max(sy)),
            };
            let content = Vec2::new(cw * scale.x, ch * scale.y);
            let frac = t.bounds_alignment.fraction();
            let offset = Vec2::new((bw - content.x) * frac.x, (bh - content.y) * frac.y);
            (
                Vec2::new(bw, bh),
                scale,
                offset,
                bounds_type == BoundsType::Crop,
            )
        }
    };
    if scale.x <= 0.0 || scale.y <= 0.0 {
        return Placement::degenerate();
    }

    let frac = t.alignment.fraction();
    let anchor = Vec2::new(box_size.x * frac.x, box_size.y * frac.y);

    let content_to_box = Affine::translate(offset)
        * Affine::scale_non_uniform(scale.x, scale.y)
        * Affine::translate(-crop_rect.origin().to_vec2());
    let box_to_canvas = Affine::translate(t.position)
        * Affine::rotate(t.rotation_deg.to_radians())
        * Affine::translate(-anchor);

    let mut src_rect = crop_rect;
    if clip_to_box {
        let visible = content_to_box
            .inverse()
            .transform_rect_bbox(Rect::new(0.0, 0.0, box_size.x, box_size.y));
        src_rect = src_rect.intersect(visible);
    }
    if src_rect.area() <= 0.0 {
        return Placement::degenerate();
    }

    let affine = box_to_canvas * content_to_box;
    let paint_rect = affine
        .transform_rect_bbox(src_rect)
        .intersect(canvas.rect());
    let paint_rect = if paint_rect.width() <= 0.0 || paint_rect.height() <= 0.0 {
        Rect::ZERO
    } else {
        paint_rect
    };

    Placement {
        affine,
        src_rect,
        paint_rect,
    }
}

/// Canvas-space corner points of a placement's sampled source region.
///
/// Useful for hit testing and drawing selection outlines.
pub fn placement_corners(placement: &Placement) -> [Point; 4] {
    let r = placement.src_rect;
    [
        placement.affine * Point::new(r.x0, r.y0),
        placement.affine * Point::new(r.x1, r.y0),
        placement.affine * Point::new(r.x1, r.y1),
        placement.affine * Point::new(r.x0, r.y1),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/transform/affine.rs"]
mod tests;
