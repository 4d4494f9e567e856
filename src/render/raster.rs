//! Software rasterization of one placed source.

use crate::effects::composite::over;
use crate::foundation::core::Point;
use crate::render::backend::FrameRGBA;
use crate::sources::content::PixelContent;
use crate::transform::affine::Placement;

/// Paint `content` into `frame` through `placement`, source-over.
///
/// Every frame pixel inside the placement's paint box is mapped back through the inverse affine
/// at its center and takes the nearest source pixel when that lands inside the sampled source
/// region. Returns the number of frame pixels written.
pub(crate) fn paint_content(
    frame: &mut FrameRGBA,
    content: &PixelContent,
    placement: &Placement,
) -> usize {
    if placement.is_degenerate() || content.is_empty() {
        return 0;
    }
    let det = placement.affine.determinant();
    if !det.is_finite() || det.abs() < f64::EPSILON {
        return 0;
    }
    let inverse = placement.affine.inverse();
    let src = placement.src_rect;

    let r = placement.paint_rect;
    let x0 = r.x0.floor().max(0.0) as u32;
    let y0 = r.y0.floor().max(0.0) as u32;
    let x1 = (r.x1.ceil().max(0.0) as u32).min(frame.width);
    let y1 = (r.y1.ceil().max(0.0) as u32).min(frame.height);

    let stride = frame.width as usize;
    let mut written = 0usize;
    for y in y0..y1 {
        for x in x0..x1 {
            let p = inverse * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if p.x < src.x0 || p.y < src.y0 || p.x >= src.x1 || p.y >= src.y1 {
                continue;
            }
            let sx = p.x.floor() as u32;
            let sy = p.y.floor() as u32;
            let sample = content.pixel(sx, sy);
            if sample[3] == 0 {
                continue;
            }
            let i = ((y as usize) * stride + (x as usize)) * 4;
            let dst = [
                frame.data[i],
                frame.data[i + 1],
                frame.data[i + 2],
                frame.data[i + 3],
            ];
            frame.data[i..i + 4].copy_from_slice(&over(dst, sample, 1.0));
            written += 1;
        }
    }
    written
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
