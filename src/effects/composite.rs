use crate::foundation::error::{StudioError, StudioResult};
use crate::foundation::math::{mul_div255_u8, unit_to_u8};
use crate::transition::descriptor::{LumaPattern, WipeDir};

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over `src` onto `dst` with an extra opacity factor.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = unit_to_u8(opacity);
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Linear blend from `a` (t = 0) to `b` (t = 1).
pub fn crossfade(a: PremulRgba8, b: PremulRgba8, t: f32) -> PremulRgba8 {
    let tt = unit_to_u8(t);
    let it = 255u16 - tt;

    let mut out = [0u8; 4];
    for i in 0..4 {
        let av = mul_div255(u16::from(a[i]), it);
        let bv = mul_div255(u16::from(b[i]), tt);
        out[i] = add_sat_u8(av, bv);
    }
    out
}

fn check_len(what: &str, expected: usize, bufs: &[usize]) -> StudioResult<()> {
    if !expected.is_multiple_of(4) || bufs.iter().any(|&len| len != expected) {
        return Err(StudioError::content(format!(
            "{what} expects rgba8 buffers of {expected} bytes"
        )));
    }
    Ok(())
}

fn frame_len(width: u32, height: u32) -> StudioResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| StudioError::content("frame buffer size overflow"))
}

fn px(buf: &[u8], idx: usize) -> PremulRgba8 {
    [buf[idx], buf[idx + 1], buf[idx + 2], buf[idx + 3]]
}

/// `dst = crossfade(a, b, t)` for every pixel.
pub fn crossfade_into(dst: &mut [u8], a: &[u8], b: &[u8], t: f32) -> StudioResult<()> {
    check_len("crossfade_into", dst.len(), &[a.len(), b.len()])?;
    for ((d, a), b) in dst
        .chunks_exact_mut(4)
        .zip(a.chunks_exact(4))
        .zip(b.chunks_exact(4))
    {
        let out = crossfade([a[0], a[1], a[2], a[3]], [b[0], b[1], b[2], b[3]], t);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// `dst = crossfade(a, color, t)` for every pixel.
pub fn crossfade_color_into(
    dst: &mut [u8],
    a: &[u8],
    color: PremulRgba8,
    t: f32,
) -> StudioResult<()> {
    check_len("crossfade_color_into", dst.len(), &[a.len()])?;
    for (d, a) in dst.chunks_exact_mut(4).zip(a.chunks_exact(4)) {
        let out = crossfade([a[0], a[1], a[2], a[3]], color, t);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Parameters of [`wipe_into`].
#[derive(Clone, Copy, Debug)]
pub struct WipeParams {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Wipe progress in `[0, 1]`.
    pub t: f32,
    /// Sweep direction.
    pub dir: WipeDir,
    /// Edge softness as a fraction of the sweep axis.
    pub soft_edge: f32,
}

/// Sweep from `a` to `b`: pixels behind the moving edge show `b`.
pub fn wipe_into(dst: &mut [u8], a: &[u8], b: &[u8], params: WipeParams) -> StudioResult<()> {
    let WipeParams {
        width,
        height,
        t,
        dir,
        soft_edge,
    } = params;
    let expected_len = frame_len(width, height)?;
    check_len("wipe_into", expected_len, &[dst.len(), a.len(), b.len()])?;

    let t = t.clamp(0.0, 1.0);
    let soft_edge = soft_edge.max(0.0);

    let axis_len = match dir {
        WipeDir::LeftToRight | WipeDir::RightToLeft => width as f32,
        WipeDir::TopToBottom | WipeDir::BottomToTop => height as f32,
    };
    let soft_px = soft_edge * axis_len;

    let edge = t * (axis_len + 2.0 * soft_px) - soft_px;
    let a_edge = edge - soft_px;
    let b_edge = edge + soft_px;

    for y in 0..height {
        for x in 0..width {
            let pos = match dir {
                WipeDir::LeftToRight => x as f32,
                WipeDir::RightToLeft => (width - 1 - x) as f32,
                WipeDir::TopToBottom => y as f32,
                WipeDir::BottomToTop => (height - 1 - y) as f32,
            };

            let m = if soft_px <= 0.0 {
                if pos < edge { 1.0 } else { 0.0 }
            } else {
                1.0 - smoothstep(a_edge, b_edge, pos)
            };

            let idx = ((y as usize) * (width as usize) + (x as usize)) * 4;
            let out = crossfade(px(a, idx), px(b, idx), m);
            dst[idx..idx + 4].copy_from_slice(&out);
        }
    }

    Ok(())
}

/// Parameters of [`luma_wipe_into`].
#[derive(Clone, Copy, Debug)]
pub struct LumaParams {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Progress in `[0, 1]`.
    pub t: f32,
    /// Luminance pattern that orders pixel reveal.
    pub pattern: LumaPattern,
    /// Threshold ramp width in `[0, 1]`.
    pub softness: f32,
    /// Reveal bright areas first.
    pub invert: bool,
}

/// Luminance of `pattern` at pixel center `(x, y)`, in `[0, 1]`.
pub fn luma_at(pattern: LumaPattern, x: u32, y: u32, width: u32, height: u32) -> f32 {
    let u = (x as f32 + 0.5) / width.max(1) as f32;
    let v = (y as f32 + 0.5) / height.max(1) as f32;
    let (du, dv) = ((u - 0.5).abs(), (v - 0.5).abs());
    let l = match pattern {
        LumaPattern::Horizontal => u,
        LumaPattern::Vertical => v,
        LumaPattern::Radial => (du * du + dv * dv).sqrt() / std::f32::consts::FRAC_1_SQRT_2,
        LumaPattern::Diamond => du + dv,
    };
    l.clamp(0.0, 1.0)
}

/// Reveal `b` over `a` where the pattern luminance falls under a moving threshold.
pub fn luma_wipe_into(dst: &mut [u8], a: &[u8], b: &[u8], params: LumaParams) -> StudioResult<()> {
    let LumaParams {
        width,
        height,
        t,
        pattern,
        softness,
        invert,
    } = params;
    let expected_len = frame_len(width, height)?;
    check_len("luma_wipe_into", expected_len, &[dst.len(), a.len(), b.len()])?;

    let t = t.clamp(0.0, 1.0);
    let soft = softness.clamp(0.0, 1.0);
    // Threshold travels far enough that t = 0 shows only `a` and t = 1 only `b`.
    let threshold = t * (1.0 + soft);

    for y in 0..height {
        for x in 0..width {
            let mut l = luma_at(pattern, x, y, width, height);
            if invert {
                l = 1.0 - l;
            }
            let m = if soft <= 0.0 {
                if l < threshold || t >= 1.0 { 1.0 } else { 0.0 }
            } else {
                1.0 - smoothstep(threshold - soft, threshold, l)
            };
            let idx = ((y as usize) * (width as usize) + (x as usize)) * 4;
            let out = crossfade(px(a, idx), px(b, idx), m);
            dst[idx..idx + 4].copy_from_slice(&out);
        }
    }
    Ok(())
}

/// Composite `src` translated by `(dx, dy)` whole pixels over `dst`.
pub fn shifted_over_in_place(
    dst: &mut [u8],
    src: &[u8],
    width: u32,
    height: u32,
    dx: i64,
    dy: i64,
) -> StudioResult<()> {
    let expected_len = frame_len(width, height)?;
    check_len("shifted_over_in_place", expected_len, &[dst.len(), src.len()])?;

    let (w, h) = (i64::from(width), i64::from(height));
    for y in 0..h {
        let sy = y - dy;
        if !(0..h).contains(&sy) {
            continue;
        }
        for x in 0..w {
            let sx = x - dx;
            if !(0..w).contains(&sx) {
                continue;
            }
            let d = ((y * w + x) * 4) as usize;
            let s = ((sy * w + sx) * 4) as usize;
            let out = over(px(dst, d), px(src, s), 1.0);
            dst[d..d + 4].copy_from_slice(&out);
        }
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    mul_div255_u8(x, y)
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

fn smoothstep(a: f32, b: f32, x: f32) -> f32 {
    if x <= a {
        return 0.0;
    }
    if x >= b {
        return 1.0;
    }
    let t = (x - a) / (b - a);
    (t * t * (3.0 - 2.0 * t)).clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
