//! Per-kind blending of the outgoing and incoming frames of a running transition.

use crate::effects::composite::{
    LumaParams, WipeParams, crossfade_color_into, crossfade_into, luma_wipe_into,
    shifted_over_in_place, wipe_into,
};
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{StudioError, StudioResult};
use crate::render::backend::FrameRGBA;
use crate::transition::descriptor::{Direction, TransitionDescriptor, TransitionKind};

/// Blend two equally sized frames at linear `progress` in `[0, 1]`.
///
/// The descriptor's easing shapes the visual progress. Stinger transitions switch hard at their
/// transition point (the overlay clip itself is played by the host). Nothing here touches scene
/// pointers.
pub fn blend_frames(
    outgoing: &FrameRGBA,
    incoming: &FrameRGBA,
    descriptor: &TransitionDescriptor,
    progress: f64,
) -> StudioResult<FrameRGBA> {
    if outgoing.width != incoming.width || outgoing.height != incoming.height {
        return Err(StudioError::content(format!(
            "cannot blend {}x{} with {}x{}",
            outgoing.width, outgoing.height, incoming.width, incoming.height
        )));
    }
    let linear = if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    };
    let t = descriptor.ease.apply(linear) as f32;
    let (width, height) = (outgoing.width, outgoing.height);
    let mut out = FrameRGBA::transparent(outgoing.canvas());

    match &descriptor.kind {
        TransitionKind::Cut => out.data.copy_from_slice(&incoming.data),
        TransitionKind::Fade => crossfade_into(&mut out.data, &outgoing.data, &incoming.data, t)?,
        TransitionKind::Wipe { dir, soft_edge } => wipe_into(
            &mut out.data,
            &outgoing.data,
            &incoming.data,
            WipeParams {
                width,
                height,
                t,
                dir: *dir,
                soft_edge: *soft_edge,
            },
        )?,
        TransitionKind::LumaWipe {
            pattern,
            softness,
            invert,
        } => luma_wipe_into(
            &mut out.data,
            &outgoing.data,
            &incoming.data,
            LumaParams {
                width,
                height,
                t,
                pattern: *pattern,
                softness: *softness,
                invert: *invert,
            },
        )?,
        TransitionKind::Slide { direction } => {
            let (ox, oy) = travel(*direction, width, height, t);
            let (ix, iy) = entry_offset(*direction, width, height);
            shifted_over_in_place(&mut out.data, &outgoing.data, width, height, ox, oy)?;
            shifted_over_in_place(
                &mut out.data,
                &incoming.data,
                width,
                height,
                ix + ox,
                iy + oy,
            )?;
        }
        TransitionKind::Swipe {
            direction,
            swipe_in,
        } => {
            let (ox, oy) = travel(*direction, width, height, t);
            if *swipe_in {
                let (ix, iy) = entry_offset(*direction, width, height);
                out.data.copy_from_slice(&outgoing.data);
                shifted_over_in_place(
                    &mut out.data,
                    &incoming.data,
                    width,
                    height,
                    ix + ox,
                    iy + oy,
                )?;
            } else {
                out.data.copy_from_slice(&incoming.data);
                shifted_over_in_place(&mut out.data, &outgoing.data, width, height, ox, oy)?;
            }
        }
        TransitionKind::Stinger {
            transition_point_ms,
        } => {
            let point = if descriptor.duration_ms == 0 {
                0.0
            } else {
                *transition_point_ms as f64 / descriptor.duration_ms as f64
            };
            let src = if linear >= point { incoming } else { outgoing };
            out.data.copy_from_slice(&src.data);
        }
        TransitionKind::FadeToColor {
            color,
            switch_point,
        } => {
            let c = Rgba8Premul::from_straight_rgba(color[0], color[1], color[2], color[3])
                .to_array();
            let sp = switch_point.clamp(0.0, 1.0);
            if t < sp {
                crossfade_color_into(&mut out.data, &outgoing.data, c, t / sp)?;
            } else if sp >= 1.0 {
                crossfade_color_into(&mut out.data, &outgoing.data, c, 1.0)?;
            } else {
                crossfade_color_into(&mut out.data, &incoming.data, c, 1.0 - (t - sp) / (1.0 - sp))?;
            }
        }
    }
    Ok(out)
}

// Offset the outgoing frame has travelled at `t`.
fn travel(direction: Direction, width: u32, height: u32, t: f32) -> (i64, i64) {
    let dx = (f64::from(t) * f64::from(width)).round() as i64;
    let dy = (f64::from(t) * f64::from(height)).round() as i64;
    match direction {
        Direction::Left => (-dx, 0),
        Direction::Right => (dx, 0),
        Direction::Up => (0, -dy),
        Direction::Down => (0, dy),
    }
}

// Where the incoming frame starts, relative to the canvas, before it travels.
fn entry_offset(direction: Direction, width: u32, height: u32) -> (i64, i64) {
    let (w, h) = (i64::from(width), i64::from(height));
    match direction {
        Direction::Left => (w, 0),
        Direction::Right => (-w, 0),
        Direction::Up => (0, h),
        Direction::Down => (0, -h),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transition/blend.rs"]
mod tests;
