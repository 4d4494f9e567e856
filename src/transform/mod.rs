//! Item placement on the canvas.

/// Item transforms, bounds fitting and the resulting affine placement.
pub mod affine;
