//! Frame production: buffers, painting, composition and pacing.

/// Output frame buffer.
pub mod backend;
/// Scene and transition compositor.
pub mod compositor;
/// Nearest-neighbour item painter.
pub(crate) mod raster;
/// Frame cadence and statistics.
pub mod render_loop;
