//! Pixel operations shared by filters and transitions.

/// Premultiplied compositing and blend kernels.
pub mod composite;
/// Per-source filters.
pub mod filters;
