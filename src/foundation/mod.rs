//! Shared primitives: geometry and color types, identifiers, errors and time.

/// Injected time source.
pub mod clock;
/// Canvas, frame rate, color and geometry types.
pub mod core;
/// Crate error type.
pub mod error;
/// Identifier newtypes and allocators.
pub mod ids;
/// Small integer/fixed-point helpers for pixel math.
pub mod math;
