//! Preview/Program studio mode.

/// Studio Mode controller.
pub mod controller;
