//! Timed scene changes.
//!
//! A [`descriptor::TransitionDescriptor`] says what a transition looks like, the
//! [`engine::TransitionEngine`] owns its lifetime and commits the bus pointer, and
//! [`blend::blend_frames`] renders the in-between frames.

/// Frame blending per transition kind.
pub mod blend;
/// Transition descriptors and settings parsing.
pub mod descriptor;
/// Easing curves.
pub mod ease;
/// Per-bus transition state machine.
pub mod engine;
