//! Frame sinks.
//!
//! Sinks receive composited frames in increasing frame-number order from the render tick.

/// Generic frame sink trait and the in-memory sink.
pub mod sink;
