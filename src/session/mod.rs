//! The session context and show-file bootstrapping.

/// JSON show files.
pub mod show;
/// The `Studio` session.
pub mod studio;
