//! Scenes, scene items and the store that owns them.

/// Scene and scene item types.
pub mod model;
/// Scene graph store with bus pointers and collections.
pub mod store;
