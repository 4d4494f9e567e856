//! Content producers and the registry that owns them.

/// Pixel buffers and the content provider capability.
pub mod content;
/// Image decoding and PNG encoding.
pub mod decode;
/// Generational source arena.
pub mod registry;
