use std::sync::Arc;

use crate::effects::filters::Filter;
use crate::foundation::core::{Rgba8Premul, Size};
use crate::foundation::error::{StudioError, StudioResult};
use crate::foundation::ids::SourceId;

/// Largest width or height accepted for source content.
pub const MAX_CONTENT_DIM: u32 = 16_384;

/// Pixels produced by a source.
///
/// Premultiplied RGBA8, row-major, tightly packed. The buffer is shared so handing content to the
/// compositor every tick is a reference-count bump, not a copy. The buffer length always matches
/// the dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelContent {
    width: u32,
    height: u32,
    data: Arc<Vec<u8>>,
}

fn buffer_len(width: u32, height: u32) -> StudioResult<usize> {
    if width > MAX_CONTENT_DIM || height > MAX_CONTENT_DIM {
        return Err(StudioError::content(format!(
            "content {width}x{height} exceeds {MAX_CONTENT_DIM} pixels per side"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| StudioError::content("pixel buffer size overflow"))
}

impl PixelContent {
    /// Wrap a premultiplied RGBA8 buffer, checking that its length matches the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> StudioResult<Self> {
        let expected = buffer_len(width, height)?;
        if data.len() != expected {
            return Err(StudioError::content(format!(
                "pixel buffer has {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data: Arc::new(data),
        })
    }

    /// A buffer filled with one color.
    pub fn solid(width: u32, height: u32, color: Rgba8Premul) -> StudioResult<Self> {
        let len = buffer_len(width, height)? / 4;
        Ok(Self {
            width,
            height,
            data: Arc::new(color.to_array().repeat(len)),
        })
    }

    /// Zero-sized content. Paints nothing.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            data: Arc::new(Vec::new()),
        }
    }

    /// Same dimensions, new pixels. `data` must hold exactly as many bytes as `self`.
    pub(crate) fn with_pixels(&self, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), self.data.len());
        Self {
            width: self.width,
            height: self.height,
            data: Arc::new(data),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Premultiplied RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// `true` when both values hand out the same shared buffer.
    pub fn shares_buffer(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// `true` when the buffer length matches the dimensions.
    pub fn is_well_formed(&self) -> bool {
        buffer_len(self.width, self.height).is_ok_and(|len| len == self.data.len())
    }

    /// Size in pixels as floating point.
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// `true` when the buffer holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Read one pixel. Out-of-range coordinates return transparent.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0, 0];
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        match self.data.get(idx..idx + 4) {
            Some(px) => [px[0], px[1], px[2], px[3]],
            None => [0, 0, 0, 0],
        }
    }
}

/// Capability to turn a source reference into pixels.
///
/// Implementations must return immediately with whatever content is cached; the render loop calls
/// this for every visible item on every tick.
pub trait SourceContentProvider {
    /// Current content for `id`, or `None` when the source is unknown, stale, disabled or has
    /// nothing to show yet.
    fn resolve(&self, id: SourceId) -> Option<PixelContent>;

    /// Filters applied to the source's content before it is painted.
    fn filters(&self, _id: SourceId) -> &[Filter] {
        &[]
    }
}

/// Provider that resolves nothing. Every item paints as empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoContent;

impl SourceContentProvider for NoContent {
    fn resolve(&self, _id: SourceId) -> Option<PixelContent> {
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sources/content.rs"]
mod tests;
