//! Source registry.
//!
//! Sources live in an id-indexed arena. Scene items only hold a [`SourceId`]; removing a source
//! bumps its slot generation so stale handles resolve to nothing instead of to whatever source
//! takes the slot next.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::effects::filters::{Filter, apply_filters};
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{StudioError, StudioResult};
use crate::foundation::ids::SourceId;
use crate::sources::content::{MAX_CONTENT_DIM, PixelContent, SourceContentProvider};
use crate::sources::decode::load_image_file;

/// Unknown, forward-compatible settings.
pub type ExtraSettings = BTreeMap<String, serde_json::Value>;

/// Kind of content producer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Camera or capture card.
    CaptureDevice,
    /// Whole display capture.
    ScreenCapture,
    /// Single window capture.
    WindowCapture,
    /// Still image.
    Image,
    /// Rendered text.
    Text,
    /// Embedded browser page.
    Browser,
    /// Video/audio file playback.
    Media,
    /// Solid color.
    Color,
    /// Game capture hook.
    GameCapture,
}

/// Type-specific source settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum SourceSettings {
    /// Solid color of a fixed size.
    Color {
        /// Straight-alpha RGBA.
        rgba: [u8; 4],
        width: u32,
        height: u32,
        #[serde(default)]
        extra: ExtraSettings,
    },
    /// Still image loaded from disk once, when the source is added.
    Image {
        path: PathBuf,
        #[serde(default)]
        extra: ExtraSettings,
    },
    /// Text. Content is rendered by the host and pushed in.
    Text {
        text: String,
        #[serde(default = "default_font_size")]
        font_size: f32,
        #[serde(default = "default_text_color")]
        color: [u8; 4],
        #[serde(default)]
        extra: ExtraSettings,
    },
    /// Browser page. Content is pushed in by the host.
    Browser {
        url: String,
        width: u32,
        height: u32,
        #[serde(default)]
        extra: ExtraSettings,
    },
    /// Media playback. Content is pushed in by the host decoder.
    Media {
        path: PathBuf,
        #[serde(default)]
        looping: bool,
        #[serde(default)]
        extra: ExtraSettings,
    },
    /// Capture device.
    CaptureDevice {
        device: String,
        #[serde(default)]
        extra: ExtraSettings,
    },
    /// Display capture.
    ScreenCapture {
        #[serde(default)]
        display: u32,
        #[serde(default)]
        extra: ExtraSettings,
    },
    /// Window capture.
    WindowCapture {
        window: String,
        #[serde(default)]
        extra: ExtraSettings,
    },
    /// Game capture.
    GameCapture {
        target: String,
        #[serde(default)]
        extra: ExtraSettings,
    },
}

fn default_font_size() -> f32 {
    48.0
}

fn default_text_color() -> [u8; 4] {
    [255, 255, 255, 255]
}

impl SourceSettings {
    /// The kind these settings configure.
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Color { .. } => SourceKind::Color,
            Self::Image { .. } => SourceKind::Image,
            Self::Text { .. } => SourceKind::Text,
            Self::Browser { .. } => SourceKind::Browser,
            Self::Media { .. } => SourceKind::Media,
            Self::CaptureDevice { .. } => SourceKind::CaptureDevice,
            Self::ScreenCapture { .. } => SourceKind::ScreenCapture,
            Self::WindowCapture { .. } => SourceKind::WindowCapture,
            Self::GameCapture { .. } => SourceKind::GameCapture,
        }
    }

    /// Unknown options carried along untouched.
    pub fn extra(&self) -> &ExtraSettings {
        match self {
            Self::Color { extra, .. }
            | Self::Image { extra, .. }
            | Self::Text { extra, .. }
            | Self::Browser { extra, .. }
            | Self::Media { extra, .. }
            | Self::CaptureDevice { extra, .. }
            | Self::ScreenCapture { extra, .. }
            | Self::WindowCapture { extra, .. }
            | Self::GameCapture { extra, .. } => extra,
        }
    }

    /// Reject fixed dimensions that cannot be allocated as content.
    pub fn validate(&self) -> StudioResult<()> {
        match self {
            Self::Color { width, height, .. } | Self::Browser { width, height, .. } => {
                if *width > MAX_CONTENT_DIM || *height > MAX_CONTENT_DIM {
                    return Err(StudioError::validation(format!(
                        "{:?} source {width}x{height} exceeds {MAX_CONTENT_DIM} pixels per side",
                        self.kind()
                    )));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Solid color settings with no extra options.
    pub fn color(rgba: [u8; 4], width: u32, height: u32) -> Self {
        Self::Color {
            rgba,
            width,
            height,
            extra: ExtraSettings::new(),
        }
    }

    /// Capture device settings with no extra options.
    pub fn capture_device(device: impl Into<String>) -> Self {
        Self::CaptureDevice {
            device: device.into(),
            extra: ExtraSettings::new(),
        }
    }
}

/// A registered content producer.
#[derive(Clone, Debug)]
pub struct Source {
    /// Operator-facing name.
    pub name: String,
    /// Type-specific settings.
    pub settings: SourceSettings,
    /// Disabled sources resolve to nothing.
    pub enabled: bool,
    /// Audio volume in `[0, 1]`.
    pub volume: f32,
    /// Audio mute.
    pub muted: bool,
    /// Locked sources refuse settings changes from the UI.
    pub locked: bool,
    /// Hidden sources resolve to nothing in every scene.
    pub visible: bool,
    /// Filters applied before painting.
    pub filters: Vec<Filter>,
    content: Option<PixelContent>,
}

impl Source {
    /// Kind of this source.
    pub fn kind(&self) -> SourceKind {
        self.settings.kind()
    }

    /// Most recent content, if any.
    pub fn content(&self) -> Option<&PixelContent> {
        self.content.as_ref()
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    source: Option<Source>,
}

/// Arena of sources addressed by generational [`SourceId`]s.
#[derive(Clone, Debug, Default)]
pub struct SourceRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl SourceRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source and prepare its static content.
    ///
    /// Color sources get a solid buffer. Image sources are decoded here, once; a decode failure
    /// is logged and leaves the source without content.
    pub fn add(&mut self, name: impl Into<String>, settings: SourceSettings) -> SourceId {
        let name = name.into();
        let content = initial_content(&name, &settings);
        let source = Source {
            name,
            settings,
            enabled: true,
            volume: 1.0,
            muted: false,
            locked: false,
            visible: true,
            filters: Vec::new(),
            content,
        };

        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.source = Some(source);
                SourceId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
                self.slots.push(Slot {
                    generation: 0,
                    source: Some(source),
                });
                SourceId {
                    index,
                    generation: 0,
                }
            }
        };
        tracing::debug!(%id, "source added");
        id
    }

    /// Remove a source. Handles to it go stale. Returns `false` for unknown or stale ids.
    pub fn remove(&mut self, id: SourceId) -> bool {
        let Some(slot) = self.slot_mut(id) else {
            tracing::debug!(%id, "remove ignored: unknown source");
            return false;
        };
        slot.source = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        tracing::debug!(%id, "source removed");
        true
    }

    /// `true` when `id` refers to a live source.
    pub fn contains(&self, id: SourceId) -> bool {
        self.get(id).is_some()
    }

    /// Borrow a live source.
    pub fn get(&self, id: SourceId) -> Option<&Source> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.source.as_ref()
    }

    /// Mutably borrow a live source.
    pub fn get_mut(&mut self, id: SourceId) -> Option<&mut Source> {
        self.slot_mut(id)?.source.as_mut()
    }

    fn slot_mut(&mut self, id: SourceId) -> Option<&mut Slot> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation || slot.source.is_none() {
            return None;
        }
        Some(slot)
    }

    /// First live source with this exact name.
    pub fn find_by_name(&self, name: &str) -> Option<SourceId> {
        self.iter()
            .find(|(_, s)| s.name == name)
            .map(|(id, _)| id)
    }

    /// Iterate live sources in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SourceId, &Source)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.source.as_ref().map(|s| {
                (
                    SourceId {
                        index: i as u32,
                        generation: slot.generation,
                    },
                    s,
                )
            })
        })
    }

    /// Number of live sources.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.source.is_some()).count()
    }

    /// `true` when no source is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rename a source.
    pub fn rename(&mut self, id: SourceId, name: impl Into<String>) -> bool {
        self.update(id, "rename", |s| s.name = name.into())
    }

    /// Enable or disable a source.
    pub fn set_enabled(&mut self, id: SourceId, enabled: bool) -> bool {
        self.update(id, "set_enabled", |s| s.enabled = enabled)
    }

    /// Show or hide a source everywhere it is used.
    pub fn set_visible(&mut self, id: SourceId, visible: bool) -> bool {
        self.update(id, "set_visible", |s| s.visible = visible)
    }

    /// Lock or unlock a source.
    pub fn set_locked(&mut self, id: SourceId, locked: bool) -> bool {
        self.update(id, "set_locked", |s| s.locked = locked)
    }

    /// Set audio volume, clamped to `[0, 1]`.
    pub fn set_volume(&mut self, id: SourceId, volume: f32) -> bool {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.update(id, "set_volume", |s| s.volume = volume)
    }

    /// Mute or unmute audio.
    pub fn set_muted(&mut self, id: SourceId, muted: bool) -> bool {
        self.update(id, "set_muted", |s| s.muted = muted)
    }

    /// Append a filter. Invalid filters are rejected and logged.
    pub fn add_filter(&mut self, id: SourceId, filter: Filter) -> bool {
        if let Err(e) = filter.validate() {
            tracing::warn!(%id, error = %e, "filter rejected");
            return false;
        }
        self.update(id, "add_filter", |s| s.filters.push(filter))
    }

    /// Remove the first filter named `name`.
    pub fn remove_filter(&mut self, id: SourceId, name: &str) -> bool {
        let Some(source) = self.get_mut(id) else {
            tracing::debug!(%id, "remove_filter ignored: unknown source");
            return false;
        };
        match source.filters.iter().position(|f| f.name == name) {
            Some(pos) => {
                source.filters.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Replace the whole filter list. Invalid filters are dropped and logged.
    pub fn set_filters(&mut self, id: SourceId, filters: Vec<Filter>) -> bool {
        let filters = filters
            .into_iter()
            .filter(|f| match f.validate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(%id, filter = %f.name, error = %e, "filter dropped");
                    false
                }
            })
            .collect();
        self.update(id, "set_filters", |s| s.filters = filters)
    }

    /// Replace a source's settings and rebuild any static content.
    pub fn update_settings(&mut self, id: SourceId, settings: SourceSettings) -> bool {
        let Some(source) = self.get_mut(id) else {
            tracing::debug!(%id, "update_settings ignored: unknown source");
            return false;
        };
        source.content = initial_content(&source.name, &settings);
        source.settings = settings;
        true
    }

    /// Publish the latest frame of a live source (capture, media, browser, text).
    ///
    /// Hosts call this from their own decode/capture path; the compositor only ever reads the
    /// most recent value.
    pub fn push_content(&mut self, id: SourceId, content: PixelContent) -> bool {
        self.update(id, "push_content", |s| s.content = Some(content))
    }

    /// Drop a source's content so it resolves to nothing until new content arrives.
    pub fn clear_content(&mut self, id: SourceId) -> bool {
        self.update(id, "clear_content", |s| s.content = None)
    }

    fn update(&mut self, id: SourceId, op: &str, f: impl FnOnce(&mut Source)) -> bool {
        match self.get_mut(id) {
            Some(source) => {
                f(source);
                true
            }
            None => {
                tracing::debug!(%id, op, "ignored: unknown source");
                false
            }
        }
    }
}

fn initial_content(name: &str, settings: &SourceSettings) -> Option<PixelContent> {
    match settings {
        SourceSettings::Color {
            rgba,
            width,
            height,
            ..
        } => {
            let color = Rgba8Premul::from_straight_rgba(rgba[0], rgba[1], rgba[2], rgba[3]);
            match PixelContent::solid(*width, *height, color) {
                Ok(content) => Some(content),
                Err(e) => {
                    tracing::warn!(source = name, error = %e, "color source has no content");
                    None
                }
            }
        }
        SourceSettings::Image { path, .. } => match load_image_file(path) {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::warn!(source = name, path = %path.display(), error = %e, "image source has no content");
                None
            }
        },
        _ => None,
    }
}

impl SourceContentProvider for SourceRegistry {
    fn resolve(&self, id: SourceId) -> Option<PixelContent> {
        let source = self.get(id)?;
        if !source.enabled || !source.visible {
            return None;
        }
        source.content.clone()
    }

    fn filters(&self, id: SourceId) -> &[Filter] {
        self.get(id).map(|s| s.filters.as_slice()).unwrap_or(&[])
    }
}

/// Resolve a source and run its filters.
pub fn resolve_filtered(
    provider: &dyn SourceContentProvider,
    id: SourceId,
) -> Option<PixelContent> {
    let content = provider.resolve(id)?;
    if !content.is_well_formed() {
        tracing::debug!(%id, "ignored: malformed source content");
        return None;
    }
    let filtered = apply_filters(&content, provider.filters(id));
    if filtered.is_empty() {
        return None;
    }
    Some(filtered)
}

#[cfg(test)]
#[path = "../../tests/unit/sources/registry.rs"]
mod tests;
