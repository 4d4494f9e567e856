//! JSON show files: a config plus the sources and scenes to bootstrap a [`Studio`] with.
//!
//! Sources and scene items are wired up by name so the file stays hand-editable. Building is
//! strict: unknown names, duplicates and invalid filters are [`StudioError::Validation`]
//! errors, unlike live operator commands which are ignored.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::StudioConfig;
use crate::effects::filters::Filter;
use crate::foundation::clock::SharedClock;
use crate::foundation::error::{StudioError, StudioResult};
use crate::foundation::ids::SceneId;
use crate::session::studio::Studio;
use crate::sources::registry::SourceSettings;
use crate::transform::affine::Transform;
use crate::transition::descriptor::TransitionDescriptor;

/// Top-level show document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShowFile {
    /// Engine configuration.
    #[serde(default)]
    pub config: StudioConfig,
    /// Sources, registered in order.
    #[serde(default)]
    pub sources: Vec<SourceDef>,
    /// Scenes, created in order.
    #[serde(default)]
    pub scenes: Vec<SceneDef>,
    /// Initial program scene by name. Defaults to the first scene.
    #[serde(default)]
    pub active: Option<String>,
    /// Enables Studio Mode when present.
    #[serde(default)]
    pub studio: Option<StudioDef>,
}

/// One source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceDef {
    /// Unique source name.
    pub name: String,
    /// Kind and kind-specific settings.
    pub settings: SourceSettings,
    /// Filter chain.
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default = "yes")]
    #[allow(missing_docs)]
    pub enabled: bool,
    #[serde(default = "yes")]
    #[allow(missing_docs)]
    pub visible: bool,
    /// Audio volume in `[0, 1]`.
    #[serde(default = "full_volume")]
    pub volume: f32,
    #[serde(default)]
    #[allow(missing_docs)]
    pub muted: bool,
}

/// One scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDef {
    /// Unique scene name.
    pub name: String,
    /// Items bottom to top.
    #[serde(default)]
    pub items: Vec<ItemDef>,
    /// Lock the scene after its items are placed.
    #[serde(default)]
    pub locked: bool,
}

/// One scene item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemDef {
    /// Name of a source declared in [`ShowFile::sources`].
    pub source: String,
    #[serde(default)]
    #[allow(missing_docs)]
    pub transform: Transform,
    #[serde(default = "yes")]
    #[allow(missing_docs)]
    pub visible: bool,
    #[serde(default)]
    #[allow(missing_docs)]
    pub locked: bool,
}

/// Studio Mode section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudioDef {
    /// Program scene by name. Defaults to the initial active scene.
    #[serde(default)]
    pub program: Option<String>,
    /// Preview scene by name. Defaults to the program scene.
    #[serde(default)]
    pub preview: Option<String>,
    /// Overrides `config.default_transition` for `take`.
    #[serde(default)]
    pub transition: Option<TransitionDescriptor>,
}

fn yes() -> bool {
    true
}

fn full_volume() -> f32 {
    1.0
}

impl ShowFile {
    /// Parse a show document. Relative file paths are left as written.
    pub fn from_json(text: &str) -> StudioResult<Self> {
        let show: Self = serde_json::from_str(text)?;
        show.config.validate()?;
        Ok(show)
    }

    /// Read a show file from disk, resolving relative image and media paths against the
    /// file's directory.
    pub fn load(path: impl AsRef<Path>) -> StudioResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            StudioError::validation(format!("read show file '{}': {e}", path.display()))
        })?;
        let mut show = Self::from_json(&text)?;
        if let Some(base) = path.parent() {
            show.resolve_paths(base);
        }
        Ok(show)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for def in &mut self.sources {
            if let SourceSettings::Image { path, .. } | SourceSettings::Media { path, .. } =
                &mut def.settings
                && path.is_relative()
            {
                *path = base.join(&*path);
            }
        }
    }

    /// Build a session. Sources are registered first, then scenes and their items, then the
    /// active scene and Studio Mode are applied.
    pub fn build(&self, clock: SharedClock) -> StudioResult<Studio> {
        let mut studio = Studio::new(self.config.clone(), clock)?;

        for def in &self.sources {
            if studio.sources().find_by_name(&def.name).is_some() {
                return Err(StudioError::validation(format!(
                    "duplicate source name '{}'",
                    def.name
                )));
            }
            def.settings.validate()?;
            for filter in &def.filters {
                filter.validate()?;
            }
            let id = studio.add_source(def.name.clone(), def.settings.clone());
            let registry = studio.sources_mut();
            registry.set_filters(id, def.filters.clone());
            registry.set_enabled(id, def.enabled);
            registry.set_visible(id, def.visible);
            registry.set_volume(id, def.volume);
            registry.set_muted(id, def.muted);
        }

        for def in &self.scenes {
            if studio.graph().scene_by_name(&def.name).is_some() {
                return Err(StudioError::validation(format!(
                    "duplicate scene name '{}'",
                    def.name
                )));
            }
            let scene = studio.create_scene(def.name.clone());
            for item in &def.items {
                let source = studio.sources().find_by_name(&item.source).ok_or_else(|| {
                    StudioError::validation(format!(
                        "scene '{}' references unknown source '{}'",
                        def.name, item.source
                    ))
                })?;
                let id = studio
                    .add_to_scene_with(scene, source, item.transform)
                    .ok_or_else(|| {
                        StudioError::validation(format!(
                            "could not place '{}' in scene '{}'",
                            item.source, def.name
                        ))
                    })?;
                if !item.visible {
                    studio.set_item_visible(scene, id, false);
                }
                if item.locked {
                    studio.set_item_locked(scene, id, true);
                }
            }
            if def.locked {
                studio.edit(|graph, _| graph.set_scene_locked(scene, true));
            }
        }

        let active = match &self.active {
            Some(name) => Some(scene_id(&studio, name)?),
            None => studio.graph().scenes().first().map(|s| s.id),
        };
        if let Some(id) = active {
            studio.set_active_scene(id);
        }

        if let Some(def) = &self.studio {
            if let Some(t) = &def.transition {
                studio.set_default_transition(t.clone());
            }
            let program = match &def.program {
                Some(name) => scene_id(&studio, name)?,
                None => active.ok_or_else(|| {
                    StudioError::validation("studio mode needs at least one scene")
                })?,
            };
            let preview = def
                .preview
                .as_deref()
                .map(|name| scene_id(&studio, name))
                .transpose()?;
            studio.enable_studio_mode(program, preview);
        }

        tracing::info!(
            sources = self.sources.len(),
            scenes = self.scenes.len(),
            "show loaded"
        );
        Ok(studio)
    }
}

fn scene_id(studio: &Studio, name: &str) -> StudioResult<SceneId> {
    studio
        .graph()
        .scene_by_name(name)
        .map(|s| s.id)
        .ok_or_else(|| StudioError::validation(format!("unknown scene '{name}'")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/show.rs"]
mod tests;
