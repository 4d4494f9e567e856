//! Scene graph store.
//!
//! Owns every scene and scene item of the current collection plus the program ("active") and
//! preview pointers. All operations are synchronous in-memory mutations. References to unknown
//! scenes, items or sources are logged and ignored (`false`/`None` return) rather than reported
//! as errors, since they usually come from UI races such as clicking a scene that was just
//! deleted.

use std::collections::BTreeMap;

use crate::events::StudioEvent;
use crate::foundation::ids::{GroupId, IdAllocator, SceneId, SceneItemId, SourceId};
use crate::scene::model::{Scene, SceneCollection, SceneItem};
use crate::sources::registry::SourceRegistry;
use crate::transform::affine::{Transform, TransformPatch};

/// Name of the collection a fresh store starts with.
pub const DEFAULT_COLLECTION: &str = "Untitled";

/// Relative item moves, expressed on top of [`SceneGraph::reorder_item`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemMove {
    /// One rank towards the front.
    Up,
    /// One rank towards the back.
    Down,
    /// Frontmost.
    Top,
    /// Backmost.
    Bottom,
}

/// In-memory scene graph.
#[derive(Debug)]
pub struct SceneGraph {
    scenes: Vec<Scene>,
    active: Option<SceneId>,
    preview: Option<SceneId>,

    scene_ids: IdAllocator,
    item_ids: IdAllocator,
    group_ids: IdAllocator,

    collection: String,
    stashed: BTreeMap<String, SceneCollection>,

    events: Vec<StudioEvent>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Empty store with the default collection.
    pub fn new() -> Self {
        Self {
            scenes: Vec::new(),
            active: None,
            preview: None,
            scene_ids: IdAllocator::default(),
            item_ids: IdAllocator::default(),
            group_ids: IdAllocator::default(),
            collection: DEFAULT_COLLECTION.to_owned(),
            stashed: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    /// Drain pending change notifications.
    pub fn take_events(&mut self) -> Vec<StudioEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- queries -------------------------------------------------------------------------

    /// Scenes in store order.
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Look up a scene.
    pub fn scene(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == id)
    }

    fn scene_mut(&mut self, id: SceneId) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|s| s.id == id)
    }

    /// `true` when `id` names an existing scene.
    pub fn contains_scene(&self, id: SceneId) -> bool {
        self.scene(id).is_some()
    }

    /// First scene with this exact name.
    pub fn scene_by_name(&self, name: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.name == name)
    }

    /// Current active (program) scene id.
    pub fn active_scene_id(&self) -> Option<SceneId> {
        self.active
    }

    /// Current active (program) scene.
    pub fn active_scene(&self) -> Option<&Scene> {
        self.active.and_then(|id| self.scene(id))
    }

    /// Current preview scene id.
    pub fn preview_scene_id(&self) -> Option<SceneId> {
        self.preview
    }

    /// First item in `scene` that references `source`.
    pub fn item_for_source(&self, scene: SceneId, source: SourceId) -> Option<SceneItemId> {
        self.scene(scene)?
            .items
            .iter()
            .find(|i| i.source == source)
            .map(|i| i.id)
    }

    // ---- scenes --------------------------------------------------------------------------

    /// Create an empty scene at the end of the store order.
    pub fn create_scene(&mut self, name: impl Into<String>) -> SceneId {
        let id = SceneId(self.scene_ids.next());
        let name = name.into();
        tracing::debug!(%id, name = %name, "scene created");
        self.scenes.push(Scene::new(id, name));
        self.events.push(StudioEvent::SceneCreated { scene: id });
        id
    }

    /// Delete a scene.
    ///
    /// If it was the active or preview scene, that pointer moves to the first remaining scene in
    /// store order, or to `None` when the store is now empty.
    pub fn delete_scene(&mut self, id: SceneId) -> bool {
        let Some(pos) = self.scenes.iter().position(|s| s.id == id) else {
            tracing::debug!(%id, "delete_scene ignored: unknown scene");
            return false;
        };
        self.scenes.remove(pos);
        self.events.push(StudioEvent::SceneRemoved { scene: id });

        let fallback = self.scenes.first().map(|s| s.id);
        if self.active == Some(id) {
            self.set_active_pointer(fallback);
        }
        if self.preview == Some(id) {
            self.set_preview_pointer(fallback);
        }
        true
    }

    /// Rename a scene.
    pub fn rename_scene(&mut self, id: SceneId, name: impl Into<String>) -> bool {
        let name = name.into();
        let Some(scene) = self.scene_mut(id) else {
            tracing::debug!(%id, "rename_scene ignored: unknown scene");
            return false;
        };
        scene.name = name.clone();
        self.events.push(StudioEvent::SceneRenamed { scene: id, name });
        true
    }

    /// Deep-copy a scene.
    ///
    /// The copy gets a fresh id, a fresh id for every item, and a `" (Copy)"` name suffix
    /// (`" (Copy 2)"`, `" (Copy 3)"`, ... when that name is taken). Items keep their source
    /// references and transform values; sources themselves are shared, not duplicated.
    pub fn duplicate_scene(&mut self, id: SceneId) -> Option<SceneId> {
        let Some(original) = self.scene(id).cloned() else {
            tracing::debug!(%id, "duplicate_scene ignored: unknown scene");
            return None;
        };

        let name = self.copy_name(&original.name);
        let copy_id = SceneId(self.scene_ids.next());
        let mut copy = Scene::new(copy_id, name);
        copy.enabled = original.enabled;

        let mut group_map = BTreeMap::<GroupId, GroupId>::new();
        for item in &original.items {
            let group = item.group.map(|g| {
                *group_map
                    .entry(g)
                    .or_insert_with(|| GroupId(self.group_ids.next()))
            });
            copy.items.push(SceneItem {
                id: SceneItemId(self.item_ids.next()),
                group,
                ..item.clone()
            });
        }

        self.scenes.push(copy);
        self.events.push(StudioEvent::SceneCreated { scene: copy_id });
        self.events.push(StudioEvent::SceneDuplicated {
            original: id,
            copy: copy_id,
        });
        Some(copy_id)
    }

    fn copy_name(&self, base: &str) -> String {
        let first = format!("{base} (Copy)");
        if self.scene_by_name(&first).is_none() {
            return first;
        }
        (2u32..)
            .map(|n| format!("{base} (Copy {n})"))
            .find(|candidate| self.scene_by_name(candidate).is_none())
            .unwrap_or(first)
    }

    /// Point the active (program) bus at `id`. Unknown ids are a no-op.
    pub fn set_active_scene(&mut self, id: SceneId) -> bool {
        if !self.contains_scene(id) {
            tracing::debug!(%id, "set_active_scene ignored: unknown scene");
            return false;
        }
        self.set_active_pointer(Some(id));
        true
    }

    /// Point the preview bus at `id`. Unknown ids are a no-op.
    pub fn set_preview_scene(&mut self, id: SceneId) -> bool {
        if !self.contains_scene(id) {
            tracing::debug!(%id, "set_preview_scene ignored: unknown scene");
            return false;
        }
        self.set_preview_pointer(Some(id));
        true
    }

    pub(crate) fn clear_preview(&mut self) {
        self.set_preview_pointer(None);
    }

    fn set_active_pointer(&mut self, current: Option<SceneId>) {
        let previous = self.active;
        if previous == current {
            return;
        }
        self.active = current;
        tracing::info!(?previous, ?current, "active scene changed");
        self.events
            .push(StudioEvent::ActiveSceneChanged { previous, current });
    }

    fn set_preview_pointer(&mut self, current: Option<SceneId>) {
        let previous = self.preview;
        if previous == current {
            return;
        }
        self.preview = current;
        tracing::debug!(?previous, ?current, "preview scene changed");
        self.events
            .push(StudioEvent::PreviewSceneChanged { previous, current });
    }

    /// Enable or disable a scene.
    pub fn set_scene_enabled(&mut self, id: SceneId, enabled: bool) -> bool {
        self.with_scene(id, "set_scene_enabled", |s| s.enabled = enabled)
    }

    /// Lock or unlock a scene's item list.
    pub fn set_scene_locked(&mut self, id: SceneId, locked: bool) -> bool {
        self.with_scene(id, "set_scene_locked", |s| s.locked = locked)
    }

    // ---- items ---------------------------------------------------------------------------

    /// Add `source` to `scene` on top of the existing items, with a default transform.
    pub fn add_source(
        &mut self,
        sources: &SourceRegistry,
        scene: SceneId,
        source: SourceId,
    ) -> Option<SceneItemId> {
        self.add_source_with(sources, scene, source, Transform::default())
    }

    /// Add `source` to `scene` on top of the existing items.
    pub fn add_source_with(
        &mut self,
        sources: &SourceRegistry,
        scene: SceneId,
        source: SourceId,
        transform: Transform,
    ) -> Option<SceneItemId> {
        if !sources.contains(source) {
            tracing::debug!(%scene, %source, "add_source ignored: unknown source");
            return None;
        }
        let item_id = SceneItemId(self.item_ids.next());
        let Some(s) = self.unlocked_scene_mut(scene, "add_source") else {
            return None;
        };
        let order = s.items.len() as u32;
        s.items.push(SceneItem {
            id: item_id,
            source,
            transform: transform.normalized(),
            order,
            visible: true,
            locked: false,
            group: None,
        });
        self.events.push(StudioEvent::SceneItemsChanged { scene });
        Some(item_id)
    }

    /// Remove an item. The referenced source is untouched.
    pub fn remove_item(&mut self, scene: SceneId, item: SceneItemId) -> bool {
        let Some(s) = self.unlocked_scene_mut(scene, "remove_item") else {
            return false;
        };
        let Some(pos) = s.position(item) else {
            tracing::debug!(%scene, %item, "remove_item ignored: unknown item");
            return false;
        };
        s.items.remove(pos);
        s.renumber();
        self.events.push(StudioEvent::SceneItemsChanged { scene });
        true
    }

    /// Move an item to paint rank `new_rank` (clamped), shifting the others, then renumber all
    /// ranks densely `0..n`.
    pub fn reorder_item(&mut self, scene: SceneId, item: SceneItemId, new_rank: u32) -> bool {
        let Some(s) = self.unlocked_scene_mut(scene, "reorder_item") else {
            return false;
        };
        let Some(pos) = s.position(item) else {
            tracing::debug!(%scene, %item, "reorder_item ignored: unknown item");
            return false;
        };
        let moved = s.items.remove(pos);
        let rank = (new_rank as usize).min(s.items.len());
        s.items.insert(rank, moved);
        s.renumber();
        self.events.push(StudioEvent::SceneItemsChanged { scene });
        true
    }

    /// Relative reorder helper.
    pub fn move_item(&mut self, scene: SceneId, item: SceneItemId, mv: ItemMove) -> bool {
        let Some(current) = self.scene(scene).and_then(|s| s.item(item)).map(|i| i.order) else {
            tracing::debug!(%scene, %item, "move_item ignored: unknown scene or item");
            return false;
        };
        let rank = match mv {
            ItemMove::Up => current.saturating_add(1),
            ItemMove::Down => current.saturating_sub(1),
            ItemMove::Top => u32::MAX,
            ItemMove::Bottom => 0,
        };
        self.reorder_item(scene, item, rank)
    }

    /// Merge a partial transform into an item's transform.
    pub fn update_item_transform(
        &mut self,
        scene: SceneId,
        item: SceneItemId,
        patch: &TransformPatch,
    ) -> bool {
        let Some(it) = self.item_mut(scene, item, "update_item_transform") else {
            return false;
        };
        if it.locked {
            tracing::debug!(%scene, %item, "update_item_transform ignored: item is locked");
            return false;
        }
        it.transform = patch.merge(it.transform);
        self.events
            .push(StudioEvent::ItemTransformChanged { scene, item });
        true
    }

    /// Replace an item's transform.
    pub fn set_item_transform(
        &mut self,
        scene: SceneId,
        item: SceneItemId,
        transform: Transform,
    ) -> bool {
        let Some(it) = self.item_mut(scene, item, "set_item_transform") else {
            return false;
        };
        if it.locked {
            tracing::debug!(%scene, %item, "set_item_transform ignored: item is locked");
            return false;
        }
        it.transform = transform.normalized();
        self.events
            .push(StudioEvent::ItemTransformChanged { scene, item });
        true
    }

    /// Show or hide an item.
    pub fn set_item_visible(&mut self, scene: SceneId, item: SceneItemId, visible: bool) -> bool {
        let Some(it) = self.item_mut(scene, item, "set_item_visible") else {
            return false;
        };
        it.visible = visible;
        self.events.push(StudioEvent::SceneItemsChanged { scene });
        true
    }

    /// Lock or unlock an item's transform.
    pub fn set_item_locked(&mut self, scene: SceneId, item: SceneItemId, locked: bool) -> bool {
        let Some(it) = self.item_mut(scene, item, "set_item_locked") else {
            return false;
        };
        it.locked = locked;
        self.events.push(StudioEvent::SceneItemsChanged { scene });
        true
    }

    /// Put items into a new group. Unknown item ids are skipped; `None` when none matched.
    pub fn group_items(&mut self, scene: SceneId, items: &[SceneItemId]) -> Option<GroupId> {
        let group = GroupId(self.group_ids.next());
        let s = self.unlocked_scene_mut(scene, "group_items")?;
        let mut matched = 0usize;
        for it in s.items.iter_mut().filter(|i| items.contains(&i.id)) {
            it.group = Some(group);
            matched += 1;
        }
        if matched == 0 {
            tracing::debug!(%scene, "group_items ignored: no known items");
            return None;
        }
        self.events.push(StudioEvent::SceneItemsChanged { scene });
        Some(group)
    }

    /// Dissolve a group; its items stay in place.
    pub fn ungroup(&mut self, scene: SceneId, group: GroupId) -> bool {
        let Some(s) = self.unlocked_scene_mut(scene, "ungroup") else {
            return false;
        };
        let mut matched = false;
        for it in s.items.iter_mut().filter(|i| i.group == Some(group)) {
            it.group = None;
            matched = true;
        }
        if matched {
            self.events.push(StudioEvent::SceneItemsChanged { scene });
        }
        matched
    }

    /// Set visibility of every item in a group.
    pub fn set_group_visible(&mut self, scene: SceneId, group: GroupId, visible: bool) -> bool {
        let Some(s) = self.scene_mut(scene) else {
            tracing::debug!(%scene, "set_group_visible ignored: unknown scene");
            return false;
        };
        let mut matched = false;
        for it in s.items.iter_mut().filter(|i| i.group == Some(group)) {
            it.visible = visible;
            matched = true;
        }
        if matched {
            self.events.push(StudioEvent::SceneItemsChanged { scene });
        }
        matched
    }

    /// Remove items whose source no longer exists in `sources`. Returns how many were removed.
    pub fn purge_stale_items(&mut self, sources: &SourceRegistry) -> usize {
        let mut removed = 0usize;
        for scene in &mut self.scenes {
            let before = scene.items.len();
            scene.items.retain(|i| sources.contains(i.source));
            let n = before - scene.items.len();
            if n > 0 {
                scene.renumber();
                removed += n;
                self.events
                    .push(StudioEvent::SceneItemsChanged { scene: scene.id });
            }
        }
        removed
    }

    fn with_scene(&mut self, id: SceneId, op: &str, f: impl FnOnce(&mut Scene)) -> bool {
        let Some(scene) = self.scene_mut(id) else {
            tracing::debug!(%id, op, "ignored: unknown scene");
            return false;
        };
        f(scene);
        self.events
            .push(StudioEvent::SceneItemsChanged { scene: id });
        true
    }

    fn unlocked_scene_mut(&mut self, id: SceneId, op: &str) -> Option<&mut Scene> {
        let Some(scene) = self.scenes.iter_mut().find(|s| s.id == id) else {
            tracing::debug!(%id, op, "ignored: unknown scene");
            return None;
        };
        if scene.locked {
            tracing::debug!(%id, op, "ignored: scene is locked");
            return None;
        }
        Some(scene)
    }

    fn item_mut(&mut self, scene: SceneId, item: SceneItemId, op: &str) -> Option<&mut SceneItem> {
        let Some(s) = self.scenes.iter_mut().find(|s| s.id == scene) else {
            tracing::debug!(%scene, op, "ignored: unknown scene");
            return None;
        };
        let found = s.item_mut(item);
        if found.is_none() {
            tracing::debug!(%scene, %item, op, "ignored: unknown item");
        }
        found
    }

    // ---- collections ---------------------------------------------------------------------

    /// Name of the collection currently loaded.
    pub fn current_collection(&self) -> &str {
        &self.collection
    }

    /// Names of every known collection, current one included, sorted.
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.stashed.keys().cloned().collect();
        names.push(self.collection.clone());
        names.sort();
        names
    }

    /// Snapshot of the current working set.
    pub fn collection_snapshot(&self) -> SceneCollection {
        SceneCollection {
            name: self.collection.clone(),
            scenes: self.scenes.clone(),
            active: self.active,
            preview: self.preview,
        }
    }

    /// Create a new empty collection and switch to it. The current one is kept for later
    /// [`load_collection`](Self::load_collection). Fails (no-op) if the name is taken.
    pub fn create_collection(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.has_collection(&name) {
            tracing::debug!(name = %name, "create_collection ignored: name taken");
            return false;
        }
        self.swap_in(SceneCollection::empty(name));
        true
    }

    /// Switch to a previously created or imported collection.
    pub fn load_collection(&mut self, name: &str) -> bool {
        if name == self.collection {
            return true;
        }
        let Some(next) = self.stashed.remove(name) else {
            tracing::debug!(name, "load_collection ignored: unknown collection");
            return false;
        };
        self.swap_in(next);
        true
    }

    /// Delete a stashed collection. The current collection cannot be deleted.
    pub fn delete_collection(&mut self, name: &str) -> bool {
        if name == self.collection {
            tracing::debug!(name, "delete_collection ignored: collection is loaded");
            return false;
        }
        self.stashed.remove(name).is_some()
    }

    /// Register a collection built elsewhere (e.g. restored by a persistence layer) without
    /// switching to it. Replaces a stashed collection of the same name; refuses the current one.
    pub fn import_collection(&mut self, collection: SceneCollection) -> bool {
        if collection.name == self.collection {
            tracing::debug!(name = %collection.name, "import_collection ignored: collection is loaded");
            return false;
        }
        for scene in &collection.scenes {
            self.scene_ids.observe(scene.id.0);
            for item in &scene.items {
                self.item_ids.observe(item.id.0);
                if let Some(g) = item.group {
                    self.group_ids.observe(g.0);
                }
            }
        }
        self.stashed.insert(collection.name.clone(), collection);
        true
    }

    fn has_collection(&self, name: &str) -> bool {
        name == self.collection || self.stashed.contains_key(name)
    }

    fn swap_in(&mut self, next: SceneCollection) {
        let current = SceneCollection {
            name: std::mem::replace(&mut self.collection, next.name.clone()),
            scenes: std::mem::replace(&mut self.scenes, sanitize(next.scenes)),
            active: self.active,
            preview: self.preview,
        };
        self.stashed.insert(current.name.clone(), current);

        let valid = |id: Option<SceneId>, scenes: &[Scene]| {
            id.filter(|id| scenes.iter().any(|s| s.id == *id))
        };
        let active = valid(next.active, &self.scenes);
        let preview = valid(next.preview, &self.scenes);
        self.set_active_pointer(active);
        self.set_preview_pointer(preview);

        tracing::info!(collection = %self.collection, "scene collection loaded");
        self.events.push(StudioEvent::CollectionChanged {
            name: self.collection.clone(),
        });
    }
}

// Restore the dense-order invariant on scenes that came from outside the store.
fn sanitize(mut scenes: Vec<Scene>) -> Vec<Scene> {
    for scene in &mut scenes {
        scene.items.sort_by_key(|i| i.order);
        scene.renumber();
        for item in &mut scene.items {
            item.transform = item.transform.normalized();
        }
    }
    scenes
}

#[cfg(test)]
#[path = "../../tests/unit/scene/store.rs"]
mod tests;
