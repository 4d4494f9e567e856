use serde::{Deserialize, Serialize};

use crate::foundation::ids::{GroupId, SceneId, SceneItemId, SourceId};
use crate::transform::affine::Transform;

/// Placement of a source inside a scene.
///
/// The item references its source by handle only; removing the item never touches the source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneItem {
    /// Item identity, unique across the store.
    pub id: SceneItemId,
    /// Referenced source.
    pub source: SourceId,
    /// Per-placement transform.
    pub transform: Transform,
    /// Paint rank; 0 is painted first (furthest back).
    pub order: u32,
    /// Hidden items are skipped by the compositor, filters included.
    pub visible: bool,
    /// Locked items refuse transform updates.
    pub locked: bool,
    /// Optional group membership.
    pub group: Option<GroupId>,
}

/// One switchable composition of scene items.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Scene identity.
    pub id: SceneId,
    /// Operator-facing name.
    pub name: String,
    /// Disabled scenes still composite; the flag is for hosts that hide them from switchers.
    pub enabled: bool,
    /// Locked scenes refuse structural changes (add/remove/reorder items).
    pub locked: bool,
    // Kept sorted by `order`, which is dense 0..len.
    pub(crate) items: Vec<SceneItem>,
}

impl Scene {
    pub(crate) fn new(id: SceneId, name: String) -> Self {
        Self {
            id,
            name,
            enabled: true,
            locked: false,
            items: Vec::new(),
        }
    }

    /// Items in paint order (back to front).
    pub fn items(&self) -> &[SceneItem] {
        &self.items
    }

    /// Look up an item by id.
    pub fn item(&self, id: SceneItemId) -> Option<&SceneItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub(crate) fn item_mut(&mut self, id: SceneItemId) -> Option<&mut SceneItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    pub(crate) fn position(&self, id: SceneItemId) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    /// Visible items sorted back to front.
    ///
    /// Ties (which the store never produces) keep insertion order.
    pub fn visible_items(&self) -> Vec<&SceneItem> {
        let mut out: Vec<&SceneItem> = self.items.iter().filter(|i| i.visible).collect();
        out.sort_by_key(|i| i.order);
        out
    }

    /// Item ids in paint order.
    pub fn order_sequence(&self) -> Vec<SceneItemId> {
        self.items.iter().map(|i| i.id).collect()
    }

    pub(crate) fn renumber(&mut self) {
        for (rank, item) in self.items.iter_mut().enumerate() {
            item.order = rank as u32;
        }
    }
}

/// A named working set of scenes plus its bus pointers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneCollection {
    /// Collection name.
    pub name: String,
    /// Scenes in store order.
    pub scenes: Vec<Scene>,
    /// Active (program) scene.
    pub active: Option<SceneId>,
    /// Preview scene.
    #[serde(default)]
    pub preview: Option<SceneId>,
}

impl SceneCollection {
    /// Empty collection.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scenes: Vec::new(),
            active: None,
            preview: None,
        }
    }
}
