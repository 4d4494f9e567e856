use std::fmt;

macro_rules! sequential_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
            serde::Deserialize,
        )]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

sequential_id!(
    /// Stable identity of a scene. Never reused within a store.
    SceneId,
    "scene"
);
sequential_id!(
    /// Stable identity of a scene item. Never reused within a store.
    SceneItemId,
    "item"
);
sequential_id!(
    /// Identity of a group of scene items inside one scene.
    GroupId,
    "group"
);
sequential_id!(
    /// Handle returned by observer registration.
    SubscriptionId,
    "sub"
);

/// Generational handle into the source registry.
///
/// Removing a source bumps the generation of its slot, so handles held by scene items go stale
/// instead of silently pointing at whatever source reuses the slot.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SourceId {
    /// Slot index in the registry.
    pub index: u32,
    /// Slot generation at the time the handle was issued.
    pub generation: u32,
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}v{}", self.index, self.generation)
    }
}

/// Monotonic allocator for the sequential ids above.
#[derive(Clone, Debug)]
pub(crate) struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub(crate) fn next(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Make sure ids handed out later are strictly greater than `seen`.
    pub(crate) fn observe(&mut self, seen: u64) {
        if seen >= self.next {
            self.next = seen + 1;
        }
    }
}
