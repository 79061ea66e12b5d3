#![forbid(unsafe_code)]

use core::fmt;

use rustc_hash::FxHashMap;

use crate::component::Component;
use crate::protocol::NodeId;

/// One live node: its component and the node it was last added under.
pub struct Entry {
    pub component: Box<dyn Component>,
    /// Non-owning; only used to route `remove`.
    pub parent: Option<NodeId>,
}

impl Entry {
    #[must_use]
    pub fn new(component: Box<dyn Component>) -> Self {
        Self {
            component,
            parent: None,
        }
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("variant", &self.component.variant())
            .field("primitive", &self.component.primitive())
            .field("parent", &self.parent)
            .finish()
    }
}

/// Live nodes by id. An id is present exactly from its `make-node` until its
/// `destroy`.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    entries: FxHashMap<NodeId, Entry>,
}

impl NodeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `entry`, returning the entry it displaced.
    pub fn insert(&mut self, id: NodeId, entry: Entry) -> Option<Entry> {
        self.entries.insert(id, entry)
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Entry> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Entry> {
        self.entries.get_mut(&id)
    }

    pub fn remove(&mut self, id: NodeId) -> Option<Entry> {
        self.entries.remove(&id)
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.entries.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Live ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Record (or clear) the parent of a live node. Returns `false` when `id`
    /// is not live.
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.parent = parent;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.entries.get(&id).and_then(|entry| entry.parent)
    }

    /// Clear the parent link of every node recorded under `parent`, returning
    /// their ids in ascending order.
    pub fn orphan_children(&mut self, parent: NodeId) -> Vec<NodeId> {
        let mut orphaned = Vec::new();
        for (id, entry) in &mut self.entries {
            if entry.parent == Some(parent) {
                entry.parent = None;
                orphaned.push(*id);
            }
        }
        orphaned.sort_unstable();
        orphaned
    }
}
