//! # Object Registry
//!
//! Canonical id -> metadata store for scene objects, with a reverse map from
//! transform nodes back to ids. The registry is an explicit service owned by
//! the container manager and passed by reference where needed — nothing in
//! this crate reaches for ambient global state.

use crate::scene::graph::NodeId;
use crate::scene::object::{ObjectId, SceneObject};
use std::collections::HashMap;

/// Registry of scene objects keyed by stable identifier
pub struct SceneRegistry {
    objects: HashMap<ObjectId, SceneObject>,
    by_node: HashMap<NodeId, ObjectId>,
    next_id: ObjectId,
}

impl SceneRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            by_node: HashMap::new(),
            next_id: 1,
        }
    }

    /// Allocate the next object id without registering anything
    pub fn allocate_id(&mut self) -> ObjectId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Insert a fully built object under its own id
    pub fn insert(&mut self, object: SceneObject) {
        self.by_node.insert(object.node, object.id);
        self.objects.insert(object.id, object);
    }

    /// Remove an object, returning its metadata
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let object = self.objects.remove(&id)?;
        self.by_node.remove(&object.node);
        Some(object)
    }

    /// Shared access by id
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Mutable access by id
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    /// Look up the object owning a transform node
    pub fn object_by_node(&self, node: NodeId) -> Option<&SceneObject> {
        self.by_node.get(&node).and_then(|id| self.objects.get(id))
    }

    /// Number of registered objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate over all objects in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    /// Ids of all direct children of a container, in unspecified order
    ///
    /// Ordered traversal (layout, bounds fitting) goes through the scene
    /// graph's child list instead; this is the registry-side view used for
    /// consistency checks and bulk queries.
    pub fn child_ids(&self, container: ObjectId) -> Vec<ObjectId> {
        self.objects
            .values()
            .filter(|o| o.parent_container == Some(container))
            .map(|o| o.id)
            .collect()
    }

    /// Produce a display name not yet used by any object
    pub fn ensure_unique_name(&self, desired_name: &str) -> String {
        let mut counter = 0;
        let mut test_name = desired_name.to_string();

        while self.objects.values().any(|obj| obj.name == test_name) {
            counter += 1;
            test_name = format!("{} ({})", desired_name, counter);
        }

        test_name
    }
}

impl Default for SceneRegistry {
    fn default() -> Self {
        Self::new()
    }
}
