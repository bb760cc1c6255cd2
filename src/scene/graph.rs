//! # Scene Graph
//!
//! Arena-backed transform hierarchy. Nodes hold a local
//! translation/rotation/scale and compose world matrices through their
//! ancestor chain on demand; parent/child wiring is managed exclusively
//! through [`SceneGraph::attach`] and [`SceneGraph::detach`] so the cycle
//! check cannot be bypassed.
//!
//! The arena hands out plain index handles. Removed slots go onto a free
//! list and are reused, which keeps structural snapshots a flat copy of the
//! backing storage rather than a deep clone of a pointer tree.

use crate::error::ContainerError;
use crate::geometry::Aabb;
use crate::scene::object::SceneRole;
use cgmath::{Matrix4, Quaternion, SquareMatrix, Vector3};
use log::warn;

/// Index handle to a node in the scene graph arena
pub type NodeId = usize;

/// A transform node: local TRS plus hierarchy wiring
#[derive(Debug, Clone)]
pub struct TransformNode {
    /// Translation relative to the parent
    pub position: Vector3<f32>,
    /// Rotation relative to the parent
    pub rotation: Quaternion<f32>,
    /// Per-axis scale relative to the parent
    pub scale: Vector3<f32>,
    /// Bounding box of the node's own geometry in its local space
    pub local_bounds: Aabb,
    /// Role tag, matched exhaustively by interaction code
    pub role: SceneRole,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TransformNode {
    fn new(role: SceneRole) -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            local_bounds: Aabb::from_size(Vector3::new(1.0, 1.0, 1.0)),
            role,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Parent node, `None` for root-level nodes
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direct children in attachment order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Local transform matrix, composed translation * rotation * scale
    pub fn local_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

/// Arena of transform nodes with free-slot reuse
pub struct SceneGraph {
    nodes: Vec<Option<TransformNode>>,
    free: Vec<NodeId>,
}

impl SceneGraph {
    /// Create an empty scene graph
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Insert a new root-level node with identity transform
    pub fn insert(&mut self, role: SceneRole) -> NodeId {
        let node = TransformNode::new(role);
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    /// Remove a node, detaching it from its parent first
    ///
    /// Any children still attached are moved to the root level; the
    /// container manager rehomes children before removal, so hitting that
    /// path indicates a caller bug and is logged.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if self.node(id).is_none() {
            return false;
        }

        self.detach(id);

        let children = self
            .node(id)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        if !children.is_empty() {
            warn!(
                "removing node {} with {} children still attached",
                id,
                children.len()
            );
        }
        for child in children {
            self.detach(child);
        }

        self.nodes[id] = None;
        self.free.push(id);
        true
    }

    /// Shared access to a node
    pub fn node(&self, id: NodeId) -> Option<&TransformNode> {
        self.nodes.get(id).and_then(|slot| slot.as_ref())
    }

    /// Mutable access to a node's transform and bounds
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut TransformNode> {
        self.nodes.get_mut(id).and_then(|slot| slot.as_mut())
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether the graph holds no live nodes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attach `child` under `parent`, rejecting cycles
    ///
    /// The child keeps its local transform; callers that need the child to
    /// stay put in world space go through the coordinate transform service
    /// instead of calling this directly.
    pub fn attach(&mut self, child: NodeId, parent: NodeId) -> Result<(), ContainerError> {
        if self.node(child).is_none() || self.node(parent).is_none() {
            return Err(ContainerError::MissingTransformNode);
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(ContainerError::CyclicParentRejected);
        }

        self.detach(child);

        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        Ok(())
    }

    /// Detach `child` from its parent, leaving it at the root level
    pub fn detach(&mut self, child: NodeId) {
        let parent = match self.node(child).and_then(|n| n.parent) {
            Some(p) => p,
            None => return,
        };

        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|&c| c != child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = None;
        }
    }

    /// Whether `ancestor` appears on `node`'s parent chain
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.node(node).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).and_then(|n| n.parent);
        }
        false
    }

    /// Number of ancestors above a node
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.node(id).and_then(|n| n.parent);
        while let Some(p) = current {
            depth += 1;
            current = self.node(p).and_then(|n| n.parent);
        }
        depth
    }

    /// All descendants of a node, depth-first
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .node(id)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        while let Some(n) = stack.pop() {
            out.push(n);
            if let Some(node) = self.node(n) {
                stack.extend_from_slice(&node.children);
            }
        }
        out
    }

    /// World transform matrix, composed through the ancestor chain
    pub fn world_matrix(&self, id: NodeId) -> Option<Matrix4<f32>> {
        let node = self.node(id)?;
        let local = node.local_matrix();
        match node.parent {
            Some(parent) => self.world_matrix(parent).map(|m| m * local),
            None => Some(local),
        }
    }

    /// World matrix of a node's parent, identity for root-level nodes
    pub fn parent_world_matrix(&self, id: NodeId) -> Option<Matrix4<f32>> {
        let node = self.node(id)?;
        match node.parent {
            Some(parent) => self.world_matrix(parent),
            None => Some(Matrix4::identity()),
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
