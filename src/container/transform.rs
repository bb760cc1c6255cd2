//! # Coordinate Transform Service
//!
//! Reparenting that never moves anything on screen. The service captures an
//! object's world transform, re-attaches it elsewhere in the scene graph,
//! and rewrites its local transform so the composed world transform comes
//! out identical. Because descendants compose through their parent, the
//! rewrite covers an entire nested subtree in one step — descendant locals
//! are untouched and their worlds are preserved by construction.
//!
//! Transforms are assumed shear-free (translation, rotation, per-axis
//! scale), which the rest of the crate guarantees; decomposition relies on
//! it.

use crate::error::ContainerError;
use crate::scene::graph::{NodeId, SceneGraph};
use cgmath::{InnerSpace, Matrix3, Matrix4, Quaternion, SquareMatrix, Vector3};
use log::warn;

/// Smallest scale magnitude treated as non-degenerate during decomposition
const SCALE_EPSILON: f32 = 1e-8;

/// Decompose a shear-free matrix into translation, rotation and scale
pub fn decompose(matrix: &Matrix4<f32>) -> (Vector3<f32>, Quaternion<f32>, Vector3<f32>) {
    let translation = matrix.w.truncate();

    let col_x = matrix.x.truncate();
    let col_y = matrix.y.truncate();
    let col_z = matrix.z.truncate();

    let scale = Vector3::new(col_x.magnitude(), col_y.magnitude(), col_z.magnitude());

    let safe_axis = |col: Vector3<f32>, mag: f32, fallback: Vector3<f32>| {
        if mag > SCALE_EPSILON {
            col / mag
        } else {
            fallback
        }
    };

    let rotation_matrix = Matrix3::from_cols(
        safe_axis(col_x, scale.x, Vector3::unit_x()),
        safe_axis(col_y, scale.y, Vector3::unit_y()),
        safe_axis(col_z, scale.z, Vector3::unit_z()),
    );

    let rotation = Quaternion::from(rotation_matrix).normalize();

    (translation, rotation, scale)
}

/// Compose translation, rotation and scale back into a matrix
pub fn compose(
    translation: Vector3<f32>,
    rotation: Quaternion<f32>,
    scale: Vector3<f32>,
) -> Matrix4<f32> {
    Matrix4::from_translation(translation)
        * Matrix4::from(rotation)
        * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z)
}

/// World-space position of a node
pub fn world_position(graph: &SceneGraph, node: NodeId) -> Option<Vector3<f32>> {
    graph.world_matrix(node).map(|m| m.w.truncate())
}

/// World-space translation, rotation and scale of a node
pub fn world_decomposed(
    graph: &SceneGraph,
    node: NodeId,
) -> Option<(Vector3<f32>, Quaternion<f32>, Vector3<f32>)> {
    graph.world_matrix(node).map(|m| decompose(&m))
}

/// Reparent `node` under `new_parent` (scene root when `None`) without
/// moving it in world space
///
/// Validation happens before any mutation: a missing node or parent fails
/// with `MissingTransformNode`, and a parent inside `node`'s own subtree
/// fails with `CyclicParentRejected` leaving the graph untouched. The
/// detach, attach and local-transform rewrite then happen as one step with
/// no observable intermediate state.
pub fn preserve_world_transform(
    graph: &mut SceneGraph,
    node: NodeId,
    new_parent: Option<NodeId>,
) -> Result<(), ContainerError> {
    let world = graph
        .world_matrix(node)
        .ok_or(ContainerError::MissingTransformNode)?;

    if let Some(parent) = new_parent {
        if graph.node(parent).is_none() {
            return Err(ContainerError::MissingTransformNode);
        }
        if parent == node || graph.is_ancestor(node, parent) {
            return Err(ContainerError::CyclicParentRejected);
        }
    }

    let parent_world = match new_parent {
        Some(parent) => graph
            .world_matrix(parent)
            .ok_or(ContainerError::MissingTransformNode)?,
        None => Matrix4::identity(),
    };

    let inv_parent = parent_world.invert().unwrap_or_else(|| {
        warn!("parent world matrix not invertible; treating as identity");
        Matrix4::identity()
    });

    #[cfg(debug_assertions)]
    let descendant_worlds: Vec<(NodeId, Vector3<f32>)> = graph
        .descendants(node)
        .into_iter()
        .filter_map(|d| world_position(graph, d).map(|p| (d, p)))
        .collect();

    let (position, rotation, scale) = decompose(&(inv_parent * world));

    match new_parent {
        Some(parent) => graph.attach(node, parent)?,
        None => graph.detach(node),
    }

    if let Some(n) = graph.node_mut(node) {
        n.position = position;
        n.rotation = rotation;
        n.scale = scale;
    }

    #[cfg(debug_assertions)]
    for (d, before) in descendant_worlds {
        if let Some(after) = world_position(graph, d) {
            let drift = after - before;
            debug_assert!(
                drift.magnitude() < 1e-3,
                "descendant {} drifted {:?} during reparent",
                d,
                drift
            );
        }
    }

    Ok(())
}
