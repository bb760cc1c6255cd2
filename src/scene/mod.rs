//! # Scene Model
//!
//! The two stores that together describe the scene: the transform-node
//! arena ([`graph::SceneGraph`]) owning parent/child spatial relationships,
//! and the object registry ([`registry::SceneRegistry`]) owning everything
//! else about an object. Container operations mutate both in lockstep;
//! keeping the two views in agreement is one of the core invariants of the
//! crate.

pub mod graph;
pub mod object;
pub mod registry;

pub use graph::{NodeId, SceneGraph, TransformNode};
pub use object::{
    Axis, AxisSizing, ChildSizing, GridConfig, LayoutConfig, ObjectId, Padding, SceneObject,
    SceneRole, SizingMode,
};
pub use registry::SceneRegistry;
