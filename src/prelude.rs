//! # Clootie Prelude
//!
//! This module provides a convenient way to import commonly used types from
//! the container engine. It's designed to reduce boilerplate imports in
//! typical embedding code and tools.
//!
//! ## Usage
//!
//! ```rust
//! use clootie::prelude::*;
//!
//! let mut manager = clootie::default();
//! let cube = manager.add_object("Cube", Vector3::new(1.0, 1.0, 1.0), Vector3::zero());
//! let group = manager.create_from_selection(&[cube]).unwrap();
//! assert!(manager.object(group).unwrap().is_container());
//! ```

// Re-export the manager and its error surface
pub use crate::container::manager::{
    ChangeKind, ContainerManager, MAX_NESTING_DEPTH, MIN_CONTAINER_SIZE,
};
pub use crate::default;
pub use crate::error::ContainerError;

// Re-export scene model types
pub use crate::scene::{
    Axis, AxisSizing, ChildSizing, GridConfig, LayoutConfig, ObjectId, Padding, SceneObject,
    SceneRole, SizingMode,
};

// Re-export geometry types
pub use crate::geometry::{Aabb, Bounds, GeometryData, PrimitiveShellFactory, ShellFactory};

// Re-export layout and throttle building blocks
pub use crate::container::cache::{ManualClock, ResizeThrottle, SystemClock};
pub use crate::container::layout::ChildDescriptor;

// Re-export common external dependencies
pub use cgmath::{InnerSpace, Vector3, Zero};
