//! # Container Geometry
//!
//! Bounding-volume math and the shell geometry that visualizes a container.
//! The renderer itself lives outside this crate; the [`ShellFactory`] trait
//! is the seam through which the container manager asks for geometry and,
//! just as importantly, releases it. Shell resources are rebuilt on every
//! size change, so leaked handles grow without bound if release is skipped.
//!
//! ## Usage
//!
//! ```rust
//! use clootie::geometry::{PrimitiveShellFactory, ShellFactory};
//! use cgmath::Vector3;
//!
//! let mut factory = PrimitiveShellFactory::new();
//! factory.build_shell(1, Vector3::new(2.0, 1.0, 1.0));
//! factory.release(1);
//! assert_eq!(factory.live_count(), 0);
//! ```

pub mod bounds;
pub mod primitives;

pub use bounds::{clamp_size, delta_signs, size_differs, unified_bounds, Aabb, Bounds, LocalBox};
pub use primitives::{generate_box, generate_unit_box};

use cgmath::Vector3;
use log::debug;
use std::collections::HashMap;

/// Represents generated geometry data ready for upload by a renderer
#[derive(Debug, Clone)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            tex_coords: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

impl Default for GeometryData {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds and releases shell geometry for containers
///
/// Implementations own whatever renderer-side resources back the shell. The
/// contract is strict: every `build_shell` for an id replaces (and releases)
/// any previous shell for that id, and `release` must be called when the
/// owning container is destroyed.
pub trait ShellFactory {
    /// Build (or rebuild) the shell for `owner` at the given size
    fn build_shell(&mut self, owner: u64, size: Vector3<f32>);

    /// Release the shell for `owner`, if any
    fn release(&mut self, owner: u64);

    /// Number of shells currently alive
    fn live_count(&self) -> usize;
}

/// Shell factory producing plain CPU-side box geometry
///
/// Used by tests and demos; a renderer-backed implementation would upload
/// the same `GeometryData` to the GPU. Counts released shells so resource
/// leaks show up in assertions rather than in memory graphs.
pub struct PrimitiveShellFactory {
    shells: HashMap<u64, GeometryData>,
    released: usize,
}

impl PrimitiveShellFactory {
    /// Create a new factory with no live shells
    pub fn new() -> Self {
        Self {
            shells: HashMap::new(),
            released: 0,
        }
    }

    /// Geometry for an owner's current shell, if one is alive
    pub fn shell(&self, owner: u64) -> Option<&GeometryData> {
        self.shells.get(&owner)
    }

    /// Total number of shells released over the factory's lifetime
    pub fn released_count(&self) -> usize {
        self.released
    }
}

impl Default for PrimitiveShellFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellFactory for PrimitiveShellFactory {
    fn build_shell(&mut self, owner: u64, size: Vector3<f32>) {
        if self.shells.remove(&owner).is_some() {
            self.released += 1;
        }
        debug!("building shell for object {owner} at size {size:?}");
        self.shells.insert(owner, generate_box(size));
    }

    fn release(&mut self, owner: u64) {
        if self.shells.remove(&owner).is_some() {
            self.released += 1;
        }
    }

    fn live_count(&self) -> usize {
        self.shells.len()
    }
}

/// Shared-handle factory, for callers that keep a view on shell bookkeeping
/// while the container manager owns the `ShellFactory` box
impl ShellFactory for std::rc::Rc<std::cell::RefCell<PrimitiveShellFactory>> {
    fn build_shell(&mut self, owner: u64, size: Vector3<f32>) {
        self.borrow_mut().build_shell(owner, size);
    }

    fn release(&mut self, owner: u64) {
        self.borrow_mut().release(owner);
    }

    fn live_count(&self) -> usize {
        self.borrow().live_count()
    }
}
