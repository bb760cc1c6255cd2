//! # Bounding Volume Calculation
//!
//! Axis-aligned bounding volumes and the unified-bounds computation used to
//! fit container shells around their contents. Everything here is pure: the
//! container manager decides when to recompute and what to do with the
//! result.

use cgmath::{Matrix4, Vector3, Vector4, Zero};

/// Axis-aligned bounding box stored as min/max corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl Aabb {
    /// Create a new AABB from min/max corners
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at the origin with the given edge lengths
    pub fn from_size(size: Vector3<f32>) -> Self {
        let half = size * 0.5;
        Self {
            min: -half,
            max: half,
        }
    }

    /// Create an AABB from a set of points
    ///
    /// Returns a zero box at the origin for empty input; callers that care
    /// about the empty case should check before calling.
    pub fn from_points(points: &[Vector3<f32>]) -> Self {
        if points.is_empty() {
            return Self::new(Vector3::zero(), Vector3::zero());
        }

        let mut min = points[0];
        let mut max = points[0];

        for p in points.iter().skip(1) {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Self::new(min, max)
    }

    /// Center point of the box
    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths of the box, always non-negative
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Smallest box covering both inputs
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(
            Vector3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            Vector3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        )
    }

    /// Apply a transformation matrix to the AABB
    ///
    /// Transforms all 8 corners and refits an axis-aligned box around them,
    /// so a rotated box grows to cover its swept extent.
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Aabb {
        let corners = [
            Vector3::new(self.min.x, self.min.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.min.z),
            Vector3::new(self.min.x, self.max.y, self.min.z),
            Vector3::new(self.min.x, self.min.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.max.z),
            Vector3::new(self.min.x, self.max.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.max.z),
        ];

        let mut transformed = Vec::with_capacity(8);
        for corner in &corners {
            let homogeneous = Vector4::new(corner.x, corner.y, corner.z, 1.0);
            let t = matrix * homogeneous;
            transformed.push(Vector3::new(t.x / t.w, t.y / t.w, t.z / t.w));
        }

        Aabb::from_points(&transformed)
    }

    /// Whether `other` lies fully inside this box, within `epsilon`
    pub fn contains(&self, other: &Aabb, epsilon: f32) -> bool {
        other.min.x >= self.min.x - epsilon
            && other.min.y >= self.min.y - epsilon
            && other.min.z >= self.min.z - epsilon
            && other.max.x <= self.max.x + epsilon
            && other.max.y <= self.max.y + epsilon
            && other.max.z <= self.max.z + epsilon
    }
}

/// Bounding volume in the form consumed by container fitting: center + size
/// alongside the raw corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Center point of the volume
    pub center: Vector3<f32>,
    /// Edge lengths, components always >= 0
    pub size: Vector3<f32>,
    /// Minimum corner
    pub min: Vector3<f32>,
    /// Maximum corner
    pub max: Vector3<f32>,
}

impl Bounds {
    /// Build bounds from min/max corners
    pub fn from_min_max(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self {
            center: (min + max) * 0.5,
            size: max - min,
            min,
            max,
        }
    }

    /// Build bounds from an AABB
    pub fn from_aabb(aabb: &Aabb) -> Self {
        Self::from_min_max(aabb.min, aabb.max)
    }

    /// View as an AABB
    pub fn as_aabb(&self) -> Aabb {
        Aabb::new(self.min, self.max)
    }
}

/// A local-space box paired with the transform that places it
#[derive(Debug, Clone, Copy)]
pub struct LocalBox {
    /// Bounding box in the item's own local space
    pub aabb: Aabb,
    /// Transform from the item's local space into the target frame
    pub transform: Matrix4<f32>,
}

/// Compute the unified bounds covering a set of local boxes
///
/// When `use_world_space` is set, each box is pushed through its transform
/// before the union; otherwise the raw local boxes are united as-is. Returns
/// `None` for empty input — callers skip the resize when the last child was
/// just removed.
pub fn unified_bounds(items: &[LocalBox], use_world_space: bool) -> Option<Bounds> {
    let mut combined: Option<Aabb> = None;

    for item in items {
        let aabb = if use_world_space {
            item.aabb.transform(&item.transform)
        } else {
            item.aabb
        };

        combined = Some(match combined {
            Some(ref acc) => acc.union(&aabb),
            None => aabb,
        });
    }

    combined.map(|aabb| Bounds::from_aabb(&aabb))
}

/// Component-wise clamp of a size vector against a minimum edge length
pub fn clamp_size(size: Vector3<f32>, min_edge: f32) -> Vector3<f32> {
    size.map(|c| c.max(min_edge))
}

/// Whether two size vectors differ by more than `epsilon` on any axis
pub fn size_differs(a: Vector3<f32>, b: Vector3<f32>, epsilon: f32) -> bool {
    let d = a - b;
    d.x.abs() > epsilon || d.y.abs() > epsilon || d.z.abs() > epsilon
}

/// Per-axis sign of a size change, used for drag-reversal detection
pub fn delta_signs(from: Vector3<f32>, to: Vector3<f32>, epsilon: f32) -> [i8; 3] {
    let d = to - from;
    let sign = |c: f32| {
        if c > epsilon {
            1
        } else if c < -epsilon {
            -1
        } else {
            0
        }
    };
    [sign(d.x), sign(d.y), sign(d.z)]
}
