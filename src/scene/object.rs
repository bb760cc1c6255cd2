//! # Scene Object Model
//!
//! Registry-side metadata for everything the modeling tool can manipulate.
//! The scene graph owns parent/child transform relationships; the types here
//! own everything else — role, sizing behavior, layout configuration and
//! nominal dimensions. The two views must always agree, and only the
//! container manager is allowed to mutate them together.

use crate::scene::graph::NodeId;
use cgmath::Vector3;

/// Stable identifier for a registered scene object
pub type ObjectId = u64;

/// What role a scene-graph node plays in the tool
///
/// Matched exhaustively everywhere — there are no optional "is container"
/// flags to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneRole {
    /// Ordinary geometry with no grouping behavior
    Plain,
    /// Groups children and owns a bounding shell
    Container,
    /// Invisible stand-in used by interaction tools
    InteractiveProxy,
    /// Invisible stand-in used for collision queries
    CollisionProxy,
}

/// How a container's size reacts to its content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingMode {
    /// Size passively tracks the union of child bounds
    Hug,
    /// Size is set explicitly and never auto-fits
    Fixed,
}

/// Layout axis selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Read the matching component of a vector
    pub fn of(self, v: Vector3<f32>) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    /// Write the matching component of a vector
    pub fn set(self, v: &mut Vector3<f32>, value: f32) {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
            Axis::Z => v.z = value,
        }
    }
}

/// Per-axis sizing policy for a child of a layout-enabled container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSizing {
    /// Child keeps its own size on this axis
    Fixed,
    /// Child stretches to consume available container space on this axis
    Fill,
}

/// Sizing policy on all three axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildSizing {
    pub x: AxisSizing,
    pub y: AxisSizing,
    pub z: AxisSizing,
}

impl ChildSizing {
    /// All-axes fixed, the default for newly parented children
    pub fn fixed() -> Self {
        Self {
            x: AxisSizing::Fixed,
            y: AxisSizing::Fixed,
            z: AxisSizing::Fixed,
        }
    }

    /// Policy on a single axis
    pub fn on(self, axis: Axis) -> AxisSizing {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Whether any axis uses fill sizing
    pub fn any_fill(self) -> bool {
        self.x == AxisSizing::Fill || self.y == AxisSizing::Fill || self.z == AxisSizing::Fill
    }
}

impl Default for ChildSizing {
    fn default() -> Self {
        Self::fixed()
    }
}

/// Interior padding of a layout-enabled container, one value per face
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Padding {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
    pub front: f32,
    pub back: f32,
}

impl Padding {
    /// Uniform padding on all six faces
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            bottom: value,
            left: value,
            right: value,
            front: value,
            back: value,
        }
    }

    /// Padding at the negative face of an axis (left / bottom / back)
    pub fn leading(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.left,
            Axis::Y => self.bottom,
            Axis::Z => self.back,
        }
    }

    /// Padding at the positive face of an axis (right / top / front)
    pub fn trailing(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.right,
            Axis::Y => self.top,
            Axis::Z => self.front,
        }
    }
}

/// Grid arrangement parameters
///
/// Children wrap into rows of `columns` cells along the layout direction;
/// rows advance along `row_axis`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    pub columns: usize,
    pub row_axis: Axis,
}

/// Auto-layout configuration for a container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Axis children are arranged along
    pub direction: Axis,
    /// Spacing between consecutive children, >= 0
    pub gap: f32,
    /// Interior padding
    pub padding: Padding,
    /// Grid arrangement; linear when absent
    pub grid: Option<GridConfig>,
    /// Layout participates in refits only while enabled
    pub enabled: bool,
}

impl LayoutConfig {
    /// Linear layout along an axis with no gap or padding
    pub fn linear(direction: Axis) -> Self {
        Self {
            direction,
            gap: 0.0,
            padding: Padding::default(),
            grid: None,
            enabled: true,
        }
    }
}

/// Canonical metadata for one object, owned by the registry
#[derive(Debug, Clone)]
pub struct SceneObject {
    /// Stable identifier
    pub id: ObjectId,
    /// Display name, unique within the registry
    pub name: String,
    /// Transform node in the scene graph
    pub node: NodeId,
    /// Role tag, mirrored onto the node
    pub role: SceneRole,
    /// Container this object is grouped under, if any
    pub parent_container: Option<ObjectId>,
    /// Sizing behavior; meaningful for containers only
    pub sizing: SizingMode,
    /// Auto-layout configuration; containers only
    pub layout: Option<LayoutConfig>,
    /// Nominal edge lengths of the object's own box
    pub dimensions: Vector3<f32>,
    /// Per-axis policy applied when a layout-enabled parent distributes space
    pub child_sizing: ChildSizing,
}

impl SceneObject {
    /// Whether this object currently acts as a container
    pub fn is_container(&self) -> bool {
        self.role == SceneRole::Container
    }

    /// Layout configuration if this container has layout enabled
    pub fn active_layout(&self) -> Option<&LayoutConfig> {
        match self.layout {
            Some(ref config) if config.enabled && self.is_container() => Some(config),
            _ => None,
        }
    }
}
