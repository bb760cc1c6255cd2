//! # Layout Engine
//!
//! Pure placement math for auto-layout containers. Given ordered child
//! descriptors and a layout configuration, these functions produce target
//! local positions and, for fill children, target sizes. Nothing here
//! touches the scene graph or registry — the container manager applies the
//! results through the coordinate transform machinery.
//!
//! Content is centered on the container's local origin: the padded span of
//! all children straddles zero on every axis, so a container that resizes
//! to its layout bounds never has to move.

use crate::geometry::{unified_bounds, Aabb, Bounds, LocalBox};
use crate::scene::object::{Axis, AxisSizing, ChildSizing, LayoutConfig};
use cgmath::{Matrix4, Vector3};
use log::warn;

/// Size and sizing policy of one child, in container-local terms
#[derive(Debug, Clone, Copy)]
pub struct ChildDescriptor {
    /// Extents of the child's axis-aligned box in the container's frame
    pub size: Vector3<f32>,
    /// Per-axis fill/fixed policy
    pub sizing: ChildSizing,
}

impl ChildDescriptor {
    /// Descriptor for a fixed-size child
    pub fn fixed(size: Vector3<f32>) -> Self {
        Self {
            size,
            sizing: ChildSizing::fixed(),
        }
    }
}

/// Outcome of a fill-distribution pass
#[derive(Debug, Clone)]
pub struct FillResult {
    /// Target size for every child, fill or not, in input order
    pub sizes: Vec<Vector3<f32>>,
    /// Fixed content plus gaps exceeded the container; fill children were
    /// floored at zero
    pub overflowed: bool,
}

/// Compute target local positions for children under a layout config
///
/// Children are placed sequentially along `config.direction`, each offset
/// by the previous child's extent plus the gap; leading padding shifts the
/// start. When `config.grid` is set, children wrap into rows instead.
/// Positions are child centers in the container's local frame. Pure and
/// deterministic; an empty child list yields an empty result.
pub fn calculate_layout(children: &[ChildDescriptor], config: &LayoutConfig) -> Vec<Vector3<f32>> {
    if children.is_empty() {
        return Vec::new();
    }

    match config.grid {
        Some(grid) => grid_positions(children, config, grid.columns.max(1), grid.row_axis),
        None => linear_positions(children, config),
    }
}

fn linear_positions(children: &[ChildDescriptor], config: &LayoutConfig) -> Vec<Vector3<f32>> {
    let axis = config.direction;
    let leading = config.padding.leading(axis);
    let trailing = config.padding.trailing(axis);

    let content: f32 = children.iter().map(|c| axis.of(c.size)).sum::<f32>()
        + config.gap * (children.len() - 1) as f32;
    let total = leading + content + trailing;

    let mut cursor = -total * 0.5 + leading;
    let mut positions = Vec::with_capacity(children.len());

    for child in children {
        let extent = axis.of(child.size);
        let mut position = Vector3::new(0.0, 0.0, 0.0);
        axis.set(&mut position, cursor + extent * 0.5);

        for cross in cross_axes(axis) {
            cross.set(&mut position, cross_center(config, cross));
        }

        positions.push(position);
        cursor += extent + config.gap;
    }

    positions
}

fn grid_positions(
    children: &[ChildDescriptor],
    config: &LayoutConfig,
    columns: usize,
    row_axis: Axis,
) -> Vec<Vector3<f32>> {
    let main = config.direction;
    let rows = children.len().div_ceil(columns);

    // Column widths and row heights are the max extent of the cells they
    // hold, so irregular children still land in aligned cells.
    let mut col_widths = vec![0.0f32; columns];
    let mut row_heights = vec![0.0f32; rows];
    for (i, child) in children.iter().enumerate() {
        let col = i % columns;
        let row = i / columns;
        col_widths[col] = col_widths[col].max(main.of(child.size));
        row_heights[row] = row_heights[row].max(row_axis.of(child.size));
    }

    let main_content: f32 =
        col_widths.iter().sum::<f32>() + config.gap * (columns.saturating_sub(1)) as f32;
    let main_total =
        config.padding.leading(main) + main_content + config.padding.trailing(main);

    let row_content: f32 =
        row_heights.iter().sum::<f32>() + config.gap * (rows.saturating_sub(1)) as f32;
    let row_total =
        config.padding.leading(row_axis) + row_content + config.padding.trailing(row_axis);

    // Cell start offsets along each grid axis.
    let mut col_starts = Vec::with_capacity(columns);
    let mut cursor = -main_total * 0.5 + config.padding.leading(main);
    for w in &col_widths {
        col_starts.push(cursor);
        cursor += w + config.gap;
    }

    let mut row_starts = Vec::with_capacity(rows);
    let mut cursor = -row_total * 0.5 + config.padding.leading(row_axis);
    for h in &row_heights {
        row_starts.push(cursor);
        cursor += h + config.gap;
    }

    let depth_axis = cross_axes(main)
        .into_iter()
        .find(|a| *a != row_axis)
        .unwrap_or(main);

    let mut positions = Vec::with_capacity(children.len());
    for (i, _child) in children.iter().enumerate() {
        let col = i % columns;
        let row = i / columns;

        let mut position = Vector3::new(0.0, 0.0, 0.0);
        main.set(&mut position, col_starts[col] + col_widths[col] * 0.5);
        row_axis.set(&mut position, row_starts[row] + row_heights[row] * 0.5);
        if depth_axis != main && depth_axis != row_axis {
            depth_axis.set(&mut position, cross_center(config, depth_axis));
        }
        positions.push(position);
    }

    positions
}

/// Distribute container space among fill children
///
/// The layout axis receives `container_size` minus padding and inter-child
/// gaps, split equally among children whose policy on that axis is `Fill`;
/// fixed children keep their sizes. Cross-axis fill stretches a child to
/// the padded container interior. When fixed content plus gaps already
/// exceed the container, fill children floor at zero and the result is
/// flagged — callers surface that instead of absorbing it.
pub fn calculate_fill_sizes(
    children: &[ChildDescriptor],
    config: &LayoutConfig,
    container_size: Vector3<f32>,
) -> FillResult {
    let axis = config.direction;
    let mut sizes: Vec<Vector3<f32>> = children.iter().map(|c| c.size).collect();

    if children.is_empty() {
        return FillResult {
            sizes,
            overflowed: false,
        };
    }

    let gaps = config.gap * (children.len() - 1) as f32;
    let available = axis.of(container_size)
        - config.padding.leading(axis)
        - config.padding.trailing(axis)
        - gaps;

    let fixed_total: f32 = children
        .iter()
        .filter(|c| c.sizing.on(axis) == AxisSizing::Fixed)
        .map(|c| axis.of(c.size))
        .sum();

    let fill_count = children
        .iter()
        .filter(|c| c.sizing.on(axis) == AxisSizing::Fill)
        .count();

    let mut overflowed = false;
    if fill_count > 0 {
        let remaining = available - fixed_total;
        if remaining < 0.0 {
            overflowed = true;
            warn!(
                "layout overflow: fixed content {} exceeds available {} on {:?}",
                fixed_total, available, axis
            );
        }
        let share = (remaining / fill_count as f32).max(0.0);

        for (i, child) in children.iter().enumerate() {
            if child.sizing.on(axis) == AxisSizing::Fill {
                axis.set(&mut sizes[i], share);
            }
        }
    }

    for cross in cross_axes(axis) {
        let interior = (cross.of(container_size)
            - config.padding.leading(cross)
            - config.padding.trailing(cross))
        .max(0.0);
        for (i, child) in children.iter().enumerate() {
            if child.sizing.on(cross) == AxisSizing::Fill {
                cross.set(&mut sizes[i], interior);
            }
        }
    }

    FillResult { sizes, overflowed }
}

/// Bounds of the post-layout arrangement
///
/// Thin wrapper composing the bounds calculator over boxes of the given
/// sizes centered at the given positions. `None` when empty.
pub fn calculate_layout_bounds(
    children: &[ChildDescriptor],
    positions: &[Vector3<f32>],
) -> Option<Bounds> {
    let items: Vec<LocalBox> = children
        .iter()
        .zip(positions.iter())
        .map(|(child, pos)| LocalBox {
            aabb: Aabb::from_size(child.size),
            transform: Matrix4::from_translation(*pos),
        })
        .collect();

    unified_bounds(&items, true)
}

fn cross_axes(axis: Axis) -> [Axis; 2] {
    match axis {
        Axis::X => [Axis::Y, Axis::Z],
        Axis::Y => [Axis::X, Axis::Z],
        Axis::Z => [Axis::X, Axis::Y],
    }
}

fn cross_center(config: &LayoutConfig, cross: Axis) -> f32 {
    (config.padding.leading(cross) - config.padding.trailing(cross)) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::object::{GridConfig, Padding};

    fn unit_children(n: usize) -> Vec<ChildDescriptor> {
        (0..n)
            .map(|_| ChildDescriptor::fixed(Vector3::new(1.0, 1.0, 1.0)))
            .collect()
    }

    #[test]
    fn test_linear_layout_centers_content() {
        let mut config = LayoutConfig::linear(Axis::X);
        config.gap = 0.5;

        let positions = calculate_layout(&unit_children(3), &config);

        assert_eq!(positions.len(), 3);
        assert!((positions[0].x - (-1.5)).abs() < 1e-6);
        assert!((positions[1].x - 0.0).abs() < 1e-6);
        assert!((positions[2].x - 1.5).abs() < 1e-6);
        for p in &positions {
            assert_eq!(p.y, 0.0);
            assert_eq!(p.z, 0.0);
        }
    }

    #[test]
    fn test_linear_layout_leading_padding_shifts_start() {
        let mut config = LayoutConfig::linear(Axis::X);
        config.padding = Padding {
            left: 1.0,
            ..Padding::default()
        };

        let positions = calculate_layout(&unit_children(3), &config);

        // Total span is 4 (1 pad + 3 content), centered on the origin, so
        // the first child center sits at -2 + 1 + 0.5.
        assert!((positions[0].x - (-0.5)).abs() < 1e-6);
        assert!((positions[2].x - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_linear_layout_uneven_extents() {
        let children = vec![
            ChildDescriptor::fixed(Vector3::new(2.0, 1.0, 1.0)),
            ChildDescriptor::fixed(Vector3::new(4.0, 1.0, 1.0)),
        ];
        let config = LayoutConfig::linear(Axis::Y);

        // Layout runs on Y; X extents don't matter.
        let positions = calculate_layout(&children, &config);
        assert!((positions[0].y - (-0.5)).abs() < 1e-6);
        assert!((positions[1].y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let mut config = LayoutConfig::linear(Axis::Z);
        config.gap = 0.25;
        let children = unit_children(5);

        let a = calculate_layout(&children, &config);
        let b = calculate_layout(&children, &config);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fill_distribution_scenario() {
        // Three unit children, middle one fills on X, container width 10,
        // gap 0.5: fill child gets 10 - (1+1) - 2*0.5 = 7.
        let mut children = unit_children(3);
        children[1].sizing.x = AxisSizing::Fill;
        let mut config = LayoutConfig::linear(Axis::X);
        config.gap = 0.5;

        let result = calculate_fill_sizes(&children, &config, Vector3::new(10.0, 1.0, 1.0));

        assert!(!result.overflowed);
        assert!((result.sizes[1].x - 7.0).abs() < 1e-6);
        assert_eq!(result.sizes[0].x, 1.0);
        assert_eq!(result.sizes[2].x, 1.0);
    }

    #[test]
    fn test_fill_split_among_multiple_children() {
        let mut children = unit_children(4);
        children[0].sizing.x = AxisSizing::Fill;
        children[3].sizing.x = AxisSizing::Fill;
        let config = LayoutConfig::linear(Axis::X);

        let result = calculate_fill_sizes(&children, &config, Vector3::new(8.0, 1.0, 1.0));

        // 8 - 2 fixed = 6 split between two fill children.
        assert!((result.sizes[0].x - 3.0).abs() < 1e-6);
        assert!((result.sizes[3].x - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_fill_overflow_floors_at_zero() {
        let mut children = vec![
            ChildDescriptor::fixed(Vector3::new(3.0, 1.0, 1.0)),
            ChildDescriptor::fixed(Vector3::new(1.0, 1.0, 1.0)),
        ];
        children[1].sizing.x = AxisSizing::Fill;
        let mut config = LayoutConfig::linear(Axis::X);
        config.gap = 0.5;

        let result = calculate_fill_sizes(&children, &config, Vector3::new(2.0, 1.0, 1.0));

        assert!(result.overflowed);
        assert_eq!(result.sizes[1].x, 0.0);
        assert_eq!(result.sizes[0].x, 3.0); // fixed child untouched
    }

    #[test]
    fn test_cross_axis_fill_stretches_to_interior() {
        let mut children = unit_children(2);
        children[0].sizing.y = AxisSizing::Fill;
        let mut config = LayoutConfig::linear(Axis::X);
        config.padding = Padding {
            top: 0.5,
            bottom: 0.5,
            ..Padding::default()
        };

        let result = calculate_fill_sizes(&children, &config, Vector3::new(4.0, 3.0, 1.0));

        assert!((result.sizes[0].y - 2.0).abs() < 1e-6);
        assert_eq!(result.sizes[1].y, 1.0);
    }

    #[test]
    fn test_grid_layout_wraps_rows() {
        let mut config = LayoutConfig::linear(Axis::X);
        config.grid = Some(GridConfig {
            columns: 2,
            row_axis: Axis::Y,
        });

        let positions = calculate_layout(&unit_children(4), &config);

        // 2x2 grid of unit cells centered at the origin.
        assert!((positions[0].x - (-0.5)).abs() < 1e-6);
        assert!((positions[0].y - (-0.5)).abs() < 1e-6);
        assert!((positions[1].x - 0.5).abs() < 1e-6);
        assert!((positions[1].y - (-0.5)).abs() < 1e-6);
        assert!((positions[2].x - (-0.5)).abs() < 1e-6);
        assert!((positions[2].y - 0.5).abs() < 1e-6);
        assert!((positions[3].x - 0.5).abs() < 1e-6);
        assert!((positions[3].y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_grid_layout_ragged_last_row() {
        let mut config = LayoutConfig::linear(Axis::X);
        config.grid = Some(GridConfig {
            columns: 3,
            row_axis: Axis::Z,
        });

        let positions = calculate_layout(&unit_children(5), &config);
        assert_eq!(positions.len(), 5);
        // Fifth child lands in row 1, column 1.
        assert!((positions[4].z - positions[3].z).abs() < 1e-6);
        assert!((positions[4].x - positions[1].x).abs() < 1e-6);
    }

    #[test]
    fn test_layout_bounds_cover_arrangement() {
        let mut config = LayoutConfig::linear(Axis::X);
        config.gap = 0.5;
        let children = unit_children(3);
        let positions = calculate_layout(&children, &config);

        let bounds = calculate_layout_bounds(&children, &positions).unwrap();

        assert!((bounds.size.x - 4.0).abs() < 1e-6);
        assert!((bounds.size.y - 1.0).abs() < 1e-6);
        assert!((bounds.center.x - 0.0).abs() < 1e-6);

        // Every placed child lies inside the reported bounds.
        for (child, pos) in children.iter().zip(positions.iter()) {
            let placed = Aabb::from_size(child.size)
                .transform(&Matrix4::from_translation(*pos));
            assert!(bounds.as_aabb().contains(&placed, 1e-6));
        }
    }

    #[test]
    fn test_layout_bounds_empty() {
        assert!(calculate_layout_bounds(&[], &[]).is_none());
    }
}
