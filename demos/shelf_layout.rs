//! # Shelf Layout Demo
//!
//! Auto-layout in action: books on a shelf arranged along X with a gap,
//! one of them set to fill whatever width remains, and the shelf resized
//! with the push tool to watch the fill child absorb the change.
//!
//! ## What this example shows:
//! - How to enable a linear layout with gap and padding
//! - How fill sizing distributes leftover container space
//! - How an explicit push resize reflows the layout
//! - How a grid arrangement wraps children into rows
//!
//! ## Usage:
//! ```bash
//! RUST_LOG=info cargo run --example shelf_layout
//! ```

use anyhow::Result;
use clootie::prelude::*;
use log::info;

fn main() -> Result<()> {
    env_logger::init();

    let mut manager = clootie::default();

    // Three books, then a shelf around them.
    let red = manager.add_object("Red book", Vector3::new(1.0, 1.0, 1.0), Vector3::zero());
    let green = manager.add_object(
        "Green book",
        Vector3::new(1.0, 1.0, 1.0),
        Vector3::new(2.0, 0.0, 0.0),
    );
    let blue = manager.add_object(
        "Blue book",
        Vector3::new(1.0, 1.0, 1.0),
        Vector3::new(4.0, 0.0, 0.0),
    );
    let shelf = manager.create_from_selection(&[red, green, blue])?;

    // Arrange along X with a gap and a little breathing room; the middle
    // book fills leftover width.
    let mut config = LayoutConfig::linear(Axis::X);
    config.gap = 0.5;
    config.padding = Padding::uniform(0.1);
    manager.set_layout_config(shelf, Some(config))?;

    let mut sizing = ChildSizing::fixed();
    sizing.x = AxisSizing::Fill;
    manager.set_child_sizing(green, sizing)?;

    // Push the shelf out to width 10: the fill book absorbs whatever the
    // fixed books, gaps and padding leave over.
    let applied = manager.push_resize(shelf, Vector3::new(10.0, 1.0, 1.0))?;
    info!("shelf resized to {:?}", applied);
    info!(
        "green book now {:?} wide",
        manager.object(green).expect("green exists").dimensions.x
    );

    // Switch to a 2-column grid wrapping into rows along Y.
    let mut grid_config = LayoutConfig::linear(Axis::X);
    grid_config.gap = 0.25;
    grid_config.grid = Some(GridConfig {
        columns: 2,
        row_axis: Axis::Y,
    });
    manager.set_layout_config(shelf, Some(grid_config))?;

    for id in [red, green, blue] {
        let obj = manager.object(id).expect("book exists");
        let node = manager
            .graph()
            .node(obj.node)
            .expect("node exists");
        info!("{} sits at {:?}", obj.name, node.position);
    }

    Ok(())
}
