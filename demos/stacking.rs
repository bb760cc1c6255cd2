//! # Stacking Demo
//!
//! Walks through the core container behaviors: grouping a selection without
//! moving it, hug containers tracking dragged content frame by frame, and
//! nested containers cascading their refits bottom-up.
//!
//! ## What this example shows:
//! - How to create objects and group them with `create_from_selection`
//! - How hug containers refit (throttled) while content is dragged
//! - How the settled mouse-up call lands an exact final state
//! - How nesting containers cascades refits through the chain
//!
//! ## Usage:
//! ```bash
//! RUST_LOG=debug cargo run --example stacking
//! ```

use anyhow::Result;
use clootie::prelude::*;
use log::info;

fn main() -> Result<()> {
    env_logger::init();

    let mut manager = clootie::default();

    // A small tabletop scene: three crates of different sizes.
    let small = manager.add_object("Small crate", Vector3::new(1.0, 1.0, 1.0), Vector3::zero());
    let wide = manager.add_object(
        "Wide crate",
        Vector3::new(2.0, 1.0, 1.0),
        Vector3::new(3.0, 0.0, 0.0),
    );
    let tall = manager.add_object(
        "Tall crate",
        Vector3::new(1.0, 3.0, 1.0),
        Vector3::new(0.0, 4.0, 0.0),
    );

    // Group the selection. The container lands on the selection's bounds;
    // none of the crates move.
    let group = manager.create_from_selection(&[small, wide, tall])?;
    let bounds = manager.object(group).expect("group exists").dimensions;
    info!("group created with size {:?}", bounds);

    // Simulate a drag: per-frame moves are throttled, the final call is
    // settled and bypasses the throttle.
    for frame in 1..=10 {
        let x = frame as f32 * 0.8;
        manager.set_local_position(tall, Vector3::new(x, 4.0, 0.0), false)?;
    }
    manager.set_local_position(tall, Vector3::new(8.0, 4.0, 0.0), true)?;
    info!(
        "after drag, group size {:?} at {:?}",
        manager.object(group).expect("group exists").dimensions,
        manager.world_position(group).expect("group exists"),
    );

    // Nest the group under a second container and watch the cascade.
    let pallet = manager.add_object(
        "Pallet",
        Vector3::new(12.0, 0.2, 4.0),
        Vector3::new(4.0, -2.0, 0.0),
    );
    let shipment = manager.create_from_selection(&[pallet])?;
    manager.add_container_to_container(group, shipment)?;
    info!(
        "shipment hugs its content: size {:?}",
        manager.object(shipment).expect("shipment exists").dimensions
    );

    // Consumers like property panels drain the change feed once per tick.
    for (id, kind) in manager.drain_events() {
        info!("changed: object {} ({:?})", id, kind);
    }

    info!(
        "{} objects in the scene, {} container shells alive",
        manager.registry().len(),
        manager.live_shells()
    );

    Ok(())
}
