//! Snapshot Generation
//!
//! Captures the cell population at regular step intervals.

use bevy_ecs::prelude::*;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use tissue_events::{generate_snapshot_id, CellSnapshot, PopulationSnapshot, PositionSnapshot};

use crate::components::{Cell, CellId, CellTypeId, CustomData, DefinitionRegistry, Position, SwitchState};
use crate::runtime::SimClock;
use crate::systems::color_for;

/// Resource tracking snapshot ids and cadence
#[derive(Resource)]
pub struct SnapshotGenerator {
    run_id: Uuid,
    next_snapshot_id: u64,
    snapshot_interval: u64,
}

impl SnapshotGenerator {
    pub fn new(run_id: Uuid, snapshot_interval: u64) -> Self {
        Self {
            run_id,
            next_snapshot_id: 1,
            snapshot_interval,
        }
    }

    /// An interval of zero disables periodic snapshots
    pub fn should_snapshot(&self, step: u64) -> bool {
        self.snapshot_interval > 0 && step > 0 && step % self.snapshot_interval == 0
    }

    pub fn next_id(&mut self) -> String {
        let id = generate_snapshot_id(self.next_snapshot_id);
        self.next_snapshot_id += 1;
        id
    }

    pub fn snapshot_count(&self) -> u64 {
        self.next_snapshot_id - 1
    }
}

/// Snapshot every cell in the world, ordered by cell id
pub fn generate_snapshot(world: &mut World, trigger: &str) -> PopulationSnapshot {
    let time = world
        .get_resource::<SimClock>()
        .map(|c| c.current_time)
        .unwrap_or(0.0);
    let (snapshot_id, run_id) = {
        let mut generator = world.resource_mut::<SnapshotGenerator>();
        (generator.next_id(), generator.run_id)
    };

    let mut query = world.query_filtered::<
        (&CellId, &CellTypeId, &Position, &CustomData, &SwitchState),
        With<Cell>,
    >();
    let registry = world.get_resource::<DefinitionRegistry>();

    let mut cells: Vec<CellSnapshot> = query
        .iter(world)
        .map(|(id, type_id, position, custom, state)| CellSnapshot {
            cell_id: id.0,
            type_id: type_id.0,
            type_name: registry
                .and_then(|r| r.name_of(*type_id))
                .unwrap_or("unknown")
                .to_string(),
            position: PositionSnapshot {
                x: position.x,
                y: position.y,
                z: position.z,
            },
            custom_data: custom.0.clone(),
            switched: state.is_switched(),
            colors: color_for(*type_id),
        })
        .collect();
    cells.sort_by_key(|c| c.cell_id);

    PopulationSnapshot {
        snapshot_id,
        run_id,
        time,
        trigger: trigger.to_string(),
        cells,
    }
}

pub fn write_snapshot(snapshot: &PopulationSnapshot, path: impl AsRef<Path>) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json)?;
    Ok(())
}

/// Write to `<dir>/snapshots/<snapshot_id>.json`
pub fn write_snapshot_to_dir(snapshot: &PopulationSnapshot, dir: impl AsRef<Path>) -> std::io::Result<()> {
    let snapshots = dir.as_ref().join("snapshots");
    fs::create_dir_all(&snapshots)?;
    write_snapshot(snapshot, snapshots.join(format!("{}.json", snapshot.snapshot_id)))
}

/// Overwrite `<dir>/current_state.json`
pub fn write_current_state(snapshot: &PopulationSnapshot, dir: impl AsRef<Path>) -> std::io::Result<()> {
    write_snapshot(snapshot, dir.as_ref().join("current_state.json"))
}
