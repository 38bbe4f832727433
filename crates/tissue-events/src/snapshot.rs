//! Snapshot Types
//!
//! Serialization structs for population snapshots.
//!
//! A snapshot captures every live cell at one simulated time, with the
//! display colors already resolved, so a renderer needs nothing else.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CellColors;

/// Generates a snapshot ID with the given sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// Cell position in micrometers
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// One cell at snapshot time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub cell_id: u64,
    pub type_id: u32,
    pub type_name: String,
    pub position: PositionSnapshot,
    /// Custom data, in definition slot order
    #[serde(default)]
    pub custom_data: Vec<f64>,
    pub switched: bool,
    pub colors: CellColors,
}

/// Summary statistics over one custom attribute
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeSummarySnapshot {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// Complete population state at one simulated time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub snapshot_id: String,
    pub run_id: Uuid,
    pub time: f64,
    /// What triggered this snapshot ("simulation_start", "periodic", "simulation_end")
    pub trigger: String,
    pub cells: Vec<CellSnapshot>,
}

impl PopulationSnapshot {
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of cells currently carrying the given type tag
    pub fn count_of_type(&self, type_id: u32) -> usize {
        self.cells.iter().filter(|c| c.type_id == type_id).count()
    }
}
