//! Cell Components
//!
//! Per-cell state owned by the agent runtime.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker component identifying an entity as a cell
#[derive(Component, Debug, Clone, Default)]
pub struct Cell;

/// Unique identifier for a cell, assigned by the runtime at creation
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub u64);

/// Integer tag selecting a cell type definition
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellTypeId(pub u32);

impl fmt::Display for CellTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cell center in micrometers
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Same point projected onto the z = 0 plane
    pub fn flattened(self) -> Self {
        Self { z: 0.0, ..self }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn norm(&self) -> f64 {
        self.distance_to(&Position::default())
    }
}

/// Fixed-size vector of custom scalar attributes.
///
/// Slot layout comes from the cell definition's custom variables; slot 0 is
/// the oncoprotein level in the default definitions.
#[derive(Component, Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomData(pub Vec<f64>);

impl CustomData {
    pub fn get(&self, slot: usize) -> Option<f64> {
        self.0.get(slot).copied()
    }

    /// Writes a slot, returning false when the slot does not exist
    pub fn set(&mut self, slot: usize, value: f64) -> bool {
        match self.0.get_mut(slot) {
            Some(v) => {
                *v = value;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Progress of the one-shot type switch.
///
/// A cell moves from `Unswitched` to `Switched` at most once and never back.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum SwitchState {
    #[default]
    Unswitched,
    Switched {
        /// Simulated time of the switch
        at: f64,
        from: CellTypeId,
    },
}

impl SwitchState {
    pub fn is_switched(&self) -> bool {
        matches!(self, SwitchState::Switched { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flattened_drops_z() {
        let p = Position::new(3.0, 4.0, 12.0).flattened();
        assert_eq!(p, Position::new(3.0, 4.0, 0.0));
        assert!((p.norm() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_custom_data_slots() {
        let mut data = CustomData(vec![1.0]);
        assert!(data.set(0, 2.5));
        assert!(!data.set(3, 1.0));
        assert_eq!(data.get(0), Some(2.5));
        assert_eq!(data.get(1), None);
    }

    #[test]
    fn test_switch_state_default() {
        assert!(!SwitchState::default().is_switched());
        let switched = SwitchState::Switched {
            at: 120.0,
            from: CellTypeId(0),
        };
        assert!(switched.is_switched());
    }
}
