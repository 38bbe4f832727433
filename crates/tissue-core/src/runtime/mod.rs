//! Agent Runtime
//!
//! The capability the seeder and the per-step rules use to create and
//! mutate cells. Passing it explicitly replaces process-wide cell
//! registries and global clocks.
//!
//! Two backends are provided: [`EcsRuntime`] stores cells as bevy_ecs
//! entities and drives the host step loop; [`InMemoryRuntime`] is a plain
//! vector-backed double for tests and embedding.

pub mod ecs;
pub mod memory;

pub use ecs::{CellIdAllocator, EcsRuntime, SimClock};
pub use memory::{InMemoryRuntime, MemoryCell};

use std::fmt::Debug;
use std::hash::Hash;

use crate::components::{CellDefinition, CellId, CellTypeId, Phenotype, Position, SwitchState};

/// Operations the host runtime exposes to this crate.
///
/// Lookups on a handle that no longer refers to a live cell return `None`
/// (or `false` for writes).
pub trait AgentRuntime {
    type Handle: Copy + Eq + Hash + Debug;

    /// Allocate and register a new cell initialized from `definition`
    fn create_agent(&mut self, definition: &CellDefinition) -> Self::Handle;

    /// Remove a cell from the registry
    fn remove_agent(&mut self, agent: Self::Handle) -> bool;

    fn assign_position(&mut self, agent: Self::Handle, position: Position) -> bool;

    /// Swap the cell's tag and its whole phenotype for those of `definition`.
    /// Custom data is kept.
    fn convert_to_type(&mut self, agent: Self::Handle, definition: &CellDefinition) -> bool;

    /// Current simulated time in minutes
    fn current_time(&self) -> f64;

    /// Every live cell, in no particular order
    fn agents(&self) -> Vec<Self::Handle>;

    fn cell_id(&self, agent: Self::Handle) -> Option<CellId>;

    fn cell_type(&self, agent: Self::Handle) -> Option<CellTypeId>;

    fn position(&self, agent: Self::Handle) -> Option<Position>;

    fn phenotype(&self, agent: Self::Handle) -> Option<&Phenotype>;

    fn custom_data(&self, agent: Self::Handle, slot: usize) -> Option<f64>;

    fn set_custom_data(&mut self, agent: Self::Handle, slot: usize, value: f64) -> bool;

    fn switch_state(&self, agent: Self::Handle) -> Option<SwitchState>;

    fn set_switch_state(&mut self, agent: Self::Handle, state: SwitchState) -> bool;

    fn agent_count(&self) -> usize {
        self.agents().len()
    }
}
