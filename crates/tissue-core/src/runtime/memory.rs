//! In-memory Runtime
//!
//! Vector-backed [`AgentRuntime`]. Handles are slot indices; removed slots
//! are never reused, so a stale handle stays dead.

use super::AgentRuntime;
use crate::components::{
    CellDefinition, CellId, CellTypeId, CustomData, Phenotype, Position, SwitchState,
};

/// A cell as stored by [`InMemoryRuntime`]
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryCell {
    pub id: CellId,
    pub type_id: CellTypeId,
    pub phenotype: Phenotype,
    pub position: Position,
    pub custom_data: CustomData,
    pub switch_state: SwitchState,
}

#[derive(Debug, Default)]
pub struct InMemoryRuntime {
    cells: Vec<Option<MemoryCell>>,
    current_time: f64,
}

impl InMemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time(&mut self, time: f64) {
        self.current_time = time;
    }

    pub fn get(&self, agent: usize) -> Option<&MemoryCell> {
        self.cells.get(agent).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, agent: usize) -> Option<&mut MemoryCell> {
        self.cells.get_mut(agent).and_then(Option::as_mut)
    }

    /// Live cells in creation order
    pub fn cells(&self) -> impl Iterator<Item = &MemoryCell> {
        self.cells.iter().flatten()
    }
}

impl AgentRuntime for InMemoryRuntime {
    type Handle = usize;

    fn create_agent(&mut self, definition: &CellDefinition) -> usize {
        let handle = self.cells.len();
        self.cells.push(Some(MemoryCell {
            id: CellId(handle as u64),
            type_id: definition.type_id,
            phenotype: definition.phenotype.clone(),
            position: Position::default(),
            custom_data: CustomData(definition.default_custom_data()),
            switch_state: SwitchState::Unswitched,
        }));
        handle
    }

    fn remove_agent(&mut self, agent: usize) -> bool {
        self.cells.get_mut(agent).and_then(Option::take).is_some()
    }

    fn assign_position(&mut self, agent: usize, position: Position) -> bool {
        self.get_mut(agent).map(|c| c.position = position).is_some()
    }

    fn convert_to_type(&mut self, agent: usize, definition: &CellDefinition) -> bool {
        self.get_mut(agent)
            .map(|c| definition.apply_to(&mut c.type_id, &mut c.phenotype))
            .is_some()
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn agents(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|_| i))
            .collect()
    }

    fn cell_id(&self, agent: usize) -> Option<CellId> {
        self.get(agent).map(|c| c.id)
    }

    fn cell_type(&self, agent: usize) -> Option<CellTypeId> {
        self.get(agent).map(|c| c.type_id)
    }

    fn position(&self, agent: usize) -> Option<Position> {
        self.get(agent).map(|c| c.position)
    }

    fn phenotype(&self, agent: usize) -> Option<&Phenotype> {
        self.get(agent).map(|c| &c.phenotype)
    }

    fn custom_data(&self, agent: usize, slot: usize) -> Option<f64> {
        self.get(agent)?.custom_data.get(slot)
    }

    fn set_custom_data(&mut self, agent: usize, slot: usize, value: f64) -> bool {
        self.get_mut(agent)
            .map_or(false, |c| c.custom_data.set(slot, value))
    }

    fn switch_state(&self, agent: usize) -> Option<SwitchState> {
        self.get(agent).map(|c| c.switch_state)
    }

    fn set_switch_state(&mut self, agent: usize, state: SwitchState) -> bool {
        self.get_mut(agent).map(|c| c.switch_state = state).is_some()
    }

    fn agent_count(&self) -> usize {
        self.cells().count()
    }
}
