//! bevy_ecs Runtime
//!
//! Cells are entities carrying the components in [`crate::components`].
//! The same `World` is later handed to the step `Schedule`.

use bevy_ecs::prelude::*;

use super::AgentRuntime;
use crate::components::{
    Cell, CellDefinition, CellId, CellTypeId, CustomData, Phenotype, Position, SwitchState,
};

/// Simulated time, advanced by the host loop
#[derive(Resource, Debug, Clone, Default)]
pub struct SimClock {
    pub current_time: f64,
    pub step: u64,
    /// Phenotype step size in minutes
    pub dt: f64,
}

impl SimClock {
    pub fn new(dt: f64) -> Self {
        Self {
            current_time: 0.0,
            step: 0,
            dt,
        }
    }

    /// Move to the given step. Time is `step * dt` so it does not drift.
    pub fn set_step(&mut self, step: u64) {
        self.step = step;
        self.current_time = step as f64 * self.dt;
    }
}

/// Hands out cell ids in creation order
#[derive(Resource, Debug, Default)]
pub struct CellIdAllocator {
    next: u64,
}

impl CellIdAllocator {
    pub fn allocate(&mut self) -> CellId {
        let id = CellId(self.next);
        self.next += 1;
        id
    }
}

/// Agent runtime backed by a bevy_ecs `World`
pub struct EcsRuntime {
    world: World,
}

impl EcsRuntime {
    pub fn new(dt: f64) -> Self {
        let mut world = World::new();
        world.insert_resource(SimClock::new(dt));
        world.insert_resource(CellIdAllocator::default());
        Self { world }
    }

    /// Wrap an existing world, inserting the clock and id allocator if absent
    pub fn from_world(mut world: World, dt: f64) -> Self {
        if !world.contains_resource::<SimClock>() {
            world.insert_resource(SimClock::new(dt));
        }
        if !world.contains_resource::<CellIdAllocator>() {
            world.insert_resource(CellIdAllocator::default());
        }
        Self { world }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn into_world(self) -> World {
        self.world
    }

    pub fn set_step(&mut self, step: u64) {
        self.world.resource_mut::<SimClock>().set_step(step);
    }

    fn is_cell(&self, agent: Entity) -> bool {
        self.world
            .get_entity(agent)
            .map_or(false, |e| e.contains::<Cell>())
    }
}

impl AgentRuntime for EcsRuntime {
    type Handle = Entity;

    fn create_agent(&mut self, definition: &CellDefinition) -> Entity {
        let id = self.world.resource_mut::<CellIdAllocator>().allocate();
        self.world
            .spawn((
                Cell,
                id,
                definition.type_id,
                definition.phenotype.clone(),
                CustomData(definition.default_custom_data()),
                Position::default(),
                SwitchState::Unswitched,
            ))
            .id()
    }

    fn remove_agent(&mut self, agent: Entity) -> bool {
        self.is_cell(agent) && self.world.despawn(agent)
    }

    fn assign_position(&mut self, agent: Entity, position: Position) -> bool {
        match self.world.get_mut::<Position>(agent) {
            Some(mut p) => {
                *p = position;
                true
            }
            None => false,
        }
    }

    fn convert_to_type(&mut self, agent: Entity, definition: &CellDefinition) -> bool {
        if !self.is_cell(agent) {
            return false;
        }
        let mut entity = self.world.entity_mut(agent);
        entity.insert((definition.type_id, definition.phenotype.clone()));
        true
    }

    fn current_time(&self) -> f64 {
        self.world.resource::<SimClock>().current_time
    }

    fn agents(&self) -> Vec<Entity> {
        self.world
            .iter_entities()
            .filter(|e| e.contains::<Cell>())
            .map(|e| e.id())
            .collect()
    }

    fn cell_id(&self, agent: Entity) -> Option<CellId> {
        self.world.get::<CellId>(agent).copied()
    }

    fn cell_type(&self, agent: Entity) -> Option<CellTypeId> {
        self.world.get::<CellTypeId>(agent).copied()
    }

    fn position(&self, agent: Entity) -> Option<Position> {
        self.world.get::<Position>(agent).copied()
    }

    fn phenotype(&self, agent: Entity) -> Option<&Phenotype> {
        self.world.get::<Phenotype>(agent)
    }

    fn custom_data(&self, agent: Entity, slot: usize) -> Option<f64> {
        self.world.get::<CustomData>(agent)?.get(slot)
    }

    fn set_custom_data(&mut self, agent: Entity, slot: usize, value: f64) -> bool {
        match self.world.get_mut::<CustomData>(agent) {
            Some(mut data) => data.set(slot, value),
            None => false,
        }
    }

    fn switch_state(&self, agent: Entity) -> Option<SwitchState> {
        self.world.get::<SwitchState>(agent).copied()
    }

    fn set_switch_state(&mut self, agent: Entity, state: SwitchState) -> bool {
        match self.world.get_mut::<SwitchState>(agent) {
            Some(mut s) => {
                *s = state;
                true
            }
            None => false,
        }
    }
}
