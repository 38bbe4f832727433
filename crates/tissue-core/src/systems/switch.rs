//! Behavior Switch
//!
//! Converts cells of a source type to a target type once, in the first
//! step that reaches a threshold time.
//!
//! The window `[threshold, threshold + window)` must be at least one step
//! wide or the switch can be skipped entirely; [`SwitchRule::check_cadence`]
//! is run at setup against the configured step size.

use bevy_ecs::prelude::*;
use std::sync::Arc;

use crate::components::{Cell, CellDefinition, CellId, CellTypeId, Phenotype, SwitchState};
use crate::error::ConfigError;
use crate::runtime::{AgentRuntime, SimClock};

/// Simulated time (minutes) at which embedded cells become enveloping
pub const DEFAULT_SWITCH_TIME: f64 = 120.0;
/// Width of the switch window in minutes
pub const DEFAULT_SWITCH_WINDOW: f64 = 0.1;

/// A switch that happened
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchOutcome {
    pub cell_id: CellId,
    pub from: CellTypeId,
    pub to: CellTypeId,
    pub to_name: String,
    pub time: f64,
}

/// Switches recorded by [`switch_cell_types`] and not yet logged
#[derive(Resource, Debug, Default)]
pub struct PendingSwitches {
    switches: Vec<SwitchOutcome>,
}

impl PendingSwitches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outcome: SwitchOutcome) {
        self.switches.push(outcome);
    }

    pub fn drain(&mut self) -> Vec<SwitchOutcome> {
        std::mem::take(&mut self.switches)
    }

    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.switches.len()
    }
}

/// Time-gated one-shot type switch with its target definition already resolved
#[derive(Resource, Debug, Clone)]
pub struct SwitchRule {
    threshold: f64,
    window: f64,
    source: CellTypeId,
    target: Arc<CellDefinition>,
}

impl SwitchRule {
    pub fn new(threshold: f64, window: f64, source: CellTypeId, target: Arc<CellDefinition>) -> Self {
        Self {
            threshold,
            window,
            source,
            target,
        }
    }

    pub fn source(&self) -> CellTypeId {
        self.source
    }

    pub fn target(&self) -> &Arc<CellDefinition> {
        &self.target
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn window(&self) -> f64 {
        self.window
    }

    pub fn in_window(&self, time: f64) -> bool {
        time >= self.threshold && time < self.threshold + self.window
    }

    /// Fails when steps of `dt` could jump over the whole window
    pub fn check_cadence(&self, dt: f64) -> Result<(), ConfigError> {
        if self.window.is_nan() || self.window <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "switch.window",
                reason: format!("must be positive, got {}", self.window),
            });
        }
        if dt > self.window {
            return Err(ConfigError::InvalidParameter {
                name: "simulation.dt",
                reason: format!(
                    "step {} is wider than the switch window {}; the switch could be missed",
                    dt, self.window
                ),
            });
        }
        Ok(())
    }

    /// Next switch state of a cell of `cell_type` evaluated at `time`
    pub fn transition(&self, state: SwitchState, cell_type: CellTypeId, time: f64) -> SwitchState {
        match state {
            SwitchState::Unswitched if cell_type == self.source && self.in_window(time) => {
                SwitchState::Switched {
                    at: time,
                    from: cell_type,
                }
            }
            other => other,
        }
    }

    /// Decide the switch for one cell.
    ///
    /// `Some` carries the cell's next state and the outcome to report; the
    /// caller applies the target definition.
    pub fn decide(
        &self,
        cell_id: CellId,
        state: SwitchState,
        cell_type: CellTypeId,
        time: f64,
    ) -> Option<(SwitchState, SwitchOutcome)> {
        let next = self.transition(state, cell_type, time);
        if next == state {
            return None;
        }
        tracing::info!("switch cell type: cell={} time={}", cell_id.0, time);
        Some((
            next,
            SwitchOutcome {
                cell_id,
                from: cell_type,
                to: self.target.type_id,
                to_name: self.target.name.clone(),
                time,
            },
        ))
    }

    /// Per-step callback for one cell.
    ///
    /// Reads the runtime's current time; returns the switch if one happened.
    pub fn update<R: AgentRuntime>(
        &self,
        runtime: &mut R,
        agent: R::Handle,
        dt: f64,
    ) -> Option<SwitchOutcome> {
        if dt > self.window {
            tracing::warn!(
                "step {} is wider than the switch window {}; the switch can be missed",
                dt,
                self.window
            );
        }

        let time = runtime.current_time();
        let (next, outcome) = self.decide(
            runtime.cell_id(agent)?,
            runtime.switch_state(agent)?,
            runtime.cell_type(agent)?,
            time,
        )?;

        runtime.convert_to_type(agent, &self.target);
        runtime.set_switch_state(agent, next);
        Some(outcome)
    }
}

/// System: apply the switch rule to every cell
pub fn switch_cell_types(
    clock: Res<SimClock>,
    rule: Res<SwitchRule>,
    mut pending: ResMut<PendingSwitches>,
    mut cells: Query<
        (&CellId, &mut CellTypeId, &mut Phenotype, &mut SwitchState),
        With<Cell>,
    >,
) {
    let time = clock.current_time;
    if !rule.in_window(time) {
        return;
    }

    for (cell_id, mut cell_type, mut phenotype, mut state) in cells.iter_mut() {
        let Some((next, outcome)) = rule.decide(*cell_id, *state, *cell_type, time) else {
            continue;
        };
        rule.target.apply_to(&mut cell_type, &mut phenotype);
        *state = next;
        pending.push(outcome);
    }
}
