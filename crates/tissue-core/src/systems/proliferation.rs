//! Oncoprotein Proliferation
//!
//! Scales each cell's live-cycle transition rate by its oncoprotein level.

use bevy_ecs::prelude::*;

use crate::components::{Cell, CellTypeId, CustomData, DefinitionRegistry, Phenotype};
use crate::error::ConfigError;
use crate::setup::definitions::ONCOPROTEIN;

/// Custom data slots looked up by name once, at setup
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhenotypeIndices {
    pub oncoprotein: usize,
}

impl PhenotypeIndices {
    /// Resolve slots against every registered definition.
    ///
    /// All definitions must carry the variable at the same slot, since a
    /// converted cell keeps its custom data.
    pub fn resolve(registry: &DefinitionRegistry) -> Result<Self, ConfigError> {
        let mut slot = None;
        for definition in registry.all() {
            let index = definition.custom_variable_index(ONCOPROTEIN).ok_or_else(|| {
                ConfigError::InvalidParameter {
                    name: "cells.custom_variables",
                    reason: format!("`{}` has no `{}` variable", definition.name, ONCOPROTEIN),
                }
            })?;
            match slot {
                None => slot = Some(index),
                Some(existing) if existing != index => {
                    return Err(ConfigError::InvalidParameter {
                        name: "cells.custom_variables",
                        reason: format!(
                            "`{}` is at slot {} in `{}` but {} elsewhere",
                            ONCOPROTEIN, index, definition.name, existing
                        ),
                    });
                }
                Some(_) => {}
            }
        }

        slot.map(|oncoprotein| Self { oncoprotein })
            .ok_or(ConfigError::MissingParameter("cells"))
    }
}

pub fn scaled_transition_rate(base_rate: f64, oncoprotein: f64) -> f64 {
    base_rate * oncoprotein
}

/// System: rate = definition base rate x oncoprotein, recomputed every step
pub fn scale_proliferation_by_oncoprotein(
    indices: Res<PhenotypeIndices>,
    registry: Res<DefinitionRegistry>,
    mut cells: Query<(&CellTypeId, &CustomData, &mut Phenotype), With<Cell>>,
) {
    for (cell_type, custom, mut phenotype) in cells.iter_mut() {
        let (Some(definition), Some(level)) =
            (registry.get(*cell_type), custom.get(indices.oncoprotein))
        else {
            continue;
        };
        let rate = scaled_transition_rate(definition.phenotype.cycle.transition_rate, level);
        if phenotype.cycle.transition_rate != rate {
            phenotype.cycle.transition_rate = rate;
        }
    }
}
