//! Cell Type Definitions
//!
//! Immutable templates of default phenotype parameters. Every cell carries
//! its own copy of a definition's [`Phenotype`]; converting a cell to another
//! type replaces that copy wholesale.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::cell::CellTypeId;

/// Name of the substrate cells exchange with the microenvironment
pub const OXYGEN: &str = "oxygen";

/// Cell size and orientation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Radius in micrometers
    pub radius: f64,
    pub polarity: f64,
}

/// Locomotion parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Motility {
    pub is_motile: bool,
    pub restrict_to_2d: bool,
}

/// Cell-cell contact mechanics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mechanics {
    pub cell_cell_adhesion_strength: f64,
    pub cell_cell_repulsion_strength: f64,
}

/// Secretion and uptake rates for one diffusing substrate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstrateExchange {
    pub substrate: String,
    pub secretion_rate: f64,
    pub uptake_rate: f64,
    pub saturation_density: f64,
}

/// Single-phase "live" cycle model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleParams {
    pub model: String,
    /// Live-to-live transition rate (1/min)
    pub transition_rate: f64,
}

/// Oxygen thresholds used by the host's oxygen-driven phenotype update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OxygenResponse {
    pub proliferation_saturation: f64,
    pub reference: f64,
}

/// Full type-dependent state of a cell
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phenotype {
    pub geometry: Geometry,
    pub motility: Motility,
    pub mechanics: Mechanics,
    pub secretion: Vec<SubstrateExchange>,
    pub cycle: CycleParams,
    pub oxygen: OxygenResponse,
}

impl Phenotype {
    pub fn exchange(&self, substrate: &str) -> Option<&SubstrateExchange> {
        self.secretion.iter().find(|s| s.substrate == substrate)
    }
}

/// A named custom scalar carried by every cell of a definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomVariable {
    pub name: String,
    pub units: String,
    pub default: f64,
}

impl CustomVariable {
    pub fn new(name: impl Into<String>, units: impl Into<String>, default: f64) -> Self {
        Self {
            name: name.into(),
            units: units.into(),
            default,
        }
    }
}

/// Immutable template shared by all cells of one type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellDefinition {
    pub type_id: CellTypeId,
    pub name: String,
    pub phenotype: Phenotype,
    pub custom_variables: Vec<CustomVariable>,
}

impl CellDefinition {
    /// Copy of a template under a new tag and name
    pub fn derived_from(template: &CellDefinition, type_id: CellTypeId, name: impl Into<String>) -> Self {
        Self {
            type_id,
            name: name.into(),
            ..template.clone()
        }
    }

    /// Initial custom data for a freshly created cell
    pub fn default_custom_data(&self) -> Vec<f64> {
        self.custom_variables.iter().map(|v| v.default).collect()
    }

    /// Overwrite a cell's tag and phenotype with this definition's
    pub fn apply_to(&self, type_id: &mut CellTypeId, phenotype: &mut Phenotype) {
        *type_id = self.type_id;
        *phenotype = self.phenotype.clone();
    }

    /// Slot index of a named custom variable
    pub fn custom_variable_index(&self, name: &str) -> Option<usize> {
        self.custom_variables.iter().position(|v| v.name == name)
    }
}

/// Maps a layout type tag to a definition
pub trait TypeResolver {
    fn resolve(&self, tag: i64) -> Option<&Arc<CellDefinition>>;
}

/// All definitions known to a run, keyed by tag.
///
/// Built once during setup and never mutated after seeding begins.
#[derive(Resource, Debug, Clone, Default)]
pub struct DefinitionRegistry {
    definitions: BTreeMap<CellTypeId, Arc<CellDefinition>>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, replacing any previous one with the same tag
    pub fn register(&mut self, definition: CellDefinition) -> Arc<CellDefinition> {
        let definition = Arc::new(definition);
        self.definitions
            .insert(definition.type_id, Arc::clone(&definition));
        definition
    }

    pub fn get(&self, type_id: CellTypeId) -> Option<&Arc<CellDefinition>> {
        self.definitions.get(&type_id)
    }

    pub fn name_of(&self, type_id: CellTypeId) -> Option<&str> {
        self.get(type_id).map(|d| d.name.as_str())
    }

    pub fn type_ids(&self) -> impl Iterator<Item = CellTypeId> + '_ {
        self.definitions.keys().copied()
    }

    pub fn all(&self) -> impl Iterator<Item = &Arc<CellDefinition>> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl TypeResolver for DefinitionRegistry {
    fn resolve(&self, tag: i64) -> Option<&Arc<CellDefinition>> {
        let tag = u32::try_from(tag).ok()?;
        self.get(CellTypeId(tag))
    }
}
