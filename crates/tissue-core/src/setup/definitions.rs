//! Cell Type Setup
//!
//! Creates the embedded and enveloping cell definitions from a shared
//! default template.

use crate::components::{
    CellDefinition, CellTypeId, CustomVariable, CycleParams, DefinitionRegistry, Geometry,
    Mechanics, Motility, OxygenResponse, Phenotype, SubstrateExchange, OXYGEN,
};

/// Tag of the embedded cell type
pub const EMBED_TYPE: CellTypeId = CellTypeId(0);
/// Tag of the enveloping cell type
pub const ENVELOP_TYPE: CellTypeId = CellTypeId(1);

/// Name of the custom variable holding the sampled oncoprotein level
pub const ONCOPROTEIN: &str = "oncoprotein";

/// Radius of a cell with the default 2494 cubic micron volume
pub const DEFAULT_CELL_RADIUS: f64 = 8.412710547954228;

/// Parameters shared by every cell type before type-specific overrides
pub fn default_cell_definition(radius: f64) -> CellDefinition {
    CellDefinition {
        type_id: CellTypeId(0),
        name: "default".into(),
        phenotype: Phenotype {
            geometry: Geometry {
                radius,
                polarity: 1.0,
            },
            // Not motile, and kept in the plane
            motility: Motility {
                is_motile: false,
                restrict_to_2d: true,
            },
            mechanics: Mechanics {
                cell_cell_adhesion_strength: 0.0,
                cell_cell_repulsion_strength: 5.0,
            },
            secretion: vec![SubstrateExchange {
                substrate: OXYGEN.into(),
                secretion_rate: 0.0,
                uptake_rate: 10.0,
                saturation_density: 38.0,
            }],
            cycle: CycleParams {
                model: "live".into(),
                transition_rate: 0.0,
            },
            oxygen: OxygenResponse {
                proliferation_saturation: 38.0,
                reference: 38.0,
            },
        },
        custom_variables: vec![CustomVariable::new(ONCOPROTEIN, "dimensionless", 1.0)],
    }
}

/// Build the registry holding both cell types
pub fn create_cell_types(radius: f64) -> DefinitionRegistry {
    let defaults = default_cell_definition(radius);
    let mut registry = DefinitionRegistry::new();

    // === EMBEDDED ===
    // The only proliferating type
    let mut embed = CellDefinition::derived_from(&defaults, EMBED_TYPE, "embed cell");
    embed.phenotype.cycle.transition_rate = 0.01;
    registry.register(embed);

    // === ENVELOPING ===
    let mut envelop = CellDefinition::derived_from(&defaults, ENVELOP_TYPE, "envelop cell");
    envelop.phenotype.cycle.transition_rate = 0.0;
    registry.register(envelop);

    registry
}
