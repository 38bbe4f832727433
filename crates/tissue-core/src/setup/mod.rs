//! Tissue Setup
//!
//! Cell type creation, layout sources, attribute sampling, and the seeding
//! pass, plus the entry point that wires them together from configuration.

pub mod definitions;
pub mod layout;
pub mod sampler;
pub mod seeder;

pub use definitions::*;
pub use layout::{
    cell_spacing, lattice_positions, parse_record, LayoutKind, LayoutSource, MalformedPolicy,
    MalformedRecord, PackedCluster, PlacementRecord, RecordedLayout,
};
pub use sampler::{AttributeSampler, SamplingSpec};
pub use seeder::{seed, SeedReport, SpatialMode, ATTRIBUTE_SLOT};

use rand::Rng;
use std::sync::Arc;

use crate::components::{CellTypeId, DefinitionRegistry};
use crate::config::{DomainConfig, SwitchConfig, TissueConfig};
use crate::error::{ConfigError, SeedError};
use crate::runtime::AgentRuntime;
use crate::systems::{PhenotypeIndices, SwitchRule};

/// Everything setup resolved, ready to hand to the step loop
#[derive(Debug)]
pub struct TissueSetup {
    pub registry: DefinitionRegistry,
    /// `None` when the switch is disabled
    pub switch_rule: Option<SwitchRule>,
    pub indices: PhenotypeIndices,
    pub spatial_mode: SpatialMode,
    pub report: SeedReport,
}

/// Only 2D domains are supported; a 3D request is overridden.
pub fn spatial_mode(domain: &DomainConfig) -> SpatialMode {
    if !domain.simulate_2d {
        tracing::warn!("This setup only supports 2D domains; overriding to 2D");
    }
    SpatialMode::Planar
}

/// Resolve the switch's source and target tags against the registry
pub fn resolve_switch_rule(
    params: &SwitchConfig,
    registry: &DefinitionRegistry,
    dt: f64,
) -> Result<SwitchRule, ConfigError> {
    let source = CellTypeId(params.source_type);
    if registry.get(source).is_none() {
        return Err(ConfigError::InvalidParameter {
            name: "switch.source_type",
            reason: format!("no cell type {}", source),
        });
    }
    let target = registry
        .get(CellTypeId(params.target_type))
        .ok_or_else(|| ConfigError::InvalidParameter {
            name: "switch.target_type",
            reason: format!("no cell type {}", params.target_type),
        })?;

    let rule = SwitchRule::new(params.threshold_time, params.window, source, Arc::clone(target));
    rule.check_cadence(dt)?;
    Ok(rule)
}

/// Build cell types and seed the initial population into `runtime`.
///
/// `rng` is only drawn from for packed layouts.
pub fn setup_tissue<R, G>(
    config: &TissueConfig,
    runtime: &mut R,
    rng: &mut G,
) -> Result<TissueSetup, SeedError>
where
    R: AgentRuntime,
    G: Rng + ?Sized,
{
    config.validate()?;
    let mode = spatial_mode(&config.domain);

    let registry = create_cell_types(config.cells.radius);
    tracing::info!("Created {} cell types", registry.len());
    let indices = PhenotypeIndices::resolve(&registry)?;

    let switch_rule = if config.switch.enabled {
        Some(resolve_switch_rule(&config.switch, &registry, config.simulation.dt)?)
    } else {
        None
    };

    let report = match config.layout.mode {
        LayoutKind::Recorded => {
            let mut layout =
                RecordedLayout::open(&config.layout.cell_file, config.layout.on_malformed)?;
            seed(runtime, &mut layout, &registry, mode)?
        }
        LayoutKind::Packed => {
            let cluster = config
                .layout
                .cluster
                .as_ref()
                .ok_or(ConfigError::MissingParameter("layout.cluster"))?;
            let oncoprotein = config
                .oncoprotein
                .as_ref()
                .ok_or(ConfigError::MissingParameter("oncoprotein"))?;
            let sampler = AttributeSampler::new(oncoprotein.sampling_spec()?)?;

            let mut layout = PackedCluster::new(
                cluster.tumor_radius,
                config.cells.radius,
                cluster.type_tag,
                sampler,
                rng,
            );
            seed(runtime, &mut layout, &registry, mode)?
        }
    };

    for line in report.to_string().lines() {
        tracing::info!("{}", line);
    }

    Ok(TissueSetup {
        registry,
        switch_rule,
        indices,
        spatial_mode: mode,
        report,
    })
}
