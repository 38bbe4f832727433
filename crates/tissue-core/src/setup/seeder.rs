//! Population Seeder
//!
//! Turns placement records into cells. A pass either completes or removes
//! every cell it created. Ids handed out to removed cells are not reused.

use std::collections::BTreeMap;
use std::fmt;

use super::layout::{LayoutKind, LayoutSource, MalformedRecord};
use crate::components::{CellTypeId, Position, TypeResolver};
use crate::error::SeedError;
use crate::output::stats::AttributeSummary;
use crate::runtime::AgentRuntime;

/// Custom data slot that receives a record's sampled attribute
pub const ATTRIBUTE_SLOT: usize = 0;

/// Dimensionality of the seeded domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpatialMode {
    /// Every cell is placed on z = 0
    #[default]
    Planar,
    Volumetric,
}

impl SpatialMode {
    fn place(&self, position: Position) -> Position {
        match self {
            SpatialMode::Planar => position.flattened(),
            SpatialMode::Volumetric => position,
        }
    }
}

/// Outcome of one seeding pass
#[derive(Debug, Clone, PartialEq)]
pub struct SeedReport {
    pub layout: LayoutKind,
    pub cells_created: usize,
    pub by_type: BTreeMap<CellTypeId, usize>,
    /// Statistics over custom data slot 0 of the cells created in this pass
    pub attribute: Option<AttributeSummary>,
    /// First malformed row of a recorded layout that stopped early
    pub truncated_at: Option<MalformedRecord>,
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Seeded {} cells from {} layout",
            self.cells_created,
            self.layout.as_str()
        )?;
        for (type_id, count) in &self.by_type {
            writeln!(f, "  type {}: {}", type_id, count)?;
        }
        if let Some(truncated) = &self.truncated_at {
            writeln!(f, "  layout truncated at line {}", truncated.line)?;
        }
        if let Some(attribute) = &self.attribute {
            writeln!(f, "Oncoprotein summary:")?;
            writeln!(f, "===================")?;
            writeln!(f, "{}", attribute)?;
        }
        Ok(())
    }
}

/// Seed every record of `layout` into `runtime`.
///
/// Records are processed in order. An unknown type tag, a rejected
/// malformed row, or a read failure removes every cell created so far in
/// this pass and returns the error.
pub fn seed<R, L, T>(
    runtime: &mut R,
    layout: &mut L,
    resolver: &T,
    mode: SpatialMode,
) -> Result<SeedReport, SeedError>
where
    R: AgentRuntime,
    L: LayoutSource + ?Sized,
    T: TypeResolver + ?Sized,
{
    let mut created = Vec::new();

    match seed_records(runtime, layout, resolver, mode, &mut created) {
        Ok(by_type) => {
            let values: Vec<f64> = created
                .iter()
                .filter_map(|&agent| runtime.custom_data(agent, ATTRIBUTE_SLOT))
                .collect();

            let report = SeedReport {
                layout: layout.kind(),
                cells_created: created.len(),
                by_type,
                attribute: AttributeSummary::from_values(&values),
                truncated_at: layout.truncated_at().cloned(),
            };
            tracing::info!(
                "Seeded {} cells from {} layout",
                report.cells_created,
                report.layout.as_str()
            );
            Ok(report)
        }
        Err(e) => {
            for &agent in &created {
                runtime.remove_agent(agent);
            }
            tracing::warn!(
                "Seeding failed, rolled back {} cells: {}",
                created.len(),
                e
            );
            Err(e)
        }
    }
}

fn seed_records<R, L, T>(
    runtime: &mut R,
    layout: &mut L,
    resolver: &T,
    mode: SpatialMode,
    created: &mut Vec<R::Handle>,
) -> Result<BTreeMap<CellTypeId, usize>, SeedError>
where
    R: AgentRuntime,
    L: LayoutSource + ?Sized,
    T: TypeResolver + ?Sized,
{
    let mut by_type = BTreeMap::new();

    while let Some(record) = layout.next_record()? {
        let definition = resolver
            .resolve(record.type_tag)
            .ok_or_else(|| SeedError::TypeResolution {
                tag: record.type_tag,
                record: created.len(),
            })?;

        let agent = runtime.create_agent(definition);
        created.push(agent);

        let position = mode.place(record.position);
        runtime.assign_position(agent, position);
        if let Some(value) = record.attribute {
            runtime.set_custom_data(agent, ATTRIBUTE_SLOT, value);
        }

        tracing::debug!(
            "cell type {}: x,y = {},{}",
            definition.type_id,
            position.x,
            position.y
        );
        *by_type.entry(definition.type_id).or_insert(0) += 1;
    }

    Ok(by_type)
}
