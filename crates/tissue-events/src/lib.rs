//! Shared event and snapshot types for the tissue seeding engine.
//!
//! This crate contains pure data structures with no simulation logic.
//! Renderers and analysis tools depend on it without pulling in the core.

pub mod colors;
pub mod event;
pub mod snapshot;

pub use colors::CellColors;
pub use event::*;
pub use snapshot::{
    generate_snapshot_id, AttributeSummarySnapshot, CellSnapshot, PopulationSnapshot,
    PositionSnapshot,
};
