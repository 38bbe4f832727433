//! Tissue Seeding Engine Library
//!
//! Seeds a 2D cell population from a recorded or procedurally packed
//! layout and applies the time-gated type switch during the step loop.

pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod output;
pub mod runtime;
pub mod setup;
pub mod systems;

pub use components::*;
pub use config::TissueConfig;
pub use error::{ConfigError, SeedError};
pub use runtime::{AgentRuntime, EcsRuntime, InMemoryRuntime, SimClock};
pub use setup::{setup_tissue, SeedReport, TissueSetup};
