//! Per-step Systems

pub mod coloring;
pub mod proliferation;
pub mod switch;

pub use coloring::color_for;
pub use proliferation::{scale_proliferation_by_oncoprotein, scaled_transition_rate, PhenotypeIndices};
pub use switch::{
    switch_cell_types, PendingSwitches, SwitchOutcome, SwitchRule, DEFAULT_SWITCH_TIME,
    DEFAULT_SWITCH_WINDOW,
};
