//! Configuration loading for the tissue seeder.
//!
//! All run settings are loaded from a TOML file. Every section has
//! defaults except the packed-cluster parameters, which have no sensible
//! fallback and must be given when `layout.mode = "packed"`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, SeedError};
use crate::setup::definitions::{DEFAULT_CELL_RADIUS, EMBED_TYPE, ENVELOP_TYPE};
use crate::setup::layout::{
    cell_spacing, estimated_lattice_size, LayoutKind, MalformedPolicy, MAX_PACKED_CELLS,
};
use crate::setup::sampler::SamplingSpec;
use crate::systems::{DEFAULT_SWITCH_TIME, DEFAULT_SWITCH_WINDOW};

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "tissue.toml";

/// Complete run configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TissueConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub domain: DomainConfig,
    #[serde(default)]
    pub cells: CellsConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    /// Required for packed layouts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oncoprotein: Option<OncoproteinConfig>,
    #[serde(default)]
    pub switch: SwitchConfig,
    #[serde(default)]
    pub proliferation: ProliferationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl TissueConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads `path` if it exists, otherwise the defaults.
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every parameter setup depends on
    pub fn validate(&self) -> Result<(), SeedError> {
        let sim = &self.simulation;
        positive("simulation.dt", sim.dt)?;
        non_negative("simulation.max_time", sim.max_time)?;
        non_negative("simulation.snapshot_interval", sim.snapshot_interval)?;
        positive("cells.radius", self.cells.radius)?;

        if self.layout.mode == LayoutKind::Packed {
            let cluster = self
                .layout
                .cluster
                .as_ref()
                .ok_or(ConfigError::MissingParameter("layout.cluster"))?;
            positive("layout.cluster.tumor_radius", cluster.tumor_radius)?;
            let radius = cluster.tumor_radius;
            if !(radius * radius).is_finite() {
                return Err(invalid("layout.cluster.tumor_radius", radius).into());
            }
            let estimate = estimated_lattice_size(radius, cell_spacing(self.cells.radius));
            if estimate > MAX_PACKED_CELLS {
                return Err(ConfigError::InvalidParameter {
                    name: "layout.cluster.tumor_radius",
                    reason: format!(
                        "{} would pack about {:.0} cells, more than {}",
                        radius, estimate, MAX_PACKED_CELLS
                    ),
                }
                .into());
            }

            self.oncoprotein
                .as_ref()
                .ok_or(ConfigError::MissingParameter("oncoprotein"))?
                .sampling_spec()?;
        }

        if self.switch.enabled {
            positive("switch.window", self.switch.window)?;
            if !self.switch.threshold_time.is_finite() {
                return Err(invalid("switch.threshold_time", self.switch.threshold_time).into());
            }
        }

        Ok(())
    }

    /// Number of steps to reach `max_time`
    pub fn total_steps(&self) -> u64 {
        (self.simulation.max_time / self.simulation.dt).round() as u64
    }

    /// Steps between periodic snapshots, zero when disabled
    pub fn snapshot_steps(&self) -> u64 {
        let interval = self.simulation.snapshot_interval;
        if interval <= 0.0 {
            return 0;
        }
        ((interval / self.simulation.dt).round() as u64).max(1)
    }
}

fn invalid(name: &'static str, value: f64) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: format!("got {}", value),
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be a positive finite number, got {}", value),
        })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(name, value))
    }
}

/// Step loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    /// Phenotype step in minutes
    pub dt: f64,
    /// Simulated minutes to run after setup
    pub max_time: f64,
    /// Simulated minutes between snapshots; 0 disables periodic snapshots
    pub snapshot_interval: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            dt: 0.1,
            max_time: 240.0,
            snapshot_interval: 60.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainConfig {
    /// 3D is not supported; `false` is overridden with a warning
    pub simulate_2d: bool,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self { simulate_2d: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CellsConfig {
    pub radius: f64,
}

impl Default for CellsConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_CELL_RADIUS,
        }
    }
}

/// Where initial cell positions come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub mode: LayoutKind,
    /// `x y z type` rows, used by recorded layouts
    pub cell_file: PathBuf,
    pub on_malformed: MalformedPolicy,
    /// Required for packed layouts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<ClusterConfig>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            mode: LayoutKind::Recorded,
            cell_file: PathBuf::from("data/cells.dat"),
            on_malformed: MalformedPolicy::Stop,
            cluster: None,
        }
    }
}

/// Disk of hex-packed cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub tumor_radius: f64,
    pub type_tag: i64,
}

/// Clamped normal distribution of the per-cell oncoprotein level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OncoproteinConfig {
    pub mean: f64,
    pub sd: f64,
    pub min: f64,
    pub max: f64,
}

impl OncoproteinConfig {
    pub fn sampling_spec(&self) -> Result<SamplingSpec, SeedError> {
        SamplingSpec::new(self.mean, self.sd, self.min, self.max)
    }
}

/// Time-gated type switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchConfig {
    pub enabled: bool,
    pub threshold_time: f64,
    pub window: f64,
    pub source_type: u32,
    pub target_type: u32,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_time: DEFAULT_SWITCH_TIME,
            window: DEFAULT_SWITCH_WINDOW,
            source_type: EMBED_TYPE.0,
            target_type: ENVELOP_TYPE.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProliferationConfig {
    pub scale_by_oncoprotein: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub write_events: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            write_events: true,
        }
    }
}
