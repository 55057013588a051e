//! Configuration types for loading a simulation from YAML.
//!
//! The key paths mirror the configuration surface of the engine:
//!
//! ```yaml
//! physical:
//!   G0: 6.6743e-11
//! simulation:
//!   dim: 2
//!   seed: 42
//!   units:
//!     dist: { unit: kpc, val: 0.1 }
//!     time: { unit: Myear }
//!     mass: { unit: mass_sun }
//!   size:
//!     extent: { x: 100.0, y: 100.0 }
//!   integration: { type: leapfrog, dt: 0.001, t_end: 10.0 }
//!   engine: { theta: 0.5, eps: 0.05 }
//!   mass_distribution:
//!     type: simple_exponential
//!     N: 1000
//!     total_mass: 1.0e11
//!     lambda: 0.05
//!   plots:
//!     energy: { enable: true }
//! visualization:
//!   mode: console
//!   every: 100
//! ```
//!
//! Configuration errors belong to the construction tier: they surface before
//! the first step and never out of the step loop.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::simulation::integrator::Integrator;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unable to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("unrecognized unit '{0}'")]
    UnknownUnit(String),
    #[error("unsupported dimension {0} (expected 2 or 3)")]
    UnsupportedDimension(u32),
    #[error("required key '{0}' not found in configuration")]
    MissingKey(&'static str),
    #[error("invalid mass distribution: {0}")]
    InvalidDistribution(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub physical: PhysicalConfig,
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub visualization: VisualizationConfig,
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_yaml::from_str(&text)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhysicalConfig {
    #[serde(rename = "G0")]
    pub g0: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    pub dim: u32,
    #[serde(default = "default_seed")]
    pub seed: u64,
    pub units: UnitsConfig,
    pub size: SizeConfig,
    pub integration: IntegrationConfig,
    pub engine: EngineConfig,
    pub mass_distribution: DistributionConfig,
    #[serde(default)]
    pub plots: PlotsConfig,
}

fn default_seed() -> u64 {
    42
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitsConfig {
    pub dist: UnitSpec,
    pub time: UnitSpec,
    pub mass: UnitSpec,
}

/// Base unit symbol (with optional SI prefix) and multiplier.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitSpec {
    pub unit: String,
    #[serde(default = "default_unit_val")]
    pub val: f64,
}

fn default_unit_val() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct SizeConfig {
    pub extent: ExtentConfig,
}

/// Half-extents of the root bounding box, centered at the origin.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtentConfig {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl ExtentConfig {
    /// Per-axis half-extents for dimension `D`; `z` is required in 3D.
    pub fn half_extents<const D: usize>(&self) -> Result<[f64; D], ConfigError> {
        let mut out = [0.0; D];
        out[0] = self.x;
        out[1] = self.y;
        if D >= 3 {
            out[2] = self
                .z
                .ok_or(ConfigError::MissingKey("simulation.size.extent.z"))?;
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntegrationConfig {
    #[serde(rename = "type")]
    pub method: Integrator,
    pub dt: f64,
    pub t_end: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub theta: f64,
    pub eps: f64,
}

/// One mass distribution plus the rigid transform applied to the bodies it
/// appends.
#[derive(Debug, Clone, Deserialize)]
pub struct DistributionConfig {
    #[serde(flatten)]
    pub kind: DistributionKind,
    #[serde(default)]
    pub offset: OffsetConfig,
    #[serde(default)]
    pub rotation: RotationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DistributionKind {
    TestCase1 {
        total_mass: f64,
    },
    SimpleExponential {
        #[serde(rename = "N")]
        n: usize,
        total_mass: f64,
        lambda: f64,
    },
    SimpleExponentialSphere {
        #[serde(rename = "N")]
        n: usize,
        total_mass: f64,
        lambda: f64,
    },
    Composite {
        composite: Vec<DistributionConfig>,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OffsetConfig {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

/// Euler angles in degrees, applied as Rz * Ry * Rx. 3D only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RotationConfig {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl RotationConfig {
    pub fn is_identity(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlotsConfig {
    pub energy: Option<EnergyPlotConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnergyPlotConfig {
    #[serde(default = "default_true")]
    pub enable: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisualizationConfig {
    #[serde(default)]
    pub mode: VisualizerMode,
    #[serde(default = "default_every")]
    pub every: usize,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            mode: VisualizerMode::Console,
            every: default_every(),
        }
    }
}

fn default_every() -> usize {
    100
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizerMode {
    #[default]
    Console,
    Off,
}
