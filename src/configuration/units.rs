//! Physical units of the simulation.
//!
//! Each of the three base quantities (distance, time, mass) is configured as
//! a unit symbol with an optional SI prefix plus a multiplier, e.g.
//! `{ unit: kpc, val: 0.1 }`. The gravitational constant is rescaled from SI
//! into simulation units as
//!
//! ```text
//! G = G0 * time_si^2 * mass_si / dist_si^3
//! ```

use std::fmt;

use crate::configuration::config::{Config, ConfigError, UnitSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    Dist,
    Time,
    Mass,
}

/// One configured base unit: its symbol, the configured multiplier, and the
/// resulting size of one simulation unit in SI.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationUnit {
    pub symbol: String,
    pub value: f64,
    pub si_value: f64,
}

impl fmt::Display for SimulationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.symbol)
    }
}

const SI_PREFIXES: [(&str, i32); 24] = [
    ("Q", 30),
    ("R", 27),
    ("Y", 24),
    ("Z", 21),
    ("E", 18),
    ("P", 15),
    ("T", 12),
    ("G", 9),
    ("M", 6),
    ("k", 3),
    ("h", 2),
    ("da", 1),
    ("d", -1),
    ("c", -2),
    ("m", -3),
    ("μ", -6),
    ("n", -9),
    ("p", -12),
    ("f", -15),
    ("a", -18),
    ("z", -21),
    ("y", -24),
    ("r", -27),
    ("q", -30),
];

/// Base symbols and their SI values. `g` is the gram, hence 1e-3 kg.
const BASE_UNITS: [(&str, f64); 6] = [
    ("m", 1.0),
    ("s", 1.0),
    ("g", 1e-3),
    ("pc", 3.085677581e16),
    ("year", 60.0 * 60.0 * 24.0 * 365.0),
    ("mass_sun", 1.989e30),
];

fn si_prefix(prefix: &str) -> Option<i32> {
    SI_PREFIXES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, e)| *e)
}

/// SI value of a unit symbol such as `kpc`, `Myear` or `mass_sun`.
fn to_base_units(symbol: &str) -> Option<f64> {
    for (base, value) in BASE_UNITS {
        if let Some(prefix) = symbol.strip_suffix(base) {
            if prefix.is_empty() {
                return Some(value);
            }
            if let Some(exp) = si_prefix(prefix) {
                return Some(value * 10f64.powi(exp));
            }
        }
    }
    None
}

#[derive(Debug, Clone, PartialEq)]
pub struct Units {
    g0: f64,
    dist: SimulationUnit,
    time: SimulationUnit,
    mass: SimulationUnit,
}

impl Units {
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        let units = &cfg.simulation.units;
        Ok(Self {
            g0: cfg.physical.g0,
            dist: Self::resolve(&units.dist)?,
            time: Self::resolve(&units.time)?,
            mass: Self::resolve(&units.mass)?,
        })
    }

    fn resolve(spec: &UnitSpec) -> Result<SimulationUnit, ConfigError> {
        let base = to_base_units(&spec.unit)
            .ok_or_else(|| ConfigError::UnknownUnit(spec.unit.clone()))?;
        Ok(SimulationUnit {
            symbol: spec.unit.clone(),
            value: spec.val,
            si_value: base * spec.val,
        })
    }

    pub fn unit(&self, q: Quantity) -> &SimulationUnit {
        match q {
            Quantity::Dist => &self.dist,
            Quantity::Time => &self.time,
            Quantity::Mass => &self.mass,
        }
    }

    pub fn base_unit(&self, q: Quantity) -> f64 {
        self.unit(q).si_value
    }

    /// Gravitational constant in simulation units.
    pub fn g(&self) -> f64 {
        let dist = self.base_unit(Quantity::Dist);
        let time = self.base_unit(Quantity::Time);
        let mass = self.base_unit(Quantity::Mass);
        self.g0 * (time * time) / (dist * dist * dist) * mass
    }
}
