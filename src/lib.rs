pub mod benchmark;
pub mod configuration;
pub mod orthtree;
pub mod simulation;
pub mod spatial;
pub mod visualization;

pub use configuration::config::{Config, ConfigError};
pub use configuration::units::{Quantity, Units};

pub use simulation::engine::TreeEngine;
pub use simulation::gravity::{BarnesHut, BhPolicy, BhTree, MassMoments, TreeBody};
pub use simulation::integrator::Integrator;
pub use simulation::states::Body;

pub use orthtree::{Accumulate, Orthtree, TreePolicy};
pub use spatial::{BBox, Point, Vect};

pub use visualization::{ConsoleVisualizer, EnergyPlot, NullVisualizer, Visualizer};

pub use benchmark::bench_forces;
