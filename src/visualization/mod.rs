//! Output sinks driven by the engine once per step.
//!
//! The engine hands each step's time, body list and freshly built tree to an
//! injected [`Visualizer`]; the sink may ask the run to stop via
//! [`Visualizer::poll_close`]. Rendering backends are out of scope here, so
//! the provided implementations are headless.

pub mod console;
pub mod plots;

pub use console::ConsoleVisualizer;
pub use plots::EnergyPlot;

use crate::configuration::config::{Config, VisualizerMode};
use crate::configuration::units::Units;
use crate::simulation::gravity::BhTree;
use crate::simulation::states::Body;

pub trait Visualizer<const D: usize> {
    fn show(&mut self, time: f64, bodies: &[Body<D>], tree: &BhTree<D>);

    /// Polled by the engine after every step; `true` stops the run.
    fn poll_close(&mut self) -> bool {
        false
    }
}

/// Swallows every frame. Used when visualization is disabled and in tests.
#[derive(Debug, Default)]
pub struct NullVisualizer;

impl<const D: usize> Visualizer<D> for NullVisualizer {
    fn show(&mut self, _time: f64, _bodies: &[Body<D>], _tree: &BhTree<D>) {}
}

/// Build the configured sink.
pub fn from_config<const D: usize>(cfg: &Config, units: &Units) -> Box<dyn Visualizer<D>> {
    match cfg.visualization.mode {
        VisualizerMode::Console => Box::new(ConsoleVisualizer::from_config(cfg, units)),
        VisualizerMode::Off => Box::new(NullVisualizer),
    }
}
