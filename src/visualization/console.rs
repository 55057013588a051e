//! Headless step reporter.
//!
//! Logs the simulation clock in the configured time unit together with tree
//! statistics gathered through the read-only node handles. Stands in for a
//! graphical frontend without pulling one into the core.

use crate::configuration::config::Config;
use crate::configuration::units::{Quantity, Units};
use crate::simulation::gravity::{BhNode, BhTree};
use crate::simulation::states::Body;

use super::Visualizer;

pub struct ConsoleVisualizer {
    time_unit: String,
    every: usize,
    step: usize,
}

impl ConsoleVisualizer {
    pub fn from_config(cfg: &Config, units: &Units) -> Self {
        Self {
            time_unit: units.unit(Quantity::Time).symbol.clone(),
            every: cfg.visualization.every.max(1),
            step: 0,
        }
    }
}

#[derive(Default)]
struct TreeStats {
    nodes: usize,
    leaves: usize,
    depth: usize,
}

fn gather<const D: usize>(node: &BhNode<D>, depth: usize, stats: &mut TreeStats) {
    stats.nodes += 1;
    stats.depth = stats.depth.max(depth);
    match node.children() {
        None => stats.leaves += 1,
        Some(children) => {
            for child in children {
                gather(child, depth + 1, stats);
            }
        }
    }
}

impl<const D: usize> Visualizer<D> for ConsoleVisualizer {
    fn show(&mut self, time: f64, bodies: &[Body<D>], tree: &BhTree<D>) {
        self.step += 1;
        if self.step % self.every != 0 {
            return;
        }

        let mut stats = TreeStats::default();
        gather(tree.root(), 0, &mut stats);

        log::info!(
            "t = {:.2} {}: {} bodies, {} in tree, {} nodes ({} leaves, depth {})",
            time,
            self.time_unit,
            bodies.len(),
            tree.root().accum().count,
            stats.nodes,
            stats.leaves,
            stats.depth,
        );
    }
}
