//! The tree simulation engine.
//!
//! Owns the body list and the clock. Every step rebuilds the spatial tree
//! from scratch (the tree is a transient index, dropped before the step
//! returns), evaluates acceleration and potential per body by Barnes-Hut
//! traversal, feeds the sinks, and advances the state with the configured
//! integrator. The force pass runs body-parallel; results are collected in
//! body order and the potential is reduced sequentially, so a run is
//! deterministic for a fixed seed regardless of thread count.

use std::ops::Range;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::configuration::config::{Config, ConfigError};
use crate::configuration::units::Units;
use crate::orthtree::Orthtree;
use crate::spatial::{is_finite, BBox, Point, Vect};
use crate::visualization::{self, EnergyPlot, NullVisualizer, Visualizer};

use super::gravity::{BarnesHut, BhPolicy, BhTree, TreeBody};
use super::integrator::Integrator;
use super::mass_distribution;
use super::states::Body;

/// Leaf capacity of the force tree. One body per leaf is the classic
/// Barnes-Hut configuration; near-coincident bodies are separated by deeper
/// subdivision.
const NODE_CAPACITY: usize = 1;

pub struct TreeEngine<const D: usize> {
    pub bodies: Vec<Body<D>>,
    pub time: f64,
    pub bbox: BBox<D>,
    pub dt: f64,
    pub gravity: BarnesHut,
    pub integrator: Integrator,
    visualizer: Box<dyn Visualizer<D>>,
    energy: Option<EnergyPlot>,
}

impl<const D: usize> TreeEngine<D> {
    pub fn new(
        bbox: BBox<D>,
        dt: f64,
        theta: f64,
        eps: f64,
        g: f64,
        integrator: Integrator,
    ) -> Self {
        Self {
            bodies: Vec::new(),
            time: 0.0,
            bbox,
            dt,
            gravity: BarnesHut { g, theta, eps },
            integrator,
            visualizer: Box::new(NullVisualizer),
            energy: None,
        }
    }

    pub fn with_visualizer(mut self, visualizer: Box<dyn Visualizer<D>>) -> Self {
        self.visualizer = visualizer;
        self
    }

    pub fn with_energy_log(mut self) -> Self {
        self.energy = Some(EnergyPlot::new());
        self
    }

    /// Build a fully initialized engine: parameters and unit-rescaled G,
    /// bodies from the configured mass distribution (each slice velocity-
    /// initialized against the potential), recentered to centroidal
    /// coordinates.
    pub fn from_config(cfg: &Config, units: &Units) -> Result<Self, ConfigError> {
        let sim = &cfg.simulation;
        let half = sim.size.extent.half_extents::<D>()?;
        let bbox = BBox::new(Point::<D>::zeros(), Vect::from(half));

        let mut engine = Self::new(
            bbox,
            sim.integration.dt,
            sim.engine.theta,
            sim.engine.eps,
            units.g(),
            sim.integration.method,
        )
        .with_visualizer(visualization::from_config(cfg, units));

        if sim.plots.energy.as_ref().is_some_and(|e| e.enable) {
            engine = engine.with_energy_log();
        }

        let mut rng = ChaCha8Rng::seed_from_u64(sim.seed);
        mass_distribution::populate(&sim.mass_distribution, &mut engine, &mut rng)?;
        engine.recenter();

        log::info!(
            "engine ready: {} bodies, dt = {}, theta = {}, eps = {}, G = {:.4e}",
            engine.bodies.len(),
            engine.dt,
            engine.gravity.theta,
            engine.gravity.eps,
            engine.gravity.g,
        );
        Ok(engine)
    }

    /// Insert every live body into a fresh tree over the root box. Bodies
    /// outside the box (or with non-finite positions) are excluded from this
    /// step's tree and feel no gravity until they are back inside.
    pub fn build_tree(&self) -> BhTree<D> {
        let mut tree = Orthtree::new(
            BhPolicy {
                node_capacity: NODE_CAPACITY,
            },
            self.bbox,
        );

        let mut dropped = 0usize;
        for (id, body) in self.bodies.iter().enumerate() {
            if !is_finite(&body.pos) || !tree.insert(TreeBody::of(id, body)) {
                dropped += 1;
            }
        }
        if dropped > 0 {
            log::debug!("excluded {dropped} bodies outside the root box from this step's tree");
        }
        tree
    }

    /// Give each body in `range` the circular-orbit velocity consistent with
    /// the current potential (2D). In 3D bodies keep the velocity their
    /// distribution assigned.
    pub fn init_vels(&mut self, range: Range<usize>) {
        if D != 2 {
            return;
        }

        let tree = self.build_tree();
        let gravity = self.gravity;
        for i in range {
            let body = &self.bodies[i];
            let (acc, _) = gravity.eval(&tree, i, body.pos, body.mass);
            let vel = circular_orbit_velocity(body.pos, &acc);
            self.bodies[i].vel = vel;
        }
    }

    /// Shift to centroidal coordinates: mass-weighted mean position and
    /// velocity both become zero.
    pub fn recenter(&mut self) {
        let total_mass: f64 = self.bodies.iter().map(|b| b.mass).sum();
        if total_mass == 0.0 {
            return;
        }

        let mut pos_mean = Vect::<D>::zeros();
        let mut vel_mean = Vect::<D>::zeros();
        for body in &self.bodies {
            pos_mean += body.pos * body.mass;
            vel_mean += body.vel * body.mass;
        }
        pos_mean /= total_mass;
        vel_mean /= total_mass;

        for body in &mut self.bodies {
            body.pos -= pos_mean;
            body.vel -= vel_mean;
        }
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.bodies
            .iter()
            .map(|b| 0.5 * b.mass * b.vel.norm_squared())
            .sum()
    }

    pub fn energy(&self) -> Option<&EnergyPlot> {
        self.energy.as_ref()
    }

    /// Advance the system by one step. Accelerations are taken from the tree
    /// state at the beginning of the step; no body moves mid-pass. Returns
    /// `false` when the visualization sink asks to stop.
    pub fn step(&mut self) -> bool {
        let tree = self.build_tree();

        let gravity = self.gravity;
        let forces: Vec<(Vect<D>, f64)> = self
            .bodies
            .par_iter()
            .enumerate()
            .map(|(id, body)| gravity.eval(&tree, id, body.pos, body.mass))
            .collect();

        if let Some(energy) = &mut self.energy {
            let kin: f64 = self
                .bodies
                .iter()
                .map(|b| 0.5 * b.mass * b.vel.norm_squared())
                .sum();
            let pot: f64 = forces.iter().map(|(_, p)| p).sum();
            energy.log(kin, pot);
            energy.show();
        }

        self.visualizer.show(self.time, &self.bodies, &tree);
        if self.visualizer.poll_close() {
            return false;
        }

        let integrator = self.integrator;
        let dt = self.dt;
        for (body, (acc, _)) in self.bodies.iter_mut().zip(&forces) {
            integrator.advance(body, dt, acc);
        }
        self.time += dt;

        true
    }
}

/// Circular-orbit velocity for a planar body: the tangential speed that
/// balances the inward radial pull at its radius, rotated a quarter turn
/// from the position angle. A body at the origin (or feeling no inward
/// pull) starts at rest.
fn circular_orbit_velocity<const D: usize>(pos: Point<D>, acc: &Vect<D>) -> Vect<D> {
    let r = pos.norm();
    let mut vel = Vect::<D>::zeros();
    if r == 0.0 {
        return vel;
    }

    let ang = pos[1].atan2(pos[0]);
    let a_r = (-pos.dot(acc) / r).max(0.0);
    let v_t = (a_r * r).sqrt();

    vel[0] = v_t * (ang - std::f64::consts::FRAC_PI_2).cos();
    vel[1] = v_t * (ang - std::f64::consts::FRAC_PI_2).sin();
    vel
}
