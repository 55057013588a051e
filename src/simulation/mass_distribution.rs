//! Mass distributions: the pluggable initial-conditions layer.
//!
//! Every distribution appends bodies to the engine, asks it to initialize
//! their velocities against the potential of everything added so far, and
//! then applies the configured rigid transform (translation, plus an Euler
//! rotation in 3D) to the newly appended slice. `composite` chains any of
//! the others, sharing one seeded RNG so runs stay reproducible.

use std::f64::consts::PI;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp};

use crate::configuration::config::{ConfigError, DistributionConfig, DistributionKind};
use crate::spatial::{is_finite, rotate3, rotation_xyz, Point, Vect};

use super::engine::TreeEngine;
use super::states::Body;

fn deg2rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Append the configured distribution to the engine.
pub fn populate<const D: usize>(
    cfg: &DistributionConfig,
    engine: &mut TreeEngine<D>,
    rng: &mut ChaCha8Rng,
) -> Result<(), ConfigError> {
    match &cfg.kind {
        DistributionKind::TestCase1 { total_mass } => {
            let prev = engine.bodies.len();
            test_case_1(*total_mass, engine);
            finish(cfg, engine, prev)
        }
        DistributionKind::SimpleExponential {
            n,
            total_mass,
            lambda,
        } => {
            let prev = engine.bodies.len();
            simple_exponential(*n, *total_mass, *lambda, engine, rng)?;
            finish(cfg, engine, prev)
        }
        DistributionKind::SimpleExponentialSphere {
            n,
            total_mass,
            lambda,
        } => {
            if D < 3 {
                return Err(ConfigError::InvalidDistribution(
                    "simple_exponential_sphere requires dim = 3".into(),
                ));
            }
            let prev = engine.bodies.len();
            simple_exponential_sphere(*n, *total_mass, *lambda, engine, rng)?;
            finish(cfg, engine, prev)
        }
        DistributionKind::Composite { composite } => {
            for sub in composite {
                populate(sub, engine, rng)?;
            }
            // Offset/rotation of the composite itself would re-transform the
            // sub-distributions; each sub carries its own transform instead.
            Ok(())
        }
    }
}

/// Velocity initialization plus the per-distribution transform for the
/// freshly appended slice.
fn finish<const D: usize>(
    cfg: &DistributionConfig,
    engine: &mut TreeEngine<D>,
    prev: usize,
) -> Result<(), ConfigError> {
    engine.init_vels(prev..engine.bodies.len());
    transform(cfg, &mut engine.bodies[prev..]);
    debug_assert!(engine.bodies[prev..].iter().all(|b| is_finite(&b.pos)));
    Ok(())
}

/// Translate and (in 3D) rotate a slice of bodies. Rotation is an Euler
/// tuple in degrees applied as Rz * Ry * Rx to positions and velocities;
/// the offset shifts positions only.
fn transform<const D: usize>(cfg: &DistributionConfig, bodies: &mut [Body<D>]) {
    if D >= 3 && !cfg.rotation.is_identity() {
        let m = rotation_xyz(
            deg2rad(cfg.rotation.x),
            deg2rad(cfg.rotation.y),
            deg2rad(cfg.rotation.z),
        );
        for body in bodies.iter_mut() {
            body.pos = rotate3(&m, &body.pos);
            body.vel = rotate3(&m, &body.vel);
        }
    }

    let mut offset = Vect::<D>::zeros();
    offset[0] = cfg.offset.x;
    offset[1] = cfg.offset.y;
    if D >= 3 {
        offset[2] = cfg.offset.z;
    }

    for body in bodies.iter_mut() {
        body.pos += offset;
    }
}

/// Two equal bodies on the x axis at +-20 simulation units.
fn test_case_1<const D: usize>(total_mass: f64, engine: &mut TreeEngine<D>) {
    for x in [-20.0, 20.0] {
        let mut pos = Point::<D>::zeros();
        pos[0] = x;
        engine
            .bodies
            .push(Body::new(pos, Vect::zeros(), total_mass / 2.0));
    }
}

/// Planar disk: radius Exp(lambda), angle uniform, equal masses.
fn simple_exponential<const D: usize>(
    n: usize,
    total_mass: f64,
    lambda: f64,
    engine: &mut TreeEngine<D>,
    rng: &mut ChaCha8Rng,
) -> Result<(), ConfigError> {
    let r_dist = Exp::new(lambda)
        .map_err(|_| ConfigError::InvalidDistribution(format!("lambda = {lambda}")))?;

    for _ in 0..n {
        let ang = rng.gen_range(-PI..PI);
        let r = r_dist.sample(rng);

        let mut pos = Point::<D>::zeros();
        pos[0] = ang.cos() * r;
        pos[1] = ang.sin() * r;
        engine
            .bodies
            .push(Body::new(pos, Vect::zeros(), total_mass / n as f64));
    }
    Ok(())
}

/// Ball: radius Exp(lambda), spherical angles uniform, equal masses.
fn simple_exponential_sphere<const D: usize>(
    n: usize,
    total_mass: f64,
    lambda: f64,
    engine: &mut TreeEngine<D>,
    rng: &mut ChaCha8Rng,
) -> Result<(), ConfigError> {
    let r_dist = Exp::new(lambda)
        .map_err(|_| ConfigError::InvalidDistribution(format!("lambda = {lambda}")))?;

    for _ in 0..n {
        let ang1 = rng.gen_range(-PI..PI);
        let ang2 = rng.gen_range(-PI..PI);
        let r = r_dist.sample(rng);

        let mut pos = Point::<D>::zeros();
        pos[0] = ang1.sin() * ang2.cos() * r;
        pos[1] = ang1.sin() * ang2.sin() * r;
        pos[2] = ang1.cos() * r;
        engine
            .bodies
            .push(Body::new(pos, Vect::zeros(), total_mass / n as f64));
    }
    Ok(())
}
