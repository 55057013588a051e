//! Fixed-step time integrators.
//!
//! Both advance a single body in place from its acceleration. The method is
//! selected by name in the configuration and fixed for the whole run.

use serde::Deserialize;

use crate::spatial::Vect;

use super::states::Body;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Integrator {
    /// Semi-implicit Euler: kick then drift with the updated velocity.
    Euler,
    /// Half-kick leapfrog: half kick, half drift with the new velocity.
    Leapfrog,
}

impl Integrator {
    pub fn advance<const D: usize>(self, body: &mut Body<D>, dt: f64, acc: &Vect<D>) {
        match self {
            Integrator::Euler => {
                body.vel += acc * dt;
                body.pos += body.vel * dt;
            }
            Integrator::Leapfrog => {
                let next_vel = body.vel + acc * (dt * 0.5);
                body.pos += next_vel * (dt * 0.5);
                body.vel = next_vel;
            }
        }
    }
}
