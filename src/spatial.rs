//! Spatial primitives shared by the tree and the simulation.
//!
//! Vectors and points are fixed-dimension `nalgebra` columns:
//! - `Vect<D>` / `Point<D>` for positions, velocities and accelerations
//! - `BBox<D>` as a center + per-axis half-extent box
//!
//! `Point` is a plain alias; all arithmetic is affine-agnostic.

use nalgebra::{Matrix3, Rotation3, SVector};

pub type Vect<const D: usize> = SVector<f64, D>;
pub type Point<const D: usize> = Vect<D>;

/// Componentwise finiteness check; NaN and infinities fail.
pub fn is_finite<const D: usize>(v: &Vect<D>) -> bool {
    v.iter().all(|c| c.is_finite())
}

/// Euler rotation matrix applied as Rz * Ry * Rx, angles in radians.
pub fn rotation_xyz(rx: f64, ry: f64, rz: f64) -> Matrix3<f64> {
    Rotation3::from_euler_angles(rx, ry, rz).into_inner()
}

/// Rotate the first three components of a vector. Only meaningful for D >= 3;
/// the caller guards on the dimension.
pub fn rotate3<const D: usize>(m: &Matrix3<f64>, v: &Vect<D>) -> Vect<D> {
    let (x, y, z) = (v[0], v[1], v[2]);
    let mut res = *v;
    res[0] = m[(0, 0)] * x + m[(0, 1)] * y + m[(0, 2)] * z;
    res[1] = m[(1, 0)] * x + m[(1, 1)] * y + m[(1, 2)] * z;
    res[2] = m[(2, 0)] * x + m[(2, 1)] * y + m[(2, 2)] * z;
    res
}

/// Axis-aligned box given by its center and per-axis half-extents.
///
/// Half-extents are non-negative; `s()` is the largest of them and acts as
/// the governing radius in the Barnes-Hut opening criterion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox<const D: usize> {
    pub center: Point<D>,
    pub extent: Vect<D>,
}

impl<const D: usize> BBox<D> {
    pub fn new(center: Point<D>, extent: Vect<D>) -> Self {
        Self { center, extent }
    }

    /// Cube with the same half-extent on every axis.
    pub fn cube(center: Point<D>, half: f64) -> Self {
        Self {
            center,
            extent: Vect::repeat(half),
        }
    }

    /// Closed half-space test on every axis. NaN coordinates are never
    /// contained.
    pub fn contains(&self, pt: &Point<D>) -> bool {
        (0..D).all(|d| (pt[d] - self.center[d]).abs() <= self.extent[d])
    }

    pub fn intersects(&self, other: &BBox<D>) -> bool {
        (0..D).all(|d| (self.center[d] - other.center[d]).abs() <= self.extent[d] + other.extent[d])
    }

    /// Largest half-extent.
    pub fn s(&self) -> f64 {
        self.extent.iter().fold(0.0_f64, |acc, e| acc.max(*e))
    }
}
