//! Barnes-Hut gravitational force evaluation.
//!
//! Bodies are indexed into a transient [`BhTree`] whose nodes summarize
//! count, position sum and total mass of everything below them. For a query
//! body the traversal either accepts a whole node as a pseudo-particle at its
//! center of mass (opening criterion `s < theta * d`, strict) or descends.
//! Softening is Plummer-style: `r` is replaced by `sqrt(r^2 + eps^2)`.
//!
//! A body is present in the tree during its own query; the leaf interaction
//! skips it by item id so the softened self-term never enters the potential.

use crate::orthtree::{Accumulate, Orthtree, TreeNode, TreePolicy};
use crate::spatial::{Point, Vect};

use super::states::Body;

/// What the tree stores per body: its index in the engine's body list plus
/// the two fields gravity needs.
#[derive(Debug, Clone, Copy)]
pub struct TreeBody<const D: usize> {
    pub id: usize,
    pub pos: Point<D>,
    pub mass: f64,
}

impl<const D: usize> TreeBody<D> {
    pub fn of(id: usize, body: &Body<D>) -> Self {
        Self {
            id,
            pos: body.pos,
            mass: body.mass,
        }
    }
}

/// Mass moments accumulated per node: item count, sum of positions, total
/// mass. The derived center of mass is `pos_sum / count`.
#[derive(Debug, Clone, Copy)]
pub struct MassMoments<const D: usize> {
    pub count: usize,
    pub pos_sum: Vect<D>,
    pub total_mass: f64,
}

impl<const D: usize> MassMoments<D> {
    pub fn center_of_mass(&self) -> Point<D> {
        self.pos_sum / self.count as f64
    }
}

impl<const D: usize> Default for MassMoments<D> {
    fn default() -> Self {
        Self {
            count: 0,
            pos_sum: Vect::zeros(),
            total_mass: 0.0,
        }
    }
}

impl<const D: usize> Accumulate<TreeBody<D>> for MassMoments<D> {
    fn fold(&mut self, item: &TreeBody<D>) {
        self.count += 1;
        self.pos_sum += item.pos;
        self.total_mass += item.mass;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BhPolicy<const D: usize> {
    pub node_capacity: usize,
}

impl<const D: usize> TreePolicy<D> for BhPolicy<D> {
    type Item = TreeBody<D>;
    type Accum = MassMoments<D>;

    fn point(&self, item: &TreeBody<D>) -> Point<D> {
        item.pos
    }

    fn node_capacity(&self) -> usize {
        self.node_capacity
    }
}

pub type BhTree<const D: usize> = Orthtree<BhPolicy<D>, D>;
pub type BhNode<const D: usize> = TreeNode<BhPolicy<D>, D>;

/// Barnes-Hut evaluator: gravitational constant, opening angle, softening
/// length, all in simulation units.
#[derive(Debug, Clone, Copy)]
pub struct BarnesHut {
    pub g: f64,
    pub theta: f64,
    pub eps: f64,
}

impl BarnesHut {
    /// Acceleration on a body plus its share of the potential energy.
    pub fn eval<const D: usize>(
        &self,
        tree: &BhTree<D>,
        id: usize,
        pos: Point<D>,
        mass: f64,
    ) -> (Vect<D>, f64) {
        self.eval_traced(tree, id, pos, mass, &mut |_, _| {})
    }

    /// Like [`eval`](Self::eval), invoking `trace(s, d)` for every node
    /// accepted as a pseudo-particle.
    pub fn eval_traced<const D: usize, F>(
        &self,
        tree: &BhTree<D>,
        id: usize,
        pos: Point<D>,
        mass: f64,
        trace: &mut F,
    ) -> (Vect<D>, f64)
    where
        F: FnMut(f64, f64),
    {
        self.visit(tree.root(), id, pos, mass, trace)
    }

    fn visit<const D: usize, F>(
        &self,
        node: &BhNode<D>,
        id: usize,
        pos: Point<D>,
        mass: f64,
        trace: &mut F,
    ) -> (Vect<D>, f64)
    where
        F: FnMut(f64, f64),
    {
        let moments = node.accum();
        if moments.count == 0 {
            return (Vect::zeros(), 0.0);
        }

        let com = moments.center_of_mass();
        let d = (pos - com).norm();
        let s = node.bbox().s();

        // Strict comparison: s == theta * d descends.
        if s < self.theta * d {
            trace(s, d);
            return self.interact(pos, mass, com, moments.total_mass);
        }

        let mut acc = Vect::zeros();
        let mut pot = 0.0;
        match node.children() {
            None => {
                for other in node.data() {
                    if other.id == id {
                        continue;
                    }
                    let (a, p) = self.interact(pos, mass, other.pos, other.mass);
                    acc += a;
                    pot += p;
                }
            }
            Some(children) => {
                for child in children {
                    let (a, p) = self.visit(child, id, pos, mass, trace);
                    acc += a;
                    pot += p;
                }
            }
        }
        (acc, pot)
    }

    /// Softened pair interaction. The potential carries a factor 1/2 so that
    /// summing contributions over all bodies counts each pair once.
    fn interact<const D: usize>(
        &self,
        pos: Point<D>,
        mass: f64,
        other_pos: Point<D>,
        other_mass: f64,
    ) -> (Vect<D>, f64) {
        let diff = pos - other_pos;
        let dist = diff.norm();
        let smoothed = (dist * dist + self.eps * self.eps).sqrt();

        let acc = diff * (-self.g * other_mass / (smoothed * smoothed * smoothed));
        let pot = -self.g * mass * other_mass / smoothed / 2.0;
        (acc, pot)
    }

    /// Direct pairwise accelerations over a body slice, symmetric update.
    /// Reference path for the benchmark and for accuracy cross-checks.
    pub fn direct<const D: usize>(&self, bodies: &[Body<D>]) -> Vec<Vect<D>> {
        let n = bodies.len();
        let mut out = vec![Vect::zeros(); n];

        for i in 0..n {
            let bi = &bodies[i];
            for j in (i + 1)..n {
                let bj = &bodies[j];

                let diff = bj.pos - bi.pos;
                let smoothed = (diff.norm_squared() + self.eps * self.eps).sqrt();
                let coef = self.g / (smoothed * smoothed * smoothed);

                out[i] += diff * (coef * bj.mass);
                out[j] -= diff * (coef * bi.mass);
            }
        }
        out
    }
}
