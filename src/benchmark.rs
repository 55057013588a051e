//! Timing sweep comparing direct summation against the tree evaluation.
//!
//! Bodies are laid out deterministically (no RNG needed) so repeated runs
//! time the same workload.

use std::time::Instant;

use crate::orthtree::Orthtree;
use crate::simulation::gravity::{BarnesHut, BhPolicy, TreeBody};
use crate::simulation::states::Body;
use crate::spatial::{BBox, Point, Vect};

fn cloud(n: usize) -> Vec<Body<3>> {
    (0..n)
        .map(|i| {
            let i_f = i as f64;
            let pos = Point::<3>::new(
                (i_f * 0.37).sin() * 5.0,
                (i_f * 0.13).cos() * 5.0,
                (i_f * 0.07).sin() * 5.0,
            );
            Body::new(pos, Vect::zeros(), 1.0)
        })
        .collect()
}

pub fn bench_forces() {
    let ns = [200, 400, 800, 1600, 3200, 6400];

    let bh = BarnesHut {
        g: 0.1,
        theta: 0.7,
        eps: 1e-2,
    };

    println!("{:>8} {:>14} {:>14}", "N", "direct [ms]", "tree [ms]");
    for n in ns {
        let bodies = cloud(n);

        let start = Instant::now();
        let direct = bh.direct(&bodies);
        let direct_ms = start.elapsed().as_secs_f64() * 1e3;

        let start = Instant::now();
        let tree = Orthtree::from_items(
            BhPolicy { node_capacity: 1 },
            BBox::cube(Point::<3>::zeros(), 6.0),
            bodies.iter().enumerate().map(|(i, b)| TreeBody::of(i, b)),
        );
        let approx: Vec<Vect<3>> = bodies
            .iter()
            .enumerate()
            .map(|(i, b)| bh.eval(&tree, i, b.pos, b.mass).0)
            .collect();
        let tree_ms = start.elapsed().as_secs_f64() * 1e3;

        // Keep the results observable so the loops cannot be elided.
        let check: f64 = direct
            .iter()
            .zip(&approx)
            .map(|(a, b)| (a - b).norm())
            .sum();

        println!("{n:>8} {direct_ms:>14.3} {tree_ms:>14.3}   (dev {check:.3e})");
    }
}
