//! Generic orthant tree (quadtree in 2D, octree in 3D).
//!
//! The tree is parameterized by a [`TreePolicy`] supplying the item type, how
//! to read a point out of an item, the per-node summary, and the leaf
//! capacity. Leaves hold up to `node_capacity` items; overflow subdivides the
//! node into `2^D` children that tile the parent box exactly, and reinserts.
//!
//! Every node carries an accumulator folded over all items transitively
//! below it. Accumulators are updated on the way down during insertion and
//! are never re-derived on subdivision.

use crate::spatial::{BBox, Point};

/// Per-node summary folded over inserted items.
///
/// `Default` is the empty summary. Use `()` for trees without summaries.
pub trait Accumulate<T>: Default {
    fn fold(&mut self, item: &T);
}

impl<T> Accumulate<T> for () {
    fn fold(&mut self, _item: &T) {}
}

/// Tree parameter object: item type, point extraction, summary, capacity.
pub trait TreePolicy<const D: usize> {
    type Item;
    type Accum: Accumulate<Self::Item>;

    fn point(&self, item: &Self::Item) -> Point<D>;
    fn node_capacity(&self) -> usize;
}

pub struct TreeNode<P: TreePolicy<D>, const D: usize> {
    bbox: BBox<D>,
    accum: P::Accum,
    data: Vec<P::Item>,
    children: Option<Vec<TreeNode<P, D>>>,
}

impl<P: TreePolicy<D>, const D: usize> TreeNode<P, D> {
    fn empty(bbox: BBox<D>) -> Self {
        Self {
            bbox,
            accum: P::Accum::default(),
            data: Vec::new(),
            children: None,
        }
    }

    pub fn bbox(&self) -> &BBox<D> {
        &self.bbox
    }

    pub fn accum(&self) -> &P::Accum {
        &self.accum
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Items stored directly in this node. Non-empty only for leaves.
    pub fn data(&self) -> &[P::Item] {
        &self.data
    }

    pub fn children(&self) -> Option<&[TreeNode<P, D>]> {
        self.children.as_deref()
    }

    fn insert(&mut self, policy: &P, item: P::Item) -> bool {
        let point = policy.point(&item);
        if !self.bbox.contains(&point) {
            return false;
        }
        self.insert_contained(policy, item, point);
        true
    }

    /// Insert an item whose point is known to lie inside `self.bbox`.
    fn insert_contained(&mut self, policy: &P, item: P::Item, point: Point<D>) {
        self.accum.fold(&item);

        if let Some(children) = &mut self.children {
            Self::place(children, policy, item, point);
            return;
        }

        self.data.push(item);
        if self.data.len() > policy.node_capacity() {
            self.subdivide(policy);
        }
    }

    /// Hand an item to the first child whose box contains its point.
    /// Children tile the parent, so a finite point inside the parent always
    /// lands somewhere; ties on shared boundaries go to the lower orthant.
    fn place(children: &mut [TreeNode<P, D>], policy: &P, item: P::Item, point: Point<D>) {
        for child in children.iter_mut() {
            if child.bbox.contains(&point) {
                child.insert_contained(policy, item, point);
                return;
            }
        }
        // Only reachable if an invariant is already broken; a tree with a
        // misplaced item would silently corrupt every ancestor summary.
        panic!("orthtree: no child accepted an item inside the parent box");
    }

    fn subdivide(&mut self, policy: &P) {
        // Floating-point floor on the cell size: once a half-extent
        // underflows to zero the leaf keeps its overflow.
        if self.bbox.extent.iter().any(|e| e * 0.5 == 0.0) {
            return;
        }

        let mut children: Vec<TreeNode<P, D>> = Vec::with_capacity(1 << D);
        children.push(TreeNode::empty(self.bbox));

        // Double the child set once per axis: each existing child shrinks to
        // the lower half along that axis and spawns an upper-half twin at
        // index k + 2^d. After D rounds the children tile the parent in
        // canonical orthant order.
        for d in 0..D {
            for i in 0..(1usize << d) {
                let half = children[i].bbox.extent[d] * 0.5;
                let mut upper = children[i].bbox;

                children[i].bbox.center[d] -= half;
                children[i].bbox.extent[d] = half;

                upper.center[d] += half;
                upper.extent[d] = half;
                children.push(TreeNode::empty(upper));
            }
        }

        let items = std::mem::take(&mut self.data);
        let children = self.children.insert(children);
        for item in items {
            let point = policy.point(&item);
            Self::place(children, policy, item, point);
        }
    }
}

pub struct Orthtree<P: TreePolicy<D>, const D: usize> {
    policy: P,
    root: TreeNode<P, D>,
}

impl<P: TreePolicy<D>, const D: usize> Orthtree<P, D> {
    pub fn new(policy: P, bbox: BBox<D>) -> Self {
        Self {
            policy,
            root: TreeNode::empty(bbox),
        }
    }

    /// Build a tree and insert a sequence of items, ignoring rejects.
    pub fn from_items<I>(policy: P, bbox: BBox<D>, items: I) -> Self
    where
        I: IntoIterator<Item = P::Item>,
    {
        let mut tree = Self::new(policy, bbox);
        for item in items {
            tree.insert(item);
        }
        tree
    }

    /// Insert one item. Returns `false` when its point lies outside the root
    /// box (the tree is left untouched).
    pub fn insert(&mut self, item: P::Item) -> bool {
        self.root.insert(&self.policy, item)
    }

    pub fn root(&self) -> &TreeNode<P, D> {
        &self.root
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::Vect;

    /// Count-only accumulator used by the tests below.
    #[derive(Default)]
    struct Count(usize);

    impl Accumulate<Point<2>> for Count {
        fn fold(&mut self, _item: &Point<2>) {
            self.0 += 1;
        }
    }

    struct PointPolicy {
        capacity: usize,
    }

    impl TreePolicy<2> for PointPolicy {
        type Item = Point<2>;
        type Accum = Count;

        fn point(&self, item: &Point<2>) -> Point<2> {
            *item
        }

        fn node_capacity(&self) -> usize {
            self.capacity
        }
    }

    fn unit_box() -> BBox<2> {
        BBox::cube(Point::<2>::zeros(), 1.0)
    }

    fn leaves<'a>(node: &'a TreeNode<PointPolicy, 2>, out: &mut Vec<&'a TreeNode<PointPolicy, 2>>) {
        match node.children() {
            None => out.push(node),
            Some(children) => {
                for child in children {
                    leaves(child, out);
                }
            }
        }
    }

    #[test]
    fn four_quadrant_points_subdivide_once() {
        let mut tree = Orthtree::new(PointPolicy { capacity: 1 }, unit_box());

        for p in [
            Point::<2>::new(0.1, 0.1),
            Point::<2>::new(0.1, -0.1),
            Point::<2>::new(-0.1, 0.1),
            Point::<2>::new(-0.1, -0.1),
        ] {
            assert!(tree.insert(p));
        }

        let root = tree.root();
        assert!(!root.is_leaf());
        assert_eq!(root.accum().0, 4);

        let children = root.children().unwrap();
        assert_eq!(children.len(), 4);
        for child in children {
            assert!(child.is_leaf());
            assert_eq!(child.data().len(), 1);
            assert_eq!(child.accum().0, 1);
        }
    }

    #[test]
    fn rejects_outside_points_without_touching_state() {
        let mut tree = Orthtree::new(PointPolicy { capacity: 1 }, unit_box());
        assert!(tree.insert(Point::<2>::new(0.1, 0.1)));

        assert!(!tree.insert(Point::<2>::new(2.0, 0.0)));
        assert_eq!(tree.root().accum().0, 1);
        assert!(tree.root().is_leaf());
        assert_eq!(tree.root().data().len(), 1);
    }

    #[test]
    fn rejects_nan_points() {
        let mut tree = Orthtree::new(PointPolicy { capacity: 4 }, unit_box());
        assert!(!tree.insert(Point::<2>::new(f64::NAN, 0.0)));
        assert_eq!(tree.root().accum().0, 0);
    }

    #[test]
    fn children_tile_the_parent_exactly() {
        let mut tree = Orthtree::new(PointPolicy { capacity: 1 }, unit_box());
        for i in 0..8 {
            let ang = 0.7 * i as f64;
            tree.insert(Point::<2>::new(0.9 * ang.cos(), 0.9 * ang.sin()));
        }

        let mut all = Vec::new();
        leaves(tree.root(), &mut all);

        // Leaf areas sum to the root area.
        let area: f64 = all
            .iter()
            .map(|n| 4.0 * n.bbox().extent[0] * n.bbox().extent[1])
            .sum();
        assert!((area - 4.0).abs() < 1e-9);

        // Interiors are pairwise disjoint.
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                let dx = (a.bbox().center[0] - b.bbox().center[0]).abs();
                let dy = (a.bbox().center[1] - b.bbox().center[1]).abs();
                let overlap_x = a.bbox().extent[0] + b.bbox().extent[0] - dx;
                let overlap_y = a.bbox().extent[1] + b.bbox().extent[1] - dy;
                assert!(
                    overlap_x <= 1e-12 || overlap_y <= 1e-12,
                    "leaf interiors overlap"
                );
            }
        }
    }

    #[test]
    fn every_item_lands_in_exactly_one_leaf() {
        let pts: Vec<Point<2>> = (0..40)
            .map(|i| {
                let x = ((i * 37) % 97) as f64 / 97.0 - 0.5;
                let y = ((i * 61) % 89) as f64 / 89.0 - 0.5;
                Point::<2>::new(x, y)
            })
            .collect();

        let tree = Orthtree::from_items(PointPolicy { capacity: 2 }, unit_box(), pts.clone());

        let mut all = Vec::new();
        leaves(tree.root(), &mut all);

        for p in &pts {
            let holders = all
                .iter()
                .filter(|n| n.data().iter().any(|q| q == p))
                .count();
            assert_eq!(holders, 1, "point stored in {holders} leaves");
        }

        // Containment: the storing leaf's box contains the point.
        for n in &all {
            for p in n.data() {
                assert!(n.bbox().contains(p));
            }
        }
    }

    #[test]
    fn capacity_is_respected_at_rest() {
        let pts: Vec<Point<2>> = (0..100)
            .map(|i| {
                let ang = i as f64 * 0.41;
                Point::<2>::new(0.8 * ang.cos(), 0.8 * (2.0 * ang).sin())
            })
            .collect();

        let tree = Orthtree::from_items(PointPolicy { capacity: 3 }, unit_box(), pts);

        let mut all = Vec::new();
        leaves(tree.root(), &mut all);
        for n in &all {
            assert!(n.data().len() <= 3);
        }
    }

    #[test]
    fn boundary_point_goes_to_the_lower_orthant() {
        let mut tree = Orthtree::new(PointPolicy { capacity: 1 }, unit_box());
        tree.insert(Point::<2>::new(0.5, 0.5));
        tree.insert(Point::<2>::new(-0.5, -0.5));
        // Forces a subdivision; the origin sits on both split planes.
        tree.insert(Point::<2>::zeros());

        let children = tree.root().children().unwrap();
        // Canonical order: index 0 is the all-lower orthant.
        assert!(children[0]
            .data()
            .iter()
            .chain(children[0].children().into_iter().flatten().flat_map(|c| c.data()))
            .any(|p| *p == Point::<2>::zeros()));
    }

    #[test]
    fn accumulators_track_subtree_counts() {
        let pts: Vec<Point<2>> = (0..20)
            .map(|i| Point::<2>::new((i as f64 * 0.09) - 0.9, ((i * i) as f64 * 0.013) % 0.9))
            .collect();
        let tree = Orthtree::from_items(PointPolicy { capacity: 2 }, unit_box(), pts);

        fn check(node: &TreeNode<PointPolicy, 2>) -> usize {
            let below = match node.children() {
                None => node.data().len(),
                Some(children) => children.iter().map(check).sum(),
            };
            assert_eq!(node.accum().0, below);
            below
        }

        assert_eq!(check(tree.root()), 20);
    }
}
