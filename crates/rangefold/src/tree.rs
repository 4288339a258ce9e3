//! The range-aggregate engine: an implicit binary partition of `[0, n - 1]`
//! stored in a flat arena, with deferred range updates.
//!
//! The root is slot 1 and slot `k` has children at `2k` and `2k + 1`, so
//! child addressing is integer arithmetic and the arena needs no pointers.
//! Each slot carries a cached [`Aggregate`] plus an optional pending
//! [`Update`] that has been folded into the slot's own aggregate but not
//! yet into its children. A pending update is pushed down only when a later
//! operation has to look underneath it.

use smallvec::SmallVec;

use crate::error::RangeTreeError;
use crate::ops::{Aggregate, Update};

const ROOT: usize = 1;

#[inline]
const fn left(node: usize) -> usize {
    2 * node
}

#[inline]
const fn right(node: usize) -> usize {
    2 * node + 1
}

#[inline]
const fn midpoint(lo: usize, hi: usize) -> usize {
    lo + (hi - lo) / 2
}

/// Frame for the explicit-stack update walk.
///
/// `Recombine` fires after both children of `node` have been fully
/// processed, mirroring the tail of the recursive walk.
enum Frame {
    Visit { node: usize, lo: usize, hi: usize },
    Recombine { node: usize },
}

/// Range-aggregate tree over `[0, len - 1]`.
///
/// Built once from a seed slice, then mutated in place by range updates.
/// Queries and updates both run in O(log n). The tree exclusively owns its
/// arenas and is not safe for concurrent mutation; callers requiring shared
/// access must serialize writes externally.
///
/// Queries take `&mut self`: decomposing a partially overlapping range
/// pushes pending updates toward the leaves, which rewrites internal
/// bookkeeping without changing any observable aggregate.
#[derive(Debug, Clone)]
pub struct RangeTree<A, U> {
    len: usize,
    nodes: Vec<A>,
    pending: Vec<Option<U>>,
}

impl<A, U> RangeTree<A, U>
where
    A: Aggregate,
    U: Update<A>,
{
    /// Build a tree over `n` elements seeded from `elements`.
    ///
    /// Performs O(n) leaf constructions and O(n) combines.
    ///
    /// # Errors
    /// Returns [`RangeTreeError::InvalidSize`] if `n` is zero or
    /// `elements.len() != n`.
    pub fn build(n: usize, elements: &[A::Element]) -> Result<Self, RangeTreeError> {
        if n == 0 || elements.len() != n {
            return Err(RangeTreeError::InvalidSize {
                requested: n,
                seeded: elements.len(),
            });
        }
        let _span = tracing::debug_span!("tree_build", len = n).entered();
        let slots = 4 * n + 1;
        let mut tree = Self {
            len: n,
            nodes: vec![A::identity(); slots],
            pending: vec![None; slots],
        };
        tree.build_node(ROOT, 0, n - 1, elements);
        Ok(tree)
    }

    /// Number of elements covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree covers zero elements.
    ///
    /// Always `false` for a successfully built tree; construction rejects
    /// `n == 0`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Aggregate for the inclusive range `[i, j]`.
    ///
    /// Positions disjoint from the range contribute
    /// [`identity`](Aggregate::identity) without descent; fully contained
    /// positions contribute their cached aggregate without descent. The
    /// result is deterministic regardless of decomposition because
    /// `combine` is associative and applied left-to-right.
    ///
    /// # Errors
    /// Returns [`RangeTreeError::OutOfRange`] if `i > j` or `j >= len`,
    /// before touching any state.
    pub fn query(&mut self, i: usize, j: usize) -> Result<A, RangeTreeError> {
        self.check_range(i, j)?;
        tracing::trace!(i, j, "range query");
        Ok(self.query_node(ROOT, 0, self.len - 1, i, j))
    }

    /// Apply `op` to every element of the inclusive range `[i, j]`.
    ///
    /// Positions fully inside the range absorb `op` into their own cached
    /// aggregate immediately — a query landing exactly on such a position
    /// is correct with no further pushdown — and defer it for their
    /// children. Leaves apply immediately and never hold deferred state.
    ///
    /// # Errors
    /// Returns [`RangeTreeError::OutOfRange`] if `i > j` or `j >= len`,
    /// before touching any state.
    pub fn update(&mut self, i: usize, j: usize, op: U) -> Result<(), RangeTreeError> {
        self.check_range(i, j)?;
        tracing::trace!(i, j, "range update");
        self.update_node(ROOT, 0, self.len - 1, i, j, &op);
        Ok(())
    }

    /// Same semantics, validation, and errors as [`query`](Self::query),
    /// with an explicit frame stack instead of call-stack recursion.
    ///
    /// Intended for very large ranges or constrained call stacks; frames
    /// live inline on a [`SmallVec`] so realistic depths never allocate.
    pub fn query_iterative(&mut self, i: usize, j: usize) -> Result<A, RangeTreeError> {
        self.check_range(i, j)?;
        tracing::trace!(i, j, "range query (explicit stack)");
        let mut acc = A::identity();
        let mut stack: SmallVec<[(usize, usize, usize); 64]> = SmallVec::new();
        stack.push((ROOT, 0, self.len - 1));
        // Children are pushed right-then-left so the left child pops first,
        // preserving the left-to-right combine order of the recursive walk.
        while let Some((node, lo, hi)) = stack.pop() {
            if j < lo || i > hi {
                continue;
            }
            if i <= lo && hi <= j {
                acc = acc.combine(&self.nodes[node]);
                continue;
            }
            self.push_down(node, lo, hi);
            let mid = midpoint(lo, hi);
            stack.push((right(node), mid + 1, hi));
            stack.push((left(node), lo, mid));
        }
        Ok(acc)
    }

    /// Same semantics, validation, and errors as [`update`](Self::update),
    /// with an explicit frame stack instead of call-stack recursion.
    pub fn update_iterative(&mut self, i: usize, j: usize, op: U) -> Result<(), RangeTreeError> {
        self.check_range(i, j)?;
        tracing::trace!(i, j, "range update (explicit stack)");
        let mut stack: SmallVec<[Frame; 64]> = SmallVec::new();
        stack.push(Frame::Visit {
            node: ROOT,
            lo: 0,
            hi: self.len - 1,
        });
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Visit { node, lo, hi } => {
                    if j < lo || i > hi {
                        continue;
                    }
                    if i <= lo && hi <= j {
                        self.absorb(node, lo, hi, &op);
                        continue;
                    }
                    self.push_down(node, lo, hi);
                    let mid = midpoint(lo, hi);
                    stack.push(Frame::Recombine { node });
                    if j > mid {
                        stack.push(Frame::Visit {
                            node: right(node),
                            lo: mid + 1,
                            hi,
                        });
                    }
                    if i <= mid {
                        stack.push(Frame::Visit {
                            node: left(node),
                            lo,
                            hi: mid,
                        });
                    }
                }
                Frame::Recombine { node } => {
                    self.nodes[node] = self.nodes[left(node)].combine(&self.nodes[right(node)]);
                }
            }
        }
        Ok(())
    }

    // ── Internal traversal ──────────────────────────────────────────

    fn check_range(&self, i: usize, j: usize) -> Result<(), RangeTreeError> {
        if i > j || j >= self.len {
            return Err(RangeTreeError::OutOfRange {
                lo: i,
                hi: j,
                len: self.len,
            });
        }
        Ok(())
    }

    fn build_node(&mut self, node: usize, lo: usize, hi: usize, elements: &[A::Element]) {
        if lo == hi {
            self.nodes[node] = A::leaf(lo, &elements[lo]);
            return;
        }
        let mid = midpoint(lo, hi);
        self.build_node(left(node), lo, mid, elements);
        self.build_node(right(node), mid + 1, hi, elements);
        self.nodes[node] = self.nodes[left(node)].combine(&self.nodes[right(node)]);
    }

    /// Absorb `op` at the position covering exactly `[lo, hi]`: fold it
    /// into the cached aggregate now and, unless this is a leaf, defer it
    /// for the children — composing onto whatever is already pending
    /// ("pending first, then `op`").
    fn absorb(&mut self, node: usize, lo: usize, hi: usize, op: &U) {
        op.apply(&mut self.nodes[node], lo, hi);
        if lo < hi {
            self.pending[node] = Some(match self.pending[node].take() {
                Some(existing) => existing.compose(op, lo, hi),
                None => op.clone(),
            });
        }
    }

    /// Push the pending update at `node` into both children and clear it.
    ///
    /// Must run before a position's children are read or recursed into.
    fn push_down(&mut self, node: usize, lo: usize, hi: usize) {
        if let Some(op) = self.pending[node].take() {
            let mid = midpoint(lo, hi);
            self.absorb(left(node), lo, mid, &op);
            self.absorb(right(node), mid + 1, hi, &op);
        }
    }

    fn query_node(&mut self, node: usize, lo: usize, hi: usize, i: usize, j: usize) -> A {
        if j < lo || i > hi {
            return A::identity();
        }
        if i <= lo && hi <= j {
            return self.nodes[node].clone();
        }
        self.push_down(node, lo, hi);
        let mid = midpoint(lo, hi);
        let lhs = self.query_node(left(node), lo, mid, i, j);
        let rhs = self.query_node(right(node), mid + 1, hi, i, j);
        lhs.combine(&rhs)
    }

    fn update_node(&mut self, node: usize, lo: usize, hi: usize, i: usize, j: usize, op: &U) {
        if j < lo || i > hi {
            return;
        }
        if i <= lo && hi <= j {
            self.absorb(node, lo, hi, op);
            return;
        }
        self.push_down(node, lo, hi);
        let mid = midpoint(lo, hi);
        if i <= mid {
            self.update_node(left(node), lo, mid, i, j, op);
        }
        if j > mid {
            self.update_node(right(node), mid + 1, hi, i, j, op);
        }
        self.nodes[node] = self.nodes[left(node)].combine(&self.nodes[right(node)]);
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::presets::{MinMax, Patch, Sum};
    use proptest::prelude::*;

    /// Brute-force mirror of a `Patch` script over a plain vector.
    fn model_apply(model: &mut [i64], i: usize, j: usize, op: Patch) {
        for v in &mut model[i..=j] {
            match op {
                Patch::Noop => {}
                Patch::Set(x) => *v = x,
                Patch::Add(d) => *v += d,
            }
        }
    }

    fn model_minmax(model: &[i64], i: usize, j: usize) -> MinMax {
        let min = *model[i..=j].iter().min().unwrap();
        let max = *model[i..=j].iter().max().unwrap();
        MinMax { min, max }
    }

    fn patch_strategy() -> impl Strategy<Value = Patch> {
        prop_oneof![
            Just(Patch::Noop),
            (-1000i64..1000).prop_map(Patch::Set),
            (-1000i64..1000).prop_map(Patch::Add),
        ]
    }

    /// Clamp two arbitrary indices into an ordered in-bounds pair.
    fn clamp_range(a: usize, b: usize, n: usize) -> (usize, usize) {
        let a = a.min(n - 1);
        let b = b.min(n - 1);
        (a.min(b), a.max(b))
    }

    proptest! {
        #[test]
        fn tree_matches_brute_force_model(
            seed in prop::collection::vec(-1000i64..1000, 1..80),
            script in prop::collection::vec((0usize..80, 0usize..80, patch_strategy()), 0..40),
            probe in (0usize..80, 0usize..80),
        ) {
            let n = seed.len();
            let mut model = seed.clone();
            let mut tree: RangeTree<MinMax, Patch> = RangeTree::build(n, &seed).unwrap();

            for (a, b, op) in script {
                let (i, j) = clamp_range(a, b, n);
                tree.update(i, j, op).unwrap();
                model_apply(&mut model, i, j, op);
            }

            let (i, j) = clamp_range(probe.0, probe.1, n);
            prop_assert_eq!(tree.query(i, j).unwrap(), model_minmax(&model, i, j));
        }

        #[test]
        fn decomposition_combines_to_whole(
            seed in prop::collection::vec(-100i64..100, 2..60),
            cuts in prop::collection::vec(0usize..60, 0..6),
        ) {
            let n = seed.len();
            let mut tree: RangeTree<MinMax, Patch> = RangeTree::build(n, &seed).unwrap();

            // Split [0, n - 1] at the (deduplicated) cut points and combine
            // the piecewise query results left-to-right.
            let mut bounds: Vec<usize> = cuts.into_iter().map(|c| c % n).collect();
            bounds.push(0);
            bounds.sort_unstable();
            bounds.dedup();
            bounds.push(n);

            let mut acc = MinMax::identity();
            for w in bounds.windows(2) {
                acc = acc.combine(&tree.query(w[0], w[1] - 1).unwrap());
            }
            prop_assert_eq!(acc, tree.query(0, n - 1).unwrap());
        }

        #[test]
        fn explicit_stack_walk_is_equivalent(
            seed in prop::collection::vec(-100i64..100, 1..50),
            script in prop::collection::vec((0usize..50, 0usize..50, patch_strategy()), 0..20),
        ) {
            let n = seed.len();
            let mut recursive: RangeTree<MinMax, Patch> = RangeTree::build(n, &seed).unwrap();
            let mut iterative = recursive.clone();

            for (a, b, op) in script {
                let (i, j) = clamp_range(a, b, n);
                recursive.update(i, j, op).unwrap();
                iterative.update_iterative(i, j, op).unwrap();
            }

            for i in 0..n {
                prop_assert_eq!(
                    recursive.query(i, i).unwrap(),
                    iterative.query_iterative(i, i).unwrap()
                );
            }
        }

        #[test]
        fn sum_tree_matches_brute_force_model(
            seed in prop::collection::vec(-50i64..50, 1..40),
            script in prop::collection::vec((0usize..40, 0usize..40, patch_strategy()), 0..20),
        ) {
            let n = seed.len();
            let mut model = seed.clone();
            let mut tree: RangeTree<Sum, Patch> = RangeTree::build(n, &seed).unwrap();

            for (a, b, op) in script {
                let (i, j) = clamp_range(a, b, n);
                tree.update(i, j, op).unwrap();
                model_apply(&mut model, i, j, op);
            }

            let total: i64 = model.iter().sum();
            prop_assert_eq!(tree.query(0, n - 1).unwrap(), Sum(total));
        }

        #[test]
        fn range_checks_never_mutate(
            seed in prop::collection::vec(-100i64..100, 1..30),
            past_end in 30usize..100,
        ) {
            let n = seed.len();
            let mut tree: RangeTree<MinMax, Patch> = RangeTree::build(n, &seed).unwrap();
            let snapshot = tree.query(0, n - 1).unwrap();

            prop_assert!(tree.query(0, past_end).is_err());
            prop_assert!(tree.update(past_end, 0, Patch::Add(7)).is_err());
            prop_assert_eq!(tree.query(0, n - 1).unwrap(), snapshot);
        }
    }
}
