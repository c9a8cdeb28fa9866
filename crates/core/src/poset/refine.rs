//! Enumeration of all linear refinements (transitively-closed strict
//! partial order extensions) of a [`Poset`].

use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashSet;

use super::Poset;

impl<T> Poset<T>
where
    T: Hash + Eq + Ord + Clone + Debug,
{
    /// All posets reachable from `self` by repeatedly ordering one
    /// currently-unrelated pair at a time, including `self` itself.
    ///
    /// Each distinct refinement is expanded at most once: a candidate that
    /// has already been discovered (via a different branching order) is
    /// not re-explored, which keeps this well short of the factorial
    /// candidate-pair-ordering count for posets with many unrelated pairs.
    #[must_use]
    pub fn refinements(&self) -> HashSet<Self> {
        let mut result = HashSet::new();
        result.insert(self.clone());
        self.expand_refinements(&mut result);
        result
    }

    fn expand_refinements(&self, result: &mut HashSet<Self>) {
        for (a, b) in self.candidate_pairs() {
            let mut candidate = self.clone();
            if candidate.order_try(&a, &b) && result.insert(candidate.clone()) {
                candidate.expand_refinements(result);
            }
        }
    }
}
