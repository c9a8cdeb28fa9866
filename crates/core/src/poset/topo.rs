//! Enumeration of all topological sorts (linear extensions) of a [`Poset`].

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};

use super::Poset;

impl<T> Poset<T>
where
    T: Hash + Eq + Ord + Clone + Debug,
{
    /// All total orderings of `elements()` consistent with this poset.
    ///
    /// Backtracks over Kahn's algorithm: at each step any vertex whose
    /// remaining predecessors have all been placed is a legal next choice,
    /// and every such choice is explored. Candidates at each step are
    /// considered in sorted order, so the result is deterministic.
    #[must_use]
    pub fn topological_sorts(&self) -> Vec<Vec<T>> {
        let mut elements: Vec<T> = self.vertices.iter().cloned().collect();
        elements.sort_unstable();

        let mut in_degree: HashMap<T, usize> = elements
            .iter()
            .map(|v| (v.clone(), self.pred.get(v).map_or(0, HashSet::len)))
            .collect();

        let mut results = Vec::new();
        let mut used = HashSet::new();
        let mut current = Vec::new();
        self.backtrack(&elements, &mut in_degree, &mut used, &mut current, &mut results);
        results
    }

    fn backtrack(
        &self,
        elements: &[T],
        in_degree: &mut HashMap<T, usize>,
        used: &mut HashSet<T>,
        current: &mut Vec<T>,
        results: &mut Vec<Vec<T>>,
    ) {
        if current.len() == elements.len() {
            results.push(current.clone());
            return;
        }

        for v in elements {
            if used.contains(v) || in_degree[v] != 0 {
                continue;
            }

            used.insert(v.clone());
            current.push(v.clone());
            let succs = self.succ.get(v).cloned().unwrap_or_default();
            for s in &succs {
                *in_degree.get_mut(s).expect("successor tracked in in_degree map") -= 1;
            }

            self.backtrack(elements, in_degree, used, current, results);

            for s in &succs {
                *in_degree.get_mut(s).expect("successor tracked in in_degree map") += 1;
            }
            current.pop();
            used.remove(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_ordered_chain_has_one_sort() {
        let mut p: Poset<&str> = Poset::new(["a", "b", "c"]);
        p.link(&"a", &"b");
        p.link(&"b", &"c");
        assert_eq!(p.topological_sorts(), [["a", "b", "c"]]);
    }

    #[test]
    fn two_independent_pairs_have_four_sorts() {
        let mut p: Poset<&str> = Poset::new(["a1", "a2", "b1", "b2"]);
        p.link(&"a1", &"a2");
        p.link(&"b1", &"b2");
        assert_eq!(p.topological_sorts().len(), 4);
    }

    #[test]
    fn single_chain_with_one_unrelated_has_two_sorts() {
        let mut p: Poset<&str> = Poset::new(["a", "b", "c"]);
        p.link(&"a", &"b");
        assert_eq!(p.topological_sorts().len(), 2);
    }

    #[test]
    fn every_sort_respects_the_order() {
        let mut p: Poset<&str> = Poset::new(["x", "y", "z"]);
        p.link(&"x", &"y");
        for sort in p.topological_sorts() {
            let x_pos = sort.iter().position(|v| v == &"x").unwrap();
            let y_pos = sort.iter().position(|v| v == &"y").unwrap();
            assert!(x_pos < y_pos);
        }
    }
}
