use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};

/// A plain adjacency-map directed graph, not necessarily transitively closed.
///
/// Used for the `po ∪ wr` graph built by the bad-pattern detector, where we
/// need cycle detection before we can trust the result as a [`Poset`](crate::poset::Poset).
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct DiGraph<T>
where
    T: Hash + Eq + Clone + Debug,
{
    pub adj_map: HashMap<T, HashSet<T>>,
}

impl<T> DiGraph<T>
where
    T: Hash + Eq + Clone + Debug,
{
    pub fn add_edge(&mut self, source: T, target: T) {
        self.adj_map
            .entry(source)
            .or_default()
            .insert(target.clone());
        self.adj_map.entry(target).or_default();
    }

    pub fn add_vertex(&mut self, source: T) {
        self.adj_map.entry(source).or_default();
    }

    #[must_use]
    pub fn has_edge(&self, source: &T, target: &T) -> bool {
        self.adj_map
            .get(source)
            .is_some_and(|neighbor| neighbor.contains(target))
    }

    /// Detects if the graph contains a cycle using Kahn's algorithm.
    /// Time complexity: O(V+E)
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        self.topological_sort().is_none()
    }

    /// Returns a valid topological ordering of vertices if the graph is
    /// acyclic, or `None` if the graph contains a cycle.
    #[must_use]
    pub fn topological_sort(&self) -> Option<Vec<T>> {
        let mut in_degree: HashMap<T, usize> = HashMap::new();

        for vertex in self.adj_map.keys() {
            in_degree.entry(vertex.clone()).or_insert(0);
        }
        for neighbors in self.adj_map.values() {
            for neighbor in neighbors {
                *in_degree.entry(neighbor.clone()).or_insert(0) += 1;
            }
        }

        let mut queue: Vec<T> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(vertex, _)| vertex.clone())
            .collect();

        let mut result = Vec::new();

        while let Some(vertex) = queue.pop() {
            result.push(vertex.clone());
            if let Some(neighbors) = self.adj_map.get(&vertex) {
                for neighbor in neighbors {
                    if let Some(degree) = in_degree.get_mut(neighbor) {
                        *degree -= 1;
                        if *degree == 0 {
                            queue.push(neighbor.clone());
                        }
                    }
                }
            }
        }

        if result.len() == self.adj_map.len() {
            Some(result)
        } else {
            None
        }
    }

    /// Returns an edge `(a, b)` that participates in a cycle, or `None` if acyclic.
    ///
    /// Strips away vertices that Kahn's algorithm can remove (those are
    /// acyclic by construction); whatever is left lies on a cycle.
    #[must_use]
    pub fn find_cycle_edge(&self) -> Option<(T, T)> {
        let mut in_degree: HashMap<T, usize> = HashMap::new();

        for vertex in self.adj_map.keys() {
            in_degree.entry(vertex.clone()).or_insert(0);
        }
        for neighbors in self.adj_map.values() {
            for neighbor in neighbors {
                *in_degree.entry(neighbor.clone()).or_insert(0) += 1;
            }
        }

        let mut queue: Vec<T> = in_degree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(v, _)| v.clone())
            .collect();

        let mut removed: HashSet<T> = HashSet::new();

        while let Some(vertex) = queue.pop() {
            removed.insert(vertex.clone());
            if let Some(neighbors) = self.adj_map.get(&vertex) {
                for neighbor in neighbors {
                    if let Some(deg) = in_degree.get_mut(neighbor) {
                        *deg -= 1;
                        if *deg == 0 {
                            queue.push(neighbor.clone());
                        }
                    }
                }
            }
        }

        for (src, neighbors) in &self.adj_map {
            if removed.contains(src) {
                continue;
            }
            for dst in neighbors {
                if !removed.contains(dst) {
                    return Some((src.clone(), dst.clone()));
                }
            }
        }

        None
    }

    fn find_all_reachable_helper(&self, source: &T, mut reachable: HashSet<T>) -> HashSet<T> {
        if let Some(neighbors) = self.adj_map.get(source) {
            for neighbor in neighbors {
                if reachable.insert(neighbor.clone()) {
                    reachable = self.find_all_reachable_helper(neighbor, reachable);
                }
            }
        }
        reachable
    }

    /// Transitive closure of the graph (irreflexive).
    #[must_use]
    pub fn closure(&self) -> Self {
        Self {
            adj_map: self
                .adj_map
                .keys()
                .map(|source| {
                    (
                        source.clone(),
                        self.find_all_reachable_helper(source, HashSet::new()),
                    )
                })
                .collect(),
        }
    }

    /// Merge `other`'s edges in. Returns `true` if any new edge was added.
    pub fn union(&mut self, other: &Self) -> bool {
        let mut change = false;
        for (source, other_neighbors) in &other.adj_map {
            let neighbors = self.adj_map.entry(source.clone()).or_default();
            let old_size = neighbors.len();
            neighbors.extend(other_neighbors.iter().cloned());
            change |= neighbors.len() != old_size;
        }
        change
    }
}
