//! A mutable, transitively-closed strict partial order.
//!
//! [`Poset`] is the core data structure of this crate (see spec §4.A): it
//! supports incremental ordering with an asymmetry invariant, induced
//! subsets, structural equality/hashing (so posets are usable as set keys
//! during refinement search), enumeration of all linear refinements, and
//! enumeration of all topological sorts.
//!
//! Internally a poset is kept closed after every mutation -- `check(a, b)`
//! is then a single adjacency lookup, at the cost of `order_try` doing
//! `O(|preds(a)| * |succs(b)|)` work per successful insert. This mirrors
//! the teacher's [`DiGraph`](crate::graph::digraph::DiGraph), which takes
//! the same "always closed, cheap membership test" posture for the
//! write-read graph.

mod refine;
mod topo;

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::{Hash, Hasher};

use hashbrown::{HashMap, HashSet};

use crate::graph::digraph::DiGraph;

/// A mutable, transitively-closed strict partial order over vertex type `T`.
///
/// Equality and hashing are structural: two posets are equal iff they have
/// the same vertex set and the same edge set. The asymmetry-violation cache
/// is a pure performance optimization and plays no part in either.
#[derive(Debug, Clone)]
pub struct Poset<T>
where
    T: Hash + Eq + Ord + Clone + Debug,
{
    vertices: HashSet<T>,
    succ: HashMap<T, HashSet<T>>,
    pred: HashMap<T, HashSet<T>>,
    /// Pairs `(a, b)` for which `order_try(a, b)` is known to violate
    /// asymmetry. Reset by [`Poset::subset`] and by any operation that
    /// changes the vertex set, since the cache is only valid relative to
    /// the order it was built against.
    reject_cache: HashSet<(T, T)>,
}

impl<T> PartialEq for Poset<T>
where
    T: Hash + Eq + Ord + Clone + Debug,
{
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices && self.succ == other.succ
    }
}

impl<T> Eq for Poset<T> where T: Hash + Eq + Ord + Clone + Debug {}

impl<T> Hash for Poset<T>
where
    T: Hash + Eq + Ord + Clone + Debug,
{
    /// Hashes the sorted edge list so that two structurally-equal posets
    /// (built via different sequences of `order_try`/`link` calls) always
    /// hash the same, regardless of `HashMap`/`HashSet` iteration order.
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut edges = self.to_edge_vec();
        edges.sort_unstable();
        edges.hash(state);
    }
}

impl<T> Poset<T>
where
    T: Hash + Eq + Ord + Clone + Debug,
{
    /// Creates a poset over `vertices` with an empty order.
    #[must_use]
    pub fn new(vertices: impl IntoIterator<Item = T>) -> Self {
        let vertices: HashSet<T> = vertices.into_iter().collect();
        let succ = vertices.iter().cloned().map(|v| (v, HashSet::new())).collect();
        let pred = vertices.iter().cloned().map(|v| (v, HashSet::new())).collect();
        Self {
            vertices,
            succ,
            pred,
            reject_cache: HashSet::new(),
        }
    }

    /// Builds a poset directly from an already-transitively-closed,
    /// already-acyclic [`DiGraph`], skipping the asymmetry check.
    ///
    /// Used by the bad-pattern detector (spec §4.C), which establishes
    /// acyclicity via [`DiGraph::has_cycle`] before trusting the result as
    /// a partial order.
    #[must_use]
    pub(crate) fn from_closed_digraph(vertices: HashSet<T>, closed: &DiGraph<T>) -> Self {
        let mut succ: HashMap<T, HashSet<T>> =
            vertices.iter().cloned().map(|v| (v, HashSet::new())).collect();
        let mut pred: HashMap<T, HashSet<T>> =
            vertices.iter().cloned().map(|v| (v, HashSet::new())).collect();
        for (u, dsts) in &closed.adj_map {
            for v in dsts {
                succ.entry(u.clone()).or_default().insert(v.clone());
                pred.entry(v.clone()).or_default().insert(u.clone());
            }
        }
        Self {
            vertices,
            succ,
            pred,
            reject_cache: HashSet::new(),
        }
    }

    /// Adds `a < b` (and its transitive consequences) without checking
    /// asymmetry. Intended for deriving a poset from an order already
    /// known to be valid.
    pub fn link(&mut self, a: &T, b: &T) {
        self.close_edge(a, b);
    }

    /// Attempts to add `a < b` and its transitive consequences.
    ///
    /// Returns `false` without mutating if that would violate asymmetry,
    /// i.e. if `preds(a) ∪ {a}` intersects `succs(b) ∪ {b}`. The check
    /// (and any resulting violation) is memoized in the reject cache.
    pub fn order_try(&mut self, a: &T, b: &T) -> bool {
        if a == b {
            return false;
        }
        if self.reject_cache.contains(&(a.clone(), b.clone())) {
            return false;
        }
        if self.check(a, b) {
            // Already ordered; re-asserting is a no-op success.
            return true;
        }

        let mut p = self.predecessors(a);
        p.insert(a.clone());
        let mut s = self.successors(b);
        s.insert(b.clone());

        if p.intersection(&s).next().is_some() {
            self.reject_cache.insert((a.clone(), b.clone()));
            return false;
        }

        for u in &p {
            for v in &s {
                self.succ.entry(u.clone()).or_default().insert(v.clone());
                self.pred.entry(v.clone()).or_default().insert(u.clone());
            }
        }
        true
    }

    fn close_edge(&mut self, a: &T, b: &T) {
        let mut p = self.predecessors(a);
        p.insert(a.clone());
        let mut s = self.successors(b);
        s.insert(b.clone());
        for u in &p {
            for v in &s {
                self.succ.entry(u.clone()).or_default().insert(v.clone());
                self.pred.entry(v.clone()).or_default().insert(u.clone());
            }
        }
    }

    /// Reports whether `a < b`.
    #[must_use]
    pub fn check(&self, a: &T, b: &T) -> bool {
        self.succ.get(a).is_some_and(|s| s.contains(b))
    }

    /// The upward cone of `n`: all `p` with `p < n`, excluding `n`.
    #[must_use]
    pub fn predecessors(&self, n: &T) -> HashSet<T> {
        self.pred.get(n).cloned().unwrap_or_default()
    }

    /// The downward cone of `n`: all `s` with `n < s`, excluding `n`.
    #[must_use]
    pub fn successors(&self, n: &T) -> HashSet<T> {
        self.succ.get(n).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn elements(&self) -> HashSet<T> {
        self.vertices.clone()
    }

    /// The induced sub-poset on `s`. Resets the asymmetry cache, since a
    /// cache built against the full vertex set is stale relative to a
    /// restricted one.
    #[must_use]
    pub fn subset(&self, s: &HashSet<T>) -> Self {
        let vertices: HashSet<T> = self.vertices.intersection(s).cloned().collect();
        let succ = vertices
            .iter()
            .map(|v| {
                let restricted = self
                    .succ
                    .get(v)
                    .map(|dsts| dsts.intersection(&vertices).cloned().collect())
                    .unwrap_or_default();
                (v.clone(), restricted)
            })
            .collect();
        let pred = vertices
            .iter()
            .map(|v| {
                let restricted = self
                    .pred
                    .get(v)
                    .map(|srcs| srcs.intersection(&vertices).cloned().collect())
                    .unwrap_or_default();
                (v.clone(), restricted)
            })
            .collect();
        Self {
            vertices,
            succ,
            pred,
            reject_cache: HashSet::new(),
        }
    }

    fn to_edge_vec(&self) -> Vec<(T, T)> {
        let mut edges = Vec::new();
        for (u, dsts) in &self.succ {
            for v in dsts {
                edges.push((u.clone(), v.clone()));
            }
        }
        edges
    }

    /// Candidate pairs for refinement: ordered pairs `(u, v)` with `u != v`
    /// and neither `u < v` nor `v < u` currently holding. Enumerated in a
    /// fixed, deterministic (sorted) order.
    fn candidate_pairs(&self) -> Vec<(T, T)> {
        let mut sorted: Vec<T> = self.vertices.iter().cloned().collect();
        sorted.sort_unstable();
        let mut pairs = Vec::new();
        for u in &sorted {
            for v in &sorted {
                if u != v && !self.check(u, v) && !self.check(v, u) {
                    pairs.push((u.clone(), v.clone()));
                }
            }
        }
        pairs
    }
}
