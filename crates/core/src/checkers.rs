//! The semantic checkers: `check_cc`, `check_cm`, `check_ccv`, searching
//! over refinements of program order and consulting a [`Specification`]
//! for each candidate serialization.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashSet;
use tracing::{debug, trace};

use crate::cancellation::CancellationToken;
use crate::history::spec::Specification;
use crate::history::{History, Labeled, OpId};
use crate::poset::Poset;

fn log_for<K, V>(ch: &History<K, V>, order: &[OpId]) -> Vec<Labeled<K, V>>
where
    K: Clone,
    V: Clone,
{
    order.iter().map(|id| ch.label[id].clone()).collect()
}

/// Is `op_id` witnessed under `co`, given `ret_set` controls which
/// predecessors keep their observed return value in the causal history?
fn op_witnessed<K, V, S>(
    h: &History<K, V>,
    co: &Poset<OpId>,
    op_id: &OpId,
    ret_set: &HashSet<OpId>,
    spec: &S,
) -> bool
where
    K: Hash + Eq + Ord + Clone + Debug,
    V: Hash + Eq + Clone + Debug + PartialEq,
    S: Specification<K, V>,
{
    let ch = h.causal_hist(co, op_id, ret_set);
    let sorts = ch.po.topological_sorts();
    trace!(op = %op_id, candidates = sorts.len(), "enumerated topological sorts");
    sorts.iter().any(|order| spec.satisfies(&log_for(&ch, order)))
}

/// For each refinement `co` of `h.po`, checks every operation's causal
/// history (return value kept only for the op itself) against `spec`.
/// Returns `true` the first time every operation in some `co` is
/// witnessed.
#[must_use]
pub fn check_cc<K, V, S>(h: &History<K, V>, spec: &S) -> bool
where
    K: Hash + Eq + Ord + Clone + Debug,
    V: Hash + Eq + Clone + Debug + PartialEq,
    S: Specification<K, V>,
{
    debug_assert!(h.differentiated(), "check_cc requires a differentiated history");
    for (i, co) in h.po.refinements().into_iter().enumerate() {
        debug!(refinement = i, "checking co");
        let satisfied = co.elements().iter().all(|op_id| {
            let ret_set: HashSet<OpId> = core::iter::once(op_id.clone()).collect();
            op_witnessed(h, &co, op_id, &ret_set, spec)
        });
        if satisfied {
            return true;
        }
    }
    false
}

/// As [`check_cc`], but the causal history retains return values for
/// *every* predecessor of the focal operation, not just the operation
/// itself -- the reader sees its own causal past coherently.
#[must_use]
pub fn check_cm<K, V, S>(h: &History<K, V>, spec: &S) -> bool
where
    K: Hash + Eq + Ord + Clone + Debug,
    V: Hash + Eq + Clone + Debug + PartialEq,
    S: Specification<K, V>,
{
    debug_assert!(h.differentiated(), "check_cm requires a differentiated history");
    for (i, co) in h.po.refinements().into_iter().enumerate() {
        debug!(refinement = i, "checking co");
        let satisfied = co.elements().iter().all(|op_id| {
            let mut ret_set = co.predecessors(op_id);
            ret_set.insert(op_id.clone());
            op_witnessed(h, &co, op_id, &ret_set, spec)
        });
        if satisfied {
            return true;
        }
    }
    false
}

/// For each refinement `co` of `h.po` and each total order `arb`
/// consistent with `co`, checks every operation's `causal_arb` projection
/// against `spec`. Returns `true` the first time every operation agrees
/// under the same `arb`.
#[must_use]
pub fn check_ccv<K, V, S>(h: &History<K, V>, spec: &S) -> bool
where
    K: Hash + Eq + Ord + Clone + Debug,
    V: Hash + Eq + Clone + Debug + PartialEq,
    S: Specification<K, V>,
{
    debug_assert!(h.differentiated(), "check_ccv requires a differentiated history");
    for (i, co) in h.po.refinements().into_iter().enumerate() {
        let arbs = co.topological_sorts();
        debug!(refinement = i, candidates = arbs.len(), "checking co");
        for arb in &arbs {
            let satisfied = co
                .elements()
                .iter()
                .all(|op_id| spec.satisfies(&h.causal_arb(&co, op_id, arb)));
            if satisfied {
                return true;
            }
        }
    }
    false
}

fn cc_on_refinement<K, V, S>(h: &History<K, V>, co: &Poset<OpId>, spec: &S) -> bool
where
    K: Hash + Eq + Ord + Clone + Debug,
    V: Hash + Eq + Clone + Debug + PartialEq,
    S: Specification<K, V>,
{
    co.elements().iter().all(|op_id| {
        let ret_set: HashSet<OpId> = core::iter::once(op_id.clone()).collect();
        op_witnessed(h, co, op_id, &ret_set, spec)
    })
}

fn cm_on_refinement<K, V, S>(h: &History<K, V>, co: &Poset<OpId>, spec: &S) -> bool
where
    K: Hash + Eq + Ord + Clone + Debug,
    V: Hash + Eq + Clone + Debug + PartialEq,
    S: Specification<K, V>,
{
    co.elements().iter().all(|op_id| {
        let mut ret_set = co.predecessors(op_id);
        ret_set.insert(op_id.clone());
        op_witnessed(h, co, op_id, &ret_set, spec)
    })
}

fn ccv_on_refinement<K, V, S>(h: &History<K, V>, co: &Poset<OpId>, spec: &S) -> bool
where
    K: Hash + Eq + Ord + Clone + Debug,
    V: Hash + Eq + Clone + Debug + PartialEq,
    S: Specification<K, V>,
{
    co.topological_sorts().iter().any(|arb| {
        co.elements()
            .iter()
            .all(|op_id| spec.satisfies(&h.causal_arb(co, op_id, arb)))
    })
}

/// Cooperative-cancellation variant of [`check_cc`]. Returns `None` if
/// `token` was observed cancelled before a verdict was reached.
#[must_use]
pub fn check_cc_cancellable<K, V, S>(h: &History<K, V>, spec: &S, token: &CancellationToken) -> Option<bool>
where
    K: Hash + Eq + Ord + Clone + Debug,
    V: Hash + Eq + Clone + Debug + PartialEq,
    S: Specification<K, V>,
{
    debug_assert!(h.differentiated(), "check_cc_cancellable requires a differentiated history");
    for co in h.po.refinements() {
        if token.is_cancelled() {
            return None;
        }
        if cc_on_refinement(h, &co, spec) {
            return Some(true);
        }
    }
    Some(false)
}

/// Cooperative-cancellation variant of [`check_cm`].
#[must_use]
pub fn check_cm_cancellable<K, V, S>(h: &History<K, V>, spec: &S, token: &CancellationToken) -> Option<bool>
where
    K: Hash + Eq + Ord + Clone + Debug,
    V: Hash + Eq + Clone + Debug + PartialEq,
    S: Specification<K, V>,
{
    debug_assert!(h.differentiated(), "check_cm_cancellable requires a differentiated history");
    for co in h.po.refinements() {
        if token.is_cancelled() {
            return None;
        }
        if cm_on_refinement(h, &co, spec) {
            return Some(true);
        }
    }
    Some(false)
}

/// Cooperative-cancellation variant of [`check_ccv`].
#[must_use]
pub fn check_ccv_cancellable<K, V, S>(h: &History<K, V>, spec: &S, token: &CancellationToken) -> Option<bool>
where
    K: Hash + Eq + Ord + Clone + Debug,
    V: Hash + Eq + Clone + Debug + PartialEq,
    S: Specification<K, V>,
{
    debug_assert!(h.differentiated(), "check_ccv_cancellable requires a differentiated history");
    for co in h.po.refinements() {
        if token.is_cancelled() {
            return None;
        }
        if ccv_on_refinement(h, &co, spec) {
            return Some(true);
        }
    }
    Some(false)
}

#[cfg(feature = "rayon")]
mod parallel {
    use rayon::iter::{IntoParallelIterator, ParallelIterator};

    use super::{cc_on_refinement, ccv_on_refinement, cm_on_refinement};
    use crate::history::spec::Specification;
    use crate::history::History;
    use core::fmt::Debug;
    use core::hash::Hash;

    /// Parallel variant of [`super::check_cc`]: fans the outer refinement
    /// loop across a `rayon` thread pool, short-circuiting on the first
    /// witnessing refinement found by any worker. Sound because the
    /// checkers are commutative over the refinement set (spec §5).
    #[must_use]
    pub fn check_cc_parallel<K, V, S>(h: &History<K, V>, spec: &S) -> bool
    where
        K: Hash + Eq + Ord + Clone + Debug + Send + Sync,
        V: Hash + Eq + Clone + Debug + PartialEq + Send + Sync,
        S: Specification<K, V> + Sync,
    {
        debug_assert!(h.differentiated(), "check_cc_parallel requires a differentiated history");
        h.po
            .refinements()
            .into_iter()
            .collect::<alloc::vec::Vec<_>>()
            .into_par_iter()
            .find_any(|co| cc_on_refinement(h, co, spec))
            .is_some()
    }

    /// Parallel variant of [`super::check_cm`].
    #[must_use]
    pub fn check_cm_parallel<K, V, S>(h: &History<K, V>, spec: &S) -> bool
    where
        K: Hash + Eq + Ord + Clone + Debug + Send + Sync,
        V: Hash + Eq + Clone + Debug + PartialEq + Send + Sync,
        S: Specification<K, V> + Sync,
    {
        debug_assert!(h.differentiated(), "check_cm_parallel requires a differentiated history");
        h.po
            .refinements()
            .into_iter()
            .collect::<alloc::vec::Vec<_>>()
            .into_par_iter()
            .find_any(|co| cm_on_refinement(h, co, spec))
            .is_some()
    }

    /// Parallel variant of [`super::check_ccv`].
    #[must_use]
    pub fn check_ccv_parallel<K, V, S>(h: &History<K, V>, spec: &S) -> bool
    where
        K: Hash + Eq + Ord + Clone + Debug + Send + Sync,
        V: Hash + Eq + Clone + Debug + PartialEq + Send + Sync,
        S: Specification<K, V> + Sync,
    {
        debug_assert!(h.differentiated(), "check_ccv_parallel requires a differentiated history");
        h.po
            .refinements()
            .into_iter()
            .collect::<alloc::vec::Vec<_>>()
            .into_par_iter()
            .find_any(|co| ccv_on_refinement(h, co, spec))
            .is_some()
    }
}

#[cfg(feature = "rayon")]
pub use parallel::{check_cc_parallel, check_ccv_parallel, check_cm_parallel};

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::ToString;
    use alloc::vec;

    use super::*;
    use crate::history::spec::RWMemorySpecification;
    use crate::history::Operation;

    fn history(procs: &[(&str, Vec<Operation<&'static str, i32>>)]) -> History<&'static str, i32> {
        let mut data = BTreeMap::new();
        for (p, ops) in procs {
            data.insert((*p).to_string(), ops.clone());
        }
        History::from_processes(&data)
    }

    #[test]
    fn ha_is_causal_but_not_convergent() {
        // Ha: a:[wr(x,1),rd(x,2)], b:[wr(x,2),rd(x,1)]
        let h = history(&[
            ("a", vec![Operation::Write { key: "x", value: 1 }, Operation::Read { key: "x", ret: Some(2) }]),
            ("b", vec![Operation::Write { key: "x", value: 2 }, Operation::Read { key: "x", ret: Some(1) }]),
        ]);
        let spec = RWMemorySpecification::<&str, i32>::new();
        assert!(check_cc(&h, &spec));
        assert!(check_cm(&h, &spec));
        assert!(!check_ccv(&h, &spec));
    }

    #[test]
    fn hc_is_causal_but_not_memory_or_convergent() {
        // Hc: a:[wr(x,1)], b:[wr(x,2), rd(x,1), rd(x,2)]
        let h = history(&[
            ("a", vec![Operation::Write { key: "x", value: 1 }]),
            (
                "b",
                vec![
                    Operation::Write { key: "x", value: 2 },
                    Operation::Read { key: "x", ret: Some(1) },
                    Operation::Read { key: "x", ret: Some(2) },
                ],
            ),
        ]);
        let spec = RWMemorySpecification::<&str, i32>::new();
        assert!(check_cc(&h, &spec));
        assert!(!check_cm(&h, &spec));
        assert!(!check_ccv(&h, &spec));
    }

    #[test]
    fn he_fails_every_checker() {
        let h = history(&[
            ("a", vec![Operation::Write { key: "x", value: 1 }, Operation::Write { key: "y", value: 1 }]),
            ("b", vec![Operation::Read { key: "y", ret: Some(1) }, Operation::Write { key: "x", value: 2 }]),
            ("c", vec![Operation::Read { key: "x", ret: Some(2) }, Operation::Read { key: "x", ret: Some(1) }]),
        ]);
        let spec = RWMemorySpecification::<&str, i32>::new();
        assert!(!check_cc(&h, &spec));
        assert!(!check_cm(&h, &spec));
        assert!(!check_ccv(&h, &spec));
    }

    #[test]
    fn cancellable_matches_pure_when_not_cancelled() {
        let h = history(&[
            ("a", vec![Operation::Write { key: "x", value: 1 }]),
            ("b", vec![Operation::Read { key: "x", ret: Some(1) }]),
        ]);
        let spec = RWMemorySpecification::<&str, i32>::new();
        let token = CancellationToken::new();
        assert_eq!(check_cc_cancellable(&h, &spec, &token), Some(check_cc(&h, &spec)));
    }

    #[test]
    fn cancelled_before_start_yields_none() {
        let h = history(&[("a", vec![Operation::Write { key: "x", value: 1 }])]);
        let spec = RWMemorySpecification::<&str, i32>::new();
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(check_cc_cancellable(&h, &spec, &token), None);
    }
}
