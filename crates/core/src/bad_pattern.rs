//! Syntactic necessary conditions over the write-read graph `co = (po ∪
//! wr)⁺`: the bad-pattern detector.
//!
//! Defined only for [differentiated](History::differentiated) histories;
//! every entry point returns [`crate::history::NotDifferentiatedError`]
//! otherwise.

use core::fmt;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;
use tracing::{debug, trace};

use crate::graph::digraph::DiGraph;
use crate::history::{History, Labeled, NotDifferentiatedError, Operation, OpId};
use crate::poset::Poset;

/// A syntactic violation of one of the weak causal consistency criteria,
/// reported instead of (or alongside) a semantic verdict.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadPattern {
    CyclicCo,
    WriteCoInitRead,
    ThinAirRead,
    WriteCoRead,
    CyclicCf,
    WriteHbInitRead,
    CyclicHb,
}

impl fmt::Display for BadPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CyclicCo => "CyclicCO",
            Self::WriteCoInitRead => "WriteCOInitRead",
            Self::ThinAirRead => "ThinAirRead",
            Self::WriteCoRead => "WriteCORead",
            Self::CyclicCf => "CyclicCF",
            Self::WriteHbInitRead => "WriteHBInitRead",
            Self::CyclicHb => "CyclicHB",
        };
        f.write_str(name)
    }
}

fn digraph_from_poset<T>(p: &Poset<T>) -> DiGraph<T>
where
    T: Hash + Eq + Ord + Clone + Debug,
{
    let mut g = DiGraph::default();
    for v in p.elements() {
        g.add_vertex(v.clone());
        for s in p.successors(&v) {
            g.add_edge(v.clone(), s);
        }
    }
    g
}

fn write_index<K, V>(h: &History<K, V>) -> HashMap<(K, V), OpId>
where
    K: Hash + Eq + Clone,
    V: Hash + Eq + Clone,
{
    let mut writes = HashMap::new();
    for (id, labeled) in &h.label {
        if let Labeled::Op(Operation::Write { key, value }) = labeled {
            writes.insert((key.clone(), value.clone()), id.clone());
        }
    }
    writes
}

/// Builds `co = (po ∪ wr)⁺`.
///
/// Halts with [`BadPattern::ThinAirRead`] on a non-default read with no
/// matching write (checked before acyclicity, per construction order:
/// either order yields the same verdict, but this crate checks thin-air
/// first). Halts with [`BadPattern::CyclicCo`] if `po ∪ wr` has a cycle.
/// Otherwise returns the transitive closure wrapped as a [`Poset`],
/// bypassing the asymmetry check since acyclicity is already proven.
pub fn make_co<K, V>(h: &History<K, V>) -> Result<Poset<OpId>, BadPattern>
where
    K: Hash + Eq + Ord + Clone + Debug,
    V: Hash + Eq + Clone + Debug,
{
    let writes = write_index(h);
    let mut g = digraph_from_poset(&h.po);

    for (id, labeled) in &h.label {
        let Labeled::Op(Operation::Read { key, ret: Some(v) }) = labeled else {
            continue;
        };
        let Some(src) = writes.get(&(key.clone(), v.clone())) else {
            debug!(read = %id, "thin-air read: no matching write");
            return Err(BadPattern::ThinAirRead);
        };
        g.add_edge(src.clone(), id.clone());
    }

    if g.has_cycle() {
        if let Some((a, b)) = g.find_cycle_edge() {
            debug!(%a, %b, "cyclic co: po ∪ wr has a cycle");
        }
        return Err(BadPattern::CyclicCo);
    }

    let closed = g.closure();
    Ok(Poset::from_closed_digraph(h.ops.iter().cloned().collect(), &closed))
}

fn is_write_co_init_read<K, V>(h: &History<K, V>, co: &Poset<OpId>) -> bool
where
    K: Hash + Eq + Clone + PartialEq,
    V: Clone,
{
    for (id, labeled) in &h.label {
        let Labeled::Op(Operation::Read { key, ret: None }) = labeled else {
            continue;
        };
        for anc in co.predecessors(id) {
            if let Labeled::Op(Operation::Write { key: wk, .. }) = &h.label[&anc] {
                if wk == key {
                    trace!(read = %id, ancestor = %anc, "write-co-init-read");
                    return true;
                }
            }
        }
    }
    false
}

fn is_write_co_read<K, V>(h: &History<K, V>, co: &Poset<OpId>) -> bool
where
    K: Hash + Eq + Clone,
    V: Hash + Eq + Clone,
{
    let writes = write_index(h);
    for (id, labeled) in &h.label {
        let Labeled::Op(Operation::Read { key, ret: Some(v) }) = labeled else {
            continue;
        };
        let Some(w) = writes.get(&(key.clone(), v.clone())) else {
            continue;
        };
        let w_descendants = co.successors(w);
        let r_ancestors = co.predecessors(id);
        for mid in w_descendants.intersection(&r_ancestors) {
            if let Labeled::Op(Operation::Write { key: mk, .. }) = &h.label[mid] {
                if mk == key {
                    trace!(write = %w, read = %id, overwrite = %mid, "write-co-read");
                    return true;
                }
            }
        }
    }
    false
}

/// Edges `w' → w` for every `wr(w) → rd(r)` pair on key `k` (read return
/// `v`) and every causal ancestor `w'` of `r` that writes `(k, v')` with
/// `v' != v`: the other write `r` had to have already causally observed
/// and moved past.
fn cf_edges<K, V>(h: &History<K, V>, co: &Poset<OpId>) -> alloc::vec::Vec<(OpId, OpId)>
where
    K: Hash + Eq + Clone,
    V: Hash + Eq + Clone,
{
    let writes = write_index(h);
    let mut edges = alloc::vec::Vec::new();
    for (r, labeled) in &h.label {
        let Labeled::Op(Operation::Read { key, ret: Some(v) }) = labeled else {
            continue;
        };
        let Some(w) = writes.get(&(key.clone(), v.clone())) else {
            continue;
        };
        for w_other in co.predecessors(r) {
            if &w_other == w {
                continue;
            }
            if let Labeled::Op(Operation::Write { key: ok, value: ov }) = &h.label[&w_other] {
                if ok == key && ov != v {
                    edges.push((w_other, w.clone()));
                }
            }
        }
    }
    edges
}

fn is_cyclic_cf<K, V>(h: &History<K, V>, co: &Poset<OpId>) -> bool
where
    K: Hash + Eq + Ord + Clone + Debug,
    V: Hash + Eq + Clone,
{
    let mut g = digraph_from_poset(co);
    for (a, b) in cf_edges(h, co) {
        g.add_edge(a, b);
    }
    g.has_cycle()
}

/// `co` augmented with each process's happens-before edges. These are the
/// same `w' → w` edges `cf_edges` computes (a write-read pair's other
/// causal-ancestor writes of the same key); the spec attributes them to
/// the reading process, but for acyclicity/ancestry purposes the edge set
/// is what matters, not which process it's conceptually attributed to.
fn augmented_with_hb<K, V>(h: &History<K, V>, co: &Poset<OpId>) -> DiGraph<OpId>
where
    K: Hash + Eq + Ord + Clone + Debug,
    V: Hash + Eq + Clone,
{
    let mut g = digraph_from_poset(co);
    for (a, b) in cf_edges(h, co) {
        g.add_edge(a, b);
    }
    g
}

fn is_cyclic_hb<K, V>(h: &History<K, V>, co: &Poset<OpId>) -> bool
where
    K: Hash + Eq + Ord + Clone + Debug,
    V: Hash + Eq + Clone,
{
    augmented_with_hb(h, co).has_cycle()
}

fn is_write_hb_init_read<K, V>(h: &History<K, V>, co: &Poset<OpId>) -> bool
where
    K: Hash + Eq + Ord + Clone + Debug + PartialEq,
    V: Hash + Eq + Clone,
{
    let g = augmented_with_hb(h, co);
    let reach = g.closure();
    for (id, labeled) in &h.label {
        let Labeled::Op(Operation::Read { key, ret: None }) = labeled else {
            continue;
        };
        for (w, w_labeled) in &h.label {
            let Labeled::Op(Operation::Write { key: wk, .. }) = w_labeled else {
                continue;
            };
            if wk == key
                && reach
                    .adj_map
                    .get(w)
                    .is_some_and(|descendants| descendants.contains(id))
            {
                return true;
            }
        }
    }
    false
}

/// `{CyclicCO, ThinAirRead, WriteCOInitRead, WriteCORead}` or `None` if
/// clean. Return order reflects check order; only the first violation is
/// reported.
pub fn find_cc_bad_pattern<K, V>(h: &History<K, V>) -> Result<Option<BadPattern>, NotDifferentiatedError>
where
    K: Hash + Eq + Ord + Clone + Debug,
    V: Hash + Eq + Clone + Debug + PartialEq,
{
    if !h.differentiated() {
        return Err(NotDifferentiatedError);
    }
    let co = match make_co(h) {
        Ok(co) => co,
        Err(tag) => return Ok(Some(tag)),
    };
    if is_write_co_init_read(h, &co) {
        return Ok(Some(BadPattern::WriteCoInitRead));
    }
    if is_write_co_read(h, &co) {
        return Ok(Some(BadPattern::WriteCoRead));
    }
    Ok(None)
}

/// [`find_cc_bad_pattern`]'s checks plus [`BadPattern::CyclicCf`].
pub fn find_ccv_bad_pattern<K, V>(h: &History<K, V>) -> Result<Option<BadPattern>, NotDifferentiatedError>
where
    K: Hash + Eq + Ord + Clone + Debug,
    V: Hash + Eq + Clone + Debug + PartialEq,
{
    if let Some(tag) = find_cc_bad_pattern(h)? {
        return Ok(Some(tag));
    }
    let co = make_co(h).expect("checked clean by find_cc_bad_pattern above");
    if is_cyclic_cf(h, &co) {
        return Ok(Some(BadPattern::CyclicCf));
    }
    Ok(None)
}

/// [`find_cc_bad_pattern`]'s checks (minus `CyclicCF`) plus
/// [`BadPattern::WriteHbInitRead`] and [`BadPattern::CyclicHb`].
pub fn find_cm_bad_pattern<K, V>(h: &History<K, V>) -> Result<Option<BadPattern>, NotDifferentiatedError>
where
    K: Hash + Eq + Ord + Clone + Debug,
    V: Hash + Eq + Clone + Debug + PartialEq,
{
    if let Some(tag) = find_cc_bad_pattern(h)? {
        return Ok(Some(tag));
    }
    let co = make_co(h).expect("checked clean by find_cc_bad_pattern above");
    if is_write_hb_init_read(h, &co) {
        return Ok(Some(BadPattern::WriteHbInitRead));
    }
    if is_cyclic_hb(h, &co) {
        return Ok(Some(BadPattern::CyclicHb));
    }
    Ok(None)
}
