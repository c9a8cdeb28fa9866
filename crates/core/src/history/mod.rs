//! Labeled operation histories, program order, and causal-past extraction.

pub mod spec;

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::{HashMap, HashSet};

use crate::poset::Poset;

/// A single-key read or write, together with its observed return value.
///
/// `Read { ret: None, .. }` denotes a read of the key's default/initial
/// value (`⊥`), not a read that hasn't happened yet -- every operation in
/// a constructed [`History`] is fully formed.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation<K, V> {
    Write { key: K, value: V },
    Read { key: K, ret: Option<V> },
}

impl<K: Clone, V: Clone> Operation<K, V> {
    /// The key this operation touches.
    pub fn key(&self) -> &K {
        match self {
            Self::Write { key, .. } | Self::Read { key, .. } => key,
        }
    }

    /// Erases the return value, producing the instruction that would have
    /// produced this operation.
    #[must_use]
    pub fn to_instruction(&self) -> Instruction<K, V> {
        match self {
            Self::Write { key, value } => Instruction::Write {
                key: key.clone(),
                value: value.clone(),
            },
            Self::Read { key, .. } => Instruction::Read { key: key.clone() },
        }
    }
}

/// An [`Operation`] with its return value erased: "what does the
/// specification say *would* happen here?"
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction<K, V> {
    Write { key: K, value: V },
    Read { key: K },
}

/// A slot in a [`History`]'s label map: either the original [`Operation`]
/// (return value retained) or an [`Instruction`] derived from it (return
/// value erased), per `causal_hist`/`causal_arb` projection.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Labeled<K, V> {
    Op(Operation<K, V>),
    Instr(Instruction<K, V>),
}

impl<K: Clone, V: Clone> Labeled<K, V> {
    #[must_use]
    pub fn to_instruction(&self) -> Instruction<K, V> {
        match self {
            Self::Op(op) => op.to_instruction(),
            Self::Instr(instr) => instr.clone(),
        }
    }
}

/// A stable operation identifier, `"{process}.{index}"`, one-indexed
/// within a process. Totally ordered on `(process, index)` so it can key
/// deterministic collections and serve as a [`Poset`] vertex type.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OpId {
    pub process: String,
    pub index: u64,
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.process, self.index)
    }
}

/// Raised when a caller asks for bad-pattern detection or semantic
/// checking over a [`History`] whose writes are not differentiated (§3,
/// §7): every written `(key, value)` pair must be unique. This is a
/// programmer error, not a semantic verdict -- callers are expected to
/// check [`History::differentiated`] up front, not to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotDifferentiatedError;

impl fmt::Display for NotDifferentiatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("history is not differentiated: a (key, value) pair was written more than once")
    }
}

/// A recorded execution: the per-process operation set, its labels, and
/// the program-order poset built from within-process sequencing.
#[derive(Debug, Clone)]
pub struct History<K, V> {
    pub ops: BTreeSet<OpId>,
    pub label: HashMap<OpId, Labeled<K, V>>,
    pub po: Poset<OpId>,
}

impl<K, V> History<K, V>
where
    K: core::hash::Hash + Eq + Ord + Clone + fmt::Debug,
    V: Clone + Eq,
{
    /// Builds a history from per-process operation lists. Assigns each
    /// operation `"{process}.{i+1}"`, then orders consecutive identifiers
    /// within each process.
    #[must_use]
    pub fn from_processes(data: &BTreeMap<String, Vec<Operation<K, V>>>) -> Self {
        let mut ops = BTreeSet::new();
        let mut label = HashMap::new();

        for (process, instrs) in data {
            for (i, op) in instrs.iter().enumerate() {
                let index = u64::try_from(i + 1).expect("process length fits u64");
                let id = OpId {
                    process: process.clone(),
                    index,
                };
                ops.insert(id.clone());
                label.insert(id, Labeled::Op(op.clone()));
            }
        }

        let mut po = Poset::new(ops.iter().cloned());
        for (process, instrs) in data {
            for i in 0..instrs.len().saturating_sub(1) {
                let a = OpId {
                    process: process.clone(),
                    index: u64::try_from(i + 1).expect("process length fits u64"),
                };
                let b = OpId {
                    process: process.clone(),
                    index: u64::try_from(i + 2).expect("process length fits u64"),
                };
                let linked = po.order_try(&a, &b);
                debug_assert!(linked, "consecutive program-order pairs must always link");
            }
        }

        Self { ops, label, po }
    }

    /// Every written `(key, value)` pair appears at most once.
    #[must_use]
    pub fn differentiated(&self) -> bool {
        let mut seen: HashSet<(&K, &V)> = HashSet::new();
        for labeled in self.label.values() {
            let op = match labeled {
                Labeled::Op(op) => op,
                Labeled::Instr(_) => continue,
            };
            if let Operation::Write { key, value } = op {
                if !seen.insert((key, value)) {
                    return false;
                }
            }
        }
        true
    }

    /// The causal history on `co`-predecessors of `op_id` plus `op_id`
    /// itself: operations in `ret_set` keep their observed return value,
    /// all others are demoted to [`Instruction`]s (return value erased).
    #[must_use]
    pub fn causal_hist(&self, co: &Poset<OpId>, op_id: &OpId, ret_set: &HashSet<OpId>) -> Self {
        let mut p = co.predecessors(op_id);
        p.insert(op_id.clone());

        let sub_po = co.subset(&p);
        let ops = p.iter().cloned().collect();
        let label = p
            .iter()
            .map(|id| {
                let labeled = &self.label[id];
                let projected = if ret_set.contains(id) {
                    labeled.clone()
                } else {
                    Labeled::Instr(labeled.to_instruction())
                };
                (id.clone(), projected)
            })
            .collect();

        Self {
            ops,
            label,
            po: sub_po,
        }
    }

    /// `CausalArb(op_id){op_id}` for a total order `arb`: the labels of
    /// `co`-predecessors of `op_id` (including `op_id`) that appear in
    /// `arb`, in `arb`'s order, with `op_id` alone kept as an
    /// [`Operation`] and every other entry demoted to an [`Instruction`].
    ///
    /// `arb` is filtered down to `p = co.predecessors(op_id) ∪ {op_id}`
    /// rather than truncated at `op_id`'s position: `arb` also orders
    /// elements that are `co`-concurrent with `op_id`, which may precede
    /// it in `arb` without being causal predecessors, so the result is not
    /// necessarily a contiguous prefix of `arb`.
    #[must_use]
    pub fn causal_arb(&self, co: &Poset<OpId>, op_id: &OpId, arb: &[OpId]) -> Vec<Labeled<K, V>> {
        let mut p = co.predecessors(op_id);
        p.insert(op_id.clone());

        let filtered: Vec<&OpId> = arb.iter().filter(|id| p.contains(*id)).collect();
        filtered
            .into_iter()
            .map(|id| {
                if id == op_id {
                    self.label[id].clone()
                } else {
                    Labeled::Instr(self.label[id].to_instruction())
                }
            })
            .collect()
    }
}
