//! The abstract specification contract and the built-in single-object
//! read/write memory.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::marker::PhantomData;

use super::{Instruction, Labeled, Operation};

/// A deterministic abstract state machine: `start` produces the initial
/// state, `step` is a pure transition from `(state, instruction)` to
/// `(next_state, the operation that instruction actually produced)`.
///
/// Implementations should keep `State` cheap to clone -- the semantic
/// checkers thread a fresh state through every candidate serialization.
pub trait Specification<K, V> {
    type State: Clone + Eq;

    fn start(&self) -> Self::State;

    fn step(&self, state: &Self::State, instr: &Instruction<K, V>) -> (Self::State, Operation<K, V>);

    /// Walks `log` left to right, threading state through `step`. Every
    /// entry that is an [`Operation`] (not an [`Instruction`]) must match
    /// what `step` says would actually happen; [`Instruction`] entries
    /// only contribute state updates.
    fn satisfies(&self, log: &[Labeled<K, V>]) -> bool
    where
        V: PartialEq,
    {
        let mut state = self.start();
        for labeled in log {
            let instr = labeled.to_instruction();
            let (next_state, produced) = self.step(&state, &instr);
            state = next_state;
            if let Labeled::Op(op) = labeled {
                if *op != produced {
                    return false;
                }
            }
        }
        true
    }
}

/// The built-in single-object key/value memory: `wr(k, v)` sets `k ↦ v`;
/// `rd(k)` returns the current value of `k`, or `None` (`⊥`) if `k` has
/// never been written.
///
/// State is a `BTreeMap` rather than a hash map so that `State: Eq` is
/// well-defined without relying on iteration order, and so `Debug`
/// output in failing tests is deterministic.
#[derive(Debug, Default)]
pub struct RWMemorySpecification<K, V> {
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> RWMemorySpecification<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<K, V> Specification<K, V> for RWMemorySpecification<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    type State = BTreeMap<K, V>;

    fn start(&self) -> Self::State {
        BTreeMap::new()
    }

    fn step(&self, state: &Self::State, instr: &Instruction<K, V>) -> (Self::State, Operation<K, V>) {
        match instr {
            Instruction::Write { key, value } => {
                let mut next = state.clone();
                next.insert(key.clone(), value.clone());
                (
                    next,
                    Operation::Write {
                        key: key.clone(),
                        value: value.clone(),
                    },
                )
            }
            Instruction::Read { key } => {
                let ret = state.get(key).cloned();
                (
                    state.clone(),
                    Operation::Read {
                        key: key.clone(),
                        ret,
                    },
                )
            }
        }
    }
}
