//! Weak causal consistency checking for key-value read/write histories.
//!
//! `cocausal_core` decides whether a recorded execution of a shared
//! key-value memory satisfies one of three weak causal consistency
//! criteria, from weakest to strongest:
//!
//! 1. **Causal Consistency (CC)** -- can the observed returns be
//!    explained by *some* causal order consistent with program order?
//! 2. **Causal Memory (CM)** -- as CC, but readers additionally see their
//!    own causal past coherently.
//! 3. **Causal Convergence (CCv)** -- can the returns additionally be
//!    explained under a single, globally agreed total order of writes?
//!
//! # Entry points
//!
//! [`check_cc`], [`check_cm`], and [`check_ccv`] search the space of
//! [`Poset::refinements`] of program order, consulting a
//! [`Specification`] for each candidate serialization. Each has a
//! `*_cancellable` variant (cooperative cancellation via
//! [`CancellationToken`]) and, behind the `rayon` feature, a
//! `*_parallel` variant that fans the outer refinement loop across a
//! thread pool.
//!
//! [`find_cc_bad_pattern`], [`find_ccv_bad_pattern`], and
//! [`find_cm_bad_pattern`] run cheaper syntactic necessary conditions
//! over the write-read graph first; a bad-pattern hit implies the
//! corresponding semantic checker would also reject, but the converse is
//! not promised and callers must not skip the semantic check on a clean
//! result.
//!
//! ```
//! use std::collections::BTreeMap;
//! use cocausal_core::history::{History, Operation};
//! use cocausal_core::history::spec::RWMemorySpecification;
//! use cocausal_core::check_cc;
//!
//! let mut data = BTreeMap::new();
//! data.insert("a".to_string(), vec![Operation::Write { key: "x", value: 1 }]);
//! data.insert("b".to_string(), vec![Operation::Read { key: "x", ret: Some(1) }]);
//! let h = History::from_processes(&data);
//! assert!(check_cc(&h, &RWMemorySpecification::new()));
//! ```
//!
//! # Crate features
//!
//! - **`serde`** -- enables `Serialize`/`Deserialize` derives on the
//!   value types ([`Operation`](history::Operation),
//!   [`Instruction`](history::Instruction), [`OpId`](history::OpId),
//!   [`Labeled`](history::Labeled), [`BadPattern`](bad_pattern::BadPattern)).
//! - **`rayon`** -- enables the `*_parallel` checker variants. Incompatible
//!   with `no_std`.
//!
//! This crate is `no_std` compatible (requires `alloc`).

#![cfg_attr(not(any(test, feature = "rayon")), no_std)]
extern crate alloc;

pub mod bad_pattern;
pub mod cancellation;
pub mod checkers;
pub mod graph;
pub mod history;
pub mod poset;

pub use bad_pattern::{find_cc_bad_pattern, find_ccv_bad_pattern, find_cm_bad_pattern, BadPattern};
pub use cancellation::CancellationToken;
pub use checkers::{
    check_cc, check_cc_cancellable, check_ccv, check_ccv_cancellable, check_cm, check_cm_cancellable,
};
#[cfg(feature = "rayon")]
pub use checkers::{check_cc_parallel, check_ccv_parallel, check_cm_parallel};
pub use history::spec::{RWMemorySpecification, Specification};
pub use history::{History, Instruction, Labeled, NotDifferentiatedError, Operation, OpId};
pub use poset::Poset;
