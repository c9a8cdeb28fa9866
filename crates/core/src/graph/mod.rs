//! Plain directed-graph primitives shared by the poset engine and the
//! bad-pattern detector.

pub mod digraph;
