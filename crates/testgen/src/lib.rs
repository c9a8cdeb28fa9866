//! Random differentiated per-process read/write history generation for
//! property-style testing and benchmarking of `cocausal_core`.

mod generator;

pub use generator::{generate_mult_histories, generate_single_history, GeneratedHistory, HistParams};
