use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Local};
use cocausal_core::history::Operation;
use rand::distr::{Distribution, Uniform};
use rand::RngExt;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

#[derive(Clone, Debug, Default, Deserialize, Serialize, TypedBuilder)]
pub struct HistParams {
    pub id: u64,
    pub n_process: u64,
    pub n_variable: u64,
    pub n_op: u64,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct GeneratedHistory {
    params: HistParams,
    info: String,
    start: DateTime<Local>,
    end: DateTime<Local>,
    data: BTreeMap<String, Vec<Operation<u64, u64>>>,
}

impl GeneratedHistory {
    #[must_use]
    pub const fn params(&self) -> &HistParams {
        &self.params
    }

    #[must_use]
    pub const fn data(&self) -> &BTreeMap<String, Vec<Operation<u64, u64>>> {
        &self.data
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Generates one differentiated history over `n_process` processes, each
/// `n_op` operations long, touching `n_variable` keys.
///
/// # Coherence invariant
///
/// Every generated read is backed by a write that precedes it in
/// generation order: a per-key `latest_writes` map is threaded across
/// processes (processes are generated in order, each seeing everything
/// generated so far), and reads sample from it rather than conjuring an
/// arbitrary return value. A key with no write yet yields `ret: None`
/// (`⊥`), which this crate's `Operation` represents natively -- unlike
/// multi-version transactional histories, no synthetic "init transaction"
/// is needed to give reads something to observe.
///
/// # Differentiation invariant
///
/// Every write is assigned a globally unique version from a single
/// monotonic counter shared across all keys, so `(key, value)` pairs
/// never repeat and the result is always
/// [`differentiated`](cocausal_core::History::differentiated).
///
/// # Panics
///
/// Panics if `n_variable` is zero (cannot build a uniform distribution
/// over an empty range).
#[must_use]
pub fn generate_single_history(
    n_process: u64,
    n_variable: u64,
    n_op: u64,
) -> BTreeMap<String, Vec<Operation<u64, u64>>> {
    let mut counter: u64 = 0;
    let mut latest_writes: HashMap<u64, u64> = HashMap::new();
    let mut rng = rand::rng();
    let key_range = Uniform::new(0, n_variable).expect("n_variable must be nonzero");

    let mut data = BTreeMap::new();
    for p in 0..n_process {
        let mut ops = Vec::with_capacity(n_op as usize);
        for _ in 0..n_op {
            let key = key_range.sample(&mut rng);
            if rng.random::<bool>() {
                let ret = latest_writes.get(&key).copied();
                ops.push(Operation::Read { key, ret });
            } else {
                counter += 1;
                latest_writes.insert(key, counter);
                ops.push(Operation::Write { key, value: counter });
            }
        }
        data.insert(format!("p{p}"), ops);
    }
    data
}

/// Generates `n_hist` independent histories in parallel.
#[must_use]
pub fn generate_mult_histories(
    n_hist: u64,
    n_process: u64,
    n_variable: u64,
    n_op: u64,
) -> Vec<GeneratedHistory> {
    (0..n_hist)
        .into_par_iter()
        .map(|id| {
            let start = Local::now();
            let data = generate_single_history(n_process, n_variable, n_op);
            let end = Local::now();
            GeneratedHistory {
                params: HistParams {
                    id,
                    n_process,
                    n_variable,
                    n_op,
                },
                info: "generated".to_string(),
                start,
                end,
                data,
            }
        })
        .collect()
}
