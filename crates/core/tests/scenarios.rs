//! The concrete scenarios and refinement-count facts this crate is
//! built to get right.

use std::collections::BTreeMap;

use cocausal_core::history::spec::RWMemorySpecification;
use cocausal_core::{check_cc, check_ccv, check_cm, find_cc_bad_pattern, BadPattern, History, Operation, Poset};

fn history(procs: &[(&str, Vec<Operation<&'static str, i32>>)]) -> History<&'static str, i32> {
    let mut data = BTreeMap::new();
    for (p, ops) in procs {
        data.insert((*p).to_string(), ops.clone());
    }
    History::from_processes(&data)
}

/// Ha: a:[wr(x,1),rd(x,2)], b:[wr(x,2),rd(x,1)]. No total order can
/// explain both reads, but program order alone is satisfiable.
#[test]
fn ha_causal_but_not_convergent() {
    let h = history(&[
        ("a", vec![Operation::Write { key: "x", value: 1 }, Operation::Read { key: "x", ret: Some(2) }]),
        ("b", vec![Operation::Write { key: "x", value: 2 }, Operation::Read { key: "x", ret: Some(1) }]),
    ]);
    let spec = RWMemorySpecification::<&str, i32>::new();
    assert!(check_cc(&h, &spec));
    assert!(check_cm(&h, &spec));
    assert!(!check_ccv(&h, &spec));
    assert_eq!(find_cc_bad_pattern(&h), Ok(None));
}

/// Hb: a:[wr(z,1),wr(x,1),wr(y,1)], b:[wr(x,2),rd(z,⊥),rd(y,1),rd(x,2)].
#[test]
fn hb_causal_and_convergent_but_not_memory() {
    let h = history(&[
        (
            "a",
            vec![
                Operation::Write { key: "z", value: 1 },
                Operation::Write { key: "x", value: 1 },
                Operation::Write { key: "y", value: 1 },
            ],
        ),
        (
            "b",
            vec![
                Operation::Write { key: "x", value: 2 },
                Operation::Read { key: "z", ret: None },
                Operation::Read { key: "y", ret: Some(1) },
                Operation::Read { key: "x", ret: Some(2) },
            ],
        ),
    ]);
    let spec = RWMemorySpecification::<&str, i32>::new();
    assert!(check_cc(&h, &spec));
    assert!(!check_cm(&h, &spec));
    assert!(check_ccv(&h, &spec));
}

/// Hc: a:[wr(x,1)], b:[wr(x,2), rd(x,1), rd(x,2)].
#[test]
fn hc_causal_but_not_memory_or_convergent() {
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

/// Hd: two symmetric processes each write x, read y=⊥, write y, read
/// x=own-value. Every criterion should admit it.
#[test]
fn hd_satisfies_every_criterion() {
    let h = history(&[
        (
            "a",
            vec![
                Operation::Write { key: "x", value: 1 },
                Operation::Read { key: "y", ret: None },
                Operation::Write { key: "y", value: 1 },
                Operation::Read { key: "x", ret: Some(1) },
            ],
        ),
        (
            "b",
            vec![
                Operation::Write { key: "x", value: 2 },
                Operation::Read { key: "y", ret: None },
                Operation::Write { key: "y", value: 2 },
                Operation::Read { key: "x", ret: Some(2) },
            ],
        ),
    ]);
    let spec = RWMemorySpecification::<&str, i32>::new();
    assert!(check_cc(&h, &spec));
    assert!(check_cm(&h, &spec));
    assert!(check_ccv(&h, &spec));
}

/// He: a:[wr(x,1),wr(y,1)], b:[rd(y,1),wr(x,2)], c:[rd(x,2),rd(x,1)].
/// An overwrite falls causally between a write and a read of its value.
#[test]
fn he_fails_every_criterion_with_write_co_read() {
    let h = history(&[
        ("a", vec![Operation::Write { key: "x", value: 1 }, Operation::Write { key: "y", value: 1 }]),
        ("b", vec![Operation::Read { key: "y", ret: Some(1) }, Operation::Write { key: "x", value: 2 }]),
        ("c", vec![Operation::Read { key: "x", ret: Some(2) }, Operation::Read { key: "x", ret: Some(1) }]),
    ]);
    let spec = RWMemorySpecification::<&str, i32>::new();
    assert!(!check_cc(&h, &spec));
    assert!(!check_cm(&h, &spec));
    assert!(!check_ccv(&h, &spec));
    assert_eq!(find_cc_bad_pattern(&h), Ok(Some(BadPattern::WriteCoRead)));
}

/// a:[wr(x,1),rd(x,2)], b:[wr(x,2),rd(y,1)]: a reads 2 from nowhere.
#[test]
fn thin_air_read_is_flagged() {
    let h = history(&[
        ("a", vec![Operation::Write { key: "x", value: 1 }, Operation::Read { key: "x", ret: Some(2) }]),
        ("b", vec![Operation::Write { key: "x", value: 2 }, Operation::Read { key: "y", ret: Some(1) }]),
    ]);
    assert_eq!(find_cc_bad_pattern(&h), Ok(Some(BadPattern::ThinAirRead)));
}

/// a:[rd(x,1),wr(x,1)], b:[wr(x,2),rd(x,2)]: the write-read edges close a
/// cycle with program order.
#[test]
fn cyclic_co_is_flagged() {
    let h = history(&[
        ("a", vec![Operation::Read { key: "x", ret: Some(1) }, Operation::Write { key: "x", value: 1 }]),
        ("b", vec![Operation::Write { key: "x", value: 2 }, Operation::Read { key: "x", ret: Some(2) }]),
    ]);
    assert_eq!(find_cc_bad_pattern(&h), Ok(Some(BadPattern::CyclicCo)));
}

#[test]
fn two_elements_have_three_refinements() {
    let p: Poset<&str> = Poset::new(["a", "b"]);
    assert_eq!(p.refinements().len(), 3);
}

#[test]
fn three_elements_have_nineteen_refinements() {
    let p: Poset<&str> = Poset::new(["a", "b", "c"]);
    assert_eq!(p.refinements().len(), 19);
}

#[test]
fn preordered_four_elements_have_ten_refinements() {
    let mut p: Poset<&str> = Poset::new(["a1", "b1", "b2", "b3"]);
    p.link(&"b1", &"b2");
    p.link(&"b2", &"b3");
    assert_eq!(p.refinements().len(), 10);
}
