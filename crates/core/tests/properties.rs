//! Property-style coverage over randomly generated differentiated
//! histories, on top of the worked examples in `scenarios.rs`.

use cocausal_core::history::spec::RWMemorySpecification;
use cocausal_core::{check_cc, check_ccv, check_cm, find_cc_bad_pattern, History};
use cocausal_testgen::generate_single_history;

const TRIALS: usize = 30;

#[test]
fn monotonicity_holds_over_generated_histories() {
    let spec = RWMemorySpecification::<u64, u64>::new();
    for _ in 0..TRIALS {
        let data = generate_single_history(3, 3, 5);
        let h = History::from_processes(&data);

        let ccv = check_ccv(&h, &spec);
        let cm = check_cm(&h, &spec);
        let cc = check_cc(&h, &spec);

        assert!(!ccv || cm, "check_ccv held but check_cm did not for {h:?}");
        assert!(!cm || cc, "check_cm held but check_cc did not for {h:?}");
    }
}

#[test]
fn clean_bad_pattern_is_necessary_for_causal_consistency() {
    let spec = RWMemorySpecification::<u64, u64>::new();
    for _ in 0..TRIALS {
        let data = generate_single_history(3, 3, 5);
        let h = History::from_processes(&data);

        if check_cc(&h, &spec) {
            assert_eq!(
                find_cc_bad_pattern(&h),
                Ok(None),
                "check_cc was satisfied but a bad pattern was reported for {h:?}"
            );
        }
    }
}

#[test]
fn checkers_are_idempotent() {
    let spec = RWMemorySpecification::<u64, u64>::new();
    for _ in 0..TRIALS {
        let data = generate_single_history(3, 3, 5);
        let h = History::from_processes(&data);
        assert_eq!(check_cc(&h, &spec), check_cc(&h, &spec));
        assert_eq!(check_cm(&h, &spec), check_cm(&h, &spec));
        assert_eq!(check_ccv(&h, &spec), check_ccv(&h, &spec));
    }
}
