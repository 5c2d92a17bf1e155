//! Property tests for amount arithmetic.

use ledgerflow_types::Amount;
use proptest::prelude::*;

proptest! {
    #[test]
    fn add_then_sub_is_identity(a in any::<u64>(), b in any::<u64>()) {
        let a = Amount::from(a);
        let b = Amount::from(b);
        let sum = a.checked_add(b).unwrap();
        prop_assert_eq!(sum.checked_sub(b), Some(a));
    }

    #[test]
    fn percent_of_never_exceeds_whole(v in any::<u64>(), pct in 0u8..=100) {
        let v = Amount::from(v);
        let part = v.percent_of(pct).unwrap();
        prop_assert!(part <= v);
    }

    #[test]
    fn percent_of_matches_cross_multiplication(v in any::<u64>(), pct in 0u8..=100) {
        let whole = u128::from(v);
        let part = Amount::from(v).percent_of(pct).unwrap().get();
        prop_assert!(part * 100 <= whole * u128::from(pct));
        prop_assert!((part + 1) * 100 > whole * u128::from(pct));
    }

    #[test]
    fn percent_of_ceil_is_smallest_reaching_share(v in any::<u64>(), pct in 0u8..=100) {
        let whole = u128::from(v);
        let needed = Amount::from(v).percent_of_ceil(pct).unwrap().get();
        prop_assert!(needed * 100 >= whole * u128::from(pct));
        prop_assert!(needed == 0 || (needed - 1) * 100 < whole * u128::from(pct));
    }

    #[test]
    fn percent_of_full_range_never_overflows(v in any::<u128>(), pct in 0u8..=100) {
        let v = Amount::new(v);
        let floor = v.percent_of(pct).unwrap();
        let ceil = v.percent_of_ceil(pct).unwrap();
        prop_assert!(ceil <= v);
        prop_assert!(ceil.get() - floor.get() <= 1);
    }
}
