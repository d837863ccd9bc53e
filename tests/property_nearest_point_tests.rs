use proptest::prelude::*;
use timechart_rs::core::{SearchSide, closest_index};

fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values
}

proptest! {
    #[test]
    fn nearest_index_has_minimal_distance(
        values in proptest::collection::vec(-1e6f64..1e6, 1..64),
        target in -2e6f64..2e6
    ) {
        let values = sorted(values);
        let index = closest_index(target, &values, None).expect("non-empty input");
        let best = values
            .iter()
            .map(|value| (value - target).abs())
            .fold(f64::INFINITY, f64::min);
        prop_assert!((values[index] - target).abs() <= best);
    }

    #[test]
    fn left_side_is_first_not_less(
        values in proptest::collection::vec(-1e3f64..1e3, 2..64),
        target in -2e3f64..2e3
    ) {
        let values = sorted(values);
        let index = closest_index(target, &values, Some(SearchSide::Left)).expect("non-empty input");
        prop_assert!(values[..index].iter().all(|value| *value < target));
        prop_assert!(index == values.len() - 1 || values[index] >= target);
    }

    #[test]
    fn right_side_is_first_greater(
        values in proptest::collection::vec(-1e3f64..1e3, 2..64),
        target in -2e3f64..2e3
    ) {
        let values = sorted(values);
        let index = closest_index(target, &values, Some(SearchSide::Right)).expect("non-empty input");
        prop_assert!(values[..index].iter().all(|value| *value <= target));
        prop_assert!(index == values.len() - 1 || values[index] > target);
    }
}
