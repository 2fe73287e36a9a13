// ABOUTME: Property tests for the traffic weight plan.
// ABOUTME: Every plan ends fully on green, sums to 100 per step, and never moves backwards.

use proptest::prelude::*;
use weir::deploy::{TrafficWeightPlan, WeightSplit};

proptest! {
    #[test]
    fn last_step_is_all_green(steps in 1u32..=10_000) {
        let plan = TrafficWeightPlan::new(steps).unwrap();
        let last = plan.iter().last().map(|(_, split)| split);
        prop_assert_eq!(last, Some(WeightSplit::ALL_GREEN));
    }

    #[test]
    fn every_step_sums_to_100(steps in 1u32..=2_000) {
        let plan = TrafficWeightPlan::new(steps).unwrap();
        for (_, split) in plan.iter() {
            prop_assert_eq!(u32::from(split.green) + u32::from(split.blue), 100);
        }
    }

    #[test]
    fn green_never_decreases(steps in 1u32..=2_000) {
        let plan = TrafficWeightPlan::new(steps).unwrap();
        let greens: Vec<u8> = plan.iter().map(|(_, split)| split.green).collect();
        prop_assert_eq!(greens.len(), steps as usize);
        prop_assert!(greens.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn weights_use_floor_division(
        (steps, step) in (1u32..=500).prop_flat_map(|steps| (Just(steps), 1..=steps))
    ) {
        let plan = TrafficWeightPlan::new(steps).unwrap();
        let expected = (u64::from(step) * 100 / u64::from(steps)) as u8;
        prop_assert_eq!(plan.split_at(step).green, expected);
    }
}

#[test]
fn known_sequences() {
    let greens = |steps| -> Vec<u8> {
        TrafficWeightPlan::new(steps)
            .unwrap()
            .iter()
            .map(|(_, split)| split.green)
            .collect()
    };
    assert_eq!(greens(10), vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
    assert_eq!(greens(3), vec![33, 66, 100]);
    assert_eq!(greens(7), vec![14, 28, 42, 57, 71, 85, 100]);
}
