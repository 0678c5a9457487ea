use glider_profiles_lib::{find_profiles, Direction, SegmentOptions};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

const MIN_PROPTEST_CASES: u32 = 512;

fn proptest_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(|parsed| parsed.max(MIN_PROPTEST_CASES))
        .unwrap_or(MIN_PROPTEST_CASES)
}

/// Coarse integer depths so flats and repeated turning points show up often.
fn depth_series() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(
        prop::option::weighted(0.85, (0i32..12).prop_map(f64::from)),
        0..120,
    )
    .prop_map(|samples| {
        samples
            .into_iter()
            .map(|d| d.unwrap_or(f64::NAN))
            .collect()
    })
}

fn segment_options() -> impl Strategy<Value = SegmentOptions> {
    (0u8..8, any::<bool>()).prop_map(|(range, join)| SegmentOptions {
        range: f64::from(range) * 0.5,
        join,
    })
}

/// Number of sign reversals among the nonzero forward differences of the valid samples.
fn reversal_count(depth: &[f64]) -> usize {
    let valid: Vec<f64> = depth.iter().copied().filter(|d| d.is_finite()).collect();
    let signs: Vec<f64> = valid
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .filter(|delta| *delta != 0.0)
        .map(f64::signum)
        .collect();
    signs.windows(2).filter(|pair| pair[0] != pair[1]).count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(proptest_cases()))]

    #[test]
    fn outputs_align_with_input(depth in depth_series(), options in segment_options()) {
        let seg = find_profiles(&depth, &options);
        prop_assert_eq!(seg.profile_index.len(), depth.len());
        prop_assert_eq!(seg.profile_direction.len(), depth.len());
    }

    #[test]
    fn profile_index_is_monotonic_half_integer(depth in depth_series(), options in segment_options()) {
        let seg = find_profiles(&depth, &options);
        let valid = depth.iter().filter(|d| d.is_finite()).count();

        if valid < 2 {
            prop_assert!(seg.profile_index.iter().all(|v| v.is_nan()));
            prop_assert!(seg.casts.is_empty());
            return Ok(());
        }

        for value in &seg.profile_index {
            prop_assert!(*value >= 0.5, "index {} below 0.5", value);
            prop_assert_eq!((value * 2.0).fract(), 0.0, "index {} not a half-integer", value);
        }
        for pair in seg.profile_index.windows(2) {
            prop_assert!(pair[0] <= pair[1], "index decreases: {:?}", pair);
        }
        for direction in seg.directions() {
            prop_assert!(direction.is_some());
        }
    }

    #[test]
    fn integer_labels_match_casts(depth in depth_series(), options in segment_options()) {
        let seg = find_profiles(&depth, &options);
        let mut labels: Vec<u32> = seg
            .profile_index
            .iter()
            .filter(|v| v.fract() == 0.0)
            .map(|v| *v as u32)
            .collect();
        labels.dedup();

        let numbers: Vec<u32> = seg.casts.iter().map(|cast| cast.number).collect();
        prop_assert_eq!(labels, numbers);

        for cast in &seg.casts {
            prop_assert!(cast.excursion.abs() >= options.range);
            prop_assert!(cast.excursion != 0.0);
            prop_assert!(seg.profile_index[cast.span.clone()]
                .iter()
                .all(|v| *v == f64::from(cast.number)));
        }
    }

    #[test]
    fn zero_range_gives_one_cast_per_run(depth in depth_series()) {
        let reversals = reversal_count(&depth);
        prop_assume!(reversals > 0);

        let seg = find_profiles(&depth, &SegmentOptions::default());
        prop_assert_eq!(seg.cast_count(), reversals + 1);
    }

    #[test]
    fn joined_casts_alternate_direction(depth in depth_series(), range in 0u8..8) {
        let options = SegmentOptions { range: f64::from(range) * 0.5, join: true };
        let seg = find_profiles(&depth, &options);
        for pair in seg.casts.windows(2) {
            prop_assert_ne!(pair[0].direction, pair[1].direction);
        }
        for cast in &seg.casts {
            prop_assert_ne!(cast.direction, Direction::Flat);
        }
    }

    #[test]
    fn direction_is_independent_of_options(depth in depth_series(), options in segment_options()) {
        let plain = find_profiles(&depth, &SegmentOptions::default());
        let configured = find_profiles(&depth, &options);
        let same = plain
            .profile_direction
            .iter()
            .zip(&configured.profile_direction)
            .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()));
        prop_assert!(same);
    }
}
