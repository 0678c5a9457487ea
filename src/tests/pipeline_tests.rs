//! # End-to-End Tests for the Segmentation Pipeline
//!
//! These tests drive the same path as the binary: options from configuration and
//! command line, a navigation series (synthetic or from disk), segmentation and
//! product emission.

use std::fs;
use std::thread;
use tempfile::Builder;

use glider_profiles_lib::{
    config::Config,
    find_profiles, nav_data,
    synthetic::{yo_yo, YoYo},
    Direction, NavSample, NavSeries, OptionError, SegmentOptions,
};

use crate::{parse_args, segment_options, Args};

fn args(list: &[&str]) -> anyhow::Result<Args> {
    parse_args(list.iter().map(|s| s.to_string()))
}

fn clean_yo_yo() -> Vec<f64> {
    yo_yo(None, &YoYo::default()).depths()
}

/// A clean yo-yo splits into one cast per leg, with dwell absorbed by the leg before it.
#[test]
fn yo_yo_casts_follow_legs() {
    let depth = clean_yo_yo();
    let seg = find_profiles(&depth, &SegmentOptions::default());

    assert_eq!(seg.cast_count(), 6);
    assert_eq!(&seg.profile_index[..4], &[0.5, 0.5, 0.5, 1.0]);
    assert_eq!(seg.profile_samples(1), Some(3..35));
    assert_eq!(seg.profile_samples(6), Some(163..193));

    for (cast, expected) in seg
        .casts
        .iter()
        .zip([Direction::Down, Direction::Up].into_iter().cycle())
    {
        assert_eq!(cast.direction, expected, "cast {}", cast.number);
        assert!((cast.excursion.abs() - 200.0).abs() < 1e-9);
    }
}

/// A small inversion inside a dive is split off at range 0, filtered with a range,
/// and fully healed when joining.
#[test]
fn range_and_join_heal_a_wiggle() {
    let clean = clean_yo_yo();
    let mut noisy = clean.clone();
    noisy[11] = 45.0;

    let raw = find_profiles(&noisy, &SegmentOptions::default());
    assert_eq!(raw.cast_count(), 8);

    let filtered = find_profiles(&noisy, &SegmentOptions::new(10.0, false).unwrap());
    assert_eq!(filtered.cast_count(), 7);
    assert_eq!(filtered.profile_index[11], 1.5);

    let joined = find_profiles(&noisy, &SegmentOptions::new(10.0, true).unwrap());
    let reference = find_profiles(&clean, &SegmentOptions::default());
    assert_eq!(joined.profile_index, reference.profile_index);
    assert_eq!(joined.cast_count(), 6);
}

/// Dropouts never change the cast count of a yo-yo and are labelled like the sample before them.
#[test]
fn dropouts_are_back_filled() {
    let mut depth = clean_yo_yo();
    for index in (5..depth.len()).step_by(7) {
        depth[index] = f64::NAN;
    }
    let seg = find_profiles(&depth, &SegmentOptions::default());

    assert_eq!(seg.cast_count(), 6);
    for (index, value) in depth.iter().enumerate().skip(1) {
        if value.is_nan() {
            assert_eq!(seg.profile_index[index], seg.profile_index[index - 1]);
            assert_eq!(seg.profile_direction[index], seg.profile_direction[index - 1]);
        }
    }
}

/// Independent deployments can be segmented in parallel without coordination.
#[test]
fn concurrent_segmentation_matches_sequential() {
    let series: Vec<Vec<f64>> = (1..=4)
        .map(|casts| {
            let shape = YoYo {
                casts,
                ..YoYo::default()
            };
            yo_yo(None, &shape).depths()
        })
        .collect();
    let options = SegmentOptions::new(5.0, true).unwrap();

    let sequential: Vec<_> = series.iter().map(|d| find_profiles(d, &options)).collect();
    let parallel: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = series
            .iter()
            .map(|d| scope.spawn(move || find_profiles(d, &options)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, parallel);
    for (casts, seg) in (1..=4).zip(&parallel) {
        assert_eq!(seg.cast_count(), casts);
    }
}

/// Text input through to the JSON product.
#[test]
fn text_file_to_product() {
    let input = Builder::new().suffix(".csv").tempfile().unwrap();
    fs::write(input.path(), "depth\n0\n3\nnan\n9\n4\n1\n").unwrap();

    let series = nav_data::load_series(input.path()).unwrap();
    let seg = find_profiles(&series.depths(), &SegmentOptions::new(2.0, false).unwrap());

    let output = Builder::new().suffix(".json").tempfile().unwrap();
    nav_data::save_segmentation(output.path(), &series, &seg).unwrap();

    let doc: serde_json::Value = serde_json::from_slice(&fs::read(output.path()).unwrap()).unwrap();
    assert_eq!(
        doc["profile_index"],
        serde_json::json!([0.5, 1.0, 1.0, 1.0, 2.0, 2.0])
    );
    assert_eq!(doc["casts"].as_array().unwrap().len(), 2);
}

/// Samples without timestamps are serialized with a null time.
#[test]
fn series_without_times_roundtrips() {
    let series = NavSeries {
        deployment: "bare".to_string(),
        samples: vec![
            NavSample {
                time: None,
                depth: Some(1.0),
            },
            NavSample {
                time: None,
                depth: None,
            },
        ],
    };
    let json = serde_json::to_string(&series).unwrap();
    let parsed: NavSeries = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, series);
}

#[test]
fn parse_args_reads_flags() {
    let parsed = args(&["nav.csv", "--range", "5", "--join", "--ascii"]).unwrap();
    assert_eq!(parsed.input.as_deref(), Some(std::path::Path::new("nav.csv")));
    assert_eq!(parsed.range.as_deref(), Some("5"));
    assert!(parsed.join);
    assert!(parsed.ascii);
    assert!(!parsed.demo);
}

#[test]
fn parse_args_rejects_misuse() {
    assert!(args(&[]).is_err());
    assert!(args(&["a.csv", "b.csv"]).is_err());
    assert!(args(&["a.csv", "--range"]).is_err());
    assert!(args(&["a.csv", "--window", "3"]).is_err());
    assert!(args(&["--demo"]).is_ok());
}

#[test]
fn command_line_overrides_config() {
    let config = Config::from_toml_str("[segmentation]\nrange = 10\n").unwrap();

    let options = segment_options(&config, &args(&["--demo"]).unwrap()).unwrap();
    assert_eq!(options, SegmentOptions::new(10.0, false).unwrap());

    let options = segment_options(&config, &args(&["--demo", "--range", "2", "--join"]).unwrap())
        .unwrap();
    assert_eq!(options, SegmentOptions::new(2.0, true).unwrap());
}

#[test]
fn negative_range_on_command_line_is_rejected() {
    let err = segment_options(&Config::default(), &args(&["--demo", "--range", "-3"]).unwrap())
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<OptionError>(),
        Some(OptionError::InvalidValue { .. })
    ));
}
