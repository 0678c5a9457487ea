//! # Synthetic Yo-Yo Series
//!
//! Deterministic glider-like depth series for demo mode and tests, used when no
//! deployment data is at hand.
//!
//! ## Model Characteristics
//!
//! A glider flies a sawtooth: it dives from near the surface to its apogee,
//! pumps oil, climbs back and repeats. The model reproduces that pattern:
//! - **Linear legs**: each cast moves between `min_depth` and `max_depth` in
//!   `samples_per_cast` equal steps
//! - **Turn-around dwell**: `dwell_samples` repeated depths at every turning
//!   point, the flat stretches the segmentation has to absorb
//! - **Fixed cadence**: one sample every 10 seconds, as in decimated navigation data
//!
//! The series starts at `min_depth`, so the first cast is always a dive.

use crate::{NavSample, NavSeries};
use chrono::{DateTime, Duration, Utc};

/// Sampling interval of the synthetic series
pub const SAMPLE_INTERVAL_SECS: i64 = 10;

/// Shape of a synthetic yo-yo.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YoYo {
    /// Number of casts (dives and climbs)
    pub casts: usize,
    /// Samples per cast, excluding dwell
    pub samples_per_cast: usize,
    /// Shallow turning depth in metres
    pub min_depth: f64,
    /// Deep turning depth in metres
    pub max_depth: f64,
    /// Repeated samples at every turning point
    pub dwell_samples: usize,
}

impl Default for YoYo {
    fn default() -> Self {
        YoYo {
            casts: 6,
            samples_per_cast: 30,
            min_depth: 0.0,
            max_depth: 200.0,
            dwell_samples: 2,
        }
    }
}

impl YoYo {
    /// Total number of samples the series will hold.
    pub fn sample_count(&self) -> usize {
        1 + self.casts * (self.dwell_samples + self.samples_per_cast)
    }
}

/// Generate a yo-yo series starting at `start`.
/// If `start` is `None`, fall back to `Utc::now()`.
pub fn yo_yo(start: Option<DateTime<Utc>>, shape: &YoYo) -> NavSeries {
    let start = start.unwrap_or_else(Utc::now);
    let mut depths = Vec::with_capacity(shape.sample_count());
    depths.push(shape.min_depth);

    for cast in 0..shape.casts {
        let (from, to) = if cast % 2 == 0 {
            (shape.min_depth, shape.max_depth)
        } else {
            (shape.max_depth, shape.min_depth)
        };
        depths.extend(std::iter::repeat(from).take(shape.dwell_samples));
        let steps = shape.samples_per_cast as f64;
        depths.extend((1..=shape.samples_per_cast).map(|k| from + (to - from) * k as f64 / steps));
    }

    let samples = depths
        .into_iter()
        .zip(0i64..)
        .map(|(depth, k)| NavSample {
            time: Some(start + Duration::seconds(k * SAMPLE_INTERVAL_SECS)),
            depth: Some(depth),
        })
        .collect();

    NavSeries {
        deployment: "synthetic".to_string(),
        samples,
    }
}
