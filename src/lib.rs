//! # Glider Profiles Core Library
//!
//! This library splits the depth (or pressure) record of an underwater glider
//! deployment into individual casts: the diving and climbing legs of the
//! vehicle's sawtooth trajectory. Every later processing stage works "per
//! profile" (sensor-lag and thermal-lag corrections, per-cast interpolation,
//! vertical gridding), so the segmentation here is the backbone of the whole
//! processing chain.
//!
//! ## Design Philosophy
//!
//! ### Pure Segmentation
//! - **No state**: [`find_profiles`] is a plain function from a depth slice and a
//!   set of [`SegmentOptions`] to a [`Segmentation`]; it holds no caches and does no I/O
//! - **Never fails on data**: empty series, all-missing series and series without
//!   a single turning point produce well-defined "no casts" outputs
//! - **Fails early on misuse**: bad option keys or values are rejected when the
//!   options are built, see [`options`]
//!
//! ### Output Contract
//! For an input of length `n` the engine always returns two sequences of length `n`:
//! - **profile_index**: `1, 2, 3, …` inside casts and `k + 0.5` in the transitions
//!   between cast `k` and cast `k + 1` (`0.5` before the first cast)
//! - **profile_direction**: `+1` descending, `-1` ascending, `0` flat
//!
//! ### Data Flow
//! 1. **Load**: read a deployment's navigation series ([`nav_data`]) or synthesise one ([`synthetic`])
//! 2. **Segment**: [`find_profiles`] with options from the pipeline [`config`]
//! 3. **Emit**: persist `profile_index`/`profile_direction` next to the depth record
//!
//! ## Core Types
//!
//! - [`NavSample`]: a single depth observation, possibly missing
//! - [`NavSeries`]: the navigation record of one deployment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Module declarations
pub mod config;
pub mod nav_data;
pub mod options;
pub mod profiles;
pub mod renderer;
pub mod synthetic;

pub use options::{OptionError, OptionValue, SegmentOptions};
pub use profiles::{find_profiles, find_profiles_opt, Cast, Direction, Segmentation};

/// A single navigation sample of a glider deployment.
///
/// `depth` is `None` when the sensor reported nothing usable for this
/// timestamp. Missing samples are kept in place: the segmentation output is
/// aligned sample-for-sample with the input series.
///
/// # Example
/// ```
/// use glider_profiles_lib::NavSample;
///
/// let surfaced = NavSample { time: None, depth: Some(0.4) };
/// let dropout = NavSample { time: None, depth: None };
/// assert!(dropout.depth.is_none());
/// assert_eq!(surfaced.depth, Some(0.4));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavSample {
    /// Sample timestamp, when the source provides one
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
    /// Depth in metres (or pressure in dbar), `None` when missing
    pub depth: Option<f64>,
}

/// Navigation record of one deployment.
///
/// # Example
/// ```
/// use glider_profiles_lib::{NavSample, NavSeries};
///
/// let series = NavSeries {
///     deployment: "ideep00_ime_sldeep000".to_string(),
///     samples: vec![
///         NavSample { time: None, depth: Some(1.0) },
///         NavSample { time: None, depth: None },
///         NavSample { time: None, depth: Some(3.0) },
///     ],
/// };
///
/// let depths = series.depths();
/// assert_eq!(depths.len(), 3);
/// assert!(depths[1].is_nan());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NavSeries {
    /// Deployment name, carried through to the emitted product
    #[serde(default)]
    pub deployment: String,
    /// Samples in acquisition order
    pub samples: Vec<NavSample>,
}

impl NavSeries {
    /// Depth channel with missing values mapped to `NaN`.
    pub fn depths(&self) -> Vec<f64> {
        self.samples
            .iter()
            .map(|sample| sample.depth.unwrap_or(f64::NAN))
            .collect()
    }

    /// Number of samples carrying a finite depth.
    pub fn valid_count(&self) -> usize {
        self.samples
            .iter()
            .filter(|sample| sample.depth.is_some_and(f64::is_finite))
            .count()
    }
}
