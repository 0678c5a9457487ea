//! # Cast Segmentation
//!
//! Splits a glider depth (or pressure) series into casts: maximal monotonic
//! runs of the vertical trajectory, delimited by the turning points at the
//! surface and at apogee.
//!
//! ## Algorithm
//!
//! All work is done on the subsequence of valid (finite) samples:
//!
//! 1. **Signs**: sign of the forward difference between consecutive valid samples
//! 2. **Turning points**: positions where the nonzero sign flips; flat gaps are
//!    skipped without forgetting the previous sign, so a flat run is absorbed
//!    into the run before it
//! 3. **Candidate casts**: pairs of consecutive boundaries, where the boundaries
//!    are the start of the first nonzero gap, every turning point and the last
//!    valid sample
//! 4. **Range filter**: a candidate is accepted when its net excursion is
//!    nonzero and at least `range`
//! 5. **Join**: accepted casts of equal direction that end up adjacent (only
//!    rejected candidates between them) are merged
//! 6. **Labels**: cast `k` covers the samples after its start boundary up to
//!    and including its end boundary; everything else gets the half-integer
//!    of the surrounding transition
//!
//! Labels and directions computed on valid samples are finally forward-filled
//! over missing samples. The whole computation is linear in the input length.
//!
//! ## Example
//! ```
//! use glider_profiles_lib::{find_profiles, SegmentOptions};
//!
//! let depth = [0.0, 5.0, 10.0, 5.0, 0.0];
//! let segmentation = find_profiles(&depth, &SegmentOptions::default());
//!
//! assert_eq!(segmentation.profile_index, vec![0.5, 1.0, 1.0, 2.0, 2.0]);
//! assert_eq!(segmentation.profile_direction, vec![1.0, 1.0, -1.0, -1.0, -1.0]);
//! ```

use crate::options::SegmentOptions;
use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// Vertical direction of the vehicle at a sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Depth increasing (diving)
    Down,
    /// Depth decreasing (climbing)
    Up,
    /// No depth change
    Flat,
}

impl Direction {
    /// Direction of a depth change.
    pub fn from_sign(delta: f64) -> Self {
        if delta > 0.0 {
            Direction::Down
        } else if delta < 0.0 {
            Direction::Up
        } else {
            Direction::Flat
        }
    }

    /// Decode a `profile_direction` value; `NaN` and anything outside `{-1, 0, 1}` give `None`.
    pub fn from_value(value: f64) -> Option<Self> {
        if value == 1.0 {
            Some(Direction::Down)
        } else if value == -1.0 {
            Some(Direction::Up)
        } else if value == 0.0 {
            Some(Direction::Flat)
        } else {
            None
        }
    }

    /// Numeric encoding used in `profile_direction`.
    pub fn as_f64(self) -> f64 {
        match self {
            Direction::Down => 1.0,
            Direction::Up => -1.0,
            Direction::Flat => 0.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Direction::Down => "down",
            Direction::Up => "up",
            Direction::Flat => "flat",
        };
        f.write_str(label)
    }
}

/// An accepted cast, indices in the space of the original series.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Cast {
    /// Profile number, starting at 1
    pub number: u32,
    /// Turning point the cast leaves from; it belongs to the preceding transition
    pub start: usize,
    /// Last sample of the cast (inclusive)
    pub end: usize,
    pub direction: Direction,
    /// `depth[end] - depth[start]`
    pub excursion: f64,
    /// Samples carrying this cast's label, missing samples included
    pub span: Range<usize>,
}

/// Result of [`find_profiles`].
///
/// `profile_index` and `profile_direction` are aligned with the input series.
/// Indeterminate entries (fewer than two valid samples) are `NaN`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Segmentation {
    pub profile_index: Vec<f64>,
    pub profile_direction: Vec<f64>,
    pub casts: Vec<Cast>,
}

impl Segmentation {
    fn indeterminate(len: usize) -> Self {
        Segmentation {
            profile_index: vec![f64::NAN; len],
            profile_direction: vec![f64::NAN; len],
            casts: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.profile_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profile_index.is_empty()
    }

    pub fn cast_count(&self) -> usize {
        self.casts.len()
    }

    /// Typed view of `profile_direction`.
    pub fn directions(&self) -> impl Iterator<Item = Option<Direction>> + '_ {
        self.profile_direction
            .iter()
            .map(|&value| Direction::from_value(value))
    }

    /// Sample range labelled with profile `number`, if such a cast exists.
    pub fn profile_samples(&self, number: u32) -> Option<Range<usize>> {
        self.casts
            .iter()
            .find(|cast| cast.number == number)
            .map(|cast| cast.span.clone())
    }
}

/// A cast between two boundaries, positions in the valid-sample subsequence.
#[derive(Clone, Copy, Debug)]
struct Candidate {
    start: usize,
    end: usize,
    excursion: f64,
}

impl Candidate {
    fn direction(&self) -> Direction {
        Direction::from_sign(self.excursion)
    }
}

/// Segment a depth series into casts.
///
/// Non-finite values are missing samples. `options` is assumed validated
/// (see [`SegmentOptions::validate`]); a negative range behaves like `0`.
pub fn find_profiles(depth: &[f64], options: &SegmentOptions) -> Segmentation {
    let valid: Vec<usize> = depth
        .iter()
        .enumerate()
        .filter(|(_, value)| value.is_finite())
        .map(|(index, _)| index)
        .collect();

    if valid.len() < 2 {
        log::debug!(
            "{} valid samples out of {}, no casts can be found",
            valid.len(),
            depth.len()
        );
        return Segmentation::indeterminate(depth.len());
    }

    let valid_depth: Vec<f64> = valid.iter().map(|&index| depth[index]).collect();
    let signs: Vec<i8> = valid_depth
        .windows(2)
        .map(|pair| sign(pair[1] - pair[0]))
        .collect();

    let boundaries = cast_boundaries(&signs);
    let candidates: Vec<Candidate> = boundaries
        .windows(2)
        .map(|pair| Candidate {
            start: pair[0],
            end: pair[1],
            excursion: valid_depth[pair[1]] - valid_depth[pair[0]],
        })
        .collect();
    let accepted = accept_casts(&candidates, &valid_depth, options);

    log::debug!(
        "{} candidate casts, {} accepted (range {}, join {})",
        candidates.len(),
        accepted.len(),
        options.range,
        options.join
    );

    let labels = label_samples(&accepted, valid.len());
    let directions = sample_directions(&signs);

    let casts = accepted
        .iter()
        .zip(1u32..)
        .map(|(candidate, number)| Cast {
            number,
            start: valid[candidate.start],
            end: valid[candidate.end],
            direction: candidate.direction(),
            excursion: candidate.excursion,
            span: valid[candidate.start + 1]
                ..valid.get(candidate.end + 1).copied().unwrap_or(depth.len()),
        })
        .collect();

    Segmentation {
        profile_index: forward_fill(&valid, &labels, depth.len()),
        profile_direction: forward_fill(&valid, &directions, depth.len()),
        casts,
    }
}

/// [`find_profiles`] over optional samples; `None` is a missing sample.
pub fn find_profiles_opt(depth: &[Option<f64>], options: &SegmentOptions) -> Segmentation {
    let depth: Vec<f64> = depth.iter().map(|d| d.unwrap_or(f64::NAN)).collect();
    find_profiles(&depth, options)
}

fn sign(delta: f64) -> i8 {
    if delta > 0.0 {
        1
    } else if delta < 0.0 {
        -1
    } else {
        0
    }
}

/// Boundary positions: start of the first nonzero gap, each turning point, last sample.
///
/// A turning point sits where a nonzero sign differs from the last nonzero
/// sign seen. Empty when every gap is flat.
fn cast_boundaries(signs: &[i8]) -> Vec<usize> {
    let mut boundaries = Vec::new();
    let mut previous = 0;
    for (position, &s) in signs.iter().enumerate() {
        if s != 0 && s != previous {
            boundaries.push(position);
            previous = s;
        }
    }
    if !boundaries.is_empty() {
        boundaries.push(signs.len());
    }
    boundaries
}

/// Range filter, then optional left-to-right join of same-direction casts.
fn accept_casts(
    candidates: &[Candidate],
    valid_depth: &[f64],
    options: &SegmentOptions,
) -> Vec<Candidate> {
    let mut accepted: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let magnitude = candidate.excursion.abs();
        if magnitude == 0.0 || magnitude < options.range {
            continue;
        }
        if options.join {
            if let Some(open) = accepted.last_mut() {
                if open.direction() == candidate.direction() {
                    open.end = candidate.end;
                    open.excursion = valid_depth[open.end] - valid_depth[open.start];
                    continue;
                }
            }
        }
        accepted.push(*candidate);
    }
    accepted
}

/// Labels on the valid subsequence: `k` inside cast `k`, `k + 0.5` after it.
fn label_samples(casts: &[Candidate], len: usize) -> Vec<f64> {
    let mut labels = Vec::with_capacity(len);
    let mut transition = 0.5;
    for (number, cast) in (1u32..).zip(casts) {
        let number = f64::from(number);
        labels.resize(cast.start + 1, transition);
        labels.resize(cast.end + 1, number);
        transition = number + 0.5;
    }
    labels.resize(len, transition);
    labels
}

/// Directions on the valid subsequence; flat gaps keep the last nonzero sign.
fn sample_directions(signs: &[i8]) -> Vec<f64> {
    let mut current = 0;
    let mut directions: Vec<f64> = signs
        .iter()
        .map(|&s| {
            if s != 0 {
                current = s;
            }
            f64::from(current)
        })
        .collect();
    // the last valid sample has no forward difference
    directions.push(f64::from(current));
    directions
}

/// Spread values known at `valid` positions over a series of length `len`.
///
/// Samples before the first valid one take its value; every other sample
/// takes the value of the nearest preceding valid sample.
fn forward_fill(valid: &[usize], values: &[f64], len: usize) -> Vec<f64> {
    let mut filled = Vec::with_capacity(len);
    if let Some(&first) = values.first() {
        filled.resize(valid[0], first);
    }
    for (k, &value) in values.iter().enumerate() {
        let next = valid.get(k + 1).copied().unwrap_or(len);
        filled.resize(next, value);
    }
    filled
}
