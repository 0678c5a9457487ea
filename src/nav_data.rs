//! # Navigation Data Loading and Product Emission
//!
//! Thin file I/O around the segmentation engine. Converting raw glider binaries,
//! downloading them and writing NetCDF are handled elsewhere; this module only
//! reads the already-decoded depth channel of a deployment and writes the
//! segmentation next to it.
//!
//! ## Input Formats
//!
//! ### JSON
//! A serialized [`NavSeries`]:
//! ```json
//! {"deployment": "sdeep00", "samples": [{"time": "2024-06-16T12:00:00Z", "depth": 0.4},
//!                                        {"time": "2024-06-16T12:00:10Z", "depth": null}]}
//! ```
//!
//! ### Text / CSV
//! One sample per line, either `depth` or `time,depth` with RFC 3339 timestamps.
//! Blank fields, `NaN`, `-` and `null` are missing samples. Lines starting with
//! `#` and a `time,depth` header are skipped.
//!
//! ## Output Format
//!
//! A JSON document holding the input channel, `profile_index`, `profile_direction`
//! (`NaN` written as `null`) and a summary of the accepted casts.

use crate::profiles::{Cast, Segmentation};
use crate::{NavSample, NavSeries};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{fs, io, path::Path};
use thiserror::Error;

/// Errors that can occur while reading a series or writing a product.
#[derive(Error, Debug)]
pub enum NavDataError {
    /// File operations failed (missing file, permissions, disk space)
    #[error("nav data IO: {0}")]
    Io(#[from] io::Error),

    /// JSON document could not be decoded or encoded
    #[error("nav data JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A text line could not be parsed
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// No samples at all
    #[error("series contains no samples")]
    Empty,
}

/// Load a deployment's navigation series, picking the format from the file extension.
///
/// `.json` files are decoded as [`NavSeries`]; anything else is read as text.
/// For text input the deployment name is the file stem.
pub fn load_series<P: AsRef<Path>>(path: P) -> Result<NavSeries, NavDataError> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let series = if is_json {
        serde_json::from_slice::<NavSeries>(&fs::read(path)?)?
    } else {
        let deployment = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        parse_text(&fs::read_to_string(path)?, deployment)?
    };

    if series.samples.is_empty() {
        return Err(NavDataError::Empty);
    }
    log::info!(
        "Loaded {} samples ({} valid) for deployment {:?}",
        series.samples.len(),
        series.valid_count(),
        series.deployment
    );
    Ok(series)
}

/// Parse the text format described in the module documentation.
pub fn parse_text(contents: &str, deployment: String) -> Result<NavSeries, NavDataError> {
    let mut samples = Vec::new();

    for (number, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.starts_with('#') || is_header(line) {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let sample = match fields.as_slice() {
            [depth] => NavSample {
                time: None,
                depth: parse_depth(depth, number + 1)?,
            },
            [time, depth] => NavSample {
                time: parse_time(time, number + 1)?,
                depth: parse_depth(depth, number + 1)?,
            },
            _ => {
                return Err(NavDataError::Parse {
                    line: number + 1,
                    reason: format!("expected 1 or 2 fields, got {}", fields.len()),
                })
            }
        };
        samples.push(sample);
    }

    Ok(NavSeries {
        deployment,
        samples,
    })
}

fn is_header(line: &str) -> bool {
    line.split(',')
        .map(str::trim)
        .all(|field| field.eq_ignore_ascii_case("time") || field.eq_ignore_ascii_case("depth"))
        && !line.is_empty()
}

fn is_missing(field: &str) -> bool {
    field.is_empty()
        || field == "-"
        || field.eq_ignore_ascii_case("nan")
        || field.eq_ignore_ascii_case("null")
}

fn parse_depth(field: &str, line: usize) -> Result<Option<f64>, NavDataError> {
    if is_missing(field) {
        return Ok(None);
    }
    let value: f64 = field.parse().map_err(|_| NavDataError::Parse {
        line,
        reason: format!("invalid depth {field:?}"),
    })?;
    Ok(value.is_finite().then_some(value))
}

fn parse_time(field: &str, line: usize) -> Result<Option<DateTime<Utc>>, NavDataError> {
    if is_missing(field) {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(field)
        .map(|time| Some(time.with_timezone(&Utc)))
        .map_err(|e| NavDataError::Parse {
            line,
            reason: format!("invalid timestamp {field:?}: {e}"),
        })
}

/// Serialized form of a segmented series.
#[derive(Debug, Serialize)]
struct SegmentationProduct<'a> {
    deployment: &'a str,
    time: Vec<Option<DateTime<Utc>>>,
    depth: Vec<Option<f64>>,
    profile_index: Vec<Option<f64>>,
    profile_direction: Vec<Option<f64>>,
    casts: &'a [Cast],
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Render the product document for a segmented series.
pub fn product_json(
    series: &NavSeries,
    segmentation: &Segmentation,
) -> Result<String, NavDataError> {
    let product = SegmentationProduct {
        deployment: &series.deployment,
        time: series.samples.iter().map(|s| s.time).collect(),
        depth: series.samples.iter().map(|s| s.depth).collect(),
        profile_index: segmentation.profile_index.iter().copied().map(finite).collect(),
        profile_direction: segmentation
            .profile_direction
            .iter()
            .copied()
            .map(finite)
            .collect(),
        casts: &segmentation.casts,
    };
    Ok(serde_json::to_string_pretty(&product)?)
}

/// Write the product document for a segmented series.
pub fn save_segmentation<P: AsRef<Path>>(
    path: P,
    series: &NavSeries,
    segmentation: &Segmentation,
) -> Result<(), NavDataError> {
    let document = product_json(series, segmentation)?;
    fs::write(&path, document)?;
    log::info!(
        "Wrote {} casts to {}",
        segmentation.cast_count(),
        path.as_ref().display()
    );
    Ok(())
}
