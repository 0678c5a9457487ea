//! # Segmentation Options
//!
//! Options accepted by [`find_profiles`](crate::find_profiles) and the boundary
//! checks applied to them. Two options exist:
//!
//! - **range** (default `0`): minimum absolute depth excursion a monotonic run
//!   must span to count as a cast of its own
//! - **join** (default `false`): merge consecutive accepted casts of the same
//!   direction that are only separated by rejected (sub-range) runs
//!
//! Options may arrive as a record (a TOML table, or key/value pairs) or as a
//! flat key/value list such as `["range", 2.0, "join", true]`. Keys are matched
//! case-insensitively.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while building [`SegmentOptions`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptionError {
    /// The options argument is neither a key/value list nor a record
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// Unrecognized option key
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Known key with a value of the wrong type or out of bounds
    #[error("invalid value for option {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// A loosely typed option value, as found in flat argument lists or TOML tables.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    Number(f64),
    Bool(bool),
    Text(String),
    /// Any other value kind, identified by its type name
    Unsupported(&'static str),
}

impl OptionValue {
    fn as_number(&self) -> Option<f64> {
        match self {
            OptionValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Number(value) => write!(f, "{value}"),
            OptionValue::Bool(value) => write!(f, "{value}"),
            OptionValue::Text(value) => write!(f, "{value:?}"),
            OptionValue::Unsupported(kind) => write!(f, "<{kind}>"),
        }
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Number(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Number(value as f64)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<&toml::Value> for OptionValue {
    fn from(value: &toml::Value) -> Self {
        match value {
            toml::Value::Integer(i) => OptionValue::Number(*i as f64),
            toml::Value::Float(x) => OptionValue::Number(*x),
            toml::Value::Boolean(b) => OptionValue::Bool(*b),
            toml::Value::String(s) => OptionValue::Text(s.clone()),
            other => OptionValue::Unsupported(other.type_str()),
        }
    }
}

/// Options of the cast segmentation.
///
/// # Example
/// ```
/// use glider_profiles_lib::{OptionValue, SegmentOptions};
///
/// let options = SegmentOptions::from_flat(&[
///     OptionValue::from("range"),
///     OptionValue::from(10.0),
///     OptionValue::from("join"),
///     OptionValue::from(true),
/// ])
/// .unwrap();
///
/// assert_eq!(options, SegmentOptions { range: 10.0, join: true });
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SegmentOptions {
    /// Minimum depth excursion of a cast
    pub range: f64,
    /// Merge same-direction casts across rejected runs
    pub join: bool,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        SegmentOptions {
            range: 0.0,
            join: false,
        }
    }
}

impl SegmentOptions {
    /// Build validated options.
    pub fn new(range: f64, join: bool) -> Result<Self, OptionError> {
        let options = SegmentOptions { range, join };
        options.validate()?;
        Ok(options)
    }

    /// Check the bounds the engine relies on: `range` must be finite and non-negative.
    pub fn validate(&self) -> Result<(), OptionError> {
        if !self.range.is_finite() || self.range < 0.0 {
            return Err(OptionError::InvalidValue {
                key: "range".to_string(),
                reason: format!("expected a finite number >= 0, got {}", self.range),
            });
        }
        Ok(())
    }

    /// Build options from a record given as key/value pairs, starting from the defaults.
    pub fn from_pairs<K, I>(pairs: I) -> Result<Self, OptionError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, OptionValue)>,
    {
        let mut options = SegmentOptions::default();
        for (key, value) in pairs {
            options.set(key.as_ref(), value)?;
        }
        options.validate()?;
        Ok(options)
    }

    /// Build options from a flat `key, value, key, value, …` list.
    pub fn from_flat(args: &[OptionValue]) -> Result<Self, OptionError> {
        if args.len() % 2 != 0 {
            return Err(OptionError::InvalidOptions(format!(
                "expected key/value pairs, got {} arguments",
                args.len()
            )));
        }

        let pairs = args
            .chunks(2)
            .map(|pair| match &pair[0] {
                OptionValue::Text(key) => Ok((key.clone(), pair[1].clone())),
                other => Err(OptionError::InvalidOptions(format!(
                    "option keys must be text, got {other}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_pairs(pairs)
    }

    /// Build options from a TOML value: a table is read as a record, an array as a flat list.
    pub fn from_toml(value: &toml::Value) -> Result<Self, OptionError> {
        match value {
            toml::Value::Table(table) => {
                Self::from_pairs(table.iter().map(|(key, value)| (key, OptionValue::from(value))))
            }
            toml::Value::Array(items) => {
                let args: Vec<OptionValue> = items.iter().map(OptionValue::from).collect();
                Self::from_flat(&args)
            }
            other => Err(OptionError::InvalidOptions(format!(
                "expected a table or a key/value list, got {}",
                other.type_str()
            ))),
        }
    }

    fn set(&mut self, key: &str, value: OptionValue) -> Result<(), OptionError> {
        match key.to_ascii_lowercase().as_str() {
            "range" => {
                self.range = value.as_number().ok_or_else(|| OptionError::InvalidValue {
                    key: key.to_string(),
                    reason: format!("expected a number, got {value}"),
                })?;
            }
            "join" => {
                self.join = value.as_bool().ok_or_else(|| OptionError::InvalidValue {
                    key: key.to_string(),
                    reason: format!("expected a boolean, got {value}"),
                })?;
            }
            _ => return Err(OptionError::InvalidOption(key.to_string())),
        }
        Ok(())
    }
}
