//! Reference range evaluation
//!
//! Reference ranges are stored as `"<min>-<max>"` text. Parse failures are
//! surfaced as [`RangeParseError`] by [`evaluate`], but [`is_out_of_range`]
//! collapses them to `false` so a garbled value never raises an alarm.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RangeParseError {
    #[error("reference range '{0}' is not of the form <min>-<max>")]
    MissingSeparator(String),

    #[error("invalid range bound '{0}'")]
    InvalidBound(String),

    #[error("test value '{0}' is not numeric")]
    InvalidValue(String),
}

/// Closed interval `[min, max]`; an inverted pair flags every value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceRange {
    pub min: f64,
    pub max: f64,
}

impl ReferenceRange {
    /// Parse `"<min>-<max>"`, splitting on the first `-`
    pub fn parse(range: &str) -> Result<Self, RangeParseError> {
        let (min, max) = range
            .split_once('-')
            .ok_or_else(|| RangeParseError::MissingSeparator(range.to_string()))?;

        Ok(Self {
            min: parse_bound(min)?,
            max: parse_bound(max)?,
        })
    }

    /// Boundary-inclusive
    pub fn contains(&self, value: f64) -> bool {
        !(value < self.min || value > self.max)
    }
}

fn parse_bound(s: &str) -> Result<f64, RangeParseError> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| RangeParseError::InvalidBound(s.to_string()))
}

/// Parse a captured test value as a decimal number
pub fn parse_value(value: &str) -> Result<f64, RangeParseError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| RangeParseError::InvalidValue(value.to_string()))
}

/// Evaluate a value against a reference range, keeping parse failures visible
pub fn evaluate(value: &str, reference_range: &str) -> Result<bool, RangeParseError> {
    let range = ReferenceRange::parse(reference_range)?;
    let value = parse_value(value)?;
    Ok(!range.contains(value))
}

/// True iff `value` lies strictly outside `reference_range`.
///
/// Unparseable values or ranges are treated as within range.
pub fn is_out_of_range(value: &str, reference_range: &str) -> bool {
    match evaluate(value, reference_range) {
        Ok(out_of_range) => out_of_range,
        Err(e) => {
            tracing::debug!("Range check skipped: {}", e);
            false
        }
    }
}
