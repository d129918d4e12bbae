//! Coordinate range and sanity predicates.
//!
//! Shared by the decode path (rejecting corrupt geotags) and the writer
//! (rejecting caller input before any encoding work). None of these panic
//! or allocate; `NaN` fails every range check.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Magnitude below which a decoded coordinate is flagged as suspicious.
pub const NEAR_ZERO_THRESHOLD: f64 = 1e-4;

/// Which of the two coordinate axes a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    /// Inclusive magnitude bound: 90 for latitude, 180 for longitude.
    pub fn limit(self) -> f64 {
        match self {
            Axis::Latitude => 90.0,
            Axis::Longitude => 180.0,
        }
    }

    pub fn is_valid(self, value: f64) -> bool {
        match self {
            Axis::Latitude => is_valid_latitude(value),
            Axis::Longitude => is_valid_longitude(value),
        }
    }

    /// Return `value` unchanged if in range for this axis.
    pub fn check(self, value: f64) -> Result<f64, InvalidCoordinate> {
        if self.is_valid(value) {
            Ok(value)
        } else {
            Err(InvalidCoordinate { axis: self, value })
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::Latitude => "latitude",
            Axis::Longitude => "longitude",
        })
    }
}

/// A caller-supplied coordinate outside its axis range.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("{axis} {value} is outside [-{limit}, {limit}]", limit = .axis.limit())]
pub struct InvalidCoordinate {
    pub axis: Axis,
    pub value: f64,
}

pub fn is_valid_latitude(x: f64) -> bool {
    (-90.0..=90.0).contains(&x)
}

pub fn is_valid_longitude(x: f64) -> bool {
    (-180.0..=180.0).contains(&x)
}

/// Exactly (0.0, 0.0) on both axes: the firmware placeholder, not a location.
///
/// `-0.0 == 0.0` holds, so a negated zero counts too.
pub fn is_null_island(lat: f64, lon: f64) -> bool {
    lat == 0.0 && lon == 0.0
}

/// Warn-only check; see [`NEAR_ZERO_THRESHOLD`].
pub fn is_near_zero(x: f64) -> bool {
    x.abs() < NEAR_ZERO_THRESHOLD
}
