//! Decode error taxonomy for the GPS codec.
//!
//! Every variant is recoverable: the locator turns any of them into a
//! "no GPS data" outcome for the container, so extraction never fails
//! because a single field is malformed.

use super::validate::Axis;
use std::fmt;
use thiserror::Error;

/// Which position of a DMS triple a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmsComponent {
    Degrees,
    Minutes,
    Seconds,
}

impl fmt::Display for DmsComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DmsComponent::Degrees => "degrees",
            DmsComponent::Minutes => "minutes",
            DmsComponent::Seconds => "seconds",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("Unrecognized rational shape: {0}")]
    UnrecognizedShape(String),
    #[error("Zero denominator in rational value")]
    ZeroDenominator,
    #[error("Malformed DMS triple: {0}")]
    MalformedDmsTriple(String),
    #[error("{component} out of range: {value}")]
    OutOfRangeComponent { component: DmsComponent, value: f64 },
    #[error("Decoded {axis} out of range: {value}")]
    OutOfRangeCoordinate { axis: Axis, value: f64 },
}

impl DecodeError {
    /// Attach the failing component to a normalizer error.
    ///
    /// Only shape errors carry text, so this just prefixes it.
    pub(crate) fn in_component(self, component: DmsComponent) -> Self {
        match self {
            DecodeError::UnrecognizedShape(shape) => {
                DecodeError::UnrecognizedShape(format!("{component}: {shape}"))
            }
            other => other,
        }
    }
}
