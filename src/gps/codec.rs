//! DMS ↔ decimal-degree conversion.
//!
//! ## Decode
//!
//! ```text
//! ([d, m, s], ref)  →  validate shape/ref  →  normalize each component
//!                   →  range-check components  →  d + m/60 + s/3600
//!                   →  negate for S/W  →  range-check result  →  flag near-zero
//! ```
//!
//! Component ranges are checked strictly (degrees ≤ 180, minutes and
//! seconds < 60) so corrupt vendor data is rejected instead of producing a
//! plausible-looking wrong location. The final range check rejects, it
//! never clamps.
//!
//! ## Encode
//!
//! Degrees and minutes are whole numbers over 1; seconds are rounded to
//! 1/10000 and stored over [`SECONDS_DENOMINATOR`]. Rounding can push the
//! seconds to exactly 60, which is carried into the minutes (and minutes
//! into degrees) so every encoded triple decodes again.

use super::error::{DecodeError, DmsComponent};
use super::validate::{Axis, InvalidCoordinate, is_near_zero};
use super::value::{RawValue, normalize};
use std::fmt;

/// Denominator of the encoded seconds fraction.
pub const SECONDS_DENOMINATOR: u32 = 10_000;

const MAX_DEGREES: f64 = 180.0;

/// GPS reference direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'N' => Some(Hemisphere::North),
            'S' => Some(Hemisphere::South),
            'E' => Some(Hemisphere::East),
            'W' => Some(Hemisphere::West),
            _ => None,
        }
    }

    /// Parse a reference field: trimmed, uppercased, exactly one of `NSEW`.
    pub fn parse(raw: &RawValue) -> Result<Self, DecodeError> {
        let Some(text) = raw.as_text() else {
            return Err(DecodeError::MalformedDmsTriple(format!(
                "reference is {}, expected text",
                raw.shape()
            )));
        };
        let normalized = text.trim().to_uppercase();
        let mut chars = normalized.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c).ok_or_else(|| {
                DecodeError::MalformedDmsTriple(format!("invalid reference {c:?}"))
            }),
            _ => Err(DecodeError::MalformedDmsTriple(format!(
                "invalid reference {normalized:?}"
            ))),
        }
    }

    /// The hemisphere a signed decimal falls in; zero is N/E.
    pub fn for_value(axis: Axis, decimal: f64) -> Self {
        match (axis, decimal >= 0.0) {
            (Axis::Latitude, true) => Hemisphere::North,
            (Axis::Latitude, false) => Hemisphere::South,
            (Axis::Longitude, true) => Hemisphere::East,
            (Axis::Longitude, false) => Hemisphere::West,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Hemisphere::North | Hemisphere::South => Axis::Latitude,
            Hemisphere::East | Hemisphere::West => Axis::Longitude,
        }
    }

    pub fn is_negative(self) -> bool {
        matches!(self, Hemisphere::South | Hemisphere::West)
    }

    pub fn as_char(self) -> char {
        match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
            Hemisphere::East => 'E',
            Hemisphere::West => 'W',
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A decoded coordinate plus the near-zero warning signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoded {
    pub value: f64,
    /// `|value| < 1e-4`. Informational only; the value is still usable.
    pub near_zero: bool,
}

/// Decode a raw DMS sequence with its raw reference field.
pub fn decode(dms: &RawValue, reference: &RawValue) -> Result<Decoded, DecodeError> {
    let reference = Hemisphere::parse(reference)?;
    let RawValue::Sequence(components) = dms else {
        return Err(DecodeError::MalformedDmsTriple(format!(
            "expected 3 components, got {}",
            dms.shape()
        )));
    };
    decode_components(components, reference)
}

/// Decode already-split components against a parsed reference.
pub fn decode_components(
    components: &[RawValue],
    reference: Hemisphere,
) -> Result<Decoded, DecodeError> {
    let [d, m, s] = components else {
        return Err(DecodeError::MalformedDmsTriple(format!(
            "expected 3 components, got {}",
            components.len()
        )));
    };

    let degrees = component(d, DmsComponent::Degrees)?;
    let minutes = component(m, DmsComponent::Minutes)?;
    let seconds = component(s, DmsComponent::Seconds)?;

    let magnitude = degrees + minutes / 60.0 + seconds / 3600.0;
    let value = if reference.is_negative() {
        -magnitude
    } else {
        magnitude
    };

    let axis = reference.axis();
    if !axis.is_valid(value) {
        return Err(DecodeError::OutOfRangeCoordinate { axis, value });
    }

    Ok(Decoded {
        value,
        near_zero: is_near_zero(value),
    })
}

fn component(raw: &RawValue, which: DmsComponent) -> Result<f64, DecodeError> {
    let value = normalize(raw).map_err(|e| e.in_component(which))?;
    let in_range = match which {
        DmsComponent::Degrees => (0.0..=MAX_DEGREES).contains(&value),
        DmsComponent::Minutes | DmsComponent::Seconds => (0.0..60.0).contains(&value),
    };
    if in_range {
        Ok(value)
    } else {
        Err(DecodeError::OutOfRangeComponent {
            component: which,
            value,
        })
    }
}

/// An exact unsigned fraction, as written to an EXIF RATIONAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    pub numerator: u32,
    pub denominator: u32,
}

impl Fraction {
    pub fn whole(n: u32) -> Self {
        Self {
            numerator: n,
            denominator: 1,
        }
    }

    pub fn to_raw(self) -> RawValue {
        RawValue::fraction(i64::from(self.numerator), i64::from(self.denominator))
    }
}

/// Encoded degrees/minutes/seconds with the reference direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmsTriple {
    pub degrees: Fraction,
    pub minutes: Fraction,
    pub seconds: Fraction,
    pub reference: Hemisphere,
}

impl DmsTriple {
    pub fn components(&self) -> [Fraction; 3] {
        [self.degrees, self.minutes, self.seconds]
    }

    /// Raw (dms, reference) pair, the shape the decoder consumes.
    pub fn to_raw(&self) -> (RawValue, RawValue) {
        (
            RawValue::Sequence(self.components().iter().map(|f| f.to_raw()).collect()),
            RawValue::Text(self.reference.to_string()),
        )
    }
}

/// Encode a signed decimal coordinate for the given axis.
pub fn encode(decimal: f64, axis: Axis) -> Result<DmsTriple, InvalidCoordinate> {
    axis.check(decimal)?;

    let magnitude = decimal.abs();
    let mut degrees = magnitude.floor() as u32;
    let minutes_float = (magnitude - f64::from(degrees)) * 60.0;
    let mut minutes = minutes_float.floor() as u32;
    let seconds = (minutes_float - f64::from(minutes)) * 60.0;
    let mut seconds_num = (seconds * f64::from(SECONDS_DENOMINATOR)).round() as u32;

    if seconds_num >= 60 * SECONDS_DENOMINATOR {
        seconds_num -= 60 * SECONDS_DENOMINATOR;
        minutes += 1;
    }
    if minutes >= 60 {
        minutes -= 60;
        degrees += 1;
    }

    Ok(DmsTriple {
        degrees: Fraction::whole(degrees),
        minutes: Fraction::whole(minutes),
        seconds: Fraction {
            numerator: seconds_num,
            denominator: SECONDS_DENOMINATOR,
        },
        reference: Hemisphere::for_value(axis, decimal),
    })
}
