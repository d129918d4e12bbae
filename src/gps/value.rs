//! Raw metadata values and the rational normalizer.
//!
//! EXIF stores GPS magnitudes as RATIONAL (`u32/u32`) triples, but the
//! values reach us in several shapes depending on who produced them:
//!
//! | Shape | Example (JSON) | Source |
//! |---|---|---|
//! | Fraction object | `{"numerator": 46, "denominator": 1}` | EXIF RATIONAL / SRATIONAL |
//! | Two-element pair | `[46, 1]` | tuple-style dumps |
//! | Bare number | `46` or `46.0` | already-normalized writers |
//!
//! [`RawValue`] models all of them (plus text and byte strings, which the
//! reference fields use) and [`normalize`] turns one component into an `f64`.

use super::error::DecodeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One metadata value of not-yet-known shape.
///
/// Deserializes untagged from JSON; variant order matters (integers before
/// floats so `46` stays exact). `Bytes` is never produced by JSON input,
/// only by the EXIF adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Fraction { numerator: i64, denominator: i64 },
    Integer(i64),
    Float(f64),
    Text(String),
    Sequence(Vec<RawValue>),
    #[serde(skip_deserializing)]
    Bytes(Vec<u8>),
}

impl RawValue {
    pub fn fraction(numerator: i64, denominator: i64) -> Self {
        RawValue::Fraction {
            numerator,
            denominator,
        }
    }

    /// Short description of the shape, used in error messages.
    pub fn shape(&self) -> String {
        match self {
            RawValue::Fraction { .. } => "fraction".to_string(),
            RawValue::Integer(_) => "integer".to_string(),
            RawValue::Float(_) => "float".to_string(),
            RawValue::Text(_) => "text".to_string(),
            RawValue::Sequence(items) => format!("sequence of {}", items.len()),
            RawValue::Bytes(b) => format!("{} bytes", b.len()),
        }
    }

    /// Text content of a string-like value.
    ///
    /// Byte strings are decoded lossily with EXIF NUL padding stripped; a
    /// single-element sequence (EXIF ASCII with one string) unwraps.
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawValue::Text(s) => Some(s.clone()),
            RawValue::Bytes(b) => Some(
                String::from_utf8_lossy(b)
                    .trim_end_matches('\0')
                    .to_string(),
            ),
            RawValue::Sequence(items) if items.len() == 1 => items[0].as_text(),
            _ => None,
        }
    }

    fn as_scalar(&self) -> Option<f64> {
        match self {
            RawValue::Integer(n) => Some(*n as f64),
            RawValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// Normalize one rational component to a finite `f64`.
///
/// Zero denominators and non-finite results are failures, never `0.0`.
pub fn normalize(value: &RawValue) -> Result<f64, DecodeError> {
    let result = match value {
        RawValue::Fraction {
            numerator,
            denominator,
        } => {
            if *denominator == 0 {
                return Err(DecodeError::ZeroDenominator);
            }
            *numerator as f64 / *denominator as f64
        }
        RawValue::Sequence(pair) if pair.len() == 2 => {
            let (Some(num), Some(den)) = (pair[0].as_scalar(), pair[1].as_scalar()) else {
                return Err(DecodeError::UnrecognizedShape(format!(
                    "pair of {} and {}",
                    pair[0].shape(),
                    pair[1].shape()
                )));
            };
            if den == 0.0 {
                return Err(DecodeError::ZeroDenominator);
            }
            num / den
        }
        RawValue::Integer(n) => *n as f64,
        RawValue::Float(f) => *f,
        other => return Err(DecodeError::UnrecognizedShape(other.shape())),
    };

    if result.is_finite() {
        Ok(result)
    } else {
        Err(DecodeError::UnrecognizedShape(format!(
            "non-finite value {result}"
        )))
    }
}

/// Collapse a single-element vector to a scalar value.
fn one_or_many<T>(items: &[T], f: impl Fn(&T) -> RawValue) -> RawValue {
    match items {
        [single] => f(single),
        many => RawValue::Sequence(many.iter().map(f).collect()),
    }
}

impl From<&exif::Value> for RawValue {
    fn from(value: &exif::Value) -> Self {
        use exif::Value;
        match value {
            Value::Byte(v) => one_or_many(v, |x| RawValue::Integer(i64::from(*x))),
            Value::SByte(v) => one_or_many(v, |x| RawValue::Integer(i64::from(*x))),
            Value::Short(v) => one_or_many(v, |x| RawValue::Integer(i64::from(*x))),
            Value::SShort(v) => one_or_many(v, |x| RawValue::Integer(i64::from(*x))),
            Value::Long(v) => one_or_many(v, |x| RawValue::Integer(i64::from(*x))),
            Value::SLong(v) => one_or_many(v, |x| RawValue::Integer(i64::from(*x))),
            Value::Rational(v) => one_or_many(v, |r| {
                RawValue::fraction(i64::from(r.num), i64::from(r.denom))
            }),
            Value::SRational(v) => one_or_many(v, |r| {
                RawValue::fraction(i64::from(r.num), i64::from(r.denom))
            }),
            Value::Float(v) => one_or_many(v, |x| RawValue::Float(f64::from(*x))),
            Value::Double(v) => one_or_many(v, |x| RawValue::Float(*x)),
            Value::Ascii(strings) => one_or_many(strings, |s| RawValue::Bytes(s.clone())),
            Value::Undefined(bytes, _) => RawValue::Bytes(bytes.clone()),
            Value::Unknown(..) => RawValue::Sequence(Vec::new()),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Fraction {
                numerator,
                denominator,
            } => write!(f, "{numerator}/{denominator}"),
            RawValue::Integer(n) => write!(f, "{n}"),
            RawValue::Float(x) => write!(f, "{x}"),
            RawValue::Text(s) => f.write_str(s),
            RawValue::Bytes(_) => f.write_str(&self.as_text().unwrap_or_default()),
            RawValue::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}
