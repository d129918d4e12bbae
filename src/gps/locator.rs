//! Finding the four core GPS fields in a metadata container.
//!
//! The same logical fields are published under three key conventions:
//!
//! | Field | Numeric (IFD tag) | Named | Namespaced (exifread) |
//! |---|---|---|---|
//! | latitude ref | `1` | `GPSLatitudeRef` | `GPS GPSLatitudeRef` |
//! | latitude | `2` | `GPSLatitude` | `GPS GPSLatitude` |
//! | longitude ref | `3` | `GPSLongitudeRef` | `GPS GPSLongitudeRef` |
//! | longitude | `4` | `GPSLongitude` | `GPS GPSLongitude` |
//!
//! A [`KeyScheme`] is resolved once per container (first scheme with all
//! four keys present, in the order above) and the fields are read through
//! it. Anything else in the block is auxiliary and passed through as text.
//!
//! After decoding, the exact pair (0.0, 0.0) is treated as "no GPS data":
//! consumer firmware writes it as a placeholder far more often than anyone
//! photographs that patch of ocean.

use super::codec::{self, Decoded, Hemisphere};
use super::error::DecodeError;
use super::validate::{Axis, is_null_island};
use super::value::{RawValue, normalize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Key of one entry in a GPS block.
///
/// Deserializes from a JSON object key: all-digit keys become [`GpsKey::Tag`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GpsKey {
    Tag(u16),
    Name(String),
}

impl From<String> for GpsKey {
    fn from(s: String) -> Self {
        match s.parse::<u16>() {
            Ok(n) => GpsKey::Tag(n),
            Err(_) => GpsKey::Name(s),
        }
    }
}

impl From<&str> for GpsKey {
    fn from(s: &str) -> Self {
        GpsKey::from(s.to_string())
    }
}

impl From<GpsKey> for String {
    fn from(key: GpsKey) -> Self {
        key.to_string()
    }
}

impl fmt::Display for GpsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpsKey::Tag(n) => write!(f, "{n}"),
            GpsKey::Name(s) => f.write_str(s),
        }
    }
}

/// The GPS sub-block of one image: key → raw value. Read-only after construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GpsBlock {
    entries: BTreeMap<GpsKey, RawValue>,
}

impl GpsBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<GpsKey>, value: RawValue) -> Self {
        self.entries.insert(key.into(), value);
        self
    }

    pub fn insert(&mut self, key: impl Into<GpsKey>, value: RawValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &GpsKey) -> Option<&RawValue> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GpsKey, &RawValue)> {
        self.entries.iter()
    }

    /// Build from the GPS-context fields of a parsed EXIF container.
    pub fn from_exif(exif: &exif::Exif) -> Self {
        let mut block = Self::new();
        for field in exif.fields() {
            if field.ifd_num == exif::In::PRIMARY && field.tag.context() == exif::Context::Gps {
                block.insert(GpsKey::Tag(field.tag.number()), RawValue::from(&field.value));
            }
        }
        block
    }
}

/// The four core GPS fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpsField {
    LatitudeRef,
    Latitude,
    LongitudeRef,
    Longitude,
}

impl GpsField {
    pub const ALL: [GpsField; 4] = [
        GpsField::LatitudeRef,
        GpsField::Latitude,
        GpsField::LongitudeRef,
        GpsField::Longitude,
    ];

    /// EXIF GPS IFD tag number.
    pub fn tag(self) -> u16 {
        match self {
            GpsField::LatitudeRef => 1,
            GpsField::Latitude => 2,
            GpsField::LongitudeRef => 3,
            GpsField::Longitude => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GpsField::LatitudeRef => "GPSLatitudeRef",
            GpsField::Latitude => "GPSLatitude",
            GpsField::LongitudeRef => "GPSLongitudeRef",
            GpsField::Longitude => "GPSLongitude",
        }
    }
}

const NAMESPACE_PREFIX: &str = "GPS ";

/// Naming convention a container uses for the core fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyScheme {
    Numeric,
    Named,
    Namespaced,
}

impl KeyScheme {
    /// Resolution order.
    pub const ALL: [KeyScheme; 3] = [KeyScheme::Numeric, KeyScheme::Named, KeyScheme::Namespaced];

    pub fn key(self, field: GpsField) -> GpsKey {
        match self {
            KeyScheme::Numeric => GpsKey::Tag(field.tag()),
            KeyScheme::Named => GpsKey::Name(field.name().to_string()),
            KeyScheme::Namespaced => GpsKey::Name(format!("{NAMESPACE_PREFIX}{}", field.name())),
        }
    }

    /// First scheme under which all four core fields are present.
    pub fn resolve(block: &GpsBlock) -> Option<KeyScheme> {
        Self::ALL.into_iter().find(|scheme| {
            GpsField::ALL
                .iter()
                .all(|field| block.get(&scheme.key(*field)).is_some())
        })
    }

    /// Read the core fields through this scheme.
    pub fn fields(self, block: &GpsBlock) -> Option<GpsFields<'_>> {
        let get = |field| block.get(&self.key(field));
        Some(GpsFields {
            latitude_ref: get(GpsField::LatitudeRef)?,
            latitude: get(GpsField::Latitude)?,
            longitude_ref: get(GpsField::LongitudeRef)?,
            longitude: get(GpsField::Longitude)?,
        })
    }

    /// Whether `key` names one of the core fields under any scheme.
    pub fn is_core_key(key: &GpsKey) -> bool {
        Self::ALL
            .iter()
            .any(|scheme| GpsField::ALL.iter().any(|field| scheme.key(*field) == *key))
    }
}

/// Canonical view of the core fields, independent of key scheme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsFields<'a> {
    pub latitude_ref: &'a RawValue,
    pub latitude: &'a RawValue,
    pub longitude_ref: &'a RawValue,
    pub longitude: &'a RawValue,
}

/// A successfully located coordinate pair at full precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    pub scheme: KeyScheme,
    /// Either axis fell under the near-zero warning threshold.
    pub near_zero: bool,
}

/// Why a container produced no usable geotag.
#[derive(Debug, Clone, PartialEq)]
pub enum NoGpsReason {
    /// No key scheme had all four core fields.
    MissingFields,
    /// The fields were there but one axis failed to decode.
    Undecodable { axis: Axis, error: DecodeError },
    /// Decoded to exactly (0.0, 0.0).
    NullIsland,
}

impl fmt::Display for NoGpsReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoGpsReason::MissingFields => f.write_str("missing required GPS fields"),
            NoGpsReason::Undecodable { axis, error } => write!(f, "{axis} undecodable: {error}"),
            NoGpsReason::NullIsland => f.write_str("null island (0, 0) placeholder"),
        }
    }
}

/// Result of looking for a geotag. Absence is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum GpsOutcome {
    Located(GpsFix),
    NoGpsData(NoGpsReason),
}

impl GpsOutcome {
    pub fn fix(&self) -> Option<&GpsFix> {
        match self {
            GpsOutcome::Located(fix) => Some(fix),
            GpsOutcome::NoGpsData(_) => None,
        }
    }
}

/// Locate and decode the coordinate pair in a GPS block.
pub fn locate(block: &GpsBlock) -> GpsOutcome {
    let Some((scheme, fields)) =
        KeyScheme::resolve(block).and_then(|s| s.fields(block).map(|f| (s, f)))
    else {
        return GpsOutcome::NoGpsData(NoGpsReason::MissingFields);
    };

    let latitude = match decode_axis(fields.latitude, fields.latitude_ref, Axis::Latitude) {
        Ok(d) => d,
        Err(error) => {
            return GpsOutcome::NoGpsData(NoGpsReason::Undecodable {
                axis: Axis::Latitude,
                error,
            });
        }
    };
    let longitude = match decode_axis(fields.longitude, fields.longitude_ref, Axis::Longitude) {
        Ok(d) => d,
        Err(error) => {
            return GpsOutcome::NoGpsData(NoGpsReason::Undecodable {
                axis: Axis::Longitude,
                error,
            });
        }
    };

    if is_null_island(latitude.value, longitude.value) {
        return GpsOutcome::NoGpsData(NoGpsReason::NullIsland);
    }

    GpsOutcome::Located(GpsFix {
        latitude: latitude.value,
        longitude: longitude.value,
        scheme,
        near_zero: latitude.near_zero || longitude.near_zero,
    })
}

/// Decode one axis, rejecting a reference that belongs to the other axis.
fn decode_axis(dms: &RawValue, reference: &RawValue, axis: Axis) -> Result<Decoded, DecodeError> {
    let hemisphere = Hemisphere::parse(reference)?;
    if hemisphere.axis() != axis {
        return Err(DecodeError::MalformedDmsTriple(format!(
            "reference {hemisphere} is not a {axis} reference"
        )));
    }
    codec::decode(dms, reference)
}

/// Auxiliary GPS fields (altitude, speed, version, ...) rendered as text.
///
/// Never fails: a value that can't be rendered specially falls back to its
/// plain text form.
pub fn auxiliary(block: &GpsBlock) -> BTreeMap<String, String> {
    block
        .iter()
        .filter(|(key, _)| !KeyScheme::is_core_key(key))
        .map(|(key, value)| render_auxiliary(key, value))
        .collect()
}

fn render_auxiliary(key: &GpsKey, value: &RawValue) -> (String, String) {
    let name = match key {
        GpsKey::Tag(n) => exif::Tag(exif::Context::Gps, *n).to_string(),
        GpsKey::Name(s) => s
            .strip_prefix(NAMESPACE_PREFIX)
            .unwrap_or(s.as_str())
            .to_string(),
    };
    match (name.as_str(), normalize(value)) {
        ("GPSAltitude", Ok(metres)) => ("Altitude".to_string(), format!("{metres:.1}m")),
        ("GPSSpeed", Ok(speed)) => ("Speed".to_string(), format!("{speed:.1}")),
        _ => (name, value.to_string()),
    }
}
