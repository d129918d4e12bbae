//! GPS coordinate codec: pure functions, no I/O, no logging.
//!
//! ```text
//! GpsBlock ──locate──▶ GpsFields ──normalize──▶ f64 components
//!                                 ──decode────▶ signed decimal ──validate──▶ GpsOutcome
//!
//! f64 lat/lon ──validate──▶ encode ──▶ DmsTriple (exact fractions + ref)
//! ```
//!
//! - [`value`]: raw value shapes and the rational normalizer
//! - [`codec`]: DMS ↔ decimal conversion
//! - [`locator`]: key-scheme resolution and the null-island rule
//! - [`validate`]: range predicates shared by decode and write paths

pub mod codec;
pub mod error;
pub mod locator;
pub mod validate;
pub mod value;

pub use codec::{Decoded, DmsTriple, Fraction, Hemisphere, decode, encode};
pub use error::{DecodeError, DmsComponent};
pub use locator::{GpsBlock, GpsFix, GpsKey, GpsOutcome, KeyScheme, NoGpsReason, auxiliary, locate};
pub use validate::{Axis, InvalidCoordinate, is_null_island, is_valid_latitude, is_valid_longitude};
pub use value::{RawValue, normalize};
