//! RKM codes - read, write and find component value codes
//!
//! An RKM code writes a number with the decimal point replaced by a letter:
//! `4K7` is 4.7 kΩ, `R47` is 0.47 Ω, `2n5` is 2.5 nF. This crate converts
//! between such codes and [`Quantity`] values:
//! - [`from_rkm`]: code → quantity
//! - [`to_rkm`]: quantity (or number, or string) → code
//! - [`find_rkm`]: every code embedded in a text
//!
//! Behavior is controlled by [`Preferences`]. The free functions use a
//! process-wide instance changed with [`set_prefs`]; a `Preferences` value
//! offers the same operations without touching global state.
//!
//! ```
//! use rkm_codes::{from_rkm, to_rkm};
//!
//! let q = from_rkm("4K7").unwrap();
//! assert_eq!(q.to_string(), "4.7k");
//! assert_eq!(to_rkm(&q).unwrap(), "4K7");
//! ```

mod error;
mod find;
mod format;
mod helpers;
pub mod maps;
mod parse;
mod prefs;

pub use error::{ConfigError, FormatError, ParseError, RkmError};
pub use find::{FindMode, Finder};
pub use format::IntoQuantity;
pub use maps::{CodeEntry, CodeMap, SfMap, UnitsCodeMap, IEC60062, UNITLESS};
pub use prefs::{prefs, set_prefs, Field, MapUpdate, Precision, Preferences, PrefsUpdate, Setting};
pub use rkm_core::{CoreError, Number, Quantity, ScaleFactor};

use std::borrow::Cow;

/// Convert an RKM code to a quantity using the process-wide preferences
pub fn from_rkm(code: &str) -> Result<Quantity, RkmError> {
    Ok(prefs().from_rkm(code)?)
}

/// Convert an RKM code with a one-off change to the preferences
pub fn from_rkm_with(code: &str, update: &PrefsUpdate) -> Result<Quantity, RkmError> {
    Ok(prefs().with(update)?.from_rkm(code)?)
}

/// Write a value as an RKM code using the process-wide preferences
pub fn to_rkm<Q: IntoQuantity>(value: Q) -> Result<String, RkmError> {
    prefs().to_rkm(value)
}

/// Write a value as an RKM code with a one-off change to the preferences
///
/// ```
/// use rkm_codes::{to_rkm_with, PrefsUpdate, Precision};
///
/// let update = PrefsUpdate::new().prec(Precision::Digits(3)).strip_zeros(false);
/// assert_eq!(to_rkm_with(4700, &update).unwrap(), "4K70");
/// ```
pub fn to_rkm_with<Q: IntoQuantity>(value: Q, update: &PrefsUpdate) -> Result<String, RkmError> {
    prefs().with(update)?.to_rkm(value)
}

/// Find every RKM code in `text` using a snapshot of the process-wide preferences
pub fn find_rkm(text: &str, mode: FindMode) -> Finder<'_> {
    Finder::new(text, mode, Cow::Owned(prefs()))
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{find_rkm, from_rkm, set_prefs, to_rkm};
    pub use crate::{FindMode, Precision, Preferences, PrefsUpdate, Quantity, RkmError};
}
