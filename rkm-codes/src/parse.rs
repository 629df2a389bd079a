//! RKM code parser
//!
//! ```text
//! code    := lsign digits letters (digits letters*)?
//!          | sign? digits* letters (digits letters*)?
//! lsign   := 'p' | 'n' | 'm'          (only when a digit follows)
//! sign    := '+' | '-' | '−' | minus sign preference
//! ```
//!
//! The first letter stands in for the decimal point. It is resolved, in
//! order, as a key of the base code map, as a scale factor, or else the
//! whole letter run is taken as units.

use rkm_core::{Number, Quantity, ScaleFactor};
use tracing::trace;

use crate::helpers::{get_regex, sign_pattern, LETTERS};
use crate::{ParseError, Preferences};

/// Anchored pattern for a single RKM code
fn code_pattern(minus_sign: &str) -> String {
    format!(
        r"^(?:(?P<lsign>[pnm])(?P<lint>\d+)|(?P<sign>{sign})?(?P<int>\d*))(?P<letters>{l}+)(?:(?P<frac>\d+)(?P<tail>{l}*))?$",
        sign = sign_pattern(minus_sign),
        l = LETTERS,
    )
}

impl Preferences {
    /// Convert an RKM code to a quantity
    pub fn from_rkm(&self, code: &str) -> Result<Quantity, ParseError> {
        let text = code.trim();
        if text.is_empty() {
            return Err(ParseError::Empty);
        }

        let re = get_regex(&code_pattern(&self.minus_sign))?;
        let caps = re
            .captures(text)
            .ok_or_else(|| ParseError::Malformed(text.to_string()))?;

        let (negative, int) = match caps.name("lsign") {
            Some(lsign) => (lsign.as_str() != "p", &caps["lint"]),
            None => {
                let negative = caps.name("sign").is_some_and(|s| s.as_str() != "+");
                (negative, caps.name("int").map_or("", |m| m.as_str()))
            }
        };
        let frac = caps.name("frac").map_or("", |m| m.as_str());
        let tail = caps.name("tail").map_or("", |m| m.as_str());
        if int.is_empty() && frac.is_empty() {
            return Err(ParseError::NoDigits(text.to_string()));
        }

        let letters = &caps["letters"];
        let mut chars = letters.chars();
        let base = chars.next().ok_or_else(|| ParseError::Malformed(text.to_string()))?;
        let rest = chars.as_str();

        let (scale_factor, implied, inner) = if let Some(entry) = self.rkm_maps.get(base) {
            trace!(code = text, %base, "base code from map");
            (entry.scale_factor, entry.units.as_str(), rest)
        } else if let Some(sf) = ScaleFactor::from_char(base) {
            trace!(code = text, %base, "base code is a scale factor");
            (Some(sf), "", rest)
        } else {
            trace!(code = text, units = letters, "base code taken as units");
            (None, "", letters)
        };

        let units = match (inner, tail) {
            ("", "") => implied,
            (inner, "") => inner,
            ("", tail) => tail,
            (inner, tail) if inner == tail => inner,
            (inner, tail) => {
                return Err(ParseError::ConflictingUnits {
                    code: text.to_string(),
                    inner: inner.to_string(),
                    tail: tail.to_string(),
                })
            }
        };

        let magnitude: Number = format!("{}.{}", int, frac)
            .parse()
            .map_err(|_| ParseError::Malformed(text.to_string()))?;
        let magnitude = if negative { magnitude.neg() } else { magnitude };

        Ok(Quantity::new(magnitude, scale_factor, units))
    }
}
