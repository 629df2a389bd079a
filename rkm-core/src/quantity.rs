//! Quantity type - a magnitude with an optional scale factor and units

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::scale::DEFAULT_OUTPUT_SF;
use crate::{CoreError, Number, ScaleFactor};

/// A numeric quantity as written on a schematic: `4.7 kΩ`, `2.5 pF`, `470m`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quantity {
    /// The digits as written, before the scale factor is applied
    pub magnitude: Number,
    /// Scale factor multiplying the magnitude
    pub scale_factor: Option<ScaleFactor>,
    /// Units, empty when the quantity is a pure number
    pub units: String,
}

impl Quantity {
    /// Create a new quantity
    pub fn new(magnitude: Number, scale_factor: Option<ScaleFactor>, units: impl Into<String>) -> Self {
        Quantity { magnitude, scale_factor, units: units.into() }
    }

    /// Create a unitless, unscaled quantity
    pub fn unitless(magnitude: Number) -> Self {
        Quantity::new(magnitude, None, "")
    }

    /// Builder: replace units
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    /// The full value: magnitude × scale factor
    pub fn value(&self) -> Result<Number, CoreError> {
        match self.scale_factor {
            Some(sf) => self.magnitude.scale_pow10(sf.exponent()),
            None => Ok(self.magnitude.clone()),
        }
    }

    pub fn is_negative(&self) -> bool {
        self.magnitude.is_negative()
    }

    pub fn has_units(&self) -> bool {
        !self.units.is_empty()
    }

    /// Re-express in engineering notation using only the given scale factors
    pub fn normalized(&self, available: &[ScaleFactor]) -> Result<Quantity, CoreError> {
        let value = self.value()?;
        let sf = ScaleFactor::choose(&value, available);
        let shift = sf.map_or(0, |sf| sf.exponent());
        Ok(Quantity::new(value.scale_pow10(-shift)?, sf, self.units.clone()))
    }
}

fn quantity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?P<num>[-+]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][-+]?\d+)?)(?P<ws>\s*)(?P<rest>.*?)\s*$")
            .expect("quantity pattern is valid")
    })
}

/// Parse `<number>[ ]<scale factor><units>`
///
/// A scale-factor letter counts as a scale factor when units follow it or
/// when it touches the number: `2.5m` is milli, `2.5 m` is metres.
impl FromStr for Quantity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = quantity_regex()
            .captures(s)
            .ok_or_else(|| CoreError::InvalidQuantity(s.to_string()))?;

        let magnitude: Number = caps["num"].parse()?;
        let spaced = !caps["ws"].is_empty();
        let rest = &caps["rest"];

        let mut chars = rest.chars();
        let scale_factor = match chars.next().and_then(ScaleFactor::from_char) {
            Some(sf) if !spaced || !chars.as_str().is_empty() => Some(sf),
            _ => None,
        };
        let units = match scale_factor {
            Some(_) => chars.as_str(),
            None => rest,
        };

        Ok(Quantity::new(magnitude, scale_factor, units))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Shown as written when it cannot be rescaled
        let shown = ScaleFactor::parse_set(DEFAULT_OUTPUT_SF)
            .and_then(|available| self.normalized(&available))
            .unwrap_or_else(|_| self.clone());
        let sf = shown.scale_factor.map(|sf| sf.to_string()).unwrap_or_default();

        if self.units.is_empty() {
            write!(f, "{}{}", shown.magnitude, sf)
        } else {
            write!(f, "{} {}{}", shown.magnitude, sf, self.units)
        }
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        // Compare full values so 470k == 0.47M
        if self.units != other.units {
            return false;
        }
        match (self.value(), other.value()) {
            (Ok(a), Ok(b)) => a == b,
            _ => self.magnitude == other.magnitude && self.scale_factor == other.scale_factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> Number {
        s.parse().unwrap()
    }

    #[test]
    fn test_quantity_creation() {
        let q = Quantity::new(num("4.7"), Some(ScaleFactor::Kilo), "Ω");
        assert_eq!(q.magnitude, num("4.7"));
        assert_eq!(q.units, "Ω");
        assert_eq!(q.value().unwrap(), num("4700"));
    }

    #[test]
    fn test_unitless() {
        let q = Quantity::unitless(num("470"));
        assert!(!q.has_units());
        assert_eq!(q.scale_factor, None);
    }

    #[test]
    fn test_equality_across_scale_factors() {
        let q1 = Quantity::new(num("470"), Some(ScaleFactor::Kilo), "Ω");
        let q2 = Quantity::new(num("0.47"), Some(ScaleFactor::Mega), "Ω");
        assert_eq!(q1, q2);

        let q3 = Quantity::new(num("470"), Some(ScaleFactor::Kilo), "F");
        assert_ne!(q1, q3);
    }

    #[test]
    fn test_display() {
        let q = Quantity::new(num(".47"), None, "");
        assert_eq!(q.to_string(), "470m");

        let q = Quantity::new(num("4.7"), Some(ScaleFactor::Kilo), "Ω");
        assert_eq!(q.to_string(), "4.7 kΩ");

        let q = Quantity::new(num("4.7"), None, "Ω");
        assert_eq!(q.to_string(), "4.7 Ω");

        let q = Quantity::new(num("4700"), Some(ScaleFactor::Giga), "Ω");
        assert_eq!(q.to_string(), "4.7 TΩ");

        let q = Quantity::new(num(".047"), Some(ScaleFactor::Milli), "Ω");
        assert_eq!(q.to_string(), "47 uΩ");

        let q = Quantity::new(num("-2.5"), Some(ScaleFactor::Pico), "H");
        assert_eq!(q.to_string(), "-2.5 pH");
    }

    #[test]
    fn test_from_str() {
        let q: Quantity = "4.7 kΩ".parse().unwrap();
        assert_eq!(q.scale_factor, Some(ScaleFactor::Kilo));
        assert_eq!(q.units, "Ω");

        let q: Quantity = "20Ω".parse().unwrap();
        assert_eq!(q.scale_factor, None);
        assert_eq!(q.units, "Ω");
        assert_eq!(q.magnitude, num("20"));

        let q: Quantity = "470e-9Ω".parse().unwrap();
        assert_eq!(q.value().unwrap(), num("0.00000047"));

        let q: Quantity = "2.5m".parse().unwrap();
        assert_eq!(q.scale_factor, Some(ScaleFactor::Milli));
        assert_eq!(q.units, "");

        let q: Quantity = "2.5 m".parse().unwrap();
        assert_eq!(q.scale_factor, None);
        assert_eq!(q.units, "m");
    }

    #[test]
    fn test_from_str_invalid() {
        assert!("".parse::<Quantity>().is_err());
        assert!("kΩ".parse::<Quantity>().is_err());
        assert!("four".parse::<Quantity>().is_err());
    }

    #[test]
    fn test_from_str_extreme_exponent() {
        assert!(matches!(
            "1.5e-9223372036854775808".parse::<Quantity>(),
            Err(CoreError::InvalidNumber(_))
        ));
        assert!("1e99999999999999999999".parse::<Quantity>().is_err());
    }

    #[test]
    fn test_value_exponent_overflow() {
        let magnitude = num("1e9223372036854775807");
        let q = Quantity::new(magnitude.clone(), Some(ScaleFactor::Kilo), "");
        assert!(matches!(q.value(), Err(CoreError::ExponentOverflow(_))));
        // still comparable
        assert_eq!(q, Quantity::new(magnitude, Some(ScaleFactor::Kilo), ""));
    }
}
