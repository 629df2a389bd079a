//! SI scale factors - the letters that stand for powers of 1000

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CoreError, Number};

/// An SI scale factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub enum ScaleFactor {
    Yocto,
    Zepto,
    Atto,
    Femto,
    Pico,
    Nano,
    Micro,
    Milli,
    Kilo,
    Mega,
    Giga,
    Tera,
    Peta,
    Exa,
    Zetta,
    Yotta,
}

/// Scale factors used for display unless told otherwise
pub const DEFAULT_OUTPUT_SF: &str = "TGMkmunpfa";

impl ScaleFactor {
    pub const ALL: [ScaleFactor; 16] = [
        ScaleFactor::Yocto,
        ScaleFactor::Zepto,
        ScaleFactor::Atto,
        ScaleFactor::Femto,
        ScaleFactor::Pico,
        ScaleFactor::Nano,
        ScaleFactor::Micro,
        ScaleFactor::Milli,
        ScaleFactor::Kilo,
        ScaleFactor::Mega,
        ScaleFactor::Giga,
        ScaleFactor::Tera,
        ScaleFactor::Peta,
        ScaleFactor::Exa,
        ScaleFactor::Zetta,
        ScaleFactor::Yotta,
    ];

    /// Power of ten this scale factor multiplies by
    pub fn exponent(self) -> isize {
        match self {
            ScaleFactor::Yocto => -24,
            ScaleFactor::Zepto => -21,
            ScaleFactor::Atto => -18,
            ScaleFactor::Femto => -15,
            ScaleFactor::Pico => -12,
            ScaleFactor::Nano => -9,
            ScaleFactor::Micro => -6,
            ScaleFactor::Milli => -3,
            ScaleFactor::Kilo => 3,
            ScaleFactor::Mega => 6,
            ScaleFactor::Giga => 9,
            ScaleFactor::Tera => 12,
            ScaleFactor::Peta => 15,
            ScaleFactor::Exa => 18,
            ScaleFactor::Zetta => 21,
            ScaleFactor::Yotta => 24,
        }
    }

    /// Canonical ASCII symbol (`u` for micro)
    pub fn symbol(self) -> char {
        match self {
            ScaleFactor::Yocto => 'y',
            ScaleFactor::Zepto => 'z',
            ScaleFactor::Atto => 'a',
            ScaleFactor::Femto => 'f',
            ScaleFactor::Pico => 'p',
            ScaleFactor::Nano => 'n',
            ScaleFactor::Micro => 'u',
            ScaleFactor::Milli => 'm',
            ScaleFactor::Kilo => 'k',
            ScaleFactor::Mega => 'M',
            ScaleFactor::Giga => 'G',
            ScaleFactor::Tera => 'T',
            ScaleFactor::Peta => 'P',
            ScaleFactor::Exa => 'E',
            ScaleFactor::Zetta => 'Z',
            ScaleFactor::Yotta => 'Y',
        }
    }

    /// Look up a scale factor by character
    ///
    /// Accepts `K` for kilo and both the Greek mu and the micro sign.
    pub fn from_char(c: char) -> Option<Self> {
        let sf = match c {
            'y' => ScaleFactor::Yocto,
            'z' => ScaleFactor::Zepto,
            'a' => ScaleFactor::Atto,
            'f' => ScaleFactor::Femto,
            'p' => ScaleFactor::Pico,
            'n' => ScaleFactor::Nano,
            'u' | 'μ' | 'µ' => ScaleFactor::Micro,
            'm' => ScaleFactor::Milli,
            'k' | 'K' => ScaleFactor::Kilo,
            'M' => ScaleFactor::Mega,
            'G' => ScaleFactor::Giga,
            'T' => ScaleFactor::Tera,
            'P' => ScaleFactor::Peta,
            'E' => ScaleFactor::Exa,
            'Z' => ScaleFactor::Zetta,
            'Y' => ScaleFactor::Yotta,
            _ => return None,
        };
        Some(sf)
    }

    /// Parse a scale factor string: empty means none, otherwise exactly one character
    pub fn parse_optional(s: &str) -> Result<Option<Self>, CoreError> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Ok(None),
            (Some(c), None) => Self::from_char(c).map(Some).ok_or(CoreError::UnknownScaleFactor(c)),
            (Some(_), Some(_)) => Err(CoreError::InvalidQuantity(format!(
                "scale factor must be a single character: {:?}",
                s
            ))),
        }
    }

    /// Parse a set of scale factors such as `"TGMkmunpfa"`
    pub fn parse_set(s: &str) -> Result<Vec<Self>, CoreError> {
        s.chars()
            .map(|c| Self::from_char(c).ok_or(CoreError::UnknownScaleFactor(c)))
            .collect()
    }

    /// Pick the scale factor to display `value` with
    ///
    /// Uses the engineering exponent (a multiple of three) when it is in
    /// `available`. Otherwise the largest available exponent below it, and
    /// failing that the smallest available one. "No scale factor" always
    /// competes as exponent 0.
    pub fn choose(value: &Number, available: &[ScaleFactor]) -> Option<ScaleFactor> {
        let parts = value.decimal_parts();
        if parts.is_zero() {
            return None;
        }
        let msd = parts.msd_exponent();
        let ideal = msd.saturating_sub(msd.rem_euclid(3));

        let candidates = std::iter::once((0, None))
            .chain(available.iter().map(|sf| (sf.exponent(), Some(*sf))));

        let mut best: Option<(isize, Option<ScaleFactor>)> = None;
        let mut lowest: (isize, Option<ScaleFactor>) = (0, None);
        for (exp, sf) in candidates {
            if exp <= ideal && best.map_or(true, |(b, _)| exp > b) {
                best = Some((exp, sf));
            }
            if exp < lowest.0 {
                lowest = (exp, sf);
            }
        }
        best.unwrap_or(lowest).1
    }
}

impl TryFrom<char> for ScaleFactor {
    type Error = CoreError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Self::from_char(c).ok_or(CoreError::UnknownScaleFactor(c))
    }
}

impl From<ScaleFactor> for char {
    fn from(sf: ScaleFactor) -> char {
        sf.symbol()
    }
}

impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> Number {
        s.parse().unwrap()
    }

    fn all_output() -> Vec<ScaleFactor> {
        ScaleFactor::parse_set(DEFAULT_OUTPUT_SF).unwrap()
    }

    #[test]
    fn test_from_char_aliases() {
        assert_eq!(ScaleFactor::from_char('K'), Some(ScaleFactor::Kilo));
        assert_eq!(ScaleFactor::from_char('μ'), Some(ScaleFactor::Micro));
        assert_eq!(ScaleFactor::from_char('µ'), Some(ScaleFactor::Micro));
        assert_eq!(ScaleFactor::from_char('r'), None);
    }

    #[test]
    fn test_symbol_roundtrip() {
        for sf in ScaleFactor::ALL {
            assert_eq!(ScaleFactor::from_char(sf.symbol()), Some(sf));
        }
    }

    #[test]
    fn test_parse_optional() {
        assert_eq!(ScaleFactor::parse_optional("").unwrap(), None);
        assert_eq!(ScaleFactor::parse_optional("μ").unwrap(), Some(ScaleFactor::Micro));
        assert!(matches!(
            ScaleFactor::parse_optional("x"),
            Err(CoreError::UnknownScaleFactor('x'))
        ));
        assert!(ScaleFactor::parse_optional("kk").is_err());
    }

    #[test]
    fn test_choose_engineering() {
        let out = all_output();
        assert_eq!(ScaleFactor::choose(&num("4700"), &out), Some(ScaleFactor::Kilo));
        assert_eq!(ScaleFactor::choose(&num("0.47"), &out), Some(ScaleFactor::Milli));
        assert_eq!(ScaleFactor::choose(&num("470"), &out), None);
        assert_eq!(ScaleFactor::choose(&num("-2.5e-12"), &out), Some(ScaleFactor::Pico));
        assert_eq!(ScaleFactor::choose(&num("0"), &out), None);
    }

    #[test]
    fn test_choose_restricted() {
        let big_only = ScaleFactor::parse_set("TGMk").unwrap();
        // nothing below 1 is available, so small values stay unscaled
        assert_eq!(ScaleFactor::choose(&num("0.047"), &big_only), None);
        assert_eq!(ScaleFactor::choose(&num("4.7e15"), &big_only), Some(ScaleFactor::Tera));

        let tiny_only = ScaleFactor::parse_set("p").unwrap();
        assert_eq!(ScaleFactor::choose(&num("1e-15"), &tiny_only), Some(ScaleFactor::Pico));
    }

    #[test]
    fn test_choose_extreme_exponents() {
        let out = all_output();
        assert_eq!(ScaleFactor::choose(&num("1e-9223372036854775807"), &out), Some(ScaleFactor::Atto));
        assert_eq!(ScaleFactor::choose(&num("-1e-9223372036854775808"), &out), Some(ScaleFactor::Atto));
        assert_eq!(ScaleFactor::choose(&num("1e9223372036854775807"), &out), Some(ScaleFactor::Tera));
    }
}
