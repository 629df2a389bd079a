//! Exact decimal magnitudes using dashu
//!
//! Uses dashu-float (DBig) so that a magnitude read from an RKM code keeps
//! exactly the digits that were written. Rendering works on the
//! significand/exponent decomposition, never on a binary float.

use dashu_float::DBig;
use dashu_int::IBig;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Decimal decomposition of a [`Number`]: `±digits × 10^exponent`
///
/// `digits` never has leading or trailing zeros, except for zero itself
/// which is `"0"` with exponent 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalParts {
    pub negative: bool,
    pub digits: String,
    pub exponent: isize,
}

impl DecimalParts {
    /// Power of ten of the most significant digit (floor(log10|x|))
    ///
    /// Saturates at the `isize` bounds.
    pub fn msd_exponent(&self) -> isize {
        (self.digits.len() as isize - 1).saturating_add(self.exponent)
    }

    pub fn is_zero(&self) -> bool {
        self.digits == "0"
    }
}

/// Arbitrary precision decimal number
///
/// Built on dashu-float's DBig. All operations return Results or new
/// Numbers - never panic.
#[derive(Debug, Clone)]
pub struct Number {
    inner: DBig,
}

impl Number {
    // ========== Construction ==========

    /// Create from `significand × 10^exponent`
    pub fn from_parts(significand: IBig, exponent: isize) -> Self {
        Self { inner: DBig::from_parts(significand, exponent) }
    }

    /// Create from i64
    pub fn from_i64(n: i64) -> Self {
        Self::from_parts(IBig::from(n), 0)
    }

    /// Create from f64 using the shortest decimal that round-trips
    pub fn from_f64(f: f64) -> Result<Self, CoreError> {
        if !f.is_finite() {
            return Err(CoreError::NotFinite(f));
        }
        // Display for f64 never switches to exponent notation
        format!("{}", f).parse()
    }

    /// Zero
    pub fn zero() -> Self {
        Self { inner: DBig::ZERO }
    }

    // ========== Predicates ==========

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.inner == DBig::ZERO
    }

    /// Check if negative
    pub fn is_negative(&self) -> bool {
        self.inner < DBig::ZERO
    }

    // ========== Decimal Operations ==========

    /// Negation
    pub fn neg(&self) -> Self {
        let (significand, exponent) = self.raw_parts();
        Self::from_parts(-significand, exponent)
    }

    /// Absolute value
    pub fn abs(&self) -> Self {
        if self.is_negative() {
            self.neg()
        } else {
            self.clone()
        }
    }

    /// Multiply by `10^power` (exact)
    pub fn scale_pow10(&self, power: isize) -> Result<Self, CoreError> {
        let (significand, exponent) = self.raw_parts();
        let exponent = exponent
            .checked_add(power)
            .ok_or_else(|| CoreError::ExponentOverflow(self.to_sci()))?;
        Ok(Self::from_parts(significand, exponent))
    }

    /// Round to `sigfigs` significant digits, ties to even
    ///
    /// Numbers that already fit are returned unchanged; `sigfigs == 0`
    /// is treated as "no rounding".
    pub fn round_sigfigs(&self, sigfigs: usize) -> Self {
        let parts = self.decimal_parts();
        if sigfigs == 0 || parts.digits.len() <= sigfigs {
            return self.clone();
        }
        self.round_at(parts.msd_exponent().saturating_add(1).saturating_sub(sigfigs as isize))
    }

    /// Round to a whole multiple of `10^exponent`, ties to even
    ///
    /// `round_at(-2)` keeps two decimal places.
    pub fn round_at(&self, exponent: isize) -> Self {
        let parts = self.decimal_parts();
        if parts.is_zero() || parts.exponent >= exponent {
            return self.clone();
        }
        // Below half of 10^exponent
        if exponent > parts.msd_exponent().saturating_add(1) {
            return Self::zero();
        }

        let dropped = exponent.abs_diff(parts.exponent);
        let magnitude: IBig = match parts.digits.parse() {
            Ok(m) => m,
            Err(_) => return self.clone(),
        };

        let divisor = IBig::from(10u8).pow(dropped);
        let quotient = &magnitude / &divisor;
        let remainder = &magnitude % &divisor;
        let twice = &remainder * IBig::from(2u8);
        let odd = (&quotient % IBig::from(2u8)) == IBig::ONE;

        let rounded = if twice > divisor || (twice == divisor && odd) {
            quotient + IBig::ONE
        } else {
            quotient
        };
        let rounded = if parts.negative { -rounded } else { rounded };
        Self::from_parts(rounded, exponent)
    }

    // ========== Conversion ==========

    /// Decompose into sign, significant digits and exponent
    pub fn decimal_parts(&self) -> DecimalParts {
        let (significand, exponent) = self.raw_parts();
        let negative = significand < IBig::ZERO;
        let magnitude = if negative { -significand } else { significand };
        if magnitude == IBig::ZERO {
            return DecimalParts { negative: false, digits: "0".to_string(), exponent: 0 };
        }

        let text = magnitude.to_string();
        let trimmed = text.trim_end_matches('0');
        let zeros = text.len() - trimmed.len();
        DecimalParts {
            negative,
            digits: trimmed.to_string(),
            exponent: exponent.saturating_add(zeros as isize),
        }
    }

    /// Convert to f64 (may lose precision)
    pub fn to_f64(&self) -> Option<f64> {
        let parts = self.decimal_parts();
        let sign = if parts.negative { "-" } else { "" };
        let value: f64 = format!("{}{}e{}", sign, parts.digits, parts.exponent).parse().ok()?;
        value.is_finite().then_some(value)
    }

    /// Render as plain decimal (no exponent), all digits kept
    ///
    /// The output grows with the exponent; callers that render untrusted
    /// values bound it first.
    pub fn as_plain(&self) -> String {
        let parts = self.decimal_parts();
        let mut out = String::new();
        if parts.negative {
            out.push('-');
        }

        let point = (parts.digits.len() as isize).saturating_add(parts.exponent);
        if point <= 0 {
            out.push_str("0.");
            out.extend(std::iter::repeat('0').take(point.unsigned_abs()));
            out.push_str(&parts.digits);
        } else if point as usize >= parts.digits.len() {
            out.push_str(&parts.digits);
            out.extend(std::iter::repeat('0').take(point as usize - parts.digits.len()));
        } else {
            let (int, frac) = parts.digits.split_at(point as usize);
            out.push_str(int);
            out.push('.');
            out.push_str(frac);
        }
        out
    }

    /// Scientific rendering, `-4.7e3`, whatever the exponent
    pub fn to_sci(&self) -> String {
        let parts = self.decimal_parts();
        let sign = if parts.negative { "-" } else { "" };
        let (lead, rest) = parts.digits.split_at(1);
        let point = if rest.is_empty() { "" } else { "." };
        format!("{}{}{}{}e{}", sign, lead, point, rest, parts.msd_exponent())
    }

    fn raw_parts(&self) -> (IBig, isize) {
        self.inner.clone().into_repr().into_parts()
    }
}

/// Parse "123", "-4.7", ".47", "470e-9", "1.5E3"
impl FromStr for Number {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidNumber(s.to_string());
        let text = s.trim();

        let (negative, unsigned) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };

        let (mantissa, exp) = match unsigned.find(['e', 'E']) {
            Some(pos) => {
                let exp: isize = unsigned[pos + 1..].parse().map_err(|_| invalid())?;
                (&unsigned[..pos], exp)
            }
            None => (unsigned, 0),
        };

        let (int, frac) = match mantissa.split_once('.') {
            Some((int, frac)) => (int, frac),
            None => (mantissa, ""),
        };
        if int.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !int.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let digits = format!("{}{}", int, frac);
        let significand: IBig = digits.parse().map_err(|_| invalid())?;
        let significand = if negative { -significand } else { significand };
        let exponent = isize::try_from(frac.len())
            .ok()
            .and_then(|len| exp.checked_sub(len))
            .ok_or_else(invalid)?;
        Ok(Self::from_parts(significand, exponent))
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Self::from_i64(n)
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Self::from_i64(n as i64)
    }
}

// ========== Trait Implementations ==========

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_plain())
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_plain())
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.decimal_parts() == other.decimal_parts()
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // DBig implements PartialOrd, use it and treat None as Equal
        self.inner.partial_cmp(&other.inner).unwrap_or(std::cmp::Ordering::Equal)
    }
}
