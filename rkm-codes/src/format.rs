//! RKM code formatter

use rkm_core::{Number, Quantity, ScaleFactor};

use crate::{FormatError, Preferences, RkmError};

/// Largest power of ten the scaled mantissa may reach, either way
///
/// Keeps the zeros written around the digits to a fixed number.
const MAX_MANTISSA_EXPONENT: isize = 100;

/// Values that can be written as an RKM code
pub trait IntoQuantity {
    fn into_quantity(self) -> Result<Quantity, FormatError>;
}

impl IntoQuantity for Quantity {
    fn into_quantity(self) -> Result<Quantity, FormatError> {
        Ok(self)
    }
}

impl IntoQuantity for &Quantity {
    fn into_quantity(self) -> Result<Quantity, FormatError> {
        Ok(self.clone())
    }
}

impl IntoQuantity for &str {
    fn into_quantity(self) -> Result<Quantity, FormatError> {
        self.parse().map_err(|_| FormatError::NotNumeric(self.to_string()))
    }
}

impl IntoQuantity for String {
    fn into_quantity(self) -> Result<Quantity, FormatError> {
        self.as_str().into_quantity()
    }
}

impl IntoQuantity for &String {
    fn into_quantity(self) -> Result<Quantity, FormatError> {
        self.as_str().into_quantity()
    }
}

impl IntoQuantity for Number {
    fn into_quantity(self) -> Result<Quantity, FormatError> {
        Ok(Quantity::unitless(self))
    }
}

impl IntoQuantity for f64 {
    fn into_quantity(self) -> Result<Quantity, FormatError> {
        Ok(Quantity::unitless(Number::from_f64(self)?))
    }
}

impl IntoQuantity for f32 {
    fn into_quantity(self) -> Result<Quantity, FormatError> {
        if !self.is_finite() {
            return Err(FormatError::Core(rkm_core::CoreError::NotFinite(self as f64)));
        }
        // Shortest f32 decimal, not the widened f64 one
        let magnitude: Number = self.to_string().parse()?;
        Ok(Quantity::unitless(magnitude))
    }
}

macro_rules! int_into_quantity {
    ($($t:ty),*) => {
        $(
            impl IntoQuantity for $t {
                fn into_quantity(self) -> Result<Quantity, FormatError> {
                    Ok(Quantity::unitless(Number::from_i64(i64::from(self))))
                }
            }
        )*
    };
}

int_into_quantity!(i64, i32, u32);

impl Preferences {
    /// Write a quantity as an RKM code
    pub fn to_rkm<Q: IntoQuantity>(&self, value: Q) -> Result<String, RkmError> {
        let quantity = value.into_quantity()?;
        let digits = self.prec.digits()?;
        let available = self.output_scale_factors()?;

        let (sf, mantissa, decimals) = scale(&quantity.value()?, &available, digits)?;

        let plain = mantissa.abs().as_plain();
        let (int, frac) = plain.split_once('.').unwrap_or((plain.as_str(), ""));
        let mut frac = frac.to_string();
        if let Some(decimals) = decimals {
            while frac.len() < decimals {
                frac.push('0');
            }
        }
        if self.strip_zeros {
            frac.truncate(frac.trim_end_matches('0').len());
        }
        // R47, never 0R47
        let int = if int == "0" && !frac.is_empty() { "" } else { int };

        let units = quantity.units.as_str();
        let mut out = String::new();
        if mantissa.is_negative() {
            out.push_str(&self.minus_sign);
        }
        out.push_str(int);

        match sf {
            Some(sf) => {
                out.push_str(&self.map_sf.glyph(sf));
                if self.show_units {
                    out.push_str(units);
                }
            }
            None if self.show_units && !units.is_empty() => out.push_str(units),
            None => {
                if !(self.strip_code && frac.is_empty()) {
                    match units {
                        "" => out.push(self.units_to_rkm_base_code.unitless_code()),
                        units => match self.units_to_rkm_base_code.get(units) {
                            Some(code) => out.push(code),
                            None => out.push_str(units),
                        },
                    }
                }
            }
        }
        out.push_str(&frac);
        Ok(out)
    }
}

/// Pick the scale factor and round the mantissa
///
/// Returns the scale factor, the rounded mantissa and, at a fixed
/// precision, the number of decimals to pad the mantissa to.
fn scale(
    value: &Number,
    available: &[ScaleFactor],
    digits: Option<usize>,
) -> Result<(Option<ScaleFactor>, Number, Option<usize>), FormatError> {
    let shift = |sf: Option<ScaleFactor>| -sf.map_or(0, |sf| sf.exponent());

    let Some(n) = digits else {
        let sf = ScaleFactor::choose(value, available);
        let mantissa = in_range(value.scale_pow10(shift(sf))?)?;
        return Ok((sf, mantissa, None));
    };

    // Round first so 999.96 at three digits moves up to 1.00k
    let rounded = value.round_sigfigs(n);
    let sf = ScaleFactor::choose(&rounded, available);
    let mantissa = in_range(rounded.scale_pow10(shift(sf))?)?;

    if mantissa.abs() >= Number::from_i64(1) {
        let int_len = mantissa.decimal_parts().msd_exponent().unsigned_abs() + 1;
        Ok((sf, mantissa, Some(n.saturating_sub(int_len))))
    } else {
        // The leading zero counts as a digit
        let decimals = n - 1;
        let mantissa = value.scale_pow10(shift(sf))?.round_at(-(decimals as isize));
        Ok((sf, mantissa, Some(decimals)))
    }
}

fn in_range(mantissa: Number) -> Result<Number, FormatError> {
    let parts = mantissa.decimal_parts();
    let exponent = parts.msd_exponent();
    if !parts.is_zero() && !(-MAX_MANTISSA_EXPONENT..=MAX_MANTISSA_EXPONENT).contains(&exponent) {
        return Err(FormatError::OutOfRange(mantissa.to_sci()));
    }
    Ok(mantissa)
}
