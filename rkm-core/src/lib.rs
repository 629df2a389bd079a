//! RKM Core - Fundamental types
//!
//! This crate provides the numeric types shared by the RKM code crates:
//! - `Number`: Exact decimal magnitudes
//! - `ScaleFactor`: SI scale factors (`k`, `M`, `μ`, ...)
//! - `Quantity`: A magnitude with scale factor and units

mod number;
mod scale;
mod quantity;
mod error;

pub use number::{Number, DecimalParts};
pub use scale::{ScaleFactor, DEFAULT_OUTPUT_SF};
pub use quantity::Quantity;
pub use error::CoreError;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Number, ScaleFactor, Quantity, CoreError};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    mod number_tests {
        use super::*;

        #[test]
        fn test_from_i64() {
            let n = Number::from_i64(42);
            assert_eq!(n.to_string(), "42");
            assert!(!n.is_negative());
        }

        #[test]
        fn test_from_str_decimal() {
            let n = Number::from_str("4.7").unwrap();
            let parts = n.decimal_parts();
            assert_eq!(parts.digits, "47");
            assert_eq!(parts.exponent, -1);
        }

        #[test]
        fn test_from_str_leading_point() {
            let n = Number::from_str(".47").unwrap();
            assert_eq!(n.to_string(), "0.47");
            let n = Number::from_str("47.").unwrap();
            assert_eq!(n.to_string(), "47");
        }

        #[test]
        fn test_from_str_scientific() {
            let n = Number::from_str("470e-3").unwrap();
            assert_eq!(n, Number::from_str("0.47").unwrap());

            let n = Number::from_str("1.5E3").unwrap();
            assert_eq!(n.to_string(), "1500");
        }

        #[test]
        fn test_from_str_invalid() {
            assert!(Number::from_str("").is_err());
            assert!(Number::from_str(".").is_err());
            assert!(Number::from_str("4k7").is_err());
            assert!(Number::from_str("1e").is_err());
            assert!(Number::from_str("--1").is_err());
        }

        #[test]
        fn test_equality_ignores_trailing_zeros() {
            assert_eq!(Number::from_str("4.70").unwrap(), Number::from_str("4.7").unwrap());
            assert_eq!(Number::from_str("-0").unwrap(), Number::zero());
        }

        #[test]
        fn test_from_f64_shortest() {
            let n = Number::from_f64(0.1).unwrap();
            assert_eq!(n.to_string(), "0.1");

            let n = Number::from_f64(4700.0).unwrap();
            assert_eq!(n, Number::from_i64(4700));

            assert!(matches!(Number::from_f64(f64::NAN), Err(CoreError::NotFinite(_))));
            assert!(Number::from_f64(f64::INFINITY).is_err());
        }

        #[test]
        fn test_to_f64() {
            let n = Number::from_str("-2.5e-12").unwrap();
            assert_eq!(n.to_f64(), Some(-2.5e-12));
        }

        #[test]
        fn test_scale_pow10() {
            let n = Number::from_str("4.7").unwrap();
            assert_eq!(n.scale_pow10(3).unwrap().to_string(), "4700");
            assert_eq!(n.scale_pow10(-3).unwrap().to_string(), "0.0047");
        }

        #[test]
        fn test_scale_pow10_overflow() {
            let n = Number::from_str("1e-9223372036854775807").unwrap();
            assert!(matches!(n.scale_pow10(-18), Err(CoreError::ExponentOverflow(_))));
            assert!(n.scale_pow10(18).is_ok());
        }

        #[test]
        fn test_from_str_exponent_overflow() {
            // the fraction digit pushes the exponent below isize::MIN
            assert!(matches!(
                Number::from_str("1.5e-9223372036854775808"),
                Err(CoreError::InvalidNumber(_))
            ));
            assert!(Number::from_str("1e-9223372036854775808").is_ok());
        }

        #[test]
        fn test_to_sci() {
            assert_eq!(Number::from_str("-4700").unwrap().to_sci(), "-4.7e3");
            assert_eq!(Number::from_str("0.005").unwrap().to_sci(), "5e-3");
        }

        #[test]
        fn test_neg_and_abs() {
            let n = Number::from_str("2.5").unwrap();
            assert!(n.neg().is_negative());
            assert_eq!(n.neg().abs(), n);
        }

        #[test]
        fn test_round_sigfigs() {
            let n = Number::from_str("4.749").unwrap();
            assert_eq!(n.round_sigfigs(2).to_string(), "4.7");
            assert_eq!(n.round_sigfigs(3).to_string(), "4.75");

            let n = Number::from_str("9.96").unwrap();
            assert_eq!(n.round_sigfigs(2).to_string(), "10");

            let n = Number::from_str("-47300").unwrap();
            assert_eq!(n.round_sigfigs(2).to_string(), "-47000");

            // nothing to drop
            let n = Number::from_str("4.7").unwrap();
            assert_eq!(n.round_sigfigs(6), n);
        }

        #[test]
        fn test_round_half_even() {
            assert_eq!(Number::from_str("2.25").unwrap().round_sigfigs(2).to_string(), "2.2");
            assert_eq!(Number::from_str("2.35").unwrap().round_sigfigs(2).to_string(), "2.4");
            assert_eq!(Number::from_str("2.251").unwrap().round_sigfigs(2).to_string(), "2.3");
            assert_eq!(Number::from_str("-2.25").unwrap().round_sigfigs(2).to_string(), "-2.2");
        }

        #[test]
        fn test_round_at() {
            let n = Number::from_str("0.00047").unwrap();
            assert_eq!(n.round_at(-4).to_string(), "0.0005");
            assert_eq!(n.round_at(-3), Number::zero());

            let n = Number::from_str("47.3").unwrap();
            assert_eq!(n.round_at(0).to_string(), "47");
            assert_eq!(n.round_at(-4), n);

            // far above the most significant digit
            let n = Number::from_str("0.6").unwrap();
            assert_eq!(n.round_at(0).to_string(), "1");
            assert_eq!(n.round_at(1), Number::zero());
            assert_eq!(n.round_at(isize::MAX), Number::zero());
        }

        #[test]
        fn test_ordering() {
            let a = Number::from_str("0.47").unwrap();
            let b = Number::from_str("4.7").unwrap();
            assert!(a < b);
            assert!(b.neg() < a);
        }

        #[test]
        fn test_serde_as_string() {
            let n = Number::from_str("4.7").unwrap();
            let json = serde_json::to_string(&n).unwrap();
            assert_eq!(json, "\"4.7\"");
            let back: Number = serde_json::from_str(&json).unwrap();
            assert_eq!(back, n);
        }
    }

    mod quantity_tests {
        use super::*;

        #[test]
        fn test_value_applies_scale_factor() {
            let q = Quantity::new(Number::from_str("2.5").unwrap(), Some(ScaleFactor::Nano), "A");
            assert_eq!(q.value().unwrap(), Number::from_str("2.5e-9").unwrap());
        }

        #[test]
        fn test_normalized() {
            let q = Quantity::new(Number::from_str("4700").unwrap(), Some(ScaleFactor::Giga), "Ω");
            let n = q.normalized(&ScaleFactor::parse_set(DEFAULT_OUTPUT_SF).unwrap()).unwrap();
            assert_eq!(n.magnitude, Number::from_str("4.7").unwrap());
            assert_eq!(n.scale_factor, Some(ScaleFactor::Tera));
            assert_eq!(n, q);
        }

        #[test]
        fn test_builders() {
            let q = Quantity::unitless(Number::from_i64(200)).with_units("A");
            assert_eq!(q.to_string(), "200 A");
        }

        #[test]
        fn test_serde_roundtrip() {
            let q = Quantity::new(Number::from_str("4.7").unwrap(), Some(ScaleFactor::Kilo), "Ω");
            let json = serde_json::to_string(&q).unwrap();
            assert!(json.contains("\"scale_factor\":\"k\""), "{}", json);
            let back: Quantity = serde_json::from_str(&json).unwrap();
            assert_eq!(back, q);
        }
    }
}
