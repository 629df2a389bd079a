//! Error types for RKM parsing, formatting and preferences

use rkm_core::CoreError;
use thiserror::Error;

/// Rejected preference values
///
/// Raised when an update is applied, so the store is never left holding an
/// invalid table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Scale factor for base code '{code}' must be a single character, got {value:?}")]
    MultiCharScaleFactor { code: char, value: String },

    #[error("Unknown scale factor {value:?} for base code '{code}'")]
    UnknownScaleFactor { code: char, value: String },

    #[error("Base code for units {units:?} must be a single character, got {value:?}")]
    InvalidBaseCode { units: String, value: String },

    #[error("Base code map key must be a single character, got {0:?}")]
    InvalidCodeKey(String),

    #[error("Unknown scale factor {0:?} in scale factor substitutions")]
    UnknownSubstitution(String),

    #[error("Minus sign must not be empty")]
    EmptyMinusSign,

    #[error("Minus sign {0:?} cannot be read back; use a symbol, \"n\" or \"m\"")]
    LetterMinusSign(String),

    #[error(transparent)]
    Precision(#[from] FormatError),

    #[error("Unknown output scale factor '{0}'")]
    UnknownOutputScaleFactor(char),

    #[error("Invalid preferences JSON: {0}")]
    Json(String),
}

/// Why a string is not an RKM code
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Empty RKM code")]
    Empty,

    #[error("RKM code has no digits: {0:?}")]
    NoDigits(String),

    #[error("Not an RKM code: {0:?}")]
    Malformed(String),

    #[error("Conflicting units in {code:?}: {inner:?} and {tail:?}")]
    ConflictingUnits { code: String, inner: String, tail: String },

    #[error("Unknown find mode {0:?}, expected \"ld\", \"td\" or \"\"")]
    UnknownFindMode(String),
}

/// Why a value cannot be rendered as an RKM code
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("Precision must be a positive number of digits, got {0}")]
    InvalidPrecision(i64),

    #[error("Not a number: {0:?}")]
    NotNumeric(String),

    #[error("Value {0} is out of range for an RKM code")]
    OutOfRange(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Top-level error returned by the public API
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RkmError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

impl From<CoreError> for RkmError {
    fn from(err: CoreError) -> Self {
        RkmError::Format(FormatError::Core(err))
    }
}

