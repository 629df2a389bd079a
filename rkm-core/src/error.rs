//! Errors raised while building numbers and quantities

use thiserror::Error;

/// Error type for number, scale factor and quantity construction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("Invalid number format: {0}")]
    InvalidNumber(String),

    #[error("Not a finite number: {0}")]
    NotFinite(f64),

    #[error("Unknown scale factor: '{0}'")]
    UnknownScaleFactor(char),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Exponent out of range scaling {0}")]
    ExponentOverflow(String),
}
