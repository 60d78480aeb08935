//! Error taxonomy shared by every synthesis stage.
//!
//! | Error | Raised by | Caller action |
//! |---|---|---|
//! | [`ValidationError`] | design validation, phone normalization | fix the named field |
//! | [`EncodingError`] | payload encoder | supply the missing identity field |
//! | [`CapacityError`] | adaptive matrix encoder | shorten the record (e.g. notes) |
//!
//! Logo failures are deliberately absent: they are absorbed inside the
//! pipeline (see [`imaging::logo`](crate::imaging::logo)) and never reach the
//! caller.

use crate::matrix::EcLevel;
use thiserror::Error;

/// Result type for synthesis operations.
pub type Result<T> = std::result::Result<T, SynthesisError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field}: invalid color {value:?}, expected six hex digits such as \"#0f50b5\"")]
    InvalidColor { field: &'static str, value: String },
    #[error(
        "pattern_style: unknown style {0:?}, expected one of square, rounded, dots, circle, gapped, vertical, horizontal"
    )]
    UnknownPatternStyle(String),
    #[error("error_correction: unknown level {0:?}, expected one of L, M, Q, H")]
    UnknownErrorCorrection(String),
    #[error("box_size: must be between 1 and {max} pixels, got {value}")]
    BoxSize { value: u32, max: u32 },
    #[error("border: must be at most {max} modules, got {value}")]
    Border { value: u32, max: u32 },
    #[error(
        "canvas of {modules} modules with a {border}-module border at {box_size} px per module is too large"
    )]
    CanvasSize {
        modules: usize,
        border: u32,
        box_size: u32,
    },
    #[error("{field}: line breaks are not allowed in {value:?}")]
    LineBreak { field: &'static str, value: String },
    #[error("logo_size: must be strictly between 0 and 1, got {0}")]
    LogoSize(f32),
    #[error(
        "{field}: cannot normalize phone number {value:?} ({digits} digits after cleanup, expected 11 to 15)"
    )]
    PhoneNumber {
        field: &'static str,
        value: String,
        digits: usize,
    },
    #[error("{field}: phone number {value:?} has a country code starting with 0")]
    CountryCode { field: &'static str, value: String },
}

impl ValidationError {
    /// Re-attribute a phone error to the record field it came from.
    pub(crate) fn in_field(self, name: &'static str) -> Self {
        match self {
            Self::PhoneNumber { value, digits, .. } => Self::PhoneNumber {
                field: name,
                value,
                digits,
            },
            Self::CountryCode { value, .. } => Self::CountryCode { field: name, value },
            other => other,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("contact record is missing required field {0}")]
    MissingField(&'static str),
}

/// The payload did not fit any QR version at any level of the ladder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "payload of {payload_bytes} bytes does not fit a version 40 symbol at levels {tried:?} (last error: {last_error}); shorten the contact record"
)]
pub struct CapacityError {
    pub payload_bytes: usize,
    /// Levels attempted, strongest first.
    pub tried: Vec<EcLevel>,
    pub last_error: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthesisError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("cannot encode contact: {0}")]
    Encoding(#[from] EncodingError),
    #[error("{0}")]
    Capacity(#[from] CapacityError),
    #[error("PNG encoding failed: {0}")]
    Png(String),
}
