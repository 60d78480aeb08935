//! Phone number canonicalization for `TEL` lines.
//!
//! Produces an E.164-like `+<digits>` string:
//!
//! ```text
//! "+91 98765-43210"  → international, digits kept      → +919876543210
//! "0091 9876543210"  → "00" access code dropped         → +919876543210
//! "09876543210"      → trunk 0 dropped, 10 digits → +91 → +919876543210
//! "9876543210"       → 10 digits → +91                  → +919876543210
//! "123"              → 3 digits                          → ValidationError
//! "+09876543210"     → country code cannot start with 0  → ValidationError
//! ```
//!
//! Numbers written without an international prefix are national numbers of
//! the default country. Whatever the route, the final digit count must land
//! in 11..=15 and the country code must not start with 0.

use crate::error::ValidationError;

/// Country code applied to bare 10-digit national numbers.
pub const DEFAULT_COUNTRY_CODE: &str = "91";

const NATIONAL_DIGITS: usize = 10;
const MIN_DIGITS: usize = 11;
const MAX_DIGITS: usize = 15;

/// Normalize a raw phone number to `+<country><subscriber>`.
pub fn normalize(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

    let canonical = if trimmed.starts_with('+') {
        international(raw, digits)?
    } else if let Some(rest) = digits.strip_prefix("00") {
        international(raw, rest.to_string())?
    } else {
        let national = digits.strip_prefix('0').unwrap_or(&digits);
        if national.len() == NATIONAL_DIGITS {
            format!("{DEFAULT_COUNTRY_CODE}{national}")
        } else {
            national.to_string()
        }
    };

    if !(MIN_DIGITS..=MAX_DIGITS).contains(&canonical.len()) {
        return Err(ValidationError::PhoneNumber {
            field: "phone",
            value: raw.to_string(),
            digits: canonical.len(),
        });
    }
    Ok(format!("+{canonical}"))
}

/// Digits written after an international prefix begin with the country code.
fn international(raw: &str, digits: String) -> Result<String, ValidationError> {
    if digits.starts_with('0') {
        return Err(ValidationError::CountryCode {
            field: "phone",
            value: raw.to_string(),
        });
    }
    Ok(digits)
}
