//! Wasted space accounting for eip4844 blob payloads.
//!
//! A payload is handed over as the hex string shown by block explorers (`0x` followed by two
//! digits per byte). The calculator counts `'0'` digits and reports how much of the payload is
//! zero filled.
//!
//! By default the counts are taken over the whole string with a fixed offset of 2 for the prefix,
//! which also drops the `'0'` of `0x` from the non-zero count. [`PrefixMode::Corrected`] strips
//! the prefix before counting instead.

use alloy_eips::eip4844::BYTES_PER_BLOB;
use serde::{Deserialize, Serialize};

/// Length of the `0x` marker in front of the hex digits.
pub const HEX_PREFIX_LEN: usize = 2;

/// Max number of hex digits a single blob can be encoded to.
pub const MAX_HEX_DIGITS_PER_BLOB: usize = BYTES_PER_BLOB * 2;

/// Errors for this crate.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// nothing to analyze
    #[error("no blob data provided")]
    Empty,
    /// fewer than two hex digits once the prefix is accounted for, so not a single byte
    #[error("blob data too short to analyze: {len} characters")]
    TooShort {
        /// number of characters in the input
        len: usize,
    },
    /// strict validation: input does not start with `0x`
    #[error("blob data must start with 0x")]
    MissingPrefix,
    /// strict validation: non hex character in the digit body
    #[error("invalid hex digit {character:?} at position {position}")]
    InvalidHexDigit {
        /// the offending character
        character: char,
        /// character offset in the input, prefix included
        position: usize,
    },
    /// strict validation: a byte is made of two digits
    #[error("odd number of hex digits: {0}")]
    OddDigitCount(usize),
}

/// How the two character prefix is taken out of the counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefixMode {
    /// Subtract 2 from the raw character counts. The `'0'` of `0x` is removed along with the
    /// zero digits, so the non-zero count comes out one short.
    #[default]
    Compat,
    /// Strip a leading `0x`/`0X` and count the digit body only.
    Corrected,
}

/// Input validation applied before counting.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validation {
    /// Any string is accepted, only characters are counted.
    #[default]
    Permissive,
    /// Require the `0x` prefix and an even number of hex digits.
    Strict,
}

/// Options for [`compute_with`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CalcOptions {
    /// Prefix handling.
    pub prefix_mode: PrefixMode,
    /// Input validation.
    pub validation: Validation,
}

/// Wasted space metrics of one blob payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WastedSpaceReport {
    /// Payload size in bytes.
    pub blob_length_bytes: u64,
    /// Number of zero bytes.
    pub zero_bytes: u64,
    /// Share of non-zero digits, in percent with two decimals.
    pub used_percentage: f64,
    /// Share of zero digits, in percent with two decimals. Rounded independently of
    /// `used_percentage`, so the two do not always add up to exactly 100.
    pub wasted_percentage: f64,
    /// Number of hex digits the metrics are based on.
    pub hex_digit_count: u64,
    /// Number of non-zero digits. Goes negative for an all zero payload in
    /// [`PrefixMode::Compat`].
    pub non_zero_digit_count: i64,
}

impl WastedSpaceReport {
    /// True if the payload is larger than a single eip4844 blob.
    pub const fn exceeds_blob_capacity(&self) -> bool {
        self.blob_length_bytes > BYTES_PER_BLOB as u64
    }
}

/// Compute the wasted space report of `blob_hex` with the default options.
pub fn compute(blob_hex: &str) -> Result<WastedSpaceReport, Error> {
    compute_with(blob_hex, CalcOptions::default())
}

/// Compute the wasted space report of `blob_hex`.
pub fn compute_with(blob_hex: &str, options: CalcOptions) -> Result<WastedSpaceReport, Error> {
    if blob_hex.is_empty() {
        return Err(Error::Empty);
    }

    if options.validation == Validation::Strict {
        validate_strict(blob_hex)?;
    }

    let (hex_digit_count, non_zero_digit_count) = match options.prefix_mode {
        PrefixMode::Compat => {
            let total = blob_hex.chars().count() as i64;
            let non_zero = blob_hex.chars().filter(|c| *c != '0').count() as i64;
            (total - HEX_PREFIX_LEN as i64, non_zero - HEX_PREFIX_LEN as i64)
        }
        PrefixMode::Corrected => {
            let body = strip_hex_prefix(blob_hex);
            let total = body.chars().count() as i64;
            let non_zero = body.chars().filter(|c| *c != '0').count() as i64;
            (total, non_zero)
        }
    };

    if hex_digit_count / 2 == 0 {
        return Err(Error::TooShort { len: blob_hex.chars().count() });
    }

    // Always >= 0: the difference is the number of '0' characters removed.
    let zero_digit_count = hex_digit_count - non_zero_digit_count;

    Ok(WastedSpaceReport {
        blob_length_bytes: (hex_digit_count / 2) as u64,
        zero_bytes: (zero_digit_count / 2) as u64,
        used_percentage: percentage(non_zero_digit_count, hex_digit_count),
        wasted_percentage: percentage(zero_digit_count, hex_digit_count),
        hex_digit_count: hex_digit_count as u64,
        non_zero_digit_count,
    })
}

/// Remove a leading `0x` or `0X`, if any.
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}

fn validate_strict(blob_hex: &str) -> Result<(), Error> {
    let body = blob_hex.strip_prefix("0x").ok_or(Error::MissingPrefix)?;

    let mut digits = 0;
    for (i, character) in body.chars().enumerate() {
        if !character.is_ascii_hexdigit() {
            return Err(Error::InvalidHexDigit { character, position: i + HEX_PREFIX_LEN });
        }
        digits += 1;
    }

    if digits % 2 != 0 {
        return Err(Error::OddDigitCount(digits));
    }

    Ok(())
}

/// `part / whole * 100`, rounded half away from zero to two decimals.
fn percentage(part: i64, whole: i64) -> f64 {
    let ratio = part as f64 / whole as f64;
    // adding 0.0 turns -0.0 into 0.0
    (ratio * 100.0 * 100.0).round() / 100.0 + 0.0
}
