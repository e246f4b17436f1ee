//! Self-validating unit value types for configuration fields.
//!
//! [`Duration`] and [`Size`] pair an integer magnitude with an explicit unit
//! and parse from the compact literal form used in configuration files
//! (`30s`, `8KiB`). Comparisons normalize both operands to the finest
//! supported unit, so `Duration::seconds(30) == Duration::milliseconds(30_000)`.
//! Conversions to a coarser unit floor the result.

mod duration;
mod size;

pub use duration::{Duration, TimeUnit};
pub use size::{Size, SizeUnit};

use thiserror::Error;

/// Error produced when a unit literal cannot be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitParseError {
    /// The input was empty or all whitespace.
    #[error("empty unit value")]
    EmptyInput,

    /// The magnitude was missing or not an unsigned integer.
    #[error("malformed magnitude in {0:?}")]
    MalformedMagnitude(String),

    /// The unit suffix was missing or not recognized.
    #[error("unrecognized unit suffix {0:?}")]
    UnknownSuffix(String),
}

/// Split a unit literal into its magnitude and suffix parts.
///
/// Accepts optional whitespace between the digits and the suffix.
pub(crate) fn split_literal(input: &str) -> Result<(u64, &str), UnitParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UnitParseError::EmptyInput);
    }

    let split_at = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (digits, rest) = input.split_at(split_at);

    let magnitude: u64 = digits
        .parse()
        .map_err(|_| UnitParseError::MalformedMagnitude(input.to_string()))?;

    let suffix = rest.trim();
    if suffix.is_empty() {
        return Err(UnitParseError::UnknownSuffix(String::new()));
    }

    Ok((magnitude, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_literal() {
        assert_eq!(split_literal("30s"), Ok((30, "s")));
        assert_eq!(split_literal(" 8 KiB "), Ok((8, "KiB")));
        assert_eq!(split_literal(""), Err(UnitParseError::EmptyInput));
        assert_eq!(split_literal("   "), Err(UnitParseError::EmptyInput));
        assert!(matches!(
            split_literal("abc"),
            Err(UnitParseError::MalformedMagnitude(_))
        ));
        assert!(matches!(
            split_literal("-5s"),
            Err(UnitParseError::MalformedMagnitude(_))
        ));
        assert_eq!(
            split_literal("30"),
            Err(UnitParseError::UnknownSuffix(String::new()))
        );
    }
}
