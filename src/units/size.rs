//! Byte size values with an explicit unit.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{split_literal, UnitParseError};

/// Supported size units. All multiples are binary (1 KiB = 1024 bytes);
/// decimal spellings (`KB`, `MB`, ...) parse as their binary counterparts,
/// matching the usual configuration-file convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeUnit {
    /// Bytes (`B`).
    Bytes,
    /// Kibibytes (`KiB`, 1024 bytes).
    Kibibytes,
    /// Mebibytes (`MiB`).
    Mebibytes,
    /// Gibibytes (`GiB`).
    Gibibytes,
    /// Tebibytes (`TiB`).
    Tebibytes,
}

impl SizeUnit {
    /// Bytes per one of this unit.
    const fn bytes(self) -> u128 {
        match self {
            Self::Bytes => 1,
            Self::Kibibytes => 1 << 10,
            Self::Mebibytes => 1 << 20,
            Self::Gibibytes => 1 << 30,
            Self::Tebibytes => 1 << 40,
        }
    }

    /// Canonical literal suffix for this unit.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Bytes => "B",
            Self::Kibibytes => "KiB",
            Self::Mebibytes => "MiB",
            Self::Gibibytes => "GiB",
            Self::Tebibytes => "TiB",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.to_ascii_lowercase().as_str() {
            "b" => Some(Self::Bytes),
            "k" | "kb" | "kib" => Some(Self::Kibibytes),
            "m" | "mb" | "mib" => Some(Self::Mebibytes),
            "g" | "gb" | "gib" => Some(Self::Gibibytes),
            "t" | "tb" | "tib" => Some(Self::Tebibytes),
            _ => None,
        }
    }
}

/// An immutable byte size: a non-negative magnitude plus a [`SizeUnit`].
///
/// Equality, ordering, and hashing operate on the normalized byte value;
/// conversions to a coarser unit floor the result.
#[derive(Debug, Clone, Copy)]
pub struct Size {
    quantity: u64,
    unit: SizeUnit,
}

impl Size {
    /// Create a size from a magnitude and unit.
    pub const fn new(quantity: u64, unit: SizeUnit) -> Self {
        Self { quantity, unit }
    }

    /// A size in bytes.
    pub const fn bytes(quantity: u64) -> Self {
        Self::new(quantity, SizeUnit::Bytes)
    }

    /// A size in kibibytes.
    pub const fn kibibytes(quantity: u64) -> Self {
        Self::new(quantity, SizeUnit::Kibibytes)
    }

    /// A size in mebibytes.
    pub const fn mebibytes(quantity: u64) -> Self {
        Self::new(quantity, SizeUnit::Mebibytes)
    }

    /// A size in gibibytes.
    pub const fn gibibytes(quantity: u64) -> Self {
        Self::new(quantity, SizeUnit::Gibibytes)
    }

    /// The magnitude in the unit this size was expressed in.
    pub const fn quantity(&self) -> u64 {
        self.quantity
    }

    /// The unit this size was expressed in.
    pub const fn unit(&self) -> SizeUnit {
        self.unit
    }

    /// Normalized value in bytes. Computed in `u128`, cannot overflow.
    pub fn to_bytes(&self) -> u128 {
        u128::from(self.quantity) * self.unit.bytes()
    }

    /// Convert to `unit`, flooring any fractional remainder. Saturates at
    /// `u64::MAX`.
    pub fn to_unit(&self, unit: SizeUnit) -> u64 {
        u64::try_from(self.to_bytes() / unit.bytes()).unwrap_or(u64::MAX)
    }

    /// Convert to whole kibibytes, flooring.
    pub fn to_kibibytes(&self) -> u64 {
        self.to_unit(SizeUnit::Kibibytes)
    }

    /// Convert to whole mebibytes, flooring.
    pub fn to_mebibytes(&self) -> u64 {
        self.to_unit(SizeUnit::Mebibytes)
    }
}

impl FromStr for Size {
    type Err = UnitParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (quantity, suffix) = split_literal(input)?;
        let unit = SizeUnit::from_suffix(suffix)
            .ok_or_else(|| UnitParseError::UnknownSuffix(suffix.to_string()))?;
        Ok(Self { quantity, unit })
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.quantity, self.unit.suffix())
    }
}

impl PartialEq for Size {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for Size {}

impl PartialOrd for Size {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Size {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

impl Hash for Size {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}

impl Serialize for Size {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Size {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let literal = String::deserialize(deserializer)?;
        literal.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_literals() {
        assert_eq!("512B".parse::<Size>().unwrap(), Size::bytes(512));
        assert_eq!("8KiB".parse::<Size>().unwrap(), Size::kibibytes(8));
        assert_eq!("8KB".parse::<Size>().unwrap(), Size::kibibytes(8));
        assert_eq!("32 MiB".parse::<Size>().unwrap(), Size::mebibytes(32));
        assert_eq!("2gb".parse::<Size>().unwrap(), Size::gibibytes(2));
    }

    #[test]
    fn test_parse_rejects_malformed_literals() {
        assert!(matches!(
            "lots".parse::<Size>(),
            Err(UnitParseError::MalformedMagnitude(_))
        ));
        assert!(matches!(
            "8QiB".parse::<Size>(),
            Err(UnitParseError::UnknownSuffix(_))
        ));
        assert!(matches!(
            "8".parse::<Size>(),
            Err(UnitParseError::UnknownSuffix(_))
        ));
    }

    #[test]
    fn test_comparison_normalizes_units() {
        assert_eq!(Size::kibibytes(1), Size::bytes(1024));
        assert_eq!(Size::mebibytes(1), Size::kibibytes(1024));
        assert!(Size::bytes(1025) > Size::kibibytes(1));
        assert!(Size::kibibytes(8) < Size::mebibytes(1));
    }

    #[test]
    fn test_conversion_floors() {
        // 1500 bytes is 1.46 KiB; the floor policy yields 1.
        assert_eq!(Size::bytes(1500).to_kibibytes(), 1);
        assert_eq!(Size::bytes(1023).to_kibibytes(), 0);
        assert_eq!(Size::kibibytes(1536).to_mebibytes(), 1);
        assert_eq!(Size::mebibytes(2).to_kibibytes(), 2048);
    }

    #[test]
    fn test_display_uses_canonical_suffix() {
        assert_eq!(Size::bytes(512).to_string(), "512B");
        assert_eq!(Size::kibibytes(8).to_string(), "8KiB");
        assert_eq!("8kb".parse::<Size>().unwrap().to_string(), "8KiB");
    }

    #[test]
    fn test_serde_round_trip() {
        let yaml = serde_yaml::to_string(&Size::kibibytes(32)).unwrap();
        assert_eq!(yaml.trim(), "32KiB");
        let back: Size = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, Size::kibibytes(32));
    }
}
