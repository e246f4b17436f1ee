//! Duration values with an explicit time unit.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{split_literal, UnitParseError};

/// Supported time units, finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    /// Nanoseconds (`ns`).
    Nanoseconds,
    /// Microseconds (`us`).
    Microseconds,
    /// Milliseconds (`ms`).
    Milliseconds,
    /// Seconds (`s`).
    Seconds,
    /// Minutes (`m`).
    Minutes,
    /// Hours (`h`).
    Hours,
    /// Days (`d`).
    Days,
}

impl TimeUnit {
    /// Nanoseconds per one of this unit.
    const fn nanos(self) -> u128 {
        match self {
            Self::Nanoseconds => 1,
            Self::Microseconds => 1_000,
            Self::Milliseconds => 1_000_000,
            Self::Seconds => 1_000_000_000,
            Self::Minutes => 60 * 1_000_000_000,
            Self::Hours => 3600 * 1_000_000_000,
            Self::Days => 86_400 * 1_000_000_000,
        }
    }

    /// Canonical literal suffix for this unit.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Nanoseconds => "ns",
            Self::Microseconds => "us",
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
            Self::Minutes => "m",
            Self::Hours => "h",
            Self::Days => "d",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "ns" => Some(Self::Nanoseconds),
            "us" => Some(Self::Microseconds),
            "ms" => Some(Self::Milliseconds),
            "s" => Some(Self::Seconds),
            "m" => Some(Self::Minutes),
            "h" => Some(Self::Hours),
            "d" => Some(Self::Days),
            _ => None,
        }
    }
}

/// An immutable duration: a non-negative magnitude plus a [`TimeUnit`].
///
/// Equality, ordering, and hashing operate on the normalized nanosecond
/// value, so durations expressed in different units compare correctly.
#[derive(Debug, Clone, Copy)]
pub struct Duration {
    quantity: u64,
    unit: TimeUnit,
}

impl Duration {
    /// Create a duration from a magnitude and unit.
    pub const fn new(quantity: u64, unit: TimeUnit) -> Self {
        Self { quantity, unit }
    }

    /// A duration in nanoseconds.
    pub const fn nanoseconds(quantity: u64) -> Self {
        Self::new(quantity, TimeUnit::Nanoseconds)
    }

    /// A duration in microseconds.
    pub const fn microseconds(quantity: u64) -> Self {
        Self::new(quantity, TimeUnit::Microseconds)
    }

    /// A duration in milliseconds.
    pub const fn milliseconds(quantity: u64) -> Self {
        Self::new(quantity, TimeUnit::Milliseconds)
    }

    /// A duration in seconds.
    pub const fn seconds(quantity: u64) -> Self {
        Self::new(quantity, TimeUnit::Seconds)
    }

    /// A duration in minutes.
    pub const fn minutes(quantity: u64) -> Self {
        Self::new(quantity, TimeUnit::Minutes)
    }

    /// A duration in hours.
    pub const fn hours(quantity: u64) -> Self {
        Self::new(quantity, TimeUnit::Hours)
    }

    /// A duration in days.
    pub const fn days(quantity: u64) -> Self {
        Self::new(quantity, TimeUnit::Days)
    }

    /// The magnitude in the unit this duration was expressed in.
    pub const fn quantity(&self) -> u64 {
        self.quantity
    }

    /// The unit this duration was expressed in.
    pub const fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Normalized value in nanoseconds. Computed in `u128`, cannot overflow.
    pub fn to_nanoseconds(&self) -> u128 {
        u128::from(self.quantity) * self.unit.nanos()
    }

    /// Convert to `unit`, flooring any fractional remainder. Saturates at
    /// `u64::MAX`.
    pub fn to_unit(&self, unit: TimeUnit) -> u64 {
        u64::try_from(self.to_nanoseconds() / unit.nanos()).unwrap_or(u64::MAX)
    }

    /// Convert to whole milliseconds, flooring.
    pub fn to_milliseconds(&self) -> u64 {
        self.to_unit(TimeUnit::Milliseconds)
    }

    /// Convert to whole seconds, flooring.
    pub fn to_seconds(&self) -> u64 {
        self.to_unit(TimeUnit::Seconds)
    }

    /// The equivalent [`std::time::Duration`].
    pub fn as_std(&self) -> std::time::Duration {
        let nanos = self.to_nanoseconds();
        let secs = u64::try_from(nanos / 1_000_000_000).unwrap_or(u64::MAX);
        // Remainder of a division by 1e9 always fits in u32.
        let subsec = u32::try_from(nanos % 1_000_000_000).unwrap_or(0);
        std::time::Duration::new(secs, subsec)
    }
}

impl FromStr for Duration {
    type Err = UnitParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (quantity, suffix) = split_literal(input)?;
        let unit = TimeUnit::from_suffix(suffix)
            .ok_or_else(|| UnitParseError::UnknownSuffix(suffix.to_string()))?;
        Ok(Self { quantity, unit })
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.quantity, self.unit.suffix())
    }
}

impl PartialEq for Duration {
    fn eq(&self, other: &Self) -> bool {
        self.to_nanoseconds() == other.to_nanoseconds()
    }
}

impl Eq for Duration {}

impl PartialOrd for Duration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Duration {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_nanoseconds().cmp(&other.to_nanoseconds())
    }
}

impl Hash for Duration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_nanoseconds().hash(state);
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Duration {
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
        assert_eq!("30s".parse::<Duration>().unwrap(), Duration::seconds(30));
        assert_eq!(
            "100ms".parse::<Duration>().unwrap(),
            Duration::milliseconds(100)
        );
        assert_eq!("2h".parse::<Duration>().unwrap(), Duration::hours(2));
        assert_eq!("1 d".parse::<Duration>().unwrap(), Duration::days(1));
        assert_eq!("0ns".parse::<Duration>().unwrap(), Duration::nanoseconds(0));
    }

    #[test]
    fn test_parse_rejects_malformed_literals() {
        assert!(matches!(
            "abc".parse::<Duration>(),
            Err(UnitParseError::MalformedMagnitude(_))
        ));
        assert!(matches!(
            "30fortnights".parse::<Duration>(),
            Err(UnitParseError::UnknownSuffix(_))
        ));
        assert!(matches!(
            "30".parse::<Duration>(),
            Err(UnitParseError::UnknownSuffix(_))
        ));
        assert!(matches!(
            "".parse::<Duration>(),
            Err(UnitParseError::EmptyInput)
        ));
    }

    #[test]
    fn test_comparison_normalizes_units() {
        assert_eq!(Duration::seconds(30), Duration::milliseconds(30_000));
        assert_eq!(Duration::minutes(2), Duration::seconds(120));
        assert!(Duration::seconds(1) > Duration::milliseconds(999));
        assert!(Duration::milliseconds(1) < Duration::seconds(1));
        assert!(Duration::days(1) == Duration::hours(24));
    }

    #[test]
    fn test_conversion_floors() {
        assert_eq!(Duration::milliseconds(1500).to_seconds(), 1);
        assert_eq!(Duration::milliseconds(999).to_seconds(), 0);
        assert_eq!(Duration::seconds(90).to_unit(TimeUnit::Minutes), 1);
        assert_eq!(Duration::seconds(5).to_milliseconds(), 5000);
    }

    #[test]
    fn test_display_uses_canonical_suffix() {
        assert_eq!(Duration::seconds(30).to_string(), "30s");
        assert_eq!(Duration::milliseconds(5).to_string(), "5ms");
        assert_eq!(Duration::days(7).to_string(), "7d");
    }

    #[test]
    fn test_as_std() {
        assert_eq!(
            Duration::milliseconds(1500).as_std(),
            std::time::Duration::from_millis(1500)
        );
        assert_eq!(
            Duration::seconds(30).as_std(),
            std::time::Duration::from_secs(30)
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let yaml = serde_yaml::to_string(&Duration::seconds(30)).unwrap();
        assert_eq!(yaml.trim(), "30s");
        let back: Duration = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, Duration::seconds(30));
    }
}
