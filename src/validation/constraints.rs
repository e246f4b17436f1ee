//! Reusable field predicates for [`Validate`](super::Validate)
//! implementations.

/// True when `port` is a bindable TCP/UDP port (1..=65535).
///
/// Ports are carried as `u32` so that out-of-range integers survive decode
/// and are reported here instead of as a type error.
pub fn in_port_range(port: u32) -> bool {
    (1..=65535).contains(&port)
}

/// True when `value` meets the inclusive minimum `floor`. Works for plain
/// integers as well as [`Duration`](crate::units::Duration) and
/// [`Size`](crate::units::Size), whose orderings are unit-normalized.
pub fn at_least<T: PartialOrd>(value: T, floor: T) -> bool {
    value >= floor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{Duration, Size};

    #[test]
    fn test_port_range_boundaries() {
        assert!(!in_port_range(0));
        assert!(in_port_range(1));
        assert!(in_port_range(65535));
        assert!(!in_port_range(65536));
        assert!(!in_port_range(99999));
    }

    #[test]
    fn test_at_least() {
        assert!(at_least(2, 2));
        assert!(!at_least(1, 2));
        assert!(at_least(Duration::seconds(1), Duration::milliseconds(1)));
        assert!(!at_least(Size::bytes(64), Size::kibibytes(1)));
    }
}
