use core::fmt;

/// Errors reported by the availability-map operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    /// The requested range was empty or inverted (`start >= end`), or an
    /// inserted range overlaps a tracked segment.
    InvalidRange,
    /// The map has no room left for the segment a split or insert requires.
    CapacityExceeded,
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::InvalidRange => f.write_str("invalid physical range"),
            MapError::CapacityExceeded => f.write_str("availability map capacity exceeded"),
        }
    }
}
