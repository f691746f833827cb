use arrayvec::ArrayVec;

use crate::err::MapError;
use crate::types::PhysAddr;

/// A half-open range `[start, end)` of available physical memory.
///
/// Segments tracked by an [`AvailMap`] always have positive length; a
/// zero-length segment is removed, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: PhysAddr,
    pub end: PhysAddr,
}

impl Segment {
    pub const fn new(start: PhysAddr, end: PhysAddr) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn contains(&self, addr: PhysAddr) -> bool {
        self.start <= addr && addr < self.end
    }

    pub fn intersects(&self, start: PhysAddr, end: PhysAddr) -> bool {
        self.start < end && self.end > start
    }
}

/// Relationship of a reservation span to the tracked segments.
///
/// Every possible topology falls into exactly one of these variants, so
/// `reserve` has no unclassified shapes left over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// The span misses every segment: it lies in the leading gap, in a hole
    /// between two segments, or at/past the last tracked end.
    Outside,
    /// The span lies strictly inside one segment; both trimmed halves of
    /// that segment survive the reservation.
    Splits(usize),
    /// The span intersects segments `first..=last`. The head segment may
    /// keep its left part, the tail segment its right part; everything in
    /// between is swallowed whole.
    Covers { first: usize, last: usize },
}

/// A fixed-capacity map of the physical address ranges still available for
/// use, maintained before any allocator exists.
///
/// Segments are kept sorted and non-overlapping (adjacent segments are
/// allowed but never merged), with at most `N` entries. All storage is
/// inline; no operation allocates.
///
/// The map is populated once from the firmware-reported memory ranges via
/// [`insert_range`](AvailMap::insert_range) and then refined by
/// [`reserve`](AvailMap::reserve) calls carving out the spans consumed by
/// the kernel image, boot modules and device windows.
#[derive(Debug, Clone)]
pub struct AvailMap<const N: usize> {
    segments: ArrayVec<Segment, N>,
}

impl<const N: usize> AvailMap<N> {
    /// Creates an empty map.
    pub const fn new() -> Self {
        Self {
            segments: ArrayVec::new_const(),
        }
    }

    /// Inserts a new available range at its sorted position.
    ///
    /// This is the boundary used by the platform code that walks the
    /// firmware memory descriptors; the descriptors themselves are not
    /// interpreted here. Fails with [`MapError::InvalidRange`] if the range
    /// is empty or overlaps a tracked segment, and with
    /// [`MapError::CapacityExceeded`] if the map is full. The map is
    /// unchanged on failure.
    pub fn insert_range(&mut self, start: PhysAddr, end: PhysAddr) -> Result<(), MapError> {
        if start >= end {
            return Err(MapError::InvalidRange);
        }

        let index = self
            .segments
            .iter()
            .position(|seg| seg.start >= end)
            .unwrap_or(self.segments.len());

        // Sortedness means only the immediate predecessor can overlap.
        if index > 0 && self.segments[index - 1].end > start {
            return Err(MapError::InvalidRange);
        }

        self.insert_at(index, Segment::new(start, end))
    }

    /// Removes `[start, end)` from availability.
    ///
    /// Every topological relationship between the span and the tracked
    /// segments is handled: spans falling entirely in a hole (or outside
    /// all segments) are no-ops, a span strictly inside a segment splits
    /// it, and spans crossing segment boundaries trim or delete every
    /// segment they touch.
    ///
    /// Fails with [`MapError::InvalidRange`] if `start >= end`, and with
    /// [`MapError::CapacityExceeded`] if a split needs a slot and the map
    /// is full; the map is unchanged on failure.
    pub fn reserve(&mut self, start: PhysAddr, end: PhysAddr) -> Result<(), MapError> {
        if start >= end {
            return Err(MapError::InvalidRange);
        }

        match self.classify(start, end) {
            Placement::Outside => {}
            Placement::Splits(index) => {
                let tail = Segment::new(end, self.segments[index].end);
                // Insert the tail first so a full map fails cleanly.
                self.insert_at(index + 1, tail)?;
                self.segments[index].end = start;
            }
            Placement::Covers { mut first, mut last } => {
                if self.segments[first].start < start {
                    // The head segment begins before the span; its left
                    // part stays available.
                    self.segments[first].end = start;
                    first += 1;
                }
                if last >= first && end < self.segments[last].end {
                    // The tail segment extends past the span; its right
                    // part stays available.
                    self.segments[last].start = end;
                    if last == first {
                        return Ok(());
                    }
                    last -= 1;
                }
                // Everything left in `first..=last` is fully covered.
                for _ in first..=last {
                    self.delete_at(first);
                }
            }
        }

        Ok(())
    }

    /// Returns the tracked segments in ascending address order.
    ///
    /// This is the read boundary handed to the virtual-memory subsystem
    /// once early boot is done refining the map.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns whether any tracked segment intersects `[start, end)`.
    pub fn intersects(&self, start: PhysAddr, end: PhysAddr) -> bool {
        self.segments.iter().any(|seg| seg.intersects(start, end))
    }

    /// Returns the total number of available bytes.
    pub fn total_len(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }

    /// Returns the largest tracked segment, if any.
    pub fn largest(&self) -> Option<Segment> {
        self.segments.iter().copied().max_by_key(Segment::len)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Classifies `[start, end)` against the tracked segments.
    ///
    /// Works by direct comparison on the segment fields; `first` is the
    /// lowest segment whose end lies past `start`, `last` the highest
    /// whose start lies below `end`.
    fn classify(&self, start: PhysAddr, end: PhysAddr) -> Placement {
        let Some(first) = self.segments.iter().position(|seg| seg.end > start) else {
            // At or past the last tracked end.
            return Placement::Outside;
        };

        let seg = self.segments[first];
        if end <= seg.start {
            // Leading gap or a hole between two segments.
            return Placement::Outside;
        }

        if start > seg.start && end < seg.end {
            return Placement::Splits(first);
        }

        let mut last = first;
        while last + 1 < self.segments.len() && self.segments[last + 1].start < end {
            last += 1;
        }

        Placement::Covers { first, last }
    }

    /// Shifts the segments at `index..` one slot right and stores `seg` at
    /// `index`. Fails without touching the map if it is full.
    fn insert_at(&mut self, index: usize, seg: Segment) -> Result<(), MapError> {
        self.segments
            .try_insert(index, seg)
            .map_err(|_| MapError::CapacityExceeded)
    }

    /// Removes the segment at `index`, shifting the segments after it one
    /// slot left.
    fn delete_at(&mut self, index: usize) -> Segment {
        self.segments.remove(index)
    }
}

impl<const N: usize> Default for AvailMap<N> {
    fn default() -> Self {
        Self::new()
    }
}
