use core::fmt;
use core::ops::{Add, AddAssign, Sub};

/// A physical memory address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PhysAddr(usize);

impl PhysAddr {
    pub const fn new(val: usize) -> Self {
        Self(val)
    }

    pub const fn as_usize(self) -> usize {
        self.0
    }

    pub const fn as_u64(self) -> u64 {
        self.0 as u64
    }

    pub const fn checked_add(self, offset: usize) -> Option<Self> {
        match self.0.checked_add(offset) {
            Some(val) => Some(Self(val)),
            None => None,
        }
    }

    pub const fn align_down(self, align: usize) -> Self {
        Self(num_utils::align_down(self.0, align))
    }

    pub const fn align_up(self, align: usize) -> Self {
        Self(num_utils::align_up(self.0, align))
    }

    /// Rounds up to `align`, or returns `None` if the rounded address does
    /// not fit the address type.
    pub const fn checked_align_up(self, align: usize) -> Option<Self> {
        match self.checked_add(align - 1) {
            Some(addr) => Some(addr.align_down(align)),
            None => None,
        }
    }
}

impl Add<usize> for PhysAddr {
    type Output = PhysAddr;

    fn add(self, rhs: usize) -> Self {
        Self(self.0 + rhs)
    }
}

impl AddAssign<usize> for PhysAddr {
    fn add_assign(&mut self, rhs: usize) {
        self.0 += rhs;
    }
}

impl Sub<PhysAddr> for PhysAddr {
    type Output = usize;

    fn sub(self, rhs: PhysAddr) -> usize {
        self.0 - rhs.0
    }
}

impl fmt::Display for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#012x}", self.0)
    }
}
