//! Physical-memory availability map for early boot.
//!
//! Tracks the set of physical address ranges still available for use while
//! the kernel bootstraps, before any dynamic allocator exists. The map
//! starts out as the handful of large ranges reported by the firmware and
//! is refined by reservations carving out the kernel image, boot modules
//! and device-reserved windows. All storage is fixed-capacity and inline,
//! so the map can be maintained with no allocator at all.

#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![no_std]

#[cfg(test)]
extern crate std;

pub mod boot;
mod err;
mod map;
mod types;

pub use err::MapError;
pub use map::{AvailMap, Segment};
pub use types::PhysAddr;
