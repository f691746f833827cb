//! Boot-time singleton maps.
//!
//! Early platform code populates these once from the firmware memory
//! descriptors and then carves out the kernel image, boot modules and
//! device windows as it discovers them. Callers are serialized by the boot
//! sequence itself; the cells only turn an accidental reentrant mutation
//! into a panic instead of silent corruption.

use atomic_refcell::{AtomicRef, AtomicRefCell};
use bitflags::bitflags;

use crate::err::MapError;
use crate::map::AvailMap;
use crate::types::PhysAddr;

/// Page size used when rounding reservations at the boot boundary.
pub const PAGE_SIZE: usize = 0x1000;

/// Maximum number of disjoint segments the platform is expected to report.
pub const PHYS_SEG_MAX: usize = 16;

/// The map type used by the boot-time singletons.
///
/// One slot on top of [`PHYS_SEG_MAX`] keeps a single split per
/// reservation from overflowing a fully populated map.
pub type BootMap = AvailMap<{ PHYS_SEG_MAX + 1 }>;

bitflags! {
    /// Selects which boot maps a reservation is carved out of.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExcludeFlags: u8 {
        /// The region must never be handed to the physical allocator.
        const NOALLOC = 1 << 0;
        /// The region must be skipped when writing a crash dump.
        const NODUMP = 1 << 1;
    }
}

static AVAIL: AtomicRefCell<BootMap> = AtomicRefCell::new(BootMap::new());
static DUMP_AVAIL: AtomicRefCell<BootMap> = AtomicRefCell::new(BootMap::new());

/// Populates both boot maps with the firmware-reported available ranges.
///
/// Called once by the platform code that walks the firmware memory
/// descriptors, before any reservation is made.
pub fn init(ranges: impl IntoIterator<Item = (PhysAddr, PhysAddr)>) -> Result<(), MapError> {
    let mut avail = AVAIL.borrow_mut();
    let mut dump_avail = DUMP_AVAIL.borrow_mut();

    for (start, end) in ranges {
        avail.insert_range(start, end)?;
        dump_avail.insert_range(start, end)?;
    }

    Ok(())
}

/// Rounds `[start, end)` outward to page boundaries and removes it from the
/// boot maps selected by `flags`.
///
/// On failure no map has changed, even when the reservation targets both.
pub fn reserve(start: PhysAddr, end: PhysAddr, flags: ExcludeFlags) -> Result<(), MapError> {
    reserve_in(
        &mut AVAIL.borrow_mut(),
        &mut DUMP_AVAIL.borrow_mut(),
        start,
        end,
        flags,
    )
}

fn reserve_in(
    avail: &mut BootMap,
    dump_avail: &mut BootMap,
    start: PhysAddr,
    end: PhysAddr,
    flags: ExcludeFlags,
) -> Result<(), MapError> {
    let (start, end) = page_span(start, end)?;

    log::debug!("reserving {start}-{end} ({flags:?})");

    // Stage on copies: a capacity failure in the second map must not leave
    // the first one already carved up.
    let mut new_avail = avail.clone();
    let mut new_dump_avail = dump_avail.clone();

    if flags.contains(ExcludeFlags::NOALLOC) {
        new_avail.reserve(start, end)?;
    }
    if flags.contains(ExcludeFlags::NODUMP) {
        new_dump_avail.reserve(start, end)?;
    }

    *avail = new_avail;
    *dump_avail = new_dump_avail;
    Ok(())
}

/// Returns the map of memory still available to the physical allocator.
pub fn avail() -> AtomicRef<'static, BootMap> {
    AVAIL.borrow()
}

/// Returns the map of memory still included in crash dumps.
pub fn dump_avail() -> AtomicRef<'static, BootMap> {
    DUMP_AVAIL.borrow()
}

/// Logs both boot maps, in the style of the firmware map dump printed at
/// boot.
pub fn log_maps() {
    log_map("avail", &AVAIL.borrow());
    log_map("dump avail", &DUMP_AVAIL.borrow());
}

fn log_map(name: &str, map: &BootMap) {
    log::info!(
        "{} map: {} pages in {} segments",
        name,
        map.total_len() / PAGE_SIZE,
        map.len()
    );
    for seg in map.segments() {
        log::info!("  {}-{}", seg.start, seg.end);
    }
}

fn page_span(start: PhysAddr, end: PhysAddr) -> Result<(PhysAddr, PhysAddr), MapError> {
    if start >= end {
        return Err(MapError::InvalidRange);
    }
    // Rejects ends so close to the top of the address space that rounding
    // them up would wrap.
    let end = end
        .checked_align_up(PAGE_SIZE)
        .ok_or(MapError::InvalidRange)?;
    Ok((start.align_down(PAGE_SIZE), end))
}
