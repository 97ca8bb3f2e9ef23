//! # Table-Memory Access Seam
//!
//! Table entries reference the next level by *physical* frame, but the
//! walker reads entries through *virtual* addresses. [`TableMapper`] is the
//! seam between the two: the platform says where a table frame is visible
//! in the current address space, and the walker dereferences slots inside
//! that view.
//!
//! Typical implementations:
//! - boot paths and hosted tests, where table memory is addressed by its
//!   physical bits directly ([`DirectMap::identity`]);
//! - a kernel that mirrors physical memory at a fixed virtual base
//!   ([`DirectMap::at_offset`]);
//! - anything fancier (recursive mappings, temporary windows) as a custom
//!   impl.

use vmwalk_addresses::{PhysicalFrame, VirtualAddress};

/// Converts physical table frames to virtual addresses usable in the
/// current context.
///
/// # Safety
/// Implementors promise that for every table frame reachable from a root
/// being walked through this mapper, [`table_base`](Self::table_base)
/// returns a virtual address that is mapped, points at that frame's 4 KiB
/// of table memory, and stays valid for the duration of the walk. Walk
/// results (leaf slots) remain dereferenceable only while that promise
/// holds. Mutating through a guard additionally requires the view to be
/// writable.
pub unsafe trait TableMapper {
    /// The virtual address at which `frame`'s table is visible here.
    fn table_base(&self, frame: PhysicalFrame) -> VirtualAddress;
}

/// A [`TableMapper`] for contexts where physical memory is visible at one
/// constant offset.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DirectMap {
    offset: u64,
}

impl DirectMap {
    /// Physical and virtual bits coincide.
    ///
    /// # Safety
    /// Every table frame this map will be asked about must actually be
    /// addressable at its physical bits in the current context, for as long
    /// as the map is in use. Holds on identity-mapped boot paths, and in
    /// hosted tests that derive "physical" frames from live allocations.
    #[inline]
    #[must_use]
    pub const unsafe fn identity() -> Self {
        Self { offset: 0 }
    }

    /// Physical memory is mirrored at `offset`.
    ///
    /// # Safety
    /// As [`identity`](Self::identity), with the linear mapping based at
    /// `offset` instead of zero.
    #[inline]
    #[must_use]
    pub const unsafe fn at_offset(offset: u64) -> Self {
        Self { offset }
    }
}

// SAFETY: the constructors are unsafe and their contract is exactly the
// trait's promise: table frames are visible at base + offset.
unsafe impl TableMapper for DirectMap {
    #[inline]
    fn table_base(&self, frame: PhysicalFrame) -> VirtualAddress {
        VirtualAddress::new(frame.base().as_u64() + self.offset)
    }
}
