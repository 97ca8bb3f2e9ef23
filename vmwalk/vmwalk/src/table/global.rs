//! # Global Directory (root level)
//!
//! The table every walk starts from. Its index bits move with the hierarchy
//! depth: a four-level hierarchy takes VA bits `[47:39]`, a five-level one
//! takes `[56:48]` and leaves `[47:39]` to the
//! [extension directory](super::extension). [`GlobalIndex::of_address`] is
//! therefore the one extractor that needs the resolved
//! [`HierarchyDepth`].
//!
//! On four-level hierarchies a present global entry references the
//! [upper directory](super::upper) directly; the extension step folds away.

use crate::entry_bits::EntryBits;
use crate::table::{
    EntryClass, EntryFault, LevelEntry, TableIndex, classify_directory, descend_directory,
};
use vmwalk_addresses::{HierarchyDepth, PhysicalFrame, VirtualAddress};

/// Index into the global directory.
///
/// Derived from VA bits `[47:39]` or `[56:48]` depending on the hierarchy
/// depth, so extraction takes the resolved depth as an argument.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct GlobalIndex(u16);

/// A single global-directory entry: references an extension directory
/// (five-level) or an upper directory (four-level).
#[doc(alias = "PML4E")]
#[doc(alias = "PML5E")]
#[repr(transparent)]
#[derive(Copy, Clone)]
pub struct GlobalEntry(EntryBits);

/// The root table: 512 entries, 4 KiB-aligned.
#[doc(alias = "PML4")]
#[doc(alias = "PML5")]
#[repr(C, align(4096))]
pub struct GlobalDirectory {
    entries: [GlobalEntry; 512],
}

impl GlobalIndex {
    /// Extract the root index for `va` under the given hierarchy depth.
    ///
    /// Returns a value in `0..512`.
    #[inline]
    #[must_use]
    pub const fn of_address(va: VirtualAddress, depth: HierarchyDepth) -> Self {
        Self::new(((va.as_u64() >> depth.top_shift()) & 0x1FF) as u16)
    }

    /// Construct from a raw `u16`; debug builds assert `v < 512`.
    #[inline]
    #[must_use]
    pub const fn new(v: u16) -> Self {
        debug_assert!(v < 512);
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl TableIndex for GlobalIndex {
    #[inline]
    fn as_usize(self) -> usize {
        Self::as_usize(self)
    }
}

impl GlobalEntry {
    /// A zero (empty) entry.
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self(EntryBits::new())
    }

    /// Entry referencing the next-level table at `next`, carrying `flags`.
    ///
    /// Forces `present`; debug builds assert the large-frame bit is clear,
    /// since a directory entry must reference a table.
    #[inline]
    #[must_use]
    pub const fn make_next(next: PhysicalFrame, flags: EntryBits) -> Self {
        debug_assert!(!flags.large_page());
        Self(flags.with_present(true).with_frame(next))
    }

    /// The underlying bitfield, for callers inspecting flags.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> EntryBits {
        self.0
    }

    /// Total classification: empty, bad, or present.
    #[inline]
    #[must_use]
    pub const fn classify(self) -> EntryClass {
        classify_directory(self.0)
    }

    /// Whether nothing is mapped here (raw value zero).
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self.classify(), EntryClass::Empty)
    }

    /// Whether the entry is non-zero but unusable for descent.
    #[inline]
    #[must_use]
    pub const fn is_bad(self) -> bool {
        matches!(self.classify(), EntryClass::Bad)
    }

    /// The referenced next-level table frame, or the fault that stops a walk.
    ///
    /// # Errors
    /// [`EntryFault::Empty`] if nothing is mapped, [`EntryFault::Bad`] if the
    /// entry cannot reference a table.
    #[inline]
    pub const fn next_table(self) -> Result<PhysicalFrame, EntryFault> {
        descend_directory(self.0)
    }
}

impl LevelEntry for GlobalEntry {
    type Index = GlobalIndex;

    #[inline]
    fn from_raw(raw: u64) -> Self {
        Self(EntryBits::from_bits(raw))
    }

    #[inline]
    fn raw(self) -> u64 {
        self.0.into_bits()
    }
}

impl GlobalDirectory {
    /// A directory with every entry empty.
    #[inline]
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            entries: [GlobalEntry::zero(); 512],
        }
    }

    /// Read the entry at `i`. Plain fetch, no commit bookkeeping.
    #[inline]
    #[must_use]
    pub const fn get(&self, i: GlobalIndex) -> GlobalEntry {
        self.entries[i.as_usize()]
    }

    /// Write the entry at `i`.
    ///
    /// For tables a concurrent walker may observe, go through the slot
    /// write path instead.
    #[inline]
    pub const fn set(&mut self, i: GlobalIndex, e: GlobalEntry) {
        self.entries[i.as_usize()] = e;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vmwalk_addresses::PhysicalAddress;

    #[test]
    fn index_bits_follow_the_depth() {
        let va = VirtualAddress::new(0x0000_7F00_1234_5000);
        assert_eq!(
            GlobalIndex::of_address(va, HierarchyDepth::FourLevel).as_usize(),
            0xFE
        );
        // below the 48-bit boundary the five-level root index is zero
        assert_eq!(
            GlobalIndex::of_address(va, HierarchyDepth::FiveLevel).as_usize(),
            0
        );

        let high = VirtualAddress::new(0x0123_0000_0000_0000);
        assert_eq!(
            GlobalIndex::of_address(high, HierarchyDepth::FiveLevel).as_usize(),
            0x123
        );
    }

    #[test]
    fn entry_round_trips_the_referenced_frame() {
        let next = PhysicalFrame::from_addr(PhysicalAddress::new(0x0000_0000_0765_4000));
        let e = GlobalEntry::make_next(next, EntryBits::table_rw());
        assert_eq!(e.classify(), EntryClass::Present);
        assert_eq!(e.next_table().unwrap(), next);
    }

    #[test]
    fn zeroed_directory_is_all_empty() {
        let dir = GlobalDirectory::zeroed();
        assert!(dir.get(GlobalIndex::new(0)).is_empty());
        assert!(dir.get(GlobalIndex::new(511)).is_empty());
    }
}
