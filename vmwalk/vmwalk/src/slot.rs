//! # Entry Slots
//!
//! [`EntrySlot`] is a typed pointer to one 8-byte entry inside a mapped
//! translation table: the table's virtual base plus the level's index times
//! the entry size. Constructing a slot is pure arithmetic and never touches
//! memory; reading or writing through one is `unsafe`, with validity owed
//! by whoever produced the base address (normally the walker's
//! [`TableMapper`](crate::TableMapper)).
//!
//! Accesses go through [`AtomicU64`], so a concurrent walker observes any
//! entry either fully-old or fully-new, never torn. Reads are
//! acquire-ordered and writes release-ordered: a walker that sees a freshly
//! written directory entry also sees the table contents published before
//! it.

use core::fmt;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::table::{LevelEntry, TableIndex};
use vmwalk_addresses::VirtualAddress;
use vmwalk_addresses::layout::ENTRY_BYTES;

/// A typed pointer to one entry slot of a level-`E` table.
///
/// The type parameter ties the slot to its level, so a slot obtained from a
/// middle directory cannot be read back as a leaf entry by accident.
#[derive(Copy, Clone)]
pub struct EntrySlot<E: LevelEntry> {
    addr: VirtualAddress,
    _level: PhantomData<E>,
}

impl<E: LevelEntry> EntrySlot<E> {
    /// The slot for `index` inside the table mapped at `table_base`.
    ///
    /// Pure address arithmetic; nothing is dereferenced. Debug builds
    /// assert that `table_base` is 4 KiB-aligned, as every table is.
    #[inline]
    #[must_use]
    pub fn of(table_base: VirtualAddress, index: E::Index) -> Self {
        debug_assert!(table_base.is_page_aligned());
        Self {
            addr: VirtualAddress::new(table_base.as_u64() + index.as_usize() as u64 * ENTRY_BYTES),
            _level: PhantomData,
        }
    }

    /// The virtual address of the slot itself, not of anything it maps.
    #[inline]
    #[must_use]
    pub const fn address(self) -> VirtualAddress {
        self.addr
    }

    /// Read the entry, acquire-ordered.
    ///
    /// # Safety
    /// The slot must lie inside a live, mapped translation table for the
    /// duration of the call. Slots returned by the walker satisfy this
    /// while the mapper contract they were produced under still holds.
    #[inline]
    #[must_use]
    pub unsafe fn read(self) -> E {
        E::from_raw(unsafe { self.read_raw() })
    }

    /// Read the raw 8-byte entry value, acquire-ordered.
    ///
    /// # Safety
    /// Same contract as [`read`](Self::read).
    #[inline]
    #[must_use]
    pub unsafe fn read_raw(self) -> u64 {
        // SAFETY: the caller promises a live table entry at this address;
        // entries are 8-byte aligned because tables are 4 KiB-aligned, and
        // all walker-side access goes through these atomics.
        let cell = unsafe { AtomicU64::from_ptr(self.addr.as_mut_ptr()) };
        cell.load(Ordering::Acquire)
    }

    /// Overwrite the entry, release-ordered.
    ///
    /// The one sanctioned mutation path for entries a concurrent walker may
    /// observe: the store publishes whatever table contents were written
    /// before it.
    ///
    /// # Safety
    /// Same contract as [`read`](Self::read), and the table must be mapped
    /// writable.
    #[inline]
    pub unsafe fn write(self, entry: E) {
        unsafe { self.write_raw(entry.raw()) }
    }

    /// Overwrite the raw 8-byte entry value, release-ordered.
    ///
    /// # Safety
    /// Same contract as [`write`](Self::write).
    #[inline]
    pub unsafe fn write_raw(self, raw: u64) {
        // SAFETY: see `read_raw`; writability is the caller's promise.
        let cell = unsafe { AtomicU64::from_ptr(self.addr.as_mut_ptr()) };
        cell.store(raw, Ordering::Release);
    }
}

// PartialEq/Eq/Debug by hand: the derives would demand them of `E`, and
// entry types are plain bit wrappers without either.
impl<E: LevelEntry> PartialEq for EntrySlot<E> {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl<E: LevelEntry> Eq for EntrySlot<E> {}

impl<E: LevelEntry> fmt::Debug for EntrySlot<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntrySlot({:?})", self.addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry_bits::EntryBits;
    use crate::table::leaf::{LeafEntry, LeafIndex, LeafTable};
    use vmwalk_addresses::{PhysicalAddress, PhysicalFrame};

    #[test]
    fn slot_address_is_base_plus_index_times_entry_size() {
        let table = Box::new(LeafTable::zeroed());
        let base = VirtualAddress::from_ptr(core::ptr::from_ref(&*table));
        let slot = EntrySlot::<LeafEntry>::of(base, LeafIndex::new(0x145));
        assert_eq!(slot.address().as_u64(), base.as_u64() + 0x145 * 8);
    }

    #[test]
    fn reads_see_plain_writes_and_vice_versa() {
        let mut table = Box::new(LeafTable::zeroed());
        let frame = PhysicalFrame::from_addr(PhysicalAddress::new(0xAB_C000));
        table.set(
            LeafIndex::new(3),
            LeafEntry::make_mapping(frame, EntryBits::leaf_rw()),
        );

        // pointer taken from &mut so the slot may write through it
        let base = VirtualAddress::from_ptr(core::ptr::from_mut(&mut *table));
        let slot = EntrySlot::<LeafEntry>::of(base, LeafIndex::new(3));
        let entry = unsafe { slot.read() };
        assert!(entry.is_present());
        assert_eq!(entry.frame(), frame);

        unsafe { slot.write_raw(0) };
        assert!(table.get(LeafIndex::new(3)).is_empty());
    }
}
