//! # Address Spaces
//!
//! [`PagingRoot`] names one translation hierarchy: the top table's frame
//! plus the depth it is shaped for. [`AddressSpace`] pairs a root with the
//! [`TableMapper`] that makes its tables visible and with the lock that
//! serializes mutation of them.
//!
//! The walker itself never locks. Read-only walks of quiescent tables go
//! through [`AddressSpace::walk`] directly; anything racing a mutation of
//! the same hierarchy takes [`AddressSpace::lock_tables`] first and works
//! through the guard. The guarded section is a handful of entry reads and
//! one store, well inside the spin-lock contract.

use log::trace;

use crate::depth;
use crate::mapper::TableMapper;
use crate::slot::EntrySlot;
use crate::table::leaf::LeafEntry;
use crate::walk::{WalkError, translate};
use vmwalk_addresses::{HierarchyDepth, PhysicalFrame, VirtualAddress};
use vmwalk_sync::{SpinLock, SpinLockGuard};

/// The root of one translation hierarchy.
#[doc(alias = "CR3")]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PagingRoot {
    frame: PhysicalFrame,
    depth: HierarchyDepth,
}

impl PagingRoot {
    /// A root shaped for the process-wide depth (see [`depth::resolved`]).
    #[inline]
    #[must_use]
    pub fn new(frame: PhysicalFrame) -> Self {
        Self::with_depth(frame, depth::resolved())
    }

    /// A root with an explicit depth, for probed platforms and tests.
    #[inline]
    #[must_use]
    pub const fn with_depth(frame: PhysicalFrame, depth: HierarchyDepth) -> Self {
        Self { frame, depth }
    }

    /// The frame holding the top-level directory.
    #[inline]
    #[must_use]
    pub const fn frame(self) -> PhysicalFrame {
        self.frame
    }

    /// The hierarchy depth this root is shaped for.
    #[inline]
    #[must_use]
    pub const fn depth(self) -> HierarchyDepth {
        self.depth
    }
}

/// One address space: root, mapper, table lock.
pub struct AddressSpace<M> {
    root: PagingRoot,
    mapper: M,
    table_lock: SpinLock<()>,
}

impl<M: TableMapper> AddressSpace<M> {
    /// Wrap `root`'s hierarchy with `mapper` as the view of table memory.
    #[must_use]
    pub const fn new(root: PagingRoot, mapper: M) -> Self {
        Self {
            root,
            mapper,
            table_lock: SpinLock::new(()),
        }
    }

    #[inline]
    #[must_use]
    pub const fn root(&self) -> PagingRoot {
        self.root
    }

    #[inline]
    #[must_use]
    pub const fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Translate `va` without taking the table lock.
    ///
    /// The caller vouches that nobody mutates this hierarchy concurrently;
    /// otherwise use [`lock_tables`](Self::lock_tables) on both sides.
    ///
    /// # Errors
    /// Forwards the walk's [`WalkError`].
    #[inline]
    pub fn walk(&self, va: VirtualAddress) -> Result<EntrySlot<LeafEntry>, WalkError> {
        translate(&self.mapper, self.root, va)
    }

    /// Hold the table lock for the guard's lifetime.
    ///
    /// Spins until the lock is free. Walks and patches through the guard
    /// are atomic with respect to every other guard holder.
    #[must_use]
    pub fn lock_tables(&self) -> TableGuard<'_, M> {
        TableGuard {
            space: self,
            _held: self.table_lock.lock(),
        }
    }
}

/// Scoped exclusive access to an address space's tables.
pub struct TableGuard<'a, M> {
    space: &'a AddressSpace<M>,
    _held: SpinLockGuard<'a, ()>,
}

impl<M: TableMapper> TableGuard<'_, M> {
    /// Translate `va` with the table lock held.
    ///
    /// The returned slot is only as good as the lock: once the guard drops,
    /// another holder may retire the tables it points into.
    ///
    /// # Errors
    /// Forwards the walk's [`WalkError`].
    #[inline]
    pub fn walk(&self, va: VirtualAddress) -> Result<EntrySlot<LeafEntry>, WalkError> {
        self.space.walk(va)
    }

    /// Translate `va` and read its raw leaf value, all under the lock.
    ///
    /// # Errors
    /// Forwards the walk's [`WalkError`].
    #[inline]
    pub fn read_leaf(&self, va: VirtualAddress) -> Result<u64, WalkError> {
        // SAFETY: the guard holds the table lock, so no entry mutates
        // between the walk and this read; the space's mapper keeps the
        // leaf table mapped.
        self.walk(va).map(|slot| unsafe { slot.read_raw() })
    }

    /// Swap `va`'s raw leaf value for `new_raw`; returns the previous raw.
    ///
    /// The walk, the read of the old value, and the store happen with the
    /// lock held, so the swap is atomic with respect to other guard
    /// holders.
    ///
    /// # Errors
    /// The walk must reach the leaf table; its [`WalkError`] passes
    /// through. The leaf entry itself may be anything, including empty.
    pub fn patch_leaf(&self, va: VirtualAddress, new_raw: u64) -> Result<u64, WalkError> {
        let slot = self.walk(va)?;
        // SAFETY: as in `walk`, plus the mapper view is writable per its
        // contract when mutation is in play.
        let prev = unsafe { slot.read_raw() };
        unsafe { slot.write_raw(new_raw) };
        trace!("leaf patched at {va}: {prev:#018X} -> {new_raw:#018X}");
        Ok(prev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vmwalk_addresses::PhysicalAddress;

    #[test]
    fn roots_carry_frame_and_depth() {
        let frame = PhysicalFrame::from_addr(PhysicalAddress::new(0x7_E000));

        let explicit = PagingRoot::with_depth(frame, HierarchyDepth::FiveLevel);
        assert_eq!(explicit.frame(), frame);
        assert_eq!(explicit.depth(), HierarchyDepth::FiveLevel);

        // nothing in the unit-test binary resolves a depth, so `new`
        // falls back to the build default
        assert_eq!(PagingRoot::new(frame).depth(), depth::BUILD_DEFAULT);
    }
}
