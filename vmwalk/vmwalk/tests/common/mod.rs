//! Hierarchy fixtures shared by the walk and address-space suites.
//!
//! One boxed table per level: the heap keeps each table 4 KiB-aligned and
//! pinned, so its address doubles as the "physical" frame the parent entry
//! stores, and an identity [`DirectMap`] closes the loop.

use vmwalk::table::extension::{ExtensionDirectory, ExtensionEntry, ExtensionIndex};
use vmwalk::table::global::{GlobalDirectory, GlobalEntry, GlobalIndex};
use vmwalk::table::leaf::{LeafEntry, LeafIndex, LeafTable};
use vmwalk::table::middle::{MiddleDirectory, MiddleEntry, MiddleIndex};
use vmwalk::table::upper::{UpperDirectory, UpperEntry, UpperIndex};
use vmwalk::{
    DirectMap, EntryBits, HierarchyDepth, PagingRoot, PhysicalAddress, PhysicalFrame,
    VirtualAddress,
};

/// The heap address of `t`, reinterpreted as a physical frame.
pub fn frame_of<T>(t: &T) -> PhysicalFrame {
    PhysicalAddress::from_ptr(core::ptr::from_ref(t)).frame()
}

/// Like [`frame_of`], from a mutable borrow, for tables whose slots the
/// test will later write through.
pub fn frame_of_mut<T>(t: &mut T) -> PhysicalFrame {
    PhysicalAddress::from_ptr(core::ptr::from_mut(t)).frame()
}

/// The mapper matching the fixture convention above.
pub fn identity() -> DirectMap {
    // SAFETY: fixture frames are live heap allocations addressed by their
    // own bits, exactly the identity contract.
    unsafe { DirectMap::identity() }
}

/// One owned translation hierarchy, every level preallocated.
///
/// [`wire`](Hierarchy::wired) links the directory path for an address;
/// four-level hierarchies leave `extension` unlinked. All wired addresses
/// share the one table per level, so they must agree on nothing except
/// having distinct leaf indices.
pub struct Hierarchy {
    pub global: Box<GlobalDirectory>,
    pub extension: Box<ExtensionDirectory>,
    pub upper: Box<UpperDirectory>,
    pub middle: Box<MiddleDirectory>,
    pub leaf: Box<LeafTable>,
    depth: HierarchyDepth,
}

impl Hierarchy {
    /// A hierarchy of `depth` with the directory path for `va` wired and
    /// the leaf slot still empty.
    pub fn wired(depth: HierarchyDepth, va: VirtualAddress) -> Self {
        let mut h = Self {
            global: Box::new(GlobalDirectory::zeroed()),
            extension: Box::new(ExtensionDirectory::zeroed()),
            upper: Box::new(UpperDirectory::zeroed()),
            middle: Box::new(MiddleDirectory::zeroed()),
            leaf: Box::new(LeafTable::zeroed()),
            depth,
        };
        h.wire(va);
        h
    }

    /// Link global → (extension) → upper → middle → leaf for `va`.
    ///
    /// Idempotent for addresses sharing index bits; the leaf slot is not
    /// touched.
    pub fn wire(&mut self, va: VirtualAddress) {
        let flags = EntryBits::table_rw();
        let leaf_frame = frame_of_mut(&mut *self.leaf);

        if self.depth.has_extension() {
            self.global.set(
                GlobalIndex::of_address(va, self.depth),
                GlobalEntry::make_next(frame_of(&*self.extension), flags),
            );
            self.extension.set(
                ExtensionIndex::of_address(va),
                ExtensionEntry::make_next(frame_of(&*self.upper), flags),
            );
        } else {
            self.global.set(
                GlobalIndex::of_address(va, self.depth),
                GlobalEntry::make_next(frame_of(&*self.upper), flags),
            );
        }

        self.upper.set(
            UpperIndex::of_address(va),
            UpperEntry::make_next(frame_of(&*self.middle), flags),
        );
        self.middle.set(
            MiddleIndex::of_address(va),
            MiddleEntry::make_next(leaf_frame, flags),
        );
    }

    /// Map `va` to `frame` in the leaf table.
    pub fn plant(&mut self, va: VirtualAddress, frame: PhysicalFrame) {
        self.leaf.set(
            LeafIndex::of_address(va),
            LeafEntry::make_mapping(frame, EntryBits::leaf_rw()),
        );
    }

    /// The root handle for this hierarchy.
    pub fn root(&self) -> PagingRoot {
        PagingRoot::with_depth(frame_of(&*self.global), self.depth)
    }

    /// Where a walk of `va` must land: leaf table base plus leaf index,
    /// computed without the walker.
    pub fn expected_leaf_slot(&self, va: VirtualAddress) -> VirtualAddress {
        let base = VirtualAddress::from_ptr(core::ptr::from_ref(&*self.leaf));
        VirtualAddress::new(base.as_u64() + LeafIndex::of_address(va).as_usize() as u64 * 8)
    }
}
