//! # Virtual and Physical Address Types
//!
//! Zero-cost `u64` newtypes that keep the two address kinds apart at compile
//! time, plus the 4 KiB frame type that page-table code hands around.
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`VirtualAddress`] | An address subject to page-table translation. |
//! | [`PhysicalAddress`] | An address in physical memory (or MMIO). |
//! | [`PhysicalFrame`] | A 4 KiB-aligned physical page base, e.g. a table frame. |
//!
//! The [`layout`] module holds the address-space geometry shared by every
//! consumer: page size, entries per table, and the hierarchy-depth switch
//! ([`HierarchyDepth`]) that decides whether a fifth translation level
//! exists.
//!
//! ## Typical Usage
//!
//! ```rust
//! # use vmwalk_addresses::*;
//! let va = VirtualAddress::new(0x0000_7F00_1234_5678);
//! assert_eq!(va.page_offset(), 0x678);
//! assert_eq!(va.align_down_page().as_u64(), 0x0000_7F00_1234_5000);
//!
//! let frame = PhysicalFrame::from_addr(PhysicalAddress::new(0x30_0123));
//! assert_eq!(frame.base().as_u64(), 0x30_0000);
//! assert_eq!(frame.join(0x123).as_u64(), 0x30_0123);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod layout;

pub use layout::HierarchyDepth;

use core::fmt;
use core::ptr::NonNull;

/// A virtual address: subject to page-table translation before it reaches
/// memory.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VirtualAddress(u64);

impl VirtualAddress {
    #[inline]
    #[must_use]
    pub const fn new(v: u64) -> Self {
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Reinterpret a pointer as a virtual address.
    #[inline]
    #[must_use]
    pub const fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr_bits(ptr))
    }

    #[inline]
    #[must_use]
    pub const fn from_nonnull<T>(ptr: NonNull<T>) -> Self {
        Self::from_ptr(ptr.as_ptr())
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Reinterpret the address as a pointer in the current address space.
    ///
    /// Only meaningful when the address is actually mapped here; the walker
    /// uses this for table slots reached through its mapper.
    #[inline]
    #[must_use]
    pub fn as_mut_ptr<T>(self) -> *mut T {
        self.0 as usize as *mut T
    }

    /// The byte offset within the 4 KiB page containing this address.
    #[inline]
    #[must_use]
    pub const fn page_offset(self) -> u64 {
        self.0 & (layout::PAGE_SIZE - 1)
    }

    /// Clear the low bits so the address points at its 4 KiB page base.
    #[inline]
    #[must_use]
    pub const fn align_down_page(self) -> Self {
        Self(self.0 & !(layout::PAGE_SIZE - 1))
    }

    #[inline]
    #[must_use]
    pub const fn is_page_aligned(self) -> bool {
        self.0 & (layout::PAGE_SIZE - 1) == 0
    }

    /// Add a byte offset, failing on wrap-around.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, bytes: u64) -> Option<Self> {
        match self.0.checked_add(bytes) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }
}

impl fmt::Debug for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtualAddress(0x{:016X})", self.0)
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

/// A physical address: what the bus sees after translation.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalAddress(u64);

impl PhysicalAddress {
    #[inline]
    #[must_use]
    pub const fn new(v: u64) -> Self {
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Reinterpret a pointer as a physical address.
    ///
    /// Useful where memory is identity-mapped (boot paths, hosted tests).
    #[inline]
    #[must_use]
    pub const fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr_bits(ptr))
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// The 4 KiB frame containing this address.
    #[inline]
    #[must_use]
    pub const fn frame(self) -> PhysicalFrame {
        PhysicalFrame::from_addr(self)
    }

    /// The byte offset within the containing 4 KiB frame.
    #[inline]
    #[must_use]
    pub const fn frame_offset(self) -> u64 {
        self.0 & (layout::PAGE_SIZE - 1)
    }
}

impl fmt::Debug for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalAddress(0x{:016X})", self.0)
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

/// A 4 KiB-aligned physical page base.
///
/// Page tables live in such frames, and table entries reference the next
/// level by frame, so most walker plumbing trades in this type rather than
/// in raw [`PhysicalAddress`]es.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalFrame(PhysicalAddress);

impl PhysicalFrame {
    /// The frame containing `addr` (low bits cleared).
    #[inline]
    #[must_use]
    pub const fn from_addr(addr: PhysicalAddress) -> Self {
        Self(PhysicalAddress::new(
            addr.as_u64() & !(layout::PAGE_SIZE - 1),
        ))
    }

    /// Like [`PhysicalFrame::from_addr`], but the address must already be
    /// aligned.
    ///
    /// Debug builds assert the alignment.
    #[inline]
    #[must_use]
    pub const fn new_aligned(addr: PhysicalAddress) -> Self {
        debug_assert!(addr.as_u64() & (layout::PAGE_SIZE - 1) == 0);
        Self(addr)
    }

    #[inline]
    #[must_use]
    pub const fn base(self) -> PhysicalAddress {
        self.0
    }

    /// Combine the frame base with an in-page byte offset.
    ///
    /// Debug builds assert `offset` fits inside the page.
    #[inline]
    #[must_use]
    pub const fn join(self, offset: u64) -> PhysicalAddress {
        debug_assert!(offset < layout::PAGE_SIZE);
        PhysicalAddress::new(self.0.as_u64() | (offset & (layout::PAGE_SIZE - 1)))
    }
}

impl fmt::Debug for PhysicalFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalFrame(0x{:016X})", self.0.as_u64())
    }
}

impl fmt::Display for PhysicalFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pointer-to-`u64` conversion usable in `const fn`.
const fn ptr_bits<T>(ptr: *const T) -> u64 {
    const _: () = assert!(
        size_of::<*const ()>() == size_of::<u64>(),
        "pointer size mismatch"
    );

    // a union makes the conversion possible at const-eval time
    union Ptr<T> {
        ptr: *const T,
        raw: u64,
    }

    let ptr = Ptr { ptr };
    unsafe { ptr.raw }
}
