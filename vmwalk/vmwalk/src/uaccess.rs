//! # User-Range Boundary Check
//!
//! The yes/no gate a privileged caller consults before touching a
//! user-supplied range: does `[addr, addr + len)` stay inside the
//! non-privileged region? Pure arithmetic against the resolved hierarchy
//! depth; it says nothing about whether the range is actually mapped,
//! which is the walk's job.

use crate::depth;
use vmwalk_addresses::VirtualAddress;

/// Whether `[addr, addr + len)` lies entirely within the non-privileged
/// region of the address space.
///
/// Zero-length ranges trivially pass, whatever `addr`. A range whose end
/// wraps the address space is rejected. The upper bound comes from the
/// process-wide resolved depth
/// ([`HierarchyDepth::userspace_top`](vmwalk_addresses::HierarchyDepth::userspace_top)).
#[must_use]
pub fn user_range_ok(addr: VirtualAddress, len: u64) -> bool {
    if len == 0 {
        return true;
    }
    let Some(end) = addr.checked_add(len) else {
        return false;
    };
    end.as_u64() <= depth::resolved().userspace_top()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length_always_passes() {
        assert!(user_range_ok(VirtualAddress::zero(), 0));
        assert!(user_range_ok(VirtualAddress::new(u64::MAX), 0));
    }

    #[test]
    fn range_must_end_at_or_below_the_userspace_top() {
        let top = depth::resolved().userspace_top();
        assert!(user_range_ok(VirtualAddress::zero(), top));
        assert!(user_range_ok(VirtualAddress::new(top - 0x1000), 0x1000));
        assert!(!user_range_ok(VirtualAddress::new(top - 0x1000), 0x1001));
        assert!(!user_range_ok(VirtualAddress::new(top), 1));
    }

    #[test]
    fn end_of_range_overflow_is_rejected() {
        assert!(!user_range_ok(VirtualAddress::new(u64::MAX), 1));
        assert!(!user_range_ok(VirtualAddress::new(u64::MAX - 4), 8));
    }
}
