//! Process-wide hierarchy-depth resolution.
//!
//! The resolved depth is a process-global latch, so this binary holds a
//! single test function; separate tests would race on the latch.

use vmwalk::{
    HierarchyDepth, PagingRoot, PhysicalAddress, PhysicalFrame, VirtualAddress, depth,
    user_range_ok,
};

#[test]
fn resolution_latches_once_and_feeds_dependents() {
    // before anything resolves, reads fall back to the build default
    assert_eq!(depth::resolved(), depth::BUILD_DEFAULT);

    // the fallback read above did not latch: a probe arriving later wins
    let probed = match depth::BUILD_DEFAULT {
        HierarchyDepth::FourLevel => HierarchyDepth::FiveLevel,
        HierarchyDepth::FiveLevel => HierarchyDepth::FourLevel,
    };
    depth::resolve(probed);
    assert_eq!(depth::resolved(), probed);

    // re-resolving the same depth is a no-op (a conflicting one is fatal)
    depth::resolve(probed);
    assert_eq!(depth::resolved(), probed);

    // dependents pick the resolved depth up
    let root = PagingRoot::new(PhysicalFrame::from_addr(PhysicalAddress::new(0x7000)));
    assert_eq!(root.depth(), probed);

    let top = probed.userspace_top();
    assert!(user_range_ok(VirtualAddress::zero(), top));
    assert!(!user_range_ok(VirtualAddress::zero(), top + 1));
}
