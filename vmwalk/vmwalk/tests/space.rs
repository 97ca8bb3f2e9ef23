//! Address-space behavior: unguarded walks, guarded reads and patches, and
//! the concurrency properties the slot atomics and table lock provide.

mod common;

use std::sync::Barrier;
use std::thread;

use common::{Hierarchy, identity};
use vmwalk::table::leaf::{LeafEntry, LeafIndex};
use vmwalk::table::{EntryFault, LevelEntry};
use vmwalk::{
    AddressSpace, HierarchyDepth, Level, PhysicalAddress, PhysicalFrame, VirtualAddress,
    WalkError, translate,
};

#[test]
fn unguarded_walk_matches_the_free_function() {
    let va = VirtualAddress::new(0x0000_7F00_1234_5000);
    let mut h = Hierarchy::wired(HierarchyDepth::FourLevel, va);
    h.plant(
        va,
        PhysicalFrame::from_addr(PhysicalAddress::new(0x00AB_C000)),
    );

    let space = AddressSpace::new(h.root(), identity());
    let via_space = space.walk(va).unwrap();
    let direct = translate(space.mapper(), space.root(), va).unwrap();

    assert_eq!(via_space, direct);
    assert_eq!(via_space.address(), h.expected_leaf_slot(va));
}

#[test]
fn guard_reads_and_patches_the_leaf_value() {
    let va = VirtualAddress::new(0x0000_7F00_1234_5000);
    let mut h = Hierarchy::wired(HierarchyDepth::FiveLevel, va);
    h.plant(
        va,
        PhysicalFrame::from_addr(PhysicalAddress::new(0x0030_0000)),
    );
    let planted = h.leaf.get(LeafIndex::of_address(va)).raw();

    let space = AddressSpace::new(h.root(), identity());
    let tables = space.lock_tables();

    assert_eq!(tables.walk(va).unwrap().address(), h.expected_leaf_slot(va));
    assert_eq!(tables.read_leaf(va).unwrap(), planted);

    // swap in an empty entry; the previous raw value comes back
    assert_eq!(tables.patch_leaf(va, 0).unwrap(), planted);
    assert_eq!(tables.read_leaf(va).unwrap(), 0);

    // and restore
    assert_eq!(tables.patch_leaf(va, planted).unwrap(), 0);
    drop(tables);

    assert!(h.leaf.get(LeafIndex::of_address(va)).is_present());
}

#[test]
fn walk_errors_pass_through_space_and_guard() {
    let wired = VirtualAddress::new(0x0000_7F00_1234_5000);
    let unwired = VirtualAddress::new(0x0000_0000_0000_1000);
    let h = Hierarchy::wired(HierarchyDepth::FourLevel, wired);

    let space = AddressSpace::new(h.root(), identity());
    let want = WalkError {
        level: Level::Global,
        fault: EntryFault::Empty,
    };

    assert_eq!(space.walk(unwired).unwrap_err(), want);

    let tables = space.lock_tables();
    assert_eq!(tables.read_leaf(unwired).unwrap_err(), want);
    assert_eq!(tables.patch_leaf(unwired, 1).unwrap_err(), want);
}

#[test]
fn concurrent_disjoint_walks_match_a_sequential_run() {
    let base = 0x0000_7F00_1234_0000_u64;
    let vas: Vec<VirtualAddress> = (0..8_u64)
        .map(|i| VirtualAddress::new(base + i * 0x1000))
        .collect();

    let mut h = Hierarchy::wired(HierarchyDepth::FourLevel, vas[0]);
    for (i, &va) in (1_u64..).zip(vas.iter()) {
        h.wire(va);
        h.plant(va, PhysicalFrame::from_addr(PhysicalAddress::new(i << 22)));
    }

    let space = AddressSpace::new(h.root(), identity());
    let space = &space;

    // the reference run, single-threaded
    let want: Vec<(VirtualAddress, u64)> = vas
        .iter()
        .map(|&va| {
            let slot = space.walk(va).unwrap();
            (slot.address(), unsafe { slot.read_raw() })
        })
        .collect();

    thread::scope(|s| {
        for (&va, &(slot_addr, raw)) in vas.iter().zip(&want) {
            s.spawn(move || {
                for _ in 0..1_000 {
                    let slot = space.walk(va).unwrap();
                    assert_eq!(slot.address(), slot_addr);
                    assert_eq!(unsafe { slot.read_raw() }, raw);
                }
            });
        }
    });
}

#[test]
fn guarded_patches_are_never_observed_torn() {
    // two raw values whose every byte differs, so any mix is detectable
    const OLD: u64 = 0x5555_5555_5555_5555;
    const NEW: u64 = 0xAAAA_AAAA_AAAA_AAAA;
    const ROUNDS: usize = 10_000;

    let va = VirtualAddress::new(0x0000_7F00_1234_5000);
    let mut h = Hierarchy::wired(HierarchyDepth::FourLevel, va);
    h.leaf.set(LeafIndex::of_address(va), LeafEntry::from_raw(OLD));

    let space = AddressSpace::new(h.root(), identity());
    let space = &space;
    let start = Barrier::new(3);
    let start = &start;

    thread::scope(|s| {
        s.spawn(move || {
            start.wait();
            for round in 0..ROUNDS {
                let next = if round % 2 == 0 { NEW } else { OLD };
                let prev = space.lock_tables().patch_leaf(va, next).unwrap();
                assert!(
                    prev == OLD || prev == NEW,
                    "torn value read back: {prev:#018X}"
                );
            }
        });

        for _ in 0..2 {
            s.spawn(move || {
                start.wait();
                for _ in 0..ROUNDS {
                    let raw = space.lock_tables().read_leaf(va).unwrap();
                    assert!(raw == OLD || raw == NEW, "torn value observed: {raw:#018X}");
                }
            });
        }
    });

    let last = space.lock_tables().read_leaf(va).unwrap();
    assert!(last == OLD || last == NEW);
}
