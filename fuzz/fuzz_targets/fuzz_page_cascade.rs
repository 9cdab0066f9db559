#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use panorama_layout::{CellLocation, ItemId, PageStore};

#[derive(Debug, Arbitrary)]
enum Op {
    Push,
    Insert { page: u8, cell: u8 },
    RemoveAt { page: u8, cell: u8 },
    Move { from: (u8, u8), to: (u8, u8) },
    Prune,
    SetCapacity(u8),
}

#[derive(Debug, Arbitrary)]
struct Input {
    capacity: u8,
    seed: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    // Capacity 0 exercises the clamp to 1.
    let capacity = usize::from(input.capacity % 16);
    let Ok(mut store) = PageStore::from_items(capacity, (0..u64::from(input.seed)).map(ItemId))
    else {
        return;
    };
    let mut next = u64::from(input.seed);
    let mut expected = store.item_count();

    for op in input.ops.into_iter().take(256) {
        let before = store.snapshot();
        let accepted = match op {
            Op::Push => {
                next += 1;
                let pushed = store.push(ItemId(next)).is_ok();
                expected += usize::from(pushed);
                pushed
            }
            Op::Insert { page, cell } => {
                next += 1;
                let inserted = store
                    .insert(usize::from(page), usize::from(cell), ItemId(next))
                    .is_ok();
                expected += usize::from(inserted);
                inserted
            }
            Op::RemoveAt { page, cell } => {
                let removed = store.remove_at(usize::from(page), usize::from(cell)).is_ok();
                expected -= usize::from(removed);
                removed
            }
            Op::Move { from, to } => store
                .move_within_cascade(
                    CellLocation::new(usize::from(from.0), usize::from(from.1)),
                    CellLocation::new(usize::from(to.0), usize::from(to.1)),
                )
                .is_ok(),
            Op::Prune => {
                store.prune_empty_pages();
                assert!(
                    store.pages().iter().all(|p| !p.is_empty()),
                    "empty page survived prune"
                );
                true
            }
            Op::SetCapacity(capacity) => {
                store.set_capacity(usize::from(capacity % 16));
                true
            }
        };
        if !accepted {
            assert_eq!(store.snapshot(), before, "rejected op mutated the store");
        }

        // Post-conditions that must always hold:
        for page in store.pages() {
            assert!(page.len() <= store.capacity(), "page over capacity");
        }
        assert_eq!(store.item_count(), expected, "items dropped or duplicated");
        let counted: usize = store.pages().iter().map(|p| p.len()).sum();
        assert_eq!(counted, expected, "page contents disagree with membership");
        for (location, item) in store.iter() {
            assert_eq!(store.locate(item), Some(location), "locate disagrees with iter");
        }
    }
});
