#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use panorama::prelude::*;

#[derive(Debug, Arbitrary)]
enum Step {
    Down { item: u8, x: i16, y: i16 },
    Move { x: i16, y: i16, held: bool },
    Up { x: i16, y: i16 },
    Leave { item: u8 },
    Wait(u16),
    Tick(u16),
    Remove(u8),
    Push,
}

#[derive(Debug, Arbitrary)]
struct Input {
    items: u8,
    cell: (u8, u8),
    steps: Vec<Step>,
}

fn point(x: i16, y: i16) -> Point {
    Point::new(f64::from(x), f64::from(y))
}

fuzz_target!(|input: Input| {
    let mut config = PanelConfig::default();
    config.set_cell_width(f64::from(input.cell.0 % 120) + 20.0);
    config.set_cell_height(f64::from(input.cell.1 % 120) + 20.0);
    let count = u64::from(input.items % 40);
    let Ok(mut panel) = PanoramaPanel::with_items(config, (0..count).map(ItemId)) else {
        return;
    };
    panel.arrange();

    let mut now = Instant::now();
    let mut next = count;
    let local = Point::new(1.0, 1.0);

    for step in input.steps.into_iter().take(200) {
        let pick = |raw: u8| ItemId(u64::from(raw) % next.max(1));
        let result = match step {
            Step::Down { item, x, y } => panel
                .pointer(pick(item), &PointerEvent::down(PointerButton::Left, local, point(x, y)), now)
                .map(drop),
            Step::Move { x, y, held } => {
                let buttons = if held { PointerButtons::LEFT } else { PointerButtons::NONE };
                panel
                    .pointer(pick(0), &PointerEvent::moved(local, point(x, y), buttons), now)
                    .map(drop)
            }
            Step::Up { x, y } => panel
                .pointer(pick(0), &PointerEvent::up(PointerButton::Left, local, point(x, y)), now)
                .map(drop),
            Step::Leave { item } => panel
                .pointer(pick(item), &PointerEvent::leave(Point::new(-1.0, -1.0), Point::ZERO), now)
                .map(drop),
            Step::Wait(ms) => {
                now += Duration::from_millis(u64::from(ms));
                panel.poll(now).map(drop)
            }
            Step::Tick(ms) => {
                panel.tick(Duration::from_millis(u64::from(ms)));
                Ok(())
            }
            Step::Remove(item) => panel.remove_item(pick(item)).map(drop),
            Step::Push => {
                next += 1;
                panel.push_item(ItemId(next)).map(drop)
            }
        };
        // Stale item ids are expected; nothing else may fail.
        if let Err(err) = result {
            assert!(
                matches!(err, PanelError::UnknownItem(_)),
                "unexpected panel error: {err}"
            );
        }
        panel.arrange();

        let capacity = panel.store().capacity();
        assert!(panel.store().pages().iter().all(|p| p.len() <= capacity));
        if !panel.is_dragging() {
            assert!(
                panel.store().pages().iter().all(|p| !p.is_empty()),
                "empty page outside a drag"
            );
        }
    }
});
