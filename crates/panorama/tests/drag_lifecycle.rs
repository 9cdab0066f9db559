//! End-to-end drag lifecycle through `DragBehavior` and `PanoramaPanel`.

use std::time::Duration;

use panorama::prelude::*;
use panorama::{CellLocation, DragPhase, Invalidation, NoopReason, Size};
use proptest::prelude::*;

const DELAY: Duration = Duration::from_millis(300);

/// 2x2 pages, 200x200 each.
fn config() -> PanelConfig {
    let mut config = PanelConfig::default();
    config.set_page_width(200.0);
    config.set_page_height(200.0);
    config.set_drag_opacity(0.4);
    config
}

fn panel(items: u64) -> PanoramaPanel {
    let mut panel = PanoramaPanel::with_items(config(), (0..items).map(ItemId)).unwrap();
    panel.arrange();
    panel
}

fn attached(panel: &PanoramaPanel, item: u64) -> DragBehavior {
    let mut behavior = DragBehavior::new(ItemId(item));
    behavior.attach(panel).unwrap();
    behavior
}

fn page_lens(panel: &PanoramaPanel) -> Vec<usize> {
    panel.store().pages().iter().map(|p| p.len()).collect()
}

/// Press `behavior`'s item at its center at `t0` and wait out the hold.
fn begin(panel: &mut PanoramaPanel, behavior: &DragBehavior, t0: Instant) {
    let origin = panel.visual(behavior.item()).unwrap().position;
    let local = Point::new(50.0, 50.0);
    let down = PointerEvent::down(PointerButton::Left, local, origin + local);
    behavior.on_pointer(panel, &down, t0).unwrap();
    let started = panel.poll(t0 + DELAY).unwrap();
    assert!(matches!(started, Some(DragEffect::DragStarted { .. })));
}

fn drag_over(panel: &mut PanoramaPanel, behavior: &DragBehavior, to: Point, now: Instant) -> DragEffect {
    let event = PointerEvent::moved(Point::new(50.0, 50.0), to, PointerButtons::LEFT);
    behavior.on_pointer(panel, &event, now).unwrap()
}

fn drop_at(panel: &mut PanoramaPanel, behavior: &DragBehavior, at: Point, now: Instant) -> DragEffect {
    let up = PointerEvent::up(PointerButton::Left, Point::new(50.0, 50.0), at);
    behavior.on_pointer(panel, &up, now).unwrap()
}

#[test]
fn release_before_hold_delay_never_starts_a_drag() {
    let mut panel = panel(4);
    let behavior = attached(&panel, 2);
    let t0 = Instant::now();
    let center = Point::new(50.0, 50.0);

    let down = PointerEvent::down(PointerButton::Left, center, Point::new(50.0, 150.0));
    behavior.on_pointer(&mut panel, &down, t0).unwrap();
    let up = PointerEvent::up(PointerButton::Left, center, Point::new(50.0, 150.0));
    let effect = behavior
        .on_pointer(&mut panel, &up, t0 + DELAY - Duration::from_millis(1))
        .unwrap();

    assert_eq!(effect, DragEffect::Click { item: ItemId(2) });
    for later in [DELAY, DELAY * 2, Duration::from_secs(10)] {
        assert!(panel.poll(t0 + later).unwrap().is_none());
    }
    assert_eq!(panel.drag_phase(), DragPhase::Idle);
    assert_eq!(panel.visual(ItemId(2)).unwrap().tier, DrawTier::Normal);
}

#[test]
fn hold_is_not_ready_before_its_deadline() {
    let mut panel = panel(4);
    let behavior = attached(&panel, 0);
    let t0 = Instant::now();
    let down = PointerEvent::down(PointerButton::Left, Point::new(1.0, 1.0), Point::new(1.0, 1.0));
    behavior.on_pointer(&mut panel, &down, t0).unwrap();

    assert_eq!(panel.next_deadline(), Some(t0 + DELAY));
    assert!(panel.poll(t0 + DELAY / 2).unwrap().is_none());
    assert!(matches!(panel.drag_phase(), DragPhase::PendingHold(_)));
    assert!(panel.poll(t0 + DELAY).unwrap().is_some());
    assert!(panel.is_dragging());
}

#[test]
fn drag_across_full_pages_cascades_to_a_new_page() {
    // Two full pages; page 0 absorbs the dragged item by cascading its last.
    let mut panel = panel(8);
    let behavior = attached(&panel, 7);
    let t0 = Instant::now();
    begin(&mut panel, &behavior, t0);

    let effect = drag_over(&mut panel, &behavior, Point::new(10.0, 10.0), t0 + DELAY);
    let DragEffect::Reordered { report, .. } = effect else {
        panic!("expected a reorder, got {effect:?}");
    };
    assert_eq!(report.to, CellLocation::new(0, 0));
    assert_eq!(page_lens(&panel), vec![4, 4]);

    // Onto page 1's first cell: page 1 overflows into a fresh page.
    drag_over(&mut panel, &behavior, Point::new(210.0, 10.0), t0 + DELAY);
    assert_eq!(page_lens(&panel), vec![3, 4, 1]);
    assert_eq!(panel.locate(ItemId(7)), Some(CellLocation::new(1, 0)));

    let dropped = drop_at(&mut panel, &behavior, Point::new(210.0, 10.0), t0 + DELAY);
    assert!(matches!(dropped, DragEffect::Dropped { suppress_click: true, .. }));
    assert_eq!(page_lens(&panel), vec![3, 4, 1]);
}

#[test]
fn vertical_drag_cascades_down_the_stack() {
    let mut panel = panel(8);
    panel.configure(|c| c.set_orientation(Orientation::Vertical));
    panel.arrange();
    assert_eq!(panel.visual(ItemId(4)).unwrap().position, Point::new(0.0, 200.0));

    let behavior = attached(&panel, 0);
    let t0 = Instant::now();
    begin(&mut panel, &behavior, t0);

    // First cell of the second page, below the first.
    let effect = drag_over(&mut panel, &behavior, Point::new(10.0, 210.0), t0 + DELAY);
    let DragEffect::Reordered { report, .. } = effect else {
        panic!("expected a reorder, got {effect:?}");
    };
    assert_eq!(report.to, CellLocation::new(1, 0));
    assert_eq!(report.cascade.pages_created, 1);
    assert_eq!(page_lens(&panel), vec![3, 4, 1]);
    assert_eq!(panel.store().get(CellLocation::new(0, 0)), Some(ItemId(1)));
    assert_eq!(panel.store().get(CellLocation::new(2, 0)), Some(ItemId(7)));
    assert_eq!(panel.desired_size(), Size::new(200.0, 600.0));
}

#[test]
fn hold_released_in_place_is_not_suppressed() {
    let mut panel = panel(4);
    let behavior = attached(&panel, 1);
    let t0 = Instant::now();
    begin(&mut panel, &behavior, t0);

    let at = panel.visual(ItemId(1)).unwrap().position;
    let dropped = drop_at(&mut panel, &behavior, at, t0 + DELAY);
    assert!(matches!(
        dropped,
        DragEffect::Dropped { item: ItemId(1), suppress_click: false, .. }
    ));
}

#[test]
fn insert_into_full_pages_ripples_forward() {
    let mut panel = panel(8);
    panel.insert_item(0, 0, ItemId(100)).unwrap();
    assert_eq!(page_lens(&panel), vec![4, 4, 1]);
    assert_eq!(panel.locate(ItemId(3)), Some(CellLocation::new(1, 0)));
    assert_eq!(panel.locate(ItemId(7)), Some(CellLocation::new(2, 0)));
}

#[test]
fn drop_leaves_no_empty_pages() {
    let mut panel = panel(5);
    panel.remove_item(ItemId(0)).unwrap();
    panel.arrange();
    assert_eq!(page_lens(&panel), vec![3, 1]);

    let behavior = attached(&panel, 4);
    let t0 = Instant::now();
    begin(&mut panel, &behavior, t0);
    drag_over(&mut panel, &behavior, Point::new(150.0, 150.0), t0 + DELAY);
    assert_eq!(page_lens(&panel), vec![4, 0]);

    let effect = drop_at(&mut panel, &behavior, Point::new(150.0, 150.0), t0 + DELAY);
    let DragEffect::Dropped { pruned, .. } = effect else {
        panic!("expected a drop, got {effect:?}");
    };
    assert_eq!(pruned, vec![1]);
    assert!(panel.store().pages().iter().all(|p| !p.is_empty()));
    assert_eq!(panel.desired_size(), Size::new(200.0, 200.0));
}

#[test]
fn dragged_item_draws_above_resettling_items() {
    let mut panel = panel(4);
    let behavior = attached(&panel, 0);
    let t0 = Instant::now();
    begin(&mut panel, &behavior, t0);

    let dragged = panel.visual(ItemId(0)).unwrap();
    assert_eq!(dragged.tier, DrawTier::Dragging);
    assert_eq!(dragged.opacity, 0.4);

    drag_over(&mut panel, &behavior, Point::new(150.0, 150.0), t0 + DELAY);
    assert!(panel.is_animating());
    assert_eq!(panel.visual(ItemId(1)).unwrap().tier, DrawTier::Transition);
    assert_eq!(panel.draw_order().last(), Some(&ItemId(0)));

    // Resettled items fall back to normal; the dragged item stays on top.
    assert!(!panel.tick(DELAY));
    assert_eq!(panel.visual(ItemId(1)).unwrap().tier, DrawTier::Normal);
    assert_eq!(panel.visual(ItemId(0)).unwrap().tier, DrawTier::Dragging);

    // Still over its own cell: the visual follows, nothing reorders.
    let followed = drag_over(&mut panel, &behavior, Point::new(160.0, 160.0), t0 + DELAY);
    assert!(matches!(followed, DragEffect::Followed { .. }));
    drop_at(&mut panel, &behavior, Point::new(160.0, 160.0), t0 + DELAY);
    let dropped = panel.visual(ItemId(0)).unwrap();
    assert_eq!(dropped.tier, DrawTier::Transition);
    assert_eq!(dropped.opacity, 1.0);
    panel.tick(DELAY);
    let home = panel.visual(ItemId(0)).unwrap();
    assert_eq!(home.tier, DrawTier::Normal);
    assert_eq!(home.position, Point::new(100.0, 100.0));
}

#[test]
fn drag_opacity_is_coerced_through_configure() {
    let mut panel = panel(1);
    assert_eq!(panel.configure(|c| c.set_drag_opacity(0.0)), Invalidation::NONE);
    assert_eq!(panel.config().drag_opacity(), 0.1);
    panel.configure(|c| c.set_drag_opacity(1.5));
    assert_eq!(panel.config().drag_opacity(), 1.0);
}

#[test]
fn detaching_the_dragged_element_drops_it() {
    let mut panel = panel(5);
    let mut behavior = attached(&panel, 4);
    let t0 = Instant::now();
    begin(&mut panel, &behavior, t0);
    drag_over(&mut panel, &behavior, Point::new(-50.0, 10.0), t0 + DELAY);

    let effect = behavior.detach(&mut panel).unwrap();
    assert!(matches!(
        effect,
        DragEffect::Dropped { item: ItemId(4), at: Some(_), .. }
    ));
    assert!(!panel.is_dragging());
    assert_eq!(page_lens(&panel), vec![4, 1]);
}

#[test]
fn second_press_during_drag_is_ignored() {
    let mut panel = panel(4);
    let dragged = attached(&panel, 0);
    let other = attached(&panel, 3);
    let t0 = Instant::now();
    begin(&mut panel, &dragged, t0);

    let down = PointerEvent::down(PointerButton::Left, Point::new(5.0, 5.0), Point::new(105.0, 105.0));
    assert_eq!(
        other.on_pointer(&mut panel, &down, t0 + DELAY).unwrap(),
        DragEffect::Noop {
            reason: NoopReason::ActiveDragAlreadyInProgress
        }
    );
}

#[derive(Debug, Clone)]
enum Step {
    Move { x: f64, y: f64 },
    Tick(u64),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => (-100.0f64..900.0, -100.0f64..300.0).prop_map(|(x, y)| Step::Move { x, y }),
        1 => (0u64..400).prop_map(Step::Tick),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn random_drags_keep_pages_within_capacity(
        items in 1u64..14,
        pick in 0u64..14,
        steps in proptest::collection::vec(step(), 1..40),
    ) {
        let mut panel = panel(items);
        let behavior = attached(&panel, pick % items);
        let t0 = Instant::now();
        begin(&mut panel, &behavior, t0);

        let capacity = panel.store().capacity();
        let mut last = Point::ZERO;
        for step in steps {
            match step {
                Step::Move { x, y } => {
                    last = Point::new(x, y);
                    drag_over(&mut panel, &behavior, last, t0 + DELAY);
                }
                Step::Tick(ms) => {
                    panel.tick(Duration::from_millis(ms));
                }
            }
            prop_assert!(panel.store().pages().iter().all(|p| p.len() <= capacity));
            prop_assert_eq!(panel.item_count(), items as usize);
        }

        drop_at(&mut panel, &behavior, last, t0 + DELAY);
        prop_assert!(panel.store().pages().iter().all(|p| !p.is_empty() && p.len() <= capacity));
        prop_assert_eq!(panel.item_count(), items as usize);
        prop_assert!(!panel.is_dragging());

        panel.tick(Duration::from_secs(1));
        prop_assert!(!panel.is_animating());
        for (location, item) in panel.store().iter() {
            let visual = panel.visual(item).unwrap();
            let cell = panel.geometry().cell_rect(location.page as i32, location.cell);
            prop_assert_eq!(visual.position, cell.origin());
            prop_assert_eq!(visual.tier, DrawTier::Normal);
        }
    }
}
