#![forbid(unsafe_code)]

//! Render-sync: target rectangles, animated movement, and draw order.
//!
//! [`TransitionScheduler`] mirrors the logical [`PageStore`] into per-item
//! [`ItemVisual`]s the host paints. After every structural change the panel
//! asks it for a layout pass:
//!
//! - [`place`](TransitionScheduler::place) snaps every item to its cell
//!   (first layout, item-source replacement).
//! - [`animate`](TransitionScheduler::animate) starts an eased move from each
//!   item's current position to its cell; the host advances it with
//!   [`tick`](TransitionScheduler::tick).
//!
//! # Invariants
//!
//! 1. Draw tiers order as `Normal < Transition < Dragging`; the dragged item
//!    is the only one at `Dragging`, so resettling items never cover it.
//! 2. Items move at `Transition` tier and drop to `Normal` when their move
//!    completes.
//! 3. The dragged item is never animated by a layout pass; it follows the
//!    pointer until the drag ends.
//! 4. A new pass retargets in-flight moves from their current interpolated
//!    position, so there are no jumps.

use std::time::Duration;

use panorama_core::animation::{Animation, EasingFn, Tween};
use panorama_core::geometry::Point;
use panorama_layout::{GridGeometry, ItemId, PageStore};
use rustc_hash::FxHashMap;

use crate::config::{DEFAULT_OPACITY, DEFAULT_SCALE};

/// Stacking layer, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum DrawTier {
    #[default]
    Normal,
    Transition,
    Dragging,
}

/// Everything the host needs to paint one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemVisual {
    /// Top-left corner in panel space.
    pub position: Point,
    pub scale: f64,
    pub opacity: f64,
    pub tier: DrawTier,
}

impl ItemVisual {
    fn at_rest(position: Point) -> Self {
        Self {
            position,
            scale: DEFAULT_SCALE,
            opacity: DEFAULT_OPACITY,
            tier: DrawTier::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Motion {
    from: Point,
    to: Point,
    from_scale: f64,
    tween: Tween,
}

/// Drives item visuals toward their cell rectangles.
#[derive(Debug, Clone, Default)]
pub struct TransitionScheduler {
    visuals: FxHashMap<ItemId, ItemVisual>,
    motions: FxHashMap<ItemId, Motion>,
    /// Store order at the last pass; the stable base for draw order.
    order: Vec<ItemId>,
    dragging: Option<ItemId>,
}

impl TransitionScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current visual of `item`.
    pub fn visual(&self, item: ItemId) -> Option<ItemVisual> {
        self.visuals.get(&item).copied()
    }

    /// Whether any item is still moving.
    pub fn is_animating(&self) -> bool {
        !self.motions.is_empty()
    }

    /// Whether `item` is still moving.
    pub fn is_moving(&self, item: ItemId) -> bool {
        self.motions.contains_key(&item)
    }

    /// Item currently following the pointer.
    pub const fn dragging(&self) -> Option<ItemId> {
        self.dragging
    }

    /// Items in paint order: lowest tier first, store order within a tier.
    pub fn draw_order(&self) -> Vec<ItemId> {
        let mut order = self.order.clone();
        order.sort_by_key(|item| self.visuals.get(item).map_or(DrawTier::Normal, |v| v.tier));
        order
    }

    /// Snap every item to its cell with no animation.
    pub fn place(&mut self, store: &PageStore, geometry: &GridGeometry) {
        self.sync_order(store);
        for (location, item) in store.iter() {
            if Some(item) == self.dragging {
                continue;
            }
            let target = geometry.cell_rect(location.page as i32, location.cell).origin();
            self.motions.remove(&item);
            self.visuals.insert(item, ItemVisual::at_rest(target));
        }
    }

    /// Start eased moves from current positions to every item's cell.
    ///
    /// Items with no visual yet (never placed) are snapped instead.
    pub fn animate(
        &mut self,
        store: &PageStore,
        geometry: &GridGeometry,
        duration: Duration,
        easing: EasingFn,
    ) {
        self.sync_order(store);
        for (location, item) in store.iter() {
            if Some(item) == self.dragging {
                continue;
            }
            let target = geometry.cell_rect(location.page as i32, location.cell).origin();
            let Some(visual) = self.visuals.get_mut(&item) else {
                self.visuals.insert(item, ItemVisual::at_rest(target));
                continue;
            };
            if visual.position == target && visual.scale == DEFAULT_SCALE {
                self.motions.remove(&item);
                visual.tier = DrawTier::Normal;
                continue;
            }
            visual.tier = DrawTier::Transition;
            self.motions.insert(
                item,
                Motion {
                    from: visual.position,
                    to: target,
                    from_scale: visual.scale,
                    tween: Tween::new(duration).easing(easing),
                },
            );
        }
    }

    /// Advance all moves by `dt`. Returns whether any move is still running.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let visuals = &mut self.visuals;
        self.motions.retain(|item, motion| {
            motion.tween.tick(dt);
            let Some(visual) = visuals.get_mut(item) else {
                return false;
            };
            let t = f64::from(motion.tween.value());
            visual.position = motion.from.lerp(motion.to, t);
            visual.scale = motion.from_scale + (DEFAULT_SCALE - motion.from_scale) * t;
            if motion.tween.is_complete() {
                visual.position = motion.to;
                visual.scale = DEFAULT_SCALE;
                visual.tier = DrawTier::Normal;
                return false;
            }
            true
        });
        self.is_animating()
    }

    /// Lift `item` above everything and stop any move it had.
    pub fn begin_drag(&mut self, item: ItemId, scale: f64, opacity: f64) {
        self.motions.remove(&item);
        let visual = self
            .visuals
            .entry(item)
            .or_insert_with(|| ItemVisual::at_rest(Point::ZERO));
        visual.scale = scale;
        visual.opacity = opacity;
        visual.tier = DrawTier::Dragging;
        self.dragging = Some(item);
    }

    /// Move the dragged item's visual to `position`.
    pub fn follow(&mut self, item: ItemId, position: Point) {
        if let Some(visual) = self.visuals.get_mut(&item) {
            visual.position = position;
        }
    }

    /// Return the dragged item to the transition tier at full opacity.
    ///
    /// The next [`animate`](Self::animate) pass carries it home.
    pub fn end_drag(&mut self, item: ItemId) {
        if self.dragging == Some(item) {
            self.dragging = None;
        }
        if let Some(visual) = self.visuals.get_mut(&item) {
            visual.opacity = DEFAULT_OPACITY;
            visual.tier = DrawTier::Transition;
        }
    }

    /// Drop all state for `item`.
    pub fn forget(&mut self, item: ItemId) {
        self.visuals.remove(&item);
        self.motions.remove(&item);
        self.order.retain(|&other| other != item);
        if self.dragging == Some(item) {
            self.dragging = None;
        }
    }

    fn sync_order(&mut self, store: &PageStore) {
        self.order.clear();
        self.order.extend(store.iter().map(|(_, item)| item));
        self.visuals.retain(|item, _| store.contains(*item));
        self.motions.retain(|item, _| store.contains(*item));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panorama_core::animation::linear;
    use panorama_layout::{CellLocation, GridConfig};

    const MS_100: Duration = Duration::from_millis(100);

    fn setup(items: u64) -> (PageStore, GridGeometry, TransitionScheduler) {
        let geometry = GridGeometry::new(GridConfig::default());
        let store = PageStore::from_items(geometry.capacity(), (0..items).map(ItemId)).unwrap();
        let mut scheduler = TransitionScheduler::new();
        scheduler.place(&store, &geometry);
        (store, geometry, scheduler)
    }

    #[test]
    fn place_snaps_to_cells_at_normal_tier() {
        let (store, geometry, scheduler) = setup(14);
        for (location, item) in store.iter() {
            let visual = scheduler.visual(item).unwrap();
            assert_eq!(
                visual.position,
                geometry.cell_rect(location.page as i32, location.cell).origin()
            );
            assert_eq!(visual.tier, DrawTier::Normal);
            assert_eq!(visual.scale, 1.0);
        }
        assert!(!scheduler.is_animating());
    }

    #[test]
    fn animate_moves_through_transition_tier() {
        let (mut store, geometry, mut scheduler) = setup(3);
        store
            .move_within_cascade(CellLocation::new(0, 2), CellLocation::new(0, 0))
            .unwrap();
        scheduler.animate(&store, &geometry, MS_100, linear);
        assert!(scheduler.is_animating());
        for item in [ItemId(0), ItemId(1), ItemId(2)] {
            assert_eq!(scheduler.visual(item).unwrap().tier, DrawTier::Transition);
        }

        assert!(scheduler.tick(Duration::from_millis(50)));
        // Item 2 travels from cell 2 (x=200) to cell 0 (x=0).
        assert!((scheduler.visual(ItemId(2)).unwrap().position.x - 100.0).abs() < 1e-6);

        assert!(!scheduler.tick(Duration::from_millis(50)));
        let visual = scheduler.visual(ItemId(2)).unwrap();
        assert_eq!(visual.position, Point::ZERO);
        assert_eq!(visual.tier, DrawTier::Normal);
    }

    #[test]
    fn items_already_home_stay_normal() {
        let (store, geometry, mut scheduler) = setup(4);
        scheduler.animate(&store, &geometry, MS_100, linear);
        assert!(!scheduler.is_animating());
        assert!(
            store
                .iter()
                .all(|(_, item)| scheduler.visual(item).unwrap().tier == DrawTier::Normal)
        );
    }

    #[test]
    fn dragged_item_is_never_animated_and_stays_on_top() {
        let (mut store, geometry, mut scheduler) = setup(4);
        scheduler.begin_drag(ItemId(0), 1.2, 0.5);
        scheduler.follow(ItemId(0), Point::new(333.0, 44.0));
        store
            .move_within_cascade(CellLocation::new(0, 0), CellLocation::new(0, 3))
            .unwrap();
        scheduler.animate(&store, &geometry, MS_100, linear);
        assert!(!scheduler.is_moving(ItemId(0)));
        scheduler.tick(MS_100);

        let dragged = scheduler.visual(ItemId(0)).unwrap();
        assert_eq!(dragged.position, Point::new(333.0, 44.0));
        assert_eq!(dragged.tier, DrawTier::Dragging);
        assert_eq!(dragged.opacity, 0.5);
        assert_eq!(scheduler.draw_order().last(), Some(&ItemId(0)));
    }

    #[test]
    fn end_drag_carries_item_home_and_restores_scale() {
        let (store, geometry, mut scheduler) = setup(2);
        scheduler.begin_drag(ItemId(1), 2.0, 0.3);
        scheduler.follow(ItemId(1), Point::new(50.0, 250.0));
        scheduler.end_drag(ItemId(1));
        let dropped = scheduler.visual(ItemId(1)).unwrap();
        assert_eq!(dropped.tier, DrawTier::Transition);
        assert_eq!(dropped.opacity, 1.0);

        scheduler.animate(&store, &geometry, MS_100, linear);
        scheduler.tick(Duration::from_millis(50));
        assert!((scheduler.visual(ItemId(1)).unwrap().scale - 1.5).abs() < 1e-6);
        scheduler.tick(Duration::from_millis(50));
        let home = scheduler.visual(ItemId(1)).unwrap();
        assert_eq!(home.position, Point::new(100.0, 0.0));
        assert_eq!(home.scale, 1.0);
        assert_eq!(home.tier, DrawTier::Normal);
    }

    #[test]
    fn retarget_starts_from_interpolated_position() {
        let (mut store, geometry, mut scheduler) = setup(2);
        store
            .move_within_cascade(CellLocation::new(0, 1), CellLocation::new(0, 0))
            .unwrap();
        scheduler.animate(&store, &geometry, MS_100, linear);
        scheduler.tick(Duration::from_millis(50));
        let midway = scheduler.visual(ItemId(1)).unwrap().position;
        assert!((midway.x - 50.0).abs() < 1e-6);

        store
            .move_within_cascade(CellLocation::new(0, 0), CellLocation::new(0, 1))
            .unwrap();
        scheduler.animate(&store, &geometry, MS_100, linear);
        assert_eq!(scheduler.visual(ItemId(1)).unwrap().position, midway);
        scheduler.tick(MS_100);
        assert_eq!(
            scheduler.visual(ItemId(1)).unwrap().position,
            Point::new(100.0, 0.0)
        );
    }

    #[test]
    fn removed_items_are_dropped_on_next_pass() {
        let (mut store, geometry, mut scheduler) = setup(3);
        store.remove(ItemId(1)).unwrap();
        scheduler.place(&store, &geometry);
        assert!(scheduler.visual(ItemId(1)).is_none());
        assert_eq!(scheduler.draw_order(), vec![ItemId(0), ItemId(2)]);
    }

    #[test]
    fn tiers_are_ordered() {
        assert!(DrawTier::Normal < DrawTier::Transition);
        assert!(DrawTier::Transition < DrawTier::Dragging);
    }
}
