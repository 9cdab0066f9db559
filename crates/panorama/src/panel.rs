#![forbid(unsafe_code)]

//! The paged panel facade.
//!
//! [`PanoramaPanel`] owns every piece of panel state: configuration,
//! resolved geometry, the page store, item visuals, and the drag controller.
//! Hosts drive it from a single UI thread:
//!
//! 1. structural edits (`push_item`, `insert_item`, `remove_item`,
//!    `replace_items`) and `configure` calls record invalidation;
//! 2. [`arrange`](PanoramaPanel::arrange) applies it;
//! 3. pointer events go in through [`pointer`](PanoramaPanel::pointer) (or a
//!    [`DragBehavior`](crate::DragBehavior)), hold deadlines through
//!    [`poll`](PanoramaPanel::poll), frame time through
//!    [`tick`](PanoramaPanel::tick);
//! 4. the host paints [`draw_order`](PanoramaPanel::draw_order) with each
//!    item's [`visual`](PanoramaPanel::visual).

use std::time::Duration;

use panorama_core::Instant;
use panorama_core::event::{PointerButton, PointerEvent};
use panorama_core::geometry::{Point, Size};
use panorama_layout::{
    CascadeReport, CellLocation, GridGeometry, ItemId, LayoutSnapshot, PageStore,
};

use crate::config::{Invalidation, PanelConfig};
use crate::drag::{DragContext, DragController, DragEffect, DragPhase};
use crate::error::{PanelError, Result};
use crate::transition::{ItemVisual, TransitionScheduler};

#[cfg(feature = "tracing")]
use panorama_core::logging::debug;
#[cfg(not(feature = "tracing"))]
use panorama_core::debug;

/// A horizontally or vertically paged grid of draggable items.
#[derive(Debug, Clone)]
pub struct PanoramaPanel {
    config: PanelConfig,
    geometry: GridGeometry,
    store: PageStore,
    transitions: TransitionScheduler,
    drag: DragController,
    pending: Invalidation,
    /// Next layout pass snaps instead of animating.
    snap_next: bool,
    active_page: Option<usize>,
    revision: u64,
}

impl Default for PanoramaPanel {
    fn default() -> Self {
        Self::new(PanelConfig::default())
    }
}

impl PanoramaPanel {
    /// Create an empty panel.
    #[must_use]
    pub fn new(config: PanelConfig) -> Self {
        let geometry = GridGeometry::new(config.grid_config());
        Self {
            config,
            geometry,
            store: PageStore::new(geometry.capacity()),
            transitions: TransitionScheduler::new(),
            drag: DragController::new(),
            pending: Invalidation::ARRANGE,
            snap_next: true,
            active_page: None,
            revision: 0,
        }
    }

    /// Create a panel seeded with `items`, filled in order.
    pub fn with_items(config: PanelConfig, items: impl IntoIterator<Item = ItemId>) -> Result<Self> {
        let mut panel = Self::new(config);
        panel.replace_items(items)?;
        Ok(panel)
    }

    #[inline]
    pub const fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Change configuration through `f` and record the invalidation it
    /// reports.
    ///
    /// ```ignore
    /// panel.configure(|c| c.set_cell_width(80.0) | c.set_drag_delay(Duration::ZERO));
    /// ```
    pub fn configure(&mut self, f: impl FnOnce(&mut PanelConfig) -> Invalidation) -> Invalidation {
        let invalidation = f(&mut self.config);
        self.pending |= invalidation;
        invalidation
    }

    /// Geometry must be recomputed on the next [`arrange`](Self::arrange).
    pub fn invalidate_measure(&mut self) {
        self.pending |= Invalidation::MEASURE;
    }

    /// Positions must be recomputed on the next [`arrange`](Self::arrange).
    pub fn invalidate_arrange(&mut self) {
        self.pending |= Invalidation::ARRANGE;
    }

    /// Work waiting for the next [`arrange`](Self::arrange).
    #[inline]
    pub const fn pending_invalidation(&self) -> Invalidation {
        self.pending
    }

    /// Panel extent for the current configuration and page count.
    #[must_use]
    pub fn desired_size(&self) -> Size {
        GridGeometry::new(self.config.grid_config()).panel_size(self.store.page_count())
    }

    /// Apply pending invalidation. Returns whether a layout pass ran.
    ///
    /// A measure rebuilds geometry and reflows the pages to the new
    /// capacity. The pass snaps items on first layout and after structural
    /// or geometry changes, and animates otherwise.
    pub fn arrange(&mut self) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        if self.pending.contains(Invalidation::MEASURE) {
            self.remeasure();
        }
        if self.snap_next {
            self.transitions.place(&self.store, &self.geometry);
        } else {
            self.transitions.animate(
                &self.store,
                &self.geometry,
                self.config.transition_duration(),
                self.config.easing(),
            );
        }
        self.pending = Invalidation::NONE;
        self.snap_next = false;
        true
    }

    fn remeasure(&mut self) {
        self.geometry = GridGeometry::new(self.config.grid_config());
        let capacity = self.geometry.capacity();
        if capacity != self.store.capacity() {
            let report = self.store.set_capacity(capacity);
            if report.moved > 0 {
                debug!(
                    capacity,
                    moved = report.moved,
                    pages_created = report.pages_created,
                    "reflowed pages"
                );
                self.revision += 1;
            }
            self.prune_unless_dragging();
        }
        self.snap_next = true;
    }

    #[inline]
    pub const fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Read-only view of the pages.
    #[inline]
    pub const fn store(&self) -> &PageStore {
        &self.store
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        self.store.snapshot()
    }

    #[inline]
    pub fn page_count(&self) -> usize {
        self.store.page_count()
    }

    #[inline]
    pub fn item_count(&self) -> usize {
        self.store.item_count()
    }

    #[inline]
    pub fn contains(&self, item: ItemId) -> bool {
        self.store.contains(item)
    }

    pub fn locate(&self, item: ItemId) -> Option<CellLocation> {
        self.store.locate(item)
    }

    /// Append `item` after the last item, starting a page when needed.
    pub fn push_item(&mut self, item: ItemId) -> Result<CellLocation> {
        let location = self.store.push(item)?;
        self.structure_changed();
        Ok(location)
    }

    /// Insert `item` at `(page, cell)` and cascade the overflow.
    pub fn insert_item(&mut self, page: usize, cell: usize, item: ItemId) -> Result<CascadeReport> {
        let report = self.store.insert(page, cell, item)?;
        self.structure_changed();
        Ok(report)
    }

    /// Remove `item`. Empty pages are pruned unless a drag is active; a
    /// drag of `item` itself is abandoned.
    pub fn remove_item(&mut self, item: ItemId) -> Result<CellLocation> {
        if !self.store.contains(item) {
            return Err(PanelError::UnknownItem(item));
        }
        self.drag.forget(item);
        self.transitions.forget(item);
        let location = self.store.remove(item)?;
        self.prune_unless_dragging();
        self.structure_changed();
        Ok(location)
    }

    /// Replace every item, filling pages in order. Rejected input leaves
    /// the panel unchanged.
    pub fn replace_items(&mut self, items: impl IntoIterator<Item = ItemId>) -> Result<()> {
        let store = PageStore::from_items(self.store.capacity(), items)?;
        if let Some(session) = self.drag.session().copied() {
            if !store.contains(session.item) {
                self.drag.forget(session.item);
                self.transitions.forget(session.item);
            }
        }
        self.store = store;
        self.active_page = self
            .active_page
            .filter(|&page| page < self.store.page_count());
        debug!(items = self.store.item_count(), pages = self.store.page_count(), "items replaced");
        self.structure_changed();
        Ok(())
    }

    fn structure_changed(&mut self) {
        self.revision += 1;
        self.snap_next = true;
        self.pending |= Invalidation::ARRANGE;
    }

    fn prune_unless_dragging(&mut self) {
        if self.drag.is_dragging() {
            return;
        }
        let pruned = self.store.prune_empty_pages();
        self.shift_active_page(&pruned);
    }

    fn shift_active_page(&mut self, pruned: &[usize]) {
        let Some(active) = self.active_page else {
            return;
        };
        if pruned.contains(&active) {
            self.active_page = None;
        } else {
            let before = pruned.iter().filter(|&&page| page < active).count();
            self.active_page = Some(active - before);
        }
    }

    /// Counter bumped whenever items change cells or pages appear or go.
    ///
    /// Hosts compare it between frames to know when to re-read
    /// [`desired_size`](Self::desired_size) and the page list.
    #[inline]
    pub const fn layout_revision(&self) -> u64 {
        self.revision
    }

    /// Page the host shows, if any.
    #[inline]
    pub const fn active_page(&self) -> Option<usize> {
        self.active_page
    }

    pub fn set_active_page(&mut self, page: Option<usize>) -> Result<()> {
        if let Some(page) = page {
            let page_count = self.store.page_count();
            if page >= page_count {
                return Err(PanelError::PageOutOfRange { page, page_count });
            }
        }
        self.active_page = page;
        Ok(())
    }

    /// Scroll offset that brings `page` into view.
    #[must_use]
    pub fn page_origin(&self, page: usize) -> Point {
        self.geometry.page_rect(page as i32).origin()
    }

    fn split(&mut self) -> (&mut DragController, DragContext<'_>) {
        (
            &mut self.drag,
            DragContext {
                store: &mut self.store,
                geometry: &self.geometry,
                config: &self.config,
                transitions: &mut self.transitions,
            },
        )
    }

    fn settle(&mut self, effect: DragEffect) -> DragEffect {
        if effect.mutated_layout() {
            self.revision += 1;
            if let DragEffect::Dropped { pruned, .. } = &effect {
                self.shift_active_page(pruned);
            }
        }
        effect
    }

    /// Route a pointer event addressed to `item`.
    pub fn pointer(&mut self, item: ItemId, event: &PointerEvent, now: Instant) -> Result<DragEffect> {
        let (drag, mut ctx) = self.split();
        let effect = drag.handle(&mut ctx, item, event, now)?;
        Ok(self.settle(effect))
    }

    /// Start a drag whose hold delay has elapsed by `now`.
    pub fn poll(&mut self, now: Instant) -> Result<Option<DragEffect>> {
        let (drag, mut ctx) = self.split();
        drag.poll(&mut ctx, now)
    }

    /// Deadline of the pending hold, for arming a wake timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.drag.next_deadline()
    }

    /// Begin dragging `item` immediately, bypassing the hold delay.
    pub fn on_drag_start(
        &mut self,
        item: ItemId,
        button: PointerButton,
        local: Point,
        panel: Point,
    ) -> Result<DragEffect> {
        let (drag, mut ctx) = self.split();
        drag.on_drag_start(&mut ctx, item, button, local, panel)
    }

    /// Move the active drag to `panel`.
    pub fn on_drag_move(&mut self, panel: Point) -> Result<DragEffect> {
        let (drag, mut ctx) = self.split();
        let effect = drag.on_drag_move(&mut ctx, panel)?;
        Ok(self.settle(effect))
    }

    /// Drop the active drag.
    pub fn on_drag_end(&mut self) -> Result<DragEffect> {
        let (drag, mut ctx) = self.split();
        let effect = drag.on_drag_end(&mut ctx)?;
        Ok(self.settle(effect))
    }

    /// Cancel `item`'s hold or drop its drag.
    pub fn release_item(&mut self, item: ItemId) -> Result<DragEffect> {
        let (drag, mut ctx) = self.split();
        let effect = drag.detach(&mut ctx, item)?;
        Ok(self.settle(effect))
    }

    #[inline]
    pub fn drag_phase(&self) -> DragPhase {
        self.drag.phase()
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Advance item animations. Returns whether any are still running.
    pub fn tick(&mut self, dt: Duration) -> bool {
        self.transitions.tick(dt)
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.transitions.is_animating()
    }

    pub fn visual(&self, item: ItemId) -> Option<ItemVisual> {
        self.transitions.visual(item)
    }

    /// Items back to front.
    pub fn draw_order(&self) -> Vec<ItemId> {
        self.transitions.draw_order()
    }
}
