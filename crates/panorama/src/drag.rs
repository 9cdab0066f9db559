#![forbid(unsafe_code)]

//! Press-and-hold drag lifecycle.
//!
//! [`DragController`] is a small state machine:
//!
//! ```text
//!  Idle ──down(drag button)──▶ PendingHold ──delay elapsed──▶ Dragging
//!   ▲                            │  up: Click                  │  move: follow + reorder
//!   │                            │  move out / leave: cancel   │  up: drop
//!   └────────────────────────────┴─────────────────────────────┘
//! ```
//!
//! It never owns layout state. Every step borrows the store, geometry,
//! configuration, and transition scheduler through a [`DragContext`] and
//! reports what happened as a [`DragEffect`]. Inputs that do not apply in the
//! current phase produce [`DragEffect::Noop`] with a [`NoopReason`], so hosts
//! can trace rejected input without treating it as an error.
//!
//! # Invariants
//!
//! 1. At most one hold is pending and at most one drag session exists.
//! 2. A hold never turns into a drag before its delay has elapsed; release,
//!    leaving the element, or moving outside it cancels the hold.
//! 3. While dragging, the item's visual follows the pointer minus the grab
//!    offset; its logical cell only changes through a reorder followed by a
//!    cascade, so page capacities hold after every step.
//! 4. Dropping prunes empty pages, so no page is empty once a drag ends.
//!
//! # Failure Modes
//!
//! - Pointer outside every page during a drag: the visual follows, the
//!   logical position stays put.
//! - Pointer on a page but outside its grid: targets the last cell (clamped
//!   to the page's current length).
//! - Hold elapses after its item was removed: the hold is dropped with
//!   [`NoopReason::UnknownItem`].

use panorama_core::Instant;
use panorama_core::delay::DelayScheduler;
use panorama_core::event::{PointerButton, PointerEvent, PointerEventKind};
use panorama_core::geometry::{Point, Rect};
use panorama_layout::{CellLocation, GridGeometry, ItemId, MoveReport, PageStore};

use crate::config::PanelConfig;
use crate::error::{PanelError, Result};
use crate::transition::TransitionScheduler;

#[cfg(feature = "tracing")]
use panorama_core::logging::debug;
#[cfg(not(feature = "tracing"))]
use panorama_core::debug;

/// Borrowed panel state a drag step works on.
#[derive(Debug)]
pub struct DragContext<'a> {
    pub store: &'a mut PageStore,
    pub geometry: &'a GridGeometry,
    pub config: &'a PanelConfig,
    pub transitions: &'a mut TransitionScheduler,
}

impl DragContext<'_> {
    /// Bounds of an item element in its own coordinate space.
    #[must_use]
    pub fn element_bounds(&self) -> Rect {
        Rect::from_size(self.config.cell_width(), self.config.cell_height())
    }

    fn relayout(&mut self) {
        self.transitions.animate(
            self.store,
            self.geometry,
            self.config.transition_duration(),
            self.config.easing(),
        );
    }
}

/// A press waiting for the hold delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingHold {
    pub item: ItemId,
    pub button: PointerButton,
    /// Latest pointer position relative to the element.
    pub local: Point,
    /// Latest pointer position relative to the panel.
    pub panel: Point,
}

/// The single active drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub item: ItemId,
    pub button: PointerButton,
    /// Logical location of the item, updated by every reorder.
    pub source: CellLocation,
    /// Pointer offset from the item's top-left corner, scaled by the drag scale.
    pub grab_offset: Point,
    pub last_panel: Point,
    /// The pointer has left its starting point at least once.
    pub moved: bool,
}

/// Observable phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragPhase {
    Idle,
    PendingHold(PendingHold),
    Dragging(DragSession),
}

/// Why an input changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoopReason {
    IdleWithoutActiveDrag,
    ActiveDragAlreadyInProgress,
    ButtonMismatch,
    DragButtonNotHeld,
    /// Pointer moved but is still over the held element.
    HoldPending,
    /// The event targets a different item than the pending hold.
    ItemMismatch,
    UnknownItem,
}

/// Outcome of one drag step.
#[derive(Debug, Clone, PartialEq)]
pub enum DragEffect {
    Noop {
        reason: NoopReason,
    },
    HoldArmed {
        item: ItemId,
        deadline: Instant,
    },
    HoldCanceled {
        item: ItemId,
    },
    /// Released before the hold elapsed: the press is a plain click.
    Click {
        item: ItemId,
    },
    DragStarted {
        item: ItemId,
        source: CellLocation,
    },
    /// The visual moved with the pointer; the logical layout is unchanged.
    Followed {
        item: ItemId,
        position: Point,
    },
    Reordered {
        report: MoveReport,
        position: Point,
    },
    Dropped {
        item: ItemId,
        /// Final logical location, `None` if the item was removed mid-drag.
        at: Option<CellLocation>,
        /// Indices of pruned pages, pre-removal numbering.
        pruned: Vec<usize>,
        /// The drag moved, so the release must not also count as a click. A
        /// hold released in place still clicks.
        suppress_click: bool,
    },
}

impl DragEffect {
    const fn noop(reason: NoopReason) -> Self {
        Self::Noop { reason }
    }

    /// Whether the logical layout changed.
    #[must_use]
    pub fn mutated_layout(&self) -> bool {
        match self {
            Self::Reordered { .. } => true,
            Self::Dropped { pruned, .. } => !pruned.is_empty(),
            _ => false,
        }
    }
}

/// Hold-delay and drag session state machine.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    hold: DelayScheduler<PendingHold>,
    session: Option<DragSession>,
}

impl DragController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> DragPhase {
        if let Some(session) = self.session {
            DragPhase::Dragging(session)
        } else if let Some(hold) = self.hold.peek() {
            DragPhase::PendingHold(*hold)
        } else {
            DragPhase::Idle
        }
    }

    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// When the pending hold elapses. Hosts arm their wake timer with this.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.hold.deadline()
    }

    /// Route one pointer event addressed to `item`.
    ///
    /// While a drag is active the session captures the pointer: moves and
    /// releases drive it whichever element they were addressed to.
    pub fn handle(
        &mut self,
        ctx: &mut DragContext<'_>,
        item: ItemId,
        event: &PointerEvent,
        now: Instant,
    ) -> Result<DragEffect> {
        match event.kind {
            PointerEventKind::Down(button) => {
                self.press(ctx, item, button, event.local, event.panel, now)
            }
            PointerEventKind::Move => self.pointer_move(ctx, item, event),
            PointerEventKind::Up(button) => self.release(ctx, item, button),
            PointerEventKind::Leave => Ok(self.leave(item)),
        }
    }

    fn press(
        &mut self,
        ctx: &mut DragContext<'_>,
        item: ItemId,
        button: PointerButton,
        local: Point,
        panel: Point,
        now: Instant,
    ) -> Result<DragEffect> {
        if self.session.is_some() {
            return Ok(DragEffect::noop(NoopReason::ActiveDragAlreadyInProgress));
        }
        if button != ctx.config.drag_button() {
            return Ok(DragEffect::noop(NoopReason::ButtonMismatch));
        }
        if !ctx.store.contains(item) {
            return Err(PanelError::UnknownItem(item));
        }
        let delay = ctx.config.drag_delay();
        if delay.is_zero() {
            self.hold.cancel();
            return self.on_drag_start(ctx, item, button, local, panel);
        }
        self.hold.schedule(
            now,
            delay,
            PendingHold {
                item,
                button,
                local,
                panel,
            },
        );
        debug!(%item, delay_ms = delay.as_millis() as u64, "hold armed");
        Ok(DragEffect::HoldArmed {
            item,
            deadline: now + delay,
        })
    }

    fn pointer_move(
        &mut self,
        ctx: &mut DragContext<'_>,
        item: ItemId,
        event: &PointerEvent,
    ) -> Result<DragEffect> {
        if let Some(session) = self.session {
            if !event.buttons.is_pressed(session.button) {
                return Ok(DragEffect::noop(NoopReason::DragButtonNotHeld));
            }
            return self.on_drag_move(ctx, event.panel);
        }
        let bounds = ctx.element_bounds();
        let Some(pending) = self.hold.peek_mut() else {
            return Ok(DragEffect::noop(NoopReason::IdleWithoutActiveDrag));
        };
        if pending.item != item {
            return Ok(DragEffect::noop(NoopReason::ItemMismatch));
        }
        if bounds.contains(event.local) {
            pending.local = event.local;
            pending.panel = event.panel;
            return Ok(DragEffect::noop(NoopReason::HoldPending));
        }
        self.hold.cancel();
        debug!(%item, "hold canceled: pointer left the element");
        Ok(DragEffect::HoldCanceled { item })
    }

    fn release(
        &mut self,
        ctx: &mut DragContext<'_>,
        item: ItemId,
        button: PointerButton,
    ) -> Result<DragEffect> {
        if let Some(session) = self.session {
            if button != session.button {
                return Ok(DragEffect::noop(NoopReason::ButtonMismatch));
            }
            return self.on_drag_end(ctx);
        }
        match self.hold.peek() {
            Some(pending) if pending.item != item => {
                Ok(DragEffect::noop(NoopReason::ItemMismatch))
            }
            Some(pending) if pending.button != button => {
                Ok(DragEffect::noop(NoopReason::ButtonMismatch))
            }
            Some(_) => {
                self.hold.cancel();
                debug!(%item, "hold canceled: released before delay");
                Ok(DragEffect::Click { item })
            }
            None => Ok(DragEffect::noop(NoopReason::IdleWithoutActiveDrag)),
        }
    }

    fn leave(&mut self, item: ItemId) -> DragEffect {
        if self.session.is_some() {
            return DragEffect::noop(NoopReason::ActiveDragAlreadyInProgress);
        }
        match self.hold.peek() {
            Some(pending) if pending.item == item => {
                self.hold.cancel();
                debug!(%item, "hold canceled: pointer left the element");
                DragEffect::HoldCanceled { item }
            }
            Some(_) => DragEffect::noop(NoopReason::ItemMismatch),
            None => DragEffect::noop(NoopReason::IdleWithoutActiveDrag),
        }
    }

    /// Start the drag if the pending hold has elapsed by `now`.
    pub fn poll(&mut self, ctx: &mut DragContext<'_>, now: Instant) -> Result<Option<DragEffect>> {
        let Some(hold) = self.hold.poll(now) else {
            return Ok(None);
        };
        if !ctx.store.contains(hold.item) {
            debug!(item = %hold.item, "hold elapsed for a removed item");
            return Ok(Some(DragEffect::noop(NoopReason::UnknownItem)));
        }
        self.on_drag_start(ctx, hold.item, hold.button, hold.local, hold.panel)
            .map(Some)
    }

    /// Lift `item` into a drag session.
    ///
    /// Applies the drag opacity and scale and raises the item to the
    /// dragging tier. The source location comes from the store, not from the
    /// pointer.
    pub fn on_drag_start(
        &mut self,
        ctx: &mut DragContext<'_>,
        item: ItemId,
        button: PointerButton,
        local: Point,
        panel: Point,
    ) -> Result<DragEffect> {
        if self.session.is_some() {
            return Ok(DragEffect::noop(NoopReason::ActiveDragAlreadyInProgress));
        }
        let source = ctx.store.locate(item).ok_or(PanelError::UnknownItem(item))?;
        self.hold.cancel();
        let scale = ctx.config.drag_scale();
        ctx.transitions
            .begin_drag(item, scale, ctx.config.drag_opacity());
        self.session = Some(DragSession {
            item,
            button,
            source,
            grab_offset: local * scale,
            last_panel: panel,
            moved: false,
        });
        debug!(%item, page = source.page, cell = source.cell, "drag started");
        Ok(DragEffect::DragStarted { item, source })
    }

    /// Follow the pointer at `panel` and reorder when it crosses into
    /// another cell.
    pub fn on_drag_move(&mut self, ctx: &mut DragContext<'_>, panel: Point) -> Result<DragEffect> {
        let Some(session) = self.session.as_mut() else {
            return Ok(DragEffect::noop(NoopReason::IdleWithoutActiveDrag));
        };
        let item = session.item;
        let position = panel - session.grab_offset;
        ctx.transitions.follow(item, position);
        session.moved |= panel != session.last_panel;
        session.last_panel = panel;

        let current = ctx.store.locate(item).ok_or(PanelError::UnknownItem(item))?;
        session.source = current;
        let Some(target) = resolve_target(ctx.store, ctx.geometry, item, current, panel) else {
            return Ok(DragEffect::Followed { item, position });
        };

        let report = ctx.store.move_within_cascade(current, target)?;
        session.source = report.to;
        debug!(
            %item,
            from_page = current.page,
            from_cell = current.cell,
            to_page = report.to.page,
            to_cell = report.to.cell,
            moved = report.cascade.moved,
            "drag reordered"
        );
        ctx.relayout();
        Ok(DragEffect::Reordered { report, position })
    }

    /// Drop the dragged item, prune empty pages, and animate everything home.
    pub fn on_drag_end(&mut self, ctx: &mut DragContext<'_>) -> Result<DragEffect> {
        let Some(session) = self.session.take() else {
            return Ok(DragEffect::noop(NoopReason::IdleWithoutActiveDrag));
        };
        let item = session.item;
        let pruned = ctx.store.prune_empty_pages();
        ctx.transitions.end_drag(item);
        ctx.relayout();
        let at = ctx.store.locate(item);
        debug!(%item, pruned = pruned.len(), moved = session.moved, "drag dropped");
        Ok(DragEffect::Dropped {
            item,
            at,
            pruned,
            suppress_click: session.moved,
        })
    }

    /// Release everything `item` holds: cancel its hold or drop its drag.
    pub fn detach(&mut self, ctx: &mut DragContext<'_>, item: ItemId) -> Result<DragEffect> {
        if self.session.is_some_and(|session| session.item == item) {
            return self.on_drag_end(ctx);
        }
        Ok(self.cancel_hold_for(item))
    }

    /// Forget `item` without touching layout; used when it leaves the panel.
    ///
    /// Returns whether a hold or session referenced it.
    pub fn forget(&mut self, item: ItemId) -> bool {
        if self.session.is_some_and(|session| session.item == item) {
            self.session = None;
            debug!(%item, "drag abandoned: item removed");
            return true;
        }
        matches!(self.cancel_hold_for(item), DragEffect::HoldCanceled { .. })
    }

    fn cancel_hold_for(&mut self, item: ItemId) -> DragEffect {
        if self.hold.peek().is_some_and(|pending| pending.item == item) {
            self.hold.cancel();
            debug!(%item, "hold canceled");
            return DragEffect::HoldCanceled { item };
        }
        DragEffect::noop(NoopReason::ItemMismatch)
    }
}

/// Where a dragged item at `current` should move for a pointer at `panel`.
///
/// `None` when the pointer is off every page or over the item's own cell.
fn resolve_target(
    store: &PageStore,
    geometry: &GridGeometry,
    item: ItemId,
    current: CellLocation,
    panel: Point,
) -> Option<CellLocation> {
    let hit = geometry.hit_test(panel, store.page_count())?;
    let page_len = store.page(hit.page).map_or(0, |page| page.len());
    let occupant = page_len
        .checked_sub(1)
        .and_then(|last| store.get(CellLocation::new(hit.page, hit.cell.min(last))));
    if occupant == Some(item) {
        return None;
    }
    // Cells past the end collapse onto the first free slot.
    let limit = if hit.page == current.page {
        page_len.saturating_sub(1)
    } else {
        page_len
    };
    let target = CellLocation::new(hit.page, hit.cell.min(limit));
    (target != current).then_some(target)
}
