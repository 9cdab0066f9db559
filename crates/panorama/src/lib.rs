#![forbid(unsafe_code)]

//! Paged grid panel with press-and-hold drag reordering.
//!
//! Items live on fixed-capacity pages laid out side by side (or stacked).
//! Dragging an item across cells reorders it; overflow cascades forward onto
//! following pages, and pages emptied by a drag are pruned when it ends.
//! Items animate to their new cells with a configurable duration and easing.
//!
//! This crate is the interactive layer; geometry and the page model live in
//! `panorama-layout`, input and animation primitives in `panorama-core`. Use
//! [`prelude`] for day-to-day usage.

pub mod behavior;
pub mod config;
pub mod drag;
pub mod error;
pub mod panel;
pub mod transition;

// --- Panel re-exports ------------------------------------------------------

pub use behavior::DragBehavior;
pub use config::{Invalidation, PanelConfig, coerce_drag_opacity};
pub use drag::{
    DragContext, DragController, DragEffect, DragPhase, DragSession, NoopReason, PendingHold,
};
pub use error::{PanelError, Result};
pub use panel::PanoramaPanel;
pub use transition::{DrawTier, ItemVisual, TransitionScheduler};

// --- Layout and core re-exports --------------------------------------------

pub use panorama_core::Instant;
pub use panorama_core::event::{PointerButton, PointerButtons, PointerEvent, PointerEventKind};
pub use panorama_core::geometry::{Point, Rect, Sides, Size};
pub use panorama_layout::{
    CascadeReport, CellLocation, GridConfig, GridGeometry, ItemId, LayoutSnapshot, MoveReport,
    Orientation, PageStore, PageStoreError,
};

pub use panorama_core as core;
pub use panorama_layout as layout;

pub mod prelude {
    pub use crate::{
        DragBehavior, DragEffect, DrawTier, Instant, ItemId, ItemVisual, Orientation, PanelConfig,
        PanelError, PanoramaPanel, Point, PointerButton, PointerButtons, PointerEvent, Result,
    };

    pub use crate::{core, layout};
}
