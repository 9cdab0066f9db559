#![forbid(unsafe_code)]

//! Paged grid layout: geometry and the page/item model.
//!
//! - [`GridGeometry`] answers where pages, grids, and cells are, and which
//!   page/cell a point falls in.
//! - [`PageStore`] holds the ordered pages of item handles and enforces the
//!   per-page capacity by cascading overflow forward.
//!
//! Neither type knows about pointer input or animation; the `panorama` crate
//! combines them into the interactive panel.

pub mod grid;
pub mod pages;

pub use grid::{CellHit, GridConfig, GridGeometry, MAX_TRACK_CELLS, Orientation};
pub use pages::{
    CascadeReport, CellLocation, ItemId, LayoutSnapshot, MoveReport, Page, PageStore,
    PageStoreError,
};
pub use panorama_core::geometry::{Point, Rect, Sides, Size};
