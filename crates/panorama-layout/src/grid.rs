#![forbid(unsafe_code)]

//! Paged grid geometry.
//!
//! Pages tile along one axis; each page holds a centered grid of equally
//! sized cells filled row-major (left to right, then top to bottom).
//!
//! ```text
//!  page 0                    page 1
//! +--------------------+   +--------------------+
//! |  padding           |   |                    |
//! |   +----+----+----+ |   |   +----+----+----+ |
//! |   | 0  | 1  | 2  | |   |   | 0  | 1  | 2  | |
//! |   +----+----+----+ |   |   +----+----+----+ |
//! |   | 3  | 4  | 5  | |   |   | 3  | 4  | 5  | |
//! |   +----+----+----+ |   |   +----+----+----+ |
//! +--------------------+   +--------------------+
//! ```
//!
//! # Invariants
//!
//! 1. `columns >= 1` and `rows >= 1` for every configuration, so
//!    `capacity >= 1` and layout always terminates.
//! 2. Every query is a pure function of the configuration.
//! 3. Page and cell indices returned by the point queries are unclamped;
//!    only [`GridGeometry::hit_test`] clamps.
//!
//! # Failure Modes
//!
//! - Non-positive or non-finite cell or page dimensions: the affected track
//!   count floors to 1 instead of failing.
//! - Negative or out-of-range page indices passed to the rectangle queries
//!   produce well-defined but meaningless geometry (no panic).

use panorama_core::geometry::{Point, Rect, Sides, Size};
use serde::{Deserialize, Serialize};

/// Upper bound on cells per track, so absurd ratios cannot overflow capacity.
pub const MAX_TRACK_CELLS: usize = 4096;

/// The axis along which pages tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Pages side by side along X.
    #[default]
    Horizontal,
    /// Pages stacked along Y.
    Vertical,
}

/// Everything the geometry depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    pub page_size: Size,
    pub cell_size: Size,
    pub padding: Sides,
    pub orientation: Orientation,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: Size::new(400.0, 300.0),
            cell_size: Size::new(100.0, 100.0),
            padding: Sides::default(),
            orientation: Orientation::Horizontal,
        }
    }
}

/// Result of a clamped hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellHit {
    pub page: usize,
    pub cell: usize,
    /// False when the point missed the grid and `cell` is the last-cell sentinel.
    pub inside_grid: bool,
}

/// Resolved geometry for one [`GridConfig`].
///
/// Construct a new one whenever the configuration changes; the track counts
/// are computed once here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    config: GridConfig,
    columns: usize,
    rows: usize,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

fn track_cells(extent: f64, cell: f64) -> usize {
    if !(cell.is_finite() && cell > 0.0 && extent.is_finite()) {
        return 1;
    }
    (extent / cell).floor().clamp(1.0, MAX_TRACK_CELLS as f64) as usize
}

fn floor_to_i32(value: f64) -> i32 {
    // `as` saturates and maps NaN to 0.
    value.floor() as i32
}

impl GridGeometry {
    /// Resolve geometry for `config`.
    #[must_use]
    pub fn new(config: GridConfig) -> Self {
        let usable = Rect::from_size(config.page_size.width, config.page_size.height)
            .inner(config.padding);
        Self {
            config,
            columns: track_cells(usable.width, config.cell_size.width),
            rows: track_cells(usable.height, config.cell_size.height),
        }
    }

    /// The configuration this geometry was built from.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Cells per row (derived from the usable width).
    #[inline]
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Rows per page (derived from the usable height).
    #[inline]
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Items a page can hold: `columns * rows`, at least 1.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.columns * self.rows
    }

    /// Index of the last cell on a page, used when a hit misses the grid.
    #[inline]
    #[must_use]
    pub const fn last_cell(&self) -> usize {
        self.capacity() - 1
    }

    /// Bounds of page `page`.
    #[must_use]
    pub fn page_rect(&self, page: i32) -> Rect {
        let Size { width, height } = self.config.page_size;
        let offset = f64::from(page);
        match self.config.orientation {
            Orientation::Horizontal => Rect::new(offset * width, 0.0, width, height),
            Orientation::Vertical => Rect::new(0.0, offset * height, width, height),
        }
    }

    /// Bounds of the cell block on page `page`, centered in the padded area.
    #[must_use]
    pub fn grid_rect(&self, page: i32) -> Rect {
        let usable = self.page_rect(page).inner(self.config.padding);
        let block_width = self.columns as f64 * self.config.cell_size.width;
        let block_height = self.rows as f64 * self.config.cell_size.height;
        Rect::new(
            usable.x + (usable.width - block_width) / 2.0,
            usable.y + (usable.height - block_height) / 2.0,
            block_width,
            block_height,
        )
    }

    /// Bounds of cell `cell` on page `page`.
    #[must_use]
    pub fn cell_rect(&self, page: i32, cell: usize) -> Rect {
        let grid = self.grid_rect(page);
        let Size { width, height } = self.config.cell_size;
        let column = (cell % self.columns) as f64;
        let row = (cell / self.columns) as f64;
        Rect::new(grid.x + column * width, grid.y + row * height, width, height)
    }

    /// Page under `point`. Unclamped: may be negative or past the last page.
    #[must_use]
    pub fn page_index_at(&self, point: Point) -> i32 {
        match self.config.orientation {
            Orientation::Horizontal => floor_to_i32(point.x / self.config.page_size.width),
            Orientation::Vertical => floor_to_i32(point.y / self.config.page_size.height),
        }
    }

    /// Cell under `point` within its page's grid. Unclamped: only meaningful
    /// when the point lies inside that page's [`grid_rect`](Self::grid_rect).
    #[must_use]
    pub fn cell_index_at(&self, point: Point) -> i32 {
        let grid = self.grid_rect(self.page_index_at(point));
        let local = point - grid.origin();
        let column = (local.x / self.config.cell_size.width).floor();
        let row = (local.y / self.config.cell_size.height).floor();
        floor_to_i32(column + row * self.columns as f64)
    }

    /// Clamped hit test for drag targeting.
    ///
    /// Returns `None` when the point is outside `[0, page_count)` pages.
    /// A point on a valid page but outside its grid resolves to the
    /// last-cell sentinel.
    #[must_use]
    pub fn hit_test(&self, point: Point, page_count: usize) -> Option<CellHit> {
        let page = usize::try_from(self.page_index_at(point)).ok()?;
        if page >= page_count {
            return None;
        }
        let grid = self.grid_rect(page as i32);
        if grid.contains(point) {
            let cell = usize::try_from(self.cell_index_at(point))
                .unwrap_or(0)
                .min(self.last_cell());
            Some(CellHit {
                page,
                cell,
                inside_grid: true,
            })
        } else {
            Some(CellHit {
                page,
                cell: self.last_cell(),
                inside_grid: false,
            })
        }
    }

    /// Size of a panel holding `page_count` pages.
    #[must_use]
    pub fn panel_size(&self, page_count: usize) -> Size {
        let Size { width, height } = self.config.page_size;
        let pages = page_count as f64;
        match self.config.orientation {
            Orientation::Horizontal => Size::new(width * pages, height),
            Orientation::Vertical => Size::new(width, height * pages),
        }
    }
}
