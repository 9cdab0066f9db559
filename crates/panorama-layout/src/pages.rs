#![forbid(unsafe_code)]

//! Page/item store.
//!
//! [`PageStore`] is the logical model behind the panel: an ordered list of
//! pages, each an ordered list of [`ItemId`]s. It knows nothing about pixels.
//!
//! # Invariants
//!
//! 1. After every public operation, `page.len() <= capacity` for all pages.
//!    Overflow created inside an operation is cascaded forward before it
//!    returns: a page's last item moves to the front of the next page, and a
//!    trailing page is appended when needed.
//! 2. Every item appears exactly once across all pages (conservation).
//! 3. Operations validate all indices before mutating. A rejected operation
//!    leaves the store untouched.
//! 4. Pages are identified only by position. Removing a page shifts every
//!    later index down by one.
//!
//! # Failure Modes
//!
//! - Page index outside `[0, page_count)`: [`PageStoreError::PageOutOfRange`].
//! - Cell index outside `[0, page.len()]` for inserts, or `[0, page.len())`
//!   for removals: [`PageStoreError::CellOutOfRange`]. The store never clamps.
//! - Inserting an item already present: [`PageStoreError::DuplicateItem`].

use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use panorama_core::logging::{debug, warn};
#[cfg(not(feature = "tracing"))]
use panorama_core::{debug, warn};

/// Opaque handle for one item. The host maps it to its own visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// A (page, cell) address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellLocation {
    pub page: usize,
    pub cell: usize,
}

impl CellLocation {
    #[inline]
    pub const fn new(page: usize, cell: usize) -> Self {
        Self { page, cell }
    }
}

/// One fixed-capacity page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    items: Vec<ItemId>,
}

impl Page {
    /// Items in cell order.
    #[inline]
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item in `cell`, if occupied.
    #[inline]
    pub fn get(&self, cell: usize) -> Option<ItemId> {
        self.items.get(cell).copied()
    }

    /// Cell holding `item`.
    pub fn position(&self, item: ItemId) -> Option<usize> {
        self.items.iter().position(|&candidate| candidate == item)
    }
}

/// Outcome of a cascade pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Items moved from one page to the next.
    pub moved: usize,
    /// Trailing pages appended to absorb overflow.
    pub pages_created: usize,
}

/// Outcome of a reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    pub item: ItemId,
    pub from: CellLocation,
    /// Where the item landed once the cascade settled.
    pub to: CellLocation,
    pub cascade: CascadeReport,
}

/// Structural operation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStoreError {
    PageOutOfRange { page: usize, page_count: usize },
    CellOutOfRange { page: usize, cell: usize, len: usize },
    DuplicateItem(ItemId),
    UnknownItem(ItemId),
}

impl fmt::Display for PageStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageOutOfRange { page, page_count } => {
                write!(f, "page {page} out of range (page count {page_count})")
            }
            Self::CellOutOfRange { page, cell, len } => {
                write!(f, "cell {cell} out of range on page {page} (len {len})")
            }
            Self::DuplicateItem(item) => write!(f, "{item} is already stored"),
            Self::UnknownItem(item) => write!(f, "{item} is not stored"),
        }
    }
}

impl std::error::Error for PageStoreError {}

/// Serializable read-only view of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub capacity: usize,
    pub pages: Vec<Vec<ItemId>>,
}

impl LayoutSnapshot {
    /// Total items across all pages.
    pub fn item_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }
}

/// Ordered pages of items with a shared per-page capacity.
#[derive(Debug, Clone)]
pub struct PageStore {
    pages: Vec<Page>,
    capacity: usize,
    members: FxHashSet<ItemId>,
}

impl PageStore {
    /// Create an empty store. A zero capacity is raised to 1.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            pages: Vec::new(),
            capacity: capacity.max(1),
            members: FxHashSet::default(),
        }
    }

    /// Build a store by filling pages in order to capacity.
    pub fn from_items(
        capacity: usize,
        items: impl IntoIterator<Item = ItemId>,
    ) -> Result<Self, PageStoreError> {
        let mut store = Self::new(capacity);
        for item in items {
            store.push(item)?;
        }
        Ok(store)
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total items across all pages.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[inline]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    #[inline]
    pub fn page(&self, page: usize) -> Option<&Page> {
        self.pages.get(page)
    }

    /// Item at `location`, if occupied.
    pub fn get(&self, location: CellLocation) -> Option<ItemId> {
        self.pages.get(location.page)?.get(location.cell)
    }

    #[inline]
    pub fn contains(&self, item: ItemId) -> bool {
        self.members.contains(&item)
    }

    /// Where `item` currently lives.
    pub fn locate(&self, item: ItemId) -> Option<CellLocation> {
        if !self.contains(item) {
            return None;
        }
        self.pages.iter().enumerate().find_map(|(page, p)| {
            p.position(item).map(|cell| CellLocation::new(page, cell))
        })
    }

    /// Every item with its location, in page then cell order.
    pub fn iter(&self) -> impl Iterator<Item = (CellLocation, ItemId)> + '_ {
        self.pages.iter().enumerate().flat_map(|(page, p)| {
            p.items
                .iter()
                .enumerate()
                .map(move |(cell, &item)| (CellLocation::new(page, cell), item))
        })
    }

    /// Read-only copy for rendering or serialization.
    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            capacity: self.capacity,
            pages: self.pages.iter().map(|p| p.items.clone()).collect(),
        }
    }

    /// Append an empty page at the tail, returning its index.
    pub fn push_page(&mut self) -> usize {
        self.pages.push(Page::default());
        self.pages.len() - 1
    }

    /// Append `item` to the last page, starting a new page when it is full.
    pub fn push(&mut self, item: ItemId) -> Result<CellLocation, PageStoreError> {
        self.ensure_absent(item)?;
        let page = match self.pages.last() {
            Some(last) if last.len() < self.capacity => self.pages.len() - 1,
            _ => self.push_page(),
        };
        self.members.insert(item);
        self.pages[page].items.push(item);
        Ok(CellLocation::new(page, self.pages[page].len() - 1))
    }

    /// Insert `item` at `(page, cell)`, shifting later items forward, then
    /// cascade any overflow. `cell` may equal the page length (append).
    pub fn insert(
        &mut self,
        page: usize,
        cell: usize,
        item: ItemId,
    ) -> Result<CascadeReport, PageStoreError> {
        self.ensure_absent(item)?;
        self.check_insert(page, cell, 0)?;
        self.members.insert(item);
        self.pages[page].items.insert(cell, item);
        Ok(self.cascade())
    }

    /// Remove and return the item at `(page, cell)`. Empty pages are kept;
    /// see [`prune_empty_pages`](Self::prune_empty_pages).
    pub fn remove_at(&mut self, page: usize, cell: usize) -> Result<ItemId, PageStoreError> {
        self.check_occupied(page, cell)?;
        let item = self.pages[page].items.remove(cell);
        self.members.remove(&item);
        Ok(item)
    }

    /// Remove `item` wherever it is, returning its former location.
    pub fn remove(&mut self, item: ItemId) -> Result<CellLocation, PageStoreError> {
        let location = self.locate(item).ok_or(PageStoreError::UnknownItem(item))?;
        self.remove_at(location.page, location.cell)?;
        Ok(location)
    }

    /// Move the item at `from` to `to` and cascade the overflow.
    ///
    /// `to.cell` addresses the target page as it looks after the item has
    /// been taken out, so it may be at most that page's length.
    pub fn move_within_cascade(
        &mut self,
        from: CellLocation,
        to: CellLocation,
    ) -> Result<MoveReport, PageStoreError> {
        self.check_occupied(from.page, from.cell)?;
        let shrink = usize::from(from.page == to.page);
        self.check_insert(to.page, to.cell, shrink)?;

        let item = self.pages[from.page].items.remove(from.cell);
        self.pages[to.page].items.insert(to.cell, item);
        let cascade = self.cascade();
        let landed = self
            .locate(item)
            .ok_or(PageStoreError::UnknownItem(item))?;

        Ok(MoveReport {
            item,
            from,
            to: landed,
            cascade,
        })
    }

    /// Push overflow forward until every page fits its capacity.
    ///
    /// Pages are visited in order; while a page is over capacity its last
    /// item moves to the front of the next page, appending a trailing page
    /// if there is none. Overflow therefore ripples through as many pages as
    /// it needs to.
    pub fn cascade(&mut self) -> CascadeReport {
        let mut report = CascadeReport::default();
        let mut index = 0;
        while index < self.pages.len() {
            while self.pages[index].len() > self.capacity {
                if index + 1 == self.pages.len() {
                    self.push_page();
                    report.pages_created += 1;
                    debug!(page = index + 1, "cascade created trailing page");
                }
                if let Some(item) = self.pages[index].items.pop() {
                    self.pages[index + 1].items.insert(0, item);
                    report.moved += 1;
                }
            }
            index += 1;
        }
        report
    }

    /// Remove every empty page, keeping the order of the rest.
    ///
    /// Returns the removed page indices in ascending order (pre-removal
    /// numbering).
    pub fn prune_empty_pages(&mut self) -> Vec<usize> {
        let removed: Vec<usize> = self
            .pages
            .iter()
            .enumerate()
            .filter(|(_, page)| page.is_empty())
            .map(|(index, _)| index)
            .collect();
        if !removed.is_empty() {
            self.pages.retain(|page| !page.is_empty());
            debug!(count = removed.len(), "pruned empty pages");
        }
        removed
    }

    /// Change the capacity and cascade so every page fits again.
    pub fn set_capacity(&mut self, capacity: usize) -> CascadeReport {
        self.capacity = capacity.max(1);
        self.cascade()
    }

    fn ensure_absent(&self, item: ItemId) -> Result<(), PageStoreError> {
        if self.contains(item) {
            warn!(%item, "rejected duplicate item");
            return Err(PageStoreError::DuplicateItem(item));
        }
        Ok(())
    }

    fn check_page(&self, page: usize) -> Result<&Page, PageStoreError> {
        self.pages.get(page).ok_or_else(|| {
            warn!(page, page_count = self.pages.len(), "page out of range");
            PageStoreError::PageOutOfRange {
                page,
                page_count: self.pages.len(),
            }
        })
    }

    fn check_occupied(&self, page: usize, cell: usize) -> Result<(), PageStoreError> {
        let len = self.check_page(page)?.len();
        if cell >= len {
            warn!(page, cell, len, "cell out of range");
            return Err(PageStoreError::CellOutOfRange { page, cell, len });
        }
        Ok(())
    }

    /// `shrink` is subtracted from the page length for moves within a page.
    fn check_insert(&self, page: usize, cell: usize, shrink: usize) -> Result<(), PageStoreError> {
        let len = self.check_page(page)?.len() - shrink;
        if cell > len {
            warn!(page, cell, len, "insertion cell out of range");
            return Err(PageStoreError::CellOutOfRange { page, cell, len });
        }
        Ok(())
    }
}
