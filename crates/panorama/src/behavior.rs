#![forbid(unsafe_code)]

//! Per-element input adapter.
//!
//! A host creates one [`DragBehavior`] per item element, attaches it when the
//! element joins the panel, forwards the element's pointer events through
//! [`on_pointer`](DragBehavior::on_pointer), and detaches it when the element
//! goes away. Detaching releases whatever the element held: a pending hold is
//! canceled and an active drag is dropped where it is.

use panorama_core::Instant;
use panorama_core::event::PointerEvent;
use panorama_layout::ItemId;

use crate::drag::DragEffect;
use crate::error::{PanelError, Result};
use crate::panel::PanoramaPanel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragBehavior {
    item: ItemId,
    attached: bool,
}

impl DragBehavior {
    /// A detached behavior for `item`.
    #[must_use]
    pub const fn new(item: ItemId) -> Self {
        Self {
            item,
            attached: false,
        }
    }

    #[inline]
    pub const fn item(&self) -> ItemId {
        self.item
    }

    #[inline]
    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    /// Start forwarding input. The item must already be in `panel`.
    pub fn attach(&mut self, panel: &PanoramaPanel) -> Result<()> {
        if !panel.contains(self.item) {
            return Err(PanelError::UnknownItem(self.item));
        }
        self.attached = true;
        Ok(())
    }

    /// Stop forwarding input and release any hold or drag of the item.
    pub fn detach(&mut self, panel: &mut PanoramaPanel) -> Result<DragEffect> {
        if !self.attached {
            return Err(PanelError::NotAttached(self.item));
        }
        self.attached = false;
        panel.release_item(self.item)
    }

    /// Forward one pointer event from the element.
    pub fn on_pointer(
        &self,
        panel: &mut PanoramaPanel,
        event: &PointerEvent,
        now: Instant,
    ) -> Result<DragEffect> {
        if !self.attached {
            return Err(PanelError::NotAttached(self.item));
        }
        panel.pointer(self.item, event, now)
    }
}
