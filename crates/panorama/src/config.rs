#![forbid(unsafe_code)]

//! Panel configuration.
//!
//! Every property has a getter and a setter. Setters coerce out-of-range
//! input instead of failing and return the [`Invalidation`] the change
//! causes; the panel applies it through [`PanoramaPanel::configure`].
//!
//! [`PanoramaPanel::configure`]: crate::PanoramaPanel::configure

use std::time::Duration;

use bitflags::bitflags;
use panorama_core::animation::{EasingFn, linear};
use panorama_core::event::PointerButton;
use panorama_core::geometry::{Sides, Size};
use panorama_layout::{GridConfig, Orientation};

#[cfg(feature = "tracing")]
use panorama_core::logging::trace;
#[cfg(not(feature = "tracing"))]
use panorama_core::trace;

/// Lowest opacity a dragged item may take.
pub const MIN_DRAG_OPACITY: f64 = 0.1;
/// Opacity of items at rest.
pub const DEFAULT_OPACITY: f64 = 1.0;
/// Scale of items at rest.
pub const DEFAULT_SCALE: f64 = 1.0;
pub const DEFAULT_DRAG_DELAY: Duration = Duration::from_millis(300);
pub const DEFAULT_TRANSITION_DURATION: Duration = Duration::from_millis(300);

bitflags! {
    /// Layout work a configuration change requires.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Invalidation: u8 {
        const NONE    = 0b00;
        /// Geometry changed: recompute capacity, reflow pages, re-arrange.
        const MEASURE = 0b01;
        /// Positions changed: re-run the layout pass.
        const ARRANGE = 0b10;
    }
}

/// All host-settable panel properties.
#[derive(Debug, Clone, Copy)]
pub struct PanelConfig {
    cell_width: f64,
    cell_height: f64,
    page_width: f64,
    page_height: f64,
    padding: Sides,
    orientation: Orientation,
    drag_button: PointerButton,
    drag_delay: Duration,
    drag_scale: f64,
    drag_opacity: f64,
    transition_duration: Duration,
    easing: EasingFn,
}

impl Default for PanelConfig {
    fn default() -> Self {
        let grid = GridConfig::default();
        Self {
            cell_width: grid.cell_size.width,
            cell_height: grid.cell_size.height,
            page_width: grid.page_size.width,
            page_height: grid.page_size.height,
            padding: grid.padding,
            orientation: grid.orientation,
            drag_button: PointerButton::Left,
            drag_delay: DEFAULT_DRAG_DELAY,
            drag_scale: DEFAULT_SCALE,
            drag_opacity: DEFAULT_OPACITY,
            transition_duration: DEFAULT_TRANSITION_DURATION,
            easing: linear,
        }
    }
}

/// Clamp drag opacity into `[MIN_DRAG_OPACITY, DEFAULT_OPACITY]`.
/// NaN resets to fully opaque.
#[must_use]
pub fn coerce_drag_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() {
        return DEFAULT_OPACITY;
    }
    opacity.clamp(MIN_DRAG_OPACITY, DEFAULT_OPACITY)
}

fn coerce_drag_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        DEFAULT_SCALE
    }
}

fn changed(old: f64, new: f64, on_change: Invalidation) -> Invalidation {
    if old.to_bits() == new.to_bits() {
        Invalidation::NONE
    } else {
        on_change
    }
}

impl PanelConfig {
    /// Grid inputs for [`GridGeometry`](panorama_layout::GridGeometry).
    #[must_use]
    pub fn grid_config(&self) -> GridConfig {
        GridConfig {
            page_size: Size::new(self.page_width, self.page_height),
            cell_size: Size::new(self.cell_width, self.cell_height),
            padding: self.padding,
            orientation: self.orientation,
        }
    }

    pub const fn cell_width(&self) -> f64 {
        self.cell_width
    }

    pub fn set_cell_width(&mut self, width: f64) -> Invalidation {
        let inv = changed(self.cell_width, width, Invalidation::MEASURE);
        self.cell_width = width;
        inv
    }

    pub const fn cell_height(&self) -> f64 {
        self.cell_height
    }

    pub fn set_cell_height(&mut self, height: f64) -> Invalidation {
        let inv = changed(self.cell_height, height, Invalidation::MEASURE);
        self.cell_height = height;
        inv
    }

    pub const fn page_width(&self) -> f64 {
        self.page_width
    }

    pub fn set_page_width(&mut self, width: f64) -> Invalidation {
        let inv = changed(self.page_width, width, Invalidation::MEASURE);
        self.page_width = width;
        inv
    }

    pub const fn page_height(&self) -> f64 {
        self.page_height
    }

    pub fn set_page_height(&mut self, height: f64) -> Invalidation {
        let inv = changed(self.page_height, height, Invalidation::MEASURE);
        self.page_height = height;
        inv
    }

    pub const fn padding(&self) -> Sides {
        self.padding
    }

    pub fn set_padding(&mut self, padding: impl Into<Sides>) -> Invalidation {
        let padding = padding.into();
        if padding == self.padding {
            return Invalidation::NONE;
        }
        self.padding = padding;
        Invalidation::MEASURE
    }

    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) -> Invalidation {
        if orientation == self.orientation {
            return Invalidation::NONE;
        }
        self.orientation = orientation;
        Invalidation::MEASURE
    }

    /// Button that starts a drag.
    pub const fn drag_button(&self) -> PointerButton {
        self.drag_button
    }

    pub fn set_drag_button(&mut self, button: PointerButton) -> Invalidation {
        self.drag_button = button;
        Invalidation::NONE
    }

    /// Press-and-hold time before a press becomes a drag.
    pub const fn drag_delay(&self) -> Duration {
        self.drag_delay
    }

    pub fn set_drag_delay(&mut self, delay: Duration) -> Invalidation {
        self.drag_delay = delay;
        Invalidation::NONE
    }

    /// Scale applied to an item while it is dragged.
    pub const fn drag_scale(&self) -> f64 {
        self.drag_scale
    }

    /// Non-finite or non-positive scales reset to 1.0.
    pub fn set_drag_scale(&mut self, scale: f64) -> Invalidation {
        let coerced = coerce_drag_scale(scale);
        if coerced.to_bits() != scale.to_bits() {
            trace!(requested = scale, coerced, "drag scale coerced");
        }
        self.drag_scale = coerced;
        Invalidation::NONE
    }

    /// Opacity applied to an item while it is dragged, in `[0.1, 1.0]`.
    pub const fn drag_opacity(&self) -> f64 {
        self.drag_opacity
    }

    pub fn set_drag_opacity(&mut self, opacity: f64) -> Invalidation {
        let coerced = coerce_drag_opacity(opacity);
        if coerced.to_bits() != opacity.to_bits() {
            trace!(requested = opacity, coerced, "drag opacity coerced");
        }
        self.drag_opacity = coerced;
        Invalidation::NONE
    }

    pub const fn transition_duration(&self) -> Duration {
        self.transition_duration
    }

    /// Applies to transitions started after the change.
    pub fn set_transition_duration(&mut self, duration: Duration) -> Invalidation {
        self.transition_duration = duration;
        Invalidation::NONE
    }

    pub const fn easing(&self) -> EasingFn {
        self.easing
    }

    /// Applies to transitions started after the change.
    pub fn set_easing(&mut self, easing: EasingFn) -> Invalidation {
        self.easing = easing;
        Invalidation::NONE
    }
}
