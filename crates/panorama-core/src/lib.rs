#![forbid(unsafe_code)]

//! Core: geometry, pointer events, easing, and hold-delay timing.
//!
//! # Role in Panorama
//! `panorama-core` is the host boundary. It owns the value types every other
//! crate speaks (points, rectangles, pointer events) plus the two pieces of
//! time handling the panel needs: eased tweens for transitions and a
//! single-shot delay for press-and-hold detection.
//!
//! # Primary responsibilities
//! - **Geometry**: `Point`, `Size`, `Rect`, `Sides` in `f64` units.
//! - **PointerEvent**: button identity plus element- and panel-local positions.
//! - **Animation**: the `Animation` trait, easing curves, and `Tween`.
//! - **DelayScheduler**: clock-injected, cancelable one-slot deferral.
//!
//! # How it fits in the system
//! `panorama-layout` builds the grid model on these geometry types, and
//! `panorama` drives drag interaction and transitions from pointer events
//! and ticks supplied by the host.

pub mod animation;
pub mod delay;
pub mod event;
pub mod geometry;
pub mod logging;

pub use web_time::Instant;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
