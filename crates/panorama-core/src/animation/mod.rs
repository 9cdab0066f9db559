#![forbid(unsafe_code)]

//! Time-driven animation primitives.
//!
//! The panel never owns a render loop. Hosts advance animations by calling
//! `tick(dt)` with the elapsed frame time and read `value()` back, which keeps
//! every transition deterministic under test.
//!
//! # Easing
//!
//! An [`EasingFn`] maps linear progress `t` in `[0.0, 1.0]` to eased progress.
//! All provided curves satisfy `f(0) == 0` and `f(1) == 1` and are monotonic.

mod tween;

pub use tween::Tween;

use std::time::Duration;

/// Easing curve: linear progress in, eased progress out.
pub type EasingFn = fn(f32) -> f32;

/// A time-driven animation producing a scalar value.
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Current value, usually eased progress in `[0.0, 1.0]`.
    fn value(&self) -> f32;

    /// Rewind to the start.
    fn reset(&mut self);
}

/// No easing.
#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-in.
#[inline]
pub fn ease_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

/// Quadratic ease-out.
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in-out.
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Cubic ease-in.
#[inline]
pub fn ease_in_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t
}

/// Cubic ease-out.
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Cubic ease-in-out.
#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVES: [EasingFn; 7] = [
        linear,
        ease_in,
        ease_out,
        ease_in_out,
        ease_in_cubic,
        ease_out_cubic,
        ease_in_out_cubic,
    ];

    #[test]
    fn curves_hit_endpoints() {
        for curve in CURVES {
            assert!(curve(0.0).abs() < 1e-6);
            assert!((curve(1.0) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn curves_clamp_out_of_range_input() {
        for curve in CURVES {
            assert!(curve(-1.0).abs() < 1e-6);
            assert!((curve(2.0) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn symmetric_curves_pass_midpoint() {
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-6);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-6);
        assert!((linear(0.5) - 0.5).abs() < 1e-6);
    }
}
