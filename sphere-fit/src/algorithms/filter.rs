//! Exponential smoothing of sphere estimates.
//!
//! Each of the four sphere parameters runs through an independent
//! single-pole IIR filter:
//!
//! ```text
//! next = g × raw + (1 − g) × prev
//! ```
//!
//! | Gain   | Behaviour                                   |
//! |--------|---------------------------------------------|
//! | 1.0    | Passthrough, output equals the raw fit      |
//! | 0.1    | Settles within a few dozen ticks            |
//! | 0.0005 | Heavy smoothing, thousands of ticks to settle |
//!
//! The center coordinates share `point_gain`; the radius has its own
//! `radius_gain`. The filter functions are pure: the caller owns the
//! [`FilterState`] and stores the returned value for the next tick.

use crate::core::types::{FilteredSphereParams, SphereParams};

/// Default gain for the center coordinates.
pub const DEFAULT_POINT_GAIN: f64 = 0.0005;

/// Default gain for the radius.
pub const DEFAULT_RADIUS_GAIN: f64 = 0.005;

/// One exponential filter step.
#[inline]
pub fn exponential_filter(value: f64, previous: f64, gain: f64) -> f64 {
    gain * value + (1.0 - gain) * previous
}

/// Smoothing gains, each in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterGains {
    /// Gain shared by xc, yc and zc.
    pub point_gain: f64,
    /// Gain for the radius.
    pub radius_gain: f64,
}

impl Default for FilterGains {
    fn default() -> Self {
        Self {
            point_gain: DEFAULT_POINT_GAIN,
            radius_gain: DEFAULT_RADIUS_GAIN,
        }
    }
}

impl FilterGains {
    /// Gains of 1.0 that pass raw fits straight through.
    pub fn passthrough() -> Self {
        Self {
            point_gain: 1.0,
            radius_gain: 1.0,
        }
    }

    /// True if both gains lie in (0, 1].
    pub fn is_valid(&self) -> bool {
        gain_in_range(self.point_gain) && gain_in_range(self.radius_gain)
    }
}

fn gain_in_range(gain: f64) -> bool {
    gain > 0.0 && gain <= 1.0
}

/// Persistent smoothed values, one per sphere parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub radius: f64,
}

impl FilterState {
    pub fn new(x: f64, y: f64, z: f64, radius: f64) -> Self {
        Self { x, y, z, radius }
    }

    /// Advance the state by one raw fit and return the new state.
    pub fn step(&self, raw: &SphereParams, gains: &FilterGains) -> FilterState {
        FilterState {
            x: exponential_filter(raw.xc, self.x, gains.point_gain),
            y: exponential_filter(raw.yc, self.y, gains.point_gain),
            z: exponential_filter(raw.zc, self.z, gains.point_gain),
            radius: exponential_filter(raw.radius, self.radius, gains.radius_gain),
        }
    }

    /// Current state as the published output record.
    pub fn output(&self) -> FilteredSphereParams {
        FilteredSphereParams::new(self.x, self.y, self.z, self.radius)
    }
}
