//! Core data types for points and sphere estimates.
//!
//! - [`Point3D`] / [`PointSet`]: one observation of the sphere surface
//! - [`SphereParams`]: raw fit from a single cycle
//! - [`FilteredSphereParams`]: smoothed output handed to the sink

use serde::{Deserialize, Serialize};

/// A point in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    /// Create a new point.
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared distance from the origin.
    #[inline]
    pub fn norm_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }
}

/// Points captured at one observation instant.
///
/// A point set is built once and then shared read-only; a new observation
/// replaces it rather than modifying it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointSet {
    points: Vec<Point3D>,
}

impl PointSet {
    /// Wrap an ordered list of points.
    pub fn new(points: Vec<Point3D>) -> Self {
        Self { points }
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the set holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in observation order.
    #[inline]
    pub fn points(&self) -> &[Point3D] {
        &self.points
    }

    /// Iterate over the points.
    pub fn iter(&self) -> impl Iterator<Item = &Point3D> {
        self.points.iter()
    }
}

impl From<Vec<Point3D>> for PointSet {
    fn from(points: Vec<Point3D>) -> Self {
        Self::new(points)
    }
}

impl FromIterator<Point3D> for PointSet {
    fn from_iter<I: IntoIterator<Item = Point3D>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Unfiltered sphere estimate from one solve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SphereParams {
    pub xc: f64,
    pub yc: f64,
    pub zc: f64,
    pub radius: f64,
}

impl SphereParams {
    pub fn new(xc: f64, yc: f64, zc: f64, radius: f64) -> Self {
        Self { xc, yc, zc, radius }
    }
}

/// Smoothed sphere estimate emitted once per successful tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilteredSphereParams {
    pub xc: f64,
    pub yc: f64,
    pub zc: f64,
    pub radius: f64,
}

impl FilteredSphereParams {
    pub fn new(xc: f64, yc: f64, zc: f64, radius: f64) -> Self {
        Self { xc, yc, zc, radius }
    }
}
