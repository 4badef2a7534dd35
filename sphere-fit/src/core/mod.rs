//! Core data types shared by the fit, filter and transport layers.

pub mod types;

pub use types::{FilteredSphereParams, Point3D, PointSet, SphereParams};
