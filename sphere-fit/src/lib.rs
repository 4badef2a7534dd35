//! sphere-fit - Sphere estimation from streamed 3D point clouds
//!
//! Fits a sphere (center and radius) to the latest point cloud with an
//! algebraic least-squares solve, then smooths the per-frame fits with an
//! exponential filter so downstream consumers see a stable estimate.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 threads/ + io/                      │  ← Daemon plumbing
//! │      (TCP receiver, UDP publisher, fit thread)      │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    engine/                          │  ← Orchestration
//! │          (FitPipeline state machine, sink)          │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                  algorithms/                        │  ← Core algorithms
//! │        (sphere least squares, exponential filter)   │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                 core/ + state/                      │  ← Foundation
//! │          (points, sphere types, point buffer)       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use sphere_fit::{FitPipeline, FitPipelineConfig, Point3D, PointSet, PointSetBuffer};
//!
//! let buffer = PointSetBuffer::new();
//! let mut pipeline = FitPipeline::new(FitPipelineConfig::default(), buffer.clone());
//!
//! buffer.replace(PointSet::new(vec![
//!     Point3D::new(0.06, 0.0, 0.48),
//!     Point3D::new(-0.06, 0.0, 0.48),
//!     Point3D::new(0.0, 0.06, 0.48),
//!     Point3D::new(0.0, 0.0, 0.54),
//! ]));
//!
//! if let Some(sphere) = pipeline.tick().filtered() {
//!     println!("center ({}, {}, {}) radius {}", sphere.xc, sphere.yc, sphere.zc, sphere.radius);
//! }
//! ```

pub mod algorithms;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod io;
pub mod state;
pub mod threads;
pub mod utils;

// Re-export commonly used types
pub use algorithms::{FilterGains, FilterState, LinearSystem, fit_sphere, solve_sphere};
pub use config::Config;
pub use crate::core::types::{FilteredSphereParams, Point3D, PointSet, SphereParams};
pub use engine::{FitPipeline, FitPipelineConfig, PipelinePhase, SphereSink, TickOutcome};
pub use error::{Error, FitError, Result};
pub use state::PointSetBuffer;
