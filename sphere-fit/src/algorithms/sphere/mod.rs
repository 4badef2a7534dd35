//! Algebraic least-squares sphere fitting.
//!
//! ```text
//! PointSet ──► LinearSystem (A, B) ──► SVD least squares ──► SphereParams
//! ```
//!
//! The fit is linear and closed-form, so it has no initial guess and no
//! iteration count to tune. It is not robust: every point contributes with
//! equal weight.

mod linear_system;
mod solver;

pub use linear_system::{LinearSystem, SPHERE_UNKNOWNS};
pub use solver::{
    MIN_FIT_POINTS, least_squares, solve_sphere, sphere_from_solution, validate_shape,
};

use crate::core::types::{PointSet, SphereParams};
use crate::error::FitError;

/// Fit a sphere directly to a point set.
pub fn fit_sphere(points: &PointSet) -> Result<SphereParams, FitError> {
    solve_sphere(&LinearSystem::from_points(points))
}
