//! Least-squares solve of the sphere system.
//!
//! Uses a thin SVD so rank-deficient systems (coplanar or repeated points)
//! still yield the minimum-norm solution instead of a singular-matrix error.

use nalgebra::DMatrix;
use nalgebra::linalg::SVD;

use super::linear_system::{LinearSystem, SPHERE_UNKNOWNS};
use crate::core::types::SphereParams;
use crate::error::FitError;

/// Minimum number of equations for a determined system.
pub const MIN_FIT_POINTS: usize = SPHERE_UNKNOWNS;

/// Iteration cap for SVD convergence.
const SVD_MAX_ITERATIONS: usize = 1000;

/// Check that `(A, B)` is matrix-shaped and solvable.
pub fn validate_shape(system: &LinearSystem) -> Result<(), FitError> {
    let (rows_a, cols_a) = system.a().shape();
    let (rows_b, cols_b) = system.b().shape();

    if rows_a != rows_b {
        return Err(FitError::InvalidInput(format!(
            "row mismatch: A has {} rows, B has {}",
            rows_a, rows_b
        )));
    }
    if cols_a != SPHERE_UNKNOWNS || cols_b != 1 {
        return Err(FitError::InvalidInput(format!(
            "expected A (N×{}) and B (N×1), got A ({}×{}) and B ({}×{})",
            SPHERE_UNKNOWNS, rows_a, cols_a, rows_b, cols_b
        )));
    }
    if rows_a < MIN_FIT_POINTS {
        return Err(FitError::InvalidInput(format!(
            "{} points, need at least {}",
            rows_a, MIN_FIT_POINTS
        )));
    }
    if system.a().iter().chain(system.b().iter()).any(|v| !v.is_finite()) {
        return Err(FitError::InvalidInput("non-finite coordinate".to_string()));
    }

    Ok(())
}

/// Minimum-norm least-squares solution of `A·P = B`.
///
/// Singular values below `σ_max · ε · max(N, 4)` are treated as zero.
/// Callers must run [`validate_shape`] first.
pub fn least_squares(system: &LinearSystem) -> Result<[f64; SPHERE_UNKNOWNS], FitError> {
    let svd = SVD::try_new(
        system.a().clone(),
        true,
        true,
        f64::EPSILON,
        SVD_MAX_ITERATIONS,
    )
    .ok_or(FitError::DegenerateFit { radicand: f64::NAN })?;

    let sigma_max = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let cutoff = sigma_max * f64::EPSILON * system.rows().max(SPHERE_UNKNOWNS) as f64;

    let p: DMatrix<f64> = svd
        .solve(system.b(), cutoff)
        .map_err(|_| FitError::DegenerateFit { radicand: f64::NAN })?;

    Ok([p[(0, 0)], p[(1, 0)], p[(2, 0)], p[(3, 0)]])
}

/// Derive center and radius from the solution vector.
///
/// `radius = sqrt(p3 + xc² + yc² + zc²)`; a negative or non-finite radicand
/// is reported as [`FitError::DegenerateFit`].
pub fn sphere_from_solution(p: &[f64; SPHERE_UNKNOWNS]) -> Result<SphereParams, FitError> {
    let [xc, yc, zc, p3] = *p;
    let radicand = p3 + xc * xc + yc * yc + zc * zc;

    if !radicand.is_finite() || radicand < 0.0 {
        return Err(FitError::DegenerateFit { radicand });
    }

    Ok(SphereParams::new(xc, yc, zc, radicand.sqrt()))
}

/// Validate, solve and derive the sphere in one call.
pub fn solve_sphere(system: &LinearSystem) -> Result<SphereParams, FitError> {
    validate_shape(system)?;
    let p = least_squares(system)?;
    sphere_from_solution(&p)
}
