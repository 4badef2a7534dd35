//! Algebraic linearization of the sphere equation.
//!
//! A point on a sphere with center `c` and radius `r` satisfies
//!
//! ```text
//! |p|² = 2p·c + (r² − |c|²)
//! ```
//!
//! which is linear in the unknowns `P = [xc, yc, zc, r² − |c|²]`. Stacking one
//! row per point gives the overdetermined system `A·P = B`:
//!
//! ```text
//! A[i] = [2x_i, 2y_i, 2z_i, 1]      B[i] = x_i² + y_i² + z_i²
//! ```

use nalgebra::DMatrix;

use crate::core::types::PointSet;

/// Number of unknowns in the sphere system.
pub const SPHERE_UNKNOWNS: usize = 4;

/// Design matrix and target column for one point set.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    a: DMatrix<f64>,
    b: DMatrix<f64>,
}

impl LinearSystem {
    /// Build `(A, B)` from a point set.
    ///
    /// An empty set produces a 0×4 / 0×1 system; the solver rejects it.
    pub fn from_points(points: &PointSet) -> Self {
        let n = points.len();
        let mut a = DMatrix::<f64>::zeros(n, SPHERE_UNKNOWNS);
        let mut b = DMatrix::<f64>::zeros(n, 1);

        for (i, p) in points.iter().enumerate() {
            a[(i, 0)] = 2.0 * p.x;
            a[(i, 1)] = 2.0 * p.y;
            a[(i, 2)] = 2.0 * p.z;
            a[(i, 3)] = 1.0;
            b[(i, 0)] = p.norm_squared();
        }

        Self { a, b }
    }

    /// Assemble a system from precomputed matrices.
    ///
    /// No shape checks happen here; [`super::solve_sphere`] validates before
    /// solving.
    pub fn from_parts(a: DMatrix<f64>, b: DMatrix<f64>) -> Self {
        Self { a, b }
    }

    /// Coefficient matrix `A`.
    #[inline]
    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }

    /// Target column `B`.
    #[inline]
    pub fn b(&self) -> &DMatrix<f64> {
        &self.b
    }

    /// Number of equations (rows of `A`).
    #[inline]
    pub fn rows(&self) -> usize {
        self.a.nrows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Point3D;

    #[test]
    fn test_shapes_match_point_count() {
        for n in [0usize, 1, 4, 17] {
            let set: PointSet = (0..n)
                .map(|i| Point3D::new(i as f64, -(i as f64), 0.5))
                .collect();
            let sys = LinearSystem::from_points(&set);
            assert_eq!(sys.a().shape(), (n, 4));
            assert_eq!(sys.b().shape(), (n, 1));
            assert_eq!(sys.rows(), n);
        }
    }

    #[test]
    fn test_row_layout() {
        let set = PointSet::new(vec![Point3D::new(1.0, -2.0, 3.0)]);
        let sys = LinearSystem::from_points(&set);

        assert_eq!(sys.a()[(0, 0)], 2.0);
        assert_eq!(sys.a()[(0, 1)], -4.0);
        assert_eq!(sys.a()[(0, 2)], 6.0);
        assert_eq!(sys.a()[(0, 3)], 1.0);
        assert_eq!(sys.b()[(0, 0)], 14.0);
    }

    #[test]
    fn test_deterministic() {
        let set = PointSet::new(vec![
            Point3D::new(0.1, 0.2, 0.3),
            Point3D::new(-0.4, 0.5, -0.6),
        ]);
        assert_eq!(LinearSystem::from_points(&set), LinearSystem::from_points(&set));
    }
}
