//! Fitting and smoothing algorithms.
//!
//! - [`sphere`]: algebraic least-squares sphere fit
//! - [`filter`]: per-parameter exponential smoothing

pub mod filter;
pub mod sphere;

pub use filter::{FilterGains, FilterState, exponential_filter};
pub use sphere::{LinearSystem, fit_sphere, solve_sphere};
