//! Fit pipeline: one tick of snapshot → fit → filter.
//!
//! # State Machine
//!
//! ```text
//!            first point set
//!   Idle ──────────────────────► Active ──┐
//!                                  ▲      │ tick
//!                                  └──────┘
//! ```
//!
//! Once active, every tick refits the most recent point set, even if no new
//! set arrived since the previous tick. A failed fit skips the tick without
//! touching the filter state.

use crate::algorithms::filter::{FilterGains, FilterState};
use crate::algorithms::sphere::fit_sphere;
use crate::core::types::{FilteredSphereParams, SphereParams};
use crate::error::FitError;
use crate::state::{PointSetBuffer, PointSetSnapshot};

/// Pipeline lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelinePhase {
    /// No point set received yet.
    #[default]
    Idle,
    /// At least one point set received.
    Active,
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Nothing to fit yet.
    Idle,
    /// Fit failed; filter state untouched, nothing emitted.
    Skipped(FitError),
    /// Fit succeeded and the filter advanced.
    Emitted {
        raw: SphereParams,
        filtered: FilteredSphereParams,
    },
}

impl TickOutcome {
    /// Filtered output, if this tick emitted one.
    pub fn filtered(&self) -> Option<&FilteredSphereParams> {
        match self {
            TickOutcome::Emitted { filtered, .. } => Some(filtered),
            _ => None,
        }
    }
}

/// Running counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Total ticks, including idle ones.
    pub ticks: u64,
    /// Ticks that produced an output.
    pub fits: u64,
    /// Ticks skipped because the fit failed.
    pub skipped: u64,
    /// Buffer sequence of the point set used by the last non-idle tick.
    pub last_sequence: u64,
}

/// Filter configuration for the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitPipelineConfig {
    pub gains: FilterGains,
    /// Seed for the filter before the first fit.
    pub initial_state: FilterState,
}

impl Default for FitPipelineConfig {
    fn default() -> Self {
        Self {
            gains: FilterGains::default(),
            initial_state: FilterState::new(-0.015, -0.019, 0.48, 0.06),
        }
    }
}

/// Owns the filter state and reads the shared point buffer.
#[derive(Debug)]
pub struct FitPipeline {
    gains: FilterGains,
    state: FilterState,
    buffer: PointSetBuffer,
    phase: PipelinePhase,
    stats: PipelineStats,
}

impl FitPipeline {
    /// Create a pipeline reading from `buffer`.
    pub fn new(config: FitPipelineConfig, buffer: PointSetBuffer) -> Self {
        Self {
            gains: config.gains,
            state: config.initial_state,
            buffer,
            phase: PipelinePhase::Idle,
            stats: PipelineStats::default(),
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> PipelinePhase {
        self.phase
    }

    /// Current smoothed values.
    pub fn filter_state(&self) -> &FilterState {
        &self.state
    }

    /// Counters since creation.
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Run one scheduling tick.
    pub fn tick(&mut self) -> TickOutcome {
        self.stats.ticks += 1;

        let Some(snapshot) = self.buffer.snapshot() else {
            return TickOutcome::Idle;
        };

        if self.phase == PipelinePhase::Idle {
            log::info!(
                "First point set received ({} points), pipeline active",
                snapshot.points.len()
            );
            self.phase = PipelinePhase::Active;
        }
        self.stats.last_sequence = snapshot.sequence;

        let result = fit_sphere(&snapshot.points);
        self.absorb(&snapshot, result)
    }

    /// Fold one fit result into the filter.
    ///
    /// A failed fit leaves the filter state exactly as it was.
    fn absorb(
        &mut self,
        snapshot: &PointSetSnapshot,
        result: Result<SphereParams, FitError>,
    ) -> TickOutcome {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                self.stats.skipped += 1;
                log::debug!(
                    "Skipping tick {} (set #{}, {} points): {}",
                    self.stats.ticks,
                    snapshot.sequence,
                    snapshot.points.len(),
                    e
                );
                return TickOutcome::Skipped(e);
            }
        };

        self.state = self.state.step(&raw, &self.gains);
        self.stats.fits += 1;

        TickOutcome::Emitted {
            raw,
            filtered: self.state.output(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Point3D, PointSet};
    use approx::assert_relative_eq;

    fn octahedron(center: Point3D, radius: f64) -> PointSet {
        let offsets = [
            (1.0, 0.0, 0.0),
            (-1.0, 0.0, 0.0),
            (0.0, 1.0, 0.0),
            (0.0, -1.0, 0.0),
            (0.0, 0.0, 1.0),
            (0.0, 0.0, -1.0),
        ];
        offsets
            .iter()
            .map(|&(dx, dy, dz)| {
                Point3D::new(
                    center.x + radius * dx,
                    center.y + radius * dy,
                    center.z + radius * dz,
                )
            })
            .collect()
    }

    fn passthrough_config() -> FitPipelineConfig {
        FitPipelineConfig {
            gains: FilterGains::passthrough(),
            initial_state: FilterState::new(0.0, 0.0, 0.0, 0.0),
        }
    }

    #[test]
    fn test_idle_until_first_set() {
        let buffer = PointSetBuffer::new();
        let mut pipeline = FitPipeline::new(FitPipelineConfig::default(), buffer.clone());

        assert_eq!(pipeline.tick(), TickOutcome::Idle);
        assert_eq!(pipeline.tick(), TickOutcome::Idle);
        assert_eq!(pipeline.phase(), PipelinePhase::Idle);
        assert_eq!(*pipeline.filter_state(), FitPipelineConfig::default().initial_state);

        buffer.replace(octahedron(Point3D::new(0.0, 0.0, 0.5), 0.05));
        assert!(matches!(pipeline.tick(), TickOutcome::Emitted { .. }));
        assert_eq!(pipeline.phase(), PipelinePhase::Active);
        assert_eq!(pipeline.stats().ticks, 3);
        assert_eq!(pipeline.stats().fits, 1);
    }

    #[test]
    fn test_passthrough_emits_raw_fit() {
        let buffer = PointSetBuffer::new();
        let mut pipeline = FitPipeline::new(passthrough_config(), buffer.clone());
        buffer.replace(octahedron(Point3D::new(1.0, 2.0, 3.0), 5.0));

        let outcome = pipeline.tick();
        let filtered = outcome.filtered().unwrap();
        assert_relative_eq!(filtered.xc, 1.0, epsilon = 1e-9);
        assert_relative_eq!(filtered.yc, 2.0, epsilon = 1e-9);
        assert_relative_eq!(filtered.zc, 3.0, epsilon = 1e-9);
        assert_relative_eq!(filtered.radius, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_first_output_blends_with_seed() {
        let buffer = PointSetBuffer::new();
        let config = FitPipelineConfig {
            gains: FilterGains {
                point_gain: 0.5,
                radius_gain: 0.1,
            },
            initial_state: FilterState::new(0.0, 0.0, 0.0, 1.0),
        };
        let mut pipeline = FitPipeline::new(config, buffer.clone());
        buffer.replace(octahedron(Point3D::new(2.0, -2.0, 4.0), 3.0));

        let filtered = *pipeline.tick().filtered().unwrap();
        assert_relative_eq!(filtered.xc, 1.0, epsilon = 1e-9);
        assert_relative_eq!(filtered.yc, -1.0, epsilon = 1e-9);
        assert_relative_eq!(filtered.zc, 2.0, epsilon = 1e-9);
        assert_relative_eq!(filtered.radius, 0.1 * 3.0 + 0.9 * 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_most_recent_set_wins() {
        let buffer = PointSetBuffer::new();
        let mut pipeline = FitPipeline::new(passthrough_config(), buffer.clone());

        buffer.replace(octahedron(Point3D::new(-7.0, -7.0, -7.0), 1.0));
        buffer.replace(octahedron(Point3D::new(1.0, 1.0, 1.0), 2.0));

        let filtered = *pipeline.tick().filtered().unwrap();
        assert_relative_eq!(filtered.xc, 1.0, epsilon = 1e-9);
        assert_relative_eq!(filtered.radius, 2.0, epsilon = 1e-9);
        assert_eq!(pipeline.stats().last_sequence, 2);
    }

    #[test]
    fn test_same_set_refitted_each_tick() {
        let buffer = PointSetBuffer::new();
        let config = FitPipelineConfig {
            gains: FilterGains {
                point_gain: 0.5,
                radius_gain: 0.5,
            },
            initial_state: FilterState::new(0.0, 0.0, 0.0, 0.0),
        };
        let mut pipeline = FitPipeline::new(config, buffer.clone());
        buffer.replace(octahedron(Point3D::new(4.0, 0.0, 0.0), 1.0));

        let first = *pipeline.tick().filtered().unwrap();
        let second = *pipeline.tick().filtered().unwrap();
        assert_relative_eq!(first.xc, 2.0, epsilon = 1e-9);
        assert_relative_eq!(second.xc, 3.0, epsilon = 1e-9);
        assert_eq!(pipeline.stats().fits, 2);
    }

    #[test]
    fn test_failed_fit_leaves_state_untouched() {
        let buffer = PointSetBuffer::new();
        let mut pipeline = FitPipeline::new(FitPipelineConfig::default(), buffer.clone());

        buffer.replace(octahedron(Point3D::new(0.1, 0.2, 0.3), 0.5));
        pipeline.tick();
        let before = *pipeline.filter_state();

        buffer.replace(PointSet::new(vec![Point3D::new(1.0, 1.0, 1.0)]));
        let outcome = pipeline.tick();

        assert!(matches!(outcome, TickOutcome::Skipped(FitError::InvalidInput(_))));
        assert!(outcome.filtered().is_none());
        let after = *pipeline.filter_state();
        assert_eq!(before.x.to_bits(), after.x.to_bits());
        assert_eq!(before.y.to_bits(), after.y.to_bits());
        assert_eq!(before.z.to_bits(), after.z.to_bits());
        assert_eq!(before.radius.to_bits(), after.radius.to_bits());
        assert_eq!(pipeline.stats().skipped, 1);
        assert_eq!(pipeline.phase(), PipelinePhase::Active);
    }

    #[test]
    fn test_degenerate_fit_leaves_state_untouched() {
        let buffer = PointSetBuffer::new();
        let mut pipeline = FitPipeline::new(FitPipelineConfig::default(), buffer.clone());

        buffer.replace(octahedron(Point3D::new(0.1, 0.2, 0.3), 0.5));
        pipeline.tick();
        let before = *pipeline.filter_state();
        let fits = pipeline.stats().fits;

        let snapshot = buffer.snapshot().unwrap();
        let outcome = pipeline.absorb(&snapshot, Err(FitError::DegenerateFit { radicand: -0.25 }));

        assert_eq!(
            outcome,
            TickOutcome::Skipped(FitError::DegenerateFit { radicand: -0.25 })
        );
        let after = *pipeline.filter_state();
        assert_eq!(before.x.to_bits(), after.x.to_bits());
        assert_eq!(before.y.to_bits(), after.y.to_bits());
        assert_eq!(before.z.to_bits(), after.z.to_bits());
        assert_eq!(before.radius.to_bits(), after.radius.to_bits());
        assert_eq!(pipeline.stats().fits, fits);
        assert_eq!(pipeline.stats().skipped, 1);
    }

    #[test]
    fn test_recovers_after_skip() {
        let buffer = PointSetBuffer::new();
        let mut pipeline = FitPipeline::new(passthrough_config(), buffer.clone());

        buffer.replace(PointSet::default());
        assert!(matches!(pipeline.tick(), TickOutcome::Skipped(_)));

        buffer.replace(octahedron(Point3D::new(0.0, 0.0, 1.0), 0.25));
        let filtered = *pipeline.tick().filtered().unwrap();
        assert_relative_eq!(filtered.zc, 1.0, epsilon = 1e-9);
    }
}
