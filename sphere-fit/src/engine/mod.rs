//! Orchestration of the fit cycle.
//!
//! - [`pipeline::FitPipeline`]: per-tick snapshot, fit and filter
//! - [`sink::SphereSink`]: trait for wherever the results go

pub mod pipeline;
pub mod sink;

pub use pipeline::{FitPipeline, FitPipelineConfig, PipelinePhase, PipelineStats, TickOutcome};
pub use sink::SphereSink;
