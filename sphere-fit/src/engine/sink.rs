//! Output boundary of the pipeline.

use crate::core::types::{FilteredSphereParams, SphereParams};
use crate::error::Result;

/// Destination for sphere estimates.
///
/// Implementations are driven from the fit thread, at most once per tick.
pub trait SphereSink: Send {
    /// Publish the smoothed estimate.
    fn publish(&mut self, params: &FilteredSphereParams) -> Result<()>;

    /// Publish the unfiltered fit that produced it.
    ///
    /// Only called when raw publishing is enabled. Default: ignore.
    fn publish_raw(&mut self, _raw: &SphereParams) -> Result<()> {
        Ok(())
    }
}
