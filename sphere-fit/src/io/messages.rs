//! Wire message types.
//!
//! Both messages travel as length-prefixed JSON (see [`super::wire`]).
//!
//! ```json
//! {"timestamp_us": 1700000000000000, "points": [{"x": 0.01, "y": -0.02, "z": 0.47}]}
//! {"timestamp_us": 1700000000100000, "xc": -0.015, "yc": -0.019, "zc": 0.48, "radius": 0.06}
//! ```

use serde::{Deserialize, Serialize};

use crate::core::types::{FilteredSphereParams, Point3D, PointSet, SphereParams};

/// Inbound point cloud of one observation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointCloudMessage {
    /// Capture time in microseconds (0 if the sender does not stamp clouds).
    #[serde(default)]
    pub timestamp_us: u64,
    /// Points on the sphere surface.
    pub points: Vec<Point3D>,
}

impl From<PointCloudMessage> for PointSet {
    fn from(msg: PointCloudMessage) -> Self {
        PointSet::new(msg.points)
    }
}

/// Outbound sphere estimate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SphereParamsMessage {
    /// Publish time in microseconds.
    pub timestamp_us: u64,
    pub xc: f64,
    pub yc: f64,
    pub zc: f64,
    pub radius: f64,
}

impl SphereParamsMessage {
    pub fn from_filtered(params: &FilteredSphereParams, timestamp_us: u64) -> Self {
        Self {
            timestamp_us,
            xc: params.xc,
            yc: params.yc,
            zc: params.zc,
            radius: params.radius,
        }
    }

    pub fn from_raw(params: &SphereParams, timestamp_us: u64) -> Self {
        Self {
            timestamp_us,
            xc: params.xc,
            yc: params.yc,
            zc: params.zc,
            radius: params.radius,
        }
    }
}
