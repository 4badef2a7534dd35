//! Configuration for the sphere-fit daemon
//!
//! Loaded from a TOML file. Every field has a default, so a partial file (or
//! none at all) is valid.
//!
//! ```toml
//! [fit]
//! tick_rate_hz = 10.0
//!
//! [filter]
//! point_gain = 0.0005
//! radius_gain = 0.005
//!
//! [filter.initial_state]
//! xc = -0.015
//! yc = -0.019
//! zc = 0.48
//! radius = 0.06
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::algorithms::filter::{
    DEFAULT_POINT_GAIN, DEFAULT_RADIUS_GAIN, FilterGains, FilterState,
};
use crate::engine::FitPipelineConfig;
use crate::error::{Error, Result};
use crate::threads::TickTimer;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub fit: FitConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Scheduling of the fit loop
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FitConfig {
    /// Fit loop frequency in Hz, within [0.01, 1000]
    pub tick_rate_hz: f64,
    /// Log pipeline statistics every N ticks (0 disables)
    pub stats_interval_ticks: u64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 10.0,
            stats_interval_ticks: 100,
        }
    }
}

/// Exponential filter gains and seed
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Gain for xc, yc, zc in (0, 1]; 1 disables smoothing
    pub point_gain: f64,
    /// Gain for the radius in (0, 1]
    pub radius_gain: f64,
    /// Filter output before the first fit
    pub initial_state: InitialState,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            point_gain: DEFAULT_POINT_GAIN,
            radius_gain: DEFAULT_RADIUS_GAIN,
            initial_state: InitialState::default(),
        }
    }
}

/// Seed sphere for the filter
///
/// Defaults match a ball roughly half a meter in front of the camera.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InitialState {
    pub xc: f64,
    pub yc: f64,
    pub zc: f64,
    pub radius: f64,
}

impl Default for InitialState {
    fn default() -> Self {
        Self {
            xc: -0.015,
            yc: -0.019,
            zc: 0.48,
            radius: 0.06,
        }
    }
}

/// Point cloud input
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    /// TCP bind address for incoming point clouds
    pub bind_address: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5570".to_string(),
        }
    }
}

/// Sphere estimate output
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// UDP target for filtered estimates
    pub target_address: String,
    /// Also publish unfiltered fits
    pub publish_raw: bool,
    /// UDP target for unfiltered fits
    pub raw_target_address: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            target_address: "127.0.0.1:5571".to_string(),
            publish_raw: false,
            raw_target_address: "127.0.0.1:5572".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error); RUST_LOG overrides
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        TickTimer::period_for(self.fit.tick_rate_hz)?;
        if !self.gains().is_valid() {
            return Err(Error::Config(format!(
                "filter gains must be in (0, 1], got point_gain={} radius_gain={}",
                self.filter.point_gain, self.filter.radius_gain
            )));
        }
        let seed = &self.filter.initial_state;
        if ![seed.xc, seed.yc, seed.zc, seed.radius]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(Error::Config(
                "filter.initial_state must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Filter gains
    pub fn gains(&self) -> FilterGains {
        FilterGains {
            point_gain: self.filter.point_gain,
            radius_gain: self.filter.radius_gain,
        }
    }

    /// Pipeline settings derived from the filter section
    pub fn pipeline_config(&self) -> FitPipelineConfig {
        let seed = &self.filter.initial_state;
        FitPipelineConfig {
            gains: self.gains(),
            initial_state: FilterState::new(seed.xc, seed.yc, seed.zc, seed.radius),
        }
    }
}
