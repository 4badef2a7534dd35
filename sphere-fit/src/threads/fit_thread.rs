//! Fit thread: runs the pipeline at a fixed rate.
//!
//! Each tick:
//! 1. `FitPipeline::tick` snapshots the buffer, fits and filters
//! 2. An emitted estimate goes to the sink (and the raw fit, if enabled)
//! 3. Sleep until the next tick deadline
//!
//! The running flag is checked at every tick boundary; shutdown never waits
//! for more than one period.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::engine::{FitPipeline, SphereSink, TickOutcome};
use crate::error::{Error, Result};

/// Fit thread settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitThreadConfig {
    /// Ticks per second.
    pub tick_rate_hz: f64,
    /// Forward raw fits to the sink as well.
    pub publish_raw: bool,
    /// Log statistics every N ticks (0 disables).
    pub stats_interval_ticks: u64,
}

impl Default for FitThreadConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 10.0,
            publish_raw: false,
            stats_interval_ticks: 100,
        }
    }
}

/// Slowest accepted tick rate.
pub const MIN_TICK_RATE_HZ: f64 = 0.01;

/// Fastest accepted tick rate.
pub const MAX_TICK_RATE_HZ: f64 = 1000.0;

/// Fixed-period deadline tracker.
///
/// Deadlines advance by exactly one period so the average rate does not
/// drift. If a tick overruns by more than a full period the schedule
/// restarts from now instead of bursting to catch up.
#[derive(Debug)]
pub struct TickTimer {
    period: Duration,
    next: Instant,
}

impl TickTimer {
    pub fn new(rate_hz: f64) -> Result<Self> {
        Ok(Self {
            period: Self::period_for(rate_hz)?,
            next: Instant::now(),
        })
    }

    /// Tick period for `rate_hz`, which must lie in
    /// [`MIN_TICK_RATE_HZ`, `MAX_TICK_RATE_HZ`].
    pub fn period_for(rate_hz: f64) -> Result<Duration> {
        if !(MIN_TICK_RATE_HZ..=MAX_TICK_RATE_HZ).contains(&rate_hz) {
            return Err(Error::Config(format!(
                "tick rate must be within [{}, {}] Hz, got {}",
                MIN_TICK_RATE_HZ, MAX_TICK_RATE_HZ, rate_hz
            )));
        }
        Duration::try_from_secs_f64(1.0 / rate_hz)
            .map_err(|e| Error::Config(format!("tick rate {} Hz: {}", rate_hz, e)))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Advance to the next deadline and return how long to sleep.
    pub fn advance(&mut self, now: Instant) -> Duration {
        self.next += self.period;
        if self.next + self.period < now {
            self.next = now;
        }
        self.next.saturating_duration_since(now)
    }
}

/// Owns the pipeline and its sink.
pub struct FitThread {
    pipeline: FitPipeline,
    sink: Box<dyn SphereSink>,
    config: FitThreadConfig,
    timer: TickTimer,
    running: Arc<AtomicBool>,
}

impl FitThread {
    /// Fails if `config.tick_rate_hz` is out of range.
    pub fn new(
        pipeline: FitPipeline,
        sink: Box<dyn SphereSink>,
        config: FitThreadConfig,
        running: Arc<AtomicBool>,
    ) -> Result<Self> {
        Ok(Self {
            pipeline,
            sink,
            timer: TickTimer::new(config.tick_rate_hz)?,
            config,
            running,
        })
    }

    /// Spawn on a named thread; the handle returns the pipeline on exit.
    pub fn spawn(self) -> Result<JoinHandle<FitPipeline>> {
        thread::Builder::new()
            .name("fit".into())
            .spawn(move || self.run())
            .map_err(|e| Error::Other(format!("Failed to spawn fit thread: {}", e)))
    }

    /// Run until the running flag is cleared.
    pub fn run(mut self) -> FitPipeline {
        log::info!(
            "Fit thread started ({:.1} Hz, period {:?})",
            self.config.tick_rate_hz,
            self.timer.period()
        );

        while self.running.load(Ordering::Relaxed) {
            let outcome = self.pipeline.tick();
            self.dispatch(&outcome);
            self.maybe_log_stats();

            let sleep = self.timer.advance(Instant::now());
            if !sleep.is_zero() {
                thread::sleep(sleep);
            }
        }

        let stats = self.pipeline.stats();
        log::info!(
            "Fit thread stopped ({} ticks, {} fits, {} skipped)",
            stats.ticks,
            stats.fits,
            stats.skipped
        );
        self.pipeline
    }

    fn dispatch(&mut self, outcome: &TickOutcome) {
        let TickOutcome::Emitted { raw, filtered } = outcome else {
            return;
        };

        log::trace!(
            "Sphere: center=({:.4}, {:.4}, {:.4}) r={:.4}",
            filtered.xc,
            filtered.yc,
            filtered.zc,
            filtered.radius
        );

        if self.config.publish_raw
            && let Err(e) = self.sink.publish_raw(raw)
        {
            log::warn!("Failed to publish raw fit: {}", e);
        }
        if let Err(e) = self.sink.publish(filtered) {
            log::warn!("Failed to publish sphere estimate: {}", e);
        }
    }

    fn maybe_log_stats(&self) {
        let interval = self.config.stats_interval_ticks;
        let stats = self.pipeline.stats();
        if interval == 0 || stats.ticks % interval != 0 {
            return;
        }

        let state = self.pipeline.filter_state();
        log::info!(
            "Ticks: {} | fits: {} | skipped: {} | set #{} | sphere ({:.4}, {:.4}, {:.4}) r={:.4}",
            stats.ticks,
            stats.fits,
            stats.skipped,
            stats.last_sequence,
            state.x,
            state.y,
            state.z,
            state.radius
        );
    }
}
