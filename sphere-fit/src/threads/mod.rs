//! Thread layout of the daemon.
//!
//! Two threads share one [`PointSetBuffer`]:
//! - Receiver thread: decodes TCP point clouds into the buffer
//! - Fit thread: fits the latest cloud at `tick_rate_hz` and publishes

mod fit_thread;

pub use fit_thread::{FitThread, FitThreadConfig, MAX_TICK_RATE_HZ, MIN_TICK_RATE_HZ, TickTimer};

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread::{self, JoinHandle};

use crate::config::Config;
use crate::engine::FitPipeline;
use crate::error::{Error, Result};
use crate::io::{PointCloudReceiver, UdpSpherePublisher};
use crate::state::PointSetBuffer;

/// Handles for the running daemon threads.
pub struct NodeHandles {
    pub receiver: JoinHandle<()>,
    pub fit: JoinHandle<FitPipeline>,
    /// Address the receiver actually bound (useful with port 0).
    pub input_addr: SocketAddr,
}

impl NodeHandles {
    /// True if either thread has exited.
    pub fn any_finished(&self) -> bool {
        self.receiver.is_finished() || self.fit.is_finished()
    }
}

/// Bind sockets and spawn the receiver and fit threads.
pub fn spawn_node(config: &Config, running: Arc<AtomicBool>) -> Result<NodeHandles> {
    let buffer = PointSetBuffer::new();

    let receiver =
        PointCloudReceiver::bind(&config.input.bind_address, buffer.clone(), Arc::clone(&running))?;
    let input_addr = receiver.local_addr()?;

    let mut publisher = UdpSpherePublisher::new(&config.output.target_address)?;
    if config.output.publish_raw {
        publisher = publisher.with_raw_target(&config.output.raw_target_address)?;
    }

    let receiver_handle = thread::Builder::new()
        .name("receiver".into())
        .spawn(move || receiver.run())
        .map_err(|e| Error::Other(format!("Failed to spawn receiver thread: {}", e)))?;

    let pipeline = FitPipeline::new(config.pipeline_config(), buffer);
    let fit_config = FitThreadConfig {
        tick_rate_hz: config.fit.tick_rate_hz,
        publish_raw: config.output.publish_raw,
        stats_interval_ticks: config.fit.stats_interval_ticks,
    };
    let fit_handle = FitThread::new(pipeline, Box::new(publisher), fit_config, running)?.spawn()?;

    Ok(NodeHandles {
        receiver: receiver_handle,
        fit: fit_handle,
        input_addr,
    })
}
