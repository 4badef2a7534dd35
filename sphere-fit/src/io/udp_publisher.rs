//! UDP publisher for sphere estimates.
//!
//! Fire-and-forget unicast: one framed [`SphereParamsMessage`] per emitted
//! tick to the filtered target, plus one to the raw target when configured.
//! Send failures are returned to the caller, which logs them and carries on.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use super::messages::SphereParamsMessage;
use super::wire::encode_frame;
use crate::core::types::{FilteredSphereParams, SphereParams};
use crate::engine::SphereSink;
use crate::error::{Error, Result};
use crate::utils::timestamp_us;

/// Typical frame is well under 200 bytes.
const SEND_BUFFER_CAPACITY: usize = 256;

/// Publishes sphere estimates over UDP.
pub struct UdpSpherePublisher {
    socket: UdpSocket,
    target: SocketAddr,
    raw_target: Option<SocketAddr>,
    send_buffer: Vec<u8>,
}

impl UdpSpherePublisher {
    /// Create a publisher sending filtered estimates to `target`.
    pub fn new(target: &str) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        let target = resolve(target)?;

        log::info!("Sphere publisher sending to {}", target);

        Ok(Self {
            socket,
            target,
            raw_target: None,
            send_buffer: Vec::with_capacity(SEND_BUFFER_CAPACITY),
        })
    }

    /// Also send raw fits to `raw_target`.
    pub fn with_raw_target(mut self, raw_target: &str) -> Result<Self> {
        let addr = resolve(raw_target)?;
        log::info!("Raw sphere fits sending to {}", addr);
        self.raw_target = Some(addr);
        Ok(self)
    }

    fn send(&mut self, msg: &SphereParamsMessage, addr: SocketAddr) -> Result<()> {
        encode_frame(msg, &mut self.send_buffer)?;
        self.socket.send_to(&self.send_buffer, addr)?;
        Ok(())
    }
}

impl SphereSink for UdpSpherePublisher {
    fn publish(&mut self, params: &FilteredSphereParams) -> Result<()> {
        let msg = SphereParamsMessage::from_filtered(params, timestamp_us());
        self.send(&msg, self.target)
    }

    fn publish_raw(&mut self, raw: &SphereParams) -> Result<()> {
        let Some(addr) = self.raw_target else {
            return Ok(());
        };
        let msg = SphereParamsMessage::from_raw(raw, timestamp_us());
        self.send(&msg, addr)
    }
}

fn resolve(addr: &str) -> Result<SocketAddr> {
    addr.to_socket_addrs()?
        .next()
        .ok_or_else(|| Error::Config(format!("Address {} did not resolve", addr)))
}
