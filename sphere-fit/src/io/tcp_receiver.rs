//! TCP receiver for point clouds.
//!
//! Producers connect and write a stream of frames, one [`PointCloudMessage`]
//! per frame. Each decoded cloud replaces whatever is in the
//! [`PointSetBuffer`]; clouds that arrive faster than the fit rate are simply
//! overwritten.
//!
//! # Connection Lifecycle
//!
//! ```text
//! 1. Producer connects to input.bind_address
//! 2. Frames are read until the producer disconnects
//! 3. The listener goes back to accepting
//! ```
//!
//! One producer is served at a time; later connections wait in the listen
//! backlog until the current one closes.
//!
//! # Error Handling
//!
//! - **Bad JSON**: the frame is dropped, the connection stays up
//! - **Oversized or truncated frame**: the stream is out of sync, so the
//!   connection is closed
//! - **Accept failures**: logged on the first and every 100th consecutive
//!   failure, with a backoff between attempts
//!
//! # Example
//!
//! ```ignore
//! use sphere_fit::io::PointCloudReceiver;
//! use sphere_fit::state::PointSetBuffer;
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//!
//! let buffer = PointSetBuffer::new();
//! let running = Arc::new(AtomicBool::new(true));
//! let receiver = PointCloudReceiver::bind("0.0.0.0:5570", buffer.clone(), running)?;
//! std::thread::spawn(move || receiver.run());
//! ```

use std::io::{ErrorKind, Read};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use super::messages::PointCloudMessage;
use super::wire::{LENGTH_PREFIX_SIZE, decode_payload, payload_len};
use crate::error::{Error, Result};
use crate::state::PointSetBuffer;

/// Poll interval while no producer is connected.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Wait after a failed accept before trying again.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(500);

/// Log every Nth consecutive accept failure.
const ACCEPT_ERROR_LOG_EVERY: u64 = 100;

/// Socket read timeout, bounds how long shutdown takes to be noticed.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Initial payload buffer capacity (a ~1000 point cloud).
const INITIAL_BUFFER_CAPACITY: usize = 64 * 1024;

/// Result of filling a buffer from the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fill {
    Complete,
    /// Peer closed cleanly before sending anything.
    Closed,
    /// Running flag cleared while waiting.
    Stopped,
}

/// Receives point clouds and stores the latest one.
pub struct PointCloudReceiver {
    listener: TcpListener,
    buffer: PointSetBuffer,
    running: Arc<AtomicBool>,
    /// Reused across frames to avoid an allocation per cloud
    read_buffer: Vec<u8>,
}

impl PointCloudReceiver {
    /// Bind the listening socket.
    pub fn bind(bind_addr: &str, buffer: PointSetBuffer, running: Arc<AtomicBool>) -> Result<Self> {
        let listener = TcpListener::bind(bind_addr)
            .map_err(|e| Error::Other(format!("Failed to bind to {}: {}", bind_addr, e)))?;
        listener.set_nonblocking(true)?;

        log::info!("Point cloud receiver listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            buffer,
            running,
            read_buffer: Vec::with_capacity(INITIAL_BUFFER_CAPACITY),
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept and serve producers until `running` is cleared.
    pub fn run(mut self) {
        log::info!("Point cloud receiver started");

        let mut accept_errors: u64 = 0;

        while self.running.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    accept_errors = 0;
                    self.serve(stream, addr);
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    accept_errors += 1;
                    if should_log_failure(accept_errors) {
                        log::error!("Accept error ({} consecutive): {}", accept_errors, e);
                    }
                    thread::sleep(ACCEPT_ERROR_BACKOFF);
                }
            }
        }

        log::info!("Point cloud receiver stopped");
    }

    /// Read frames from one producer until it disconnects or errors.
    fn serve(&mut self, mut stream: TcpStream, addr: SocketAddr) {
        // Accepted sockets may inherit non-blocking mode from the listener
        if let Err(e) = stream
            .set_nonblocking(false)
            .and_then(|_| stream.set_read_timeout(Some(READ_TIMEOUT)))
        {
            log::error!("Failed to configure connection from {}: {}", addr, e);
            return;
        }

        log::info!("Producer connected: {}", addr);

        let mut received: u64 = 0;
        let mut dropped: u64 = 0;

        loop {
            match self.read_frame(&mut stream) {
                Ok(Fill::Complete) => {
                    match decode_payload::<PointCloudMessage>(&self.read_buffer) {
                        Ok(msg) => {
                            let count = msg.points.len();
                            let sequence = self.buffer.replace(msg.into());
                            received += 1;
                            log::trace!("Point set #{} from {} ({} points)", sequence, addr, count);
                        }
                        Err(e) => {
                            dropped += 1;
                            log::warn!(
                                "Dropping frame from {} ({} bytes): {}",
                                addr,
                                self.read_buffer.len(),
                                e
                            );
                        }
                    }
                }
                Ok(Fill::Closed) | Ok(Fill::Stopped) => break,
                Err(e) => {
                    log::warn!("Closing connection from {}: {}", addr, e);
                    break;
                }
            }
        }

        let _ = stream.shutdown(Shutdown::Both);
        log::info!(
            "Producer disconnected: {} ({} received, {} dropped)",
            addr,
            received,
            dropped
        );
    }

    /// Read one frame into `read_buffer`.
    fn read_frame(&mut self, stream: &mut TcpStream) -> Result<Fill> {
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        match fill(stream, &mut prefix, &self.running)? {
            Fill::Complete => {}
            other => return Ok(other),
        }

        let len = payload_len(prefix)?;
        self.read_buffer.clear();
        self.read_buffer.resize(len, 0);

        match fill(stream, &mut self.read_buffer, &self.running)? {
            Fill::Closed => Err(Error::InvalidFrame(format!(
                "connection closed before {} byte payload",
                len
            ))),
            outcome => Ok(outcome),
        }
    }
}

/// First failure of a streak, then every [`ACCEPT_ERROR_LOG_EVERY`]th.
fn should_log_failure(consecutive: u64) -> bool {
    consecutive == 1 || consecutive % ACCEPT_ERROR_LOG_EVERY == 0
}

/// Fill `buf` completely, riding out read timeouts while `running` is set.
///
/// Unlike `read_exact`, a timeout part-way through never loses the bytes
/// already read, so the stream stays in sync.
fn fill<R: Read>(stream: &mut R, buf: &mut [u8], running: &AtomicBool) -> Result<Fill> {
    let mut filled = 0;
    while filled < buf.len() {
        if !running.load(Ordering::Relaxed) {
            return Ok(Fill::Stopped);
        }
        match stream.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(Fill::Closed),
            Ok(0) => {
                return Err(Error::InvalidFrame(format!(
                    "connection closed after {} of {} bytes",
                    filled,
                    buf.len()
                )));
            }
            Ok(n) => filled += n,
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Fill::Complete)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Point3D;
    use crate::io::wire::{MAX_FRAME_SIZE, encode_frame};
    use std::io::{Cursor, Write};
    use std::thread::JoinHandle;
    use std::time::Instant;

    struct Harness {
        addr: SocketAddr,
        buffer: PointSetBuffer,
        running: Arc<AtomicBool>,
        handle: JoinHandle<()>,
    }

    impl Harness {
        fn start() -> Self {
            let buffer = PointSetBuffer::new();
            let running = Arc::new(AtomicBool::new(true));
            let receiver =
                PointCloudReceiver::bind("127.0.0.1:0", buffer.clone(), Arc::clone(&running))
                    .unwrap();
            let addr = receiver.local_addr().unwrap();
            let handle = thread::spawn(move || receiver.run());
            Self {
                addr,
                buffer,
                running,
                handle,
            }
        }

        /// Block until the buffer reaches `sequence` and return the point count.
        fn wait_for(&self, sequence: u64) -> usize {
            let deadline = Instant::now() + Duration::from_secs(3);
            while Instant::now() < deadline {
                if let Some(snap) = self.buffer.snapshot()
                    && snap.sequence >= sequence
                {
                    return snap.points.len();
                }
                thread::sleep(Duration::from_millis(5));
            }
            panic!("point set #{} never arrived", sequence);
        }

        fn stop(self) {
            self.running.store(false, Ordering::Relaxed);
            self.handle.join().unwrap();
        }
    }

    fn cloud_frame(n: usize) -> Vec<u8> {
        let msg = PointCloudMessage {
            timestamp_us: 3,
            points: (0..n)
                .map(|i| Point3D::new(i as f64 * 1e-4, 0.25, 0.5))
                .collect(),
        };
        let mut frame = Vec::new();
        encode_frame(&msg, &mut frame).unwrap();
        frame
    }

    #[test]
    fn test_cloud_larger_than_a_datagram_arrives() {
        let harness = Harness::start();
        let frame = cloud_frame(5000);
        assert!(frame.len() > 65_535);

        let mut stream = TcpStream::connect(harness.addr).unwrap();
        stream.write_all(&frame).unwrap();

        assert_eq!(harness.wait_for(1), 5000);
        drop(stream);
        harness.stop();
    }

    #[test]
    fn test_frames_on_one_connection_replace_each_other() {
        let harness = Harness::start();
        let mut stream = TcpStream::connect(harness.addr).unwrap();

        stream.write_all(&cloud_frame(10)).unwrap();
        stream.write_all(&cloud_frame(20)).unwrap();

        assert_eq!(harness.wait_for(2), 20);
        drop(stream);
        harness.stop();
    }

    #[test]
    fn test_bad_json_frame_is_skipped() {
        let harness = Harness::start();
        let mut stream = TcpStream::connect(harness.addr).unwrap();

        let garbage = b"{\"points\": [";
        stream
            .write_all(&(garbage.len() as u32).to_be_bytes())
            .unwrap();
        stream.write_all(garbage).unwrap();
        stream.write_all(&cloud_frame(7)).unwrap();

        assert_eq!(harness.wait_for(1), 7);
        drop(stream);
        harness.stop();
    }

    #[test]
    fn test_oversized_frame_closes_connection_only() {
        let harness = Harness::start();

        let mut bad = TcpStream::connect(harness.addr).unwrap();
        bad.write_all(&((MAX_FRAME_SIZE + 1) as u32).to_be_bytes())
            .unwrap();
        bad.set_read_timeout(Some(Duration::from_secs(3))).unwrap();
        let mut byte = [0u8; 1];
        // Server closes its end: read returns EOF (or a reset)
        assert!(matches!(bad.read(&mut byte), Ok(0) | Err(_)));

        let mut good = TcpStream::connect(harness.addr).unwrap();
        good.write_all(&cloud_frame(12)).unwrap();
        assert_eq!(harness.wait_for(1), 12);

        drop(good);
        harness.stop();
    }

    #[test]
    fn test_stops_with_idle_producer_connected() {
        let harness = Harness::start();
        let _stream = TcpStream::connect(harness.addr).unwrap();
        thread::sleep(Duration::from_millis(50));
        harness.stop();
    }

    #[test]
    fn test_accept_failures_are_rate_limited() {
        let logged: Vec<u64> = (1..=250).filter(|&n| should_log_failure(n)).collect();
        assert_eq!(logged, vec![1, 100, 200]);
    }

    #[test]
    fn test_fill_keeps_partial_reads() {
        let running = AtomicBool::new(true);
        let mut source = Cursor::new(vec![1u8, 2, 3, 4, 5]);

        let mut head = [0u8; 2];
        assert_eq!(fill(&mut source, &mut head, &running).unwrap(), Fill::Complete);
        let mut tail = [0u8; 3];
        assert_eq!(fill(&mut source, &mut tail, &running).unwrap(), Fill::Complete);
        assert_eq!(tail, [3, 4, 5]);

        let mut more = [0u8; 1];
        assert_eq!(fill(&mut source, &mut more, &running).unwrap(), Fill::Closed);
    }

    #[test]
    fn test_fill_reports_truncation_and_stop() {
        let running = AtomicBool::new(true);
        let mut short = Cursor::new(vec![9u8, 9]);
        let mut buf = [0u8; 4];
        assert!(matches!(
            fill(&mut short, &mut buf, &running),
            Err(Error::InvalidFrame(_))
        ));

        running.store(false, Ordering::Relaxed);
        let mut source = Cursor::new(vec![1u8]);
        assert_eq!(fill(&mut source, &mut buf, &running).unwrap(), Fill::Stopped);
    }
}
