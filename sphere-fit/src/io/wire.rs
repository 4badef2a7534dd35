//! Length-prefixed JSON framing.
//!
//! ```text
//! ┌──────────────────┬──────────────────────────┐
//! │ Length (4 bytes) │ Payload (variable)       │
//! │ Big-endian u32   │ JSON                     │
//! └──────────────────┴──────────────────────────┘
//! ```
//!
//! Point clouds arrive as a stream of frames over TCP, so a cloud is bounded
//! only by [`MAX_FRAME_SIZE`]. Sphere estimates go out one frame per UDP
//! datagram; they are a few hundred bytes at most.
//!
//! A declared length above [`MAX_FRAME_SIZE`] is rejected, as is a datagram
//! whose payload disagrees with its prefix.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Largest accepted payload (1 MiB, roughly 14 000 points).
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Serialize `msg` into `buf` as one frame, replacing its contents.
///
/// `buf` is reused across calls to avoid an allocation per message.
pub fn encode_frame<T: Serialize>(msg: &T, buf: &mut Vec<u8>) -> Result<()> {
    buf.clear();
    buf.extend_from_slice(&[0u8; LENGTH_PREFIX_SIZE]);
    serde_json::to_writer(&mut *buf, msg)?;

    let len = buf.len() - LENGTH_PREFIX_SIZE;
    if len > MAX_FRAME_SIZE {
        return Err(Error::InvalidFrame(format!(
            "payload of {} bytes exceeds {} byte limit",
            len, MAX_FRAME_SIZE
        )));
    }
    buf[..LENGTH_PREFIX_SIZE].copy_from_slice(&(len as u32).to_be_bytes());
    Ok(())
}

/// Payload length declared by a frame prefix.
pub fn payload_len(prefix: [u8; LENGTH_PREFIX_SIZE]) -> Result<usize> {
    let declared = u32::from_be_bytes(prefix) as usize;
    if declared > MAX_FRAME_SIZE {
        return Err(Error::InvalidFrame(format!(
            "declared length {} exceeds {} byte limit",
            declared, MAX_FRAME_SIZE
        )));
    }
    Ok(declared)
}

/// Deserialize a payload already stripped of its prefix.
pub fn decode_payload<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    decode_payload(payload)
}

/// Parse one frame from a received datagram.
pub fn decode_frame<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    if bytes.len() < LENGTH_PREFIX_SIZE {
        return Err(Error::InvalidFrame(format!(
            "datagram too short: {} bytes",
            bytes.len()
        )));
    }

    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    prefix.copy_from_slice(&bytes[..LENGTH_PREFIX_SIZE]);
    let declared = payload_len(prefix)?;

    let payload = &bytes[LENGTH_PREFIX_SIZE..];
    if payload.len() != declared {
        return Err(Error::InvalidFrame(format!(
            "declared length {} but payload has {} bytes",
            declared,
            payload.len()
        )));
    }

    decode_payload(payload)
}
