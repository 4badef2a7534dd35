//! Transport adapters around the fit pipeline.
//!
//! - [`tcp_receiver`]: point clouds in over TCP, written to the shared buffer
//! - [`udp_publisher`]: sphere estimates out over UDP
//! - [`channel_sink`]: sphere estimates out over a crossbeam channel
//! - [`wire`] / [`messages`]: framing and message layout shared by both ends

pub mod channel_sink;
pub mod messages;
pub mod tcp_receiver;
pub mod udp_publisher;
pub mod wire;

pub use channel_sink::{ChannelSink, SphereEstimate};
pub use messages::{PointCloudMessage, SphereParamsMessage};
pub use tcp_receiver::PointCloudReceiver;
pub use udp_publisher::UdpSpherePublisher;
pub use wire::{decode_frame, encode_frame};
