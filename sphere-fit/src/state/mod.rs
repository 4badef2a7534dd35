//! State shared between the receiver and fit threads.

mod point_buffer;

pub use point_buffer::{PointSetBuffer, PointSetSnapshot};
