//! Small shared helpers.

pub mod signal;

/// Current wall-clock time in microseconds since the Unix epoch.
pub fn timestamp_us() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
