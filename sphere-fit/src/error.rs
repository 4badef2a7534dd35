//! Error types for sphere-fit

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Per-cycle fit failures.
///
/// Both variants are expected during normal operation (sparse or malformed
/// clouds, near-planar configurations). The pipeline skips the tick and
/// keeps its previous filtered estimate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// Linear system is not matrix-shaped or has too few rows to solve
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Solution does not describe a real sphere
    #[error("Degenerate fit: radius radicand {radicand}")]
    DegenerateFit {
        /// Value under the square root when deriving the radius
        radicand: f64,
    },
}

/// sphere-fit error types
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be read, parsed or validated
    #[error("Configuration error: {0}")]
    Config(String),

    /// Wire payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Frame header inconsistent with the datagram
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
