//! Error types for the onelease hook
//!
//! Configuration problems are reported once, when the hook parameters are
//! loaded. Nothing on the per-transaction path returns these errors to the
//! host; missing context entries are surfaced as [`ContextError`] and turned
//! into a pass-through by the engine.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for hook configuration
#[derive(Debug, Error)]
pub enum OneleaseError {
    /// Byte prefix decoded to a length other than zero or two bytes
    #[error("wrong byte prefix {prefix:?}: should be zero or two bytes, got {len}")]
    InvalidBytePrefix { prefix: String, len: usize },

    /// Byte prefix is not a formatted hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    /// Subnet prefix could not be parsed or is out of range
    #[error("unable to parse invalid IPv4 prefix {0}")]
    InvalidPrefix(String),

    /// Hardware address text could not be parsed
    #[error("invalid hardware address: {0}")]
    InvalidHardwareAddress(String),

    /// IPv4 address text could not be parsed
    #[error("invalid IPv4 address: {0}")]
    InvalidAddress(String),

    /// Pool bounds are malformed or reversed
    #[error("invalid pool: {0}")]
    InvalidPool(String),

    /// Hook parameters have the wrong shape or type
    #[error("invalid hook parameters: {0}")]
    Parameters(#[from] serde_json::Error),

    /// Parameters file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for hook configuration
pub type Result<T> = std::result::Result<T, OneleaseError>;

/// Lookup failure in the per-transaction context
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The key was never written during this transaction
    #[error("no such callout context: {0}")]
    NotFound(String),
}
