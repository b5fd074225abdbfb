//! Error type shared by the framer and the record decoders.

use thiserror::Error;

/// Everything that can stop a single request/reply exchange.
///
/// None of these are retried; the caller decides how to report them.
#[derive(Error, Debug)]
pub enum HostatError {
    /// The reply header did not start with `ANS` or was not a complete line.
    #[error("Unexpected reply: {0}")]
    Protocol(String),
    /// The source address or payload length in the header did not parse.
    #[error("Cannot parse ANS {field}: {line}")]
    Parse { field: &'static str, line: String },
    /// Read or write failure on the transport stream.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),
    /// The stream ended before the declared payload arrived.
    #[error("Truncated payload: got {received} of {expected} bytes")]
    TruncatedPayload { expected: usize, received: usize },
    /// The declared length is larger than the receive buffer may hold.
    #[error("Declared payload length {declared} exceeds maximum record size {max}")]
    PayloadTooLarge { declared: usize, max: usize },
    /// The payload violates the structure of the selected record type.
    #[error("Bad format: {0}")]
    Format(String),
    /// An absolute time at or before the protocol epoch offset.
    #[error("Unexpected time value {0} <= {epoch}", epoch = crate::records::EPOCH_OFFSET)]
    InvalidTime(u32),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HostatError>;
