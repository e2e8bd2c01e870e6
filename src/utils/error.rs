// src/utils/error.rs
use std::io;
use thiserror::Error;

/// Main error type for the mining application
///
/// Covers the failure modes of a worker pair (transport, decoding, nonce
/// space exhaustion) as well as configuration and task plumbing errors.
#[derive(Error, Debug)]
pub enum MinerError {
    /// The node is unreachable, or a read/write failed after connecting
    #[error("Network connection error: {0}")]
    ConnectionError(String),

    /// Inbound bytes are not a well-formed block template
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// The fixed-width nonce counter has no values left for this template
    #[error("Nonce counter exhausted for prefix {prefix}")]
    CounterExhausted {
        /// Nonce prefix of the template whose counter space ran out
        prefix: String,
    },

    /// Configuration file or parameter errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid user input or parameter errors
    #[error("Invalid input: {0}")]
    InputError(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Async task execution errors
    #[error("Task execution error: {0}")]
    TaskError(String),
}

impl MinerError {
    /// Whether a worker may reconnect and start over after this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, MinerError::ConnectionError(_) | MinerError::IoError(_))
    }
}

/// Converts hex decoding errors into MinerError
///
/// Raised when a configured target or a nonce is not valid hexadecimal.
impl From<hex::FromHexError> for MinerError {
    fn from(e: hex::FromHexError) -> Self {
        MinerError::InputError(format!("Hex conversion failed: {}", e))
    }
}

/// Converts async task join errors into MinerError
///
/// Used when a miner thread or a worker task panics or is cancelled.
impl From<tokio::task::JoinError> for MinerError {
    fn from(e: tokio::task::JoinError) -> Self {
        MinerError::TaskError(format!("Async task failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_errors_are_retryable() {
        assert!(MinerError::ConnectionError("reset".into()).is_retryable());
        assert!(MinerError::IoError(io::Error::other("broken pipe")).is_retryable());
        assert!(!MinerError::DecodeError("bad json".into()).is_retryable());
        assert!(
            !MinerError::CounterExhausted {
                prefix: "00".into()
            }
            .is_retryable()
        );
        assert!(!MinerError::ConfigError("missing".into()).is_retryable());
    }

    #[test]
    fn test_hex_error_maps_to_input_error() {
        let err: MinerError = hex::decode("zz").unwrap_err().into();
        assert!(matches!(err, MinerError::InputError(_)));
    }
}
