//! Error types for marshalling strategies
//!
//! Failures are split by direction: producing an encoded form fails with
//! [`Error::Marshalling`], rebuilding an object fails with
//! [`Error::Unmarshalling`]. Both wrap a [`Cause`]; low-level I/O and codec
//! errors never escape unwrapped.
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::key::SurrogateKey;
use std::io;
use thiserror::Error;

/// Result type alias for marshalling operations
pub type Result<T> = std::result::Result<T, Error>;

/// Marshalling failure, tagged with the direction it happened in.
#[derive(Debug, Error)]
pub enum Error {
    /// Producing the encoded form of an object failed (write path).
    #[error("Marshalling failed: {0}")]
    Marshalling(#[source] Cause),

    /// Reconstructing an object from its encoded form failed (read path).
    #[error("Unmarshalling failed: {0}")]
    Unmarshalling(#[source] Cause),
}

impl Error {
    /// Wrap a cause as a write-path failure.
    pub fn marshalling(cause: impl Into<Cause>) -> Self {
        Error::Marshalling(cause.into())
    }

    /// Wrap a cause as a read-path failure.
    pub fn unmarshalling(cause: impl Into<Cause>) -> Self {
        Error::Unmarshalling(cause.into())
    }

    /// True for write-path failures.
    pub fn is_marshalling(&self) -> bool {
        matches!(self, Error::Marshalling(_))
    }

    /// True for read-path failures.
    pub fn is_unmarshalling(&self) -> bool {
        matches!(self, Error::Unmarshalling(_))
    }

    /// The underlying cause, regardless of direction.
    pub fn cause(&self) -> &Cause {
        match self {
            Error::Marshalling(cause) | Error::Unmarshalling(cause) => cause,
        }
    }
}

/// What went wrong underneath a marshalling failure.
#[derive(Debug, Error)]
pub enum Cause {
    /// I/O error from the caller-supplied stream
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Native (binary) codec error
    #[error("Native codec error: {0}")]
    Native(#[from] bincode::Error),

    /// JSON codec error
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// Key was never assigned in this table (save/restore order out of sync)
    #[error("Unknown surrogate key {0}")]
    UnknownKey(SurrogateKey),

    /// Encoded key had the wrong length
    #[error("Malformed surrogate key: expected 4 bytes, got {len}")]
    MalformedKey {
        /// Length of the rejected input
        len: usize,
    },

    /// Type name has no binding in the resolver that was consulted
    #[error("Type '{type_name}' cannot be resolved by resolver '{resolver}'")]
    UnresolvedType {
        /// Name that failed to resolve
        type_name: String,
        /// Name of the resolver consulted
        resolver: String,
    },

    /// Input exceeded a configured size limit
    #[error("{what} of {len} bytes exceeds limit of {max} bytes")]
    LimitExceeded {
        /// Which field overflowed
        what: &'static str,
        /// Observed length
        len: usize,
        /// Configured maximum
        max: usize,
    },

    /// Native envelope framing is invalid
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// No more surrogate keys can be allocated in this table
    #[error("Surrogate key space exhausted after {0} entries")]
    KeySpaceExhausted(usize),

    /// No strategy in the chain accepted the object
    #[error("No strategy accepts objects of type {0}")]
    NoAcceptingStrategy(String),

    /// Strategy named in an encoded entry is not in the store
    #[error("Unknown strategy '{0}'")]
    UnknownStrategyName(String),

    /// Strategy index read from the stream does not exist
    #[error("Unknown strategy index {index} (store has {len} strategies)")]
    UnknownStrategy {
        /// Index read from the stream
        index: usize,
        /// Number of strategies in the store
        len: usize,
    },
}
