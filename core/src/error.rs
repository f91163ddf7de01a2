//! Error types for the Pocket API client.
//!
//! # Design
//! One enum covers every failure an operation can report. Input problems
//! (`Config`, `Validation`) are caught before any request is built. Once a
//! request is in flight, failures are split by where they happened: the
//! transport (`Transport`), the service's status line (`Api`), the body
//! encoding (`Decode`), or the body's content (`Protocol`).

use std::error::Error as StdError;
use std::time::Duration;

/// Errors returned by `Client` operations and `PocketClient` parse methods.
#[derive(Debug, thiserror::Error)]
pub enum PocketError {
    /// The client was constructed with unusable settings.
    #[error("{0}")]
    Config(String),

    /// Caller input was rejected before any I/O happened.
    #[error("{0}")]
    Validation(String),

    /// The HTTP round-trip did not complete.
    #[error("failed to send http request: {0}")]
    Transport(#[from] TransportError),

    /// The service answered with a status other than 200. `message` is the
    /// value of the `X-Error` response header.
    #[error("API Error: {message}")]
    Api { status: u16, message: String },

    /// A request payload could not be encoded or a response body could not
    /// be decoded.
    #[error("{0}")]
    Decode(String),

    /// The response decoded cleanly but a required field was missing.
    #[error("{0}")]
    Protocol(String),
}

/// Why an HTTP round-trip failed before a status code was received.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The caller's cancellation token fired while the request was in flight.
    #[error("request cancelled")]
    Cancelled,

    /// The per-call timeout elapsed.
    #[error("request timed out after {0:?}")]
    TimedOut(Duration),

    /// The underlying HTTP stack reported an error.
    #[error("{0}")]
    Request(#[source] Box<dyn StdError + Send + Sync + 'static>),
}

impl TransportError {
    pub fn request<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        TransportError::Request(Box::new(err))
    }
}

impl PocketError {
    /// `true` if the call was aborted through its cancellation token.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PocketError::Transport(TransportError::Cancelled))
    }
}
