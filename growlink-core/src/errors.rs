//! Error Types for Store, Command, and Generation Failures
//!
//! ## Design Philosophy
//!
//! Every external I/O boundary in this crate converts its failures into one
//! of the enums below, and the owner of that boundary decides what the UI
//! sees:
//!
//! - Subscription *setup* failures (`StoreError::Connect`) are logged and
//!   recorded once in the view-model's `load_error`; they never stop other
//!   subscriptions from being attempted.
//! - Subscription *delivery* failures (`StoreError::Stream`) are forwarded
//!   in-band through the delivery channel; previously delivered data is
//!   always retained.
//! - Command write failures surface exactly once to the caller; there is no
//!   retry or rollback.
//! - Generation failures never escape the assistant; they become a fixed
//!   apology string in the transcript.
//!
//! Nothing here is allowed to propagate as a panic out of library code.

use thiserror::Error;

/// Failures talking to the keyed store or the document store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A subscription or one-shot request could not be established
    #[error("connection failed: {0}")]
    Connect(String),

    /// An established subscription reported an error mid-stream
    #[error("stream error: {0}")]
    Stream(String),

    /// Server answered with a non-success HTTP status
    #[error("server error {status}: {message}")]
    Http { status: u16, message: String },

    /// Response body was not the shape we expected
    #[error("decode error: {0}")]
    Decode(String),

    /// The delivery channel closed before the subscription was disposed
    #[error("subscription closed")]
    Closed,
}

/// Failures writing an actuator command.
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    /// Setpoint outside the actuator's accepted range
    #[error("{actuator} level {value} outside range [{min}, {max}]")]
    OutOfRange {
        actuator: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Transport or auth failure while writing
    #[error("write failed: {0}")]
    Write(#[from] StoreError),
}

/// Failures calling the text-generation endpoint.
#[derive(Debug, Clone, Error)]
pub enum AiError {
    /// Request could not be sent or the connection dropped
    #[error("request failed: {0}")]
    Request(String),

    /// Endpoint answered with a non-success HTTP status
    #[error("endpoint error {status}: {message}")]
    Endpoint { status: u16, message: String },

    /// Response was not the expected JSON shape
    #[error("malformed response: {0}")]
    Malformed(String),
}
