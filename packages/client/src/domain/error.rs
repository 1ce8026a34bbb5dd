//! Error types for the sync core domain.

use thiserror::Error;

/// Validation errors raised when constructing domain value objects
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Identifier is empty or whitespace-only
    #[error("Identifier must not be empty")]
    EmptyId,

    /// Identifier exceeds the maximum length
    #[error("Identifier '{0}' exceeds maximum length of {1} characters")]
    IdTooLong(String, usize),

    /// Room identifier does not match `scope:id`
    #[error("Invalid room identifier: '{0}'")]
    InvalidRoomId(String),

    /// Unknown booking status received from the wire
    #[error("Unknown booking status: '{0}'")]
    UnknownBookingStatus(String),

    /// Unknown payment status received from the wire
    #[error("Unknown payment status: '{0}'")]
    UnknownPaymentStatus(String),

    /// Working-hours window with start not strictly before end
    #[error("Work window start '{start}' must be before end '{end}'")]
    InvalidWorkWindow { start: String, end: String },

    /// Time-of-day string that is not `HH:MM`
    #[error("Invalid time of day: '{0}' (expected HH:MM)")]
    InvalidTimeOfDay(String),
}

/// Transport-level errors (WebSocket connection and frame delivery)
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection attempt failed
    #[error("Connection failed: {0}")]
    ConnectFailed(String),

    /// A frame could not be sent because no transport is active
    #[error("Not connected")]
    NotConnected,

    /// A frame could not be sent over the active transport
    #[error("Send failed: {0}")]
    SendFailed(String),
}

/// Errors from the HTTP backend gateways (unread count, availability blocks)
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The HTTP round-trip failed or returned a non-success status
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
