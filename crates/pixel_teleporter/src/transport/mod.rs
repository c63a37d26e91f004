//! UDP frame transport
//!
//! Pulls frames of RGB data from a remote LED bridge with a one-request,
//! one-response protocol. A dedicated receive thread waits for replies while
//! the render thread polls once per animation frame; neither side ever
//! blocks the other for more than a short lock.
//!
//! When no datagram has arrived for a while the transport fills its frame
//! buffer with a slow grey flash so a dead link is visible instead of
//! frozen.

pub mod frame_buffer;
mod udp;
pub mod wire;

#[cfg(test)]
mod tests;

pub use frame_buffer::FrameBuffer;
pub use udp::{ShutdownHandle, Transport};
pub use wire::{MAX_PIXELS, RECEIVE_BUFFER_SIZE, REQUEST_FRAME_OPCODE};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request/response session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TransportState {
    /// Nothing in flight; a request may be sent
    Idle = 0,
    /// A request was sent and the receive loop is waiting for the reply
    Requested = 1,
    /// A reply is stored and waiting to be decoded
    Received = 2,
}

impl TransportState {
    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Requested,
            2 => Self::Received,
            _ => Self::Idle,
        }
    }
}

/// Transport errors
///
/// Only construction and startup can fail. Per-frame calls log transient
/// network problems and carry on.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Socket creation, bind or thread spawn failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The remote host did not resolve to a socket address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Requested frame buffer is larger than the protocol allows
    #[error("Capacity {requested} exceeds the maximum of {max} pixels")]
    CapacityExceeded {
        /// Capacity asked for
        requested: usize,
        /// Protocol maximum
        max: usize,
    },

    /// `start()` was called on a transport that is already running
    #[error("Receive loop already started")]
    AlreadyStarted,
}

/// Connection and timing settings for a [`Transport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Host name or IP address of the LED bridge
    pub remote_host: String,
    /// Bridge port that accepts frame requests
    pub server_port: u16,
    /// Local port the bridge replies to; `0` picks an ephemeral port
    pub client_port: u16,
    /// Frame buffer capacity in pixels
    pub max_pixels: usize,
    /// Socket read timeout; bounds how long shutdown can take
    pub receive_timeout_ms: u64,
    /// Age at which an unanswered request is abandoned
    pub request_timeout_ms: u64,
    /// Silence after which the link counts as disconnected
    pub disconnect_timeout_ms: u64,
    /// Period of the disconnect flash
    pub flash_period_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            remote_host: "127.0.0.1".to_string(),
            server_port: 8081,
            client_port: 8082,
            max_pixels: MAX_PIXELS,
            receive_timeout_ms: 100,
            request_timeout_ms: 1000,
            disconnect_timeout_ms: 5000,
            flash_period_ms: 3000,
        }
    }
}

impl TransportConfig {
    /// Config pointing at `host:server_port` with every other value defaulted
    pub fn new(remote_host: impl Into<String>, server_port: u16, client_port: u16) -> Self {
        Self {
            remote_host: remote_host.into(),
            server_port,
            client_port,
            ..Self::default()
        }
    }

    /// Set the frame buffer capacity
    pub fn with_max_pixels(mut self, max_pixels: usize) -> Self {
        self.max_pixels = max_pixels;
        self
    }
}

/// Counters describing transport activity since construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportStats {
    /// Request datagrams handed to the socket
    pub requests_sent: u64,
    /// Reply datagrams stored by the receive loop
    pub datagrams_received: u64,
    /// Replies decoded into the frame buffer
    pub frames_decoded: u64,
    /// Failed request sends
    pub send_errors: u64,
    /// Requests abandoned after `request_timeout_ms`
    pub expired_requests: u64,
    /// Late replies to expired requests dropped before the next request
    pub stale_discarded: u64,
}
