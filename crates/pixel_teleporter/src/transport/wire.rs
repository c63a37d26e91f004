//! Wire format of the LED bridge protocol
//!
//! The client sends a fixed 4-byte request to the bridge's command port and
//! the bridge answers on the client's listen port with raw RGB triples, no
//! header. Everything here is pure so the test server and the transport
//! share one definition.

use crate::foundation::color;
use crate::foundation::math::utils::triangle_wave;

/// Opcode asking the bridge for the current frame
pub const REQUEST_FRAME_OPCODE: u8 = 0xF0;

/// Length of every request datagram
pub const REQUEST_LEN: usize = 4;

/// Largest frame the bridge will ever send, in pixels
pub const MAX_PIXELS: usize = 4096;

/// Receive buffer size: a full frame plus headroom
pub const RECEIVE_BUFFER_SIZE: usize = 256 + MAX_PIXELS * 3;

/// Brightest grey the disconnect flash reaches, at half period
pub const FLASH_PEAK: u8 = 64;

/// Build the frame request datagram
pub const fn request_frame_datagram() -> [u8; REQUEST_LEN] {
    [REQUEST_FRAME_OPCODE, 0, 0, 0]
}

/// True when `datagram` is a frame request
pub fn is_frame_request(datagram: &[u8]) -> bool {
    datagram.first() == Some(&REQUEST_FRAME_OPCODE)
}

/// Number of whole pixels in a payload of `len` bytes
pub const fn pixel_count(len: usize) -> usize {
    len / 3
}

/// Grey level of the disconnect flash `elapsed_ms` after the last datagram.
///
/// Ramps 0 -> 64 -> 0 over each `period_ms`.
pub fn disconnect_flash_level(elapsed_ms: u64, period_ms: u64) -> u8 {
    (128.0 * triangle_wave(elapsed_ms, period_ms)).floor() as u8
}

/// Packed opaque color of the disconnect flash
pub fn disconnect_flash_color(elapsed_ms: u64, period_ms: u64) -> u32 {
    color::grey(disconnect_flash_level(elapsed_ms, period_ms))
}
