//! Decoded pixel storage
//!
//! The frame buffer holds one packed `0xAARRGGBB` color per element slot.
//! It is written by the transport on the render thread and read by the
//! active backend through element indices.

use super::wire;
use crate::foundation::color::{self, pack_rgb};

/// Fixed-capacity array of packed colors addressed by element index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: Vec<u32>,
}

impl FrameBuffer {
    /// Create a buffer of `capacity` slots, all transparent black
    pub fn new(capacity: usize) -> Self {
        Self {
            pixels: vec![0; capacity],
        }
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.pixels.len()
    }

    /// Color at `index`.
    ///
    /// Does not validate the index: an index past capacity panics.
    #[inline]
    pub fn pixel(&self, index: usize) -> u32 {
        self.pixels[index]
    }

    /// Checked variant of [`FrameBuffer::pixel`]
    pub fn get(&self, index: usize) -> Option<u32> {
        self.pixels.get(index).copied()
    }

    /// Color at `index`, or black when the index is past capacity.
    ///
    /// Backends read through this so a bad pixel map draws dark LEDs
    /// instead of stopping the frame loop. Bad indices are reported once,
    /// at calibration.
    #[inline]
    pub fn pixel_or_black(&self, index: usize) -> u32 {
        self.get(index).unwrap_or(0)
    }

    /// All slots in index order
    pub fn as_slice(&self) -> &[u32] {
        &self.pixels
    }

    /// Overwrite a single slot
    pub fn set(&mut self, index: usize, color: u32) {
        self.pixels[index] = color;
    }

    /// Set every slot to `color`
    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Decode a flat RGB byte stream into sequential slots starting at 0.
    ///
    /// Trailing bytes that do not make a whole triple are ignored, and
    /// triples past capacity are dropped. Slots beyond the decoded count
    /// keep their previous values. Returns the number of slots written.
    pub fn decode_rgb(&mut self, bytes: &[u8]) -> usize {
        let triples = wire::pixel_count(bytes.len());
        if triples > self.capacity() {
            log::warn!(
                "Frame of {} pixels exceeds buffer capacity {}, truncating",
                triples,
                self.capacity()
            );
        }

        let mut written = 0;
        for (slot, rgb) in self.pixels.iter_mut().zip(bytes.chunks_exact(3)) {
            *slot = pack_rgb(rgb[0], rgb[1], rgb[2]);
            written += 1;
        }
        written
    }

    /// Encode the first `count` slots back into wire order (RGB triples).
    /// Used by test servers and replay tooling.
    pub fn encode_rgb(&self, count: usize) -> Vec<u8> {
        self.pixels
            .iter()
            .take(count)
            .flat_map(|&c| [color::red(c), color::green(c), color::blue(c)])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(n: usize) -> Vec<u8> {
        (0..n * 3).map(|i| (i * 7 % 256) as u8).collect()
    }

    #[test]
    fn test_decode_counts_and_values() {
        for n in [0, 1, 100, 4096] {
            let mut buffer = FrameBuffer::new(4096);
            let bytes = pattern(n);
            assert_eq!(buffer.decode_rgb(&bytes), n);
            for i in 0..n {
                let expected = pack_rgb(bytes[3 * i], bytes[3 * i + 1], bytes[3 * i + 2]);
                assert_eq!(buffer.pixel(i), expected, "slot {i}");
            }
            assert_eq!(buffer.encode_rgb(n), bytes);
        }
    }

    #[test]
    fn test_partial_triple_is_truncated() {
        let mut buffer = FrameBuffer::new(8);
        assert_eq!(buffer.decode_rgb(&[1, 2, 3, 4, 5]), 1);
        assert_eq!(buffer.pixel(0), pack_rgb(1, 2, 3));
        assert_eq!(buffer.pixel(1), 0);
    }

    #[test]
    fn test_overflow_is_clipped_to_capacity() {
        let mut buffer = FrameBuffer::new(2);
        assert_eq!(buffer.decode_rgb(&pattern(5)), 2);
    }

    #[test]
    fn test_untouched_slots_keep_previous_frame() {
        let mut buffer = FrameBuffer::new(4);
        buffer.fill(pack_rgb(9, 9, 9));
        buffer.decode_rgb(&[255, 0, 0]);
        assert_eq!(buffer.pixel(0), pack_rgb(255, 0, 0));
        assert_eq!(buffer.pixel(1), pack_rgb(9, 9, 9));
        assert_eq!(buffer.get(4), None);
    }
}
