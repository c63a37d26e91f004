//! Time management utilities
//!
//! The transport measures connectivity in milliseconds against a [`Clock`]
//! so the disconnect logic can be driven by a simulated clock in tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Monotonic millisecond clock shared between the render thread and the
/// transport's receive loop.
pub trait Clock: Send + Sync {
    /// Milliseconds elapsed since an arbitrary, fixed origin
    fn now_millis(&self) -> u64;
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    /// Create a clock whose origin is now
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-advanced clock for deterministic tests and replay.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// give another to the transport.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock starting at `start_ms`
    pub fn new(start_ms: u64) -> Self {
        Self {
            millis: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    /// Move time forward by `delta_ms`
    pub fn advance(&self, delta_ms: u64) {
        self.millis.fetch_add(delta_ms, Ordering::SeqCst);
    }

    /// Jump to an absolute time
    pub fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Frame rate over a reporting window.
///
/// The driver calls [`FrameRate::tick`] once per frame and
/// [`FrameRate::take_fps`] whenever it reports; each report starts a new
/// window.
pub struct FrameRate {
    clock: Arc<dyn Clock>,
    window_start: u64,
    frames: u32,
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRate {
    /// Measure against the wall clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    /// Measure against `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let window_start = clock.now_millis();
        Self {
            clock,
            window_start,
            frames: 0,
        }
    }

    /// Count one frame
    pub fn tick(&mut self) {
        self.frames += 1;
    }

    /// Frames per second since the last call, then start a new window.
    /// Returns 0 when no time has passed.
    pub fn take_fps(&mut self) -> f32 {
        let now = self.clock.now_millis();
        let elapsed_ms = now.saturating_sub(self.window_start);
        let fps = if elapsed_ms == 0 {
            0.0
        } else {
            self.frames as f32 * 1000.0 / elapsed_ms as f32
        };
        self.window_start = now;
        self.frames = 0;
        fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(100);
        let handle = clock.clone();
        handle.advance(250);
        assert_eq!(clock.now_millis(), 350);
        clock.set(10);
        assert_eq!(handle.now_millis(), 10);
    }

    #[test]
    fn test_frame_rate_resets_each_window() {
        let clock = ManualClock::new(0);
        let mut rate = FrameRate::with_clock(Arc::new(clock.clone()));
        for _ in 0..30 {
            rate.tick();
        }
        clock.advance(500);
        assert_relative_eq!(rate.take_fps(), 60.0);

        rate.tick();
        clock.advance(1_000);
        assert_relative_eq!(rate.take_fps(), 1.0);
        assert_relative_eq!(rate.take_fps(), 0.0);
    }
}
