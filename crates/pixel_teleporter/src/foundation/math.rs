//! Math utilities and types
//!
//! Provides the small set of vector types and scalar helpers used for
//! element positions, bounding boxes and light falloff.

pub use nalgebra::{Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Common math utilities
pub mod utils {
    /// Clamp a value between min and max
    ///
    /// NaN inputs collapse to `min` so a bad control value can never
    /// escape its range.
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value.is_nan() || value < min {
            min
        } else if value > max {
            max
        } else {
            value
        }
    }

    /// Triangle wave over `[0, period)`: rises linearly from 0 to 0.5 at
    /// half period, then falls back to 0.
    pub fn triangle_wave(elapsed_ms: u64, period_ms: u64) -> f32 {
        if period_ms == 0 {
            return 0.0;
        }
        let phase = (elapsed_ms % period_ms) as f32 / period_ms as f32;
        if phase > 0.5 {
            1.0 - phase
        } else {
            phase
        }
    }
}
