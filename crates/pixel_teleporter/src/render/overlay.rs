//! Axis legend overlay

use crate::foundation::color::pack_rgb;
use crate::foundation::math::Vec3;

use super::surface::DrawSurface;

/// Length of each axis line in world units
pub const AXIS_LENGTH: f32 = 250.0;

/// Red X, green Y and blue Z lines drawn from a fixed origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLegend {
    /// Where the three lines start
    pub origin: Vec3,
    /// Line length
    pub length: f32,
}

impl Default for AxisLegend {
    fn default() -> Self {
        Self {
            origin: Vec3::zeros(),
            length: AXIS_LENGTH,
        }
    }
}

impl AxisLegend {
    /// Legend anchored at `origin`
    pub fn at(origin: Vec3) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    /// Draw the three axes
    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        let axes = [
            (Vec3::x(), pack_rgb(255, 0, 0)),
            (Vec3::y(), pack_rgb(0, 255, 0)),
            (Vec3::z(), pack_rgb(0, 0, 255)),
        ];
        for (direction, color) in axes {
            surface.line(self.origin, self.origin + direction * self.length, color);
        }
    }
}
