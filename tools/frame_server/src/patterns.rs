//! Test patterns served to clients

use std::str::FromStr;

use anyhow::{bail, Result};
use pixel_teleporter::foundation::color::pack_rgb;
use pixel_teleporter::transport::FrameBuffer;
use rand::Rng;

/// Animated pattern generated per request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Hue sweep across the strip
    Rainbow,
    /// Single lit pixel walking the strip
    Chase,
    /// Random pixels flashing white
    Sparkle,
    /// Every pixel the same slowly pulsing color
    Solid,
}

impl FromStr for Pattern {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rainbow" => Ok(Self::Rainbow),
            "chase" => Ok(Self::Chase),
            "sparkle" => Ok(Self::Sparkle),
            "solid" => Ok(Self::Solid),
            other => bail!("unknown pattern '{other}' (rainbow, chase, sparkle, solid)"),
        }
    }
}

impl Pattern {
    /// Fill the first `count` slots of `frame` for time `t` seconds
    pub fn render(self, frame: &mut FrameBuffer, count: usize, t: f32, rng: &mut impl Rng) {
        match self {
            Self::Rainbow => {
                for i in 0..count {
                    let hue = (i as f32 / count.max(1) as f32 + t * 0.2).fract();
                    frame.set(i, hsv(hue, 1.0, 1.0));
                }
            }
            Self::Chase => {
                let lit = (t * 30.0) as usize % count.max(1);
                for i in 0..count {
                    let color = if i == lit { pack_rgb(255, 255, 255) } else { pack_rgb(0, 0, 16) };
                    frame.set(i, color);
                }
            }
            Self::Sparkle => {
                for i in 0..count {
                    let color = if rng.gen_bool(0.05) { pack_rgb(255, 255, 255) } else { 0 };
                    frame.set(i, color);
                }
            }
            Self::Solid => {
                let level = (t * std::f32::consts::PI).sin().abs();
                frame.fill(hsv(0.6, 0.8, level));
            }
        }
    }
}

/// Convert hue/saturation/value in `[0, 1]` to a packed color
fn hsv(h: f32, s: f32, v: f32) -> u32 {
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    let (r, g, b) = match sector as i32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let byte = |c: f32| (c * 255.0).round().clamp(0.0, 255.0) as u8;
    pack_rgb(byte(r), byte(g), byte(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(hsv(0.0, 1.0, 1.0), pack_rgb(255, 0, 0));
        assert_eq!(hsv(1.0 / 3.0, 1.0, 1.0), pack_rgb(0, 255, 0));
        assert_eq!(hsv(0.5, 0.0, 0.5), pack_rgb(128, 128, 128));
    }

    #[test]
    fn test_chase_lights_one_pixel() {
        let mut frame = FrameBuffer::new(10);
        Pattern::Chase.render(&mut frame, 10, 0.11, &mut rand::thread_rng());
        let lit = frame.as_slice().iter().filter(|&&c| c == pack_rgb(255, 255, 255)).count();
        assert_eq!(lit, 1);
        assert_eq!(frame.pixel(3), pack_rgb(255, 255, 255));
    }

    #[test]
    fn test_pattern_names() {
        assert_eq!("sparkle".parse::<Pattern>().unwrap(), Pattern::Sparkle);
        assert!("plasma".parse::<Pattern>().is_err());
    }
}
