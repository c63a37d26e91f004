//! Packed color helpers
//!
//! Colors travel through the frame buffer as `0xAARRGGBB` words, the same
//! layout the decoder produces from the wire's RGB triples.

/// Fully opaque alpha channel
pub const OPAQUE: u32 = 0xFF00_0000;

/// Pack 8-bit channels into an opaque color
#[inline]
pub const fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    OPAQUE | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// Opaque grey with all three channels set to `level`
#[inline]
pub const fn grey(level: u8) -> u32 {
    pack_rgb(level, level, level)
}

/// Red channel of a packed color
#[inline]
pub const fn red(color: u32) -> u8 {
    (color >> 16) as u8
}

/// Green channel of a packed color
#[inline]
pub const fn green(color: u32) -> u8 {
    (color >> 8) as u8
}

/// Blue channel of a packed color
#[inline]
pub const fn blue(color: u32) -> u8 {
    color as u8
}

/// Alpha channel of a packed color
#[inline]
pub const fn alpha(color: u32) -> u8 {
    (color >> 24) as u8
}

/// Perceived brightness of a color, taken as its brightest channel (0-255)
pub fn brightness(color: u32) -> u8 {
    red(color).max(green(color)).max(blue(color))
}

/// Multiply every channel by `factor`, saturating at 255
pub fn scale_color(color: u32, factor: f32) -> u32 {
    let channel = |c: u8| (f32::from(c) * factor).round().clamp(0.0, 255.0) as u8;
    (color & OPAQUE) | (u32::from(channel(red(color))) << 16)
        | (u32::from(channel(green(color))) << 8)
        | u32::from(channel(blue(color)))
}

/// Apply a power-law gamma curve to each channel.
///
/// `gamma == 1.0` is the identity; larger values darken midtones the way
/// LEDs look to a camera.
pub fn gamma_correct(color: u32, gamma: f32) -> u32 {
    if (gamma - 1.0).abs() < f32::EPSILON {
        return color;
    }
    let channel = |c: u8| {
        let normalized = f32::from(c) / 255.0;
        (normalized.powf(gamma) * 255.0).round().clamp(0.0, 255.0) as u8
    };
    (color & OPAQUE) | (u32::from(channel(red(color))) << 16)
        | (u32::from(channel(green(color))) << 8)
        | u32::from(channel(blue(color)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_and_unpack() {
        let c = pack_rgb(0x12, 0x34, 0x56);
        assert_eq!(c, 0xFF12_3456);
        assert_eq!((red(c), green(c), blue(c), alpha(c)), (0x12, 0x34, 0x56, 0xFF));
    }

    #[test]
    fn test_brightness_is_max_channel() {
        assert_eq!(brightness(pack_rgb(10, 200, 30)), 200);
        assert_eq!(brightness(grey(0)), 0);
    }

    #[test]
    fn test_gamma_identity_and_darkening() {
        let c = pack_rgb(128, 64, 255);
        assert_eq!(gamma_correct(c, 1.0), c);
        let darker = gamma_correct(c, 2.0);
        assert!(red(darker) < 128);
        assert_eq!(blue(darker), 255);
        assert_eq!(alpha(darker), 0xFF);
    }
}
