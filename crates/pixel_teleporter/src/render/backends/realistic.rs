//! Light-mapped 2D backend
//!
//! Each lit LED is drawn as a dark body sprite plus a radial light map
//! blended additively on top, so neighbouring LEDs bleed into each other
//! the way they do on camera. The light map is rebuilt whenever the falloff
//! control changes.

use crate::foundation::color::{self, gamma_correct, grey, scale_color};
use crate::foundation::math::{utils::clamp, Vec2};
use crate::render::backend::{BackendCommon, RenderBackend};
use crate::render::surface::{BlendMode, DrawSurface, Image, TextureId};
use crate::scene::Element;
use crate::transport::FrameBuffer;

/// Light map edge length used before bounds are known
pub const DEFAULT_MAP_SIZE: usize = 64;
/// Smallest light map edge length
pub const MIN_MAP_SIZE: usize = 16;
/// Largest light map edge length
pub const MAX_MAP_SIZE: usize = 512;
/// Fraction of the map radius that is fully lit
const CORE_RADIUS: f32 = 0.06;
/// Fraction of the map radius lit by the LED itself
const LIT_RADIUS: f32 = 0.12;
/// Brightness below which an LED counts as off
const DARK_THRESHOLD: f32 = 0.005;
/// Grey level of an LED body's package
const BODY_LEVEL: u8 = 20;
/// Grey level of the body's lens ring
const RING_LEVEL: u8 = 32;

/// Light map edge length for an object spanning `span` world units
pub fn light_map_size(span: f32) -> usize {
    clamp(span / 5.0, MIN_MAP_SIZE as f32, MAX_MAP_SIZE as f32) as usize
}

/// Radial light map: solid core, linear edge, then `(1 - d)^falloff`
pub fn build_light_map(size: usize, falloff: f32) -> Image {
    let center = size as f32 / 2.0;
    let max_dist = (2.0 * center * center).sqrt();
    let mut texels = Vec::with_capacity(size * size);

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let dist = (dx * dx + dy * dy).sqrt() / max_dist;
            let level = if dist <= CORE_RADIUS {
                255.0
            } else if dist <= LIT_RADIUS {
                255.0 * (1.0 - dist)
            } else {
                255.0 * (1.0 - dist).max(0.0).powf(falloff)
            };
            texels.push(level.round().clamp(0.0, 255.0) as u8);
        }
    }

    Image {
        width: size,
        height: size,
        texels,
    }
}

/// LED package sprite: dark square with a lens ring
pub fn build_led_body(size: usize) -> Image {
    let size = size.max(2);
    let center = size as f32 / 2.0;
    let ring = size as f32 * 0.45;
    let mut texels = Vec::with_capacity(size * size);

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            let on_ring = ((dx * dx + dy * dy).sqrt() - ring).abs() < 0.75;
            texels.push(if on_ring { RING_LEVEL } else { BODY_LEVEL });
        }
    }

    Image {
        width: size,
        height: size,
        texels,
    }
}

#[derive(Debug, Clone)]
struct Textures {
    body: TextureId,
    light: TextureId,
}

/// Light-mapped 2D rendering
#[derive(Debug, Clone, Default)]
pub struct RealisticRenderer {
    common: BackendCommon,
    light_map: Option<Image>,
    body: Option<Image>,
    built_falloff: f32,
    textures: Option<Textures>,
}

impl RealisticRenderer {
    /// Create a realistic renderer with the given shared state
    pub fn new(common: BackendCommon) -> Self {
        Self {
            common,
            ..Self::default()
        }
    }

    /// Current light map, once built
    pub fn light_map(&self) -> Option<&Image> {
        self.light_map.as_ref()
    }

    fn map_size(&self) -> usize {
        self.common
            .bounds
            .map_or(DEFAULT_MAP_SIZE, |bounds| light_map_size(bounds.planar_span()))
    }

    fn rebuild(&mut self) {
        let falloff = self.common.controls.falloff;
        let size = self.map_size();
        log::debug!("Building {}x{} light map, falloff {}", size, size, falloff);

        self.light_map = Some(build_light_map(size, falloff));
        self.body = Some(build_led_body(self.common.led_size.round() as usize));
        self.built_falloff = falloff;
        self.textures = None;
    }

    fn textures(&mut self, surface: &mut dyn DrawSurface) -> Option<Textures> {
        if self.textures.is_none() {
            let (body, light) = (self.body.as_ref()?, self.light_map.as_ref()?);
            self.textures = Some(Textures {
                body: surface.create_texture(body),
                light: surface.create_texture(light),
            });
        }
        self.textures.clone()
    }
}

impl RenderBackend for RealisticRenderer {
    fn name(&self) -> &'static str {
        "realistic"
    }

    fn initialize(&mut self) {
        self.rebuild();
    }

    fn render(&mut self, elements: &[Element], frame: &FrameBuffer, surface: &mut dyn DrawSurface) {
        let stale = (self.built_falloff - self.common.controls.falloff).abs() > f32::EPSILON;
        if self.light_map.is_none() || stale {
            self.rebuild();
        }
        let Some(textures) = self.textures(surface) else {
            return;
        };

        let controls = &self.common.controls;
        let led_size = self.common.led_size;
        let ambient = grey(controls.ambient_light as u8);
        let boost = 1.0 + controls.overexposure / 100.0;

        surface.set_blend(BlendMode::Normal);
        for element in elements {
            let center = Vec2::new(element.position.x, element.position.y);
            let color = frame.pixel_or_black(element.index);
            let tint = if is_dark(color) {
                ambient
            } else {
                scale_color(gamma_correct(color, controls.gamma), boost)
            };
            surface.sprite(textures.body, center, led_size, tint);
        }

        surface.set_blend(BlendMode::Additive);
        for element in elements {
            let color = frame.pixel_or_black(element.index);
            if is_dark(color) {
                continue;
            }
            let center = Vec2::new(element.position.x, element.position.y);
            let corrected = gamma_correct(color, controls.gamma);
            let tint = scale_color(corrected, controls.indirect_intensity);
            surface.sprite(textures.light, center, controls.weight, tint);
        }
        surface.set_blend(BlendMode::Normal);
    }

    fn common(&self) -> &BackendCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut BackendCommon {
        &mut self.common
    }
}

fn is_dark(color: u32) -> bool {
    f32::from(color::brightness(color)) / 255.0 < DARK_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::color::pack_rgb;
    use crate::render::surface::{CommandRecorder, DrawCommand};
    use crate::scene::{grid, BoundingBox};

    #[test]
    fn test_map_size_follows_extent() {
        assert_eq!(light_map_size(1000.0), 200);
        assert_eq!(light_map_size(10.0), MIN_MAP_SIZE);
        assert_eq!(light_map_size(1.0e6), MAX_MAP_SIZE);
    }

    #[test]
    fn test_light_map_is_brightest_at_center() {
        let map = build_light_map(64, 2.0);
        assert_eq!(map.texels.len(), 64 * 64);
        assert_eq!(map.texel(32, 32), 255);
        assert!(map.texel(40, 32) < 255);
        assert!(map.texel(63, 32) < map.texel(40, 32));
        assert_eq!(map.texel(0, 0), 0);

        let softer = build_light_map(64, 0.5);
        assert!(softer.texel(50, 32) > map.texel(50, 32));
    }

    #[test]
    fn test_initialize_sizes_map_from_bounds() {
        let elements = grid(11, 11, 100.0);
        let mut renderer = RealisticRenderer::default();
        renderer.register_object(&elements);
        renderer.initialize();
        assert_eq!(renderer.light_map().map(|m| m.width), Some(200));
        assert_eq!(renderer.common().bounds, BoundingBox::from_elements(&elements));
    }

    #[test]
    fn test_dark_leds_draw_ambient_body_only() {
        let elements = grid(2, 1, 10.0);
        let mut frame = FrameBuffer::new(2);
        frame.set(1, pack_rgb(200, 100, 0));

        let mut renderer = RealisticRenderer::default();
        renderer.common_mut().controls.set_ambient_light(16.0);
        renderer.initialize();

        let mut surface = CommandRecorder::new();
        renderer.render(&elements, &frame, &mut surface);

        assert_eq!(surface.count(|c| matches!(c, DrawCommand::CreateTexture { .. })), 2);
        let sprites: Vec<_> = surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Sprite { tint, .. } => Some(*tint),
                _ => None,
            })
            .collect();
        // two bodies, one light
        assert_eq!(sprites.len(), 3);
        assert_eq!(sprites[0], grey(16));
        assert_eq!(sprites[1], pack_rgb(200, 100, 0));
        assert_eq!(sprites[2], scale_color(pack_rgb(200, 100, 0), 0.75));

        surface.clear();
        renderer.render(&elements, &frame, &mut surface);
        assert_eq!(surface.count(|c| matches!(c, DrawCommand::CreateTexture { .. })), 0);
    }

    #[test]
    fn test_falloff_change_rebuilds_map() {
        let mut renderer = RealisticRenderer::default();
        renderer.initialize();
        let mut surface = CommandRecorder::new();
        renderer.render(&[], &FrameBuffer::new(0), &mut surface);

        renderer.common_mut().controls.set_falloff(6.0);
        surface.clear();
        renderer.render(&[], &FrameBuffer::new(0), &mut surface);
        assert_eq!(surface.count(|c| matches!(c, DrawCommand::CreateTexture { .. })), 2);
    }
}
