//! Volumetric 3D backend
//!
//! Each LED becomes an additive point sprite at its full 3D position, drawn
//! with the style selected by the LED model.

use crate::render::backend::{BackendCommon, RenderBackend};
use crate::render::surface::{BlendMode, DrawSurface, ShaderUniforms};
use crate::scene::Element;
use crate::transport::FrameBuffer;

/// Additive point sprites in space
#[derive(Debug, Clone, Default)]
pub struct VolumetricRenderer {
    common: BackendCommon,
}

impl VolumetricRenderer {
    /// Create a volumetric renderer with the given shared state
    pub fn new(common: BackendCommon) -> Self {
        Self { common }
    }

    /// Uniforms for the current controls at `time` seconds
    pub fn uniforms(&self, time: f32) -> ShaderUniforms {
        let controls = &self.common.controls;
        ShaderUniforms {
            weight: controls.weight,
            ambient: controls.ambient_fraction(),
            falloff: controls.falloff,
            time,
        }
    }
}

impl RenderBackend for VolumetricRenderer {
    fn name(&self) -> &'static str {
        "volumetric"
    }

    fn render(&mut self, elements: &[Element], frame: &FrameBuffer, surface: &mut dyn DrawSurface) {
        let uniforms = self.uniforms(surface.elapsed_seconds());

        surface.set_blend(BlendMode::Additive);
        surface.bind_style(self.common.controls.style(), &uniforms);
        for element in elements {
            surface.point(element.position, uniforms.weight, frame.pixel_or_black(element.index));
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
