//! Flat 2D backend
//!
//! Draws each LED as a filled circle at its x/y position. Depth is ignored.

use crate::foundation::math::Vec2;
use crate::render::backend::{BackendCommon, RenderBackend};
use crate::render::surface::DrawSurface;
use crate::scene::Element;
use crate::transport::FrameBuffer;

/// One colored circle per element
#[derive(Debug, Clone, Default)]
pub struct FlatRenderer {
    common: BackendCommon,
}

impl FlatRenderer {
    /// Create a flat renderer with the given shared state
    pub fn new(common: BackendCommon) -> Self {
        Self { common }
    }
}

impl RenderBackend for FlatRenderer {
    fn name(&self) -> &'static str {
        "flat"
    }

    fn render(&mut self, elements: &[Element], frame: &FrameBuffer, surface: &mut dyn DrawSurface) {
        let diameter = self.common.led_size;
        for element in elements {
            let center = Vec2::new(element.position.x, element.position.y);
            surface.circle(center, diameter, frame.pixel_or_black(element.index));
        }
    }

    fn common(&self) -> &BackendCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut BackendCommon {
        &mut self.common
    }
}
