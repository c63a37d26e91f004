//! Concrete backends
//!
//! The set of backends is closed, so they live in one enum. The context
//! owns exactly one [`Backend`] at a time and swaps it wholesale on
//! calibration or when the render method changes.

pub mod calibration;
pub mod flat;
pub mod realistic;
pub mod volumetric;

pub use calibration::CalibrationPass;
pub use flat::FlatRenderer;
pub use realistic::RealisticRenderer;
pub use volumetric::VolumetricRenderer;

use crate::scene::Element;
use crate::transport::FrameBuffer;

use super::backend::{BackendCommon, RenderBackend};
use super::method::{BackendKind, RenderMethod, SelectionTable};
use super::surface::DrawSurface;

/// The active renderer
#[derive(Debug, Clone)]
pub enum Backend {
    /// Waiting for the first frame to measure the object
    Calibrating(CalibrationPass),
    /// See [`FlatRenderer`]
    Flat(FlatRenderer),
    /// See [`VolumetricRenderer`]
    Volumetric(VolumetricRenderer),
    /// See [`RealisticRenderer`]
    Realistic(RealisticRenderer),
}

impl Backend {
    /// Calibration pass for `method`
    pub fn calibrating(method: RenderMethod, table: SelectionTable, common: BackendCommon) -> Self {
        Self::Calibrating(CalibrationPass::new(method, table, common))
    }

    /// Construct a backend of `kind`. Call [`RenderBackend::initialize`]
    /// before the first frame.
    pub fn build(kind: BackendKind, common: BackendCommon) -> Self {
        match kind {
            BackendKind::Flat => Self::Flat(FlatRenderer::new(common)),
            BackendKind::Volumetric => Self::Volumetric(VolumetricRenderer::new(common)),
            BackendKind::Realistic => Self::Realistic(RealisticRenderer::new(common)),
        }
    }

    /// Kind of the active backend; `None` while calibrating
    pub fn kind(&self) -> Option<BackendKind> {
        match self {
            Self::Calibrating(_) => None,
            Self::Flat(_) => Some(BackendKind::Flat),
            Self::Volumetric(_) => Some(BackendKind::Volumetric),
            Self::Realistic(_) => Some(BackendKind::Realistic),
        }
    }

    /// True until calibration has run
    pub fn is_calibrating(&self) -> bool {
        matches!(self, Self::Calibrating(_))
    }

    fn inner(&self) -> &dyn RenderBackend {
        match self {
            Self::Calibrating(b) => b,
            Self::Flat(b) => b,
            Self::Volumetric(b) => b,
            Self::Realistic(b) => b,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn RenderBackend {
        match self {
            Self::Calibrating(b) => b,
            Self::Flat(b) => b,
            Self::Volumetric(b) => b,
            Self::Realistic(b) => b,
        }
    }
}

impl RenderBackend for Backend {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn initialize(&mut self) {
        self.inner_mut().initialize();
    }

    fn render(&mut self, elements: &[Element], frame: &FrameBuffer, surface: &mut dyn DrawSurface) {
        self.inner_mut().render(elements, frame, surface);
    }

    fn draw_overlay(&self, surface: &mut dyn DrawSurface) {
        self.inner().draw_overlay(surface);
    }

    fn common(&self) -> &BackendCommon {
        self.inner().common()
    }

    fn common_mut(&mut self) -> &mut BackendCommon {
        self.inner_mut().common_mut()
    }
}
