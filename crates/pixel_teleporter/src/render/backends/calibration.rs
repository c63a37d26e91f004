//! Bootstrap pass that picks the real backend
//!
//! The calibration pass is active right after a render method is chosen.
//! On its first frame it draws nothing: it measures the object, looks the
//! method and shape up in the selection table, and builds the backend that
//! replaces it. Controls set before calibration carry over.

use crate::render::backend::{BackendCommon, RenderBackend};
use crate::render::method::{BackendKind, RenderMethod, SelectionTable};
use crate::render::surface::DrawSurface;
use crate::scene::{count_out_of_range, BoundingBox, Element};
use crate::transport::FrameBuffer;

use super::Backend;

/// Measures the scene once and hands off to a concrete backend
#[derive(Debug, Clone)]
pub struct CalibrationPass {
    common: BackendCommon,
    method: RenderMethod,
    table: SelectionTable,
}

impl CalibrationPass {
    /// Calibration for `method`, selecting through `table`
    pub fn new(method: RenderMethod, table: SelectionTable, common: BackendCommon) -> Self {
        Self { common, method, table }
    }

    /// Method being calibrated for
    pub fn method(&self) -> RenderMethod {
        self.method
    }

    /// Measure `elements` and build the backend that should replace this
    /// pass, initialized and carrying this pass's controls.
    ///
    /// Elements whose index does not fit a frame buffer of `capacity` slots
    /// are logged here; the active backend draws them black.
    pub fn calibrate(&mut self, elements: &[Element], capacity: usize) -> Backend {
        let invalid = count_out_of_range(elements, capacity);
        if invalid > 0 {
            log::error!(
                "{} of {} elements are outside the frame buffer and will draw black",
                invalid,
                elements.len()
            );
        }

        let kind = match BoundingBox::from_elements(elements) {
            Some(bounds) => {
                let size = bounds.size();
                log::info!(
                    "Calibrated object of {} elements: {:.1} x {:.1} x {:.1}",
                    elements.len(),
                    size.x,
                    size.y,
                    size.z
                );
                self.common.set_bounds(bounds);
                self.table.select(self.method, bounds.is_flat())
            }
            None => {
                log::error!(
                    "Calibration found no elements, using {} backend",
                    BackendKind::DEFAULT
                );
                BackendKind::DEFAULT
            }
        };

        let mut backend = Backend::build(kind, BackendCommon::default());
        backend.copy_controls_from(&*self);
        backend.initialize();
        log::info!("Activated {} backend for render method '{}'", backend.name(), self.method);
        backend
    }
}

impl RenderBackend for CalibrationPass {
    fn name(&self) -> &'static str {
        "calibration"
    }

    fn render(
        &mut self,
        _elements: &[Element],
        _frame: &FrameBuffer,
        _surface: &mut dyn DrawSurface,
    ) {
    }

    fn draw_overlay(&self, _surface: &mut dyn DrawSurface) {}

    fn common(&self) -> &BackendCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut BackendCommon {
        &mut self.common
    }
}
