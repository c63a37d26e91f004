//! Backend trait and the state every backend carries
//!
//! A backend turns elements plus a frame buffer into draw calls. All
//! backends share a [`BackendCommon`] so controls, measured bounds and the
//! axis legend survive when one backend replaces another.

use crate::scene::{BoundingBox, Element};
use crate::transport::FrameBuffer;

use super::controls::{ControlSet, RenderControl};
use super::overlay::AxisLegend;
use super::surface::DrawSurface;

/// Default diameter of an LED in the flat backends
pub const DEFAULT_LED_SIZE: f32 = 12.0;

/// State carried from backend to backend
#[derive(Debug, Clone, PartialEq)]
pub struct BackendCommon {
    /// Visual controls
    pub controls: ControlSet,
    /// Measured object bounds, once known
    pub bounds: Option<BoundingBox>,
    /// Axis overlay, anchored at the bounds' min corner
    pub legend: AxisLegend,
    /// Diameter of an LED body in world units
    pub led_size: f32,
}

impl Default for BackendCommon {
    fn default() -> Self {
        Self::new(ControlSet::default(), DEFAULT_LED_SIZE)
    }
}

impl BackendCommon {
    /// Common state with no measured bounds
    pub fn new(controls: ControlSet, led_size: f32) -> Self {
        Self {
            controls,
            bounds: None,
            legend: AxisLegend::default(),
            led_size,
        }
    }

    /// Record measured bounds and move the legend to the min corner
    pub fn set_bounds(&mut self, bounds: BoundingBox) {
        self.legend.origin = bounds.axis_origin();
        self.bounds = Some(bounds);
    }

    /// Copy controls, model, bounds and axis origin from another backend
    pub fn copy_from(&mut self, other: &Self) {
        self.clone_from(other);
    }
}

/// Interface every renderer implements
pub trait RenderBackend {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Prepare resources that depend on controls or bounds. Called once
    /// after activation.
    fn initialize(&mut self) {}

    /// Draw one frame of `elements`
    fn render(&mut self, elements: &[Element], frame: &FrameBuffer, surface: &mut dyn DrawSurface);

    /// Draw the axis legend
    fn draw_overlay(&self, surface: &mut dyn DrawSurface) {
        self.common().legend.draw(surface);
    }

    /// Shared state
    fn common(&self) -> &BackendCommon;

    /// Mutable shared state
    fn common_mut(&mut self) -> &mut BackendCommon;

    /// Current controls
    fn controls(&self) -> &ControlSet {
        &self.common().controls
    }

    /// Apply a control, clamped to its range
    fn set_control(&mut self, control: RenderControl, value: f32) {
        self.common_mut().controls.set(control, value);
    }

    /// Take over controls, model, bounds and axis origin from `other`
    fn copy_controls_from(&mut self, other: &dyn RenderBackend) {
        self.common_mut().copy_from(other.common());
    }

    /// Measure a newly registered object
    fn register_object(&mut self, elements: &[Element]) {
        match BoundingBox::from_elements(elements) {
            Some(bounds) => self.common_mut().set_bounds(bounds),
            None => log::error!("Registered object has no elements"),
        }
    }
}
