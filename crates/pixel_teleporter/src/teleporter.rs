//! Per-frame driver tying the transport to the active backend
//!
//! A host calls [`PixelTeleporter::pre_frame`] at the top of each animation
//! frame, [`PixelTeleporter::draw`] for each object, and
//! [`PixelTeleporter::post_frame`] at the end. The first `draw` after a
//! render method is chosen calibrates and draws nothing.

use thiserror::Error;

use crate::core::{ConfigError, TeleporterConfig};
use crate::render::{
    Backend, BackendCommon, BackendKind, ControlError, ControlSet, DrawSurface, LedModel,
    RenderBackend, RenderControl, RenderMethod, SelectionTable,
};
use crate::scene::{count_out_of_range, Element};
use crate::transport::{FrameBuffer, Transport, TransportError};

/// Errors surfaced by the context
#[derive(Error, Debug)]
pub enum TeleporterError {
    /// Transport could not be created or started
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A control name or value was rejected
    #[error("Control error: {0}")]
    Control(#[from] ControlError),

    /// Configuration could not be loaded or was invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for context operations
pub type TeleporterResult<T> = Result<T, TeleporterError>;

/// Owns one transport and one active backend
pub struct PixelTeleporter {
    transport: Transport,
    backend: Backend,
    method: RenderMethod,
    selection: SelectionTable,
    show_axes: bool,
}

impl PixelTeleporter {
    /// Validate `config`, open the transport and start receiving
    pub fn new(config: &TeleporterConfig) -> TeleporterResult<Self> {
        config.validate()?;
        let transport = Transport::connect(&config.transport)?;
        Ok(Self::with_transport(transport, config))
    }

    /// Build around an existing transport. The caller is responsible for
    /// starting it.
    pub fn with_transport(transport: Transport, config: &TeleporterConfig) -> Self {
        let common = BackendCommon::new(config.controls.clone().sanitized(), config.led_size);
        log::info!("PixelTeleporter ready, render method '{}'", config.render_method);
        Self {
            transport,
            backend: Backend::calibrating(config.render_method, config.selection.clone(), common),
            method: config.render_method,
            selection: config.selection.clone(),
            show_axes: config.show_axes,
        }
    }

    /// Start-of-frame: drain any received frame. Returns the pixel count
    /// reported by [`Transport::poll_and_decode`].
    pub fn pre_frame(&mut self) -> usize {
        self.transport.poll_and_decode()
    }

    /// End-of-frame: ask the bridge for the next frame unless paused
    pub fn post_frame(&mut self) {
        if !self.transport.is_paused() {
            self.transport.request_frame();
        }
    }

    /// Draw `elements` with the active backend, then the axis legend if
    /// enabled. While calibrating this measures `elements`, activates the
    /// selected backend and draws nothing.
    pub fn draw(&mut self, elements: &[Element], surface: &mut dyn DrawSurface) {
        if let Backend::Calibrating(pass) = &mut self.backend {
            let next = pass.calibrate(elements, self.transport.capacity());
            self.backend = next;
            return;
        }

        self.backend.render(elements, self.transport.frame_buffer(), surface);
        if self.show_axes {
            self.backend.draw_overlay(surface);
        }
    }

    /// Switch render method. The next `draw` recalibrates; controls carry
    /// over.
    pub fn set_render_method(&mut self, method: RenderMethod) {
        let common = self.backend.common().clone();
        self.backend = Backend::calibrating(method, self.selection.clone(), common);
        self.method = method;
        log::info!("Render method set to '{}'", method);
    }

    /// Requested render method
    pub fn render_method(&self) -> RenderMethod {
        self.method
    }

    /// Active backend
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Kind of the active backend; `None` until calibration has run
    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.backend.kind()
    }

    /// Check an object's indices against the frame buffer and measure it.
    ///
    /// Returns the number of elements whose index is out of range; each is
    /// logged. Such elements still draw, in black.
    pub fn register_object(&mut self, elements: &[Element]) -> usize {
        let invalid = count_out_of_range(elements, self.transport.capacity());
        self.backend.register_object(elements);
        invalid
    }

    /// Color of pixel `index`; panics when `index` is out of range
    pub fn pixel(&self, index: usize) -> u32 {
        self.transport.pixel(index)
    }

    /// Decoded colors
    pub fn frame_buffer(&self) -> &FrameBuffer {
        self.transport.frame_buffer()
    }

    /// True while a datagram arrived within the disconnect timeout
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Hold or release the current frame
    pub fn set_paused(&mut self, paused: bool) {
        self.transport.set_paused(paused);
    }

    /// Flip the hold state; returns the new state
    pub fn toggle_pause(&mut self) -> bool {
        let paused = !self.transport.is_paused();
        self.transport.set_paused(paused);
        paused
    }

    /// True while the frame is held
    pub fn is_paused(&self) -> bool {
        self.transport.is_paused()
    }

    /// Enable or disable the axis legend
    pub fn set_show_axes(&mut self, enabled: bool) {
        self.show_axes = enabled;
    }

    /// True when the axis legend is drawn
    pub fn show_axes(&self) -> bool {
        self.show_axes
    }

    /// Current controls
    pub fn controls(&self) -> &ControlSet {
        self.backend.controls()
    }

    /// Apply a control to the active backend
    pub fn set_control(&mut self, control: RenderControl, value: f32) {
        self.backend.set_control(control, value);
    }

    /// Apply a control by name
    pub fn set_named_control(&mut self, name: &str, value: f32) -> TeleporterResult<()> {
        let control = name.parse::<RenderControl>()?;
        self.set_control(control, value);
        Ok(())
    }

    /// Set weight
    pub fn set_weight(&mut self, value: f32) {
        self.set_control(RenderControl::Weight, value);
    }

    /// Set ambient light
    pub fn set_ambient_light(&mut self, value: f32) {
        self.set_control(RenderControl::AmbientLight, value);
    }

    /// Set falloff
    pub fn set_falloff(&mut self, value: f32) {
        self.set_control(RenderControl::Falloff, value);
    }

    /// Set indirect intensity
    pub fn set_indirect_intensity(&mut self, value: f32) {
        self.set_control(RenderControl::IndirectIntensity, value);
    }

    /// Set overexposure
    pub fn set_overexposure(&mut self, value: f32) {
        self.set_control(RenderControl::Overexposure, value);
    }

    /// Set gamma
    pub fn set_gamma(&mut self, value: f32) {
        self.set_control(RenderControl::Gamma, value);
    }

    /// Select an LED model
    pub fn set_model(&mut self, model: LedModel) {
        self.backend.common_mut().controls.set_model(model);
    }

    /// Select a custom LED model drawn with `style`
    pub fn set_custom_model(&mut self, style: impl Into<String>) {
        self.backend.common_mut().controls.set_custom_model(style);
    }

    /// Underlying transport
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Mutable transport
    pub fn transport_mut(&mut self) -> &mut Transport {
        &mut self.transport
    }

    /// Stop the transport's receive loop
    pub fn shutdown(&self) {
        self.transport.shutdown();
    }
}

impl std::fmt::Debug for PixelTeleporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelTeleporter")
            .field("transport", &self.transport)
            .field("backend", &self.backend.name())
            .field("method", &self.method)
            .field("show_axes", &self.show_axes)
            .finish()
    }
}
