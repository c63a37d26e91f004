//! Rendering backends and their controls
//!
//! The render layer never touches a graphics API. Backends read colors from
//! the transport's frame buffer and emit primitives to a [`DrawSurface`]
//! supplied by the host.

pub mod backend;
pub mod backends;
pub mod controls;
pub mod method;
pub mod overlay;
pub mod surface;

pub use backend::{BackendCommon, RenderBackend, DEFAULT_LED_SIZE};
pub use backends::{Backend, CalibrationPass, FlatRenderer, RealisticRenderer, VolumetricRenderer};
pub use controls::{ControlError, ControlSet, LedModel, RenderControl};
pub use method::{BackendKind, RenderMethod, SelectionRule, SelectionTable};
pub use overlay::AxisLegend;
pub use surface::{
    BlendMode, CommandRecorder, DrawCommand, DrawSurface, Image, ShaderUniforms, TextureId,
};
