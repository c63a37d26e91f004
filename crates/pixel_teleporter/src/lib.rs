//! # Pixel Teleporter
//!
//! Streams LED frames from a remote controller over UDP and renders them on
//! a host-supplied drawing surface.
//!
//! ## Features
//!
//! - **UDP Transport**: One request in flight, non-blocking polling and a
//!   visible flash when the link drops
//! - **Self-Calibrating Rendering**: The first frame measures the object and
//!   picks a flat, volumetric or light-mapped backend
//! - **Render Controls**: Range-checked parameters that survive backend swaps
//! - **File Configuration**: TOML and RON via serde
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pixel_teleporter::prelude::*;
//!
//! fn main() -> Result<(), TeleporterError> {
//!     let config = TeleporterConfig::new("192.168.1.40");
//!     let mut teleporter = PixelTeleporter::new(&config)?;
//!     let panel = grid(16, 16, 10.0);
//!     let mut surface = CommandRecorder::new();
//!
//!     loop {
//!         teleporter.pre_frame();
//!         teleporter.draw(&panel, &mut surface);
//!         teleporter.post_frame();
//!         surface.clear();
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod core;
pub mod foundation;
pub mod render;
pub mod scene;
pub mod transport;

mod teleporter;

pub use teleporter::{PixelTeleporter, TeleporterError, TeleporterResult};

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        core::{Config, ConfigError, TeleporterConfig},
        foundation::{
            color::pack_rgb,
            math::{Vec2, Vec3},
            time::{Clock, FrameRate, ManualClock, SystemClock},
        },
        render::{
            BackendKind, CommandRecorder, ControlSet, DrawCommand, DrawSurface, LedModel,
            RenderBackend, RenderControl, RenderMethod,
        },
        scene::{center_on_origin, cylinder, grid, BoundingBox, Element},
        transport::{FrameBuffer, Transport, TransportConfig, TransportError, TransportState},
        PixelTeleporter, TeleporterError,
    };
}
