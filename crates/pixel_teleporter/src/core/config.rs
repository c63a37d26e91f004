//! # Teleporter Configuration
//!
//! Everything needed to bring up a [`crate::PixelTeleporter`]: where the LED
//! bridge lives, how to render, and the initial control values. Loadable
//! from TOML or RON through the [`Config`] trait.
//!
//! ```toml
//! render_method = "auto"
//! show_axes = true
//!
//! [transport]
//! remote_host = "192.168.1.40"
//! max_pixels = 1024
//!
//! [controls]
//! falloff = 3.5
//! model = "smd"
//! ```

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};
use crate::render::{ControlSet, RenderMethod, SelectionTable, DEFAULT_LED_SIZE};
use crate::transport::{TransportConfig, MAX_PIXELS};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeleporterConfig {
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Render method selected at startup
    pub render_method: RenderMethod,
    /// Diameter of an LED body in world units
    pub led_size: f32,
    /// Draw the axis legend after each frame
    pub show_axes: bool,
    /// Bridge connection
    pub transport: TransportConfig,
    /// Initial visual controls
    pub controls: ControlSet,
    /// Method to backend mapping used by calibration
    pub selection: SelectionTable,
}

impl Default for TeleporterConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            render_method: RenderMethod::Auto,
            led_size: DEFAULT_LED_SIZE,
            show_axes: false,
            transport: TransportConfig::default(),
            controls: ControlSet::default(),
            selection: SelectionTable::default(),
        }
    }
}

impl TeleporterConfig {
    /// Configuration for a bridge at `host`, everything else defaulted
    pub fn new(remote_host: impl Into<String>) -> Self {
        Self {
            transport: TransportConfig {
                remote_host: remote_host.into(),
                ..TransportConfig::default()
            },
            ..Self::default()
        }
    }

    /// Set the render method
    pub fn with_render_method(mut self, method: RenderMethod) -> Self {
        self.render_method = method;
        self
    }

    /// Replace the transport settings
    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    /// Replace the initial controls
    pub fn with_controls(mut self, controls: ControlSet) -> Self {
        self.controls = controls;
        self
    }

    /// Enable or disable the axis legend
    pub fn with_axes(mut self, enabled: bool) -> Self {
        self.show_axes = enabled;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transport.remote_host.trim().is_empty() {
            return Err(ConfigError::Invalid("remote_host cannot be empty".to_string()));
        }

        if self.transport.server_port == 0 {
            return Err(ConfigError::Invalid("server_port must be non-zero".to_string()));
        }

        if self.transport.max_pixels > MAX_PIXELS {
            return Err(ConfigError::Invalid(format!(
                "max_pixels {} exceeds the protocol maximum of {}",
                self.transport.max_pixels, MAX_PIXELS
            )));
        }

        if !self.led_size.is_finite() || self.led_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "led_size must be positive, got {}",
                self.led_size
            )));
        }

        Ok(())
    }

    /// Load a file, validate it and clamp controls into range
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(path)?;
        config.validate()?;
        config.controls = config.controls.sanitized();
        Ok(config)
    }
}

impl Config for TeleporterConfig {}
