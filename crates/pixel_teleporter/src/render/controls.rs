//! Visual controls shared by every backend
//!
//! Controls are plain numbers with a fixed range, plus the LED model that
//! picks a visual style. Values are clamped on write so a backend never
//! sees an out-of-range setting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::foundation::math::utils::clamp;

/// Control errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    /// Name does not match any control
    #[error("Unknown control: {0}")]
    UnknownControl(String),

    /// Name does not match any LED model
    #[error("Unknown LED model: {0}")]
    UnknownModel(String),

    /// Name does not match any render method
    #[error("Unknown render method: {0}")]
    UnknownMethod(String),
}

/// Adjustable render parameters, including pseudo-controls that act on the
/// whole set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderControl {
    /// Restore every control to its default
    Reset,
    /// Billboard size of each light
    Weight,
    /// Brightness of unlit LEDs, 0-255
    AmbientLight,
    /// Exponent of the light's radial falloff
    Falloff,
    /// Strength of the light cast around each LED
    IndirectIntensity,
    /// Bloom applied to bright LEDs
    Overexposure,
    /// Output gamma
    Gamma,
    /// Select the bulb model; value ignored
    LedModelBulb,
    /// Select the SMD model; value ignored
    LedModelSmd,
}

impl RenderControl {
    /// Every control, in display order
    pub const ALL: [Self; 9] = [
        Self::Reset,
        Self::Weight,
        Self::AmbientLight,
        Self::Falloff,
        Self::IndirectIntensity,
        Self::Overexposure,
        Self::Gamma,
        Self::LedModelBulb,
        Self::LedModelSmd,
    ];

    /// Name used in config files and by [`ControlSet::set_named`]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::Weight => "weight",
            Self::AmbientLight => "ambient_light",
            Self::Falloff => "falloff",
            Self::IndirectIntensity => "indirect_intensity",
            Self::Overexposure => "overexposure",
            Self::Gamma => "gamma",
            Self::LedModelBulb => "led_model_bulb",
            Self::LedModelSmd => "led_model_smd",
        }
    }

    /// Inclusive `(min, max)` for numeric controls
    pub const fn range(self) -> Option<(f32, f32)> {
        match self {
            Self::Weight => Some((0.0, 2000.0)),
            Self::AmbientLight => Some((0.0, 255.0)),
            Self::Falloff => Some((0.0, 10.0)),
            Self::IndirectIntensity => Some((0.0, 1.0)),
            Self::Overexposure => Some((0.0, 1000.0)),
            Self::Gamma => Some((0.0, 2.0)),
            Self::Reset | Self::LedModelBulb | Self::LedModelSmd => None,
        }
    }

    /// Default for numeric controls
    pub const fn default_value(self) -> Option<f32> {
        match self {
            Self::Weight => Some(100.0),
            Self::AmbientLight => Some(8.0),
            Self::Falloff => Some(2.0),
            Self::IndirectIntensity => Some(0.75),
            Self::Overexposure => Some(0.0),
            Self::Gamma => Some(1.0),
            Self::Reset | Self::LedModelBulb | Self::LedModelSmd => None,
        }
    }
}

impl FromStr for RenderControl {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|control| control.name() == wanted)
            .ok_or_else(|| ControlError::UnknownControl(s.to_string()))
    }
}

impl fmt::Display for RenderControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Appearance of a single LED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedModel {
    /// Round through-hole bulb
    #[default]
    Bulb,
    /// Square surface-mount package
    Smd,
    /// Diffused stone
    Stone,
    /// Star-shaped glare
    Star,
    /// Caller-supplied fragment
    Custom,
}

impl LedModel {
    /// Built-in style identifier; `None` for [`LedModel::Custom`]
    pub const fn builtin_style(self) -> Option<&'static str> {
        match self {
            Self::Bulb => Some("bulb.glsl"),
            Self::Smd => Some("smd.glsl"),
            Self::Stone => Some("stone.glsl"),
            Self::Star => Some("star.glsl"),
            Self::Custom => None,
        }
    }
}

impl FromStr for LedModel {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bulb" => Ok(Self::Bulb),
            "smd" => Ok(Self::Smd),
            "stone" => Ok(Self::Stone),
            "star" => Ok(Self::Star),
            "custom" => Ok(Self::Custom),
            _ => Err(ControlError::UnknownModel(s.to_string())),
        }
    }
}

/// Style used when a custom model has no fragment name
pub const FALLBACK_STYLE: &str = "bulb.glsl";

/// Complete set of visual parameters carried by a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSet {
    /// Billboard size
    pub weight: f32,
    /// Unlit brightness, 0-255
    pub ambient_light: f32,
    /// Radial falloff exponent
    pub falloff: f32,
    /// Indirect light strength
    pub indirect_intensity: f32,
    /// Bloom
    pub overexposure: f32,
    /// Output gamma
    pub gamma: f32,
    /// LED appearance
    pub model: LedModel,
    /// Fragment name used by [`LedModel::Custom`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_style: Option<String>,
}

impl Default for ControlSet {
    fn default() -> Self {
        Self {
            weight: 100.0,
            ambient_light: 8.0,
            falloff: 2.0,
            indirect_intensity: 0.75,
            overexposure: 0.0,
            gamma: 1.0,
            model: LedModel::Bulb,
            custom_style: None,
        }
    }
}

impl ControlSet {
    /// Current value of a numeric control; pseudo-controls read as 0
    pub fn get(&self, control: RenderControl) -> f32 {
        match control {
            RenderControl::Weight => self.weight,
            RenderControl::AmbientLight => self.ambient_light,
            RenderControl::Falloff => self.falloff,
            RenderControl::IndirectIntensity => self.indirect_intensity,
            RenderControl::Overexposure => self.overexposure,
            RenderControl::Gamma => self.gamma,
            RenderControl::Reset | RenderControl::LedModelBulb | RenderControl::LedModelSmd => 0.0,
        }
    }

    /// Apply a control. Numeric values are clamped to the control's range.
    pub fn set(&mut self, control: RenderControl, value: f32) {
        let value = match control.range() {
            Some((min, max)) => clamp(value, min, max),
            None => value,
        };

        match control {
            RenderControl::Reset => self.reset(),
            RenderControl::Weight => self.weight = value,
            RenderControl::AmbientLight => self.ambient_light = value,
            RenderControl::Falloff => self.falloff = value,
            RenderControl::IndirectIntensity => self.indirect_intensity = value,
            RenderControl::Overexposure => self.overexposure = value,
            RenderControl::Gamma => self.gamma = value,
            RenderControl::LedModelBulb => self.set_model(LedModel::Bulb),
            RenderControl::LedModelSmd => self.set_model(LedModel::Smd),
        }
    }

    /// Apply a control by name
    pub fn set_named(&mut self, name: &str, value: f32) -> Result<(), ControlError> {
        let control = name.parse::<RenderControl>()?;
        self.set(control, value);
        Ok(())
    }

    /// Restore defaults
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Clamp every numeric field into range, e.g. after loading from a file
    pub fn sanitized(mut self) -> Self {
        for control in RenderControl::ALL {
            if control.range().is_some() {
                let value = self.get(control);
                self.set(control, value);
            }
        }
        self
    }

    /// Set weight
    pub fn set_weight(&mut self, value: f32) {
        self.set(RenderControl::Weight, value);
    }

    /// Set ambient light
    pub fn set_ambient_light(&mut self, value: f32) {
        self.set(RenderControl::AmbientLight, value);
    }

    /// Set falloff
    pub fn set_falloff(&mut self, value: f32) {
        self.set(RenderControl::Falloff, value);
    }

    /// Set indirect intensity
    pub fn set_indirect_intensity(&mut self, value: f32) {
        self.set(RenderControl::IndirectIntensity, value);
    }

    /// Set overexposure
    pub fn set_overexposure(&mut self, value: f32) {
        self.set(RenderControl::Overexposure, value);
    }

    /// Set gamma
    pub fn set_gamma(&mut self, value: f32) {
        self.set(RenderControl::Gamma, value);
    }

    /// Select a model. Built-in models drop any custom fragment name.
    pub fn set_model(&mut self, model: LedModel) {
        self.model = model;
        if model != LedModel::Custom {
            self.custom_style = None;
        }
    }

    /// Select a custom model drawn with `style`
    pub fn set_custom_model(&mut self, style: impl Into<String>) {
        self.model = LedModel::Custom;
        self.custom_style = Some(style.into());
    }

    /// Style identifier derived from the model
    pub fn style(&self) -> &str {
        match self.model.builtin_style() {
            Some(style) => style,
            None => self.custom_style.as_deref().unwrap_or(FALLBACK_STYLE),
        }
    }

    /// Ambient light as a 0-1 fraction
    pub fn ambient_fraction(&self) -> f32 {
        self.ambient_light / 255.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let controls = ControlSet::default();
        for control in RenderControl::ALL {
            if let Some(default) = control.default_value() {
                assert_relative_eq!(controls.get(control), default);
            }
        }
        assert_eq!(controls.model, LedModel::Bulb);
        assert_eq!(controls.style(), "bulb.glsl");
    }

    #[test]
    fn test_named_control_is_clamped() {
        let mut controls = ControlSet::default();
        controls.set_named("falloff", 999.0).unwrap();
        assert_relative_eq!(controls.falloff, 10.0);

        controls.set_named("ambient_light", -5.0).unwrap();
        assert_relative_eq!(controls.ambient_light, 0.0);
    }

    #[test]
    fn test_unknown_control_name() {
        let mut controls = ControlSet::default();
        assert_eq!(
            controls.set_named("brightness", 1.0),
            Err(ControlError::UnknownControl("brightness".to_string()))
        );
        assert_eq!(controls, ControlSet::default());
    }

    #[test]
    fn test_pseudo_controls() {
        let mut controls = ControlSet::default();
        controls.set_weight(500.0);
        controls.set(RenderControl::LedModelSmd, 0.0);
        assert_eq!(controls.style(), "smd.glsl");

        controls.set(RenderControl::Reset, 0.0);
        assert_eq!(controls, ControlSet::default());
    }

    #[test]
    fn test_custom_model_style() {
        let mut controls = ControlSet::default();
        controls.set_custom_model("neon.glsl");
        assert_eq!(controls.style(), "neon.glsl");

        controls.set_model(LedModel::Star);
        assert_eq!(controls.style(), "star.glsl");
        assert!(controls.custom_style.is_none());

        controls.set_model(LedModel::Custom);
        assert_eq!(controls.style(), FALLBACK_STYLE);
        assert_eq!("Stone".parse::<LedModel>(), Ok(LedModel::Stone));
    }

    #[test]
    fn test_sanitize_loaded_values() {
        let loaded = ControlSet {
            weight: 5000.0,
            gamma: -1.0,
            ..ControlSet::default()
        };
        let controls = loaded.sanitized();
        assert_relative_eq!(controls.weight, 2000.0);
        assert_relative_eq!(controls.gamma, 0.0);
    }
}
