//! Render methods and backend selection
//!
//! A [`RenderMethod`] is what the caller asks for; the [`SelectionTable`]
//! turns it into a concrete [`BackendKind`] once calibration knows whether
//! the object is flat or solid.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::controls::ControlError;

/// Drawing strategy requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMethod {
    /// Pick by shape: flat objects in 2D, solid ones in 3D
    #[default]
    Auto,
    /// Always draw in the plane
    Draw2d,
    /// Always draw as points in space
    Draw3d,
    /// Lit 2D rendering with a light map per LED
    Realistic2d,
    /// Lit 3D rendering (not available)
    Realistic3d,
    /// Fully shaded 3D rendering (not available)
    Shader3d,
}

impl RenderMethod {
    /// Every method
    pub const ALL: [Self; 6] = [
        Self::Auto,
        Self::Draw2d,
        Self::Draw3d,
        Self::Realistic2d,
        Self::Realistic3d,
        Self::Shader3d,
    ];

    /// Config name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Draw2d => "draw2d",
            Self::Draw3d => "draw3d",
            Self::Realistic2d => "realistic2d",
            Self::Realistic3d => "realistic3d",
            Self::Shader3d => "shader3d",
        }
    }
}

impl FromStr for RenderMethod {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|method| method.name() == wanted)
            .ok_or_else(|| ControlError::UnknownMethod(s.to_string()))
    }
}

impl fmt::Display for RenderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Concrete backends that can be activated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Colored circles in the plane
    Flat,
    /// Additive point sprites in space
    Volumetric,
    /// Light-mapped 2D rendering
    Realistic,
}

impl BackendKind {
    /// Backend used when nothing else applies
    pub const DEFAULT: Self = Self::Flat;
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Flat => "flat",
            Self::Volumetric => "volumetric",
            Self::Realistic => "realistic",
        };
        f.write_str(name)
    }
}

/// Backend choice for one method, by object shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRule {
    /// Method the rule applies to
    pub method: RenderMethod,
    /// Backend for objects with no depth
    pub flat: BackendKind,
    /// Backend for objects with depth
    pub solid: BackendKind,
}

impl SelectionRule {
    /// Create a rule
    pub const fn new(method: RenderMethod, flat: BackendKind, solid: BackendKind) -> Self {
        Self { method, flat, solid }
    }
}

/// Ordered list of selection rules; the first rule for a method wins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionTable {
    rules: Vec<SelectionRule>,
}

impl Default for SelectionTable {
    fn default() -> Self {
        use BackendKind::{Flat, Realistic, Volumetric};
        Self::new(vec![
            SelectionRule::new(RenderMethod::Auto, Flat, Volumetric),
            SelectionRule::new(RenderMethod::Draw2d, Flat, Flat),
            SelectionRule::new(RenderMethod::Draw3d, Volumetric, Volumetric),
            SelectionRule::new(RenderMethod::Realistic2d, Realistic, Realistic),
        ])
    }
}

impl SelectionTable {
    /// Build a table from rules
    pub fn new(rules: Vec<SelectionRule>) -> Self {
        Self { rules }
    }

    /// Rules in lookup order
    pub fn rules(&self) -> &[SelectionRule] {
        &self.rules
    }

    /// Rule for `method`, if any
    pub fn lookup(&self, method: RenderMethod) -> Option<&SelectionRule> {
        self.rules.iter().find(|rule| rule.method == method)
    }

    /// Backend for `method` given the measured shape. Methods without a
    /// rule fall back to [`BackendKind::DEFAULT`] with a warning.
    pub fn select(&self, method: RenderMethod, is_flat: bool) -> BackendKind {
        match self.lookup(method) {
            Some(rule) if is_flat => rule.flat,
            Some(rule) => rule.solid,
            None => {
                log::warn!(
                    "Render method '{}' is not supported, using {} backend",
                    method,
                    BackendKind::DEFAULT
                );
                BackendKind::DEFAULT
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = SelectionTable::default();
        assert_eq!(table.select(RenderMethod::Auto, true), BackendKind::Flat);
        assert_eq!(table.select(RenderMethod::Auto, false), BackendKind::Volumetric);
        assert_eq!(table.select(RenderMethod::Draw2d, false), BackendKind::Flat);
        assert_eq!(table.select(RenderMethod::Draw3d, true), BackendKind::Volumetric);
        assert_eq!(table.select(RenderMethod::Realistic2d, false), BackendKind::Realistic);
    }

    #[test]
    fn test_unsupported_methods_fall_back() {
        let table = SelectionTable::default();
        assert_eq!(table.select(RenderMethod::Realistic3d, false), BackendKind::DEFAULT);
        assert_eq!(table.select(RenderMethod::Shader3d, true), BackendKind::DEFAULT);

        let sparse = SelectionTable::new(vec![SelectionRule::new(
            RenderMethod::Draw3d,
            BackendKind::Realistic,
            BackendKind::Volumetric,
        )]);
        assert_eq!(sparse.select(RenderMethod::Auto, true), BackendKind::DEFAULT);
        assert_eq!(sparse.select(RenderMethod::Draw3d, true), BackendKind::Realistic);
    }

    #[test]
    fn test_method_names() {
        assert_eq!("Realistic2D".parse::<RenderMethod>(), Ok(RenderMethod::Realistic2d));
        assert!("file".parse::<RenderMethod>().is_err());
        assert_eq!(RenderMethod::Shader3d.to_string(), "shader3d");
    }
}
