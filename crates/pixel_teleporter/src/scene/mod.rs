//! Scene description consumed by the renderer
//!
//! Scenes are built by the caller (or a pixel-map importer outside this
//! crate) and handed to the renderer as ordered slices of [`Element`]s.

pub mod bounds;
pub mod element;

pub use bounds::BoundingBox;
pub use element::{center_on_origin, count_out_of_range, cylinder, grid, Element};
