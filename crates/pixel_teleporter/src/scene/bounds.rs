//! Axis-aligned bounds of an element cloud
//!
//! Measured once per object registration and by the calibration pass; the
//! result decides which backend gets built and where the axis legend sits.

use crate::foundation::math::Vec3;
use crate::scene::Element;

/// Extents at or below this are treated as zero when deciding flatness
pub const FLAT_EPSILON: f32 = 1e-4;

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl BoundingBox {
    /// Create a new box from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Measure a set of elements. Returns `None` for an empty set, which
    /// has no meaningful extent.
    pub fn from_elements(elements: &[Element]) -> Option<Self> {
        let first = elements.first()?;
        let mut min = first.position;
        let mut max = first.position;
        for element in &elements[1..] {
            let p = element.position;
            min = min.inf(&p);
            max = max.sup(&p);
        }
        Some(Self { min, max })
    }

    /// World-space size along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Get the center of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Largest extent in the x/y plane
    pub fn planar_span(&self) -> f32 {
        let size = self.size();
        size.x.max(size.y)
    }

    /// True when the object has no depth (z-extent of zero)
    pub fn is_flat(&self) -> bool {
        self.size().z.abs() <= FLAT_EPSILON
    }

    /// Where the axis legend is anchored: the minimum corner, so the axes
    /// run along the object's edges
    pub fn axis_origin(&self) -> Vec3 {
        self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::grid;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_set_has_no_bounds() {
        assert!(BoundingBox::from_elements(&[]).is_none());
    }

    #[test]
    fn test_single_element_is_degenerate_and_flat() {
        let single = [Element::new(Vec3::new(3.0, -2.0, 7.0), 0)];
        let bounds = BoundingBox::from_elements(&single).unwrap();
        assert_eq!(bounds.size(), Vec3::zeros());
        assert!(bounds.is_flat());
        assert_eq!(bounds.center(), Vec3::new(3.0, -2.0, 7.0));
    }

    #[test]
    fn test_flat_grid_bounds() {
        // 11 x 11 grid at spacing 10 spans 100 x 100 x 0
        let bounds = BoundingBox::from_elements(&grid(11, 11, 10.0)).unwrap();
        assert_relative_eq!(bounds.size().x, 100.0);
        assert_relative_eq!(bounds.size().y, 100.0);
        assert_relative_eq!(bounds.size().z, 0.0);
        assert!(bounds.is_flat());
        assert_relative_eq!(bounds.center().x, 50.0);
        assert_eq!(bounds.axis_origin(), Vec3::zeros());
    }

    #[test]
    fn test_negative_coordinates_and_depth() {
        let elements = [
            Element::new(Vec3::new(-10.0, 5.0, -1.0), 0),
            Element::new(Vec3::new(20.0, -5.0, 4.0), 1),
        ];
        let bounds = BoundingBox::from_elements(&elements).unwrap();
        assert_eq!(bounds.min, Vec3::new(-10.0, -5.0, -1.0));
        assert_eq!(bounds.max, Vec3::new(20.0, 5.0, 4.0));
        assert_eq!(bounds.axis_origin(), bounds.min);
        assert_relative_eq!(bounds.planar_span(), 30.0);
        assert!(!bounds.is_flat());
    }
}
