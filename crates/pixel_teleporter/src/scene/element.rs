//! Addressable light elements
//!
//! An [`Element`] is one LED in world space plus the frame buffer slot its
//! color comes from. Scenes are plain ordered slices of elements; the
//! transport and the backends only ever borrow them.

use crate::foundation::math::Vec3;

/// One addressable light source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    /// Position in world units
    pub position: Vec3,
    /// Slot in the frame buffer holding this element's color
    pub index: usize,
}

impl Element {
    /// Create an element at `position` reading frame buffer slot `index`
    pub fn new(position: Vec3, index: usize) -> Self {
        Self { position, index }
    }

    /// Create an element on the z = 0 plane
    pub fn flat(x: f32, y: f32, index: usize) -> Self {
        Self::new(Vec3::new(x, y, 0.0), index)
    }

    /// Move the element
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }
}

/// Build a `cols` x `rows` panel on the z = 0 plane, indexed row-major
/// starting at the top-left, with `spacing` world units between centers.
pub fn grid(cols: usize, rows: usize, spacing: f32) -> Vec<Element> {
    let mut elements = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            let (x, y) = (col as f32 * spacing, row as f32 * spacing);
            elements.push(Element::flat(x, y, row * cols + col));
        }
    }
    elements
}

/// Build a wrap-around cylinder of `columns` vertical strips with
/// `per_column` LEDs each, indexed strip by strip.
pub fn cylinder(columns: usize, per_column: usize, radius: f32, spacing: f32) -> Vec<Element> {
    let mut elements = Vec::with_capacity(columns * per_column);
    for column in 0..columns {
        let angle = std::f32::consts::TAU * column as f32 / columns.max(1) as f32;
        for step in 0..per_column {
            elements.push(Element::new(
                Vec3::new(radius * angle.cos(), step as f32 * spacing, radius * angle.sin()),
                column * per_column + step,
            ));
        }
    }
    elements
}

/// Translate every element so the object's bounding box is centered on the
/// world origin.
pub fn center_on_origin(elements: &mut [Element]) {
    if let Some(bounds) = super::BoundingBox::from_elements(elements) {
        let center = bounds.center();
        for element in elements.iter_mut() {
            element.position -= center;
        }
    }
}

/// Count elements whose pixel index does not fit a frame buffer of
/// `capacity` slots, logging each one.
pub fn count_out_of_range(elements: &[Element], capacity: usize) -> usize {
    let mut invalid = 0;
    for (position, element) in elements.iter().enumerate() {
        if element.index >= capacity {
            invalid += 1;
            log::error!(
                "Element {} uses pixel index {} but the frame buffer holds {}",
                position,
                element.index,
                capacity
            );
        }
    }
    invalid
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_grid_layout_and_indices() {
        let panel = grid(4, 3, 10.0);
        assert_eq!(panel.len(), 12);
        assert_eq!(panel[5].index, 5);
        assert_relative_eq!(panel[5].position.x, 10.0);
        assert_relative_eq!(panel[5].position.y, 10.0);
        assert!(panel.iter().all(|e| e.position.z == 0.0));
    }

    #[test]
    fn test_center_on_origin() {
        let mut panel = grid(3, 3, 50.0);
        center_on_origin(&mut panel);
        assert_relative_eq!(panel[0].position.x, -50.0);
        assert_relative_eq!(panel[8].position.y, 50.0);
        assert_relative_eq!(panel[4].position.x, 0.0);
    }

    #[test]
    fn test_count_out_of_range() {
        let mut panel = grid(2, 2, 10.0);
        assert_eq!(count_out_of_range(&panel, 4), 0);
        panel[3].index = 4;
        panel[0].index = 99;
        assert_eq!(count_out_of_range(&panel, 4), 2);
        assert_eq!(count_out_of_range(&[], 0), 0);
    }

    #[test]
    fn test_cylinder_has_depth() {
        let tube = cylinder(8, 4, 100.0, 5.0);
        assert_eq!(tube.len(), 32);
        let z_span = tube.iter().map(|e| e.position.z).fold(f32::MIN, f32::max)
            - tube.iter().map(|e| e.position.z).fold(f32::MAX, f32::min);
        assert!(z_span > 1.0);
    }
}
