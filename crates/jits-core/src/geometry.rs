//! Canvas geometry.
//!
//! The canvas follows SVG conventions: `x` grows to the right and `y` grows
//! downwards, so deeper tree levels sit lower on the canvas. A node's [`Point`] is
//! the center of its box.

use serde::{Deserialize, Serialize};

/// A position on the canvas.
///
/// Points travel in store records, so they serialize as `{ x, y }`.
///
/// ```
/// # use jits_core::geometry::Point;
/// let anchor = Point::new(200.0, 80.0);
/// let below = anchor.add_point(Point::new(0.0, 120.0));
/// assert_eq!(below, Point::new(200.0, 200.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> f32 {
        self.x
    }

    pub fn y(self) -> f32 {
        self.y
    }

    /// Same row, different column.
    pub fn with_x(self, x: f32) -> Self {
        Self { x, ..self }
    }

    /// Offsets this point by `offset`.
    pub fn add_point(self, offset: Point) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y)
    }

    pub fn midpoint(self, other: Point) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Extent of a node box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }
}

/// An axis-aligned box on the canvas, used to fit the rendered document around
/// its nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min: Point,
    max: Point,
}

impl Bounds {
    /// The box of `size` centered on `center`.
    pub fn new_from_center(center: Point, size: Size) -> Self {
        let half = Point::new(size.width / 2.0, size.height / 2.0);
        Self {
            min: Point::new(center.x - half.x, center.y - half.y),
            max: center.add_point(half),
        }
    }

    pub fn min_x(self) -> f32 {
        self.min.x
    }

    pub fn min_y(self) -> f32 {
        self.min.y
    }

    pub fn max_x(self) -> f32 {
        self.max.x
    }

    pub fn width(self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(self) -> f32 {
        self.max.y - self.min.y
    }

    /// Top-left corner.
    pub fn min_point(self) -> Point {
        self.min
    }

    /// The smallest box holding both `self` and `other`.
    ///
    /// ```
    /// # use jits_core::geometry::{Bounds, Point, Size};
    /// let guard = Bounds::new_from_center(Point::new(200.0, 80.0), Size::new(150.0, 40.0));
    /// let sweep = Bounds::new_from_center(Point::new(200.0, 200.0), Size::new(150.0, 40.0));
    ///
    /// let tree = guard.merge(&sweep);
    /// assert_eq!(tree.min_y(), 60.0);
    /// assert_eq!(tree.height(), 160.0);
    /// ```
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Grows the box by `margin` on every side.
    pub fn expand(&self, margin: f32) -> Self {
        Self {
            min: Point::new(self.min.x - margin, self.min.y - margin),
            max: Point::new(self.max.x + margin, self.max.y + margin),
        }
    }
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn center() -> impl Strategy<Value = Point> {
        (-5_000.0f32..5_000.0, -5_000.0f32..5_000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    proptest! {
        #[test]
        fn merged_box_holds_both_nodes(a in center(), b in center()) {
            let size = Size::new(150.0, 40.0);
            let merged = Bounds::new_from_center(a, size)
                .merge(&Bounds::new_from_center(b, size));
            for point in [a, b] {
                prop_assert!(merged.min_x() <= point.x() - 75.0 + 0.01);
                prop_assert!(merged.max_x() >= point.x() + 75.0 - 0.01);
                prop_assert!(merged.min_y() <= point.y() - 20.0 + 0.01);
            }
            prop_assert!(merged.height() >= 40.0 - 0.01);
        }

        #[test]
        fn expand_grows_both_dimensions(a in center(), margin in 0.0f32..200.0) {
            let bounds = Bounds::new_from_center(a, Size::new(150.0, 40.0));
            let padded = bounds.expand(margin);
            prop_assert!(approx_eq!(f32, padded.width(), 150.0 + 2.0 * margin, epsilon = 0.01));
            prop_assert!(approx_eq!(f32, padded.height(), 40.0 + 2.0 * margin, epsilon = 0.01));
        }
    }
}
