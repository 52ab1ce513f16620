//
// houghcircles - Circle detection using the gradient-directed Hough transform
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Detected circle.
//!

use cgmath::Vector2;
use crate::image::Geometry;

/// Axis-aligned box; `min` and `max` are inclusive corners.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vector2<f64>,
    pub max: Vector2<f64>
}

#[derive(Clone, Debug, PartialEq)]
pub struct Circle {
    /// Extraction rank (0 = strongest accumulator peak).
    id: usize,
    /// Center in pixel index coordinates.
    center: Vector2<f64>,
    radius: f64
}

impl Circle {
    pub fn new(id: usize, center: Vector2<f64>, radius: f64) -> Circle {
        Circle{ id, center, radius }
    }

    pub fn id(&self) -> usize { self.id }

    pub fn center(&self) -> Vector2<f64> { self.center }

    pub fn radius(&self) -> f64 { self.radius }

    pub fn bounding_box(&self) -> BoundingBox {
        let r = Vector2{ x: self.radius, y: self.radius };
        BoundingBox{ min: self.center - r, max: self.center + r }
    }

    /// Returns the center in physical coordinates of an image with `geometry`.
    pub fn physical_center(&self, geometry: &Geometry) -> Vector2<f64> {
        geometry.index_to_physical(&self.center)
    }

    /// Returns true if `point` (in index coordinates) lies inside the circle scaled by `ratio`.
    #[cfg(test)]
    pub fn contains(&self, point: &Vector2<f64>, ratio: f64) -> bool {
        cgmath::InnerSpace::magnitude(*point - self.center) < ratio * self.radius
    }
}

impl std::fmt::Display for Circle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}: center ({:.2}, {:.2}), radius {:.3}", self.id, self.center.x, self.center.y, self.radius)
    }
}
