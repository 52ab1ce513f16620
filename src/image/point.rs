//
// houghcircles - Circle detection using the gradient-directed Hough transform
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Integer grid positions and rectangles.
//!

use cgmath::Vector2;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Position of a pixel (column `x`, row `y`).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32
}

impl Add for Point {
    type Output = Point;

    fn add(mut self, other: Point) -> Point {
        self += other;
        self
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(mut self, other: Point) -> Point {
        self -= other;
        self
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, other: Point) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, other: Point) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Point {
    pub fn new(x: i32, y: i32) -> Point { Point{ x, y } }

    /// Returns the grid cell nearest to `v` (halves are rounded away from zero).
    pub fn round_from(v: &Vector2<f64>) -> Point {
        Point{ x: v.x.round() as i32, y: v.y.round() as i32 }
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2{ x: self.x as f64, y: self.y as f64 }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32
}

impl Rect {
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width as i32 && p.y >= self.y && p.y < self.y + self.height as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_rect_check_border_points() {
        let rect = Rect{ x: 0, y: 0, width: 4, height: 3 };
        assert!(rect.contains_point(&Point::new(0, 0)));
        assert!(rect.contains_point(&Point::new(3, 2)));
        assert!(!rect.contains_point(&Point::new(4, 2)));
        assert!(!rect.contains_point(&Point::new(3, 3)));
        assert!(!rect.contains_point(&Point::new(-1, 0)));
    }

    #[test]
    fn given_vector_round_to_nearest_cell() {
        assert_eq!(Point::new(2, -3), Point::round_from(&Vector2{ x: 1.6, y: -2.5 }));
        assert_eq!(Point::new(0, 0), Point::round_from(&Vector2{ x: 0.49, y: -0.49 }));
    }

    #[test]
    fn point_arithmetic() {
        let mut p = Point::new(1, 2) + Point::new(3, 4);
        assert_eq!(Point::new(4, 6), p);
        p -= Point::new(1, 1);
        assert_eq!(Point::new(3, 5), p);
        assert_eq!(Point::new(2, 4), p - Point::new(1, 1));
    }
}
