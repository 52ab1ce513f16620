//
// houghcircles - Circle detection using the gradient-directed Hough transform
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Synthetic test images.
//!

use cgmath::{InnerSpace, Vector2};
use crate::image::Image;

/// Adds a ring of width 2 (pixels whose distance from `center` differs from `radius` by at most 1).
pub fn draw_ring(image: &mut Image, center: &Vector2<f64>, radius: f64, value: f32) {
    let width = image.width();
    for y in 0..image.height() {
        let line = image.line_mut::<f32>(y);
        for x in 0..width {
            let dist = (Vector2{ x: x as f64, y: y as f64 } - *center).magnitude();
            if (dist - radius).abs() <= 1.0 {
                line[x as usize] = value;
            }
        }
    }
}

/// Adds a filled disc.
pub fn draw_disc(image: &mut Image, center: &Vector2<f64>, radius: f64, value: f32) {
    let width = image.width();
    for y in 0..image.height() {
        let line = image.line_mut::<f32>(y);
        for x in 0..width {
            if (Vector2{ x: x as f64, y: y as f64 } - *center).magnitude() <= radius {
                line[x as usize] = value;
            }
        }
    }
}

/// Returns a `Mono32f` image with a single ring on zero background.
pub fn ring_image(width: u32, height: u32, center: &Vector2<f64>, radius: f64, value: f32) -> Image {
    let mut image = Image::new(width, height, crate::image::PixelFormat::Mono32f);
    draw_ring(&mut image, center, radius, value);
    image
}
