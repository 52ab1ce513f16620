//
// houghcircles - Circle detection using the gradient-directed Hough transform
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Extraction of circles from the accumulator.
//!

use cgmath::Vector2;
use crate::image::{Image, PixelFormat, Point};
use crate::logging::Logger;
use super::HoughParams;
use super::circle::Circle;
use super::filter;

/// Number of angular samples of a suppression disc.
const DISC_ANGLE_STEPS: usize = 2000;

/// Returns the position and value of the maximum; ties resolve to the first one in row-major order.
///
/// NaN values are ignored. Returns `None` for an empty image.
///
pub fn find_maximum(image: &Image) -> Option<(Point, f32)> {
    let width = image.width() as usize;
    let mut best: Option<(usize, f32)> = None;
    for (i, value) in image.pixels::<f32>().iter().enumerate() {
        match best {
            Some((_, best_value)) if !(*value > best_value) => (),
            _ => if !value.is_nan() { best = Some((i, *value)); }
        }
    }

    best.map(|(i, value)| (Point::new((i % width) as i32, (i / width) as i32), value))
}

/// Zeroes cells of `image` sampled densely over the disc of `radius` around `center`.
///
/// Cells are sampled along rays (step 1 in length, pi/1000 in angle) and rounded to the nearest
/// cell, so coverage near the boundary is approximate. The center cell is always zeroed.
///
pub fn suppress_disc(image: &mut Image, center: &Point, radius: f64) {
    let img_rect = image.img_rect();
    let width = image.width() as usize;
    let pixels = image.pixels_mut::<f32>();

    if img_rect.contains_point(center) {
        pixels[center.y as usize * width + center.x as usize] = 0.0;
    }

    let c = center.to_vector();
    for k in 0..DISC_ANGLE_STEPS {
        let angle = k as f64 * std::f64::consts::PI / (DISC_ANGLE_STEPS / 2) as f64;
        let (sin, cos) = angle.sin_cos();
        let mut length = 0.0;
        while length < radius {
            let p = Point::round_from(&(c + Vector2{ x: cos, y: sin } * length));
            if img_rect.contains_point(&p) {
                pixels[p.y as usize * width + p.x as usize] = 0.0;
            }
            length += 1.0;
        }
    }
}

/// Returns up to `params.number_of_circles` circles, strongest accumulator peak first.
///
/// `accumulator` is not modified; peaks are searched in its smoothed copy.
///
pub fn extract_circles(
    accumulator: &Image,
    radius_image: &Image,
    params: &HoughParams,
    logger: &Logger
) -> Vec<Circle> {
    assert!(accumulator.pixel_format() == PixelFormat::Mono32f);
    assert!(accumulator.img_rect() == radius_image.img_rect());

    let mut circles = vec![];
    if params.number_of_circles == 0 {
        return circles;
    }

    let sigma = params.variance.max(0.0).sqrt() as f32;
    let mut smoothed = filter::gaussian_blur(accumulator, sigma);
    logger.verbose(&format!("Searching for peaks in the accumulator smoothed with sigma = {:.2}.", sigma));

    loop {
        let (max_pos, max_value) = match find_maximum(&smoothed) {
            Some(max) => max,
            None => break
        };

        // only zeros left (no votes, or everything already suppressed)
        if max_value <= 0.0 {
            break;
        }

        let radius = radius_image.value_at::<f32>(&max_pos).unwrap_or(0.0) as f64;
        let circle = Circle::new(circles.len(), max_pos.to_vector(), radius);
        logger.verbose(&format!("Peak {:.2} at {}: {}", max_value, max_pos, circle));
        circles.push(circle);

        if circles.len() >= params.number_of_circles {
            break;
        }

        suppress_disc(&mut smoothed, &max_pos, params.disc_radius_ratio * radius);
    }

    circles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Level;

    fn quiet() -> Logger { Logger::new(Level::Quiet) }

    fn params(number_of_circles: usize, variance: f64) -> HoughParams {
        HoughParams{ number_of_circles, variance, ..HoughParams::default() }
    }

    /// 20x20 accumulator with peaks at (5, 5) (plus a neighbor) and at (15, 15); radius 3 everywhere.
    fn two_peaks() -> (Image, Image) {
        let mut accumulator = Image::new(20, 20, PixelFormat::Mono32f);
        accumulator.line_mut::<f32>(5)[5] = 10.0;
        accumulator.line_mut::<f32>(5)[6] = 9.0;
        accumulator.line_mut::<f32>(15)[15] = 5.0;
        let radius = Image::new_from_values::<f32>(20, 20, &[3.0; 400]);
        (accumulator, radius)
    }

    #[test]
    fn given_ties_find_first_maximum() {
        let image = Image::new_from_values::<f32>(3, 2, &[1.0, 4.0, 2.0, 4.0, std::f32::NAN, 0.0]);
        assert_eq!(Some((Point::new(1, 0), 4.0)), find_maximum(&image));
    }

    #[test]
    fn given_leading_nan_find_maximum_ignores_it() {
        let image = Image::new_from_values::<f32>(2, 1, &[std::f32::NAN, -1.0]);
        assert_eq!(Some((Point::new(1, 0), -1.0)), find_maximum(&image));
    }

    #[test]
    fn given_empty_image_no_maximum() {
        assert_eq!(None, find_maximum(&Image::new(0, 0, PixelFormat::Mono32f)));
    }

    #[test]
    fn given_disc_suppress_inside_only() {
        let mut image = Image::new_from_values::<f32>(15, 15, &[1.0; 225]);
        suppress_disc(&mut image, &Point::new(7, 7), 4.0);
        for &(x, y) in &[(7, 7), (10, 7), (7, 4), (5, 9), (4, 7)] {
            assert_eq!(Some(0.0), image.value_at::<f32>(&Point::new(x, y)));
        }
        for &(x, y) in &[(12, 7), (7, 2), (0, 0), (11, 11)] {
            assert_eq!(Some(1.0), image.value_at::<f32>(&Point::new(x, y)));
        }
    }

    #[test]
    fn given_disc_crossing_border_suppress_in_bounds_cells() {
        let mut image = Image::new_from_values::<f32>(6, 6, &[1.0; 36]);
        suppress_disc(&mut image, &Point::new(0, 0), 3.0);
        assert_eq!(Some(0.0), image.value_at::<f32>(&Point::new(2, 0)));
        assert_eq!(Some(0.0), image.value_at::<f32>(&Point::new(1, 1)));
        assert_eq!(Some(1.0), image.value_at::<f32>(&Point::new(5, 5)));
    }

    #[test]
    fn given_zero_requested_circles_return_none() {
        let (accumulator, radius) = two_peaks();
        assert!(extract_circles(&accumulator, &radius, &params(0, 0.0), &quiet()).is_empty());
    }

    #[test]
    fn given_two_peaks_extract_in_order_and_stop_when_exhausted() {
        let (accumulator, radius) = two_peaks();
        let circles = extract_circles(&accumulator, &radius, &params(5, 0.0), &quiet());

        assert_eq!(2, circles.len());
        assert_eq!(0, circles[0].id());
        assert_eq!(Vector2{ x: 5.0, y: 5.0 }, circles[0].center());
        assert_eq!(3.0, circles[0].radius());
        assert_eq!(1, circles[1].id());
        assert_eq!(Vector2{ x: 15.0, y: 15.0 }, circles[1].center());

        // the accumulator itself is left intact
        assert_eq!(Some(9.0), accumulator.value_at::<f32>(&Point::new(6, 5)));
    }

    #[test]
    fn given_requested_count_stop_at_count() {
        let (accumulator, radius) = two_peaks();
        let circles = extract_circles(&accumulator, &radius, &params(1, 0.0), &quiet());
        assert_eq!(1, circles.len());
        assert_eq!(Vector2{ x: 5.0, y: 5.0 }, circles[0].center());
    }

    #[test]
    fn given_blank_accumulator_return_no_circles() {
        let accumulator = Image::new(10, 10, PixelFormat::Mono32f);
        let radius = Image::new(10, 10, PixelFormat::Mono32f);
        for n in &[1, 3, 100] {
            assert!(extract_circles(&accumulator, &radius, &params(*n, 10.0), &quiet()).is_empty());
        }
    }

    #[test]
    fn given_zero_radius_every_circle_is_distinct() {
        let (accumulator, _) = two_peaks();
        let radius = Image::new(20, 20, PixelFormat::Mono32f);
        let circles = extract_circles(&accumulator, &radius, &params(3, 0.0), &quiet());
        assert_eq!(3, circles.len());
        assert_eq!(Vector2{ x: 5.0, y: 5.0 }, circles[0].center());
        assert_eq!(Vector2{ x: 6.0, y: 5.0 }, circles[1].center());
        assert_eq!(Vector2{ x: 15.0, y: 15.0 }, circles[2].center());
    }
}
