//
// houghcircles - Circle detection using the gradient-directed Hough transform
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Derivative-of-Gaussian gradient estimation.
//!

use cgmath::Vector2;
use crate::image::{Image, PixelFormat, Point};
use super::filter::{self, Kernel};

/// Evaluates the derivative of a Gaussian-smoothed image at single pixels.
///
/// The kernels are applied as a correlation, so the returned vector points from brighter toward darker
/// pixels. Voting along `-vector` therefore heads for the bright side of an edge.
///
pub struct GradientEstimator<'a> {
    image: &'a Image,
    smooth_x: Kernel,
    smooth_y: Kernel,
    deriv_x: Kernel,
    deriv_y: Kernel
}

impl<'a> GradientEstimator<'a> {
    /// Creates an estimator for a `Mono32f` image.
    ///
    /// `sigma` is in physical units; per-axis pixel scales come from the image spacing.
    ///
    pub fn new(image: &'a Image, sigma: f64) -> GradientEstimator<'a> {
        assert!(image.pixel_format() == PixelFormat::Mono32f);
        assert!(sigma > 0.0);

        let spacing = image.geometry().spacing;
        let sigma_x = sigma / spacing.x;
        let sigma_y = sigma / spacing.y;

        let mut deriv_x = filter::gaussian_derivative_kernel(sigma_x);
        for v in deriv_x.values.iter_mut() { *v /= spacing.x; }
        let mut deriv_y = filter::gaussian_derivative_kernel(sigma_y);
        for v in deriv_y.values.iter_mut() { *v /= spacing.y; }

        GradientEstimator{
            image,
            smooth_x: filter::gaussian_kernel(sigma_x),
            smooth_y: filter::gaussian_kernel(sigma_y),
            deriv_x,
            deriv_y
        }
    }

    /// Returns the gradient at `index`, which must lie inside the image.
    pub fn evaluate_at_index(&self, index: &Point) -> Vector2<f64> {
        debug_assert!(self.image.img_rect().contains_point(index));

        let width = self.image.width() as i32;
        let height = self.image.height() as i32;
        let pixels = self.image.pixels::<f32>();
        let rx = self.smooth_x.radius as i32;
        let ry = self.smooth_y.radius as i32;

        let mut gx = 0.0;
        let mut gy = 0.0;
        for j in -ry..=ry {
            let y = (index.y + j).max(0).min(height - 1);
            let line = &pixels[(y * width) as usize..((y + 1) * width) as usize];
            let mut row_deriv = 0.0;
            let mut row_smooth = 0.0;
            for i in -rx..=rx {
                let value = line[(index.x + i).max(0).min(width - 1) as usize] as f64;
                row_deriv += self.deriv_x.at(i) * value;
                row_smooth += self.smooth_x.at(i) * value;
            }
            gx += self.smooth_y.at(j) * row_deriv;
            gy += self.deriv_y.at(j) * row_smooth;
        }

        Vector2{ x: gx, y: gy }
    }
}
