//
// houghcircles - Circle detection using the gradient-directed Hough transform
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Gaussian filters and kernels.
//!

use crate::image::{Image, PixelFormat};

/// Below this sigma the recursive filter's coefficients are not valid; a sampled kernel is used instead.
const MIN_RECURSIVE_SIGMA: f32 = 0.5;

/// Sampled 1-D kernel; `values[i]` corresponds to offset `i - radius`.
#[derive(Clone, Debug)]
pub struct Kernel {
    pub values: Vec<f64>,
    pub radius: usize
}

impl Kernel {
    pub fn at(&self, offset: i32) -> f64 {
        self.values[(offset + self.radius as i32) as usize]
    }
}

pub fn kernel_radius(sigma: f64) -> usize {
    (3.0 * sigma).ceil().max(1.0) as usize
}

/// Returns a sampled Gaussian normalized to unit sum.
#[must_use]
pub fn gaussian_kernel(sigma: f64) -> Kernel {
    assert!(sigma > 0.0);

    let radius = kernel_radius(sigma);
    let mut values: Vec<f64> = (0..2 * radius + 1)
        .map(|i| {
            let k = i as f64 - radius as f64;
            (-k * k / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    let sum: f64 = values.iter().sum();
    for v in values.iter_mut() { *v /= sum; }

    Kernel{ values, radius }
}

/// Returns a sampled first derivative of Gaussian.
///
/// Normalized so that correlating it with a unit ramp (value = offset) gives -1.
///
#[must_use]
pub fn gaussian_derivative_kernel(sigma: f64) -> Kernel {
    let gaussian = gaussian_kernel(sigma);
    let radius = gaussian.radius;

    let second_moment: f64 = gaussian.values.iter().enumerate()
        .map(|(i, g)| (i as f64 - radius as f64).powi(2) * g)
        .sum();

    let values = gaussian.values.iter().enumerate()
        .map(|(i, g)| -(i as f64 - radius as f64) * g / second_moment)
        .collect();

    Kernel{ values, radius }
}

#[must_use]
pub fn gaussian_blur(image: &Image, sigma: f32) -> Image {
    let mut result = image.clone();
    gaussian_blur_in_place(&mut result, sigma);
    result
}

/// Blurs a `Mono32f` image; sigma = 0 leaves the image unchanged.
pub fn gaussian_blur_in_place(image: &mut Image, sigma: f32) {
    assert!(image.pixel_format() == PixelFormat::Mono32f);
    assert!(sigma >= 0.0);

    if sigma == 0.0 || image.width() == 0 || image.height() == 0 {
        return;
    }

    if sigma < MIN_RECURSIVE_SIGMA {
        convolve_separable(image, &gaussian_kernel(sigma as f64));
        return;
    }

    let width = image.width() as usize;
    let height = image.height() as usize;

    let yvv = calc_yvv_coefficients(sigma);

    // convolve rows
    for y in 0..height {
        let line = image.line_mut::<f32>(y as u32);
        // perform forward filtering
        yvv_filter_values(line, width, 1, 1, &yvv);
        // perform backward filtering
        yvv_filter_values(line, width, -1, 1, &yvv);
    }

    // convolve columns
    let pixels = image.pixels_mut::<f32>();
    for x in 0..width {
        // perform forward filtering
        yvv_filter_values(&mut pixels[x..], height, 1, width, &yvv);
        // perform backward filtering
        yvv_filter_values(&mut pixels[x..], height, -1, width, &yvv);
    }
}

/// Convolves rows, then columns with a symmetric `kernel`; border values extend beyond the image.
fn convolve_separable(image: &mut Image, kernel: &Kernel) {
    let width = image.width() as i32;
    let height = image.height() as i32;
    let r = kernel.radius as i32;

    let mut temp = vec![0.0f32; (width * height) as usize];
    {
        let pixels = image.pixels::<f32>();
        for y in 0..height {
            for x in 0..width {
                let mut sum = 0.0;
                for k in -r..=r {
                    let sx = (x + k).max(0).min(width - 1);
                    sum += kernel.at(k) * pixels[(y * width + sx) as usize] as f64;
                }
                temp[(y * width + x) as usize] = sum as f32;
            }
        }
    }

    let pixels = image.pixels_mut::<f32>();
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0;
            for k in -r..=r {
                let sy = (y + k).max(0).min(height - 1);
                sum += kernel.at(k) * temp[(sy * width + x) as usize] as f64;
            }
            pixels[(y * width + x) as usize] = sum as f32;
        }
    }
}

/// Young & van Vliet recursive Gaussian coefficients.
#[allow(non_snake_case)]
struct YvVCoefficients {
    b0: f32,
    b1: f32,
    b2: f32,
    b3: f32,
    B: f32
}

#[must_use]
#[allow(non_snake_case)]
fn calc_yvv_coefficients(sigma: f32) -> YvVCoefficients {
    let q = if sigma >= 0.5 && sigma <= 2.5 {
        3.97156 - 4.14554 * (1.0 - 0.26891 * sigma).sqrt()
    } else {
        0.98711 * sigma - 0.9633
    };

    let b0 = 1.57825 + 2.44413 * q + 1.4281 * q.powi(2) + 0.422205 * q.powi(3);
    let b1 = 2.44413 * q + 2.85619 * q.powi(2) + 1.26661 * q.powi(3);
    let b2 = -1.4281 * q.powi(2) - 1.26661 * q.powi(3);
    let b3 = 0.422205 * q.powi(3);
    let B = 1.0 - ((b1 + b2 + b3) / b0);

    YvVCoefficients{ b0, b1, b2, b3, B }
}

/// Performs a Young & van Vliet approximated recursive Gaussian filtering of values in one direction.
///
/// # Parameters
///
/// * `direction` - 1: filter forward, -1: filter backward; if -1, processing starts at the last element.
///
fn yvv_filter_values(
    values: &mut [f32],
    count: usize,
    direction: i32,
    stride: usize,
    yvv: &YvVCoefficients
) {
    assert!(direction == 1 || direction == -1);

    let b0_inv = 1.0 / yvv.b0;

    // start index to process (inclusive)
    let start_idx = if direction == 1 {
        0
    } else {
        stride * (count - 1)
    };

    // assume that border values extend beyond the array
    let mut prev1 = values[start_idx];
    let mut prev2 = values[start_idx];
    let mut prev3 = values[start_idx];

    let mut i = start_idx as i32;
    for _ in 0..count {
        let next = yvv.B * values[i as usize] + (yvv.b1 * prev1 + yvv.b2 * prev2 + yvv.b3 * prev3) * b0_inv;

        prev3 = prev2;
        prev2 = prev1;
        prev1 = next;

        values[i as usize] = next;

        i += direction * stride as i32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impulse_image(size: u32) -> Image {
        let mut image = Image::new(size, size, PixelFormat::Mono32f);
        image.line_mut::<f32>(size / 2)[size as usize / 2] = 1.0;
        image
    }

    fn argmax(values: &[f32]) -> usize {
        let mut best = 0;
        for (i, v) in values.iter().enumerate() {
            if *v > values[best] { best = i; }
        }
        best
    }

    #[test]
    fn given_sigma_gaussian_kernel_has_unit_sum() {
        for sigma in &[0.3, 1.0, 2.7] {
            let kernel = gaussian_kernel(*sigma);
            assert_eq!(2 * kernel.radius + 1, kernel.values.len());
            assert!((kernel.values.iter().sum::<f64>() - 1.0).abs() < 1.0e-12);
            assert!(kernel.at(0) > kernel.at(1));
            assert_eq!(kernel.at(-1), kernel.at(1));
        }
    }

    #[test]
    fn given_ramp_derivative_kernel_response_is_minus_one() {
        let kernel = gaussian_derivative_kernel(1.5);
        let response: f64 = (-(kernel.radius as i32)..=kernel.radius as i32)
            .map(|k| kernel.at(k) * k as f64)
            .sum();
        assert!((response + 1.0).abs() < 1.0e-12);
        assert_eq!(0.0, kernel.at(0));
        assert_eq!(kernel.at(-2), -kernel.at(2));
    }

    #[test]
    fn given_constant_image_blur_preserves_values() {
        for sigma in &[0.3f32, 1.0, 3.0] {
            let mut image = Image::new_from_values::<f32>(8, 5, &[5.0; 40]);
            gaussian_blur_in_place(&mut image, *sigma);
            for v in image.pixels::<f32>() {
                assert!((v - 5.0).abs() < 1.0e-3);
            }
        }
    }

    #[test]
    fn given_impulse_blur_keeps_maximum_in_place() {
        for sigma in &[0.4f32, 3.16] {
            let blurred = gaussian_blur(&impulse_image(21), *sigma);
            assert_eq!(10 * 21 + 10, argmax(blurred.pixels::<f32>()));
            let sum: f32 = blurred.pixels::<f32>().iter().sum();
            assert!((sum - 1.0).abs() < 0.05);
        }
    }

    #[test]
    fn given_zero_sigma_blur_is_identity() {
        let image = impulse_image(5);
        let blurred = gaussian_blur(&image, 0.0);
        assert_eq!(image.pixels::<f32>(), blurred.pixels::<f32>());
    }
}
