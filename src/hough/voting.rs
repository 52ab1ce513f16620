//
// houghcircles - Circle detection using the gradient-directed Hough transform
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Gradient-directed voting into the circle center accumulator.
//!

use cgmath::{InnerSpace, Vector2};
use crate::image::{Image, PixelFormat, Point, Rect};
use crate::logging::Logger;
use rayon::prelude::*;
use super::HoughParams;
use super::gradient::GradientEstimator;

/// Step (radians) of the angular fan swept around the gradient direction.
pub const SWEEP_ANGLE_STEP: f64 = 0.05;

/// Results of the voting pass; both images have the input's size and geometry.
pub struct VoteImages {
    /// Vote counts (`Mono32f`).
    pub accumulator: Image,
    /// Mean distance between each voted cell and its voters (`Mono32f`); 0 where there are no votes.
    pub radius: Image
}

/// Iterates from `min` (inclusive) to `max` (inclusive).
struct FloatRangeIter {
    min: f64,
    max: f64,
    step: f64,
    step_count: usize
}

impl FloatRangeIter {
    fn new(min: f64, max: f64, step: f64) -> FloatRangeIter {
        FloatRangeIter{ min, max, step, step_count: 0 }
    }
}

impl Iterator for FloatRangeIter {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let value = self.min + self.step * self.step_count as f64;
        self.step_count += 1;
        if value <= self.max {
            Some(value)
        } else {
            None
        }
    }
}

/// Per-worker partial results of the voting pass.
struct VoteBuffers {
    votes: Vec<u32>,
    radius_sums: Vec<f64>,
    voting_pixels: usize,
    flat_pixels: usize
}

impl VoteBuffers {
    fn new(len: usize) -> VoteBuffers {
        VoteBuffers{ votes: vec![0; len], radius_sums: vec![0.0; len], voting_pixels: 0, flat_pixels: 0 }
    }

    fn merge(mut self, other: VoteBuffers) -> VoteBuffers {
        for (v, o) in self.votes.iter_mut().zip(other.votes.iter()) { *v += *o; }
        for (s, o) in self.radius_sums.iter_mut().zip(other.radius_sums.iter()) { *s += *o; }
        self.voting_pixels += other.voting_pixels;
        self.flat_pixels += other.flat_pixels;
        self
    }
}

/// Returns the offsets of the angular fan: [-sweep_angle, sweep_angle] with `SWEEP_ANGLE_STEP`.
pub fn sweep_angles(sweep_angle: f64) -> Vec<f64> {
    FloatRangeIter::new(-sweep_angle, sweep_angle, SWEEP_ANGLE_STEP).collect()
}

/// Returns true if the gradient has a usable direction: finite, with at least one component above 1
/// in absolute value.
fn has_direction(gradient: &Vector2<f64>) -> bool {
    gradient.x.is_finite() && gradient.y.is_finite() && (gradient.x.abs() > 1.0 || gradient.y.abs() > 1.0)
}

/// Splits `0..height` into at most `num_bands` contiguous ranges of (nearly) equal length.
fn row_bands(height: u32, num_bands: usize) -> Vec<std::ops::Range<u32>> {
    let num_bands = num_bands.max(1) as u32;
    let band_len = ((height + num_bands - 1) / num_bands).max(1);
    (0..height).step_by(band_len as usize).map(|start| start..(start + band_len).min(height)).collect()
}

/// Casts votes of the pixel at `pos`, whose unit gradient is `unit_grad`.
fn cast_votes(
    pos: &Point,
    unit_grad: &Vector2<f64>,
    angles: &[(f64, f64)],
    params: &HoughParams,
    img_rect: &Rect,
    buffers: &mut VoteBuffers
) {
    let origin = pos.to_vector();
    for &(sin, cos) in angles {
        let direction = Vector2{
            x: unit_grad.x * cos - unit_grad.y * sin,
            y: unit_grad.x * sin + unit_grad.y * cos
        };

        let mut trial_radius = params.minimum_radius;
        loop {
            let target = Point::round_from(&(origin - direction * trial_radius));
            let distance = (target - *pos).to_vector().magnitude();

            let inside = img_rect.contains_point(&target);
            if inside {
                let idx = target.y as usize * img_rect.width as usize + target.x as usize;
                buffers.votes[idx] += 1;
                buffers.radius_sums[idx] += distance;
            }

            if !inside || !(distance < params.maximum_radius) {
                break;
            }
            trial_radius += 1.0;
        }
    }
}

/// Performs the voting pass over `image` (any mono pixel format).
///
/// Every pixel brighter than the threshold and having a non-flat gradient walks outward along
/// the fan of directions around its (negated) gradient, voting for each cell it reaches until
/// it leaves the image or gets farther than the maximum radius.
///
pub fn accumulate_votes(image: &Image, params: &HoughParams, logger: &Logger) -> VoteImages {
    let input = image.to_mono32f();
    let estimator = GradientEstimator::new(&input, params.sigma_gradient);
    let angles: Vec<(f64, f64)> = sweep_angles(params.sweep_angle).iter().map(|a| a.sin_cos()).collect();
    let img_rect = input.img_rect();
    let width = input.width();
    let num_cells = width as usize * input.height() as usize;

    // one buffer per band; each covers the whole image, as votes land anywhere
    let buffers = row_bands(input.height(), rayon::current_num_threads()).into_par_iter().map(|rows| {
        let mut buffers = VoteBuffers::new(num_cells);
        for y in rows {
            for (x, value) in input.line::<f32>(y).iter().enumerate() {
                if !(*value as f64 > params.threshold) {
                    continue;
                }
                let pos = Point::new(x as i32, y as i32);
                let gradient = estimator.evaluate_at_index(&pos);
                if !has_direction(&gradient) {
                    buffers.flat_pixels += 1;
                    continue;
                }
                buffers.voting_pixels += 1;
                cast_votes(&pos, &gradient.normalize(), &angles, params, &img_rect, &mut buffers);
            }
        }
        buffers
    }).reduce_with(VoteBuffers::merge).unwrap_or_else(|| VoteBuffers::new(num_cells));

    logger.verbose(&format!(
        "Voting: {} pixels voted, {} skipped (flat or non-finite gradient), {} fan directions, {} votes in total.",
        buffers.voting_pixels,
        buffers.flat_pixels,
        angles.len(),
        buffers.votes.iter().map(|v| *v as u64).sum::<u64>()
    ));

    let mut accumulator = Image::new_like(&input, PixelFormat::Mono32f);
    let mut radius = Image::new_like(&input, PixelFormat::Mono32f);
    for (acc, count) in accumulator.pixels_mut::<f32>().iter_mut().zip(buffers.votes.iter()) {
        *acc = *count as f32;
    }
    // zero-vote cells keep radius 0
    for ((r, sum), count) in radius.pixels_mut::<f32>().iter_mut()
        .zip(buffers.radius_sums.iter())
        .zip(buffers.votes.iter())
        .filter(|(_, count)| **count > 0) {

        *r = (*sum / *count as f64) as f32;
    }

    VoteImages{ accumulator, radius }
}
