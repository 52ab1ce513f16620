//
// houghcircles - Circle detection using the gradient-directed Hough transform
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Circle Hough transform filter.
//!
//! Pixels brighter than a threshold vote, along the direction given by the image gradient, for cells
//! at candidate radii; the resulting accumulator is then searched for peaks, each of which becomes
//! a circle.
//!

mod circle;
mod filter;
mod gradient;
mod peaks;
mod voting;

#[cfg(test)]
mod test_utils;

pub use circle::Circle;
use crate::image::Image;
use crate::logging::Logger;
use voting::VoteImages;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HoughError {
    /// `circles` was called before `execute`.
    NotExecuted
}

impl std::fmt::Display for HoughError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HoughError::NotExecuted => write!(f, "execute() must be called before circles()")
        }
    }
}

impl std::error::Error for HoughError {}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HoughParams {
    /// Half-width (radians) of the angular fan swept around the gradient direction.
    sweep_angle: f64,
    minimum_radius: f64,
    maximum_radius: f64,
    /// Pixels with values above it vote.
    threshold: f64,
    /// Scale of the derivative-of-Gaussian gradient estimator (physical units).
    sigma_gradient: f64,
    /// Maximum number of circles to extract.
    number_of_circles: usize,
    /// Suppression disc radius relative to the found circle's radius.
    disc_radius_ratio: f64,
    /// Variance of the Gaussian blur applied to the accumulator before peak search.
    variance: f64
}

impl Default for HoughParams {
    fn default() -> HoughParams {
        HoughParams {
            sweep_angle: 0.0,
            minimum_radius: 0.0,
            maximum_radius: 10.0,
            threshold: 0.0,
            sigma_gradient: 1.0,
            number_of_circles: 1,
            disc_radius_ratio: 1.0,
            variance: 10.0
        }
    }
}

/// Generates a getter and a setter of a parameter; the setter marks the filter as modified
/// only if the value actually changes.
macro_rules! param_accessors {
    ($($field:ident, $setter:ident: $t:ty);* $(;)?) => {
        $(
            pub fn $field(&self) -> $t { self.params.$field }

            pub fn $setter(&mut self, value: $t) {
                if self.params.$field != value {
                    self.params.$field = value;
                    self.modified();
                }
            }
        )*
    }
}

/// Detects circles in a 2-D scalar image.
///
/// Usage: set the parameters, call `execute` with the input image, then query `circles`.
/// The circle list is cached until a parameter changes or `execute` is called again.
///
pub struct HoughCirclesFilter {
    params: HoughParams,
    /// Incremented on every parameter change and every execution.
    version: u64,
    output: Option<VoteImages>,
    circles: Vec<Circle>,
    /// Value of `version` at which `circles` were extracted.
    circles_stamp: Option<u64>
}

impl Default for HoughCirclesFilter {
    fn default() -> HoughCirclesFilter { HoughCirclesFilter::new() }
}

impl HoughCirclesFilter {
    pub fn new() -> HoughCirclesFilter {
        HoughCirclesFilter{
            params: HoughParams::default(),
            version: 1,
            output: None,
            circles: vec![],
            circles_stamp: None
        }
    }

    param_accessors!(
        sweep_angle, set_sweep_angle: f64;
        minimum_radius, set_minimum_radius: f64;
        maximum_radius, set_maximum_radius: f64;
        threshold, set_threshold: f64;
        sigma_gradient, set_sigma_gradient: f64;
        number_of_circles, set_number_of_circles: usize;
        disc_radius_ratio, set_disc_radius_ratio: f64;
        variance, set_variance: f64;
    );

    /// Sets both the minimum and maximum radius (detection of circles of a fixed size).
    pub fn set_radius(&mut self, radius: f64) {
        self.set_minimum_radius(radius);
        self.set_maximum_radius(radius);
    }

    #[cfg(test)]
    pub fn params(&self) -> &HoughParams { &self.params }

    pub fn version(&self) -> u64 { self.version }

    /// Returns the version at which the cached circle list was extracted (if any).
    pub fn circles_stamp(&self) -> Option<u64> { self.circles_stamp }

    fn modified(&mut self) {
        self.version += 1;
    }

    /// Performs the voting pass; replaces the accumulator and the radius image.
    ///
    /// `image` may have any mono pixel format.
    ///
    pub fn execute(&mut self, image: &Image, logger: &Logger) {
        logger.verbose(&format!("Running the circle Hough transform on {:?}.", image));
        self.output = Some(voting::accumulate_votes(image, &self.params, logger));
        self.modified();
    }

    /// Returns the vote count image (`Mono32f`) after `execute`.
    pub fn accumulator(&self) -> Option<&Image> {
        self.output.as_ref().map(|output| &output.accumulator)
    }

    /// Returns the per-cell average radius image (`Mono32f`) after `execute`.
    pub fn radius_image(&self) -> Option<&Image> {
        self.output.as_ref().map(|output| &output.radius)
    }

    /// Returns the detected circles, strongest first.
    ///
    /// The list is extracted on the first call after `execute` or a parameter change and cached
    /// afterwards.
    ///
    pub fn circles(&mut self, logger: &Logger) -> Result<&[Circle], HoughError> {
        if self.circles_stamp == Some(self.version) {
            logger.verbose("Returning cached circles.");
            return Ok(&self.circles);
        }

        let output = self.output.as_ref().ok_or(HoughError::NotExecuted)?;

        self.circles = peaks::extract_circles(&output.accumulator, &output.radius, &self.params, logger);
        self.circles_stamp = Some(self.version);

        Ok(&self.circles)
    }
}

impl std::fmt::Display for HoughCirclesFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Threshold: {}", self.threshold())?;
        writeln!(f, "Minimum radius: {}", self.minimum_radius())?;
        writeln!(f, "Maximum radius: {}", self.maximum_radius())?;
        writeln!(f, "Derivative scale: {}", self.sigma_gradient())?;
        writeln!(f, "Number of circles: {}", self.number_of_circles())?;
        writeln!(f, "Disc radius ratio: {}", self.disc_radius_ratio())?;
        writeln!(f, "Accumulator blur variance: {}", self.variance())?;
        writeln!(f, "Sweep angle: {}", self.sweep_angle())?;
        match self.radius_image() {
            Some(image) => writeln!(f, "Radius image: {:?}", image)?,
            None => writeln!(f, "Radius image: none")?
        }
        writeln!(f, "Version: {}", self.version())?;
        match self.circles_stamp() {
            Some(stamp) => writeln!(f, "Circles (extracted at version {}):", stamp)?,
            None => writeln!(f, "Circles: not extracted")?
        }
        for circle in &self.circles {
            writeln!(f, "  {}", circle)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector2};
    use crate::image::PixelFormat;
    use crate::logging::Level;

    fn quiet() -> Logger { Logger::new(Level::Quiet) }

    /// Filter set up for rings of radius ~12 drawn with `test_utils::draw_ring`.
    fn ring_filter(number_of_circles: usize) -> HoughCirclesFilter {
        let mut filter = HoughCirclesFilter::new();
        filter.set_threshold(100.0);
        filter.set_sweep_angle(std::f64::consts::PI);
        filter.set_minimum_radius(11.0);
        filter.set_maximum_radius(13.0);
        filter.set_number_of_circles(number_of_circles);
        filter
    }

    fn assert_close(expected: &Vector2<f64>, actual: &Vector2<f64>, tolerance: f64) {
        assert!(
            (*expected - *actual).magnitude() <= tolerance,
            "expected ({}, {}), got ({}, {})", expected.x, expected.y, actual.x, actual.y
        );
    }

    #[test]
    fn given_defaults_use_documented_values() {
        let filter = HoughCirclesFilter::new();
        assert_eq!(0.0, filter.sweep_angle());
        assert_eq!(0.0, filter.minimum_radius());
        assert_eq!(10.0, filter.maximum_radius());
        assert_eq!(0.0, filter.threshold());
        assert_eq!(1.0, filter.sigma_gradient());
        assert_eq!(1, filter.number_of_circles());
        assert_eq!(1.0, filter.disc_radius_ratio());
        assert_eq!(10.0, filter.variance());
    }

    #[test]
    fn given_radius_set_both_bounds() {
        let mut filter = HoughCirclesFilter::new();
        filter.set_radius(7.5);
        assert_eq!(7.5, filter.minimum_radius());
        assert_eq!(7.5, filter.maximum_radius());
        assert_eq!(filter.minimum_radius(), filter.maximum_radius());
    }

    #[test]
    fn when_not_executed_fail() {
        let mut filter = HoughCirclesFilter::new();
        assert_eq!(Err(HoughError::NotExecuted), filter.circles(&quiet()).map(|c| c.len()));
        assert!(filter.accumulator().is_none());
        assert!(filter.radius_image().is_none());
    }

    #[test]
    fn when_value_unchanged_version_unchanged() {
        let mut filter = HoughCirclesFilter::new();
        let v0 = filter.version();
        filter.set_threshold(0.0);
        assert_eq!(v0, filter.version());
        filter.set_threshold(5.0);
        assert_eq!(v0 + 1, filter.version());
    }

    #[test]
    fn given_blank_image_return_no_circles() {
        let image = Image::new(40, 30, PixelFormat::Mono16);
        for n in &[0, 1, 5] {
            let mut filter = HoughCirclesFilter::new();
            filter.set_threshold(10.0);
            filter.set_number_of_circles(*n);
            filter.execute(&image, &quiet());
            assert!(filter.accumulator().unwrap().pixels::<f32>().iter().all(|v| *v == 0.0));
            assert!(filter.circles(&quiet()).unwrap().is_empty());
        }
    }

    #[test]
    fn given_ring_find_its_center_and_radius() {
        let center = Vector2{ x: 30.0, y: 33.0 };
        let image = test_utils::ring_image(64, 64, &center, 12.0, 200.0);

        let mut filter = ring_filter(1);
        filter.execute(&image, &quiet());
        let circles = filter.circles(&quiet()).unwrap();

        assert_eq!(1, circles.len());
        assert_eq!(0, circles[0].id());
        assert_close(&center, &circles[0].center(), 1.0);
        assert!((circles[0].radius() - 12.0).abs() <= 1.0, "radius: {}", circles[0].radius());
    }

    #[test]
    fn given_filled_disc_and_single_ray_find_its_center() {
        let center = Vector2{ x: 25.0, y: 20.0 };
        let mut image = Image::new(50, 40, PixelFormat::Mono32f);
        test_utils::draw_disc(&mut image, &center, 10.0, 255.0);

        let mut filter = HoughCirclesFilter::new();
        filter.set_threshold(10.0);
        filter.set_minimum_radius(0.0);
        filter.set_maximum_radius(20.0);
        filter.execute(&image, &quiet());
        let circles = filter.circles(&quiet()).unwrap();

        assert_eq!(1, circles.len());
        assert_close(&center, &circles[0].center(), 1.0);
    }

    #[test]
    fn given_two_rings_find_both_outside_each_others_disc() {
        let centers = [Vector2{ x: 24.0, y: 30.0 }, Vector2{ x: 80.0, y: 34.0 }];
        let mut image = Image::new(104, 64, PixelFormat::Mono32f);
        for c in &centers {
            test_utils::draw_ring(&mut image, c, 12.0, 200.0);
        }

        let mut filter = ring_filter(2);
        filter.execute(&image, &quiet());
        let ratio = filter.disc_radius_ratio();
        let circles = filter.circles(&quiet()).unwrap().to_vec();

        assert_eq!(2, circles.len());
        assert_eq!(0, circles[0].id());
        assert_eq!(1, circles[1].id());
        assert!(!circles[0].contains(&circles[1].center(), ratio));

        let (first, second) = if circles[0].center().x < circles[1].center().x { (0, 1) } else { (1, 0) };
        assert_close(&centers[0], &circles[first].center(), 1.0);
        assert_close(&centers[1], &circles[second].center(), 1.0);
    }

    #[test]
    fn given_no_changes_return_cached_circles() {
        let image = test_utils::ring_image(48, 48, &Vector2{ x: 24.0, y: 24.0 }, 12.0, 200.0);
        let mut filter = ring_filter(1);
        filter.execute(&image, &quiet());

        let (ptr1, values1) = {
            let circles = filter.circles(&quiet()).unwrap();
            (circles.as_ptr(), circles.to_vec())
        };
        let stamp1 = filter.circles_stamp();
        assert_eq!(Some(filter.version()), stamp1);

        let (ptr2, values2) = {
            let circles = filter.circles(&quiet()).unwrap();
            (circles.as_ptr(), circles.to_vec())
        };
        assert_eq!(ptr1, ptr2);
        assert_eq!(values1, values2);
        assert_eq!(stamp1, filter.circles_stamp());
    }

    #[test]
    fn when_reexecuted_after_change_recompute() {
        let image = test_utils::ring_image(48, 48, &Vector2{ x: 24.0, y: 24.0 }, 12.0, 200.0);
        let mut filter = ring_filter(1);
        filter.execute(&image, &quiet());
        filter.circles(&quiet()).unwrap();
        let stamp1 = filter.circles_stamp().unwrap();

        filter.set_threshold(250.0);
        assert!(filter.version() > stamp1);
        filter.execute(&image, &quiet());
        // no pixel exceeds the new threshold
        assert!(filter.circles(&quiet()).unwrap().is_empty());
        let stamp2 = filter.circles_stamp().unwrap();
        assert!(stamp2 > stamp1);

        filter.set_threshold(100.0);
        filter.set_sigma_gradient(1.5);
        filter.execute(&image, &quiet());
        assert_eq!(1, filter.circles(&quiet()).unwrap().len());
        assert!(filter.circles_stamp().unwrap() > stamp2);
    }

    #[test]
    fn given_executed_filter_describe_parameters_and_circles() {
        let image = test_utils::ring_image(48, 48, &Vector2{ x: 24.0, y: 24.0 }, 12.0, 200.0);
        let mut filter = ring_filter(1);
        assert!(format!("{}", filter).contains("Circles: not extracted"));

        filter.execute(&image, &quiet());
        filter.circles(&quiet()).unwrap();
        let description = format!("{}", filter);
        assert!(description.contains("Threshold: 100"));
        assert!(description.contains("Circles (extracted at version"));
    }
}
