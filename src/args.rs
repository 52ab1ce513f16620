//
// houghcircles - Circle detection using the gradient-directed Hough transform
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Command-line options definitions and parsing.
//!

use crate::hough::HoughCirclesFilter;
use crate::logging;
use strum::IntoEnumIterator;

pub mod cmdline {
    pub const HELP:               &str = "help";
    pub const INPUT:              &str = "input";
    pub const OUTPUT_ACCUMULATOR: &str = "output_accumulator";
    pub const OUTPUT_RADIUS:      &str = "output_radius";
    pub const SWEEP_ANGLE:        &str = "sweep_angle";
    pub const MIN_RADIUS:         &str = "min_radius";
    pub const MAX_RADIUS:         &str = "max_radius";
    pub const RADIUS:             &str = "radius";
    pub const THRESHOLD:          &str = "threshold";
    pub const SIGMA_GRADIENT:     &str = "sigma_gradient";
    pub const NUM_CIRCLES:        &str = "num_circles";
    pub const DISC_RADIUS_RATIO:  &str = "disc_radius_ratio";
    pub const VARIANCE:           &str = "variance";
    pub const LOG_LEVEL:          &str = "log_level";
}

/// Filter parameters given in the command line; `None` means "use the filter's default".
#[derive(Debug, Default, PartialEq)]
pub struct FilterOptions {
    /// In radians.
    sweep_angle: Option<f64>,
    /// Fixed radius; excludes `min_radius` and `max_radius`.
    radius: Option<f64>,
    min_radius: Option<f64>,
    max_radius: Option<f64>,
    threshold: Option<f64>,
    sigma_gradient: Option<f64>,
    num_circles: Option<usize>,
    disc_radius_ratio: Option<f64>,
    variance: Option<f64>
}

#[derive(Debug)]
pub struct Configuration {
    input: String,
    output_accumulator: Option<String>,
    output_radius: Option<String>,
    filter_options: FilterOptions,
    log_level: logging::Level
}

impl Configuration {
    pub fn input(&self) -> &str { &self.input }
    pub fn output_accumulator(&self) -> &Option<String> { &self.output_accumulator }
    pub fn output_radius(&self) -> &Option<String> { &self.output_radius }
    pub fn log_level(&self) -> logging::Level { self.log_level }

    /// Creates a filter with the specified parameters (the remaining ones keep their defaults).
    pub fn hough_filter(&self) -> HoughCirclesFilter {
        let mut filter = HoughCirclesFilter::new();
        let opts = &self.filter_options;

        if let Some(value) = opts.sweep_angle { filter.set_sweep_angle(value); }
        if let Some(value) = opts.min_radius { filter.set_minimum_radius(value); }
        if let Some(value) = opts.max_radius { filter.set_maximum_radius(value); }
        if let Some(value) = opts.radius { filter.set_radius(value); }
        if let Some(value) = opts.threshold { filter.set_threshold(value); }
        if let Some(value) = opts.sigma_gradient { filter.set_sigma_gradient(value); }
        if let Some(value) = opts.num_circles { filter.set_number_of_circles(value); }
        if let Some(value) = opts.disc_radius_ratio { filter.set_disc_radius_ratio(value); }
        if let Some(value) = opts.variance { filter.set_variance(value); }

        filter
    }
}

impl From<logging::Level> for &str {
    fn from(level: logging::Level) -> &'static str {
        match level {
            logging::Level::Quiet   => "quiet",
            logging::Level::Info    => "info",
            logging::Level::Verbose => "verbose"
        }
    }
}

impl std::str::FromStr for logging::Level {
    type Err = ();
    fn from_str(s: &str) -> Result<logging::Level, ()> {

        for level in logging::Level::iter() {
            if s == Into::<&str>::into(level) {
                return Ok(level);
            }
        }

        Err(())
    }
}

pub fn print_help() {
    println!(
r#"Command-line options:

  --{} <file>

    Input image (FITS). Required.


  --{} <file>

    If specified, the vote accumulator is saved to this FITS file.


  --{} <file>

    If specified, the image of average radii of the accumulator cells is saved to this FITS file.


  --{} <value>

    Half-width (degrees) of the fan of voting directions around the gradient direction. Default: 0.


  --{} <value>
  --{} <value>

    Range of detected radii (pixels). Default: 0 and 10.


  --{} <value>

    Detect circles of this radius only. Cannot be used with --{} or --{}.


  --{} <value>

    Only pixels brighter than this value vote. Default: 0.


  --{} <value>

    Scale (sigma) of the derivative-of-Gaussian used to calculate image gradient. Default: 1.


  --{} <value>

    Maximum number of circles to detect. Default: 1.


  --{} <value>

    Radius of the neighborhood of a found circle's center which is excluded from further search,
    relative to the circle's radius. Default: 1.


  --{} <value>

    Variance of the Gaussian blur applied to the accumulator before searching for circles.
    Default: 10. Use 0 to skip blurring.


  --{} <{}|{}|{}>

    Chooses the amount of messages to print during processing. Default: {}.

"#,
        cmdline::INPUT,
        cmdline::OUTPUT_ACCUMULATOR,
        cmdline::OUTPUT_RADIUS,
        cmdline::SWEEP_ANGLE,
        cmdline::MIN_RADIUS,
        cmdline::MAX_RADIUS,
        cmdline::RADIUS, cmdline::MIN_RADIUS, cmdline::MAX_RADIUS,
        cmdline::THRESHOLD,
        cmdline::SIGMA_GRADIENT,
        cmdline::NUM_CIRCLES,
        cmdline::DISC_RADIUS_RATIO,
        cmdline::VARIANCE,

        cmdline::LOG_LEVEL,
        Into::<&str>::into(logging::Level::Quiet),
        Into::<&str>::into(logging::Level::Info),
        Into::<&str>::into(logging::Level::Verbose),
        Into::<&str>::into(logging::Level::Info)
    );
}

/// Returns the value of a single-valued option of type `T`.
fn get_option_value<T: std::str::FromStr>(
    option: &str,
    option_values: &std::collections::HashMap::<String, Vec<String>>
) -> Result<Option<T>, ()> {
    match option_values.get(option) {
        None => Ok(None),
        Some(vals) => if vals.is_empty() {
            eprintln!("Value missing for option {}.", option);
            Err(())
        } else if vals.len() > 1 {
            eprintln!("Too many values for option {}.", option);
            Err(())
        } else {
            match vals[0].parse::<T>() {
                Ok(value) => Ok(Some(value)),
                Err(_) => {
                    eprintln!("Invalid value for option {}: {}.", option, vals[0]);
                    Err(())
                }
            }
        }
    }
}

/// Returns the value of option `option` if it satisfies `is_valid`.
fn get_checked_value<T: std::str::FromStr + Copy + std::fmt::Display, F: Fn(T) -> bool>(
    option: &str,
    option_values: &std::collections::HashMap::<String, Vec<String>>,
    is_valid: F,
    requirement: &str
) -> Result<Option<T>, ()> {
    match get_option_value::<T>(option, option_values)? {
        Some(value) if !is_valid(value) => {
            eprintln!("Invalid value for option {}: {} (must be {}).", option, value, requirement);
            Err(())
        },
        value => Ok(value)
    }
}

/// Returns Ok(None) if help was requested.
pub fn parse_command_line<I: Iterator<Item=String>>(stream: I) -> Result<Option<Configuration>, ()> {
    let allowed_options = vec![
     cmdline::HELP,
     cmdline::INPUT,
     cmdline::OUTPUT_ACCUMULATOR,
     cmdline::OUTPUT_RADIUS,
     cmdline::SWEEP_ANGLE,
     cmdline::MIN_RADIUS,
     cmdline::MAX_RADIUS,
     cmdline::RADIUS,
     cmdline::THRESHOLD,
     cmdline::SIGMA_GRADIENT,
     cmdline::NUM_CIRCLES,
     cmdline::DISC_RADIUS_RATIO,
     cmdline::VARIANCE,
     cmdline::LOG_LEVEL
    ];

    // key: option name
    let mut option_values = std::collections::HashMap::<String, Vec<String>>::new();

    let mut current: Option<&mut Vec<String>> = None;

    for arg in stream.skip(1) /*skip the binary name*/ {
        if arg.starts_with("--") {
            match &arg[2..] {
                cmdline::HELP => { print_help(); return Ok(None); },
                x if !allowed_options.contains(&x) => {
                    eprintln!("Unknown command-line option: {}.", x); return Err(());
                },
                opt => current = Some(option_values.entry(opt.to_string()).or_insert(vec![])),
            }
        } else {
            match current.as_mut() {
                None => {
                    eprintln!("Unexpected value: {}.", arg);
                    return Err(());
                },
                Some(values) => values.push(arg)
            }
        }
    }

    let input = match get_option_value::<String>(cmdline::INPUT, &option_values)? {
        Some(input) => input,
        None => {
            eprintln!("Input file not specified.");
            return Err(());
        }
    };

    let output_accumulator = get_option_value::<String>(cmdline::OUTPUT_ACCUMULATOR, &option_values)?;
    let output_radius = get_option_value::<String>(cmdline::OUTPUT_RADIUS, &option_values)?;

    let non_negative = |value: f64| value >= 0.0;

    let radius = get_checked_value(cmdline::RADIUS, &option_values, non_negative, "non-negative")?;
    let min_radius = get_checked_value(cmdline::MIN_RADIUS, &option_values, non_negative, "non-negative")?;
    let max_radius = get_checked_value(cmdline::MAX_RADIUS, &option_values, non_negative, "non-negative")?;

    if radius.is_some() && (min_radius.is_some() || max_radius.is_some()) {
        eprintln!("Option {} cannot be used together with {} or {}.",
            cmdline::RADIUS, cmdline::MIN_RADIUS, cmdline::MAX_RADIUS
        );
        return Err(());
    }

    // an unspecified bound keeps its default, which may also conflict with the other one
    let defaults = HoughCirclesFilter::new();
    let (min, max) = (
        min_radius.unwrap_or(defaults.minimum_radius()),
        max_radius.unwrap_or(defaults.maximum_radius())
    );
    if radius.is_none() && min > max {
        eprintln!("Minimum radius ({}) exceeds maximum radius ({}).", min, max);
        return Err(());
    }

    let sweep_angle = get_checked_value::<f64, _>(cmdline::SWEEP_ANGLE, &option_values, non_negative, "non-negative")?
        .map(|degrees| degrees.to_radians());

    let threshold = get_checked_value::<f64, _>(cmdline::THRESHOLD, &option_values, |v| v.is_finite(), "finite")?;

    let sigma_gradient = get_checked_value::<f64, _>(
        cmdline::SIGMA_GRADIENT, &option_values, |v| v > 0.0, "positive"
    )?;

    let num_circles = get_option_value::<usize>(cmdline::NUM_CIRCLES, &option_values)?;

    let disc_radius_ratio = get_checked_value::<f64, _>(
        cmdline::DISC_RADIUS_RATIO, &option_values, |v| v > 0.0, "positive"
    )?;

    let variance = get_checked_value(cmdline::VARIANCE, &option_values, non_negative, "non-negative")?;

    let log_level = get_option_value::<logging::Level>(cmdline::LOG_LEVEL, &option_values)?
        .unwrap_or(logging::Level::Info);

    Ok(Some(Configuration{
        input,
        output_accumulator,
        output_radius,
        filter_options: FilterOptions{
            sweep_angle,
            radius,
            min_radius,
            max_radius,
            threshold,
            sigma_gradient,
            num_circles,
            disc_radius_ratio,
            variance
        },
        log_level
    }))
}
