//
// houghcircles - Circle detection using the gradient-directed Hough transform
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Entry point and main functions of the `houghcircles` executable.
//!

mod args;
mod hough;
mod image;
mod logging;

use image::Image;
use logging::Logger;

const VERSION_STRING: &'static str = include_str!(concat!(env!("OUT_DIR"), "/version"));

fn print_header() {
    println!(r#"
_________________

   {}
   Circle detection using the gradient-directed Hough transform

   Copyright © 2020 Filip Szczerek <ga.software@yahoo.com>

   This program is licensed under MIT license (see LICENSE.txt for details).

_________________
"#,
        VERSION_STRING
    );
}

fn save_output(image: Option<&Image>, file_name: &Option<String>, logger: &Logger) -> bool {
    match (image, file_name) {
        (Some(image), Some(file_name)) => {
            logger.info(&format!("saving: {}", file_name));
            match image.save(file_name) {
                Ok(()) => true,
                Err(err) => { eprintln!("Failed to save {}: {}.", file_name, err); false }
            }
        },
        _ => true
    }
}

fn detect_circles(config: &args::Configuration, logger: &Logger) -> bool {
    logger.info(&format!("loading: {}", config.input()));
    let image = match Image::load(config.input()) {
        Ok(image) => image,
        Err(err) => { eprintln!("Failed to load {}: {}.", config.input(), err); return false; }
    };
    logger.verbose(&format!("Loaded {:?}.", image));

    let mut filter = config.hough_filter();
    filter.execute(&image, logger);

    if logger.is_verbose() {
        logger.verbose(&format!("\n{}", filter));
    }

    match filter.circles(logger) {
        Ok(circles) => {
            logger.info(&format!("\nFound {} circle(s).\n\n id          x          y     radius", circles.len()));
            for circle in circles {
                let center = circle.center();
                logger.info(&format!(
                    "{:3}   {:8.2}   {:8.2}   {:8.3}", circle.id(), center.x, center.y, circle.radius()
                ));
                if logger.is_verbose() {
                    let center = circle.physical_center(image.geometry());
                    let bbox = circle.bounding_box();
                    logger.verbose(&format!(
                        "      physical center: ({:.3}, {:.3}), bounding box: ({:.1}, {:.1}) - ({:.1}, {:.1})",
                        center.x, center.y, bbox.min.x, bbox.min.y, bbox.max.x, bbox.max.y
                    ));
                }
            }
            logger.info("");
        },
        Err(err) => { eprintln!("{}", err); return false; }
    }

    let saved_accumulator = save_output(filter.accumulator(), config.output_accumulator(), logger);
    let saved_radius = save_output(filter.radius_image(), config.output_radius(), logger);

    saved_accumulator && saved_radius
}

fn run_program() -> bool {
    print_header();
    println!();

    let config = match args::parse_command_line(std::env::args()) {
        Ok(config) => match config {
            None => return true, // help was requested
            Some(config) => config
        },
        Err(_) => { println!("\nUse --{} for more information.\n", args::cmdline::HELP); return false; }
    };

    let logger = Logger::new(config.log_level());

    let tstart = std::time::Instant::now();

    let result = detect_circles(&config, &logger);

    let elapsed = tstart.elapsed();
    let mins = elapsed.as_secs() / 60;
    let secs = elapsed.as_secs() % 60;
    let frac_secs = elapsed.as_secs_f32() - (mins * 60) as f32 - secs as f32;
    logger.info(&format!("Completed in {} min {:02}.{:0.0} s.", mins, secs, frac_secs * 10.0));

    result
}

fn main() {
    std::process::exit(if run_program() { 0 } else { 1 });
}
