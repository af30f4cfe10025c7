// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::{App, Arg, ArgMatches};
use failure::{format_err, Error};
use log::{debug, info};
use std::str::FromStr;
use std::time::Instant;

use mandelbrot::{resample, Antialias, FilterKernel, Palette, RenderRequest, Renderer, Strategy};

const MAX_SIZE: usize = 10_000;
const MAX_ITERATIONS: u32 = 200_000;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn validate_size(s: &str) -> Result<(), String> {
    match parse_pair::<usize>(s, 'x') {
        Some((w, h)) if w >= 1 && h >= 1 && w <= MAX_SIZE && h <= MAX_SIZE => Ok(()),
        Some(_) => Err(format!("Image sides must be between 1 and {}", MAX_SIZE)),
        None => Err("Could not parse output image size".to_string()),
    }
}

fn validate_parse<T: FromStr>(s: &str, err: &str) -> Result<(), String> {
    T::from_str(s).map(|_| ()).map_err(|_| err.to_string())
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const CENTER: &str = "center";
const SCALE: &str = "scale";
const ITERATIONS: &str = "iterations";
const STRATEGY: &str = "strategy";
const ANTIALIAS: &str = "antialias";
const THREADS: &str = "threads";
const COLORS: &str = "colors";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("mandel")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Mandelbrot set renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file; the format follows the extension"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("512x512")
                .validator(|s| validate_size(&s))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(CENTER)
                .long(CENTER)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-0.75,0.0")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse center point"))
                .help("Center of the view on the complex plane, as RE,IM"),
        )
        .arg(
            Arg::with_name(SCALE)
                .long(SCALE)
                .short("p")
                .takes_value(true)
                .default_value("150")
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        std::f64::MAX,
                        "Could not parse pixels per unit",
                        "Pixels per unit must be positive",
                    )
                })
                .help("Zoom, in pixels per unit of the complex plane"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("300")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        MAX_ITERATIONS,
                        "Could not parse iteration count",
                        &format!("Iteration count must be between 1 and {}", MAX_ITERATIONS),
                    )
                })
                .help("Iteration cap per pixel"),
        )
        .arg(
            Arg::with_name(STRATEGY)
                .long(STRATEGY)
                .short("m")
                .takes_value(true)
                .default_value("adaptive")
                .validator(|s| validate_parse::<Strategy>(&s, "Unknown strategy"))
                .help("none, bulb, subdivision, both or adaptive"),
        )
        .arg(
            Arg::with_name(ANTIALIAS)
                .long(ANTIALIAS)
                .short("a")
                .takes_value(true)
                .default_value("none")
                .validator(|s| validate_parse::<Antialias>(&s, "Unknown antialiasing mode"))
                .help("none, gaussian3, mitchell3, gaussian5 or mitchell5"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("1")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to render with"),
        )
        .arg(
            Arg::with_name(COLORS)
                .long(COLORS)
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        2,
                        usize::max_value(),
                        "Could not parse palette size",
                        "The palette needs at least 2 colors",
                    )
                })
                .help("Palette size [default: 10 times the iteration cap]"),
        )
        .get_matches()
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, Error> {
    let raw = matches
        .value_of(name)
        .ok_or_else(|| format_err!("missing value for --{}", name))?;
    T::from_str(raw).map_err(|_| format_err!("could not parse --{} '{}'", name, raw))
}

fn run() -> Result<(), Error> {
    let matches = args();
    let output = value::<String>(&matches, OUTPUT)?;
    let (width, height) = parse_pair::<usize>(&value::<String>(&matches, SIZE)?, 'x')
        .ok_or_else(|| format_err!("could not parse image size"))?;
    let (re, im) = parse_pair::<f64>(&value::<String>(&matches, CENTER)?, ',')
        .ok_or_else(|| format_err!("could not parse center"))?;
    let scale = value::<f64>(&matches, SCALE)?;
    let iterations = value::<u32>(&matches, ITERATIONS)?;
    let strategy = value::<Strategy>(&matches, STRATEGY)?;
    let antialias = value::<Antialias>(&matches, ANTIALIAS)?;
    let threads = value::<usize>(&matches, THREADS)?;
    let colors = match matches.value_of(COLORS) {
        Some(_) => value::<usize>(&matches, COLORS)?,
        None => iterations as usize * 10,
    };

    let request = RenderRequest::new(width, height, re, im, scale, iterations, strategy)?;
    let factor = antialias.factor();
    let sampled = request.supersampled(factor)?;
    debug!("rendering {}x{} for {}x{} output", sampled.width(), sampled.height(), width, height);

    let start = Instant::now();
    let values = Renderer::new().with_threads(threads).render(&sampled)?;
    info!(
        "rendered {}x{} with strategy {} on {} threads in {:?}",
        sampled.width(),
        sampled.height(),
        strategy,
        threads,
        start.elapsed()
    );

    let palette = Palette::new(colors)?;
    let mut pixels = palette.colorize(&values);
    if let Some(filter) = antialias.filter() {
        let kernel = FilterKernel::new(factor, filter)?;
        pixels = resample(&pixels, sampled.width(), sampled.height(), factor, &kernel)?;
    }

    image::save_buffer(
        &output,
        &pixels,
        width as u32,
        height as u32,
        image::ColorType::RGB(8),
    )?;
    info!("wrote {}", output);
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
