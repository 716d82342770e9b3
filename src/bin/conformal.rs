extern crate clap;
extern crate conformal;
extern crate env_logger;
#[macro_use]
extern crate failure;
extern crate image;
#[macro_use]
extern crate log;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use conformal::presets::{self, PRESETS};
use conformal::{generate_test_pattern, render, Function, PixelImage, RenderConfig};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba, RgbaImage};
use std::path::Path;
use std::str::FromStr;

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

fn validate_range<T: FromStr + Ord>(
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
    match parse_pair::<u16>(s, 'x') {
        Some((w, h)) if w > 0 && h > 0 => Ok(()),
        Some(_) => Err("Canvas size must be at least 1x1".to_string()),
        None => Err("Could not parse canvas size".to_string()),
    }
}

fn validate_scale(s: &str) -> Result<(), String> {
    match f64::from_str(s) {
        Ok(f) if f.is_finite() && f > 0.0 => Ok(()),
        Ok(_) => Err("Scale must be greater than zero".to_string()),
        Err(_) => Err("Could not parse scale".to_string()),
    }
}

const OUTPUT: &str = "output";
const INPUT: &str = "input";
const ORIGINAL: &str = "original";
const FUNCTION: &str = "function";
const PRESET: &str = "preset";
const LIST_PRESETS: &str = "list-presets";
const SCALE: &str = "scale";
const SIZE: &str = "size";
const THREADS: &str = "threads";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();
    let preset_names: Vec<&str> = PRESETS.iter().map(|&(name, _)| name).collect();

    App::new("conformal")
        .version("0.1.0")
        .about("Renders an image as seen through a complex function w = f(z)")
        .arg(
            Arg::with_name(OUTPUT)
                .required_unless(LIST_PRESETS)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file; the format follows the extension"),
        )
        .arg(
            Arg::with_name(FUNCTION)
                .required(false)
                .long(FUNCTION)
                .short("f")
                .takes_value(true)
                .help("The function w = f(z), e.g. \"1/z\", \"z^2\", \"exp(z)\" [default: 1/z]"),
        )
        .arg(
            Arg::with_name(PRESET)
                .required(false)
                .long(PRESET)
                .short("p")
                .takes_value(true)
                .possible_values(&preset_names)
                .conflicts_with(FUNCTION)
                .help("Use a named function instead of --function"),
        )
        .arg(
            Arg::with_name(LIST_PRESETS)
                .long(LIST_PRESETS)
                .help("List the named functions and exit"),
        )
        .arg(
            Arg::with_name(SCALE)
                .required(false)
                .long(SCALE)
                .short("s")
                .takes_value(true)
                .default_value("1.0")
                .validator(|s| validate_scale(&s))
                .help("Plane units per 80 pixels"),
        )
        .arg(
            Arg::with_name(INPUT)
                .required(false)
                .long(INPUT)
                .short("i")
                .takes_value(true)
                .help("Source image; the test pattern is used if absent"),
        )
        .arg(
            Arg::with_name(ORIGINAL)
                .required(false)
                .long(ORIGINAL)
                .takes_value(true)
                .help("Also write the source canvas to this file"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .takes_value(true)
                .default_value("400x400")
                .validator(|s| validate_size(&s))
                .help("Size of the working canvas"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to render with [default: one per CPU]"),
        )
        .get_matches()
}

/// Decodes an image, scales it to fit the canvas without distortion,
/// and centres it on a transparent background.
fn load_image(path: &Path, width: u32, height: u32) -> Result<PixelImage, failure::Error> {
    let img = image::open(path)?.to_rgba();
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        bail!("{} is an empty image", path.display());
    }
    let factor = f64::min(
        f64::from(width) / f64::from(w),
        f64::from(height) / f64::from(h),
    );
    let sw = ((f64::from(w) * factor).round() as u32).max(1).min(width);
    let sh = ((f64::from(h) * factor).round() as u32).max(1).min(height);
    let scaled = imageops::resize(&img, sw, sh, FilterType::Triangle);
    let mut canvas: RgbaImage = ImageBuffer::new(width, height);
    imageops::overlay(&mut canvas, &scaled, (width - sw) / 2, (height - sh) / 2);
    debug!(
        "loaded {} ({}x{}) onto a {}x{} canvas",
        path.display(),
        w,
        h,
        width,
        height
    );
    Ok(PixelImage::from_raw(width, height, canvas.into_raw())?)
}

fn write_image(outfile: &str, picture: PixelImage) -> Result<(), failure::Error> {
    let (width, height) = (picture.width(), picture.height());
    let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_raw(width, height, picture.into_raw())
            .ok_or_else(|| format_err!("pixel buffer does not match {}x{}", width, height))?;
    buffer.save(outfile)?;
    info!("wrote {}", outfile);
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<(), failure::Error> {
    if matches.is_present(LIST_PRESETS) {
        for &(name, f) in PRESETS {
            println!("{:12} w = {}", name, f);
        }
        return Ok(());
    }

    let source = match matches.value_of(PRESET) {
        Some(name) => presets::lookup(name)
            .ok_or_else(|| format_err!("unknown preset {}", name))?,
        None => matches.value_of(FUNCTION).unwrap_or("1/z"),
    };
    let function = Function::new(source)?;

    let (width, height): (u16, u16) = parse_pair(matches.value_of(SIZE).unwrap_or("400x400"), 'x')
        .ok_or_else(|| format_err!("Could not parse canvas size"))?;
    let (width, height) = (u32::from(width), u32::from(height));
    let scale = f64::from_str(matches.value_of(SCALE).unwrap_or("1.0"))?;
    let threads = match matches.value_of(THREADS) {
        Some(t) => usize::from_str(t)?,
        None => num_cpus::get(),
    };
    let config = RenderConfig::new(scale)?.with_threads(threads)?;

    let original = match matches.value_of(INPUT) {
        Some(path) => load_image(Path::new(path), width, height)?,
        None => generate_test_pattern(width, height),
    };
    if let Some(path) = matches.value_of(ORIGINAL) {
        write_image(path, original.clone())?;
    }

    info!(
        "rendering w = {} at scale {} on {} thread(s)",
        function.source(),
        config.scale(),
        config.threads()
    );
    let transformed = render(&original, function.ast(), &config);
    let output = matches
        .value_of(OUTPUT)
        .ok_or_else(|| format_err!("no output file given"))?;
    write_image(output, transformed)
}

fn main() {
    env_logger::init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
