// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The renderer.
//!
//! Rendering works backward.  For every pixel of the output we ask
//! where it came from: map the pixel onto the complex plane to get z,
//! evaluate w = f(z), map w back onto the pixel plane, and copy
//! whatever the source image has there.  If f can't be evaluated at z,
//! or w lands off the edge of the source, the pixel is painted opaque
//! black.
//!
//! Because every output pixel is computed independently of every other
//! one, the output buffer is cut into bands of whole rows and each band
//! is handed to its own thread.  The threads share the source image and
//! the expression tree, both read-only, and never write outside their
//! own band.

use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

use ast::Ast;
use crossbeam::thread::ScopedJoinHandle;
use errors::Error;
use eval::evaluate;
use pixels::{PixelImage, BLACK, CHANNELS};
use planes::{Pixel, PlaneMapper};

/// The knobs of a render.  The scale is the number of complex-plane
/// units that 80 pixels represent; the thread count is how many bands
/// the output is cut into.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderConfig {
    scale: f64,
    threads: usize,
}

impl RenderConfig {
    /// A configuration at the given scale, using every CPU.
    pub fn new(scale: f64) -> Result<RenderConfig, Error> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(Error::InvalidScale(scale));
        }
        Ok(RenderConfig {
            scale,
            threads: num_cpus::get(),
        })
    }

    /// Replaces the thread count.
    pub fn with_threads(self, threads: usize) -> Result<RenderConfig, Error> {
        if threads == 0 {
            return Err(Error::NoThreads);
        }
        Ok(RenderConfig { threads, ..self })
    }

    /// The scale.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// The thread count.
    pub fn threads(&self) -> usize {
        self.threads
    }
}

impl Default for RenderConfig {
    fn default() -> RenderConfig {
        RenderConfig {
            scale: 1.0,
            threads: num_cpus::get(),
        }
    }
}

/// How a render went: how many pixels were copied from the source and
/// how many were painted black.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Pixels copied from the source.
    pub sampled: usize,
    /// Pixels painted black.
    pub filled: usize,
}

impl RenderStats {
    fn merge(self, other: RenderStats) -> RenderStats {
        RenderStats {
            sampled: self.sampled + other.sampled,
            filled: self.filled + other.filled,
        }
    }
}

/// Where the output pixel at `pixel` comes from, if anywhere.
fn source_colour(
    planes: &PlaneMapper,
    source: &PixelImage,
    f: &Ast,
    pixel: Pixel,
) -> Option<[u8; 4]> {
    let z = planes.pixel_to_plane(&pixel);
    let w = evaluate(f, z).ok()?;
    let Pixel(sx, sy) = planes.sample_pixel(&w)?;
    source.get(sx, sy)
}

/// Renders one band of whole rows, the first of which is `top`.
/// Checks for cancellation before each row and gives up with None if
/// asked to.
fn render_band(
    planes: &PlaneMapper,
    source: &PixelImage,
    f: &Ast,
    top: u32,
    band: &mut [u8],
    cancel: &AtomicBool,
) -> Option<RenderStats> {
    let mut stats = RenderStats::default();
    for (row, line) in band.chunks_mut(source.row_len()).enumerate() {
        if cancel.load(Ordering::Relaxed) {
            return None;
        }
        let y = top + row as u32;
        for (x, out) in line.chunks_mut(CHANNELS).enumerate() {
            match source_colour(planes, source, f, Pixel(x as u32, y)) {
                Some(colour) => {
                    out.copy_from_slice(&colour);
                    stats.sampled += 1;
                }
                None => {
                    out.copy_from_slice(&BLACK);
                    stats.filled += 1;
                }
            }
        }
    }
    Some(stats)
}

/// Fills `buffer`, which must be the size of `source`, with the
/// rendered image.  Returns None if cancelled part way through.
fn render_into(
    source: &PixelImage,
    f: &Ast,
    config: &RenderConfig,
    cancel: &AtomicBool,
    buffer: &mut [u8],
) -> Option<RenderStats> {
    let (width, height) = (source.width(), source.height());
    if buffer.is_empty() {
        return Some(RenderStats::default());
    }
    let planes = PlaneMapper::scaled(width, height, config.scale);

    let threads = config.threads.max(1).min(height as usize);
    let rows_per_band = (height as usize + threads - 1) / threads;
    let band_len = rows_per_band * source.row_len();

    let stats = if threads == 1 {
        render_band(&planes, source, f, 0, buffer, cancel)
    } else {
        let planes = &planes;
        crossbeam::scope(|spawner| {
            let handles: Vec<ScopedJoinHandle<Option<RenderStats>>> = buffer
                .chunks_mut(band_len)
                .enumerate()
                .map(|(i, band)| {
                    let top = (i * rows_per_band) as u32;
                    spawner.spawn(move |_| render_band(planes, source, f, top, band, cancel))
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|e| panic::resume_unwind(e)))
                .fold(Some(RenderStats::default()), |acc, band| match (acc, band) {
                    (Some(a), Some(b)) => Some(a.merge(b)),
                    _ => None,
                })
        })
        .unwrap_or_else(|e| panic::resume_unwind(e))
    };

    match stats {
        Some(stats) => debug!(
            "rendered {}x{} at scale {} on {} thread(s): {} sampled, {} filled",
            width, height, config.scale, threads, stats.sampled, stats.filled
        ),
        None => debug!("render of {}x{} cancelled", width, height),
    }
    stats
}

/// Renders `source` through the function `f`.  The result is the same
/// size as the source.  Points where `f` fails are painted black; the
/// render as a whole never fails.
pub fn render(source: &PixelImage, f: &Ast, config: &RenderConfig) -> PixelImage {
    let never = AtomicBool::new(false);
    let mut out = PixelImage::filled(source.width(), source.height(), BLACK);
    render_into(source, f, config, &never, out.as_raw_mut());
    out
}

/// As `render`, but gives up and returns None once `cancel` is set.
/// The flag is checked before each row.
pub fn render_cancellable(
    source: &PixelImage,
    f: &Ast,
    config: &RenderConfig,
    cancel: &AtomicBool,
) -> Option<PixelImage> {
    let mut out = PixelImage::filled(source.width(), source.height(), BLACK);
    render_into(source, f, config, cancel, out.as_raw_mut())?;
    Some(out)
}

/// As `render`, for callers who may not have a source image yet.  With
/// nothing to sample, nothing is rendered.
pub fn render_optional(
    source: Option<&PixelImage>,
    f: &Ast,
    config: &RenderConfig,
) -> Option<PixelImage> {
    source.map(|source| render(source, f, config))
}
