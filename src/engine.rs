// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The render entry point.
//!
//! A render call turns a request into a schedule, allocates a zeroed
//! buffer, cuts the buffer into strips of whole rows (one per piece of
//! a band), runs every strip's jobs, and finally copies the mirrored
//! rows.  Strips own disjoint slices of the buffer, so with more than
//! one thread they can be handed out to workers without any locking
//! beyond the queue they are pulled from.
//!
//! The strip layout depends only on the request and the renderer's
//! settings, never on the thread count, so the same request renders
//! the same bits on one thread or many.

use log::{debug, trace, warn};
use std::mem;
use std::sync::{Arc, Mutex};
use std::vec;

use crate::adaptive::{schedule_adaptive, AdaptiveConfig, Band, Method, RenderJob, Schedule};
use crate::canvas::Canvas;
use crate::error::RenderError;
use crate::kernel::{Exclusion, Kernel};
use crate::planes::ViewportGeometry;
use crate::request::{RenderRequest, Strategy};
use crate::subdivide::{render_direct, render_rect};

/// Bands taller than this are cut into several strips.
pub const DEFAULT_STRIP_ROWS: usize = 64;

/// A run of rows of the output and the jobs that fill it.
struct Strip<'a> {
    canvas: Canvas<'a>,
    jobs: Vec<RenderJob>,
}

type StripQueue<'a> = Arc<Mutex<vec::IntoIter<Strip<'a>>>>;

/// Renders requests.  Holds only settings, so one renderer can serve
/// any number of requests, from any number of threads.
#[derive(Copy, Clone, Debug)]
pub struct Renderer {
    config: AdaptiveConfig,
    threads: usize,
    strip_rows: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer {
            config: AdaptiveConfig::default(),
            threads: 1,
            strip_rows: DEFAULT_STRIP_ROWS,
        }
    }
}

impl Renderer {
    /// A single-threaded renderer with the default band cutoffs.
    pub fn new() -> Self {
        Renderer::default()
    }

    /// Renders on up to `threads` threads, the caller's included.
    pub fn with_threads(self, threads: usize) -> Self {
        Renderer {
            threads: threads.max(1),
            ..self
        }
    }

    /// Uses `config` for adaptive renders.
    pub fn with_config(self, config: AdaptiveConfig) -> Self {
        Renderer { config, ..self }
    }

    /// Cuts bands into strips of at most `rows` rows.
    pub fn with_strip_rows(self, rows: usize) -> Self {
        Renderer {
            strip_rows: rows.max(1),
            ..self
        }
    }

    /// The work a request turns into.
    pub fn schedule(&self, request: &RenderRequest) -> Schedule {
        let geometry = ViewportGeometry::of(request);
        match request.strategy() {
            Strategy::None => Schedule::uniform(&geometry, Method::Direct, Exclusion::NONE),
            Strategy::BulbExclusion => Schedule::uniform(&geometry, Method::Direct, Exclusion::BOTH),
            Strategy::Subdivision => Schedule::uniform(&geometry, Method::Subdivide, Exclusion::NONE),
            Strategy::Both => Schedule::uniform(&geometry, Method::Subdivide, Exclusion::BOTH),
            Strategy::Adaptive => schedule_adaptive(&geometry, &self.config),
        }
    }

    /// Renders `request` into a row-major buffer of
    /// `width * height` values in `[0, 1)`.
    pub fn render(&self, request: &RenderRequest) -> Result<Vec<f64>, RenderError> {
        let geometry = ViewportGeometry::of(request);
        let max_iterations = request.max_iterations();
        debug!(
            "Rendering Mandelbrot set at {} with {} pixels per unit: {}x{}, {} iterations, strategy {}",
            request.center(),
            request.pixels_per_unit(),
            request.width(),
            request.height(),
            max_iterations,
            request.strategy()
        );

        let schedule = self.schedule(request);
        debug!(
            "{} jobs in {} bands, mirrored rows {:?}",
            schedule.job_count(),
            schedule.bands.len(),
            schedule.mirror.as_ref().map(|m| m.rows.clone())
        );

        // Subdivision leaves skipped pixels alone, so this must be zeroed.
        let mut buffer = allocate(request.width(), request.height())?;
        {
            let strip_rows = self.strip_rows;
            let bands = schedule
                .bands
                .into_iter()
                .flat_map(|band| band.into_strips(strip_rows))
                .collect();
            let strips = carve(&mut buffer, geometry.width, bands);
            if self.threads > 1 && strips.len() > 1 {
                render_threaded(strips, &geometry, max_iterations, self.threads)?;
            } else {
                for mut strip in strips {
                    render_strip(&mut strip, &geometry, max_iterations);
                }
            }
        }

        if let Some(mirror) = schedule.mirror {
            mirror.apply(&mut buffer, geometry.width);
        }
        Ok(buffer)
    }
}

/// Renders `request` on the calling thread with the default settings.
pub fn render(request: &RenderRequest) -> Result<Vec<f64>, RenderError> {
    Renderer::default().render(request)
}

/// A zeroed buffer, or `TooLarge` if the allocator will not provide one.
fn allocate(width: usize, height: usize) -> Result<Vec<f64>, RenderError> {
    let too_large = || RenderError::TooLarge { width, height };
    let len = width.checked_mul(height).ok_or_else(too_large)?;
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).map_err(|_| too_large())?;
    buffer.resize(len, 0.0);
    Ok(buffer)
}

/// Cuts `buffer` into one canvas per band.  Bands must be sorted and
/// disjoint; rows between them are skipped.
fn carve<'a>(mut buffer: &'a mut [f64], width: usize, bands: Vec<Band>) -> Vec<Strip<'a>> {
    let mut strips = Vec::with_capacity(bands.len());
    let mut row = 0;
    for band in bands {
        let (_, rest) = mem::take(&mut buffer).split_at_mut((band.rows.start - row) * width);
        let (rows, rest) = rest.split_at_mut(band.rows.len() * width);
        buffer = rest;
        row = band.rows.end;
        strips.push(Strip {
            canvas: Canvas::new(rows, width, band.rows.start),
            jobs: band.jobs,
        });
    }
    strips
}

fn render_strip(strip: &mut Strip, geometry: &ViewportGeometry, max_iterations: u32) {
    trace!("strip {:?}: {} jobs", strip.canvas.rows(), strip.jobs.len());
    for job in &strip.jobs {
        let kernel = Kernel::new(max_iterations, job.exclusion);
        let sample = |x: usize, y: usize| kernel.iterate(geometry.re(x), geometry.im(y));
        match job.method {
            Method::Direct => render_direct(&mut strip.canvas, &job.bounds, &sample),
            Method::Subdivide => render_rect(&mut strip.canvas, &job.bounds, &sample),
        }
    }
}

/// Pulls strips off the queue until it is empty.
fn drain(queue: &StripQueue, geometry: &ViewportGeometry, max_iterations: u32) {
    loop {
        let strip = match queue.lock() {
            Ok(mut strips) => strips.next(),
            Err(poisoned) => poisoned.into_inner().next(),
        };
        match strip {
            Some(mut strip) => render_strip(&mut strip, geometry, max_iterations),
            None => break,
        }
    }
}

/// Spawns up to `threads - 1` workers and joins in on the queue from
/// the calling thread.  A worker that cannot be started just leaves
/// more strips for the others; the calling thread alone is enough to
/// finish the job.
fn render_threaded(
    strips: Vec<Strip>,
    geometry: &ViewportGeometry,
    max_iterations: u32,
    threads: usize,
) -> Result<(), RenderError> {
    let queue: StripQueue = Arc::new(Mutex::new(strips.into_iter()));
    crossbeam::scope(|spawner| {
        for worker in 1..threads {
            let queue = queue.clone();
            let spawned = spawner
                .builder()
                .name(format!("render-{}", worker))
                .spawn(move |_| drain(&queue, geometry, max_iterations));
            if let Err(e) = spawned {
                warn!("could not start render worker {}: {}", worker, e);
                break;
            }
        }
        drain(&queue, geometry, max_iterations);
    })
    .map_err(|_| RenderError::WorkerFailed)
}
