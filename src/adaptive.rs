// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The adaptive scheduler.
//!
//! Different parts of the plane reward different strategies.  Far
//! above the real axis there is nothing but escaping points, and the
//! cheapest thing to do is iterate every pixel.  Close to the axis the
//! set is dense and subdivision pays off, and over the cardioid or the
//! period-2 bulb the matching closed-form test is worth running first.
//! The scheduler cuts the image into horizontal bands by distance from
//! the real axis, cuts the densest band into columns by known features
//! of the set, and emits one job per piece.
//!
//! The set is symmetric about the real axis, so when the view straddles
//! the axis the rows below it are copied from their mirror images
//! above instead of being rendered at all.
//!
//! The cutoffs are tuning knobs, not invariants; they live in
//! `AdaptiveConfig`.

use std::ops::Range;

use crate::kernel::Exclusion;
use crate::planes::{TileBounds, ViewportGeometry};

/// How a job fills its rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Method {
    /// Iterate every pixel.
    Direct,
    /// Boundary-tracing subdivision.
    Subdivide,
}

/// One unit of scheduled work.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RenderJob {
    /// The pixels to fill.
    pub bounds: TileBounds,
    /// How to fill them.
    pub method: Method,
    /// Which closed-form tests the kernel runs.
    pub exclusion: Exclusion,
}

/// A run of whole rows and the jobs that fill it.  The jobs of a band
/// never reach outside its rows.
#[derive(Clone, Debug, PartialEq)]
pub struct Band {
    /// The rows covered.
    pub rows: Range<usize>,
    /// The work that fills them.
    pub jobs: Vec<RenderJob>,
}

impl Band {
    /// Cuts the band into bands of at most `max_rows` rows, clipping
    /// each job to the rows of its piece.
    pub fn into_strips(self, max_rows: usize) -> Vec<Band> {
        let max_rows = max_rows.max(1);
        if self.rows.len() <= max_rows {
            return vec![self];
        }
        let mut strips = Vec::new();
        let mut start = self.rows.start;
        while start < self.rows.end {
            let rows = start..(start + max_rows).min(self.rows.end);
            let jobs = self
                .jobs
                .iter()
                .map(|job| RenderJob {
                    bounds: job.bounds.clip_rows(&rows),
                    ..*job
                })
                .filter(|job| !job.bounds.is_empty())
                .collect();
            start = rows.end;
            strips.push(Band { rows, jobs });
        }
        strips
    }
}

/// Rows that are copied from their reflection about the real axis
/// instead of being rendered.
#[derive(Clone, Debug, PartialEq)]
pub struct Mirror {
    /// Row `y` is a copy of row `axis - y`.
    pub axis: usize,
    /// The destination rows.
    pub rows: Range<usize>,
}

impl Mirror {
    /// Copies every source row onto its destination.  The sources all
    /// lie above the destinations and must already be rendered.
    pub fn apply(&self, buffer: &mut [f64], width: usize) {
        for y in self.rows.clone() {
            let source = (self.axis - y) * width;
            buffer.copy_within(source..source + width, y * width);
        }
    }
}

/// Everything a render call has to do: the bands to render, in row
/// order, and the rows to mirror afterwards.  Together they cover the
/// image exactly once.
#[derive(Clone, Debug, PartialEq)]
pub struct Schedule {
    /// Disjoint, sorted row ranges with their jobs.
    pub bands: Vec<Band>,
    /// Rows filled by reflection.
    pub mirror: Option<Mirror>,
}

impl Schedule {
    /// A single band over the whole image, filled one way.
    pub fn uniform(geometry: &ViewportGeometry, method: Method, exclusion: Exclusion) -> Self {
        Schedule {
            bands: vec![Band {
                rows: 0..geometry.height,
                jobs: vec![RenderJob {
                    bounds: geometry.bounds(),
                    method,
                    exclusion,
                }],
            }],
            mirror: None,
        }
    }

    /// The number of jobs across all bands.
    pub fn job_count(&self) -> usize {
        self.bands.iter().map(|band| band.jobs.len()).sum()
    }
}

/// Band and column cutoffs for the adaptive scheduler, in plane
/// coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AdaptiveConfig {
    /// Above this `|im|` every pixel is iterated directly.
    pub outer_im: f64,
    /// Between this `|im|` and `outer_im` lies the sparse middle band.
    pub inner_im: f64,
    /// In the middle band, columns left of this are iterated directly
    /// and the rest subdivided.
    pub middle_split_re: f64,
    /// The core band's column cutoffs: far left, left of the period-2
    /// bulb, the bulb, the cardioid, right of the cardioid.
    pub core_splits: [f64; 4],
    /// Copy rows from their reflection about the real axis.  A row is
    /// only copied when its reflection lands on another row to within
    /// `MIRROR_TOLERANCE` of a pixel, so the copy can differ from a
    /// rendered row by rounding error in the last bits of the sampled
    /// point.  Views whose center is a dyadic fraction of a pixel off
    /// the axis reflect exactly.
    pub mirror: bool,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        AdaptiveConfig {
            outer_im: 1.2,
            inner_im: 1.0,
            middle_split_re: -0.5,
            core_splits: [-2.0, -1.25, -0.75, 0.375],
            mirror: true,
        }
    }
}

/// Exclusions for the five core columns, left to right.
const CORE_EXCLUSIONS: [Exclusion; 5] = [
    Exclusion::NONE,
    Exclusion::NONE,
    Exclusion::PERIOD2,
    Exclusion::CARDIOID,
    Exclusion::NONE,
];

/// The rows `lo..=hi` that can be copied from rows reflected about
/// `axis`, as long as the reflections land inside the image above them.
fn mirror_rows(geometry: &ViewportGeometry) -> Option<Mirror> {
    let axis = geometry.mirror_axis()?;
    let height = geometry.height as i64;
    let lo = (axis / 2 + 1).max(axis - height + 1).max(0);
    let hi = axis.min(height - 1);
    if lo > hi {
        return None;
    }
    Some(Mirror {
        axis: axis as usize,
        rows: lo as usize..hi as usize + 1,
    })
}

/// Cuts the image width at the given plane cutoffs.  Pieces may be
/// empty when a cutoff falls outside the view.
fn column_pieces(geometry: &ViewportGeometry, cutoffs: &[f64]) -> Vec<Range<usize>> {
    let mut edges = vec![0];
    edges.extend(cutoffs.iter().map(|&re| geometry.column_of(re)));
    edges.push(geometry.width);
    edges.windows(2).map(|pair| pair[0]..pair[1]).collect()
}

fn jobs_for(rows: &Range<usize>, pieces: &[(Range<usize>, Method, Exclusion)]) -> Vec<RenderJob> {
    pieces
        .iter()
        .map(|(columns, method, exclusion)| RenderJob {
            bounds: TileBounds::from_ranges(columns.clone(), rows.clone()),
            method: *method,
            exclusion: *exclusion,
        })
        .filter(|job| !job.bounds.is_empty())
        .collect()
}

/// Splits `rows` into the outer, middle and core bands by `|im|`.
fn bands_for(geometry: &ViewportGeometry, config: &AdaptiveConfig, rows: Range<usize>) -> Vec<Band> {
    if rows.start >= rows.end {
        return vec![];
    }
    let row = |im: f64| geometry.row_of(im).max(rows.start).min(rows.end);
    let edges = [
        rows.start,
        row(config.outer_im),
        row(config.inner_im),
        row(-config.inner_im),
        row(-config.outer_im),
        rows.end,
    ];

    let width = geometry.width;
    let middle = column_pieces(geometry, &[config.middle_split_re]);
    let core = column_pieces(geometry, &config.core_splits);

    let outer_pieces = vec![(0..width, Method::Direct, Exclusion::NONE)];
    let middle_pieces = vec![
        (middle[0].clone(), Method::Direct, Exclusion::NONE),
        (middle[1].clone(), Method::Subdivide, Exclusion::NONE),
    ];
    let core_pieces: Vec<_> = core
        .into_iter()
        .zip(CORE_EXCLUSIONS.iter())
        .map(|(columns, &exclusion)| (columns, Method::Subdivide, exclusion))
        .collect();
    let kinds = [
        &outer_pieces,
        &middle_pieces,
        &core_pieces,
        &middle_pieces,
        &outer_pieces,
    ];

    edges
        .windows(2)
        .zip(kinds.iter())
        .filter(|(pair, _)| pair[0] < pair[1])
        .map(|(pair, pieces)| {
            let rows = pair[0]..pair[1];
            Band {
                jobs: jobs_for(&rows, pieces),
                rows,
            }
        })
        .collect()
}

/// Plans an adaptive render of the whole image.
pub fn schedule_adaptive(geometry: &ViewportGeometry, config: &AdaptiveConfig) -> Schedule {
    let mirror = if config.mirror {
        mirror_rows(geometry)
    } else {
        None
    };

    let mut bands = Vec::new();
    match mirror {
        Some(ref m) => {
            bands.extend(bands_for(geometry, config, 0..m.rows.start));
            bands.extend(bands_for(geometry, config, m.rows.end..geometry.height));
        }
        None => bands.extend(bands_for(geometry, config, 0..geometry.height)),
    }

    Schedule { bands, mirror }
}
