// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the ViewportGeometry struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0 in
//! the upper left, and a window onto the complex plane given by its
//! center and a zoom factor in pixels per unit.
//!
//! The imaginary axis points up and the row index points down, so row
//! `y` lies at `max_im - y * inc`.  Every coordinate is computed from
//! the pixel index directly, never by accumulating increments, so the
//! same pixel always maps to the same bits no matter which part of the
//! renderer asks.

use num::Complex;
use std::ops::Range;

use crate::request::RenderRequest;

/// Describes the x, y of a pixel on the integral plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// A rectangle of pixels: the upper left corner and its extent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileBounds {
    /// Leftmost column.
    pub x: usize,
    /// Topmost row.
    pub y: usize,
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl TileBounds {
    /// A rectangle from its corner and extent.
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        TileBounds {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle from column and row ranges.
    pub fn from_ranges(columns: Range<usize>, rows: Range<usize>) -> Self {
        TileBounds {
            x: columns.start,
            y: rows.start,
            width: columns.end.saturating_sub(columns.start),
            height: rows.end.saturating_sub(rows.start),
        }
    }

    /// Contains no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The columns covered.
    pub fn columns(&self) -> Range<usize> {
        self.x..self.x + self.width
    }

    /// The rows covered.
    pub fn rows(&self) -> Range<usize> {
        self.y..self.y + self.height
    }

    /// The part of this rectangle that falls within `rows`.
    pub fn clip_rows(&self, rows: &Range<usize>) -> TileBounds {
        let start = self.y.max(rows.start);
        let end = (self.y + self.height).min(rows.end).max(start);
        TileBounds {
            y: start,
            height: end - start,
            ..*self
        }
    }
}

/// The plane coordinates of a rectangle's outer pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Corners {
    /// Real part of the leftmost column.
    pub left: f64,
    /// Real part of the rightmost column.
    pub right: f64,
    /// Imaginary part of the top row.
    pub top: f64,
    /// Imaginary part of the bottom row.
    pub bottom: f64,
}

/// Rows closer than this fraction of a pixel to their mirror image are
/// treated as exact reflections.  It only absorbs the rounding error of
/// `2 * max_im / inc`; a view that is off the axis by any real amount
/// is not mirrored.
pub const MIRROR_TOLERANCE: f64 = 1e-9;

/// Maps pixels of a `width` by `height` image onto the complex plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewportGeometry {
    /// Real part of column 0.
    pub min_re: f64,
    /// Imaginary part of row 0.
    pub max_im: f64,
    /// Distance between neighbouring pixels on the complex plane.
    pub inc: f64,
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
}

impl ViewportGeometry {
    /// Constructor.  Centers a `width` by `height` pixel window on
    /// `center`, with `pixels_per_unit` pixels for every unit of
    /// distance on the complex plane.
    pub fn new(center: Complex<f64>, pixels_per_unit: f64, width: usize, height: usize) -> Self {
        ViewportGeometry {
            min_re: center.re - (width as f64) / pixels_per_unit / 2.0,
            max_im: center.im + (height as f64) / pixels_per_unit / 2.0,
            inc: 1.0 / pixels_per_unit,
            width,
            height,
        }
    }

    /// The geometry of an already validated request.
    pub fn of(request: &RenderRequest) -> Self {
        ViewportGeometry::new(
            request.center(),
            request.pixels_per_unit(),
            request.width(),
            request.height(),
        )
    }

    /// The total number of pixels.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// True if the integral plane has no area.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The whole image as one rectangle.
    pub fn bounds(&self) -> TileBounds {
        TileBounds::new(0, 0, self.width, self.height)
    }

    /// Real part of column `x`.
    #[inline]
    pub fn re(&self, x: usize) -> f64 {
        self.min_re + (x as f64) * self.inc
    }

    /// Imaginary part of row `y`.
    #[inline]
    pub fn im(&self, y: usize) -> f64 {
        self.max_im - (y as f64) * self.inc
    }

    /// Given a pixel on the integral cartesian plane, return the point
    /// it samples on the complex plane.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(self.re(pixel.0), self.im(pixel.1))
    }

    /// The plane coordinates of the outermost pixels of `bounds`.
    pub fn corners(&self, bounds: &TileBounds) -> Corners {
        Corners {
            left: self.re(bounds.x),
            right: self.re(bounds.x + bounds.width.saturating_sub(1)),
            top: self.im(bounds.y),
            bottom: self.im(bounds.y + bounds.height.saturating_sub(1)),
        }
    }

    /// The column boundary nearest to `re`, clamped to `0..=width`.
    /// Columns left of the result sample values below `re` (give or
    /// take half a pixel).
    pub fn column_of(&self, re: f64) -> usize {
        clamp_index((re - self.min_re) / self.inc, self.width)
    }

    /// The row boundary nearest to `im`, clamped to `0..=height`.
    /// Rows above the result sample values above `im`.
    pub fn row_of(&self, im: f64) -> usize {
        clamp_index((self.max_im - im) / self.inc, self.height)
    }

    /// If row `y` samples the conjugate of row `axis - y` (to within
    /// `MIRROR_TOLERANCE` of a pixel), return `axis`.  Only axes that
    /// pair up rows of this image are reported, so the result always
    /// lies in `0..=2 * height`.
    pub fn mirror_axis(&self) -> Option<i64> {
        let rows = 2.0 * self.max_im / self.inc;
        if !(rows.is_finite() && rows >= 0.0 && rows <= 2.0 * self.height as f64) {
            return None;
        }
        let axis = rows.round();
        if (rows - axis).abs() <= MIRROR_TOLERANCE {
            Some(axis as i64)
        } else {
            None
        }
    }
}

fn clamp_index(position: f64, limit: usize) -> usize {
    let position = position.round();
    if position.is_nan() || position <= 0.0 {
        0
    } else if position >= limit as f64 {
        limit
    } else {
        position as usize
    }
}
