// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A mutable window onto a run of whole rows of the output buffer.
//!
//! Row runs are contiguous in a row-major buffer, so the buffer can be
//! cut into disjoint canvases with `split_at_mut` and each one handed
//! to a different thread.  Renderers address pixels by their image
//! coordinates; the canvas takes care of the offset.

use std::ops::Range;

/// Rows `first_row .. first_row + data.len() / width` of an image.
#[derive(Debug)]
pub struct Canvas<'a> {
    data: &'a mut [f64],
    width: usize,
    first_row: usize,
}

impl<'a> Canvas<'a> {
    /// Wraps `data`, which must hold a whole number of rows of `width`
    /// pixels, the first of which is image row `first_row`.
    pub fn new(data: &'a mut [f64], width: usize, first_row: usize) -> Self {
        debug_assert!(width > 0 && data.len() % width == 0);
        Canvas {
            data,
            width,
            first_row,
        }
    }

    /// A canvas over an entire image.
    pub fn whole(data: &'a mut [f64], width: usize) -> Self {
        Canvas::new(data, width, 0)
    }

    /// Image width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The image rows this canvas can write.
    pub fn rows(&self) -> Range<usize> {
        self.first_row..self.first_row + self.data.len() / self.width
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width);
        (y - self.first_row) * self.width + x
    }

    /// Stores the value of pixel `(x, y)`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        let offset = self.offset(x, y);
        self.data[offset] = value;
    }

    /// The value of pixel `(x, y)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[self.offset(x, y)]
    }
}
