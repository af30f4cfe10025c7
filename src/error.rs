// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Everything that can go wrong while building a request, rendering
//! it, or post-processing the result.  All of these are detected
//! before any real work starts; the renderer itself is a pure
//! computation and has nothing to retry.

use failure::Fail;

/// The single error type of the crate.
#[derive(Debug, Fail, PartialEq)]
pub enum RenderError {
    /// The image must be at least one pixel in each direction.
    #[fail(display = "image dimensions must be positive, got {}x{}", width, height)]
    InvalidDimensions {
        /// Requested width in pixels.
        width: usize,
        /// Requested height in pixels.
        height: usize,
    },

    /// Pixels per unit is the zoom factor; it must be a positive,
    /// finite number.
    #[fail(display = "pixels per unit must be positive and finite, got {}", _0)]
    InvalidScale(f64),

    /// The center of the view must be a finite complex number.
    #[fail(display = "center {}{:+}i is not a finite point", re, im)]
    InvalidCenter {
        /// Real part of the center.
        re: f64,
        /// Imaginary part of the center.
        im: f64,
    },

    /// An iteration cap of zero would render nothing but black.
    #[fail(display = "the iteration cap must be at least 1")]
    InvalidIterations,

    /// The buffer for an image this size cannot be addressed or allocated.
    #[fail(display = "an image of {}x{} pixels is too large to render", width, height)]
    TooLarge {
        /// Requested width in pixels.
        width: usize,
        /// Requested height in pixels.
        height: usize,
    },

    /// A resampling factor must be at least 1.
    #[fail(display = "the resampling factor must be at least 1")]
    InvalidFactor,

    /// The source image does not split evenly into blocks.
    #[fail(display = "source size {} is not a multiple of the resampling factor {}", size, factor)]
    IndivisibleSize {
        /// The offending source dimension.
        size: usize,
        /// The resampling factor.
        factor: usize,
    },

    /// The convolution kernel does not match the block size.
    #[fail(display = "a {0}x{0} kernel cannot resample by a factor of {1}", _0, _1)]
    KernelMismatch(usize, usize),

    /// A raw pixel buffer has the wrong number of bytes for its shape.
    #[fail(display = "expected a buffer of {} bytes, got {}", expected, actual)]
    BufferMismatch {
        /// Bytes implied by the dimensions.
        expected: usize,
        /// Bytes actually supplied.
        actual: usize,
    },

    /// A filter parameter is out of range.
    #[fail(display = "invalid filter: {}", _0)]
    InvalidFilter(String),

    /// A palette needs room for black plus at least one colour.
    #[fail(display = "a palette needs at least 2 colors, got {}", _0)]
    InvalidPalette(usize),

    /// No rendering strategy goes by that name.
    #[fail(display = "unknown rendering strategy '{}'", _0)]
    UnknownStrategy(String),

    /// No antialiasing preset goes by that name.
    #[fail(display = "unknown antialiasing mode '{}'", _0)]
    UnknownAntialias(String),

    /// A worker thread died before finishing its strips.
    #[fail(display = "a render worker failed")]
    WorkerFailed,
}
