#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot renderer
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which repeatedly squaring and adding, `z -> z² + c` starting
//! from `z = c`, never runs off to infinity.  Points outside the set
//! are coloured by how quickly they escape; points inside are black.
//!
//! Most of the cost of a naive render is spent inside the set, where
//! every pixel runs to the iteration cap.  This crate offers several
//! ways of avoiding that work:
//!
//! * a closed-form test for the two largest components of the set,
//!   the main cardioid and the period-2 bulb;
//! * boundary-tracing subdivision, which skips any square tile whose
//!   edge lies entirely inside the set;
//! * an adaptive schedule that splits the view into bands and columns,
//!   picks the cheapest method and shortcut for each, and copies the
//!   half of the image that mirrors the other across the real axis.
//!
//! All of them produce the same values as a plain render wherever they
//! compute a pixel at all; skipped pixels are left at zero, which is
//! exactly what the plain render finds there.
//!
//! ```
//! use mandelbrot::{render, RenderRequest, Strategy};
//!
//! let request = RenderRequest::new(64, 48, -0.75, 0.0, 24.0, 100, Strategy::Adaptive).unwrap();
//! let values = render(&request).unwrap();
//! assert_eq!(values.len(), 64 * 48);
//! assert!(values.iter().all(|&v| v >= 0.0 && v < 1.0));
//! ```

pub mod adaptive;
pub mod canvas;
pub mod engine;
pub mod error;
pub mod kernel;
pub mod palette;
pub mod planes;
pub mod request;
pub mod resample;
pub mod subdivide;

pub use adaptive::{schedule_adaptive, AdaptiveConfig, Schedule};
pub use engine::{render, Renderer};
pub use error::RenderError;
pub use kernel::{iterate, Exclusion, Kernel};
pub use palette::Palette;
pub use planes::ViewportGeometry;
pub use request::{RenderRequest, Strategy};
pub use resample::{resample, resample_square, Antialias, Filter, FilterKernel, KernelCache};
