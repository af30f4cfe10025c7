// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! What to render: a window onto the complex plane, an image size, an
//! iteration cap and a strategy.  Requests are validated once, when
//! they are built, so a renderer never has to back out of a half
//! finished image.

use num::Complex;
use std::fmt;
use std::mem;
use std::str::FromStr;

use crate::error::RenderError;

/// How hard the renderer works to avoid iterating every pixel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Iterate every pixel.
    None,
    /// Iterate every pixel, but skip the cardioid and the period-2 bulb.
    BulbExclusion,
    /// Boundary-tracing subdivision with the plain kernel.
    Subdivision,
    /// Subdivision plus the closed-form bulb tests.
    Both,
    /// Per-band strategies plus mirroring about the real axis.
    Adaptive,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Adaptive
    }
}

impl FromStr for Strategy {
    type Err = RenderError;

    /// Accepts the strategy names, and the numeric optimization levels
    /// 1 through 4 of the old web handler.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "1" => Ok(Strategy::None),
            "bulb" | "bulbs" | "2" => Ok(Strategy::BulbExclusion),
            "subdivision" | "subdivide" | "3" => Ok(Strategy::Subdivision),
            "both" | "4" => Ok(Strategy::Both),
            "adaptive" | "5" => Ok(Strategy::Adaptive),
            _ => Err(RenderError::UnknownStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Strategy::None => "none",
            Strategy::BulbExclusion => "bulb",
            Strategy::Subdivision => "subdivision",
            Strategy::Both => "both",
            Strategy::Adaptive => "adaptive",
        };
        f.write_str(name)
    }
}

/// A validated rendering request.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderRequest {
    center: Complex<f64>,
    pixels_per_unit: f64,
    width: usize,
    height: usize,
    max_iterations: u32,
    strategy: Strategy,
}

impl RenderRequest {
    /// Builds a request, rejecting anything that cannot be rendered:
    /// empty images, non-positive or non-finite zoom, a non-finite
    /// center, a zero iteration cap, and images whose buffer would not
    /// fit in the address space.
    pub fn new(
        width: usize,
        height: usize,
        center_re: f64,
        center_im: f64,
        pixels_per_unit: f64,
        max_iterations: u32,
        strategy: Strategy,
    ) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        if !(pixels_per_unit.is_finite() && pixels_per_unit > 0.0) {
            return Err(RenderError::InvalidScale(pixels_per_unit));
        }
        if !(center_re.is_finite() && center_im.is_finite()) {
            return Err(RenderError::InvalidCenter {
                re: center_re,
                im: center_im,
            });
        }
        if max_iterations == 0 {
            return Err(RenderError::InvalidIterations);
        }
        let addressable = width
            .checked_mul(height)
            .and_then(|pixels| pixels.checked_mul(mem::size_of::<f64>()))
            .map_or(false, |bytes| bytes <= isize::max_value() as usize);
        if !addressable {
            return Err(RenderError::TooLarge { width, height });
        }

        Ok(RenderRequest {
            center: Complex::new(center_re, center_im),
            pixels_per_unit,
            width,
            height,
            max_iterations,
            strategy,
        })
    }

    /// The point at the middle of the image.
    pub fn center(&self) -> Complex<f64> {
        self.center
    }

    /// Zoom factor.
    pub fn pixels_per_unit(&self) -> f64 {
        self.pixels_per_unit
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Iteration cap.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Rendering strategy.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// The same view at `factor` times the resolution, for supersampling.
    pub fn supersampled(&self, factor: usize) -> Result<Self, RenderError> {
        let width = self
            .width
            .checked_mul(factor)
            .ok_or(RenderError::TooLarge {
                width: usize::max_value(),
                height: self.height,
            })?;
        let height = self
            .height
            .checked_mul(factor)
            .ok_or(RenderError::TooLarge {
                width,
                height: usize::max_value(),
            })?;
        RenderRequest::new(
            width,
            height,
            self.center.re,
            self.center.im,
            self.pixels_per_unit * factor as f64,
            self.max_iterations,
            self.strategy,
        )
    }
}
