// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Maps rendered values to colours.  The palette is a table of
//! sine waves at three different frequencies, one per channel, with
//! the first entry reserved for the set itself.

use num::clamp;
use std::f64::consts::PI;

use crate::error::RenderError;

/// A lookup table of RGB colours; entry 0 is black.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: Vec<[u8; 3]>,
}

fn wave(frequency: f64, j: f64) -> u8 {
    clamp(((frequency * PI * j).sin() + 1.0) * 127.5, 0.0, 255.0) as u8
}

impl Palette {
    /// Builds a palette of `size` entries.
    pub fn new(size: usize) -> Result<Self, RenderError> {
        if size < 2 {
            return Err(RenderError::InvalidPalette(size));
        }
        let mut colors: Vec<[u8; 3]> = (0..size)
            .map(|i| {
                let j = i as f64 / size as f64;
                [wave(2.0, j), wave(3.0, j), wave(4.0, j)]
            })
            .collect();
        colors[0] = [0, 0, 0];
        Ok(Palette { colors })
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; a palette has at least two entries.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The colour of one rendered value.  Only an exact zero is black;
    /// everything that escaped gets a real colour.
    pub fn color(&self, value: f64) -> [u8; 3] {
        if value == 0.0 {
            return self.colors[0];
        }
        let last = self.colors.len() - 1;
        let index = (value * self.colors.len() as f64).floor();
        let index = clamp(index, 1.0, last as f64) as usize;
        self.colors[index]
    }

    /// Colours a whole buffer into packed RGB bytes.
    pub fn colorize(&self, values: &[f64]) -> Vec<u8> {
        let mut pixels = Vec::with_capacity(values.len() * 3);
        for &value in values {
            pixels.extend_from_slice(&self.color(value));
        }
        pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_black() {
        let p = Palette::new(100).unwrap();
        assert_eq!(p.color(0.0), [0, 0, 0]);
        assert_eq!(p.len(), 100);
    }

    #[test]
    fn tiny_escapes_are_not_black() {
        let p = Palette::new(100).unwrap();
        assert_ne!(p.color(1e-9), [0, 0, 0]);
        assert_eq!(p.color(1e-9), p.color(0.015));
    }

    #[test]
    fn values_near_one_use_the_last_entry() {
        let p = Palette::new(10).unwrap();
        assert_eq!(p.color(0.9999), p.color(0.95));
    }

    #[test]
    fn colorize_packs_rgb() {
        let p = Palette::new(4).unwrap();
        let bytes = p.colorize(&[0.0, 0.3, 0.6]);
        assert_eq!(bytes.len(), 9);
        assert_eq!(&bytes[0..3], &[0, 0, 0]);
        assert_eq!(&bytes[3..6], &p.color(0.3)[..]);
    }

    #[test]
    fn palettes_need_room_for_black() {
        assert_eq!(Palette::new(1), Err(RenderError::InvalidPalette(1)));
    }
}
