// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Antialiasing by supersampling.
//!
//! The image is rendered `factor` times larger on each axis and then
//! reduced: every output pixel is the weighted sum of the
//! `factor x factor` block of input pixels it covers.  The weights come
//! from a separable, normalized filter kernel.

use itertools::iproduct;
use num::clamp;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::RenderError;

/// A reconstruction filter.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Filter {
    /// A Gaussian bell.
    Gaussian {
        /// Standard deviation, in input pixels.
        sigma: f64,
    },
    /// The Mitchell-Netravali cubic.
    Mitchell {
        /// The blur parameter.
        b: f64,
        /// The ringing parameter.
        c: f64,
    },
}

impl Filter {
    /// The Gaussian used for a `size` block: three standard deviations
    /// span the block, so a 3x3 block gets `sigma = 1`.
    pub fn gaussian_for(size: usize) -> Self {
        Filter::Gaussian {
            sigma: size as f64 / 3.0,
        }
    }

    /// Mitchell and Netravali's recommended `B = C = 1/3`.
    pub fn mitchell() -> Self {
        Filter::Mitchell {
            b: 1.0 / 3.0,
            c: 1.0 / 3.0,
        }
    }

    fn validate(&self) -> Result<(), RenderError> {
        let valid = match *self {
            Filter::Gaussian { sigma } => sigma.is_finite() && sigma > 0.0,
            Filter::Mitchell { b, c } => b.is_finite() && c.is_finite(),
        };
        if valid {
            Ok(())
        } else {
            Err(RenderError::InvalidFilter(format!("{:?}", self)))
        }
    }
}

/// A square table of weights that sum to one.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterKernel {
    size: usize,
    weights: Vec<f64>,
}

fn mitchell_weight(x: f64, b: f64, c: f64) -> f64 {
    let x = x.abs();
    let x2 = x * x;
    let x3 = x2 * x;
    let w = if x < 1.0 {
        (12.0 - 9.0 * b - 6.0 * c) * x3 + (-18.0 + 12.0 * b + 6.0 * c) * x2 + (6.0 - 2.0 * b)
    } else if x < 2.0 {
        (-b - 6.0 * c) * x3 + (6.0 * b + 30.0 * c) * x2 + (-12.0 * b - 48.0 * c) * x + (8.0 * b + 24.0 * c)
    } else {
        0.0
    };
    w / 6.0
}

impl FilterKernel {
    /// Builds the kernel of `filter` for a `size x size` block.
    pub fn new(size: usize, filter: Filter) -> Result<Self, RenderError> {
        if size == 0 {
            return Err(RenderError::InvalidFactor);
        }
        filter.validate()?;
        let center = (size - 1) as f64 / 2.0;
        let profile: Vec<f64> = (0..size)
            .map(|i| {
                let d = i as f64 - center;
                match filter {
                    Filter::Gaussian { sigma } => (-(d * d) / (2.0 * sigma * sigma)).exp(),
                    // The cubic's support of 4 is stretched over the block.
                    Filter::Mitchell { b, c } => mitchell_weight(d * 4.0 / size as f64, b, c),
                }
            })
            .collect();

        let weights: Vec<f64> = iproduct!(profile.iter(), profile.iter())
            .map(|(wy, wx)| wy * wx)
            .collect();
        let total: f64 = weights.iter().sum();
        if !(total.is_finite() && total > 0.0) {
            return Err(RenderError::InvalidFilter(format!("{:?}", filter)));
        }
        Ok(FilterKernel {
            size,
            weights: weights.into_iter().map(|w| w / total).collect(),
        })
    }

    /// A Gaussian kernel for a `size x size` block.
    pub fn gaussian(size: usize, sigma: f64) -> Result<Self, RenderError> {
        FilterKernel::new(size, Filter::Gaussian { sigma })
    }

    /// A Mitchell-Netravali kernel for a `size x size` block.
    pub fn mitchell(size: usize, b: f64, c: f64) -> Result<Self, RenderError> {
        FilterKernel::new(size, Filter::Mitchell { b, c })
    }

    /// The side of the block this kernel covers.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The weight of the input pixel at `(kx, ky)` within the block.
    pub fn weight(&self, kx: usize, ky: usize) -> f64 {
        self.weights[ky * self.size + kx]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum FilterKey {
    Gaussian(u64),
    Mitchell(u64, u64),
}

impl From<Filter> for FilterKey {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Gaussian { sigma } => FilterKey::Gaussian(sigma.to_bits()),
            Filter::Mitchell { b, c } => FilterKey::Mitchell(b.to_bits(), c.to_bits()),
        }
    }
}

/// Remembers kernels already built, so repeated renders with the same
/// antialiasing settings share one table.
#[derive(Debug, Default)]
pub struct KernelCache {
    kernels: HashMap<(usize, FilterKey), Arc<FilterKernel>>,
}

impl KernelCache {
    /// An empty cache.
    pub fn new() -> Self {
        KernelCache::default()
    }

    /// The kernel of `filter` for `size`, built on first use.
    pub fn kernel(&mut self, size: usize, filter: Filter) -> Result<Arc<FilterKernel>, RenderError> {
        let key = (size, FilterKey::from(filter));
        if let Some(kernel) = self.kernels.get(&key) {
            return Ok(kernel.clone());
        }
        let kernel = Arc::new(FilterKernel::new(size, filter)?);
        self.kernels.insert(key, kernel.clone());
        Ok(kernel)
    }

    /// How many kernels have been built.
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    /// True before the first kernel is built.
    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }
}

/// Reduces a packed RGB `image` of `width x height` pixels by `factor`
/// on each axis.
pub fn resample(
    image: &[u8],
    width: usize,
    height: usize,
    factor: usize,
    kernel: &FilterKernel,
) -> Result<Vec<u8>, RenderError> {
    if factor == 0 {
        return Err(RenderError::InvalidFactor);
    }
    if kernel.size != factor {
        return Err(RenderError::KernelMismatch(kernel.size, factor));
    }
    for &size in &[width, height] {
        if size % factor != 0 {
            return Err(RenderError::IndivisibleSize { size, factor });
        }
    }
    let expected = width * height * 3;
    if image.len() != expected {
        return Err(RenderError::BufferMismatch {
            expected,
            actual: image.len(),
        });
    }
    if factor == 1 {
        return Ok(image.to_vec());
    }

    let (out_width, out_height) = (width / factor, height / factor);
    let mut out = Vec::with_capacity(out_width * out_height * 3);
    for (oy, ox) in iproduct!(0..out_height, 0..out_width) {
        let mut sum = [0.0f64; 3];
        for (ky, kx) in iproduct!(0..factor, 0..factor) {
            let weight = kernel.weight(kx, ky);
            let at = ((oy * factor + ky) * width + ox * factor + kx) * 3;
            for (channel, total) in sum.iter_mut().enumerate() {
                *total += weight * f64::from(image[at + channel]);
            }
        }
        for &total in &sum {
            out.push(clamp(total.round(), 0.0, 255.0) as u8);
        }
    }
    Ok(out)
}

/// [`resample`](fn.resample.html) for a square image of side `size`.
pub fn resample_square(
    image: &[u8],
    size: usize,
    factor: usize,
    kernel: &FilterKernel,
) -> Result<Vec<u8>, RenderError> {
    resample(image, size, size, factor, kernel)
}

/// The antialiasing choices offered to users.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Antialias {
    /// Render at the output size.
    None,
    /// 3x supersampling, Gaussian filter.
    Gaussian3,
    /// 3x supersampling, Mitchell filter.
    Mitchell3,
    /// 5x supersampling, Gaussian filter.
    Gaussian5,
    /// 5x supersampling, Mitchell filter.
    Mitchell5,
}

impl Default for Antialias {
    fn default() -> Self {
        Antialias::None
    }
}

impl Antialias {
    /// The supersampling factor on each axis.
    pub fn factor(self) -> usize {
        match self {
            Antialias::None => 1,
            Antialias::Gaussian3 | Antialias::Mitchell3 => 3,
            Antialias::Gaussian5 | Antialias::Mitchell5 => 5,
        }
    }

    /// The reduction filter, if any.
    pub fn filter(self) -> Option<Filter> {
        match self {
            Antialias::None => None,
            Antialias::Gaussian3 | Antialias::Gaussian5 => Some(Filter::gaussian_for(self.factor())),
            Antialias::Mitchell3 | Antialias::Mitchell5 => Some(Filter::mitchell()),
        }
    }
}

impl FromStr for Antialias {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "0" => Ok(Antialias::None),
            "gaussian3" | "1" => Ok(Antialias::Gaussian3),
            "mitchell3" | "2" => Ok(Antialias::Mitchell3),
            "gaussian5" | "3" => Ok(Antialias::Gaussian5),
            "mitchell5" | "4" => Ok(Antialias::Mitchell5),
            _ => Err(RenderError::UnknownAntialias(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn gaussian_three_matches_the_classic_table() {
        let k = FilterKernel::gaussian(3, 1.0).unwrap();
        assert!(close(k.weight(1, 1), 0.20417995557165622));
        assert!((k.weight(0, 0) - 0.0751).abs() < 1e-4);
        assert!((k.weight(1, 0) - 0.1238).abs() < 1e-4);
    }

    #[test]
    fn kernels_are_normalized_and_symmetric() {
        for &(size, filter) in &[
            (3, Filter::gaussian_for(3)),
            (5, Filter::gaussian_for(5)),
            (3, Filter::mitchell()),
            (5, Filter::mitchell()),
        ] {
            let k = FilterKernel::new(size, filter).unwrap();
            let total: f64 = k.weights.iter().sum();
            assert!(close(total, 1.0), "{:?} {}", filter, total);
            for (y, x) in iproduct!(0..size, 0..size) {
                assert!(close(k.weight(x, y), k.weight(size - 1 - x, y)));
                assert!(close(k.weight(x, y), k.weight(y, x)));
            }
        }
    }

    #[test]
    fn bad_filters_are_rejected() {
        assert!(FilterKernel::gaussian(3, 0.0).is_err());
        assert!(FilterKernel::gaussian(3, std::f64::NAN).is_err());
        assert_eq!(FilterKernel::gaussian(0, 1.0), Err(RenderError::InvalidFactor));
    }

    #[test]
    fn flat_images_stay_flat() {
        let image = vec![100u8; 9 * 9 * 3];
        for filter in &[Filter::gaussian_for(3), Filter::mitchell()] {
            let k = FilterKernel::new(3, *filter).unwrap();
            let out = resample_square(&image, 9, 3, &k).unwrap();
            assert_eq!(out, vec![100u8; 3 * 3 * 3]);
        }
    }

    #[test]
    fn channels_are_kept_apart() {
        let mut image = Vec::new();
        for _ in 0..9 {
            image.extend_from_slice(&[255, 0, 40]);
        }
        let k = FilterKernel::gaussian(3, 1.0).unwrap();
        assert_eq!(resample(&image, 3, 3, 3, &k).unwrap(), vec![255, 0, 40]);
    }

    #[test]
    fn factor_one_is_a_copy() {
        let image: Vec<u8> = (0..12).collect();
        let k = FilterKernel::gaussian(1, 1.0).unwrap();
        assert_eq!(resample(&image, 2, 2, 1, &k).unwrap(), image);
    }

    #[test]
    fn mismatches_are_reported() {
        let k = FilterKernel::gaussian(3, 1.0).unwrap();
        let image = vec![0u8; 6 * 6 * 3];
        assert_eq!(resample(&image, 6, 6, 0, &k), Err(RenderError::InvalidFactor));
        assert_eq!(resample(&image, 6, 6, 2, &k), Err(RenderError::KernelMismatch(3, 2)));
        assert_eq!(
            resample(&image, 7, 6, 3, &k),
            Err(RenderError::IndivisibleSize { size: 7, factor: 3 })
        );
        assert_eq!(
            resample(&image[1..], 6, 6, 3, &k),
            Err(RenderError::BufferMismatch {
                expected: 108,
                actual: 107
            })
        );
    }

    #[test]
    fn the_cache_shares_kernels() {
        let mut cache = KernelCache::new();
        assert!(cache.is_empty());
        let a = cache.kernel(3, Filter::mitchell()).unwrap();
        let b = cache.kernel(3, Filter::mitchell()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        cache.kernel(5, Filter::mitchell()).unwrap();
        cache.kernel(3, Filter::gaussian_for(3)).unwrap();
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn antialias_names() {
        assert_eq!("Gaussian3".parse::<Antialias>().unwrap(), Antialias::Gaussian3);
        assert_eq!("4".parse::<Antialias>().unwrap(), Antialias::Mitchell5);
        assert_eq!(Antialias::Mitchell5.factor(), 5);
        assert_eq!(Antialias::None.filter(), None);
        assert_eq!(Antialias::Gaussian3.filter(), Some(Filter::Gaussian { sigma: 1.0 }));
        assert!("blur".parse::<Antialias>().is_err());
    }
}
