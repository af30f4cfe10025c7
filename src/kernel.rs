// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time kernel.
//!
//! For a point `c` on the complex plane we iterate `z = z² + c` and
//! measure how quickly `z` leaves the circle of radius 2.  Points that
//! never leave belong to the Mandelbrot set and get the value zero;
//! every other point gets a smoothed, fractional iteration count
//! ("mu") normalized into `(0, 1)`.
//!
//! Two large regions of the set, the main cardioid and the period-2
//! bulb, have closed-form descriptions.  Testing for them is a handful
//! of multiplications, while proving membership by iteration costs the
//! full iteration cap, so the kernel can be told to check them first.

use std::f64::consts::LN_2;

const D4: f64 = 1.0 / 4.0;
const D16: f64 = D4 / 4.0;

/// Escape radius 2, squared.
const ESCAPE_RADIUS_SQ: f64 = 4.0;

/// The smallest value an escaping point can produce.  Points far
/// outside the set can smooth to a negative mu; they are still outside,
/// and zero is reserved for the set itself.
pub const MIN_ESCAPE: f64 = std::f64::EPSILON;

/// Is the point strictly inside the main cardioid?
#[inline]
pub fn in_cardioid(cr: f64, ci: f64) -> bool {
    let x4 = cr - D4;
    let y2 = ci * ci;
    let q = x4 * x4 + y2;
    q * (q + x4) < y2 * D4
}

/// Is the point strictly inside the period-2 bulb, the disc of radius
/// 1/4 around -1?
#[inline]
pub fn in_period2_bulb(cr: f64, ci: f64) -> bool {
    (cr + 1.0) * (cr + 1.0) + ci * ci < D16
}

/// Which closed-form membership tests to run before iterating.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Exclusion {
    /// Test for the main cardioid.
    pub cardioid: bool,
    /// Test for the period-2 bulb.
    pub period2: bool,
}

impl Exclusion {
    /// Iterate everything.
    pub const NONE: Exclusion = Exclusion {
        cardioid: false,
        period2: false,
    };
    /// Skip the main cardioid.
    pub const CARDIOID: Exclusion = Exclusion {
        cardioid: true,
        period2: false,
    };
    /// Skip the period-2 bulb.
    pub const PERIOD2: Exclusion = Exclusion {
        cardioid: false,
        period2: true,
    };
    /// Skip both.
    pub const BOTH: Exclusion = Exclusion {
        cardioid: true,
        period2: true,
    };

    /// True if one of the enabled tests proves the point is in the set.
    #[inline]
    pub fn excludes(self, cr: f64, ci: f64) -> bool {
        (self.cardioid && in_cardioid(cr, ci)) || (self.period2 && in_period2_bulb(cr, ci))
    }
}

/// The smoothed escape time of `c = cr + ci·i`, or `None` if the orbit
/// is still bounded after `max_iterations` steps.
///
/// The first step from `z = 0` always lands on `c`, so the orbit starts
/// there and the loop computes `z₂ … z_max`.  With a cap of 0 or 1 the
/// loop body never runs.  If `z_k` is the first value outside the
/// escape radius the result is `k - log₂(ln |z_k|)`.
#[inline]
pub fn escape_time(cr: f64, ci: f64, max_iterations: u32) -> Option<f64> {
    let (mut zr, mut zi) = (cr, ci);
    let (mut zr2, mut zi2) = (zr * zr, zi * zi);

    for i in 1..max_iterations {
        zi = 2.0 * zr * zi + ci;
        zr = zr2 - zi2 + cr;
        zr2 = zr * zr;
        zi2 = zi * zi;

        let m2 = zr2 + zi2;
        if m2 > ESCAPE_RADIUS_SQ {
            return Some(f64::from(i) + 1.0 - m2.sqrt().ln().ln() / LN_2);
        }
    }
    None
}

/// The normalized escape value of a point: exactly `0.0` for points in
/// the set (or excluded by `exclusion`), otherwise a value in
/// `[MIN_ESCAPE, 1)`.
#[inline]
pub fn iterate(cr: f64, ci: f64, max_iterations: u32, exclusion: Exclusion) -> f64 {
    if exclusion.excludes(cr, ci) {
        return 0.0;
    }
    match escape_time(cr, ci, max_iterations) {
        Some(mu) => (mu / (f64::from(max_iterations) + 1.0)).max(MIN_ESCAPE),
        None => 0.0,
    }
}

/// An iteration cap paired with a set of exclusion tests; the thing a
/// renderer calls once per pixel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Kernel {
    /// Closed-form tests to run first.
    pub exclusion: Exclusion,
    /// Iteration cap.
    pub max_iterations: u32,
}

impl Kernel {
    /// Pair a cap with an exclusion set.
    pub fn new(max_iterations: u32, exclusion: Exclusion) -> Self {
        Kernel {
            exclusion,
            max_iterations,
        }
    }

    /// See [`iterate`](fn.iterate.html).
    #[inline]
    pub fn iterate(&self, cr: f64, ci: f64) -> f64 {
        iterate(cr, ci, self.max_iterations, self.exclusion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_in_the_cardioid() {
        assert!(in_cardioid(0.0, 0.0));
        assert!(in_cardioid(-0.5, 0.3));
        assert!(!in_cardioid(0.3, 0.0));
        assert!(!in_cardioid(-1.0, 0.0));
    }

    #[test]
    fn minus_one_is_in_the_bulb() {
        assert!(in_period2_bulb(-1.0, 0.0));
        assert!(in_period2_bulb(-1.2, 0.01));
        assert!(!in_period2_bulb(-1.3, 0.0));
        assert!(!in_period2_bulb(0.0, 0.0));
    }

    #[test]
    fn exclusion_respects_its_flags() {
        assert!(!Exclusion::NONE.excludes(0.0, 0.0));
        assert!(Exclusion::CARDIOID.excludes(0.0, 0.0));
        assert!(!Exclusion::CARDIOID.excludes(-1.0, 0.0));
        assert!(Exclusion::PERIOD2.excludes(-1.0, 0.0));
        assert!(Exclusion::BOTH.excludes(-1.0, 0.0));
        assert!(Exclusion::BOTH.excludes(0.1, 0.1));
    }

    #[test]
    fn set_members_return_zero() {
        for &(cr, ci) in &[(0.0, 0.0), (-1.0, 0.0), (-0.1, 0.2), (-1.9, 0.0)] {
            assert_eq!(iterate(cr, ci, 500, Exclusion::NONE), 0.0);
        }
    }

    #[test]
    fn outside_points_escape_into_the_unit_interval() {
        for &(cr, ci) in &[(1.0, 1.0), (0.5, 0.0), (-2.5, 0.3), (100.0, -100.0)] {
            let v = iterate(cr, ci, 100, Exclusion::BOTH);
            assert!(v >= MIN_ESCAPE && v < 1.0, "{} for {},{}", v, cr, ci);
        }
    }

    #[test]
    fn small_caps_never_iterate() {
        assert_eq!(escape_time(5.0, 5.0, 0), None);
        assert_eq!(escape_time(5.0, 5.0, 1), None);
        assert_eq!(iterate(5.0, 5.0, 1, Exclusion::NONE), 0.0);
        assert!(escape_time(5.0, 5.0, 2).is_some());
    }

    #[test]
    fn smoothing_decreases_with_distance() {
        let near = escape_time(0.5, 0.0, 100).unwrap();
        let far = escape_time(1.5, 0.0, 100).unwrap();
        assert!(near > far);
    }

    #[test]
    fn conjugate_points_agree_bit_for_bit() {
        for &(cr, ci) in &[(0.3, 0.5), (-0.75, 0.1), (-1.4, 0.02)] {
            let up = iterate(cr, ci, 1000, Exclusion::NONE);
            let down = iterate(cr, -ci, 1000, Exclusion::NONE);
            assert_eq!(up.to_bits(), down.to_bits());
        }
    }

    #[test]
    fn kernel_matches_free_function() {
        let k = Kernel::new(64, Exclusion::PERIOD2);
        assert_eq!(k.iterate(0.3, 0.6), iterate(0.3, 0.6, 64, Exclusion::PERIOD2));
    }
}
