// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Boundary-tracing subdivision.
//!
//! The Mandelbrot set is connected and has no holes.  If every pixel
//! on the edge of a square tile is in the set, nothing outside the set
//! can be hiding inside the tile: it would have to cross the edge to
//! get there.  So we walk the circumference of the tile, and only if
//! some edge pixel escaped do we split the inside into smaller tiles
//! and repeat.  Deep inside the set this costs the perimeter of a tile
//! instead of its area.
//!
//! The skipped pixels are never written, so the buffer must start out
//! zeroed.
//!
//! Every function here takes a `sample` callback that computes the
//! value of one pixel from its image coordinates.

use itertools::iproduct;

use crate::canvas::Canvas;
use crate::planes::TileBounds;

/// Fills every pixel of `bounds` by calling `sample`, with no skipping.
pub fn render_direct<S>(canvas: &mut Canvas, bounds: &TileBounds, sample: &S)
where
    S: Fn(usize, usize) -> f64,
{
    for (y, x) in iproduct!(bounds.rows(), bounds.columns()) {
        canvas.set(x, y, sample(x, y));
    }
}

/// Fills an arbitrary rectangle by covering it with square tiles and
/// rendering each with [`render_tile`](fn.render_tile.html).  The
/// largest squares that fit go first, laid along the long side; the
/// leftover strip is covered the same way.
pub fn render_rect<S>(canvas: &mut Canvas, bounds: &TileBounds, sample: &S)
where
    S: Fn(usize, usize) -> f64,
{
    let mut rest = *bounds;
    while !rest.is_empty() {
        let side = rest.width.min(rest.height);
        if rest.width >= rest.height {
            let count = rest.width / side;
            for i in 0..count {
                render_tile(canvas, rest.x + i * side, rest.y, side, sample);
            }
            rest.x += count * side;
            rest.width -= count * side;
        } else {
            let count = rest.height / side;
            for i in 0..count {
                render_tile(canvas, rest.x, rest.y + i * side, side, sample);
            }
            rest.y += count * side;
            rest.height -= count * side;
        }
    }
}

/// Renders the square tile of side `size` whose upper left pixel is
/// `(x, y)`.
pub fn render_tile<S>(canvas: &mut Canvas, x: usize, y: usize, size: usize, sample: &S)
where
    S: Fn(usize, usize) -> f64,
{
    match size {
        0 => {}
        1 => canvas.set(x, y, sample(x, y)),
        2 => render_direct(canvas, &TileBounds::new(x, y, 2, 2), sample),
        // Too small to be worth subdividing: if the edge escaped,
        // just compute the one or four inner pixels.
        3 | 4 => {
            if walk_circumference(canvas, x, y, size, sample) {
                let inner = TileBounds::new(x + 1, y + 1, size - 2, size - 2);
                render_direct(canvas, &inner, sample);
            }
        }
        _ => {
            if walk_circumference(canvas, x, y, size, sample) {
                subdivide(canvas, x, y, size, sample);
            }
        }
    }
}

/// Computes and stores every edge pixel of the tile, all four sides in
/// one pass.  Returns true if any of them escaped.
fn walk_circumference<S>(canvas: &mut Canvas, x: usize, y: usize, size: usize, sample: &S) -> bool
where
    S: Fn(usize, usize) -> f64,
{
    let last = size - 1;
    let mut touched = false;
    // Each side stops one short of its end; the next side starts there.
    for i in 0..last {
        let edge = [
            (x + i, y),
            (x + last, y + i),
            (x + last - i, y + last),
            (x, y + last - i),
        ];
        for &(px, py) in &edge {
            let value = sample(px, py);
            canvas.set(px, py, value);
            touched |= value != 0.0;
        }
    }
    touched
}

/// Splits the interior of a tile whose edge has been rendered.  The
/// interior is `size - 2` pixels on a side; halve it if that is even,
/// cut it in thirds if that divides evenly, and otherwise render its
/// last row and column outright and halve what is left.
fn subdivide<S>(canvas: &mut Canvas, x: usize, y: usize, size: usize, sample: &S)
where
    S: Fn(usize, usize) -> f64,
{
    let inner = size - 2;
    let (x0, y0) = (x + 1, y + 1);

    if inner % 2 == 0 {
        split(canvas, x0, y0, inner / 2, 2, sample);
    } else if inner % 3 == 0 {
        split(canvas, x0, y0, inner / 3, 3, sample);
    } else {
        let edge = inner - 1;
        render_direct(canvas, &TileBounds::new(x0, y0 + edge, inner, 1), sample);
        render_direct(canvas, &TileBounds::new(x0 + edge, y0, 1, edge), sample);
        split(canvas, x0, y0, edge / 2, 2, sample);
    }
}

fn split<S>(canvas: &mut Canvas, x: usize, y: usize, side: usize, count: usize, sample: &S)
where
    S: Fn(usize, usize) -> f64,
{
    for (row, column) in iproduct!(0..count, 0..count) {
        render_tile(canvas, x + column * side, y + row * side, side, sample);
    }
}
