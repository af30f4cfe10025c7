// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#[macro_use]
extern crate criterion;

use criterion::Criterion;
use mandelbrot::{render, Antialias, KernelCache, Palette, RenderRequest, Renderer, Strategy};

fn full_view(strategy: Strategy) -> RenderRequest {
    RenderRequest::new(256, 256, -0.75, 0.0, 75.0, 300, strategy).unwrap()
}

fn strategies(c: &mut Criterion) {
    for &strategy in &[
        Strategy::None,
        Strategy::BulbExclusion,
        Strategy::Subdivision,
        Strategy::Both,
        Strategy::Adaptive,
    ] {
        let request = full_view(strategy);
        c.bench_function(&format!("render 256x256 {}", strategy), move |b| {
            b.iter(|| render(&request).unwrap())
        });
    }
}

fn threads(c: &mut Criterion) {
    let request = full_view(Strategy::Adaptive);
    let renderer = Renderer::new().with_threads(num_cpus::get());
    c.bench_function("render 256x256 adaptive, all cores", move |b| {
        b.iter(|| renderer.render(&request).unwrap())
    });
}

fn post_processing(c: &mut Criterion) {
    let values = render(&full_view(Strategy::Adaptive).supersampled(3).unwrap()).unwrap();
    let palette = Palette::new(3000).unwrap();
    let mut cache = KernelCache::new();
    c.bench_function("colorize and resample 768x768", move |b| {
        b.iter(|| {
            let antialias = Antialias::Gaussian3;
            let filter = antialias.filter().unwrap();
            let kernel = cache.kernel(antialias.factor(), filter).unwrap();
            let pixels = palette.colorize(&values);
            mandelbrot::resample_square(&pixels, 768, 3, &kernel).unwrap()
        })
    });
}

criterion_group!(benches, strategies, threads, post_processing);
criterion_main!(benches);
