// MIT License
//
// Copyright (c) 2024 Erik Holum
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use codspeed_criterion_compat::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rrtplanning::nearest::{KdTree, LinearSearch, NearestNeighbors};
use rrtplanning::planning::rrt::{rrt_with_search, PlannerConfig};
use rrtplanning::{Configuration, RandomTree};

/// Function for randomly sampling the 2-D plane
fn sample_2d(rng: &mut StdRng, max_x: f64, max_y: f64) -> Configuration {
    vec![rng.gen_range(0.0..=max_x), rng.gen_range(0.0..=max_y)]
}

fn run_rrt<S: NearestNeighbors>(search: S, grid_size: f64) {
    let mut rng = StdRng::seed_from_u64(1);
    let config = PlannerConfig {
        step_size: 1.0,
        goal_bias: 0.05,
        ..PlannerConfig::default()
    };

    let result = rrt_with_search(
        vec![1.0, 1.0],
        &[grid_size, grid_size],
        search,
        |rng: &mut StdRng| sample_2d(rng, grid_size, grid_size),
        |_: &[f64], _: &[f64]| true,
        &config,
        &mut rng,
    );

    assert!(result.is_ok(), "Expected Ok result, got Err");
}

// Grows a tree of `size` nodes in a 6 dimensional unit cube
fn grow_tree<S: NearestNeighbors>(search: S, size: usize) {
    let mut rng = StdRng::seed_from_u64(2);
    let mut tree = RandomTree::with_search(vec![0.5; 6], 0.05, search).unwrap();
    while tree.size() < size {
        let target: Configuration = (0..6).map(|_| rng.gen_range(0.0..1.0)).collect();
        let proposal = tree.propose_towards(&target).unwrap();
        tree.commit(proposal).unwrap();
    }
}

fn bench_rrt(c: &mut Criterion) {
    c.bench_function("rrt_linear", |b| b.iter(|| run_rrt(LinearSearch, 50.0)));
    c.bench_function("rrt_kd_tree", |b| b.iter(|| run_rrt(KdTree::new(), 50.0)));
}

fn bench_growth(c: &mut Criterion) {
    c.bench_function("grow_linear_2000", |b| {
        b.iter(|| grow_tree(LinearSearch, 2000));
    });
    c.bench_function("grow_kd_tree_2000", |b| {
        b.iter(|| grow_tree(KdTree::new(), 2000));
    });
}

criterion_group!(benches, bench_rrt, bench_growth);
criterion_main!(benches);
