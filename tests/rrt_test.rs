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

use float_cmp::approx_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rrtplanning::configuration::distance;
use rrtplanning::nearest::{KdTree, LinearSearch, NearestNeighbors};
use rrtplanning::planning::rrt::{rrt_with_search, PlannerConfig};
use rrtplanning::{Configuration, Error};
use tracing_subscriber::EnvFilter;

// Set RUST_LOG=rrtplanning=debug to see planner output
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Function for randomly sampling the 2-D plane
fn sample_2d(rng: &mut StdRng, max_x: f64, max_y: f64) -> Configuration {
    vec![rng.gen_range(0.0..=max_x), rng.gen_range(0.0..=max_y)]
}

// Checks the segment against a ball shaped obstacle at a fixed resolution
fn segment_clear(from: &[f64], to: &[f64], center: &[f64], radius: f64) -> bool {
    (0..=10).all(|i| {
        let t = f64::from(i) / 10.0;
        let p = [
            from[0] + (to[0] - from[0]) * t,
            from[1] + (to[1] - from[1]) * t,
        ];
        distance(&p, center).unwrap() > radius
    })
}

fn run_rrt<S: NearestNeighbors + std::fmt::Debug>(
    search: S,
    start: &[f64],
    goal: &[f64],
    grid_size: f64,
) {
    init_tracing();

    // Seed the generator for consistency
    let mut rng = StdRng::seed_from_u64(1);
    let config = PlannerConfig {
        step_size: 1.0,
        goal_bias: 0.1,
        goal_tolerance: 0.5,
        ..PlannerConfig::default()
    };

    // All points except for ball in the center are valid
    let obstacle = vec![grid_size / 2.0, grid_size / 2.0];
    let sample_fn = |rng: &mut StdRng| sample_2d(rng, grid_size, grid_size);
    let valid_fn = |from: &[f64], to: &[f64]| segment_clear(from, to, &obstacle, 2.0);

    let result = rrt_with_search(
        start.to_vec(),
        goal,
        search,
        sample_fn,
        valid_fn,
        &config,
        &mut rng,
    );
    assert!(result.is_ok(), "Expected Ok result, got {result:?}");

    let plan = result.unwrap();
    assert!(!plan.path.is_empty(), "Path should not be empty");
    assert_eq!(plan.path[0], start.to_vec(), "Path should start at the start point");

    // Verify it ends near the goal
    let end = plan.path.last().unwrap();
    assert!(distance(end, goal).unwrap() <= 0.5, "Path should end at the goal");

    // Every hop respects the step size and avoids the obstacle
    for pair in plan.path.windows(2) {
        assert!(distance(&pair[0], &pair[1]).unwrap() <= 1.0 + 1e-9);
        assert!(segment_clear(&pair[0], &pair[1], &obstacle, 2.0));
    }
}

#[test]
fn test_rrt() {
    run_rrt(LinearSearch, &[1.0, 1.0], &[9.0, 9.0], 10.0);
}

#[test]
fn test_rrt_kd_tree() {
    run_rrt(KdTree::new(), &[1.0, 1.0], &[9.0, 9.0], 10.0);
}

#[test]
fn test_rrt_random_walk() {
    let mut rng = StdRng::seed_from_u64(5);
    let config = PlannerConfig {
        step_size: 0.5,
        goal_bias: 0.1,
        node_bias: 0.3,
        goal_tolerance: 0.5,
        ..PlannerConfig::default()
    };
    let plan = rrt_with_search(
        vec![0.0, 0.0, 0.0],
        &[3.0, 3.0, 3.0],
        KdTree::new(),
        |rng: &mut StdRng| (0..3).map(|_| rng.gen_range(-1.0..=4.0)).collect(),
        |_: &[f64], _: &[f64]| true,
        &config,
        &mut rng,
    )
    .unwrap();

    let end = plan.path.last().unwrap();
    assert!(distance(end, &[3.0, 3.0, 3.0]).unwrap() <= 0.5);
    assert!(plan.tree.size() as u64 <= plan.iterations + 1);
}

#[test]
fn test_rrt_is_reproducible() {
    let run = || {
        let mut rng = StdRng::seed_from_u64(42);
        let config = PlannerConfig {
            goal_bias: 0.05,
            ..PlannerConfig::default()
        };
        rrt_with_search(
            vec![0.0, 0.0],
            &[15.0, 15.0],
            LinearSearch,
            |rng: &mut StdRng| sample_2d(rng, 20.0, 20.0),
            |_: &[f64], _: &[f64]| true,
            &config,
            &mut rng,
        )
        .unwrap()
    };

    let first = run();
    let second = run();
    assert_eq!(first.iterations, second.iterations);
    assert_eq!(first.path, second.path);
    assert_eq!(first.tree.size(), second.tree.size());
}

#[test]
fn test_rrt_blocked_goal() {
    let mut rng = StdRng::seed_from_u64(1);
    let config = PlannerConfig {
        max_iterations: 2_000,
        ..PlannerConfig::default()
    };

    // The goal sits inside an obstacle
    let obstacle = vec![5.0, 5.0];
    let result = rrt_with_search(
        vec![1.0, 1.0],
        &[5.0, 5.0],
        LinearSearch,
        |rng: &mut StdRng| sample_2d(rng, 10.0, 10.0),
        |from: &[f64], to: &[f64]| segment_clear(from, to, &obstacle, 2.0),
        &config,
        &mut rng,
    );
    assert_eq!(result.unwrap_err(), Error::PathNotFound { iterations: 2_000 });
}

#[test]
fn test_extend_then_add() {
    let mut tree = rrtplanning::RandomTree::new(vec![0.0, 0.0], 1.0).unwrap();
    let proposal = tree.propose_towards(&[3.0, 0.0]).unwrap();
    assert_eq!(tree.nearest().unwrap(), 0);
    assert!(approx_eq!(f64, proposal.configuration()[0], 1.0, epsilon = 1e-12));
    assert!(approx_eq!(f64, proposal.configuration()[1], 0.0));
    assert!(approx_eq!(f64, proposal.distance(), 1.0));

    tree.add(vec![1.0, 0.0]).unwrap();
    assert_eq!(tree.size(), 2);
    assert_eq!(tree.parent(1).unwrap(), Some(0));
}
