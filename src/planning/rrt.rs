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

use crate::configuration::{self, Configuration};
use crate::error::{Error, Result};
use crate::nearest::{LinearSearch, NearestNeighbors};
use crate::tree::RandomTree;
use rand::Rng;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Parameters for [`rrt`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Maximum distance of a single extension.
    pub step_size: f64,
    /// Probability of extending towards the goal instead of a sample.
    pub goal_bias: f64,
    /// Probability of extending towards a perturbed existing node instead of a sample.
    pub node_bias: f64,
    /// A node within this distance of the goal counts as reaching it.
    pub goal_tolerance: f64,
    pub max_iterations: u64,
    pub max_duration: Duration,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            step_size: 1.0,
            goal_bias: 0.05,
            node_bias: 0.0,
            goal_tolerance: 1.0,
            max_iterations: 100_000,
            max_duration: Duration::from_secs(10),
        }
    }
}

impl PlannerConfig {
    /// # Errors
    ///
    /// If the step size or goal tolerance is not positive, or the biases are not
    /// probabilities that sum to at most one.
    pub fn validate(&self) -> Result<()> {
        if !self.step_size.is_finite() || self.step_size <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "step size must be positive, got {}",
                self.step_size
            )));
        }
        if !self.goal_tolerance.is_finite() || self.goal_tolerance <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "goal tolerance must be positive, got {}",
                self.goal_tolerance
            )));
        }
        let is_probability = |p: f64| (0.0..=1.0).contains(&p);
        if !is_probability(self.goal_bias)
            || !is_probability(self.node_bias)
            || self.goal_bias + self.node_bias > 1.0
        {
            return Err(Error::InvalidArgument(format!(
                "goal bias {} and node bias {} must be probabilities summing to at most 1",
                self.goal_bias, self.node_bias
            )));
        }
        Ok(())
    }
}

/// Result of a successful search.
#[derive(Debug)]
pub struct Plan<S: NearestNeighbors = LinearSearch> {
    /// Configurations from the start to the node that reached the goal.
    pub path: Vec<Configuration>,
    /// The tree grown during the search.
    pub tree: RandomTree<S>,
    /// Number of iterations used.
    pub iterations: u64,
}

/// Picks the configuration to extend towards in this iteration.
fn choose_target<S, FS, R>(
    tree: &RandomTree<S>,
    goal: &[f64],
    sample: &mut FS,
    config: &PlannerConfig,
    rng: &mut R,
) -> Configuration
where
    S: NearestNeighbors,
    FS: FnMut(&mut R) -> Configuration,
    R: Rng,
{
    let roll: f64 = rng.gen();
    if roll < config.goal_bias {
        goal.to_vec()
    } else if roll < config.goal_bias + config.node_bias {
        // Random walk from an existing node
        let mut target = tree.random_node(rng);
        for value in &mut target {
            *value += rng.gen_range(-config.step_size..=config.step_size);
        }
        target
    } else {
        sample(rng)
    }
}

/// Attempts to extend the tree towards `target`.
/// Returns the index of the new node, or None if the extension was not valid.
fn extend_tree<S, FV>(
    tree: &mut RandomTree<S>,
    target: &[f64],
    is_valid: &mut FV,
) -> Result<Option<usize>>
where
    S: NearestNeighbors,
    FV: FnMut(&[f64], &[f64]) -> bool,
{
    let proposal = tree.propose_towards(target)?;
    let from = tree.node(proposal.parent())?;
    if !is_valid(&from, proposal.configuration()) {
        return Ok(None);
    }
    tree.commit(proposal).map(Some)
}

/// Basic RRT using a linear scan for nearest neighbors.
///
/// See [`rrt_with_search`].
///
/// # Errors
///
/// See [`rrt_with_search`].
pub fn rrt<FS, FV, R>(
    start: Configuration,
    goal: &[f64],
    sample: FS,
    is_valid: FV,
    config: &PlannerConfig,
    rng: &mut R,
) -> Result<Plan>
where
    FS: FnMut(&mut R) -> Configuration,
    FV: FnMut(&[f64], &[f64]) -> bool,
    R: Rng,
{
    rrt_with_search(start, goal, LinearSearch, sample, is_valid, config, rng)
}

/// Grows a [`RandomTree`] from `start` until a node lands within the goal tolerance.
///
/// # Parameters
///
/// - `start`: The starting configuration, root of the tree
/// - `goal`: The configuration to reach
/// - `search`: Nearest neighbor strategy for the tree
/// - `sample`: Function to randomly sample the configuration space
/// - `is_valid`: Whether the straight line between two configurations is free, checked
///   before every node is committed
/// - `config`: Step size, sampling biases and termination limits
/// - `rng`: Source of every random draw made by the planner
///
/// # Returns
///
/// A [`Plan`] with the path from `start` to the first node within tolerance of `goal`,
/// along with the tree itself.
///
/// # Errors
///
/// [`Error::PathNotFound`] if the iteration or time limit is reached first.
/// [`Error::InvalidArgument`] for an invalid `config`, or configurations whose
/// dimension differs from `start`.
pub fn rrt_with_search<S, FS, FV, R>(
    start: Configuration,
    goal: &[f64],
    search: S,
    mut sample: FS,
    mut is_valid: FV,
    config: &PlannerConfig,
    rng: &mut R,
) -> Result<Plan<S>>
where
    S: NearestNeighbors,
    FS: FnMut(&mut R) -> Configuration,
    FV: FnMut(&[f64], &[f64]) -> bool,
    R: Rng,
{
    config.validate()?;
    let mut tree = RandomTree::with_search(start, config.step_size, search)?;
    configuration::validate(goal, tree.dimension())?;

    // Trivial if we're already there
    if configuration::distance(&tree.node(0)?, goal)? <= config.goal_tolerance {
        return Ok(Plan {
            path: tree.path(0)?,
            tree,
            iterations: 0,
        });
    }

    let start_time = Instant::now();
    for iteration in 1..=config.max_iterations {
        // Have we timed out?
        if start_time.elapsed() > config.max_duration {
            warn!(iteration, "RRT timed out");
            return Err(Error::PathNotFound {
                iterations: iteration - 1,
            });
        }

        let target = choose_target(&tree, goal, &mut sample, config, rng);
        let Some(index) = extend_tree(&mut tree, &target, &mut is_valid)? else {
            continue;
        };

        let reached = tree.node(index)?;
        if configuration::distance(&reached, goal)? <= config.goal_tolerance {
            info!(iteration, nodes = tree.size(), "RRT found a path");
            return Ok(Plan {
                path: tree.path(index)?,
                tree,
                iterations: iteration,
            });
        }
    }

    debug!(nodes = tree.size(), "RRT exhausted iterations");
    warn!(max_iterations = config.max_iterations, "RRT failed to find a path");
    Err(Error::PathNotFound {
        iterations: config.max_iterations,
    })
}

//
// Unit tests
//
