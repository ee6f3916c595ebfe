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

//! Incrementally grown random tree over a continuous configuration space.
//!
//! The tree owns every configuration it stores. Nodes are appended and never moved,
//! so node indices are stable for the lifetime of the tree and a node's parent always
//! has a smaller index than the node itself.
use crate::configuration::{self, Configuration};
use crate::error::{Error, Result};
use crate::nearest::{LinearSearch, NearestNeighbors};
use rand::Rng;
use tracing::{debug, trace};

// Relative slack on the step size when committing proposals.
const STEP_TOLERANCE: f64 = 1e-9;

/// Link structure for a node.
///
/// Configurations are kept in a separate vector so search strategies can index them.
#[derive(Debug, Clone)]
struct Node {
    // None for the root
    parent: Option<usize>,

    // Children in insertion order, used for depth first traversals.
    children: Vec<usize>,
}

/// A candidate extension of the tree returned by [`RandomTree::propose_towards`].
///
/// The proposal remembers the node it was extended from, so passing it to
/// [`RandomTree::commit`] attaches the new node without repeating the search.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    configuration: Configuration,
    distance: f64,
    parent: usize,
    reached: bool,
}

impl Proposal {
    /// The proposed configuration.
    #[must_use]
    pub fn configuration(&self) -> &[f64] {
        &self.configuration
    }

    #[must_use]
    pub fn into_configuration(self) -> Configuration {
        self.configuration
    }

    /// Zero if the target itself was proposed, otherwise the step size.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Index of the node the proposal extends.
    #[must_use]
    pub fn parent(&self) -> usize {
        self.parent
    }

    /// Whether the proposal is the target itself.
    #[must_use]
    pub fn reached_target(&self) -> bool {
        self.reached
    }
}

/// DFS Iterator over the node indices of a [`RandomTree`].
pub struct DepthFirstIterator<'a, S: NearestNeighbors> {
    tree: &'a RandomTree<S>,
    stack: Vec<usize>,
}

impl<S: NearestNeighbors> Iterator for DepthFirstIterator<'_, S> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        self.stack.pop().inspect(|&index| {
            // Reverse order so the earliest children are visited first
            self.stack.extend(self.tree.nodes[index].children.iter().rev());
        })
    }
}

/// Rapidly-exploring random tree.
///
/// Created with a root configuration and a fixed step size, then grown by proposing
/// extensions towards targets and committing the ones the caller accepts. Validity
/// and collision checking is left to the caller.
///
/// The nearest neighbor search is pluggable, see [`crate::nearest`].
///
/// ```
/// use rrtplanning::tree::RandomTree;
///
/// let mut tree = RandomTree::new(vec![0.0, 0.0], 1.0).unwrap();
/// let proposal = tree.propose_towards(&[2.0, 0.0]).unwrap();
/// assert_eq!(proposal.configuration(), &[1.0, 0.0]);
///
/// let index = tree.commit(proposal).unwrap();
/// assert_eq!(tree.parent(index).unwrap(), Some(0));
/// ```
#[derive(Debug, Clone)]
pub struct RandomTree<S: NearestNeighbors = LinearSearch> {
    configurations: Vec<Configuration>,
    nodes: Vec<Node>,
    search: S,
    step_size: f64,

    // Result of the most recent nearest neighbor search.
    last_nearest: Option<usize>,
}

impl RandomTree<LinearSearch> {
    /// Constructs a tree rooted at `initial` that searches neighbors with a linear scan.
    ///
    /// # Errors
    ///
    /// If `initial` is empty or not finite, or `step_size` is not a positive finite number.
    pub fn new(initial: Configuration, step_size: f64) -> Result<Self> {
        Self::with_search(initial, step_size, LinearSearch)
    }
}

impl<S: NearestNeighbors> RandomTree<S> {
    /// Constructs a tree rooted at `initial` with the specified search strategy.
    ///
    /// # Errors
    ///
    /// If `initial` is empty or not finite, or `step_size` is not a positive finite number.
    pub fn with_search(initial: Configuration, step_size: f64, mut search: S) -> Result<Self> {
        if initial.is_empty() {
            return Err(Error::InvalidArgument(
                "initial configuration must not be empty".to_string(),
            ));
        }
        if !step_size.is_finite() || step_size <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "step size must be positive, got {step_size}"
            )));
        }
        configuration::validate(&initial, initial.len())?;

        debug!(dimension = initial.len(), step_size, "Creating random tree");
        let configurations = vec![initial];

        // The strategy may still index the points of another tree
        search.clear();
        search.insert(0, &configurations);

        Ok(RandomTree {
            configurations,
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
            }],
            search,
            step_size,
            last_nearest: None,
        })
    }

    /// Maximum distance a single extension may travel.
    #[must_use]
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Dimension of every configuration in the tree.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.configurations[0].len()
    }

    /// Number of nodes in the tree, never less than one.
    #[must_use]
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Finds the node nearest to `query` and returns its index and distance.
    ///
    /// The result is remembered and available through [`RandomTree::nearest`].
    ///
    /// # Errors
    ///
    /// If `query` has the wrong dimension or non-finite coordinates.
    pub fn nearest_to(&mut self, query: &[f64]) -> Result<(usize, f64)> {
        configuration::validate(query, self.dimension())?;
        let (index, squared) = self
            .search
            .nearest(&self.configurations, query)
            .ok_or_else(|| Error::InvalidArgument("search returned no neighbor".to_string()))?;
        self.last_nearest = Some(index);
        Ok((index, squared.sqrt()))
    }

    /// Proposes a configuration at most one step from the tree towards `target`.
    ///
    /// If the nearest node is within a step of `target` the proposal is `target` with a
    /// distance of zero. Otherwise it lies exactly one step from the nearest node along
    /// the line to `target`, and the distance is the step size.
    ///
    /// # Errors
    ///
    /// If `target` has the wrong dimension or non-finite coordinates.
    pub fn propose_towards(&mut self, target: &[f64]) -> Result<Proposal> {
        let (nearest, dist) = self.nearest_to(target)?;
        let proposal = if dist <= self.step_size {
            Proposal {
                configuration: target.to_vec(),
                distance: 0.0,
                parent: nearest,
                reached: true,
            }
        } else {
            Proposal {
                configuration: configuration::steer(
                    &self.configurations[nearest],
                    target,
                    self.step_size,
                )?,
                distance: self.step_size,
                parent: nearest,
                reached: false,
            }
        };
        Ok(proposal)
    }

    /// Adds `configuration` as a child of its nearest node and returns the new index.
    ///
    /// The nearest node is always searched for again, so earlier queries have no effect
    /// on where the node is attached.
    ///
    /// # Errors
    ///
    /// If `configuration` has the wrong dimension or non-finite coordinates.
    pub fn add(&mut self, configuration: Configuration) -> Result<usize> {
        let (parent, _) = self.nearest_to(&configuration)?;
        Ok(self.push(configuration, parent))
    }

    /// Adds an accepted proposal as a child of the node it was extended from.
    ///
    /// Proposals are not tied to the tree that made them. One from another tree is
    /// accepted as long as it is a valid extension of the node it names here.
    ///
    /// # Errors
    ///
    /// If the proposal does not fit this tree: wrong dimension, unknown parent, or a
    /// configuration more than one step away from the parent.
    pub fn commit(&mut self, proposal: Proposal) -> Result<usize> {
        configuration::validate(&proposal.configuration, self.dimension())?;
        self.check_index(proposal.parent)?;

        // Steering lands on the step boundary up to rounding
        let reach = self.step_size * (1.0 + STEP_TOLERANCE);
        let dist = configuration::distance(
            &self.configurations[proposal.parent],
            &proposal.configuration,
        )?;
        if dist > reach {
            return Err(Error::InvalidArgument(format!(
                "proposal is {dist} from node {}, more than a step of {}",
                proposal.parent, self.step_size
            )));
        }
        Ok(self.push(proposal.configuration, proposal.parent))
    }

    fn push(&mut self, configuration: Configuration, parent: usize) -> usize {
        let index = self.nodes.len();
        self.configurations.push(configuration);
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(index);
        self.search.insert(index, &self.configurations);
        trace!(index, parent, "Added node");
        index
    }

    /// Index of the node found by the most recent nearest neighbor search.
    ///
    /// # Errors
    ///
    /// If no search has been made yet.
    pub fn nearest(&self) -> Result<usize> {
        self.last_nearest.ok_or(Error::NoQueryYet)
    }

    /// Parent of node `index`, `None` for the root.
    ///
    /// # Errors
    ///
    /// If `index` is not in the tree.
    pub fn parent(&self, index: usize) -> Result<Option<usize>> {
        self.check_index(index)?;
        Ok(self.nodes[index].parent)
    }

    /// Returns a copy of the configuration of node `index`.
    ///
    /// # Errors
    ///
    /// If `index` is not in the tree.
    pub fn node(&self, index: usize) -> Result<Configuration> {
        self.check_index(index)?;
        Ok(self.configurations[index].clone())
    }

    /// Draws a node index uniformly at random.
    pub fn random_index<R: Rng>(&self, rng: &mut R) -> usize {
        rng.gen_range(0..self.size())
    }

    /// Returns a copy of a uniformly drawn node's configuration.
    pub fn random_node<R: Rng>(&self, rng: &mut R) -> Configuration {
        self.configurations[self.random_index(rng)].clone()
    }

    /// Like [`RandomTree::random_node`] but writes into `out`, reusing its allocation.
    pub fn random_node_into<R: Rng>(&self, rng: &mut R, out: &mut Configuration) {
        let index = self.random_index(rng);
        out.clear();
        out.extend_from_slice(&self.configurations[index]);
    }

    /// Returns the configurations from the root to node `index`.
    ///
    /// # Errors
    ///
    /// If `index` is not in the tree.
    pub fn path(&self, index: usize) -> Result<Vec<Configuration>> {
        self.check_index(index)?;

        // Walk up to the root, then reverse it to get the path in order
        let mut path = Vec::new();
        let mut current = Some(index);
        while let Some(idx) = current {
            path.push(self.configurations[idx].clone());
            current = self.nodes[idx].parent;
        }
        path.reverse();
        Ok(path)
    }

    /// Returns a [`DepthFirstIterator`] over node indices, starting at the root.
    #[must_use]
    pub fn iter_depth_first(&self) -> DepthFirstIterator<'_, S> {
        DepthFirstIterator {
            tree: self,
            stack: vec![0],
        }
    }

    /// All `(parent, child)` pairs in insertion order of the child.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(child, node)| node.parent.map(|parent| (parent, child)))
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.size() {
            return Err(Error::OutOfRange {
                index,
                size: self.size(),
            });
        }
        Ok(())
    }
}

//
// Unit tests
//
