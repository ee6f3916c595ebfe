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

//! Nearest neighbor search strategies for a growing set of configurations.
//!
//! Strategies index into configuration storage owned by the caller; they never hold
//! configurations themselves. Every strategy must answer queries identically: the
//! closest point under the Euclidean metric, with ties resolved to the lowest index.
use crate::configuration::{squared_unchecked, Configuration};
use ordered_float::OrderedFloat;
use tracing::debug;

/// Pluggable nearest neighbor search over tree-owned points.
pub trait NearestNeighbors {
    /// Forgets every indexed point.
    fn clear(&mut self);

    /// Notifies the strategy that `points[index]` has been appended.
    fn insert(&mut self, index: usize, points: &[Configuration]);

    /// Returns the index of the point closest to `query` and its squared distance.
    ///
    /// `query` must have the same dimension as the stored points. Returns `None` when
    /// `points` is empty.
    fn nearest(&self, points: &[Configuration], query: &[f64]) -> Option<(usize, f64)>;
}

/// Brute force scan over every point.
///
/// Linear in the number of points, which is fine for the few thousand nodes of an
/// interactive planning problem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinearSearch;

impl NearestNeighbors for LinearSearch {
    fn clear(&mut self) {}

    fn insert(&mut self, _index: usize, _points: &[Configuration]) {}

    fn nearest(&self, points: &[Configuration], query: &[f64]) -> Option<(usize, f64)> {
        // min_by_key keeps the first of equal elements
        points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, squared_unchecked(p, query)))
            .min_by_key(|&(_, d)| OrderedFloat(d))
    }
}

// The first rebuild after the root happens at this many points, later ones whenever
// the count doubles.
const MIN_REBUILD_SIZE: usize = 32;

#[derive(Debug, Clone)]
struct KdNode {
    // Index of the point in the caller's storage
    point: usize,
    axis: usize,
    left: Option<usize>,
    right: Option<usize>,
}

/// Incrementally updated k-d tree.
///
/// New points descend to a leaf. Once the number of points has doubled since the last
/// rebuild the whole index is rebuilt with median splits, which keeps the tree
/// reasonably balanced at an amortized `O(log n)` cost per insert.
#[derive(Debug, Default, Clone)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    root: Option<usize>,
    rebuild_at: usize,
}

impl KdTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Length of the longest root to leaf chain.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(usize, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            let n = &self.nodes[node];
            stack.extend(n.left.iter().chain(n.right.iter()).map(|&c| (c, depth + 1)));
        }
        deepest
    }

    /// Discards the index and rebuilds it from the first `count` points.
    fn rebuild(&mut self, points: &[Configuration], count: usize) {
        debug!(count, "Rebuilding k-d tree");
        self.nodes.clear();
        self.nodes.reserve(count);
        let mut indices: Vec<usize> = (0..count).collect();
        self.root = self.build(&mut indices, points);
        self.rebuild_at = (count * 2).max(MIN_REBUILD_SIZE);
    }

    fn build(&mut self, indices: &mut [usize], points: &[Configuration]) -> Option<usize> {
        if indices.is_empty() {
            return None;
        }

        // Split along the axis with the largest spread
        let dimension = points[indices[0]].len();
        let axis = (0..dimension)
            .max_by_key(|&a| {
                let (lo, hi) = indices.iter().fold((f64::MAX, f64::MIN), |(lo, hi), &i| {
                    (lo.min(points[i][a]), hi.max(points[i][a]))
                });
                OrderedFloat(hi - lo)
            })
            .unwrap_or(0);

        // Median split, everything left is <= the pivot and everything right is >= it
        let mid = indices.len() / 2;
        indices.select_nth_unstable_by(mid, |&a, &b| points[a][axis].total_cmp(&points[b][axis]));

        let node_idx = self.nodes.len();
        self.nodes.push(KdNode {
            point: indices[mid],
            axis,
            left: None,
            right: None,
        });

        let (left, rest) = indices.split_at_mut(mid);
        let right = &mut rest[1..];
        let left = self.build(left, points);
        let right = self.build(right, points);
        self.nodes[node_idx].left = left;
        self.nodes[node_idx].right = right;
        Some(node_idx)
    }

    /// Descends to a leaf and attaches the point there.
    fn attach(&mut self, index: usize, points: &[Configuration]) {
        let point = &points[index];
        let new_idx = self.nodes.len();
        let Some(mut current) = self.root else {
            self.nodes.push(KdNode {
                point: index,
                axis: 0,
                left: None,
                right: None,
            });
            self.root = Some(new_idx);
            return;
        };

        loop {
            let node = &self.nodes[current];
            let axis = node.axis;
            let go_left = point[axis] < points[node.point][axis];
            let child = if go_left { node.left } else { node.right };
            match child {
                Some(next) => current = next,
                None => {
                    self.nodes.push(KdNode {
                        point: index,
                        axis: (axis + 1) % point.len(),
                        left: None,
                        right: None,
                    });
                    if go_left {
                        self.nodes[current].left = Some(new_idx);
                    } else {
                        self.nodes[current].right = Some(new_idx);
                    }
                    return;
                }
            }
        }
    }
}

impl NearestNeighbors for KdTree {
    fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.rebuild_at = 0;
    }

    fn insert(&mut self, index: usize, points: &[Configuration]) {
        let count = index + 1;
        if count >= self.rebuild_at {
            self.rebuild(points, count);
        } else {
            self.attach(index, points);
        }
    }

    fn nearest(&self, points: &[Configuration], query: &[f64]) -> Option<(usize, f64)> {
        let root = self.root?;
        let mut best: Option<(usize, f64)> = None;

        // Pairs of node and a lower bound on the squared distance to anything below it.
        // Explicit stack since the tree may be unbalanced between rebuilds.
        let mut stack = vec![(root, 0.0_f64)];
        while let Some((node, bound)) = stack.pop() {
            if let Some((_, best_dist)) = best {
                // Equal bounds are still visited so ties resolve to the lowest index
                if bound > best_dist {
                    continue;
                }
            }

            let n = &self.nodes[node];
            let dist = squared_unchecked(&points[n.point], query);
            let better = match best {
                None => true,
                Some((best_idx, best_dist)) => {
                    (OrderedFloat(dist), n.point) < (OrderedFloat(best_dist), best_idx)
                }
            };
            if better {
                best = Some((n.point, dist));
            }

            let diff = query[n.axis] - points[n.point][n.axis];
            let (near, far) = if diff < 0.0 {
                (n.left, n.right)
            } else {
                (n.right, n.left)
            };

            // Push far first so the near side is searched first
            if let Some(f) = far {
                stack.push((f, diff * diff));
            }
            if let Some(c) = near {
                stack.push((c, bound));
            }
        }
        best
    }
}
