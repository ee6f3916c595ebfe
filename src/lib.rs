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

//! Rapidly-exploring random trees for motion planning.
//!
//! [`tree::RandomTree`] is the incremental data structure: it stores configurations
//! and parent links, answers nearest neighbor queries and proposes step limited
//! extensions. Collision checking stays with the caller. [`planning::rrt`] drives a
//! tree towards a goal for the common case.
pub mod configuration;
pub mod error;
pub mod nearest;
pub mod planning;
pub mod tree;

pub use configuration::Configuration;
pub use error::{Error, Result};
pub use nearest::{KdTree, LinearSearch, NearestNeighbors};
pub use tree::{Proposal, RandomTree};
