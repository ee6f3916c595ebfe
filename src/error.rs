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

//! Error types shared by the tree, the search strategies and the planners.
use thiserror::Error as ThisError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum Error {
    /// Bad constructor parameters, mismatched dimensions or non-finite coordinates.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("node index {index} is out of range for a tree of {size} nodes")]
    OutOfRange { index: usize, size: usize },

    /// The nearest node was requested before any nearest neighbor search ran.
    #[error("no nearest neighbor query has been made yet")]
    NoQueryYet,

    #[error("failed to find a path after {iterations} iterations")]
    PathNotFound { iterations: u64 },
}

impl Error {
    pub(crate) fn dimension_mismatch(expected: usize, found: usize) -> Self {
        Error::InvalidArgument(format!(
            "expected a configuration of dimension {expected}, found {found}"
        ))
    }
}
