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

//! Euclidean geometry over configuration vectors.
//!
//! A configuration is a point in a fixed-dimension real space, e.g. a joint-angle vector.
//! All functions here check that their inputs share a dimension and fail with
//! [`Error::InvalidArgument`] otherwise.
use crate::error::{Error, Result};

/// A point in configuration space.
pub type Configuration = Vec<f64>;

/// Squared Euclidean distance between two configurations.
///
/// # Errors
///
/// If `a` and `b` have different dimensions.
pub fn distance_squared(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(Error::dimension_mismatch(a.len(), b.len()));
    }
    Ok(squared_unchecked(a, b))
}

/// Euclidean distance between two configurations.
///
/// # Errors
///
/// If `a` and `b` have different dimensions.
pub fn distance(a: &[f64], b: &[f64]) -> Result<f64> {
    distance_squared(a, b).map(f64::sqrt)
}

/// Returns the configuration at most `step_size` along the straight line from `from` to `to`.
///
/// If `to` is within reach it is returned as is.
///
/// # Errors
///
/// If the configurations have different dimensions, if their distance overflows `f64`,
/// or if a step of `step_size` is too small to move away from `from` at its magnitude.
pub fn steer(from: &[f64], to: &[f64], step_size: f64) -> Result<Configuration> {
    let length = distance(from, to)?;
    if length <= step_size {
        return Ok(to.to_vec());
    }
    if !length.is_finite() {
        return Err(Error::InvalidArgument(
            "distance between configurations is not representable".to_string(),
        ));
    }
    let scale = step_size / length;
    let next: Configuration = from
        .iter()
        .zip(to)
        .map(|(f, t)| f + (t - f) * scale)
        .collect();
    if squared_unchecked(&next, from) <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "step size {step_size} is below the resolution of the configuration"
        )));
    }
    Ok(next)
}

/// Checks that `config` has the expected dimension and only finite coordinates.
///
/// # Errors
///
/// If the dimension does not match or any coordinate is NaN or infinite.
pub fn validate(config: &[f64], dimension: usize) -> Result<()> {
    if config.len() != dimension {
        return Err(Error::dimension_mismatch(dimension, config.len()));
    }
    if let Some(bad) = config.iter().find(|v| !v.is_finite()) {
        return Err(Error::InvalidArgument(format!(
            "configuration contains a non-finite coordinate: {bad}"
        )));
    }
    Ok(())
}

// Callers must guarantee equal lengths.
pub(crate) fn squared_unchecked(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
