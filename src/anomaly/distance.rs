// FlowCrab - GPL-3.0-or-later
// This file is part of FlowCrab.
//
// Copyright (C) 2025 Daniel Freiermuth
//
// FlowCrab is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// FlowCrab is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with FlowCrab.  If not, see <https://www.gnu.org/licenses/>.

use crate::core::error::ScoreError;

/// Euclidean distance between a centroid and a point.
///
/// This is the only distance law in the crate; quality scores, thresholds
/// and classification all go through it so their numbers stay comparable.
/// A NaN or infinite result is an error, never a value.
pub fn distance(centroid: &[f64], point: &[f64]) -> Result<f64, ScoreError> {
    if centroid.len() != point.len() {
        return Err(ScoreError::DimensionMismatch {
            expected: centroid.len(),
            found: point.len(),
        });
    }
    let d = squared_distance(centroid, point).sqrt();
    if d.is_finite() {
        Ok(d)
    } else {
        Err(ScoreError::NonFiniteDistance)
    }
}

/// Sum of squared coordinate differences, without the length check.
///
/// Used by the clustering algorithms for nearest-centroid searches where both
/// sides are already known to share a dimension.
pub(crate) fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_four_five() {
        assert_eq!(distance(&[0.0, 0.0], &[3.0, 4.0]), Ok(5.0));
    }

    #[test]
    fn test_symmetry() {
        let a = [1.5, -2.0, 7.25];
        let b = [-3.0, 0.5, 2.0];
        assert_eq!(distance(&a, &b), distance(&b, &a));
    }

    #[test]
    fn test_identity() {
        let c = [0.3, 12.0, -4.0, 1e-9];
        assert_eq!(distance(&c, &c), Ok(0.0));
    }

    #[test]
    fn test_dimension_mismatch() {
        assert_eq!(
            distance(&[0.0, 0.0], &[1.0, 2.0, 3.0]),
            Err(ScoreError::DimensionMismatch {
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn test_non_finite_is_an_error() {
        assert_eq!(
            distance(&[0.0, 0.0], &[f64::NAN, 0.0]),
            Err(ScoreError::NonFiniteDistance)
        );
        assert_eq!(
            distance(&[f64::INFINITY], &[0.0]),
            Err(ScoreError::NonFiniteDistance)
        );
        assert_eq!(
            distance(&[-f64::MAX], &[f64::MAX]),
            Err(ScoreError::NonFiniteDistance)
        );
    }

    #[test]
    fn test_zero_dimensional() {
        assert_eq!(distance(&[], &[]), Ok(0.0));
    }
}
