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

use serde::{Deserialize, Serialize};

/// Per-feature statistics learned from training vectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedScaler {
    /// `(x - mean) / std_dev`
    Standard { mean: Vec<f64>, std_dev: Vec<f64> },
    /// `(x - min) / (max - min)`
    MinMax { min: Vec<f64>, max: Vec<f64> },
}

impl FittedScaler {
    pub fn fit_standard(rows: &[Vec<f64>]) -> Self {
        let dim = rows.first().map_or(0, Vec::len);
        let n = rows.len().max(1) as f64;

        let mut mean = vec![0.0; dim];
        for row in rows {
            for (m, x) in mean.iter_mut().zip(row) {
                *m += x / n;
            }
        }
        let mut var = vec![0.0; dim];
        for row in rows {
            for ((v, x), m) in var.iter_mut().zip(row).zip(&mean) {
                *v += (x - m) * (x - m) / n;
            }
        }
        Self::Standard {
            mean,
            std_dev: var.into_iter().map(f64::sqrt).collect(),
        }
    }

    pub fn fit_min_max(rows: &[Vec<f64>]) -> Self {
        let dim = rows.first().map_or(0, Vec::len);
        let mut min = vec![f64::INFINITY; dim];
        let mut max = vec![f64::NEG_INFINITY; dim];
        for row in rows {
            for ((lo, hi), &x) in min.iter_mut().zip(max.iter_mut()).zip(row) {
                *lo = lo.min(x);
                *hi = hi.max(x);
            }
        }
        Self::MinMax { min, max }
    }

    /// Scale one vector. Features with no spread in training map to 0.
    pub fn apply(&self, row: &mut [f64]) {
        match self {
            Self::Standard { mean, std_dev } => {
                for ((x, m), s) in row.iter_mut().zip(mean).zip(std_dev) {
                    *x = if *s > 0.0 { (*x - m) / s } else { 0.0 };
                }
            }
            Self::MinMax { min, max } => {
                for ((x, lo), hi) in row.iter_mut().zip(min).zip(max) {
                    let range = hi - lo;
                    *x = if range > 0.0 { (*x - lo) / range } else { 0.0 };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scaling() {
        let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
        let scaler = FittedScaler::fit_standard(&rows);

        let mut row = vec![3.0, 5.0];
        scaler.apply(&mut row);
        assert_eq!(row, vec![1.0, 0.0]);

        let mut row = vec![0.0, 7.0];
        scaler.apply(&mut row);
        assert_eq!(row, vec![-2.0, 0.0]);
    }

    #[test]
    fn test_min_max_scaling() {
        let rows = vec![vec![10.0, 1.0], vec![20.0, 1.0], vec![15.0, 1.0]];
        let scaler = FittedScaler::fit_min_max(&rows);

        let mut row = vec![15.0, 9.0];
        scaler.apply(&mut row);
        assert_eq!(row, vec![0.5, 0.0]);

        // Values outside the training range are not clamped
        let mut row = vec![30.0, 1.0];
        scaler.apply(&mut row);
        assert_eq!(row, vec![2.0, 0.0]);
    }
}
