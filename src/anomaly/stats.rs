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

//! Per-cluster distance accumulators shared by the scorer and the estimator.

use crate::core::{Assignment, Centroid, ScoreError};
use rayon::prelude::*;

/// Running count, sum and maximum of the distances seen for one cluster
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClusterStats {
    pub count: usize,
    pub sum: f64,
    pub max: f64,
}

impl ClusterStats {
    fn push(&mut self, distance: f64) {
        self.count += 1;
        self.sum += distance;
        self.max = self.max.max(distance);
    }

    fn merge(self, other: Self) -> Self {
        Self {
            count: self.count + other.count,
            sum: self.sum + other.sum,
            max: self.max.max(other.max),
        }
    }

    /// Mean distance, 0 for a cluster without members
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Fold every assignment's distance into one accumulator per centroid.
///
/// Partitions of `assignments` are folded in parallel and the partial tables
/// are merged afterwards. The result always has `centroids.len()` entries.
pub fn accumulate(
    centroids: &[Centroid],
    assignments: &[Assignment],
) -> Result<Vec<ClusterStats>, ScoreError> {
    profiling::scope!("accumulate");
    let k = centroids.len();

    assignments
        .par_iter()
        .try_fold(
            || vec![ClusterStats::default(); k],
            |mut acc: Vec<ClusterStats>, assignment| -> Result<_, ScoreError> {
                let d = assignment.distance_to(centroids)?;
                acc[assignment.cluster()].push(d);
                Ok(acc)
            },
        )
        .try_reduce(
            || vec![ClusterStats::default(); k],
            |mut left: Vec<ClusterStats>, right| -> Result<_, ScoreError> {
                for (l, r) in left.iter_mut().zip(right) {
                    *l = l.merge(r);
                }
                Ok(left)
            },
        )
}
