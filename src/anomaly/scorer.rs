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

use crate::anomaly::stats::{accumulate, ClusterStats};
use crate::core::{Assignment, Centroid, ScoreError};
use serde::{Deserialize, Serialize};

/// Fit quality of a clustering, lower is better
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterQuality {
    /// Mean member distance per cluster (0 for empty clusters)
    pub per_cluster: Vec<f64>,
    /// Number of assignments per cluster
    pub sizes: Vec<usize>,
    /// Mean of `per_cluster`, every cluster weighted equally
    pub overall: f64,
}

impl ClusterQuality {
    /// Clusters that received no assignments
    pub fn empty_clusters(&self) -> impl Iterator<Item = usize> + '_ {
        self.sizes
            .iter()
            .enumerate()
            .filter(|(_, &size)| size == 0)
            .map(|(cluster, _)| cluster)
    }
}

/// Measures how tightly assignments sit around their centroids
pub struct ClusterScorer;

impl ClusterScorer {
    /// Mean over all k clusters of the mean member-to-centroid distance
    pub fn score(centroids: &[Centroid], assignments: &[Assignment]) -> Result<f64, ScoreError> {
        Self::quality(centroids, assignments).map(|q| q.overall)
    }

    /// Per-cluster breakdown behind [`ClusterScorer::score`].
    ///
    /// An empty cluster contributes exactly 0 and still counts toward the
    /// k-way average.
    pub fn quality(
        centroids: &[Centroid],
        assignments: &[Assignment],
    ) -> Result<ClusterQuality, ScoreError> {
        profiling::scope!("ClusterScorer::quality");
        let stats = accumulate(centroids, assignments)?;

        let per_cluster: Vec<f64> = stats.iter().map(ClusterStats::mean).collect();
        let sizes: Vec<usize> = stats.iter().map(|s| s.count).collect();
        let overall = if per_cluster.is_empty() {
            0.0
        } else {
            per_cluster.iter().sum::<f64>() / per_cluster.len() as f64
        };

        let quality = ClusterQuality {
            per_cluster,
            sizes,
            overall,
        };
        let empty = quality.empty_clusters().count();
        if empty > 0 {
            tracing::warn!(
                empty,
                k = centroids.len(),
                "clusters without members count as 0 in the quality score"
            );
        }
        Ok(quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Point;

    #[test]
    fn test_mean_of_cluster_means() {
        let centroids = vec![Point::from([0.0, 0.0]), Point::from([10.0, 0.0])];
        let assignments = vec![
            Assignment::new(Point::from([1.0, 0.0]), 0),
            Assignment::new(Point::from([3.0, 0.0]), 0),
            Assignment::new(Point::from([16.0, 0.0]), 1),
        ];

        let quality = ClusterScorer::quality(&centroids, &assignments).unwrap();
        assert_eq!(quality.per_cluster, vec![2.0, 6.0]);
        assert_eq!(quality.sizes, vec![2, 1]);
        assert_eq!(quality.overall, 4.0);
    }

    #[test]
    fn test_empty_cluster_counts_as_zero() {
        let centroids = vec![Point::from([0.0, 0.0]), Point::from([10.0, 10.0])];
        let assignments = vec![
            Assignment::new(Point::from([0.0, 0.0]), 0),
            Assignment::new(Point::from([3.0, 4.0]), 0),
        ];

        let quality = ClusterScorer::quality(&centroids, &assignments).unwrap();
        assert_eq!(quality.per_cluster[1], 0.0);
        // (2.5 + 0.0) / 2, the empty cluster is not skipped
        assert_eq!(quality.overall, 1.25);
        assert_eq!(quality.empty_clusters().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_no_clusters_scores_zero() {
        assert_eq!(ClusterScorer::score(&[], &[]), Ok(0.0));
    }

    #[test]
    fn test_no_assignments_is_not_nan() {
        let centroids = vec![Point::from([1.0]), Point::from([2.0])];
        let score = ClusterScorer::score(&centroids, &[]).unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_nan_distance_is_an_error_not_a_score() {
        let centroids = vec![Point::from([0.0, 0.0])];
        let assignments = vec![
            Assignment::new(Point::from([3.0, 4.0]), 0),
            Assignment::new(Point::from([f64::NAN, 0.0]), 0),
        ];
        assert_eq!(
            ClusterScorer::score(&centroids, &assignments),
            Err(ScoreError::NonFiniteDistance)
        );
    }

    #[test]
    fn test_dimension_mismatch_propagates() {
        let centroids = vec![Point::from([0.0, 0.0])];
        let assignments = vec![Assignment::new(Point::from([1.0]), 0)];
        assert_eq!(
            ClusterScorer::score(&centroids, &assignments),
            Err(ScoreError::DimensionMismatch {
                expected: 2,
                found: 1
            })
        );
    }
}
