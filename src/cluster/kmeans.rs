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

use crate::anomaly::distance::squared_distance;
use crate::cluster::init::plus_plus;
use crate::cluster::{nearest, nearest_index, ClusterConfig, ClusterModel};
use crate::core::{Centroid, ClusterId, Point, ScoreError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// A model that assigns each point to its nearest centroid
#[derive(Debug, Clone)]
pub struct CentroidModel {
    centroids: Vec<Centroid>,
}

impl CentroidModel {
    #[must_use]
    pub const fn new(centroids: Vec<Centroid>) -> Self {
        Self { centroids }
    }
}

impl ClusterModel for CentroidModel {
    fn centroids(&self) -> &[Centroid] {
        &self.centroids
    }

    fn predict(&self, point: &Point) -> Result<ClusterId, ScoreError> {
        nearest(&self.centroids, point)
    }
}

/// Result of running Lloyd iterations to convergence
pub(crate) struct LloydOutcome {
    pub centroids: Vec<Centroid>,
    pub labels: Vec<ClusterId>,
    pub iterations: usize,
}

/// Fit k-means with k-means++ seeding.
///
/// The training set must already be validated (non-empty, `k <= len`,
/// uniform dimension).
pub fn fit_kmeans(points: &[Point], config: &ClusterConfig) -> CentroidModel {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let initial = plus_plus(points, config.k, &mut rng);
    let outcome = lloyd(points, initial, config.max_iterations, config.tolerance);

    tracing::info!(
        k = config.k,
        iterations = outcome.iterations,
        "k-means finished"
    );
    CentroidModel::new(outcome.centroids)
}

/// Alternate assignment and mean update until no centroid moves by
/// `tolerance` or more, or `max_iterations` is reached.
///
/// A centroid that loses all its members stays where it was.
pub(crate) fn lloyd(
    points: &[Point],
    mut centroids: Vec<Centroid>,
    max_iterations: usize,
    tolerance: f64,
) -> LloydOutcome {
    profiling::scope!("lloyd");
    let dim = centroids.first().map_or(0, Point::dim);
    let mut labels = assign_labels(points, &centroids);
    let mut iterations = 0;

    while iterations < max_iterations {
        iterations += 1;

        let mut sums = vec![vec![0.0; dim]; centroids.len()];
        let mut counts = vec![0usize; centroids.len()];
        for (point, &label) in points.iter().zip(&labels) {
            counts[label] += 1;
            for (s, x) in sums[label].iter_mut().zip(point.iter()) {
                *s += x;
            }
        }

        let mut max_shift: f64 = 0.0;
        for (cluster, (sum, count)) in sums.into_iter().zip(counts).enumerate() {
            if count == 0 {
                continue;
            }
            let mean: Vec<f64> = sum.into_iter().map(|s| s / count as f64).collect();
            let shift = squared_distance(&mean, &centroids[cluster]).sqrt();
            max_shift = max_shift.max(shift);
            centroids[cluster] = Point::new(mean);
        }

        labels = assign_labels(points, &centroids);
        tracing::debug!(iteration = iterations, max_shift, "lloyd step");

        if max_shift < tolerance {
            break;
        }
    }

    LloydOutcome {
        centroids,
        labels,
        iterations,
    }
}

fn assign_labels(points: &[Point], centroids: &[Centroid]) -> Vec<ClusterId> {
    points
        .par_iter()
        .map(|p| nearest_index(centroids, p))
        .collect()
}
