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

use crate::anomaly::stats::accumulate;
use crate::core::{Assignment, Centroid, ClusterThresholdTable, ScoreError};

/// Derives the anomaly envelope of every cluster from training assignments.
///
/// The threshold of a cluster is the largest distance any of its training
/// members has to the centroid, or 0 when the cluster has no members. Only
/// feed it reference data, never the data about to be classified.
pub struct ThresholdEstimator;

impl ThresholdEstimator {
    pub fn estimate(
        centroids: &[Centroid],
        assignments: &[Assignment],
    ) -> Result<ClusterThresholdTable, ScoreError> {
        profiling::scope!("ThresholdEstimator::estimate");
        let stats = accumulate(centroids, assignments)?;

        for (cluster, _) in stats.iter().enumerate().filter(|(_, s)| s.is_empty()) {
            tracing::warn!(cluster, "no training points, threshold is 0");
        }

        let table = ClusterThresholdTable::from_vec(stats.iter().map(|s| s.max).collect());
        tracing::info!(k = table.len(), "estimated cluster thresholds");
        tracing::debug!(thresholds = ?table.as_slice(), "threshold table");
        Ok(table)
    }
}
