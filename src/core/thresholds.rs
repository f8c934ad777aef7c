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

//! Per-cluster anomaly envelope radii.

use crate::core::error::ScoreError;
use crate::core::point::ClusterId;
use serde::{Deserialize, Serialize};

/// Dense table mapping every cluster of a trained model to its threshold.
///
/// Built once from training distances and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterThresholdTable {
    thresholds: Vec<f64>,
}

impl ClusterThresholdTable {
    pub(crate) const fn from_vec(thresholds: Vec<f64>) -> Self {
        Self { thresholds }
    }

    /// Threshold for `cluster`, or `UnknownCluster` if the table has no such key
    pub fn get(&self, cluster: ClusterId) -> Result<f64, ScoreError> {
        self.thresholds
            .get(cluster)
            .copied()
            .ok_or(ScoreError::UnknownCluster {
                cluster,
                k: self.thresholds.len(),
            })
    }

    /// Number of clusters covered (the model's k)
    #[must_use]
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Iterate `(cluster, threshold)` pairs in cluster order
    pub fn iter(&self) -> impl Iterator<Item = (ClusterId, f64)> + '_ {
        self.thresholds.iter().copied().enumerate()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.thresholds
    }
}
