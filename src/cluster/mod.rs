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

//! Clustering models that feed the anomaly engine.
//!
//! The engine only ever sees a [`ClusterModel`]: an ordered set of centroids
//! and a way to assign points to them. Which algorithm produced it is chosen
//! by [`ClusterConfig`].

pub mod bisecting;
pub mod gaussian;
mod init;
pub mod kmeans;

use crate::anomaly::distance::squared_distance;
use crate::core::{Assignment, Centroid, ClusterId, Point, ScoreError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use bisecting::fit_bisecting;
pub use gaussian::{fit_gaussian_mixture, GaussianMixtureModel};
pub use kmeans::{fit_kmeans, CentroidModel};

/// Reasons a model could not be fitted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClusterError {
    #[error("cannot fit a model on an empty training set")]
    EmptyTrainingSet,

    #[error("k must be at least 1")]
    InvalidK,

    #[error("need at least {k} training points for {k} clusters, got {points}")]
    InsufficientPoints { k: usize, points: usize },

    #[error("training point {index} has a NaN or infinite coordinate")]
    NonFinitePoint { index: usize },

    #[error(transparent)]
    Score(#[from] ScoreError),
}

/// A trained clustering model.
///
/// `k` is fixed for the lifetime of the model and equals the number of
/// centroids; every cluster id it hands out lies in `0..k`.
pub trait ClusterModel: Send + Sync + fmt::Debug {
    /// Centroids ordered by cluster id
    fn centroids(&self) -> &[Centroid];

    /// Cluster id for a single point
    fn predict(&self, point: &Point) -> Result<ClusterId, ScoreError>;

    fn k(&self) -> usize {
        self.centroids().len()
    }

    /// Assign every point, preserving input order
    fn assign(&self, points: &[Point]) -> Result<Vec<Assignment>, ScoreError> {
        profiling::scope!("ClusterModel::assign");
        points
            .par_iter()
            .map(|p| self.predict(p).map(|cluster| Assignment::new(p.clone(), cluster)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum AlgorithmKind {
    /// Lloyd's k-means with k-means++ seeding
    #[value(name = "kmeans")]
    #[serde(rename = "kmeans")]
    KMeans,
    /// Top-down divisive k-means
    #[value(name = "bisecting-kmeans")]
    #[serde(rename = "bisecting-kmeans")]
    BisectingKMeans,
    /// Diagonal-covariance Gaussian mixture fitted with EM
    #[value(name = "gmm")]
    #[serde(rename = "gmm")]
    GaussianMixture,
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::KMeans => "kmeans",
            Self::BisectingKMeans => "bisecting-kmeans",
            Self::GaussianMixture => "gmm",
        };
        f.write_str(name)
    }
}

/// One clustering configuration: an algorithm, a k and its training knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub algorithm: AlgorithmKind,
    pub k: usize,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

const fn default_max_iterations() -> usize {
    20
}

const fn default_tolerance() -> f64 {
    1e-4
}

const fn default_seed() -> u64 {
    42
}

impl ClusterConfig {
    #[must_use]
    pub const fn new(algorithm: AlgorithmKind, k: usize) -> Self {
        Self {
            algorithm,
            k,
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            seed: default_seed(),
        }
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Short human-readable name, e.g. `kmeans k=10`
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} k={}", self.algorithm, self.k)
    }

    /// Train a model on `points`
    pub fn fit(&self, points: &[Point]) -> Result<Box<dyn ClusterModel>, ClusterError> {
        profiling::scope!("ClusterConfig::fit");
        validate_training_set(points, self.k)?;
        tracing::info!(
            algorithm = %self.algorithm,
            k = self.k,
            points = points.len(),
            dim = points[0].dim(),
            "fitting clustering model"
        );

        let model: Box<dyn ClusterModel> = match self.algorithm {
            AlgorithmKind::KMeans => Box::new(fit_kmeans(points, self)),
            AlgorithmKind::BisectingKMeans => Box::new(fit_bisecting(points, self)),
            AlgorithmKind::GaussianMixture => Box::new(fit_gaussian_mixture(points, self)),
        };
        Ok(model)
    }
}

fn validate_training_set(points: &[Point], k: usize) -> Result<(), ClusterError> {
    if k == 0 {
        return Err(ClusterError::InvalidK);
    }
    let Some(first) = points.first() else {
        return Err(ClusterError::EmptyTrainingSet);
    };
    if points.len() < k {
        return Err(ClusterError::InsufficientPoints {
            k,
            points: points.len(),
        });
    }
    if let Some(odd) = points.iter().find(|p| p.dim() != first.dim()) {
        return Err(ScoreError::DimensionMismatch {
            expected: first.dim(),
            found: odd.dim(),
        }
        .into());
    }
    if let Some(index) = points.iter().position(|p| p.iter().any(|x| !x.is_finite())) {
        return Err(ClusterError::NonFinitePoint { index });
    }
    Ok(())
}

/// Index of the centroid closest to `point`, without a dimension check
pub(crate) fn nearest_index(centroids: &[Centroid], point: &[f64]) -> ClusterId {
    centroids
        .iter()
        .map(|c| squared_distance(c, point))
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(0, |(idx, _)| idx)
}

/// Index of the centroid closest to `point`
pub(crate) fn nearest(centroids: &[Centroid], point: &Point) -> Result<ClusterId, ScoreError> {
    let Some(first) = centroids.first() else {
        return Err(ScoreError::UnknownCluster { cluster: 0, k: 0 });
    };
    if first.dim() != point.dim() {
        return Err(ScoreError::DimensionMismatch {
            expected: first.dim(),
            found: point.dim(),
        });
    }
    Ok(nearest_index(centroids, point))
}
