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

//! Gaussian mixture with diagonal covariances, fitted by expectation maximization.

use crate::cluster::init::plus_plus;
use crate::cluster::{ClusterConfig, ClusterModel};
use crate::core::{Centroid, ClusterId, Point, ScoreError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::f64::consts::PI;

/// Lower bound on every per-dimension variance, keeps densities finite
const VARIANCE_FLOOR: f64 = 1e-6;

/// Components whose total responsibility drops below this keep their old
/// parameters
const MIN_COMPONENT_MASS: f64 = 1e-10;

#[derive(Debug, Clone)]
pub struct GaussianMixtureModel {
    weights: Vec<f64>,
    means: Vec<Centroid>,
    variances: Vec<Vec<f64>>,
}

impl GaussianMixtureModel {
    /// Mixing weight of every component
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Per-dimension variance of every component
    #[must_use]
    pub fn variances(&self) -> &[Vec<f64>] {
        &self.variances
    }

    /// `ln(weight_j) + ln N(x | mean_j, diag(var_j))` for every component
    fn log_joint(&self, x: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.means)
            .zip(&self.variances)
            .map(|((&w, mean), var)| w.ln() + log_density(x, mean, var))
            .collect()
    }
}

impl ClusterModel for GaussianMixtureModel {
    fn centroids(&self) -> &[Centroid] {
        &self.means
    }

    fn predict(&self, point: &Point) -> Result<ClusterId, ScoreError> {
        let expected = self.means.first().map_or(0, Point::dim);
        if point.dim() != expected {
            return Err(ScoreError::DimensionMismatch {
                expected,
                found: point.dim(),
            });
        }
        Ok(self
            .log_joint(point)
            .into_iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map_or(0, |(idx, _)| idx))
    }
}

fn log_density(x: &[f64], mean: &[f64], var: &[f64]) -> f64 {
    x.iter()
        .zip(mean)
        .zip(var)
        .map(|((xi, mi), vi)| {
            let d = xi - mi;
            -0.5 * ((2.0 * PI * vi).ln() + d * d / vi)
        })
        .sum()
}

fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max.is_infinite() {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

/// Fit a Gaussian mixture with `config.k` components.
///
/// Means are seeded with k-means++, variances start at the global
/// per-dimension variance and weights start uniform. Iteration stops once
/// the mean log-likelihood improves by less than `config.tolerance`.
pub fn fit_gaussian_mixture(points: &[Point], config: &ClusterConfig) -> GaussianMixtureModel {
    profiling::scope!("fit_gaussian_mixture");
    let k = config.k;
    let n = points.len() as f64;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let global_var = global_variance(points);
    let mut model = GaussianMixtureModel {
        weights: vec![1.0 / k as f64; k],
        means: plus_plus(points, k, &mut rng),
        variances: vec![global_var; k],
    };

    let mut previous = f64::NEG_INFINITY;
    for iteration in 1..=config.max_iterations {
        // E-step: responsibilities and per-point log-likelihood
        let (responsibilities, log_likelihoods): (Vec<Vec<f64>>, Vec<f64>) = points
            .par_iter()
            .map(|p| {
                let joint = model.log_joint(p);
                let total = log_sum_exp(&joint);
                let resp: Vec<f64> = joint.iter().map(|j| (j - total).exp()).collect();
                (resp, total)
            })
            .unzip();
        let mean_ll = log_likelihoods.iter().sum::<f64>() / n;

        // M-step
        for component in 0..k {
            let mass: f64 = responsibilities.iter().map(|r| r[component]).sum();
            if mass < MIN_COMPONENT_MASS {
                continue;
            }
            let mean = weighted_mean(points, &responsibilities, component, mass);
            let var = weighted_variance(points, &responsibilities, component, mass, &mean);
            model.weights[component] = mass / n;
            model.means[component] = Point::new(mean);
            model.variances[component] = var;
        }

        tracing::debug!(iteration, mean_ll, "gaussian mixture step");
        if (mean_ll - previous).abs() < config.tolerance {
            break;
        }
        previous = mean_ll;
    }

    tracing::info!(k, "gaussian mixture finished");
    model
}

fn global_variance(points: &[Point]) -> Vec<f64> {
    let dim = points.first().map_or(0, Point::dim);
    let n = points.len().max(1) as f64;
    let mut mean = vec![0.0; dim];
    for p in points {
        for (m, x) in mean.iter_mut().zip(p.iter()) {
            *m += x / n;
        }
    }
    let mut var = vec![0.0; dim];
    for p in points {
        for ((v, x), m) in var.iter_mut().zip(p.iter()).zip(&mean) {
            *v += (x - m) * (x - m) / n;
        }
    }
    var.into_iter().map(|v| v.max(VARIANCE_FLOOR)).collect()
}

fn weighted_mean(points: &[Point], resp: &[Vec<f64>], component: usize, mass: f64) -> Vec<f64> {
    let dim = points.first().map_or(0, Point::dim);
    let mut mean = vec![0.0; dim];
    for (p, r) in points.iter().zip(resp) {
        let w = r[component];
        for (m, x) in mean.iter_mut().zip(p.iter()) {
            *m += w * x;
        }
    }
    mean.into_iter().map(|m| m / mass).collect()
}

fn weighted_variance(
    points: &[Point],
    resp: &[Vec<f64>],
    component: usize,
    mass: f64,
    mean: &[f64],
) -> Vec<f64> {
    let mut var = vec![0.0; mean.len()];
    for (p, r) in points.iter().zip(resp) {
        let w = r[component];
        for ((v, x), m) in var.iter_mut().zip(p.iter()).zip(mean) {
            *v += w * (x - m) * (x - m);
        }
    }
    var.into_iter()
        .map(|v| (v / mass).max(VARIANCE_FLOOR))
        .collect()
}
