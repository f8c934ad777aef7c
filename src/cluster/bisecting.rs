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

//! Divisive k-means: start from one cluster and keep splitting the largest.

use crate::cluster::init::plus_plus;
use crate::cluster::kmeans::{lloyd, CentroidModel};
use crate::cluster::ClusterConfig;
use crate::core::{Centroid, Point};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A cluster of the bisecting hierarchy that has not been split (yet)
struct Leaf {
    members: Vec<usize>,
    centroid: Centroid,
    divisible: bool,
}

impl Leaf {
    fn new(points: &[Point], members: Vec<usize>) -> Self {
        let centroid = mean_of(points, &members);
        let first = members.first().map(|&i| &points[i]);
        let divisible = members
            .iter()
            .any(|&i| Some(&points[i]) != first);
        Self {
            members,
            centroid,
            divisible,
        }
    }
}

/// Fit bisecting k-means.
///
/// The largest divisible leaf is split in two with 2-means until there are
/// `k` leaves. If the data runs out of divisible leaves first (too few
/// distinct points), the model ends up with fewer than `k` clusters.
pub fn fit_bisecting(points: &[Point], config: &ClusterConfig) -> CentroidModel {
    profiling::scope!("fit_bisecting");
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut leaves = vec![Leaf::new(points, (0..points.len()).collect())];

    while leaves.len() < config.k {
        let Some(target) = leaves
            .iter()
            .enumerate()
            .filter(|(_, leaf)| leaf.divisible)
            .max_by_key(|(_, leaf)| leaf.members.len())
            .map(|(idx, _)| idx)
        else {
            tracing::warn!(
                requested = config.k,
                reached = leaves.len(),
                "no divisible cluster left, stopping early"
            );
            break;
        };

        let leaf = leaves.swap_remove(target);
        match bisect(points, &leaf, config, &mut rng) {
            Some((left, right)) => {
                tracing::debug!(
                    parent = leaf.members.len(),
                    left = left.members.len(),
                    right = right.members.len(),
                    "split cluster"
                );
                leaves.push(left);
                leaves.push(right);
            }
            None => leaves.push(Leaf {
                divisible: false,
                ..leaf
            }),
        }
    }

    tracing::info!(k = leaves.len(), "bisecting k-means finished");
    CentroidModel::new(leaves.into_iter().map(|leaf| leaf.centroid).collect())
}

fn bisect(
    points: &[Point],
    leaf: &Leaf,
    config: &ClusterConfig,
    rng: &mut ChaCha8Rng,
) -> Option<(Leaf, Leaf)> {
    let subset: Vec<Point> = leaf.members.iter().map(|&i| points[i].clone()).collect();
    let initial = plus_plus(&subset, 2, rng);
    let outcome = lloyd(&subset, initial, config.max_iterations, config.tolerance);

    let (left, right): (Vec<(usize, usize)>, Vec<(usize, usize)>) = leaf
        .members
        .iter()
        .copied()
        .zip(outcome.labels)
        .partition(|&(_, label)| label == 0);

    if left.is_empty() || right.is_empty() {
        return None;
    }
    let left = left.into_iter().map(|(i, _)| i).collect();
    let right = right.into_iter().map(|(i, _)| i).collect();
    Some((Leaf::new(points, left), Leaf::new(points, right)))
}

fn mean_of(points: &[Point], members: &[usize]) -> Centroid {
    let dim = members.first().map_or(0, |&i| points[i].dim());
    let mut sum = vec![0.0; dim];
    for &i in members {
        for (s, x) in sum.iter_mut().zip(points[i].iter()) {
            *s += x;
        }
    }
    let n = members.len().max(1) as f64;
    Point::new(sum.into_iter().map(|s| s / n).collect())
}
