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

//! Immutable feature vectors and cluster assignments.

use crate::anomaly::distance::distance;
use crate::core::error::ScoreError;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::Arc;

/// Index of a cluster within a trained model, dense in `0..k`
pub type ClusterId = usize;

/// A numeric feature vector of fixed dimension.
///
/// Backed by a shared slice, so cloning a `Point` never copies the
/// coordinates. There is no way to mutate a point once it is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Point(Arc<[f64]>);

/// A point standing for the location of a cluster
pub type Centroid = Point;

impl Point {
    #[must_use]
    pub fn new(coords: Vec<f64>) -> Self {
        Self(coords.into())
    }

    /// Number of dimensions
    #[must_use]
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl Deref for Point {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for Point {
    fn from(coords: Vec<f64>) -> Self {
        Self::new(coords)
    }
}

impl<const N: usize> From<[f64; N]> for Point {
    fn from(coords: [f64; N]) -> Self {
        Self(Arc::new(coords))
    }
}

/// A point together with the cluster a model put it in.
///
/// Models hand out assignments without a distance. The distance can only be
/// filled in through [`Assignment::measured`], which applies the Euclidean
/// law used everywhere else in the crate and returns a new value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    point: Point,
    cluster: ClusterId,
    distance: Option<f64>,
}

impl Assignment {
    #[must_use]
    pub const fn new(point: Point, cluster: ClusterId) -> Self {
        Self {
            point,
            cluster,
            distance: None,
        }
    }

    #[must_use]
    pub const fn point(&self) -> &Point {
        &self.point
    }

    #[must_use]
    pub const fn cluster(&self) -> ClusterId {
        self.cluster
    }

    /// The distance recorded by the last [`Assignment::measured`] call
    #[must_use]
    pub const fn distance(&self) -> Option<f64> {
        self.distance
    }

    /// Distance from this assignment's point to the centroid of its cluster.
    ///
    /// Always measured against `centroids`; a cached distance from an earlier
    /// [`Assignment::measured`] call is never reused here.
    pub fn distance_to(&self, centroids: &[Centroid]) -> Result<f64, ScoreError> {
        let centroid = centroids
            .get(self.cluster)
            .ok_or(ScoreError::UnknownCluster {
                cluster: self.cluster,
                k: centroids.len(),
            })?;
        distance(centroid, &self.point)
    }

    /// Return a copy of this assignment with its distance filled in
    pub fn measured(&self, centroids: &[Centroid]) -> Result<Self, ScoreError> {
        let d = self.distance_to(centroids)?;
        Ok(self.clone().with_distance(d))
    }

    pub(crate) fn with_distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_clone_shares_storage() {
        let p = Point::new(vec![1.0, 2.0, 3.0]);
        let q = p.clone();
        assert_eq!(p.dim(), 3);
        assert!(std::ptr::eq(p.as_slice(), q.as_slice()));
    }

    #[test]
    fn test_measured_returns_new_value() {
        let centroids = vec![Point::from([0.0, 0.0])];
        let a = Assignment::new(Point::from([3.0, 4.0]), 0);
        let measured = a.measured(&centroids).unwrap();

        assert_eq!(a.distance(), None);
        assert_eq!(measured.distance(), Some(5.0));
        assert_eq!(measured.cluster(), 0);
    }

    #[test]
    fn test_distance_to_uses_given_centroids() {
        let first = vec![Point::from([0.0, 0.0])];
        let measured = Assignment::new(Point::from([3.0, 4.0]), 0)
            .measured(&first)
            .unwrap();

        assert_eq!(measured.distance(), Some(5.0));
        assert_eq!(measured.distance_to(&[Point::from([3.0, 0.0])]), Ok(4.0));
        assert_eq!(
            measured.distance_to(&[Point::from([0.0, 0.0, 0.0])]),
            Err(ScoreError::DimensionMismatch {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn test_distance_to_unknown_cluster() {
        let centroids = vec![Point::from([0.0, 0.0])];
        let a = Assignment::new(Point::from([1.0, 1.0]), 3);
        assert_eq!(
            a.distance_to(&centroids),
            Err(ScoreError::UnknownCluster { cluster: 3, k: 1 })
        );
    }
}
