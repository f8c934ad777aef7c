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

use crate::core::{AnomalyRecord, Assignment, Centroid, ClusterThresholdTable, ScoreError};
use rayon::prelude::*;

/// Flags assignments that fall outside their cluster's training envelope
pub struct AnomalyClassifier;

impl AnomalyClassifier {
    /// Return only the anomalous assignments, each with the distance that
    /// put it past its threshold.
    ///
    /// A point is anomalous iff its distance is strictly greater than the
    /// threshold; a point sitting exactly on the envelope is normal. Any
    /// cluster id missing from `thresholds` aborts the whole call.
    pub fn classify(
        centroids: &[Centroid],
        thresholds: &ClusterThresholdTable,
        assignments: &[Assignment],
    ) -> Result<Vec<AnomalyRecord>, ScoreError> {
        let anomalies: Vec<AnomalyRecord> = Self::label(centroids, thresholds, assignments)?
            .into_iter()
            .filter(|r| r.is_anomaly)
            .collect();

        tracing::info!(
            anomalies = anomalies.len(),
            total = assignments.len(),
            "classified assignments"
        );
        Ok(anomalies)
    }

    /// Produce a record for every assignment, anomalous or not, in input order
    pub fn label(
        centroids: &[Centroid],
        thresholds: &ClusterThresholdTable,
        assignments: &[Assignment],
    ) -> Result<Vec<AnomalyRecord>, ScoreError> {
        profiling::scope!("AnomalyClassifier::label");

        assignments
            .par_iter()
            .enumerate()
            .map(|(position, assignment)| -> Result<_, ScoreError> {
                let threshold = thresholds.get(assignment.cluster())?;
                let distance = assignment.distance_to(centroids)?;
                Ok(AnomalyRecord {
                    position,
                    assignment: assignment.clone().with_distance(distance),
                    distance,
                    threshold,
                    is_anomaly: distance > threshold,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::threshold::ThresholdEstimator;
    use crate::core::Point;

    fn single_cluster_table() -> (Vec<Centroid>, ClusterThresholdTable) {
        let centroids = vec![Point::from([0.0, 0.0])];
        let training = vec![
            Assignment::new(Point::from([0.0, 0.0]), 0),
            Assignment::new(Point::from([3.0, 4.0]), 0),
        ];
        let table = ThresholdEstimator::estimate(&centroids, &training).unwrap();
        (centroids, table)
    }

    #[test]
    fn test_point_on_envelope_is_normal() {
        let (centroids, table) = single_cluster_table();
        let test = vec![Assignment::new(Point::from([3.0, 4.0]), 0)];

        let anomalies = AnomalyClassifier::classify(&centroids, &table, &test).unwrap();
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_point_just_outside_envelope_is_anomalous() {
        let (centroids, table) = single_cluster_table();
        let test = vec![Assignment::new(Point::from([3.0, 4.0001]), 0)];

        let anomalies = AnomalyClassifier::classify(&centroids, &table, &test).unwrap();
        assert_eq!(anomalies.len(), 1);
        assert!(anomalies[0].distance > 5.0);
        assert_eq!(anomalies[0].threshold, 5.0);
        assert_eq!(anomalies[0].assignment.distance(), Some(anomalies[0].distance));
    }

    #[test]
    fn test_only_flagged_subset_is_returned() {
        let (centroids, table) = single_cluster_table();
        let test = vec![
            Assignment::new(Point::from([1.0, 1.0]), 0),
            Assignment::new(Point::from([6.0, 0.0]), 0),
            Assignment::new(Point::from([0.0, 2.0]), 0),
            Assignment::new(Point::from([-9.0, 0.0]), 0),
        ];

        let anomalies = AnomalyClassifier::classify(&centroids, &table, &test).unwrap();
        let positions: Vec<_> = anomalies.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 3]);
    }

    #[test]
    fn test_label_keeps_every_assignment() {
        let (centroids, table) = single_cluster_table();
        let test = vec![
            Assignment::new(Point::from([1.0, 1.0]), 0),
            Assignment::new(Point::from([6.0, 0.0]), 0),
        ];

        let records = AnomalyClassifier::label(&centroids, &table, &test).unwrap();
        assert_eq!(records.len(), 2);
        assert!(!records[0].is_anomaly);
        assert!(records[1].is_anomaly);
        assert_eq!(records[1].excess(), 1.0);
    }

    #[test]
    fn test_empty_training_cluster_flags_any_distance() {
        let centroids = vec![Point::from([0.0, 0.0]), Point::from([10.0, 10.0])];
        let training = vec![
            Assignment::new(Point::from([0.0, 0.0]), 0),
            Assignment::new(Point::from([1.0, 0.0]), 0),
        ];
        let table = ThresholdEstimator::estimate(&centroids, &training).unwrap();
        assert_eq!(table.get(1), Ok(0.0));

        let test = vec![
            Assignment::new(Point::from([10.0, 10.0]), 1),
            Assignment::new(Point::from([10.0, 10.5]), 1),
        ];
        let anomalies = AnomalyClassifier::classify(&centroids, &table, &test).unwrap();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].position, 1);
        assert_eq!(anomalies[0].cluster(), 1);
    }

    #[test]
    fn test_unknown_cluster_yields_no_partial_output() {
        let (centroids, table) = single_cluster_table();
        let test = vec![
            Assignment::new(Point::from([9.0, 9.0]), 0),
            Assignment::new(Point::from([9.0, 9.0]), 1),
        ];

        let result = AnomalyClassifier::classify(&centroids, &table, &test);
        assert_eq!(result, Err(ScoreError::UnknownCluster { cluster: 1, k: 1 }));
    }

    #[test]
    fn test_nan_point_is_not_classified_normal() {
        let (centroids, table) = single_cluster_table();
        let test = vec![
            Assignment::new(Point::from([1.0, 1.0]), 0),
            Assignment::new(Point::from([f64::NAN, 0.0]), 0),
        ];
        assert_eq!(
            AnomalyClassifier::classify(&centroids, &table, &test),
            Err(ScoreError::NonFiniteDistance)
        );
    }

    #[test]
    fn test_dimension_mismatch_aborts() {
        let (centroids, table) = single_cluster_table();
        let test = vec![Assignment::new(Point::from([1.0, 2.0, 3.0]), 0)];

        assert!(matches!(
            AnomalyClassifier::classify(&centroids, &table, &test),
            Err(ScoreError::DimensionMismatch { .. })
        ));
    }
}
