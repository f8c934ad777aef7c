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

//! One clustering run as a chain of states.
//!
//! Each state owns everything the previous ones produced and can only be
//! turned into the next state, so a run cannot classify with thresholds
//! that were not estimated from its own model.

use crate::anomaly::{AnomalyClassifier, ClusterQuality, ClusterScorer, ThresholdEstimator};
use crate::cluster::{ClusterConfig, ClusterModel};
use crate::core::{AnomalyRecord, Assignment, Centroid, ClusterThresholdTable, Point};
use crate::pipeline::PipelineError;
use crate::report::Reporter;
use serde::Serialize;
use std::time::Instant;

/// A configuration that has not seen any data yet
#[derive(Debug, Clone)]
pub struct Run {
    config: ClusterConfig,
}

/// Model fitted; training points assigned
#[derive(Debug)]
pub struct TrainedRun {
    config: ClusterConfig,
    model: Box<dyn ClusterModel>,
    training: Vec<Assignment>,
    started: Instant,
}

#[derive(Debug)]
pub struct ScoredRun {
    trained: TrainedRun,
    quality: ClusterQuality,
    duration_secs: f64,
}

#[derive(Debug)]
pub struct EstimatedRun {
    scored: ScoredRun,
    thresholds: ClusterThresholdTable,
}

#[derive(Debug)]
pub struct ClassifiedRun {
    estimated: EstimatedRun,
    tested: usize,
    anomalies: Vec<AnomalyRecord>,
}

/// Everything a finished run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub label: String,
    pub config: ClusterConfig,
    pub centroids: Vec<Centroid>,
    pub quality: ClusterQuality,
    pub thresholds: ClusterThresholdTable,
    pub anomalies: Vec<AnomalyRecord>,
    /// Number of test points classified
    pub tested: usize,
    /// Wall time spent fitting and scoring
    pub duration_secs: f64,
}

impl RunOutcome {
    #[must_use]
    pub const fn score(&self) -> f64 {
        self.quality.overall
    }
}

impl Run {
    #[must_use]
    pub const fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    /// Fit the model and assign the training points with it
    pub fn train(self, points: &[Point]) -> Result<TrainedRun, PipelineError> {
        let started = Instant::now();
        let model = self.config.fit(points)?;
        let training = model.assign(points)?;
        Ok(TrainedRun {
            config: self.config,
            model,
            training,
            started,
        })
    }
}

impl TrainedRun {
    pub fn score(self) -> Result<ScoredRun, PipelineError> {
        let quality = ClusterScorer::quality(self.model.centroids(), &self.training)?;
        let duration_secs = self.started.elapsed().as_secs_f64();
        tracing::info!(
            label = %self.config.label(),
            score = quality.overall,
            duration_secs,
            "scored training assignments"
        );
        Ok(ScoredRun {
            trained: self,
            quality,
            duration_secs,
        })
    }
}

impl ScoredRun {
    /// Thresholds from the same training assignments that were scored
    pub fn estimate_thresholds(self) -> Result<EstimatedRun, PipelineError> {
        let thresholds =
            ThresholdEstimator::estimate(self.trained.model.centroids(), &self.trained.training)?;
        Ok(EstimatedRun {
            scored: self,
            thresholds,
        })
    }
}

impl EstimatedRun {
    /// Assign `test` with the run's model and flag points past their threshold
    pub fn classify(self, test: &[Point]) -> Result<ClassifiedRun, PipelineError> {
        let model = &self.scored.trained.model;
        let assignments = model.assign(test)?;
        let anomalies =
            AnomalyClassifier::classify(model.centroids(), &self.thresholds, &assignments)?;
        Ok(ClassifiedRun {
            estimated: self,
            tested: test.len(),
            anomalies,
        })
    }
}

impl ClassifiedRun {
    /// Hand score, thresholds and anomalies to `reporter` and finish the run
    pub fn report<R: Reporter + ?Sized>(self, reporter: &mut R) -> Result<RunOutcome, PipelineError> {
        let EstimatedRun { scored, thresholds } = self.estimated;
        let ScoredRun {
            trained,
            quality,
            duration_secs,
        } = scored;
        let label = trained.config.label();

        reporter
            .report_score(&label, quality.overall, duration_secs)
            .map_err(PipelineError::Report)?;
        reporter
            .report_thresholds(&label, &thresholds)
            .map_err(PipelineError::Report)?;
        reporter
            .report_anomalies(&label, &self.anomalies)
            .map_err(PipelineError::Report)?;

        Ok(RunOutcome {
            label,
            centroids: trained.model.centroids().to_vec(),
            config: trained.config,
            quality,
            thresholds,
            anomalies: self.anomalies,
            tested: self.tested,
            duration_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{AlgorithmKind, ClusterError};
    use crate::core::ScoreError;
    use crate::report::MemoryReporter;

    fn training() -> Vec<Point> {
        vec![
            Point::from([0.0, 0.0]),
            Point::from([0.0, 2.0]),
            Point::from([10.0, 10.0]),
            Point::from([10.0, 12.0]),
        ]
    }

    #[test]
    fn test_full_run() {
        let test = vec![
            Point::from([0.0, 1.5]),
            Point::from([0.0, 5.0]),
            Point::from([10.0, 11.0]),
        ];
        let mut reporter = MemoryReporter::default();
        let outcome = Run::new(ClusterConfig::new(AlgorithmKind::KMeans, 2))
            .train(&training())
            .unwrap()
            .score()
            .unwrap()
            .estimate_thresholds()
            .unwrap()
            .classify(&test)
            .unwrap()
            .report(&mut reporter)
            .unwrap();

        // Both clusters have members at distance 1 from their centroid
        assert_eq!(outcome.score(), 1.0);
        assert_eq!(outcome.thresholds.as_slice(), &[1.0, 1.0]);
        assert_eq!(outcome.tested, 3);
        assert_eq!(outcome.anomalies.len(), 1);
        assert_eq!(outcome.anomalies[0].position, 1);
        assert_eq!(outcome.anomalies[0].distance, 4.0);

        assert_eq!(reporter.scores()[0].label, "kmeans k=2");
        assert_eq!(reporter.scores()[0].score, 1.0);
        assert_eq!(reporter.thresholds().len(), 1);
        assert_eq!(reporter.anomalies_for("kmeans k=2").unwrap().len(), 1);
    }

    #[test]
    fn test_training_errors_surface() {
        let err = Run::new(ClusterConfig::new(AlgorithmKind::KMeans, 5))
            .train(&training())
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Cluster(ClusterError::InsufficientPoints { k: 5, points: 4 })
        ));
    }

    #[test]
    fn test_classify_rejects_other_dimension() {
        let estimated = Run::new(ClusterConfig::new(AlgorithmKind::KMeans, 2))
            .train(&training())
            .unwrap()
            .score()
            .unwrap()
            .estimate_thresholds()
            .unwrap();
        let err = estimated.classify(&[Point::from([1.0])]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Score(ScoreError::DimensionMismatch {
                expected: 2,
                found: 1
            })
        ));
    }
}
