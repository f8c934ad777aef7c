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

//! Drives clustering runs from prepared data to reported results.

pub mod run;

use crate::cluster::{ClusterConfig, ClusterError};
use crate::core::{Point, ScoreError};
use crate::features::{Dataset, FeatureError, Recipe};
use crate::report::Reporter;
use thiserror::Error;

pub use run::{ClassifiedRun, EstimatedRun, Run, RunOutcome, ScoredRun, TrainedRun};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("training failed: {0}")]
    Cluster(#[from] ClusterError),

    #[error(transparent)]
    Score(#[from] ScoreError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error("reporting failed: {0:#}")]
    Report(anyhow::Error),
}

/// Runs configurations one after the other against a shared reporter
pub struct Orchestrator<R: Reporter> {
    reporter: R,
}

impl<R: Reporter> Orchestrator<R> {
    pub const fn new(reporter: R) -> Self {
        Self { reporter }
    }

    pub const fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn into_reporter(self) -> R {
        self.reporter
    }

    /// One configuration from training points to reported anomalies
    pub fn run(
        &mut self,
        config: &ClusterConfig,
        train: &[Point],
        test: &[Point],
    ) -> Result<RunOutcome, PipelineError> {
        profiling::scope!("Orchestrator::run");
        tracing::info!(label = %config.label(), "starting run");
        Run::new(config.clone())
            .train(train)?
            .score()?
            .estimate_thresholds()?
            .classify(test)?
            .report(&mut self.reporter)
    }

    /// Run every configuration on the same points.
    ///
    /// Stops at the first failing configuration.
    pub fn sweep(
        &mut self,
        configs: &[ClusterConfig],
        train: &[Point],
        test: &[Point],
    ) -> Result<Vec<RunOutcome>, PipelineError> {
        let outcomes = configs
            .iter()
            .map(|config| self.run(config, train, test))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(best) = outcomes.iter().min_by(|a, b| a.score().total_cmp(&b.score())) {
            tracing::info!(
                runs = outcomes.len(),
                best = %best.label,
                score = best.score(),
                "sweep finished"
            );
        }
        Ok(outcomes)
    }

    /// Fit the recipe's feature stages on `train`, then run its clustering
    /// and every extra configuration in `also` on the transformed data
    pub fn run_recipe(
        &mut self,
        recipe: &Recipe,
        also: &[ClusterConfig],
        train: &Dataset,
        test: &Dataset,
    ) -> Result<Vec<RunOutcome>, PipelineError> {
        let fitted = recipe.fit_features(train)?;
        let train_points = fitted.transform(train)?;
        let test_points = fitted.transform(test)?;

        let configs: Vec<ClusterConfig> = std::iter::once(recipe.model().clone())
            .chain(also.iter().cloned())
            .collect();
        self.sweep(&configs, &train_points, &test_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::AlgorithmKind;
    use crate::features::Record;
    use crate::report::MemoryReporter;

    fn grid() -> Vec<Point> {
        (0..12)
            .map(|i| Point::from([f64::from(i % 4), f64::from(i / 4) * 10.0]))
            .collect()
    }

    #[test]
    fn test_sweep_runs_every_config() {
        let configs = [
            ClusterConfig::new(AlgorithmKind::KMeans, 1),
            ClusterConfig::new(AlgorithmKind::KMeans, 3),
            ClusterConfig::new(AlgorithmKind::BisectingKMeans, 3),
        ];
        let mut orchestrator = Orchestrator::new(MemoryReporter::default());
        let outcomes = orchestrator.sweep(&configs, &grid(), &grid()).unwrap();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].thresholds.len(), 1);
        assert_eq!(outcomes[1].thresholds.len(), 3);
        // Training points never exceed thresholds estimated from themselves
        assert!(outcomes.iter().all(|o| o.anomalies.is_empty()));
        assert!(outcomes[1].score() < outcomes[0].score());

        let labels: Vec<&str> = orchestrator
            .reporter()
            .scores()
            .iter()
            .map(|s| s.label.as_str())
            .collect();
        assert_eq!(labels, vec!["kmeans k=1", "kmeans k=3", "bisecting-kmeans k=3"]);
    }

    #[test]
    fn test_sweep_stops_at_first_failure() {
        let configs = [
            ClusterConfig::new(AlgorithmKind::KMeans, 2),
            ClusterConfig::new(AlgorithmKind::KMeans, 0),
            ClusterConfig::new(AlgorithmKind::KMeans, 3),
        ];
        let mut orchestrator = Orchestrator::new(MemoryReporter::default());
        let err = orchestrator.sweep(&configs, &grid(), &grid()).unwrap_err();
        assert!(matches!(err, PipelineError::Cluster(ClusterError::InvalidK)));
        assert_eq!(orchestrator.into_reporter().scores().len(), 1);
    }

    #[test]
    fn test_run_recipe_from_records() {
        let row = |bytes: &str, proto: &str, label: &str| {
            Record::new(
                vec![bytes.to_owned(), proto.to_owned()],
                Some(label.to_owned()),
            )
        };
        let train = Dataset::from_records(vec![
            row("100", "tcp", "normal."),
            row("110", "tcp", "normal."),
            row("5000", "udp", "normal."),
            row("5100", "udp", "normal."),
        ]);
        let test = Dataset::from_records(vec![
            row("105", "tcp", "normal."),
            row("90000", "icmp", "smurf."),
        ]);

        let recipe = Recipe::builder(ClusterConfig::new(AlgorithmKind::KMeans, 2))
            .index([1])
            .one_hot()
            .build()
            .unwrap();
        let mut orchestrator = Orchestrator::new(MemoryReporter::default());
        let outcomes = orchestrator
            .run_recipe(
                &recipe,
                &[ClusterConfig::new(AlgorithmKind::GaussianMixture, 2)],
                &train,
                &test,
            )
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        for outcome in &outcomes {
            let positions: Vec<usize> = outcome.anomalies.iter().map(|a| a.position).collect();
            assert_eq!(positions, vec![1], "{}", outcome.label);
        }
    }
}
