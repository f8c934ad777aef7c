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

use crate::cluster::{AlgorithmKind, ClusterConfig};
use crate::features::{DatasetOptions, FeatureError, Recipe};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Feature scaling applied after the categorical stages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ScalerKind {
    #[default]
    None,
    Standard,
    MinMax,
}

/// User configuration, stored as JSON in the config directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub algorithm: AlgorithmKind,
    /// Every k to sweep, in order
    pub k_values: Vec<usize>,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub seed: u64,

    pub has_headers: bool,
    /// Ground-truth label column, excluded from the features
    pub label_column: Option<usize>,
    /// Text columns that get indexed
    pub categorical_columns: Vec<usize>,
    /// Expand indexed columns into one-hot blocks
    pub one_hot: bool,
    pub scaler: ScalerKind,

    /// Share of a single input file used for training when no test file is given
    pub train_fraction: f64,
    /// Label value of normal traffic, for evaluation
    pub normal_label: String,
    /// Where JSON reports go; console only when unset
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let cluster = ClusterConfig::new(AlgorithmKind::KMeans, 10);
        Self {
            algorithm: cluster.algorithm,
            k_values: vec![5, 10, 15],
            max_iterations: cluster.max_iterations,
            tolerance: cluster.tolerance,
            seed: cluster.seed,
            has_headers: false,
            label_column: None,
            categorical_columns: Vec::new(),
            one_hot: true,
            scaler: ScalerKind::Standard,
            train_fraction: 0.9,
            normal_label: "normal.".to_owned(),
            output_dir: None,
        }
    }
}

impl Config {
    /// Get the path to the default config file
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("flowcrab").join("config.json"))
    }

    /// Load the default config file, returning defaults if there is none
    /// or it cannot be parsed
    #[must_use]
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            tracing::info!("No config found, using defaults");
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config {}: {e:#}", path.display());
                Self::default()
            }
        }
    }

    /// Load an explicit config file; a missing or malformed file is an error
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    #[must_use]
    pub fn dataset_options(&self) -> DatasetOptions {
        DatasetOptions {
            has_headers: self.has_headers,
            label_column: self.label_column,
        }
    }

    /// One clustering configuration per entry of `k_values`
    #[must_use]
    pub fn cluster_configs(&self) -> Vec<ClusterConfig> {
        self.k_values
            .iter()
            .map(|&k| {
                ClusterConfig::new(self.algorithm, k)
                    .with_max_iterations(self.max_iterations)
                    .with_tolerance(self.tolerance)
                    .with_seed(self.seed)
            })
            .collect()
    }

    /// Feature recipe around `model`
    pub fn recipe(&self, model: ClusterConfig) -> Result<Recipe, FeatureError> {
        let mut builder = Recipe::builder(model);
        if !self.categorical_columns.is_empty() {
            builder = builder.index(self.categorical_columns.iter().copied());
            if self.one_hot {
                builder = builder.one_hot();
            }
        }
        builder = match self.scaler {
            ScalerKind::None => builder,
            ScalerKind::Standard => builder.standard_scale(),
            ScalerKind::MinMax => builder.min_max_scale(),
        };
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Stage;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "algorithm": "gmm", "k_values": [3], "scaler": "min_max" }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.algorithm, AlgorithmKind::GaussianMixture);
        assert_eq!(config.k_values, vec![3]);
        assert_eq!(config.scaler, ScalerKind::MinMax);
        assert_eq!(config.seed, Config::default().seed);
        assert_eq!(config.normal_label, "normal.");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            categorical_columns: vec![1, 2, 3],
            label_column: Some(41),
            output_dir: Some(PathBuf::from("/tmp/reports")),
            ..Config::default()
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
        assert!(Config::load_from(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_cluster_configs_follow_k_values() {
        let config = Config {
            k_values: vec![2, 4],
            seed: 9,
            ..Config::default()
        };
        let configs = config.cluster_configs();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[1].k, 4);
        assert_eq!(configs[1].seed, 9);
    }

    #[test]
    fn test_recipe_stages() {
        let config = Config {
            categorical_columns: vec![1, 2],
            ..Config::default()
        };
        let recipe = config
            .recipe(ClusterConfig::new(AlgorithmKind::KMeans, 2))
            .unwrap();
        assert_eq!(
            recipe.stages(),
            &[
                Stage::Index {
                    columns: vec![1, 2]
                },
                Stage::OneHot,
                Stage::StandardScale,
            ]
        );

        let plain = Config {
            scaler: ScalerKind::None,
            ..Config::default()
        };
        let recipe = plain
            .recipe(ClusterConfig::new(AlgorithmKind::KMeans, 2))
            .unwrap();
        assert!(recipe.stages().is_empty());
    }
}
