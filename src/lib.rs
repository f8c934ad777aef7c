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

//! `FlowCrab` - cluster-based anomaly detection for network traffic records.
//!
//! Normal traffic is clustered; every cluster remembers how far its farthest
//! training member lies from the centroid. New records landing farther out
//! than that are reported as anomalies.
//!
//! ```no_run
//! use flowcrab::cluster::{AlgorithmKind, ClusterConfig};
//! use flowcrab::features::{Dataset, DatasetOptions, Recipe};
//! use flowcrab::pipeline::Orchestrator;
//! use flowcrab::report::ConsoleReporter;
//!
//! # fn main() -> anyhow::Result<()> {
//! let options = DatasetOptions { has_headers: false, label_column: Some(41) };
//! let data = Dataset::from_csv("kddcup.data".as_ref(), &options)?;
//! let (train, test) = data.split(0.9, 42);
//!
//! let recipe = Recipe::builder(ClusterConfig::new(AlgorithmKind::KMeans, 10))
//!     .index([1, 2, 3])
//!     .one_hot()
//!     .standard_scale()
//!     .build()?;
//! let mut orchestrator = Orchestrator::new(ConsoleReporter::stdout());
//! orchestrator.run_recipe(&recipe, &[], &train, &test)?;
//! # Ok(())
//! # }
//! ```

pub mod anomaly;
pub mod cluster;
pub mod config;
pub mod core;
pub mod features;
pub mod pipeline;
pub mod report;

pub use crate::core::{AnomalyRecord, Assignment, Centroid, ClusterId, ClusterThresholdTable, Point, ScoreError};
