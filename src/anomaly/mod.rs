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

//! Scoring and anomaly-threshold engine.
//!
//! Everything in here is a pure computation over in-memory slices of
//! centroids and assignments. All three stages measure with
//! [`distance::distance`].

pub mod classifier;
pub mod distance;
pub mod scorer;
pub mod stats;
pub mod threshold;

pub use classifier::AnomalyClassifier;
pub use distance::distance;
pub use scorer::{ClusterQuality, ClusterScorer};
pub use threshold::ThresholdEstimator;
