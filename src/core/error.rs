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

use crate::core::point::ClusterId;
use thiserror::Error;

/// Contract violations detected while scoring, estimating or classifying.
///
/// The first two variants mean the caller mixed data that does not belong
/// together (a point from another feature space, a model with another k).
/// None of them are recovered from locally.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreError {
    #[error("dimension mismatch: centroid has {expected} dimensions, point has {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("unknown cluster {cluster} (model has {k} clusters)")]
    UnknownCluster { cluster: ClusterId, k: usize },

    /// A coordinate was NaN or infinite, or the distance overflowed
    #[error("distance is not finite")]
    NonFiniteDistance,
}
