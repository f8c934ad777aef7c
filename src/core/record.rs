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

use crate::core::point::{Assignment, ClusterId, Point};
use serde::Serialize;

/// Outcome of comparing one assignment against its cluster threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyRecord {
    /// Position of the assignment in the classified sequence
    pub position: usize,
    pub assignment: Assignment,
    pub distance: f64,
    pub threshold: f64,
    pub is_anomaly: bool,
}

impl AnomalyRecord {
    #[must_use]
    pub const fn cluster(&self) -> ClusterId {
        self.assignment.cluster()
    }

    #[must_use]
    pub const fn point(&self) -> &Point {
        self.assignment.point()
    }

    /// How far past the threshold the point lies (negative when inside)
    #[must_use]
    pub fn excess(&self) -> f64 {
        self.distance - self.threshold
    }
}
