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

use crate::core::{AnomalyRecord, ClusterThresholdTable};
use crate::report::Reporter;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreEntry {
    pub label: String,
    pub score: f64,
    pub duration_secs: f64,
}

/// Keeps every report in memory, in arrival order
#[derive(Debug, Default)]
pub struct MemoryReporter {
    scores: Vec<ScoreEntry>,
    thresholds: Vec<(String, ClusterThresholdTable)>,
    anomalies: Vec<(String, Vec<AnomalyRecord>)>,
}

impl MemoryReporter {
    #[must_use]
    pub fn scores(&self) -> &[ScoreEntry] {
        &self.scores
    }

    #[must_use]
    pub fn thresholds(&self) -> &[(String, ClusterThresholdTable)] {
        &self.thresholds
    }

    /// Anomalies reported under `label`, if any report used it
    #[must_use]
    pub fn anomalies_for(&self, label: &str) -> Option<&[AnomalyRecord]> {
        self.anomalies
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, records)| records.as_slice())
    }

    #[must_use]
    pub fn anomalies(&self) -> &[(String, Vec<AnomalyRecord>)] {
        &self.anomalies
    }
}

impl Reporter for MemoryReporter {
    fn report_score(&mut self, label: &str, score: f64, duration_secs: f64) -> anyhow::Result<()> {
        self.scores.push(ScoreEntry {
            label: label.to_owned(),
            score,
            duration_secs,
        });
        Ok(())
    }

    fn report_thresholds(
        &mut self,
        label: &str,
        thresholds: &ClusterThresholdTable,
    ) -> anyhow::Result<()> {
        self.thresholds.push((label.to_owned(), thresholds.clone()));
        Ok(())
    }

    fn report_anomalies(&mut self, label: &str, anomalies: &[AnomalyRecord]) -> anyhow::Result<()> {
        self.anomalies.push((label.to_owned(), anomalies.to_vec()));
        Ok(())
    }
}
