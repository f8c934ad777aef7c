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

use crate::core::AnomalyRecord;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Confusion counts of the anomaly flags against ground-truth labels.
///
/// A record is a positive when it was flagged; it is actually anomalous
/// when its label differs from the normal label. Unlabeled records are
/// left out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl Evaluation {
    /// `labels` are the test labels in classification order, so an
    /// anomaly's `position` indexes into them
    #[must_use]
    pub fn compute(anomalies: &[AnomalyRecord], labels: &[Option<&str>], normal_label: &str) -> Self {
        let flagged: HashSet<usize> = anomalies.iter().map(|r| r.position).collect();
        let mut eval = Self::default();
        for (position, label) in labels.iter().enumerate() {
            let Some(label) = label else { continue };
            let attack = *label != normal_label;
            match (flagged.contains(&position), attack) {
                (true, true) => eval.true_positives += 1,
                (true, false) => eval.false_positives += 1,
                (false, false) => eval.true_negatives += 1,
                (false, true) => eval.false_negatives += 1,
            }
        }
        eval
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    #[must_use]
    pub fn precision(&self) -> Option<f64> {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    #[must_use]
    pub fn recall(&self) -> Option<f64> {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    #[must_use]
    pub fn false_positive_rate(&self) -> Option<f64> {
        ratio(self.false_positives, self.false_positives + self.true_negatives)
    }
}

fn ratio(num: usize, den: usize) -> Option<f64> {
    (den > 0).then(|| num as f64 / den as f64)
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = |v: Option<f64>| v.map_or_else(|| "n/a".to_owned(), |v| format!("{:.2}%", v * 100.0));
        write!(
            f,
            "tp={} fp={} tn={} fn={} precision={} recall={} fpr={}",
            self.true_positives,
            self.false_positives,
            self.true_negatives,
            self.false_negatives,
            pct(self.precision()),
            pct(self.recall()),
            pct(self.false_positive_rate()),
        )
    }
}
