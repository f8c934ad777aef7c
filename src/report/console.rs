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
use std::io::{self, Write};

/// How many of the farthest anomalies to print per run
const TOP_ANOMALIES: usize = 5;

/// Logs every report and prints a short human summary
pub struct ConsoleReporter<W: Write = io::Stdout> {
    out: W,
}

impl ConsoleReporter {
    #[must_use]
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::stdout()
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn report_score(&mut self, label: &str, score: f64, duration_secs: f64) -> anyhow::Result<()> {
        tracing::info!(label, score, duration_secs, "clustering score");
        writeln!(self.out, "{label}: score {score:.6} ({duration_secs:.2}s)")?;
        Ok(())
    }

    fn report_thresholds(
        &mut self,
        label: &str,
        thresholds: &ClusterThresholdTable,
    ) -> anyhow::Result<()> {
        let largest = thresholds.as_slice().iter().copied().fold(0.0, f64::max);
        tracing::debug!(label, k = thresholds.len(), largest, "thresholds");
        Ok(())
    }

    fn report_anomalies(&mut self, label: &str, anomalies: &[AnomalyRecord]) -> anyhow::Result<()> {
        tracing::info!(label, anomalies = anomalies.len(), "anomalies found");
        writeln!(self.out, "{label}: {} anomalies", anomalies.len())?;

        let mut worst: Vec<&AnomalyRecord> = anomalies.iter().collect();
        worst.sort_by(|a, b| b.excess().total_cmp(&a.excess()));
        for record in worst.into_iter().take(TOP_ANOMALIES) {
            writeln!(
                self.out,
                "  #{:<8} cluster {:<4} distance {:.4} > {:.4}",
                record.position,
                record.cluster(),
                record.distance,
                record.threshold
            )?;
        }
        Ok(())
    }
}
