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

//! Where run results go once a run is finished.

pub mod console;
pub mod evaluation;
pub mod json;
pub mod memory;

use crate::core::{AnomalyRecord, ClusterThresholdTable};

pub use console::ConsoleReporter;
pub use evaluation::Evaluation;
pub use json::JsonReporter;
pub use memory::MemoryReporter;

/// Sink for the results of a run.
///
/// `label` identifies the run, e.g. `kmeans k=10`.
pub trait Reporter {
    fn report_score(&mut self, label: &str, score: f64, duration_secs: f64) -> anyhow::Result<()>;

    fn report_thresholds(
        &mut self,
        _label: &str,
        _thresholds: &ClusterThresholdTable,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    fn report_anomalies(&mut self, label: &str, anomalies: &[AnomalyRecord]) -> anyhow::Result<()>;
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report_score(&mut self, label: &str, score: f64, duration_secs: f64) -> anyhow::Result<()> {
        (**self).report_score(label, score, duration_secs)
    }

    fn report_thresholds(
        &mut self,
        label: &str,
        thresholds: &ClusterThresholdTable,
    ) -> anyhow::Result<()> {
        (**self).report_thresholds(label, thresholds)
    }

    fn report_anomalies(&mut self, label: &str, anomalies: &[AnomalyRecord]) -> anyhow::Result<()> {
        (**self).report_anomalies(label, anomalies)
    }
}

/// Fans every report out to several reporters, stopping at the first error
#[derive(Default)]
pub struct Reporters {
    inner: Vec<Box<dyn Reporter>>,
}

impl Reporters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, reporter: impl Reporter + 'static) -> Self {
        self.inner.push(Box::new(reporter));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Reporter for Reporters {
    fn report_score(&mut self, label: &str, score: f64, duration_secs: f64) -> anyhow::Result<()> {
        self.inner
            .iter_mut()
            .try_for_each(|r| r.report_score(label, score, duration_secs))
    }

    fn report_thresholds(
        &mut self,
        label: &str,
        thresholds: &ClusterThresholdTable,
    ) -> anyhow::Result<()> {
        self.inner
            .iter_mut()
            .try_for_each(|r| r.report_thresholds(label, thresholds))
    }

    fn report_anomalies(&mut self, label: &str, anomalies: &[AnomalyRecord]) -> anyhow::Result<()> {
        self.inner
            .iter_mut()
            .try_for_each(|r| r.report_anomalies(label, anomalies))
    }
}
