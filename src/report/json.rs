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
use anyhow::Context;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const SCORES_FILE: &str = "scores.jsonl";
const THRESHOLDS_FILE: &str = "thresholds.jsonl";

#[derive(Serialize)]
struct ScoreLine<'a> {
    label: &'a str,
    score: f64,
    duration_secs: f64,
    timestamp: DateTime<Local>,
}

#[derive(Serialize)]
struct ThresholdLine<'a> {
    label: &'a str,
    thresholds: &'a [f64],
    timestamp: DateTime<Local>,
}

#[derive(Serialize)]
struct AnomalyEntry<'a> {
    position: usize,
    cluster: usize,
    distance: f64,
    threshold: f64,
    point: &'a [f64],
}

/// Writes results as JSON files into one output directory.
///
/// Scores and thresholds are appended as JSON lines, so several runs share
/// one file. Every anomaly report gets its own
/// `anomalies-<label>-<timestamp>.json`.
#[derive(Debug)]
pub struct JsonReporter {
    dir: PathBuf,
}

impl JsonReporter {
    /// Create the output directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn append_line(&self, file: &str, line: &impl Serialize) -> anyhow::Result<()> {
        let path = self.dir.join(file);
        let mut out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let mut json = serde_json::to_string(line).context("Failed to serialize report line")?;
        json.push('\n');
        out.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// File-name-safe form of a run label: `kmeans k=10` becomes `kmeans-k-10`
fn slug(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_owned()
}

impl Reporter for JsonReporter {
    fn report_score(&mut self, label: &str, score: f64, duration_secs: f64) -> anyhow::Result<()> {
        self.append_line(
            SCORES_FILE,
            &ScoreLine {
                label,
                score,
                duration_secs,
                timestamp: Local::now(),
            },
        )
    }

    fn report_thresholds(
        &mut self,
        label: &str,
        thresholds: &ClusterThresholdTable,
    ) -> anyhow::Result<()> {
        self.append_line(
            THRESHOLDS_FILE,
            &ThresholdLine {
                label,
                thresholds: thresholds.as_slice(),
                timestamp: Local::now(),
            },
        )
    }

    fn report_anomalies(&mut self, label: &str, anomalies: &[AnomalyRecord]) -> anyhow::Result<()> {
        let stamp = Local::now().format("%Y%m%dT%H%M%S%.3f").to_string().replace('.', "-");
        let path = self
            .dir
            .join(format!("anomalies-{}-{stamp}.json", slug(label)));

        let entries: Vec<AnomalyEntry<'_>> = anomalies
            .iter()
            .map(|r| AnomalyEntry {
                position: r.position,
                cluster: r.cluster(),
                distance: r.distance,
                threshold: r.threshold,
                point: r.point().as_slice(),
            })
            .collect();

        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &entries)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        writer.flush()?;

        tracing::info!(
            path = %path.display(),
            anomalies = anomalies.len(),
            "wrote anomaly report"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Assignment, Point};

    #[test]
    fn test_slug() {
        assert_eq!(slug("kmeans k=10"), "kmeans-k-10");
        assert_eq!(slug("Bisecting-KMeans  k=3"), "bisecting-kmeans-k-3");
    }

    #[test]
    fn test_writes_scores_and_anomalies() {
        let dir = tempfile::tempdir().unwrap();
        let mut reporter = JsonReporter::new(dir.path().join("out")).unwrap();

        reporter.report_score("kmeans k=2", 1.25, 0.5).unwrap();
        reporter.report_score("kmeans k=3", 0.75, 0.5).unwrap();
        let scores = fs::read_to_string(reporter.dir().join(SCORES_FILE)).unwrap();
        let lines: Vec<serde_json::Value> = scores
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["label"], "kmeans k=2");
        assert_eq!(lines[1]["score"], 0.75);

        let record = AnomalyRecord {
            position: 4,
            assignment: Assignment::new(Point::from([6.0, 8.0]), 0),
            distance: 10.0,
            threshold: 5.0,
            is_anomaly: true,
        };
        reporter.report_anomalies("kmeans k=2", &[record]).unwrap();

        let written: Vec<PathBuf> = fs::read_dir(reporter.dir())
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("anomalies-kmeans-k-2-"))
            })
            .collect();
        assert_eq!(written.len(), 1);

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert_eq!(json[0]["position"], 4);
        assert_eq!(json[0]["distance"], 10.0);
        assert_eq!(json[0]["point"], serde_json::json!([6.0, 8.0]));
    }
}
