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

use flowcrab::cluster::{AlgorithmKind, ClusterConfig};
use flowcrab::config::Config;
use flowcrab::features::{Dataset, DatasetOptions};
use flowcrab::pipeline::Orchestrator;
use flowcrab::report::{Evaluation, JsonReporter, MemoryReporter, Reporters};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Connection records shaped like the KDD Cup 99 data: duration, protocol,
/// service, bytes sent, bytes received, label
fn write_fixtures(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let mut train = String::new();
    for i in 0..40 {
        let jitter = i % 5;
        let (proto, service, sent, received) = if i % 2 == 0 {
            ("tcp", "http", 200 + jitter, 4000 + 10 * jitter)
        } else {
            ("udp", "domain_u", 40 + jitter, 90 + jitter)
        };
        writeln!(train, "0,{proto},{service},{sent},{received},normal.").unwrap();
    }

    let test = "\
0,tcp,http,202,4020,normal.
0,udp,domain_u,41,91,normal.
0,icmp,ecr_i,1032,0,smurf.
9000,tcp,private,0,0,neptune.
";

    let train_path = dir.join("train.csv");
    let test_path = dir.join("test.csv");
    fs::write(&train_path, train).unwrap();
    fs::write(&test_path, test).unwrap();
    (train_path, test_path)
}

fn options() -> DatasetOptions {
    DatasetOptions {
        has_headers: false,
        label_column: Some(5),
    }
}

#[test]
fn sweep_flags_attacks_and_writes_reports() {
    let dir = tempfile::tempdir().unwrap();
    let (train_path, test_path) = write_fixtures(dir.path());
    let train = Dataset::from_csv(&train_path, &options()).unwrap();
    let test = Dataset::from_csv(&test_path, &options()).unwrap();

    let config = Config {
        k_values: vec![2, 3],
        categorical_columns: vec![1, 2],
        ..Config::default()
    };
    let configs = config.cluster_configs();
    let recipe = config.recipe(configs[0].clone()).unwrap();

    let out_dir = dir.path().join("reports");
    let reporters = Reporters::new().with(JsonReporter::new(&out_dir).unwrap());
    let mut orchestrator = Orchestrator::new(reporters);
    let outcomes = orchestrator
        .run_recipe(&recipe, &configs[1..], &train, &test)
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    let labels = test.labels();
    for outcome in &outcomes {
        let flagged: Vec<usize> = outcome.anomalies.iter().map(|a| a.position).collect();
        assert_eq!(flagged, vec![2, 3], "{}", outcome.label);

        let evaluation = Evaluation::compute(&outcome.anomalies, &labels, "normal.");
        assert_eq!(evaluation.recall(), Some(1.0));
        assert_eq!(evaluation.false_positive_rate(), Some(0.0));
    }

    let scores = fs::read_to_string(out_dir.join("scores.jsonl")).unwrap();
    assert_eq!(scores.lines().count(), 2);
    let anomaly_files = fs::read_dir(&out_dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with("anomalies-"))
        .count();
    assert_eq!(anomaly_files, 2);
}

#[test]
fn every_algorithm_keeps_training_data_inside_thresholds() {
    let dir = tempfile::tempdir().unwrap();
    let (train_path, _) = write_fixtures(dir.path());
    let train = Dataset::from_csv(&train_path, &options()).unwrap();

    let config = Config {
        categorical_columns: vec![1, 2],
        ..Config::default()
    };
    for algorithm in [
        AlgorithmKind::KMeans,
        AlgorithmKind::BisectingKMeans,
        AlgorithmKind::GaussianMixture,
    ] {
        let recipe = config.recipe(ClusterConfig::new(algorithm, 2)).unwrap();
        let mut orchestrator = Orchestrator::new(MemoryReporter::default());
        let outcomes = orchestrator
            .run_recipe(&recipe, &[], &train, &train)
            .unwrap();

        assert!(outcomes[0].anomalies.is_empty(), "{algorithm}");
        assert_eq!(outcomes[0].tested, train.len());
        assert_eq!(orchestrator.reporter().scores().len(), 1);
    }
}

#[test]
fn split_dataset_runs_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let (train_path, _) = write_fixtures(dir.path());
    let data = Dataset::from_csv(&train_path, &options()).unwrap();
    let (train, test) = data.split(0.75, 7);
    assert_eq!(train.len() + test.len(), data.len());

    let recipe = Config {
        categorical_columns: vec![1, 2],
        ..Config::default()
    }
    .recipe(ClusterConfig::new(AlgorithmKind::KMeans, 2))
    .unwrap();
    let mut orchestrator = Orchestrator::new(MemoryReporter::default());
    let outcome = orchestrator
        .run_recipe(&recipe, &[], &train, &test)
        .unwrap()
        .remove(0);
    assert_eq!(outcome.tested, test.len());
    assert_eq!(outcome.thresholds.len(), 2);
}
