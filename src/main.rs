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

use anyhow::Context;
use clap::Parser;
use flowcrab::cluster::AlgorithmKind;
use flowcrab::config::{Config, ScalerKind};
use flowcrab::features::Dataset;
use flowcrab::pipeline::Orchestrator;
use flowcrab::report::{ConsoleReporter, Evaluation, JsonReporter, Reporters};
use std::path::PathBuf;

#[cfg(feature = "ram-profiling")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

#[derive(Parser, Debug)]
#[command(name = "flowcrab")]
#[command(version)]
#[command(about = "Flag anomalous network traffic records by their distance to cluster centers", long_about = None)]
struct Args {
    /// CSV file with training records
    #[arg(value_name = "TRAIN")]
    train: PathBuf,

    /// CSV file with records to classify; without it TRAIN is split
    #[arg(long, value_name = "PATH")]
    test: Option<PathBuf>,

    #[arg(long, value_enum)]
    algorithm: Option<AlgorithmKind>,

    /// Number of clusters; repeat to sweep several values
    #[arg(short = 'k', value_name = "K")]
    k: Vec<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Column holding the ground-truth label
    #[arg(long, value_name = "COLUMN")]
    label_column: Option<usize>,

    /// Comma-separated text columns to index
    #[arg(long, value_delimiter = ',', value_name = "COLUMNS")]
    categorical: Option<Vec<usize>>,

    #[arg(long, value_enum)]
    scaler: Option<ScalerKind>,

    /// Config file to use instead of the one in the config directory
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory for JSON reports
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Path for the DHAT heap profiling output (only used when built with --features ram-profiling)
    #[cfg(feature = "ram-profiling")]
    #[arg(
        long = "profile-output",
        value_name = "PROFILE_FILE",
        default_value = "dhat-heap.json"
    )]
    profile_output: PathBuf,
}

impl Args {
    /// Command-line values win over the config file
    fn apply(&self, config: &mut Config) {
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if !self.k.is_empty() {
            config.k_values.clone_from(&self.k);
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.label_column.is_some() {
            config.label_column = self.label_column;
        }
        if let Some(columns) = &self.categorical {
            config.categorical_columns.clone_from(columns);
        }
        if let Some(scaler) = self.scaler {
            config.scaler = scaler;
        }
        if self.output.is_some() {
            config.output_dir.clone_from(&self.output);
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Set RUST_LOG to override (e.g. RUST_LOG=flowcrab=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::info!("FlowCrab starting up (version {})", env!("CARGO_PKG_VERSION"));

    #[cfg(feature = "ram-profiling")]
    let _profiler = {
        tracing::info!("RAM profiling enabled, output: {:?}", args.profile_output);
        dhat::Profiler::builder()
            .file_name(args.profile_output.clone())
            .build()
    };

    #[cfg(feature = "cpu-profiling")]
    {
        tracing::info!("CPU profiling enabled with Tracy - run Tracy profiler to connect");
    }

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    args.apply(&mut config);

    let options = config.dataset_options();
    let (train, test) = match &args.test {
        Some(test) => (
            Dataset::from_csv(&args.train, &options)?,
            Dataset::from_csv(test, &options)?,
        ),
        None => Dataset::from_csv(&args.train, &options)?.split(config.train_fraction, config.seed),
    };
    tracing::info!(train = train.len(), test = test.len(), "datasets ready");

    let mut configs = config.cluster_configs().into_iter();
    let first = configs.next().context("No k values configured")?;
    let rest: Vec<_> = configs.collect();
    let recipe = config.recipe(first)?;

    let mut reporters = Reporters::new().with(ConsoleReporter::stdout());
    if let Some(dir) = &config.output_dir {
        reporters = reporters.with(JsonReporter::new(dir)?);
    }

    let mut orchestrator = Orchestrator::new(reporters);
    let outcomes = orchestrator.run_recipe(&recipe, &rest, &train, &test)?;

    let labels = test.labels();
    if labels.iter().any(Option::is_some) {
        for outcome in &outcomes {
            let evaluation = Evaluation::compute(&outcome.anomalies, &labels, &config.normal_label);
            println!("{}: {evaluation}", outcome.label);
        }
    }

    Ok(())
}
