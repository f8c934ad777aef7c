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

//! Raw traffic records loaded from CSV.

use crate::features::FeatureError;
use csv::{ReaderBuilder, Trim};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// How to read a CSV file into a [`Dataset`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetOptions {
    /// First row holds column names
    #[serde(default)]
    pub has_headers: bool,
    /// Column holding the ground-truth label; it is kept out of the features
    #[serde(default)]
    pub label_column: Option<usize>,
}

/// One raw row: its feature fields (label removed) and optional label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub fields: Vec<String>,
    pub label: Option<String>,
}

impl Record {
    #[must_use]
    pub const fn new(fields: Vec<String>, label: Option<String>) -> Self {
        Self { fields, label }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    headers: Option<Vec<String>>,
    records: Vec<Record>,
}

impl Dataset {
    #[must_use]
    pub const fn from_records(records: Vec<Record>) -> Self {
        Self {
            headers: None,
            records,
        }
    }

    /// Load a CSV file from disk
    pub fn from_csv(path: &Path, options: &DatasetOptions) -> Result<Self, FeatureError> {
        let file = File::open(path).map_err(|source| FeatureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(BufReader::new(file), options)?;
        tracing::info!(
            path = %path.display(),
            records = dataset.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Read CSV rows from any reader.
    ///
    /// Every row must have as many fields as the first one.
    pub fn from_reader<R: Read>(reader: R, options: &DatasetOptions) -> Result<Self, FeatureError> {
        profiling::scope!("Dataset::from_reader");
        let mut reader = ReaderBuilder::new()
            .has_headers(options.has_headers)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = if options.has_headers {
            let mut names: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
            if let Some(label) = options.label_column {
                if label < names.len() {
                    names.remove(label);
                }
            }
            Some(names)
        } else {
            None
        };

        let mut records = Vec::new();
        let mut width = None;
        for (row, result) in reader.records().enumerate() {
            let raw = result?;
            let expected = *width.get_or_insert(raw.len());
            if raw.len() != expected {
                return Err(FeatureError::RaggedRow {
                    row,
                    expected,
                    found: raw.len(),
                });
            }

            let mut fields: Vec<String> = raw.iter().map(str::to_owned).collect();
            let label = match options.label_column {
                Some(column) if column < fields.len() => Some(fields.remove(column)),
                Some(column) => {
                    return Err(FeatureError::ColumnOutOfRange {
                        column,
                        width: fields.len(),
                    })
                }
                None => None,
            };
            records.push(Record { fields, label });
        }

        Ok(Self { headers, records })
    }

    #[must_use]
    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of feature fields per record, taken from the first record
    #[must_use]
    pub fn width(&self) -> Option<usize> {
        self.records.first().map(|r| r.fields.len())
    }

    /// Labels in record order
    #[must_use]
    pub fn labels(&self) -> Vec<Option<&str>> {
        self.records.iter().map(|r| r.label.as_deref()).collect()
    }

    /// Seeded random split into `(train, test)`.
    ///
    /// `train_fraction` is clamped to `[0, 1]`; both halves keep the
    /// original record order.
    #[must_use]
    pub fn split(&self, train_fraction: f64, seed: u64) -> (Self, Self) {
        let mut indices: Vec<usize> = (0..self.records.len()).collect();
        indices.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));

        let train_len = (self.records.len() as f64 * train_fraction.clamp(0.0, 1.0)).round() as usize;
        let (train_idx, test_idx) = indices.split_at(train_len);

        let pick = |idx: &[usize]| {
            let mut idx = idx.to_vec();
            idx.sort_unstable();
            Self {
                headers: self.headers.clone(),
                records: idx.into_iter().map(|i| self.records[i].clone()).collect(),
            }
        };
        (pick(train_idx), pick(test_idx))
    }
}
