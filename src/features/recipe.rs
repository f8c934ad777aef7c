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

use crate::cluster::ClusterConfig;
use crate::core::Point;
use crate::features::{CategoryIndex, Dataset, FeatureError, FittedScaler, Record};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One feature-preparation step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    /// Replace the text values of `columns` with dense category indices
    Index { columns: Vec<usize> },
    /// Expand every indexed column into a one-hot block
    OneHot,
    StandardScale,
    MinMaxScale,
}

impl Stage {
    const fn is_text(&self) -> bool {
        matches!(self, Self::Index { .. } | Self::OneHot)
    }
}

/// Ordered feature stages plus the clustering to run on their output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    stages: Vec<Stage>,
    model: ClusterConfig,
}

#[derive(Debug, Clone)]
pub struct RecipeBuilder {
    stages: Vec<Stage>,
    model: ClusterConfig,
}

impl RecipeBuilder {
    #[must_use]
    pub fn index(mut self, columns: impl IntoIterator<Item = usize>) -> Self {
        self.stages.push(Stage::Index {
            columns: columns.into_iter().collect(),
        });
        self
    }

    #[must_use]
    pub fn one_hot(mut self) -> Self {
        self.stages.push(Stage::OneHot);
        self
    }

    #[must_use]
    pub fn standard_scale(mut self) -> Self {
        self.stages.push(Stage::StandardScale);
        self
    }

    #[must_use]
    pub fn min_max_scale(mut self) -> Self {
        self.stages.push(Stage::MinMaxScale);
        self
    }

    #[must_use]
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Replace the clustering choice
    #[must_use]
    pub fn cluster(mut self, model: ClusterConfig) -> Self {
        self.model = model;
        self
    }

    pub fn build(self) -> Result<Recipe, FeatureError> {
        let mut indexed = BTreeSet::new();
        let mut one_hot = false;
        let mut scaled = false;

        for stage in &self.stages {
            if stage.is_text() && scaled {
                return Err(FeatureError::InvalidRecipe(
                    "text stages must come before scalers".to_owned(),
                ));
            }
            match stage {
                Stage::Index { columns } => {
                    if one_hot {
                        return Err(FeatureError::InvalidRecipe(
                            "index stages must come before one_hot".to_owned(),
                        ));
                    }
                    for &column in columns {
                        if !indexed.insert(column) {
                            return Err(FeatureError::InvalidRecipe(format!(
                                "column {column} is indexed twice"
                            )));
                        }
                    }
                }
                Stage::OneHot => {
                    if indexed.is_empty() {
                        return Err(FeatureError::InvalidRecipe(
                            "one_hot needs a prior index stage".to_owned(),
                        ));
                    }
                    if one_hot {
                        return Err(FeatureError::InvalidRecipe(
                            "one_hot appears twice".to_owned(),
                        ));
                    }
                    one_hot = true;
                }
                Stage::StandardScale | Stage::MinMaxScale => scaled = true,
            }
        }

        Ok(Recipe {
            stages: self.stages,
            model: self.model,
        })
    }
}

impl Recipe {
    #[must_use]
    pub const fn builder(model: ClusterConfig) -> RecipeBuilder {
        RecipeBuilder {
            stages: Vec::new(),
            model,
        }
    }

    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    #[must_use]
    pub const fn model(&self) -> &ClusterConfig {
        &self.model
    }

    /// Same stages with a different clustering choice
    #[must_use]
    pub fn with_model(&self, model: ClusterConfig) -> Self {
        Self {
            stages: self.stages.clone(),
            model,
        }
    }

    fn indexed_columns(&self) -> BTreeSet<usize> {
        self.stages
            .iter()
            .filter_map(|s| match s {
                Stage::Index { columns } => Some(columns.iter().copied()),
                Stage::OneHot | Stage::StandardScale | Stage::MinMaxScale => None,
            })
            .flatten()
            .collect()
    }

    /// Learn category indices and scaler statistics from `train`
    pub fn fit_features(&self, train: &Dataset) -> Result<FittedRecipe, FeatureError> {
        profiling::scope!("Recipe::fit_features");
        let width = train.width().ok_or(FeatureError::EmptyDataset)?;

        if let Some((row, record)) = train
            .records()
            .iter()
            .enumerate()
            .find(|(_, r)| r.fields.len() != width)
        {
            return Err(FeatureError::RaggedRow {
                row,
                expected: width,
                found: record.fields.len(),
            });
        }

        let indexed = self.indexed_columns();
        if let Some(&column) = indexed.iter().find(|&&c| c >= width) {
            return Err(FeatureError::ColumnOutOfRange { column, width });
        }

        let encoders: Vec<CategoryIndex> = indexed
            .into_iter()
            .map(|column| {
                CategoryIndex::fit(
                    column,
                    train.records().iter().map(|r| r.fields[column].as_str()),
                )
            })
            .collect();
        for encoder in &encoders {
            tracing::debug!(
                column = encoder.column(),
                categories = encoder.len(),
                "indexed categorical column"
            );
        }

        let mut fitted = FittedRecipe {
            width,
            encoders,
            one_hot: self.stages.contains(&Stage::OneHot),
            scalers: Vec::new(),
        };

        let mut rows = fitted.encode_all(train)?;
        for stage in &self.stages {
            let scaler = match stage {
                Stage::StandardScale => FittedScaler::fit_standard(&rows),
                Stage::MinMaxScale => FittedScaler::fit_min_max(&rows),
                Stage::Index { .. } | Stage::OneHot => continue,
            };
            rows.par_iter_mut().for_each(|row| scaler.apply(row));
            fitted.scalers.push(scaler);
        }

        tracing::info!(
            records = train.len(),
            dim = fitted.dim(),
            "fitted feature recipe"
        );
        Ok(fitted)
    }
}

/// A recipe whose stages have learned their parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedRecipe {
    width: usize,
    encoders: Vec<CategoryIndex>,
    one_hot: bool,
    scalers: Vec<FittedScaler>,
}

impl FittedRecipe {
    /// Dimension of the points this recipe produces
    #[must_use]
    pub fn dim(&self) -> usize {
        let text: usize = if self.one_hot {
            self.encoders.iter().map(CategoryIndex::slots).sum()
        } else {
            self.encoders.len()
        };
        self.width - self.encoders.len() + text
    }

    #[must_use]
    pub fn encoders(&self) -> &[CategoryIndex] {
        &self.encoders
    }

    /// Turn every record of `dataset` into a point, in record order
    pub fn transform(&self, dataset: &Dataset) -> Result<Vec<Point>, FeatureError> {
        profiling::scope!("FittedRecipe::transform");
        let mut rows = self.encode_all(dataset)?;
        rows.par_iter_mut().for_each(|row| {
            for scaler in &self.scalers {
                scaler.apply(row);
            }
        });

        let unseen: usize = dataset
            .records()
            .iter()
            .map(|r| {
                self.encoders
                    .iter()
                    .filter(|e| !e.contains(&r.fields[e.column()]))
                    .count()
            })
            .sum();
        if unseen > 0 {
            tracing::warn!(unseen, "categories not seen during fitting");
        }

        Ok(rows.into_iter().map(Point::new).collect())
    }

    fn encode_all(&self, dataset: &Dataset) -> Result<Vec<Vec<f64>>, FeatureError> {
        dataset
            .records()
            .par_iter()
            .enumerate()
            .map(|(row, record)| self.encode(row, record))
            .collect()
    }

    /// Text and numeric columns of one record, before scaling
    fn encode(&self, row: usize, record: &Record) -> Result<Vec<f64>, FeatureError> {
        if record.fields.len() != self.width {
            return Err(FeatureError::DimensionMismatch {
                expected: self.width,
                found: record.fields.len(),
            });
        }

        let mut out = Vec::with_capacity(self.dim());
        let mut encoders = self.encoders.iter().peekable();
        for (column, value) in record.fields.iter().enumerate() {
            match encoders.next_if(|e| e.column() == column) {
                Some(encoder) if self.one_hot => {
                    let hot = encoder.index_of(value);
                    out.extend((0..encoder.slots()).map(|slot| if slot == hot { 1.0 } else { 0.0 }));
                }
                Some(encoder) => out.push(encoder.index_of(value) as f64),
                None => {
                    let parsed = value
                        .parse::<f64>()
                        .ok()
                        .filter(|x| x.is_finite())
                        .ok_or_else(|| FeatureError::NotNumeric {
                            row,
                            column,
                            value: value.clone(),
                        })?;
                    out.push(parsed);
                }
            }
        }
        Ok(out)
    }
}
