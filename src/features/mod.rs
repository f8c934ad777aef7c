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

//! Turning raw CSV traffic records into [`Point`](crate::core::Point)s.
//!
//! A [`Recipe`] is a declarative list of [`Stage`]s plus the clustering
//! choice. Fitting it on training records yields a [`FittedRecipe`] that
//! applies the learned category indices and scaler statistics to any
//! dataset with the same layout.

pub mod dataset;
pub mod encoder;
pub mod recipe;
pub mod scaler;

use std::path::PathBuf;
use thiserror::Error;

pub use dataset::{Dataset, DatasetOptions, Record};
pub use encoder::CategoryIndex;
pub use recipe::{FittedRecipe, Recipe, RecipeBuilder, Stage};
pub use scaler::FittedScaler;

#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: expected {expected} fields, found {found}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("column {column} does not exist in rows of {width} fields")]
    ColumnOutOfRange { column: usize, width: usize },

    #[error("row {row}, column {column}: {value:?} is not a finite number")]
    NotNumeric {
        row: usize,
        column: usize,
        value: String,
    },

    #[error("invalid recipe: {0}")]
    InvalidRecipe(String),

    #[error("cannot fit features on an empty dataset")]
    EmptyDataset,

    #[error("recipe was fitted on {expected} fields, record has {found}")]
    DimensionMismatch { expected: usize, found: usize },
}
