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

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Dense indices for the text categories of one column.
///
/// The most frequent category gets index 0; ties keep the order in which the
/// categories first appeared. Anything not seen while fitting maps to
/// `len()`, one past the last known index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryIndex {
    column: usize,
    categories: IndexMap<String, usize>,
}

impl CategoryIndex {
    pub fn fit<'a>(column: usize, values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for value in values {
            *counts.entry(value).or_insert(0) += 1;
        }
        // Stable sort keeps first-appearance order among equal counts
        counts.sort_by(|_, a, _, b| b.cmp(a));

        let categories = counts
            .keys()
            .enumerate()
            .map(|(idx, name)| ((*name).to_owned(), idx))
            .collect();
        Self { column, categories }
    }

    #[must_use]
    pub const fn column(&self) -> usize {
        self.column
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Width of the one-hot block, including the slot for unseen values
    #[must_use]
    pub fn slots(&self) -> usize {
        self.categories.len() + 1
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.categories.contains_key(value)
    }

    #[must_use]
    pub fn index_of(&self, value: &str) -> usize {
        self.categories
            .get(value)
            .copied()
            .unwrap_or(self.categories.len())
    }

    /// Categories in index order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }
}
