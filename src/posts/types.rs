// This file is part of the product Inkpost.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of post categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    News,
    Business,
    Education,
    Entertainment,
    Sports,
    Art,
    Opinion,
    Uncategorized,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::News,
        Category::Business,
        Category::Education,
        Category::Entertainment,
        Category::Sports,
        Category::Art,
        Category::Opinion,
        Category::Uncategorized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::News => "News",
            Category::Business => "Business",
            Category::Education => "Education",
            Category::Entertainment => "Entertainment",
            Category::Sports => "Sports",
            Category::Art => "Art",
            Category::Opinion => "Opinion",
            Category::Uncategorized => "Uncategorized",
        }
    }

    /// Parse a category name, ignoring ASCII case.
    pub fn parse(raw: &str) -> Option<Category> {
        let trimmed = raw.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|category| category.as_str().eq_ignore_ascii_case(trimmed))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored post record. `creator` is set once at creation and never
/// changes; `thumbnail` always names a live file in the upload store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub desc: String,
    pub thumbnail: String,
    pub creator: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
