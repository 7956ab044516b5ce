// This file is part of the product Inkpost.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::posts::types::{Category, Post};
use crate::users::types::User;
use chrono::{DateTime, Utc};

pub mod file;
#[cfg(test)]
mod memory;

pub use file::{FilePostStore, FileUserStore};
#[cfg(test)]
pub use memory::{MemoryPostStore, MemoryUserStore};

#[derive(Debug)]
pub enum StoreError {
    File(String),
    Parse(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::File(msg) => write!(f, "File error: {}", msg),
            StoreError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Field updates for an existing user; `None` leaves a field untouched.
#[derive(Debug, Default, Clone)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub avatar: Option<String>,
}

/// Field updates for an existing post. Text fields are always replaced
/// together; the thumbnail only changes when a new upload was stored.
/// The creator is deliberately absent: it is immutable.
#[derive(Debug, Clone)]
pub struct PostUpdate {
    pub title: String,
    pub category: Category,
    pub desc: String,
    pub thumbnail: Option<String>,
    pub updated_at: DateTime<Utc>,
}

pub trait UserStore: Send + Sync {
    fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;
    /// Lookup by already-normalized (lowercase) email.
    fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    /// All users, oldest first.
    fn list(&self) -> Result<Vec<User>, StoreError>;
    fn create(&self, user: User) -> Result<User, StoreError>;
    fn update(&self, id: &str, update: UserUpdate) -> Result<Option<User>, StoreError>;
    /// Atomic post-count adjustment: the read-modify-write happens under
    /// the store's write lock, so concurrent adjustments cannot lose an
    /// update. The count never goes below zero.
    fn adjust_post_count(&self, id: &str, delta: i64) -> Result<Option<User>, StoreError>;
}

pub trait PostStore: Send + Sync {
    fn find_by_id(&self, id: &str) -> Result<Option<Post>, StoreError>;
    /// All posts, most recently updated first.
    fn list_recent(&self) -> Result<Vec<Post>, StoreError>;
    /// Posts in one category, most recently created first.
    fn list_by_category(&self, category: Category) -> Result<Vec<Post>, StoreError>;
    /// Posts by one creator, most recently created first.
    fn list_by_creator(&self, creator: &str) -> Result<Vec<Post>, StoreError>;
    fn create(&self, post: Post) -> Result<Post, StoreError>;
    fn update(&self, id: &str, update: PostUpdate) -> Result<Option<Post>, StoreError>;
    /// Returns whether a record was actually removed.
    fn delete(&self, id: &str) -> Result<bool, StoreError>;
}
