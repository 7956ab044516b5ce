// This file is part of the product Inkpost.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! In-memory store implementations for unit tests.

use super::{PostStore, PostUpdate, StoreError, UserStore, UserUpdate};
use crate::posts::types::{Category, Post};
use crate::users::types::User;
use std::collections::HashMap;
use std::sync::RwLock;

pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_users(users: Vec<User>) -> Self {
        let data = users
            .into_iter()
            .map(|user| (user.id.clone(), user))
            .collect();
        Self {
            users: RwLock::new(data),
        }
    }
}

impl UserStore for MemoryUserStore {
    fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().expect("lock").get(id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .expect("lock")
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    fn list(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.users.read().expect("lock").values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    fn create(&self, user: User) -> Result<User, StoreError> {
        self.users
            .write()
            .expect("lock")
            .insert(user.id.clone(), user.clone());
        Ok(user)
    }

    fn update(&self, id: &str, update: UserUpdate) -> Result<Option<User>, StoreError> {
        let mut guard = self.users.write().expect("lock");
        let Some(user) = guard.get_mut(id) else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(password_hash) = update.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(avatar) = update.avatar {
            user.avatar = Some(avatar);
        }
        Ok(Some(user.clone()))
    }

    fn adjust_post_count(&self, id: &str, delta: i64) -> Result<Option<User>, StoreError> {
        let mut guard = self.users.write().expect("lock");
        let Some(user) = guard.get_mut(id) else {
            return Ok(None);
        };
        user.posts = (user.posts + delta).max(0);
        Ok(Some(user.clone()))
    }
}

pub struct MemoryPostStore {
    posts: RwLock<HashMap<String, Post>>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
        }
    }
}

impl PostStore for MemoryPostStore {
    fn find_by_id(&self, id: &str) -> Result<Option<Post>, StoreError> {
        Ok(self.posts.read().expect("lock").get(id).cloned())
    }

    fn list_recent(&self) -> Result<Vec<Post>, StoreError> {
        let mut posts: Vec<Post> = self.posts.read().expect("lock").values().cloned().collect();
        posts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(posts)
    }

    fn list_by_category(&self, category: Category) -> Result<Vec<Post>, StoreError> {
        let mut posts: Vec<Post> = self
            .posts
            .read()
            .expect("lock")
            .values()
            .filter(|post| post.category == category)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    fn list_by_creator(&self, creator: &str) -> Result<Vec<Post>, StoreError> {
        let mut posts: Vec<Post> = self
            .posts
            .read()
            .expect("lock")
            .values()
            .filter(|post| post.creator == creator)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    fn create(&self, post: Post) -> Result<Post, StoreError> {
        self.posts
            .write()
            .expect("lock")
            .insert(post.id.clone(), post.clone());
        Ok(post)
    }

    fn update(&self, id: &str, update: PostUpdate) -> Result<Option<Post>, StoreError> {
        let mut guard = self.posts.write().expect("lock");
        let Some(post) = guard.get_mut(id) else {
            return Ok(None);
        };
        post.title = update.title;
        post.category = update.category;
        post.desc = update.desc;
        if let Some(thumbnail) = update.thumbnail {
            post.thumbnail = thumbnail;
        }
        post.updated_at = update.updated_at;
        Ok(Some(post.clone()))
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.posts.write().expect("lock").remove(id).is_some())
    }
}
