// This file is part of the product Inkpost.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::{PostStore, PostUpdate, StoreError, UserStore, UserUpdate};
use crate::posts::types::{Category, Post};
use crate::users::types::User;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// YAML-file-backed user records: the whole map lives in memory behind a
/// lock and every mutation rewrites the file atomically before the
/// in-memory copy is committed.
pub struct FileUserStore {
    path: PathBuf,
    users: RwLock<HashMap<String, User>>,
}

impl FileUserStore {
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let users = read_record_map(&path)?;
        Ok(Self {
            path,
            users: RwLock::new(users),
        })
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, HashMap<String, User>> {
        match self.users.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("user store lock poisoned on read; recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, HashMap<String, User>> {
        match self.users.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("user store lock poisoned on write; recovering");
                poisoned.into_inner()
            }
        }
    }
}

impl UserStore for FileUserStore {
    fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.read_guard().get(id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read_guard()
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    fn list(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.read_guard().values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    fn create(&self, user: User) -> Result<User, StoreError> {
        let mut guard = self.write_guard();
        let mut updated = guard.clone();
        updated.insert(user.id.clone(), user.clone());
        write_record_map(&self.path, &updated)?;
        *guard = updated;
        Ok(user)
    }

    fn update(&self, id: &str, update: UserUpdate) -> Result<Option<User>, StoreError> {
        let mut guard = self.write_guard();
        let mut updated = guard.clone();
        let Some(user) = updated.get_mut(id) else {
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
        let result = user.clone();
        write_record_map(&self.path, &updated)?;
        *guard = updated;
        Ok(Some(result))
    }

    fn adjust_post_count(&self, id: &str, delta: i64) -> Result<Option<User>, StoreError> {
        let mut guard = self.write_guard();
        let mut updated = guard.clone();
        let Some(user) = updated.get_mut(id) else {
            return Ok(None);
        };
        user.posts = (user.posts + delta).max(0);
        let result = user.clone();
        write_record_map(&self.path, &updated)?;
        *guard = updated;
        Ok(Some(result))
    }
}

/// YAML-file-backed post records, same locking and persistence discipline
/// as the user store.
pub struct FilePostStore {
    path: PathBuf,
    posts: RwLock<HashMap<String, Post>>,
}

impl FilePostStore {
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let posts = read_record_map(&path)?;
        Ok(Self {
            path,
            posts: RwLock::new(posts),
        })
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, HashMap<String, Post>> {
        match self.posts.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("post store lock poisoned on read; recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, HashMap<String, Post>> {
        match self.posts.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("post store lock poisoned on write; recovering");
                poisoned.into_inner()
            }
        }
    }
}

impl PostStore for FilePostStore {
    fn find_by_id(&self, id: &str) -> Result<Option<Post>, StoreError> {
        Ok(self.read_guard().get(id).cloned())
    }

    fn list_recent(&self) -> Result<Vec<Post>, StoreError> {
        let mut posts: Vec<Post> = self.read_guard().values().cloned().collect();
        posts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(posts)
    }

    fn list_by_category(&self, category: Category) -> Result<Vec<Post>, StoreError> {
        let mut posts: Vec<Post> = self
            .read_guard()
            .values()
            .filter(|post| post.category == category)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    fn list_by_creator(&self, creator: &str) -> Result<Vec<Post>, StoreError> {
        let mut posts: Vec<Post> = self
            .read_guard()
            .values()
            .filter(|post| post.creator == creator)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    fn create(&self, post: Post) -> Result<Post, StoreError> {
        let mut guard = self.write_guard();
        let mut updated = guard.clone();
        updated.insert(post.id.clone(), post.clone());
        write_record_map(&self.path, &updated)?;
        *guard = updated;
        Ok(post)
    }

    fn update(&self, id: &str, update: PostUpdate) -> Result<Option<Post>, StoreError> {
        let mut guard = self.write_guard();
        let mut updated = guard.clone();
        let Some(post) = updated.get_mut(id) else {
            return Ok(None);
        };
        post.title = update.title;
        post.category = update.category;
        post.desc = update.desc;
        if let Some(thumbnail) = update.thumbnail {
            post.thumbnail = thumbnail;
        }
        post.updated_at = update.updated_at;
        let result = post.clone();
        write_record_map(&self.path, &updated)?;
        *guard = updated;
        Ok(Some(result))
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut guard = self.write_guard();
        let mut updated = guard.clone();
        if updated.remove(id).is_none() {
            return Ok(false);
        }
        write_record_map(&self.path, &updated)?;
        *guard = updated;
        Ok(true)
    }
}

fn read_record_map<T: DeserializeOwned>(path: &Path) -> Result<HashMap<String, T>, StoreError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| StoreError::File(format!("Failed to read {}: {}", path.display(), e)))?;
    if content.trim().is_empty() {
        return Ok(HashMap::new());
    }
    serde_yaml::from_str(&content)
        .map_err(|e| StoreError::Parse(format!("Failed to parse {}: {}", path.display(), e)))
}

fn write_record_map<T: Serialize>(path: &Path, map: &HashMap<String, T>) -> Result<(), StoreError> {
    let content = serde_yaml::to_string(map)
        .map_err(|e| StoreError::Parse(format!("Failed to serialize records: {}", e)))?;

    let parent = path
        .parent()
        .ok_or_else(|| StoreError::File("Record file path has no parent directory".to_string()))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| StoreError::File("Record file path has no file name".to_string()))?;
    let (mut file, temp_path) = create_temp_file(parent, file_name)?;

    if let Err(err) = file.write_all(content.as_bytes()) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(StoreError::File(format!(
            "Failed to write record temp file: {}",
            err
        )));
    }
    if let Err(err) = file.sync_all() {
        let _ = std::fs::remove_file(&temp_path);
        return Err(StoreError::File(format!(
            "Failed to sync record temp file: {}",
            err
        )));
    }

    if let Err(err) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(StoreError::File(format!(
            "Failed to replace record file: {}",
            err
        )));
    }

    #[cfg(unix)]
    {
        if let Err(err) = sync_parent_dir(parent) {
            log::warn!("Record directory sync failed: {}", err);
        }
    }

    Ok(())
}

fn create_temp_file(
    dir: &Path,
    file_name: &std::ffi::OsStr,
) -> Result<(std::fs::File, PathBuf), StoreError> {
    use std::fs::OpenOptions;
    const MAX_ATTEMPTS: u32 = 100;
    let base = file_name.to_string_lossy();
    for attempt in 0..MAX_ATTEMPTS {
        let candidate = dir.join(format!(".{}.tmp.{}.{}", base, std::process::id(), attempt));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => return Ok((file, candidate)),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(StoreError::File(format!(
                    "Failed to create record temp file: {}",
                    err
                )));
            }
        }
    }
    Err(StoreError::File(
        "Failed to create record temp file after repeated attempts".to_string(),
    ))
}

#[cfg(unix)]
fn sync_parent_dir(parent: &Path) -> Result<(), StoreError> {
    let dir = std::fs::File::open(parent).map_err(|err| {
        StoreError::File(format!(
            "Failed to open record directory for sync: {}",
            err
        ))
    })?;
    dir.sync_all()
        .map_err(|err| StoreError::File(format!("Failed to sync record directory: {}", err)))
}
