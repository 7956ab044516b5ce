// This file is part of the product Inkpost.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{Category, Post};
use crate::assets::{AssetStore, UploadedFile};
use crate::config::ValidatedConfig;
use crate::error::ApiError;
use crate::store::{PostStore, PostUpdate, UserStore};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

const MIN_EDIT_DESC_CHARS: usize = 12;

/// Post lifecycle: every mutation is gated on the requester being the
/// post's creator, and every thumbnail change goes through the asset
/// store before the record is persisted.
pub struct PostService {
    posts: Arc<dyn PostStore>,
    users: Arc<dyn UserStore>,
    assets: Arc<AssetStore>,
    thumbnail_limit: usize,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostStore>,
        users: Arc<dyn UserStore>,
        assets: Arc<AssetStore>,
        config: &ValidatedConfig,
    ) -> Self {
        Self {
            posts,
            users,
            assets,
            thumbnail_limit: config.upload.thumbnail_max_bytes,
        }
    }

    pub fn create(
        &self,
        title: Option<&str>,
        category: Option<&str>,
        desc: Option<&str>,
        thumbnail: Option<&UploadedFile>,
        creator_id: &str,
    ) -> Result<Post, ApiError> {
        let (title, category_raw, desc) = require_text_fields(title, category, desc)
            .ok_or_else(|| {
                ApiError::Validation("Fill in all fields and choose a thumbnail.".to_string())
            })?;
        let category = parse_category(category_raw)?;
        let thumbnail = thumbnail.ok_or_else(|| {
            ApiError::Validation("Fill in all fields and choose a thumbnail.".to_string())
        })?;

        // The asset must be confirmed on disk before the record exists.
        let stored_name = self.assets.store(thumbnail, self.thumbnail_limit)?;

        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            category,
            desc: desc.to_string(),
            thumbnail: stored_name.clone(),
            creator: creator_id.to_string(),
            created_at: now,
            updated_at: now,
        };

        let post = self.posts.create(post).map_err(|err| {
            log::error!(
                "post record write failed after storing thumbnail '{}'; file is orphaned: {}",
                stored_name,
                err
            );
            ApiError::Store(err)
        })?;

        if self
            .users
            .adjust_post_count(creator_id, 1)?
            .is_none()
        {
            log::warn!(
                "creator '{}' vanished before post-count increment for post '{}'",
                creator_id,
                post.id
            );
        }

        Ok(post)
    }

    pub fn get(&self, id: &str) -> Result<Post, ApiError> {
        self.posts
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound("Post not found.".to_string()))
    }

    pub fn list(&self) -> Result<Vec<Post>, ApiError> {
        Ok(self.posts.list_recent()?)
    }

    pub fn list_by_category(&self, category: &str) -> Result<Vec<Post>, ApiError> {
        let category = parse_category(category)?;
        Ok(self.posts.list_by_category(category)?)
    }

    pub fn list_by_creator(&self, creator_id: &str) -> Result<Vec<Post>, ApiError> {
        Ok(self.posts.list_by_creator(creator_id)?)
    }

    pub fn edit(
        &self,
        id: &str,
        requester_id: &str,
        title: Option<&str>,
        category: Option<&str>,
        desc: Option<&str>,
        thumbnail: Option<&UploadedFile>,
    ) -> Result<Post, ApiError> {
        let (title, category_raw, desc) = require_text_fields(title, category, desc)
            .ok_or_else(|| ApiError::Validation("Fill in all fields.".to_string()))?;
        if desc.chars().count() < MIN_EDIT_DESC_CHARS {
            return Err(ApiError::Validation(format!(
                "Description must be at least {} characters.",
                MIN_EDIT_DESC_CHARS
            )));
        }
        let category = parse_category(category_raw)?;

        // Ownership is settled before anything is touched, asset included.
        let existing = self.get(id)?;
        if existing.creator != requester_id {
            return Err(ApiError::Forbidden(
                "This is not your post to edit.".to_string(),
            ));
        }

        let new_thumbnail = match thumbnail {
            Some(upload) => Some(self.assets.replace(
                Some(&existing.thumbnail),
                upload,
                self.thumbnail_limit,
            )?),
            None => None,
        };

        let update = PostUpdate {
            title: title.to_string(),
            category,
            desc: desc.to_string(),
            thumbnail: new_thumbnail.clone(),
            updated_at: Utc::now(),
        };

        match self.posts.update(id, update)? {
            Some(post) => Ok(post),
            None => {
                if let Some(stored_name) = new_thumbnail {
                    log::warn!(
                        "post '{}' vanished during edit; new thumbnail '{}' is orphaned",
                        id,
                        stored_name
                    );
                }
                Err(ApiError::NotFound("Post not found.".to_string()))
            }
        }
    }

    pub fn delete(&self, id: &str, requester_id: &str) -> Result<(), ApiError> {
        let existing = self.get(id)?;
        if existing.creator != requester_id {
            return Err(ApiError::Forbidden(
                "This is not your post to delete.".to_string(),
            ));
        }

        // A failed thumbnail removal leaves an orphan behind; the record
        // still goes away.
        if let Err(err) = self.assets.remove(&existing.thumbnail) {
            log::warn!(
                "failed to remove thumbnail '{}' for post '{}': {}",
                existing.thumbnail,
                id,
                err
            );
        }

        if !self.posts.delete(id)? {
            return Err(ApiError::NotFound("Post not found.".to_string()));
        }

        if self
            .users
            .adjust_post_count(&existing.creator, -1)?
            .is_none()
        {
            log::warn!(
                "creator '{}' vanished before post-count decrement for post '{}'",
                existing.creator,
                id
            );
        }

        Ok(())
    }
}

fn require_text_fields<'a>(
    title: Option<&'a str>,
    category: Option<&'a str>,
    desc: Option<&'a str>,
) -> Option<(&'a str, &'a str, &'a str)> {
    let title = non_empty(title)?;
    let category = non_empty(category)?;
    let desc = non_empty(desc)?;
    Some((title, category, desc))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_category(raw: &str) -> Result<Category, ApiError> {
    Category::parse(raw)
        .ok_or_else(|| ApiError::Validation(format!("Unknown category '{}'.", raw.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, ServerConfig, UploadConfig, ValidatedConfig};
    use crate::store::{MemoryPostStore, MemoryUserStore};
    use crate::users::types::User;

    struct Fixture {
        _tmp: tempfile::TempDir,
        service: PostService,
        users: Arc<MemoryUserStore>,
        posts: Arc<MemoryPostStore>,
        uploads_dir: std::path::PathBuf,
    }

    fn test_config() -> ValidatedConfig {
        ValidatedConfig {
            server: ServerConfig::default(),
            auth: AuthConfig {
                secret: "post-service-test-secret-post-service".to_string(),
                token_lifetime_hours: 24,
            },
            upload: UploadConfig {
                thumbnail_max_bytes: 1024,
                avatar_max_bytes: 512,
                ..UploadConfig::default()
            },
        }
    }

    fn fixture_with_users(users: Vec<User>) -> Fixture {
        let tmp = tempfile::tempdir().expect("tempdir");
        let uploads_dir = tmp.path().to_path_buf();
        let config = test_config();
        let user_store = Arc::new(MemoryUserStore::from_users(users));
        let post_store = Arc::new(MemoryPostStore::new());
        let assets = Arc::new(AssetStore::new(
            uploads_dir.clone(),
            config.upload.allowed_extensions.clone(),
        ));
        let service = PostService::new(
            post_store.clone(),
            user_store.clone(),
            assets,
            &config,
        );
        Fixture {
            _tmp: tmp,
            service,
            users: user_store,
            posts: post_store,
            uploads_dir,
        }
    }

    fn author(id: &str) -> User {
        User {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            name: "Author".to_string(),
            password_hash: "digest".to_string(),
            avatar: None,
            posts: 0,
            created_at: Utc::now(),
        }
    }

    fn png(size: usize) -> UploadedFile {
        UploadedFile::new("cover.png", vec![0u8; size])
    }

    #[test]
    fn create_stores_thumbnail_and_increments_count() {
        let fx = fixture_with_users(vec![author("ann")]);

        let post = fx
            .service
            .create(Some("T"), Some("News"), Some("first post"), Some(&png(64)), "ann")
            .expect("create");

        assert!(fx.uploads_dir.join(&post.thumbnail).is_file());
        let ann = fx.users.find_by_id("ann").expect("find").expect("ann");
        assert_eq!(ann.posts, 1);
    }

    #[test]
    fn create_without_thumbnail_is_validation_error() {
        let fx = fixture_with_users(vec![author("ann")]);

        let result = fx
            .service
            .create(Some("T"), Some("News"), Some("desc"), None, "ann");
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[test]
    fn create_accepts_short_description() {
        // The >= 12 character rule applies to edits only.
        let fx = fixture_with_users(vec![author("ann")]);

        let result = fx
            .service
            .create(Some("T"), Some("News"), Some("short"), Some(&png(16)), "ann");
        assert!(result.is_ok());
    }

    #[test]
    fn edit_rejects_short_description() {
        let fx = fixture_with_users(vec![author("ann")]);
        let post = fx
            .service
            .create(Some("T"), Some("News"), Some("original words"), Some(&png(16)), "ann")
            .expect("create");

        let result = fx
            .service
            .edit(&post.id, "ann", Some("T"), Some("News"), Some("tiny"), None);
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[test]
    fn edit_by_non_owner_is_forbidden_and_mutates_nothing() {
        let fx = fixture_with_users(vec![author("ann"), author("bob")]);
        let post = fx
            .service
            .create(Some("T"), Some("News"), Some("original words"), Some(&png(16)), "ann")
            .expect("create");

        let result = fx.service.edit(
            &post.id,
            "bob",
            Some("Hijacked"),
            Some("Opinion"),
            Some("new description"),
            Some(&png(32)),
        );
        assert!(matches!(result, Err(ApiError::Forbidden(_))));

        let unchanged = fx.service.get(&post.id).expect("get");
        assert_eq!(unchanged.title, "T");
        assert_eq!(unchanged.thumbnail, post.thumbnail);
        assert!(fx.uploads_dir.join(&post.thumbnail).is_file());
        // No replacement file was written.
        assert_eq!(
            std::fs::read_dir(&fx.uploads_dir).expect("read dir").count(),
            1
        );
    }

    #[test]
    fn edit_never_changes_the_creator() {
        let fx = fixture_with_users(vec![author("ann")]);
        let post = fx
            .service
            .create(Some("T"), Some("News"), Some("original words"), Some(&png(16)), "ann")
            .expect("create");

        let edited = fx
            .service
            .edit(
                &post.id,
                "ann",
                Some("T2"),
                Some("Art"),
                Some("changed description"),
                None,
            )
            .expect("edit");
        assert_eq!(edited.creator, "ann");
    }

    #[test]
    fn edit_with_new_thumbnail_replaces_the_old_file() {
        let fx = fixture_with_users(vec![author("ann")]);
        let post = fx
            .service
            .create(Some("T"), Some("News"), Some("original words"), Some(&png(16)), "ann")
            .expect("create");

        let edited = fx
            .service
            .edit(
                &post.id,
                "ann",
                Some("T"),
                Some("News"),
                Some("changed description"),
                Some(&png(32)),
            )
            .expect("edit");

        assert_ne!(edited.thumbnail, post.thumbnail);
        assert!(!fx.uploads_dir.join(&post.thumbnail).exists());
        assert!(fx.uploads_dir.join(&edited.thumbnail).is_file());
    }

    #[test]
    fn delete_by_non_owner_is_forbidden_and_keeps_everything() {
        let fx = fixture_with_users(vec![author("ann"), author("bob")]);
        let post = fx
            .service
            .create(Some("T"), Some("News"), Some("original words"), Some(&png(16)), "ann")
            .expect("create");

        let result = fx.service.delete(&post.id, "bob");
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
        assert!(fx.service.get(&post.id).is_ok());
        assert!(fx.uploads_dir.join(&post.thumbnail).is_file());
        let ann = fx.users.find_by_id("ann").expect("find").expect("ann");
        assert_eq!(ann.posts, 1);
    }

    #[test]
    fn delete_removes_record_asset_and_decrements_count() {
        let fx = fixture_with_users(vec![author("ann")]);
        let post = fx
            .service
            .create(Some("T"), Some("News"), Some("original words"), Some(&png(16)), "ann")
            .expect("create");

        fx.service.delete(&post.id, "ann").expect("delete");

        assert!(matches!(
            fx.service.get(&post.id),
            Err(ApiError::NotFound(_))
        ));
        assert!(!fx.uploads_dir.join(&post.thumbnail).exists());
        let ann = fx.users.find_by_id("ann").expect("find").expect("ann");
        assert_eq!(ann.posts, 0);
        assert!(fx.posts.list_recent().expect("list").is_empty());
    }

    #[test]
    fn post_count_tracks_creates_and_deletes() {
        let fx = fixture_with_users(vec![author("ann")]);
        let mut ids = Vec::new();
        for i in 0..3 {
            let post = fx
                .service
                .create(
                    Some(&format!("T{}", i)),
                    Some("News"),
                    Some("original words"),
                    Some(&png(16)),
                    "ann",
                )
                .expect("create");
            ids.push(post.id);
        }
        fx.service.delete(&ids[0], "ann").expect("delete");

        let ann = fx.users.find_by_id("ann").expect("find").expect("ann");
        assert_eq!(ann.posts, 2);
    }

    #[test]
    fn oversized_thumbnail_fails_and_leaves_no_record() {
        let fx = fixture_with_users(vec![author("ann")]);

        let result = fx.service.create(
            Some("T"),
            Some("News"),
            Some("original words"),
            Some(&png(4096)),
            "ann",
        );
        assert!(matches!(result, Err(ApiError::FileTooLarge { .. })));
        assert!(fx.posts.list_recent().expect("list").is_empty());
        let ann = fx.users.find_by_id("ann").expect("find").expect("ann");
        assert_eq!(ann.posts, 0);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let fx = fixture_with_users(vec![author("ann")]);

        let result = fx.service.create(
            Some("T"),
            Some("Gossip"),
            Some("original words"),
            Some(&png(16)),
            "ann",
        );
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
