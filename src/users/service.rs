// This file is part of the product Inkpost.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{PublicUser, User};
use crate::assets::{AssetStore, UploadedFile};
use crate::config::ValidatedConfig;
use crate::error::ApiError;
use crate::iam::jwt::JwtService;
use crate::iam::password::{hash_password, verify_password};
use crate::security::validation::{
    normalize_email, validate_email_field, validate_name_field, validate_new_password,
};
use crate::store::{UserStore, UserUpdate};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

const LOGIN_FAILED: &str = "Invalid email or password.";

#[derive(Debug, Serialize)]
pub struct LoginSuccess {
    pub token: String,
    pub id: String,
    pub name: String,
}

/// User lifecycle: registration, login, profile reads and edits, and
/// avatar changes. Passwords only ever move through the credential
/// hashing functions; emails are normalized before every lookup.
pub struct UserService {
    users: Arc<dyn UserStore>,
    assets: Arc<AssetStore>,
    jwt: JwtService,
    avatar_limit: usize,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserStore>,
        assets: Arc<AssetStore>,
        jwt: JwtService,
        config: &ValidatedConfig,
    ) -> Self {
        Self {
            users,
            assets,
            jwt,
            avatar_limit: config.upload.avatar_max_bytes,
        }
    }

    pub fn register(
        &self,
        name: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
        password_confirm: Option<&str>,
    ) -> Result<PublicUser, ApiError> {
        let (Some(name), Some(email), Some(password), Some(password_confirm)) = (
            non_empty(name),
            non_empty(email),
            password.filter(|p| !p.is_empty()),
            password_confirm.filter(|p| !p.is_empty()),
        ) else {
            return Err(ApiError::Validation("Fill in all fields.".to_string()));
        };

        validate_name_field(name).map_err(ApiError::Validation)?;
        validate_email_field(email).map_err(ApiError::Validation)?;
        let email = normalize_email(email);

        if self.users.find_by_email(&email)?.is_some() {
            return Err(ApiError::Conflict("Email already registered.".to_string()));
        }

        validate_new_password(password).map_err(ApiError::Validation)?;
        if password != password_confirm {
            return Err(ApiError::Validation("Passwords do not match.".to_string()));
        }

        let password_hash = hash_password(password)?;
        let user = self.users.create(User {
            id: Uuid::new_v4().to_string(),
            email,
            name: name.to_string(),
            password_hash,
            avatar: None,
            posts: 0,
            created_at: Utc::now(),
        })?;

        Ok(user.into())
    }

    /// Unknown email and wrong password fail identically; account
    /// existence is not observable through this endpoint.
    pub fn login(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<LoginSuccess, ApiError> {
        let (Some(email), Some(password)) =
            (non_empty(email), password.filter(|p| !p.is_empty()))
        else {
            return Err(ApiError::Validation("Fill in all fields.".to_string()));
        };

        let email = normalize_email(email);
        let Some(user) = self.users.find_by_email(&email)? else {
            return Err(ApiError::Unauthenticated(LOGIN_FAILED.to_string()));
        };

        if !verify_password(password, &user.password_hash)? {
            return Err(ApiError::Unauthenticated(LOGIN_FAILED.to_string()));
        }

        let token = self
            .jwt
            .create_token(&user.id, &user.name)
            .map_err(|err| ApiError::Internal(err.to_string()))?;

        Ok(LoginSuccess {
            token,
            id: user.id,
            name: user.name,
        })
    }

    pub fn get_profile(&self, id: &str) -> Result<PublicUser, ApiError> {
        self.users
            .find_by_id(id)?
            .map(PublicUser::from)
            .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))
    }

    pub fn list_authors(&self) -> Result<Vec<PublicUser>, ApiError> {
        Ok(self
            .users
            .list()?
            .into_iter()
            .map(PublicUser::from)
            .collect())
    }

    pub fn change_avatar(
        &self,
        requester_id: &str,
        upload: Option<&UploadedFile>,
    ) -> Result<PublicUser, ApiError> {
        let upload =
            upload.ok_or_else(|| ApiError::Validation("Please choose an image.".to_string()))?;

        let user = self
            .users
            .find_by_id(requester_id)?
            .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

        let stored_name =
            self.assets
                .replace(user.avatar.as_deref(), upload, self.avatar_limit)?;

        let update = UserUpdate {
            avatar: Some(stored_name.clone()),
            ..UserUpdate::default()
        };
        match self.users.update(requester_id, update)? {
            Some(updated) => Ok(updated.into()),
            None => {
                log::warn!(
                    "user '{}' vanished during avatar change; file '{}' is orphaned",
                    requester_id,
                    stored_name
                );
                Err(ApiError::NotFound("User not found.".to_string()))
            }
        }
    }

    pub fn edit_profile(
        &self,
        requester_id: &str,
        name: Option<&str>,
        email: Option<&str>,
        current_password: Option<&str>,
        new_password: Option<&str>,
        new_password_confirm: Option<&str>,
    ) -> Result<PublicUser, ApiError> {
        let (
            Some(name),
            Some(email),
            Some(current_password),
            Some(new_password),
            Some(new_password_confirm),
        ) = (
            non_empty(name),
            non_empty(email),
            current_password.filter(|p| !p.is_empty()),
            new_password.filter(|p| !p.is_empty()),
            new_password_confirm.filter(|p| !p.is_empty()),
        )
        else {
            return Err(ApiError::Validation("Fill in all fields.".to_string()));
        };

        validate_name_field(name).map_err(ApiError::Validation)?;
        validate_email_field(email).map_err(ApiError::Validation)?;
        let email = normalize_email(email);

        let user = self
            .users
            .find_by_id(requester_id)?
            .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

        // The email stays usable for the account that already owns it.
        if let Some(existing) = self.users.find_by_email(&email)?
            && existing.id != requester_id
        {
            return Err(ApiError::Conflict("Email already registered.".to_string()));
        }

        if !verify_password(current_password, &user.password_hash)? {
            return Err(ApiError::Unauthenticated(
                "Invalid current password.".to_string(),
            ));
        }

        if new_password != new_password_confirm {
            return Err(ApiError::Validation("Passwords do not match.".to_string()));
        }

        let password_hash = hash_password(new_password)?;
        let update = UserUpdate {
            name: Some(name.to_string()),
            email: Some(email),
            password_hash: Some(password_hash),
            avatar: None,
        };

        self.users
            .update(requester_id, update)?
            .map(PublicUser::from)
            .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
