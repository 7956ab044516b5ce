// This file is part of the product Inkpost.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7080
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    pub secret: String,
    #[serde(default = "default_token_lifetime_hours")]
    pub token_lifetime_hours: u64,
}

fn default_token_lifetime_hours() -> u64 {
    24
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UploadConfig {
    #[serde(default = "default_thumbnail_max_bytes")]
    pub thumbnail_max_bytes: usize,
    #[serde(default = "default_avatar_max_bytes")]
    pub avatar_max_bytes: usize,
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            thumbnail_max_bytes: default_thumbnail_max_bytes(),
            avatar_max_bytes: default_avatar_max_bytes(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

fn default_thumbnail_max_bytes() -> usize {
    2_000_000
}

fn default_avatar_max_bytes() -> usize {
    500_000
}

fn default_allowed_extensions() -> Vec<String> {
    vec![
        "jpg".to_string(),
        "jpeg".to_string(),
        "png".to_string(),
        "gif".to_string(),
        "webp".to_string(),
    ]
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

/// Configuration after validation. Handed to every component explicitly;
/// nothing reads secrets or limits from ambient state.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub upload: UploadConfig,
}

impl Config {
    pub fn load_and_validate(root: &Path) -> Result<ValidatedConfig, ConfigError> {
        let config_path = root.join(CONFIG_FILE_NAME);
        let raw = fs::read_to_string(&config_path).map_err(|e| {
            ConfigError::LoadError(format!("Failed to read {}: {}", config_path.display(), e))
        })?;
        let config: Config = serde_yaml::from_str(&raw).map_err(|e| {
            ConfigError::LoadError(format!("Failed to parse {}: {}", config_path.display(), e))
        })?;
        config.validate()
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server.host must not be empty".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must not be 0".to_string(),
            ));
        }
        if self.auth.secret.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.secret must not be empty".to_string(),
            ));
        }
        if self.auth.secret.len() < 32 {
            warn!(
                "auth.secret is only {} bytes; 32 or more is recommended",
                self.auth.secret.len()
            );
        }
        if self.auth.token_lifetime_hours == 0 {
            return Err(ConfigError::ValidationError(
                "auth.token_lifetime_hours must be at least 1".to_string(),
            ));
        }
        if self.upload.thumbnail_max_bytes == 0 || self.upload.avatar_max_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "upload limits must be greater than 0".to_string(),
            ));
        }
        let allowed_extensions = self
            .upload
            .allowed_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect::<Vec<_>>();
        if allowed_extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "upload.allowed_extensions must contain at least one extension".to_string(),
            ));
        }

        Ok(ValidatedConfig {
            server: self.server,
            auth: self.auth,
            upload: UploadConfig {
                allowed_extensions,
                ..self.upload
            },
        })
    }
}

/// Default configuration written on first start. The JWT secret is
/// freshly generated so no two installs share one.
pub fn default_config_yaml(secret: &str) -> String {
    format!(
        "server:\n  host: \"127.0.0.1\"\n  port: {port}\n\nauth:\n  secret: \"{secret}\"\n  token_lifetime_hours: {hours}\n\nupload:\n  thumbnail_max_bytes: {thumb}\n  avatar_max_bytes: {avatar}\n",
        port = default_port(),
        secret = secret,
        hours = default_token_lifetime_hours(),
        thumb = default_thumbnail_max_bytes(),
        avatar = default_avatar_max_bytes(),
    )
}
