// This file is part of the product Inkpost.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::{CONFIG_FILE_NAME, Config, ConfigError, ValidatedConfig, default_config_yaml};
use crate::runtime_paths::{POSTS_FILE_NAME, RuntimePaths, USERS_FILE_NAME};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use uuid::Uuid;

#[derive(Debug)]
pub struct BootstrapResult {
    pub validated_config: ValidatedConfig,
    pub runtime_paths: RuntimePaths,
    pub created_config: bool,
}

#[derive(Debug)]
pub enum BootstrapError {
    Config(ConfigError),
    Io(std::io::Error),
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapError::Config(err) => write!(f, "{}", err),
            BootstrapError::Io(err) => write!(f, "Bootstrap I/O error: {}", err),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BootstrapError::Config(err) => Some(err),
            BootstrapError::Io(err) => Some(err),
        }
    }
}

impl From<ConfigError> for BootstrapError {
    fn from(err: ConfigError) -> Self {
        BootstrapError::Config(err)
    }
}

impl From<std::io::Error> for BootstrapError {
    fn from(err: std::io::Error) -> Self {
        BootstrapError::Io(err)
    }
}

/// Prepare the runtime root: write default config and empty record files
/// when missing, validate the configuration, and resolve the layout.
pub fn bootstrap_runtime(root: &Path) -> Result<BootstrapResult, BootstrapError> {
    if !root.exists() {
        fs::create_dir_all(root)?;
        log_action(format!("created runtime root {}", root.display()));
    }

    let created_config = ensure_config(root)?;
    let validated_config = Config::load_and_validate(root)?;
    ensure_record_file(root, USERS_FILE_NAME)?;
    ensure_record_file(root, POSTS_FILE_NAME)?;
    let runtime_paths = RuntimePaths::from_root(root)?;

    Ok(BootstrapResult {
        validated_config,
        runtime_paths,
        created_config,
    })
}

fn ensure_config(root: &Path) -> Result<bool, BootstrapError> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        return Ok(false);
    }

    let secret = generate_secret();
    fs::write(&config_path, default_config_yaml(&secret))?;
    log_action(format!("created {} with a fresh secret", CONFIG_FILE_NAME));
    Ok(true)
}

fn ensure_record_file(root: &Path, name: &str) -> Result<bool, BootstrapError> {
    let path = root.join(name);
    if path.exists() {
        return Ok(false);
    }

    fs::write(&path, "{}\n")?;
    log_action(format!("created empty {}", name));
    Ok(true)
}

fn generate_secret() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

pub(crate) fn log_action(message: impl AsRef<str>) {
    eprintln!("[bootstrap] {}", message.as_ref());
}
