// This file is part of the product Inkpost.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// An upload already decoded by the HTTP layer: the original client-side
/// file name, the declared size, and the raw bytes.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub size: usize,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(original_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            original_name: original_name.into(),
            size: bytes.len(),
            bytes,
        }
    }
}

#[derive(Debug)]
pub enum AssetError {
    FileTooLarge { actual: usize, limit: usize },
    MissingExtension,
    UnsupportedExtension(String),
    InvalidName(String),
    NotFound(String),
    Io(std::io::Error),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::FileTooLarge { actual, limit } => {
                write!(f, "File too big ({} bytes, limit {} bytes)", actual, limit)
            }
            AssetError::MissingExtension => write!(f, "File name has no extension"),
            AssetError::UnsupportedExtension(ext) => {
                write!(f, "File extension '{}' is not allowed", ext)
            }
            AssetError::InvalidName(name) => write!(f, "Invalid asset name '{}'", name),
            AssetError::NotFound(name) => write!(f, "Asset '{}' not found", name),
            AssetError::Io(err) => write!(f, "Asset I/O failed: {}", err),
        }
    }
}

impl std::error::Error for AssetError {}

impl From<std::io::Error> for AssetError {
    fn from(err: std::io::Error) -> Self {
        AssetError::Io(err)
    }
}

/// Flat directory of uploaded binaries. Stored names embed a fresh UUID,
/// so concurrent uploads with identical original names never collide and
/// a returned name always refers to a file this call wrote.
///
/// `store` and `replace` return only after the bytes are durably on disk;
/// callers persist the stored name into a record strictly afterwards, so
/// no record ever points at an unconfirmed write.
pub struct AssetStore {
    root: PathBuf,
    allowed_extensions: Vec<String>,
}

impl AssetStore {
    pub fn new(root: PathBuf, allowed_extensions: Vec<String>) -> Self {
        Self {
            root,
            allowed_extensions,
        }
    }

    /// Write a new asset and return its stored name.
    pub fn store(&self, upload: &UploadedFile, size_limit: usize) -> Result<String, AssetError> {
        let (base, extension) = self.check_upload(upload, size_limit)?;
        self.write_unique(&base, &extension, &upload.bytes)
    }

    /// Replace an existing asset: validate the new upload first, then
    /// delete the old file, then write the new one. Deletion failure is
    /// logged but never blocks the write; a stray orphan is preferred
    /// over a record pointing at nothing.
    pub fn replace(
        &self,
        old_stored_name: Option<&str>,
        upload: &UploadedFile,
        size_limit: usize,
    ) -> Result<String, AssetError> {
        let (base, extension) = self.check_upload(upload, size_limit)?;

        if let Some(old_name) = old_stored_name
            && let Err(err) = self.remove(old_name)
        {
            log::warn!("failed to remove replaced asset '{}': {}", old_name, err);
        }

        self.write_unique(&base, &extension, &upload.bytes)
    }

    /// Delete a stored asset.
    pub fn remove(&self, stored_name: &str) -> Result<(), AssetError> {
        let path = self.stored_path(stored_name)?;
        if !path.is_file() {
            return Err(AssetError::NotFound(stored_name.to_string()));
        }
        fs::remove_file(&path)?;
        Ok(())
    }

    fn check_upload(
        &self,
        upload: &UploadedFile,
        size_limit: usize,
    ) -> Result<(String, String), AssetError> {
        if upload.bytes.len() > size_limit {
            return Err(AssetError::FileTooLarge {
                actual: upload.bytes.len(),
                limit: size_limit,
            });
        }

        let (base, extension) = split_original_name(&upload.original_name)?;
        if !self.allowed_extensions.iter().any(|ext| ext == &extension) {
            return Err(AssetError::UnsupportedExtension(extension));
        }
        Ok((base, extension))
    }

    fn write_unique(
        &self,
        base: &str,
        extension: &str,
        bytes: &[u8],
    ) -> Result<String, AssetError> {
        let stored_name = format!("{}_{}.{}", base, Uuid::new_v4(), extension);
        let final_path = self.root.join(&stored_name);
        let temp_path = self.root.join(format!(".{}.tmp", stored_name));

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;
        if let Err(err) = file.write_all(bytes).and_then(|_| file.sync_all()) {
            let _ = fs::remove_file(&temp_path);
            return Err(AssetError::Io(err));
        }
        drop(file);

        if let Err(err) = fs::rename(&temp_path, &final_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(AssetError::Io(err));
        }

        Ok(stored_name)
    }

    /// Resolve a stored name inside the root, rejecting anything that is
    /// not a plain file name.
    fn stored_path(&self, stored_name: &str) -> Result<PathBuf, AssetError> {
        if stored_name.is_empty()
            || stored_name.contains('/')
            || stored_name.contains('\\')
            || stored_name == "."
            || stored_name == ".."
            || stored_name.chars().any(|ch| ch.is_control())
        {
            return Err(AssetError::InvalidName(stored_name.to_string()));
        }
        Ok(self.root.join(stored_name))
    }
}

/// Split an original upload name into a sanitized base and a lowercase
/// extension. The base keeps only filesystem-safe characters and is
/// capped; everything risky becomes a dash.
fn split_original_name(original: &str) -> Result<(String, String), AssetError> {
    let name = Path::new(original)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let Some((raw_base, raw_ext)) = name.rsplit_once('.') else {
        return Err(AssetError::MissingExtension);
    };
    if raw_ext.is_empty() || !raw_ext.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return Err(AssetError::MissingExtension);
    }

    let mut base: String = raw_base
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.' {
                ch
            } else {
                '-'
            }
        })
        .collect();
    base.truncate(64);
    let base = base.trim_matches('.').trim_matches('-').to_string();
    let base = if base.is_empty() {
        "upload".to_string()
    } else {
        base
    };

    Ok((base, raw_ext.to_ascii_lowercase()))
}
