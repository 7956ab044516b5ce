// This file is part of the product Inkpost.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

use crate::assets::AssetError;
use crate::iam::password::PasswordError;
use crate::store::StoreError;

/// Boundary error for every API operation. Each variant maps to exactly
/// one HTTP status and a stable machine-readable code string.
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    Unauthenticated(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    FileTooLarge { actual: usize, limit: usize },
    Store(StoreError),
    AssetIo(String),
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::Unauthenticated(_) => "unauthenticated",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::FileTooLarge { .. } => "file_too_large",
            ApiError::Store(_) | ApiError::AssetIo(_) | ApiError::Internal(_) => "internal",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(msg)
            | ApiError::Unauthenticated(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => write!(f, "{}", msg),
            ApiError::FileTooLarge { actual, limit } => {
                write!(f, "File too big ({} bytes, limit {} bytes)", actual, limit)
            }
            ApiError::Store(err) => write!(f, "Record store failure: {}", err),
            ApiError::AssetIo(msg) => write!(f, "Asset store failure: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::Conflict(_)
            | ApiError::FileTooLarge { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::AssetIo(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Infrastructure details stay in the log, not in the response body.
        let message = match self {
            ApiError::Store(err) => {
                log::error!("record store failure: {}", err);
                "Internal server error".to_string()
            }
            ApiError::AssetIo(msg) => {
                log::error!("asset store failure: {}", msg);
                "Internal server error".to_string()
            }
            ApiError::Internal(msg) => {
                log::error!("internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.code(),
            "message": message,
        }))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<AssetError> for ApiError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::FileTooLarge { actual, limit } => ApiError::FileTooLarge { actual, limit },
            AssetError::MissingExtension | AssetError::UnsupportedExtension(_) => {
                ApiError::Validation(err.to_string())
            }
            AssetError::InvalidName(_) => ApiError::Validation(err.to_string()),
            AssetError::NotFound(name) => ApiError::NotFound(format!("Asset {} not found", name)),
            AssetError::Io(io) => ApiError::AssetIo(io.to_string()),
        }
    }
}
