// This file is part of the product Inkpost.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{Claims, JwtError};
use crate::config::ValidatedConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

/// Signs and verifies bearer tokens. Tokens are never stored server-side;
/// a token is valid exactly when its signature checks out and it has not
/// expired.
#[derive(Clone)]
pub struct JwtService {
    secret: String,
    token_lifetime_hours: u64,
}

impl JwtService {
    pub fn new(config: &ValidatedConfig) -> Self {
        JwtService {
            secret: config.auth.secret.clone(),
            token_lifetime_hours: config.auth.token_lifetime_hours,
        }
    }

    /// Create a token carrying the user's id and display name.
    pub fn create_token(&self, user_id: &str, display_name: &str) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::hours(self.token_lifetime_hours as i64);

        let claims = Claims {
            sub: user_id.to_string(),
            name: display_name.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| JwtError::TokenCreation(e.to_string()))
    }

    /// Verify signature and expiry, returning the decoded claims.
    /// A forged and an expired token are indistinguishable to callers.
    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map_err(|e| JwtError::TokenVerification(e.to_string()))?;

        Ok(token_data.claims)
    }
}
