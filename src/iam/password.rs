// This file is part of the product Inkpost.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use argon2::Argon2;

#[derive(Debug)]
pub enum PasswordError {
    Hash(String),
    MalformedDigest(String),
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PasswordError::Hash(msg) => write!(f, "Password hashing failed: {}", msg),
            PasswordError::MalformedDigest(msg) => write!(f, "Stored digest is malformed: {}", msg),
        }
    }
}

impl std::error::Error for PasswordError {}

/// Hash a plaintext password into a self-describing PHC digest.
/// The salt is generated per call; two hashes of the same password differ.
pub fn hash_password(plaintext: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordError::Hash(err.to_string()))
}

/// Verify a plaintext password against a stored digest. A mismatch is a
/// normal `false`; only an unparsable digest is an error.
pub fn verify_password(plaintext: &str, digest: &str) -> Result<bool, PasswordError> {
    let parsed =
        PasswordHash::new(digest).map_err(|err| PasswordError::MalformedDigest(err.to_string()))?;
    Ok(Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let digest = hash_password("secret1").expect("hash");
        assert!(verify_password("secret1", &digest).expect("verify"));
    }

    #[test]
    fn wrong_password_is_false_not_error() {
        let digest = hash_password("secret1").expect("hash");
        assert!(!verify_password("wrong-password", &digest).expect("verify"));
    }

    #[test]
    fn same_password_hashes_differently() {
        let first = hash_password("secret1").expect("hash");
        let second = hash_password("secret1").expect("hash");
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_digest_is_an_error() {
        assert!(matches!(
            verify_password("secret1", "not-a-phc-string"),
            Err(PasswordError::MalformedDigest(_))
        ));
    }
}
