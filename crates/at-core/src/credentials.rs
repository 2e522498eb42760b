//! Local password hashing.
//!
//! Stored format: `sha256$<salt>$<hex digest of salt || password>`.

use sha2::{Digest, Sha256};
use uuid::Uuid;

const SCHEME: &str = "sha256";

/// Hashes `password` with a fresh random salt.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    hash_with_salt(password, &salt)
}

/// Checks `password` against a stored hash.
///
/// Malformed hashes never verify.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(scheme), Some(salt), Some(_)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if scheme != SCHEME || salt.is_empty() {
        return false;
    }
    constant_time_eq(hash_with_salt(password, salt).as_bytes(), stored.as_bytes())
}

fn hash_with_salt(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{SCHEME}${salt}${:x}", hasher.finalize())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
