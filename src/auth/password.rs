//! Salted SHA-256 password hashes.
//!
//! Stored form: `{SSHA256}` followed by base64 of `sha256(password || salt) || salt`.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Scheme prefix of stored hashes.
pub const SSHA256_PREFIX: &str = "{SSHA256}";

const SALT_LEN: usize = 8;
const DIGEST_LEN: usize = 32;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    hash_with_salt(password, &salt)
}

fn hash_with_salt(password: &str, salt: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt);
    let digest = hasher.finalize();

    let mut stored = Vec::with_capacity(DIGEST_LEN + salt.len());
    stored.extend_from_slice(&digest);
    stored.extend_from_slice(salt);
    format!("{}{}", SSHA256_PREFIX, BASE64.encode(stored))
}

/// Check a password against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some(encoded) = stored.strip_prefix(SSHA256_PREFIX) else {
        return false;
    };
    let Ok(decoded) = BASE64.decode(encoded) else {
        return false;
    };
    if decoded.len() <= DIGEST_LEN {
        return false;
    }
    let (_, salt) = decoded.split_at(DIGEST_LEN);
    constant_time_eq(hash_with_salt(password, salt).as_bytes(), stored.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
