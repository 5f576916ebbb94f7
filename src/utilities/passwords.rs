//! Salted SHA-256 password hashes for demo accounts.
//!
//! Format: `salt:hex(sha256(password + salt))`.

use sha2::{Digest, Sha256};
use uuid::Uuid;

pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}:{}", salt, digest(password, &salt))
}

/// False for anything not in `salt:hash` form.
pub fn verify_password(password: &str, hashed: &str) -> bool {
    match hashed.split_once(':') {
        Some((salt, expected)) if !salt.is_empty() && !expected.contains(':') => {
            digest(password, salt) == expected
        }
        _ => false,
    }
}

fn digest(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hashed = hash_password("demo123");
        assert!(verify_password("demo123", &hashed));
        assert!(!verify_password("demo124", &hashed));
        assert_ne!(hashed, hash_password("demo123"));
    }

    #[test]
    fn test_seeded_hash_format() {
        let seeded = "5f1c0a9e3b7d42c8a6e4f0b2d9c7a1e3:\
                      b6d7c603dea7d8ba147450a55272315d7f0fb2a002b18b891eacf1c9c1c0d302";
        assert!(verify_password("demo123", seeded));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("demo123", "no-colon"));
        assert!(!verify_password("demo123", "a:b:c"));
        assert!(!verify_password("", ""));
    }
}
