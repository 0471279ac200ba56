//! Password and PIN hashing utilities
//!
//! Console passwords and checkpoint PINs are both stored as bcrypt hashes.

use bcrypt::{hash, verify};

#[cfg(not(test))]
const COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const COST: u32 = 4;

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, COST)
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}

pub fn hash_pin(pin: &str) -> Result<String, bcrypt::BcryptError> {
    hash(pin.trim(), COST)
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_pin(pin: &str, hash: &str) -> bool {
    verify(pin.trim(), hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_hash_verifies() {
        let h = hash_pin("1234").unwrap();
        assert!(verify_pin("1234", &h));
        assert!(verify_pin(" 1234 ", &h));
        assert!(!verify_pin("4321", &h));
    }

    #[test]
    fn garbage_hash_is_mismatch() {
        assert!(!verify_pin("1234", "1234"));
    }

    #[test]
    fn password_hash_verifies() {
        let h = hash_password("s3cret-pass").unwrap();
        assert!(verify_password("s3cret-pass", &h).unwrap());
        assert!(!verify_password("nope", &h).unwrap());
    }
}
