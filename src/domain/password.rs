//! Credential hashing
//!
//! Passwords are stored as bcrypt hashes. Every call draws a fresh salt, which
//! bcrypt embeds in the produced string so verification needs nothing else.

use thiserror::Error;

#[derive(Debug, Error)]
#[error("Password hashing failed: {0}")]
pub struct HashError(String);

impl From<bcrypt::BcryptError> for HashError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self(err.to_string())
    }
}

/// One-way password hashing primitive
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` with a freshly generated salt
    fn hash(&self, password: &str) -> Result<String, HashError>;

    /// Check `password` against a hash previously produced by [`PasswordHasher::hash`]
    fn verify(&self, password: &str, hash: &str) -> Result<bool, HashError>;
}

/// bcrypt with a configurable work factor
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String, HashError> {
        Ok(bcrypt::hash(password, self.cost)?)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, HashError> {
        Ok(bcrypt::verify(password, hash)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum cost keeps the suite fast
    fn hasher() -> BcryptHasher {
        BcryptHasher::new(4)
    }

    #[test]
    fn test_hash_is_not_plaintext() {
        let hash = hasher().hash("secret1").unwrap();
        assert_ne!(hash, "secret1");
        assert!(!hash.contains("secret1"));
    }

    #[test]
    fn test_fresh_salt_per_call() {
        let hasher = hasher();
        let first = hasher.hash("secret1").unwrap();
        let second = hasher.hash("secret1").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("secret1", &first).unwrap());
        assert!(hasher.verify("secret1", &second).unwrap());
    }

    #[test]
    fn test_wrong_password_does_not_verify() {
        let hasher = hasher();
        let hash = hasher.hash("secret1").unwrap();
        assert!(!hasher.verify("secret2", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(hasher().verify("secret1", "not-a-bcrypt-hash").is_err());
    }
}
