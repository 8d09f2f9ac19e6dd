//! PBKDF2-SHA256 password hashes
//!
//! Stored in PHC string format, `$pbkdf2-sha256$i=<rounds>,l=32$<salt>$<hash>`.
//! The round count travels with every hash, so raising it later leaves
//! existing hashes verifiable.

use pbkdf2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::{Params, Pbkdf2};

const ALGORITHM: &str = "pbkdf2-sha256";

/// Rounds used for new hashes
pub const DEFAULT_ROUNDS: u32 = 600_000;

const SALT_LEN: usize = 16;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("unsupported password hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("malformed password hash")]
    Malformed,

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt: [u8; SALT_LEN] = rand::random();
    hash_password_with(password, &salt, DEFAULT_ROUNDS)
}

/// Hash with an explicit salt and round count.
pub fn hash_password_with(
    password: &str,
    salt: &[u8],
    rounds: u32,
) -> Result<String, PasswordError> {
    let salt = SaltString::encode_b64(salt).map_err(|e| PasswordError::Hashing(e.to_string()))?;
    let params = Params {
        rounds: rounds.max(1),
        ..Params::default()
    };

    let hash = Pbkdf2
        .hash_password_customized(password.as_bytes(), None, None, params, &salt)
        .map_err(|e| PasswordError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check a password against a stored hash.
pub fn verify_password(password: &str, encoded: &str) -> Result<bool, PasswordError> {
    let hash = PasswordHash::new(encoded).map_err(|_| PasswordError::Malformed)?;
    if hash.algorithm.as_str() != ALGORITHM {
        return Err(PasswordError::UnsupportedAlgorithm(
            hash.algorithm.as_str().to_owned(),
        ));
    }

    match Pbkdf2.verify_password(password.as_bytes(), &hash) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(_) => Err(PasswordError::Malformed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_own_hash() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$pbkdf2-sha256$i=600000,l=32$"));
        assert_eq!(verify_password("correct horse", &hash), Ok(true));
        assert_eq!(verify_password("wrong horse", &hash), Ok(false));
    }

    #[test]
    fn salts_differ() {
        assert_ne!(
            hash_password_with("same", b"salt-one", 1000).unwrap(),
            hash_password_with("same", b"salt-two", 1000).unwrap()
        );
    }

    #[test]
    fn deterministic_with_fixed_salt() {
        let a = hash_password_with("pw", b"salt", 1000).unwrap();
        let b = hash_password_with("pw", b"salt", 1000).unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("$pbkdf2-sha256$i=1000,l=32$c2FsdA$"));
        assert_eq!(verify_password("pw", &a), Ok(true));
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(verify_password("pw", "garbage"), Err(PasswordError::Malformed));
        assert_eq!(
            verify_password("pw", "sha256$10000$00$00"),
            Err(PasswordError::Malformed)
        );
    }

    #[test]
    fn rejects_other_algorithms() {
        assert_eq!(
            verify_password(
                "pw",
                "$argon2id$v=19$m=65536,t=3,p=4$c2FsdHNhbHQ$aGFzaGhhc2hoYXNoaGFzaA"
            ),
            Err(PasswordError::UnsupportedAlgorithm("argon2id".into()))
        );
    }
}
