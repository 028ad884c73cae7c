use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use super::types::AuthError;

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::HashingError(e.to_string()))
}

pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::HashingError(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::HashingError(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("dragons&dungeons").expect("hashing should succeed");
        assert_ne!(hash, "dragons&dungeons", "hash should not be the plaintext");

        let ok = verify_password("dragons&dungeons", &hash).expect("verification should succeed");
        assert!(ok, "correct password should verify");
    }

    #[test]
    fn test_wrong_password_fails_verification() {
        let hash = hash_password("correct horse").expect("hashing should succeed");
        let ok = verify_password("wrong horse", &hash).expect("verification should succeed");
        assert!(!ok, "wrong password should not verify");
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        let result = verify_password("anything", "not-a-phc-string");
        assert!(result.is_err(), "malformed stored hash should error");
    }
}
