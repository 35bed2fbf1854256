use argon2::password_hash::{self, SaltString, rand_core::OsRng as SaltRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

pub const MIN_PASSWORD_LEN: usize = 6;

const TOKEN_BYTES: usize = 32;

/// Argon2id PHC string stored in `app_user.password_hash`.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut SaltRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// A stored value that is not a PHC string never verifies.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// A login session's bearer token. The client gets `token` once;
/// `session_token` only ever sees `digest`.
#[derive(Debug)]
pub struct SessionToken {
    pub token: String,
    pub digest: String,
}

impl SessionToken {
    pub fn issue() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);
        let digest = token_digest(&token);
        Self { token, digest }
    }
}

/// Hex SHA-256 of a presented bearer token, the `session_token` lookup key.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
