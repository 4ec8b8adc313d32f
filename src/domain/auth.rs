use anyhow::{Context, anyhow};
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// Hashes a plaintext password with Argon2id and a freshly generated random salt,
/// producing a PHC string which embeds the salt and cost parameters. The default
/// parameters are deliberately moderate: costly enough to resist offline brute
/// force while keeping login latency reasonable. The hash runs on a blocking
/// thread so its work factor doesn't stall async request handling.
pub async fn hash_password(plaintext: &str) -> Result<String, anyhow::Error> {
    let plaintext = plaintext.to_owned();

    tokio::task::spawn_blocking(move || hash_password_blocking(&plaintext))
        .await
        .context("password hashing task was cancelled")?
}

/// Verifies a plaintext password against a stored PHC hash string on a blocking
/// thread. The comparison inside the verifier is constant-time, so a mismatch
/// reveals nothing about how close the guess was.
pub async fn verify_password(plaintext: &str, stored_hash: &str) -> Result<bool, anyhow::Error> {
    let plaintext = plaintext.to_owned();
    let stored_hash = stored_hash.to_owned();

    tokio::task::spawn_blocking(move || verify_password_blocking(&plaintext, &stored_hash))
        .await
        .context("password verification task was cancelled")?
}

pub(crate) fn hash_password_blocking(plaintext: &str) -> Result<String, anyhow::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|hash_err| anyhow!("failed to hash password: {hash_err}"))?;

    Ok(hash.to_string())
}

fn verify_password_blocking(plaintext: &str, stored_hash: &str) -> Result<bool, anyhow::Error> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|parse_err| anyhow!("stored password hash is unreadable: {parse_err}"))?;

    Ok(Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed_hash)
        .is_ok())
}
