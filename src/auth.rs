use argon2::{
    Argon2,
    PasswordHash,
    PasswordVerifier,
    PasswordHasher,
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

use argon2::password_hash::{SaltString, rand_core::OsRng as PHOsRng};

use crate::config::Config;
use crate::repository::Repository;

/// Verify a password against the argon2 PHC string stored on the account.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Argon2id with a random salt; the result goes into app_user.password_hash.
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut PHOsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| format!("argon2 hash error: {e}"))
}

/// Opaque bearer token handed to the client. Only its hash is stored.
pub fn generate_access_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 hex of a bearer token, as kept in session_token.session_token_hash.
pub fn hash_access_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Creates the first administrator when the account table is empty and
/// `ADMIN_PASSWORD` is configured. Returns whether an account was created.
pub async fn bootstrap_admin(repo: &dyn Repository, cfg: &Config) -> anyhow::Result<bool> {
    if repo.count_users().await? > 0 {
        return Ok(false);
    }
    let Some(password) = cfg.admin_password.as_deref() else {
        tracing::warn!("no accounts exist and ADMIN_PASSWORD is unset; nobody can log in");
        return Ok(false);
    };

    let hash = hash_password(password).map_err(anyhow::Error::msg)?;
    let user = repo
        .create_user(&cfg.admin_username, "Administrator", &hash, true)
        .await?;
    tracing::info!(username = %user.username, "created bootstrap admin account");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::SqliteRepository;

    fn config_with_password(password: Option<&str>) -> Config {
        Config {
            database_url: "sqlite::memory:".into(),
            bind_addr: "127.0.0.1:0".into(),
            session_ttl_hours: 24,
            db_max_connections: 1,
            admin_username: "admin".into(),
            admin_password: password.map(str::to_string),
        }
    }

    #[test]
    fn password_hash_verifies_only_the_original() {
        let hash = hash_password("root-canal-42").unwrap();
        assert!(verify_password("root-canal-42", &hash));
        assert!(!verify_password("root-canal-43", &hash));
        assert!(!verify_password("root-canal-42", "not-a-phc-string"));
    }

    #[test]
    fn access_tokens_are_unique_and_hash_stably() {
        let a = generate_access_token();
        let b = generate_access_token();
        assert_ne!(a, b);
        assert_eq!(hash_access_token(&a), hash_access_token(&a));
        assert_eq!(hash_access_token(&a).len(), 64);
    }

    #[tokio::test]
    async fn bootstrap_creates_admin_once() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        let cfg = config_with_password(Some("s3cret"));

        assert!(bootstrap_admin(&repo, &cfg).await.unwrap());
        assert!(!bootstrap_admin(&repo, &cfg).await.unwrap());

        let admin = repo.find_user_by_username("admin").await.unwrap().unwrap();
        assert!(admin.is_admin);
        assert!(verify_password("s3cret", &admin.password_hash));
    }

    #[tokio::test]
    async fn bootstrap_without_password_creates_nothing() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        assert!(!bootstrap_admin(&repo, &config_with_password(None)).await.unwrap());
        assert_eq!(repo.count_users().await.unwrap(), 0);
    }
}
