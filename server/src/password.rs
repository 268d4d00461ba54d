use std::sync::Arc;

use color_eyre::eyre::{eyre, WrapErr as _};
use tokio::sync::OnceCell;
use tracing::warn;

const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// A hash at the configured cost that login checks against when the email is
/// unknown, so both failure paths pay for one bcrypt verify
#[derive(Clone)]
pub struct DecoyHash {
    cost: u32,
    hash: Arc<OnceCell<String>>,
}

impl DecoyHash {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            hash: Arc::default(),
        }
    }

    pub async fn get(&self) -> crate::Result<&str> {
        let cost = self.cost;
        let hash = self
            .hash
            .get_or_try_init(|| hash_password(DECOY_PASSWORD, cost))
            .await?;

        Ok(hash.as_str())
    }

    #[cfg(test)]
    pub(crate) fn is_computed(&self) -> bool {
        self.hash.initialized()
    }
}

/// Hash a password with bcrypt on the blocking pool
pub async fn hash_password(password: &str, cost: u32) -> crate::Result<String> {
    let password = password.to_owned();

    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .wrap_err("Password hashing task panicked")?
        .map_err(|e| eyre!("Failed to hash password: {}", e))
}

/// Check a password against a stored hash
///
/// A stored hash that bcrypt can't parse is treated as a mismatch.
pub async fn verify_password(password: &str, password_hash: &str) -> crate::Result<bool> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();

    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
        .await
        .wrap_err("Password verification task panicked")?;

    match verified {
        Ok(matches) => Ok(matches),
        Err(err) => {
            warn!("Stored password hash could not be verified: {}", err);
            Ok(false)
        }
    }
}
