use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{
    password,
    state::AppState,
    store::StoreError,
    validation::{self, ValidationErrors},
};

/// Represents a user in the system
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (matches database column 'id')
    #[sqlx(rename = "id")]
    pub user_id: Uuid,
    pub name: String,
    /// Always stored lower-cased
    pub email: String,
    pub password_hash: String,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

/// Represents a session for authenticated users
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    /// Unique session ID (used in cookies)
    #[sqlx(rename = "id")]
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

/// A user ready to be inserted, with the password already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// The parts of a user that are safe to hand to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id,
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at_utc,
        }
    }
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Active and not yet expired
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now)
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("invalid registration: {0}")]
    Invalid(ValidationErrors),
    #[error("a user with this email already exists")]
    EmailTaken,
    #[error("{0:#}")]
    Internal(color_eyre::Report),
}

impl From<color_eyre::Report> for RegistrationError {
    fn from(err: color_eyre::Report) -> Self {
        RegistrationError::Internal(err)
    }
}

impl From<StoreError> for RegistrationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => RegistrationError::EmailTaken,
            StoreError::Database(e) => RegistrationError::Internal(e.into()),
        }
    }
}

/// Validate, check the email is free, hash, and insert a new user
#[tracing::instrument(skip_all, err)]
pub async fn register_user(
    state: &AppState,
    input: RegistrationInput,
) -> Result<User, RegistrationError> {
    validation::validate_registration(
        &input.name,
        &input.email,
        &input.password,
        input.confirm_password.as_deref(),
    )
    .map_err(RegistrationError::Invalid)?;

    let email = validation::normalize_email(&input.email);

    if state.store.find_user_by_email(&email).await?.is_some() {
        info!("Registration rejected, email already registered");
        return Err(RegistrationError::EmailTaken);
    }

    let password_hash = password::hash_password(&input.password, state.config.bcrypt_cost).await?;

    // The unique index still catches a concurrent registration that slipped
    // past the lookup above
    let user = state
        .store
        .insert_user(NewUser {
            name: input.name.trim().to_string(),
            email,
            password_hash,
        })
        .await?;

    info!(user_id = %user.user_id, "Registered new user");
    Ok(user)
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Credential sign-in. `Ok(None)` covers both an unknown email and a wrong password,
/// and both run one bcrypt verify
#[tracing::instrument(skip_all, err)]
pub async fn authenticate(state: &AppState, input: &LoginInput) -> crate::Result<Option<User>> {
    let email = validation::normalize_email(&input.email);

    let Some(user) = state.store.find_user_by_email(&email).await? else {
        let decoy = state.decoy_hash.get().await?;
        password::verify_password(&input.password, decoy).await?;

        info!("Login failed, no such user");
        return Ok(None);
    };

    if password::verify_password(&input.password, &user.password_hash).await? {
        info!(user_id = %user.user_id, "Login succeeded");
        Ok(Some(user))
    } else {
        info!(user_id = %user.user_id, "Login failed, wrong password");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        store::{memory::MemoryStore, Store, StoreResult},
        test_support,
    };
    use std::sync::Arc;
    use tower_cookies::Key;

    fn input(email: &str) -> RegistrationInput {
        RegistrationInput {
            name: " Ada Lovelace ".to_string(),
            email: email.to_string(),
            password: "Sup3r$ecret".to_string(),
            confirm_password: Some("Sup3r$ecret".to_string()),
        }
    }

    #[tokio::test]
    async fn registers_with_normalized_fields() {
        let (state, _store) = test_support::state();

        let user = register_user(&state, input("Ada@Example.com")).await.unwrap();

        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.email, "ada@example.com");
        assert_ne!(user.password_hash, "Sup3r$ecret");
    }

    #[tokio::test]
    async fn second_registration_with_same_email_is_rejected() {
        let (state, store) = test_support::state();

        register_user(&state, input("ada@example.com")).await.unwrap();
        let err = register_user(&state, input("ADA@example.com "))
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrationError::EmailTaken));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_store() {
        let (state, store) = test_support::state();
        let mut bad = input("not-an-email");
        bad.password = "weak".to_string();

        let err = register_user(&state, bad).await.unwrap_err();

        let errors = match err {
            RegistrationError::Invalid(errors) => errors,
            other => panic!("expected validation errors, got {other:?}"),
        };
        assert_eq!(errors.len(), 3);
        assert_eq!(store.user_count(), 0);
    }

    #[tokio::test]
    async fn authenticate_checks_the_password() {
        let (state, _store) = test_support::state();
        register_user(&state, input("ada@example.com")).await.unwrap();

        let good = LoginInput {
            email: "ADA@example.com".to_string(),
            password: "Sup3r$ecret".to_string(),
        };
        let wrong = LoginInput {
            password: "Sup3r$ecreT".to_string(),
            ..good.clone()
        };
        let unknown = LoginInput {
            email: "grace@example.com".to_string(),
            ..good.clone()
        };

        assert!(authenticate(&state, &good).await.unwrap().is_some());
        assert!(authenticate(&state, &wrong).await.unwrap().is_none());
        assert!(authenticate(&state, &unknown).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_email_still_runs_a_password_check() {
        let (state, _store) = test_support::state();
        assert!(!state.decoy_hash.is_computed());

        let unknown = LoginInput {
            email: "grace@example.com".to_string(),
            password: "Sup3r$ecret".to_string(),
        };
        assert!(authenticate(&state, &unknown).await.unwrap().is_none());

        assert!(state.decoy_hash.is_computed());
    }

    /// Looks every email up as free but refuses the insert, the way a
    /// registration racing another one with the same email plays out
    struct RacingStore {
        inner: MemoryStore,
    }

    #[async_trait::async_trait]
    impl Store for RacingStore {
        async fn find_user_by_email(&self, _email: &str) -> StoreResult<Option<User>> {
            Ok(None)
        }

        async fn find_user_by_id(&self, user_id: Uuid) -> StoreResult<Option<User>> {
            self.inner.find_user_by_id(user_id).await
        }

        async fn insert_user(&self, _new_user: NewUser) -> StoreResult<User> {
            Err(StoreError::DuplicateEmail)
        }

        async fn create_session(
            &self,
            user_id: Uuid,
            expires_at: DateTime<Utc>,
        ) -> StoreResult<Session> {
            self.inner.create_session(user_id, expires_at).await
        }

        async fn find_session(&self, session_id: Uuid) -> StoreResult<Option<Session>> {
            self.inner.find_session(session_id).await
        }

        async fn deactivate_session(&self, session_id: Uuid) -> StoreResult<()> {
            self.inner.deactivate_session(session_id).await
        }

        async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> StoreResult<u64> {
            self.inner.delete_expired_sessions(now).await
        }
    }

    #[tokio::test]
    async fn duplicate_caught_at_insert_is_email_taken() {
        let store = Arc::new(RacingStore {
            inner: MemoryStore::default(),
        });
        let state = AppState::new(test_support::config(), store, Key::generate());

        let err = register_user(&state, input("ada@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrationError::EmailTaken));
    }

    #[test]
    fn session_usability() {
        let now = Utc::now();
        let mut session = Session {
            session_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            expires_at: now + chrono::Duration::minutes(5),
            is_active: true,
            created_at_utc: now,
            updated_at_utc: now,
        };
        assert!(session.is_usable(now));

        session.is_active = false;
        assert!(!session.is_usable(now));

        session.is_active = true;
        session.expires_at = now - chrono::Duration::seconds(1);
        assert!(session.is_expired(now));
        assert!(!session.is_usable(now));
    }
}
