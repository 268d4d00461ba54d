//! Persistence for users and sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::user::{NewUser, Session, User};

pub mod memory;
pub mod postgres;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a user with this email already exists")]
    DuplicateEmail,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage backend behind [`crate::AppState`]
///
/// Emails are passed in already normalized; implementations compare them
/// case-insensitively anyway.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_id(&self, user_id: Uuid) -> StoreResult<Option<User>>;

    /// Insert a user, failing with [`StoreError::DuplicateEmail`] if the email is taken
    async fn insert_user(&self, new_user: NewUser) -> StoreResult<User>;

    async fn create_session(&self, user_id: Uuid, expires_at: DateTime<Utc>)
        -> StoreResult<Session>;

    async fn find_session(&self, session_id: Uuid) -> StoreResult<Option<Session>>;

    async fn deactivate_session(&self, session_id: Uuid) -> StoreResult<()>;

    /// Remove sessions that expired before `now`, returning how many were removed
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> StoreResult<u64>;
}
