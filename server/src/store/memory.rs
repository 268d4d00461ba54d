use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::user::{NewUser, Session, User};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    sessions: HashMap<Uuid, Session>,
}

/// In-process store for tests and database-less local runs
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // A panic while holding the lock can't leave the maps half-written
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.lock();
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.lock().users.get(&user_id).cloned())
    }

    async fn insert_user(&self, new_user: NewUser) -> StoreResult<User> {
        let mut tables = self.lock();

        if tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&new_user.email))
        {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now();
        let user = User {
            user_id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at_utc: now,
            updated_at_utc: now,
        };
        tables.users.insert(user.user_id, user.clone());

        Ok(user)
    }

    async fn create_session(
        &self,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<Session> {
        let now = Utc::now();
        let session = Session {
            session_id: Uuid::new_v4(),
            user_id,
            expires_at,
            is_active: true,
            created_at_utc: now,
            updated_at_utc: now,
        };
        self.lock()
            .sessions
            .insert(session.session_id, session.clone());

        Ok(session)
    }

    async fn find_session(&self, session_id: Uuid) -> StoreResult<Option<Session>> {
        Ok(self.lock().sessions.get(&session_id).cloned())
    }

    async fn deactivate_session(&self, session_id: Uuid) -> StoreResult<()> {
        if let Some(session) = self.lock().sessions.get_mut(&session_id) {
            session.is_active = false;
            session.updated_at_utc = Utc::now();
        }

        Ok(())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut tables = self.lock();
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| s.expires_at >= now);

        Ok((before - tables.sessions.len()) as u64)
    }
}
