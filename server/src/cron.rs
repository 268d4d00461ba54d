use std::time::Duration;

use chrono::Utc;
use tracing::{error, info};

use crate::state::AppState;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Periodic housekeeping. Runs until the process exits
pub async fn run_cron(app_state: AppState) -> crate::Result<()> {
    let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);

    loop {
        interval.tick().await;

        if let Err(err) = sweep_expired_sessions(&app_state).await {
            error!("Failed to sweep expired sessions: {:?}", err);
        }
    }
}

/// Delete sessions whose expiry has passed
pub async fn sweep_expired_sessions(state: &AppState) -> crate::Result<u64> {
    let removed = state.store.delete_expired_sessions(Utc::now()).await?;

    info!("Removed {} expired sessions", removed);
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_support, user::NewUser};

    #[tokio::test]
    async fn sweep_only_removes_expired() {
        let (state, _store) = test_support::state();
        let user = state
            .store
            .insert_user(NewUser {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();

        state
            .store
            .create_session(user.user_id, Utc::now() - chrono::Duration::minutes(1))
            .await
            .unwrap();
        let live = state
            .store
            .create_session(user.user_id, Utc::now() + chrono::Duration::days(1))
            .await
            .unwrap();

        assert_eq!(sweep_expired_sessions(&state).await.unwrap(), 1);
        assert_eq!(sweep_expired_sessions(&state).await.unwrap(), 0);
        assert!(state
            .store
            .find_session(live.session_id)
            .await
            .unwrap()
            .is_some());
    }
}
