use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::{DateTime, Utc};
use color_eyre::eyre::eyre;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    cookies::CookieJar,
    state::AppState,
    user::{Session, User},
};

/// Extract the current user from the request if authenticated
///
/// Page handlers use this; anonymous visitors are sent to `/login`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub session: Session,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match current_session(parts, state).await? {
            Some((user, session)) => Ok(AuthUser { user, session }),
            None => {
                info!("No valid session, redirecting to login");
                Err(Redirect::to("/login").into_response())
            }
        }
    }
}

/// Like [`AuthUser`] but rejects with a JSON 401 instead of a redirect
#[derive(Debug, Clone)]
pub struct ApiUser {
    pub user: User,
    pub session: Session,
}

#[async_trait]
impl FromRequestParts<AppState> for ApiUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match current_session(parts, state).await? {
            Some((user, session)) => Ok(ApiUser { user, session }),
            None => Err((
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "message": "Unauthorized" })),
            )
                .into_response()),
        }
    }
}

/// Extract the optional user from the request if authenticated
#[derive(Debug, Clone)]
pub struct OptionalUser {
    pub user: Option<User>,
    pub session: Option<Session>,
}

#[async_trait]
impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let found = current_session(parts, state).await?;

        Ok(match found {
            Some((user, session)) => OptionalUser {
                user: Some(user),
                session: Some(session),
            },
            None => OptionalUser {
                user: None,
                session: None,
            },
        })
    }
}

/// Resolve the session cookie to a live session and its user
async fn current_session(
    parts: &mut Parts,
    state: &AppState,
) -> Result<Option<(User, Session)>, Response> {
    let cookies = CookieJar::from_request_parts(parts, state).await?;

    let Some(session_id) = cookies.session_id() else {
        return Ok(None);
    };

    let session = match validate_session(state, session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => return Ok(None),
        Err(err) => {
            error!("Error validating session {}: {:?}", session_id, err);
            return Err(StatusCode::INTERNAL_SERVER_ERROR.into_response());
        }
    };

    match state.store.find_user_by_id(session.user_id).await {
        Ok(Some(user)) => Ok(Some((user, session))),
        Ok(None) => {
            error!("No user found for session {}", session_id);
            Ok(None)
        }
        Err(err) => {
            error!("Error getting user for session {}: {:?}", session_id, err);
            Err(StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
    }
}

/// Look up a session, treating expired or inactive ones as absent
pub async fn validate_session(state: &AppState, session_id: Uuid) -> crate::Result<Option<Session>> {
    let Some(session) = state.store.find_session(session_id).await? else {
        return Ok(None);
    };

    if !session.is_active {
        info!("Session {} is inactive", session_id);
        return Ok(None);
    }

    if session.is_expired(Utc::now()) {
        info!("Session {} is expired", session_id);
        return Ok(None);
    }

    Ok(Some(session))
}

/// When a session started at `now` should end
pub fn session_expiry(now: DateTime<Utc>, duration_days: i64) -> crate::Result<DateTime<Utc>> {
    chrono::Duration::try_days(duration_days)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| eyre!("Session duration of {} days is out of range", duration_days))
}

/// Create a new session for a user and set a cookie
pub async fn create_session_and_set_cookie(
    state: &AppState,
    cookies: &CookieJar,
    user_id: Uuid,
) -> crate::Result<Session> {
    let expires_at = session_expiry(Utc::now(), state.config.session_duration_days)?;
    let session = state.store.create_session(user_id, expires_at).await?;

    cookies.set_session(session.session_id, session.expires_at);

    info!(
        "Created new session {} for user {}",
        session.session_id, user_id
    );
    Ok(session)
}

/// Clear the session cookie and invalidate the session in the store
///
/// The cookie is dropped before touching the store, so a store failure still
/// logs the browser out.
pub async fn end_session(state: &AppState, cookies: &CookieJar) -> crate::Result<()> {
    let session_id = cookies.session_id();

    cookies.clear_session();
    info!("Session cookie removed");

    if let Some(session_id) = session_id {
        state.store.deactivate_session(session_id).await?;
        info!("Session {} invalidated", session_id);
    }

    Ok(())
}
