//! The encrypted `reelup_session` cookie.
//!
//! Only the session id travels in the cookie. A cookie that fails to decrypt
//! or doesn't hold a UUID reads as no session at all.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse as _, Response},
};
use chrono::{DateTime, Utc};
use time::Duration;
use tower_cookies::{cookie::SameSite, Cookie};
use tracing::error;
use uuid::Uuid;

use crate::state::AppState;

pub const SESSION_COOKIE_NAME: &str = "reelup_session";

/// Request-scoped access to the session cookie
pub struct CookieJar {
    cookies: tower_cookies::Cookies,
    state: AppState,
}

#[async_trait]
impl FromRequestParts<AppState> for CookieJar {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = tower_cookies::Cookies::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                error!("Cookie layer missing, can't read the session cookie");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            })?;

        Ok(CookieJar {
            cookies,
            state: state.clone(),
        })
    }
}

impl CookieJar {
    /// The session id carried by the request, if it decrypts
    pub fn session_id(&self) -> Option<Uuid> {
        self.cookies
            .private(&self.state.cookie_key)
            .get(SESSION_COOKIE_NAME)
            .and_then(|cookie| cookie.value().parse().ok())
    }

    /// Point the browser at `session_id` until `expires_at`
    pub fn set_session(&self, session_id: Uuid, expires_at: DateTime<Utc>) {
        let max_age = Duration::seconds((expires_at - Utc::now()).num_seconds().max(0));
        let cookie = session_cookie(
            session_id.to_string(),
            max_age,
            self.state.config.secure_cookies(),
        );

        self.cookies.private(&self.state.cookie_key).add(cookie);
    }

    pub fn clear_session(&self) {
        let cookie = session_cookie(
            String::new(),
            Duration::ZERO,
            self.state.config.secure_cookies(),
        );

        self.cookies.private(&self.state.cookie_key).remove(cookie);
    }
}

fn session_cookie(value: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE_NAME, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    cookie.set_max_age(max_age);
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let id = Uuid::new_v4();

        let cookie = session_cookie(id.to_string(), Duration::days(30), false);

        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), id.to_string());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::days(30)));
    }

    #[test]
    fn https_sessions_are_secure() {
        let cookie = session_cookie("x".to_string(), Duration::ZERO, true);

        assert_eq!(cookie.secure(), Some(true));
    }
}
