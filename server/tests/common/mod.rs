#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use reelup::{
    state::{Config, MediaConfig},
    store::memory::MemoryStore,
    AppState,
};
use tower::ServiceExt as _;
use tower_cookies::Key;

pub const PRIVATE_KEY: &str = "private_test_key";
pub const PUBLIC_KEY: &str = "public_test_key";
pub const URL_ENDPOINT: &str = "https://cdn.example.com/reelup";
pub const UPLOAD_URL: &str = "https://upload.example.com/api/v1/files/upload";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
}

pub fn test_config() -> Config {
    Config {
        domain: "localhost:3000".to_string(),
        protocol: "http".to_string(),
        session_duration_days: Config::DEFAULT_SESSION_DURATION_DAYS,
        bcrypt_cost: 4,
        media: MediaConfig {
            public_key: PUBLIC_KEY.to_string(),
            private_key: PRIVATE_KEY.to_string(),
            url_endpoint: URL_ENDPOINT.to_string(),
            upload_url: UPLOAD_URL.to_string(),
            token_ttl_secs: MediaConfig::DEFAULT_TOKEN_TTL_SECS,
        },
    }
}

pub fn test_app() -> TestApp {
    test_app_with(test_config())
}

pub fn test_app_with(config: Config) -> TestApp {
    let store = Arc::new(MemoryStore::default());
    let state = AppState::new(config, store.clone(), Key::generate());
    let router = reelup::routes::routes(state.clone());

    TestApp {
        router,
        state,
        store,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
        let body = serde_urlencoded::to_string(fields).unwrap();
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();

        self.send(request).await
    }

    pub async fn post_json(&self, uri: &str, json: serde_json::Value) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap();

        self.send(request).await
    }

    /// Register through the form and return the session cookie it set
    pub async fn register_and_sign_in(&self, name: &str, email: &str, password: &str) -> String {
        let response = self
            .post_form(
                "/register",
                &[
                    ("name", name),
                    ("email", email),
                    ("password", password),
                    ("confirm_password", password),
                ],
            )
            .await;

        session_cookie(&response).expect("registration should set a session cookie")
    }
}

/// The `name=value` pair of the session cookie set by a response, if any
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{}=", reelup::cookies::SESSION_COOKIE_NAME)))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
