//! A stand-in for the media CDN's upload API.
//!
//! Accepts uploads signed with `hex(HMAC-SHA1(private_key, token + expire))`,
//! the same params the app hands out from `/api/upload-auth`, and keeps what
//! it receives in memory so tests can look at it. Uploads arrive as
//! `multipart/form-data`, and CORS is open so the upload page can post here
//! from another origin.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use axum::{
    extract::{
        multipart::{Multipart, MultipartError},
        DefaultBodyLimit, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use ring::hmac;
use serde::Serialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Furthest into the future an `expire` may point, in seconds
pub const MAX_EXPIRE_WINDOW_SECS: i64 = 3600;

const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct CdnConfig {
    pub public_key: String,
    pub private_key: String,
    pub url_endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub file_id: String,
    pub name: String,
    pub file_path: String,
    pub url: String,
    pub size: usize,
}

#[derive(Clone)]
pub struct CdnState {
    config: Arc<CdnConfig>,
    key: Arc<hmac::Key>,
    files: Arc<Mutex<Vec<StoredFile>>>,
    /// Spent tokens and the `expire` they were signed with
    used_tokens: Arc<Mutex<HashMap<String, i64>>>,
}

impl CdnState {
    pub fn new(config: CdnConfig) -> Self {
        let key = hmac::Key::new(
            hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY,
            config.private_key.as_bytes(),
        );

        Self {
            config: Arc::new(config),
            key: Arc::new(key),
            files: Arc::default(),
            used_tokens: Arc::default(),
        }
    }

    /// Everything uploaded so far, oldest first
    pub fn files(&self) -> Vec<StoredFile> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Fields of an upload request, as sent by the browser's `FormData`
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Vec<u8>,
    pub file_name: String,
    pub folder: Option<String>,
    pub public_key: String,
    pub token: String,
    pub expire: String,
    pub signature: String,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => form.file = field.bytes().await?.to_vec(),
                "fileName" => form.file_name = field.text().await?,
                "folder" => form.folder = Some(field.text().await?),
                "publicKey" => form.public_key = field.text().await?,
                "token" => form.token = field.text().await?,
                "expire" => form.expire = field.text().await?,
                "signature" => form.signature = field.text().await?,
                _ => {}
            }
        }

        Ok(form)
    }
}

pub fn router(state: CdnState) -> Router {
    Router::new()
        .route("/api/v1/files/upload", post(upload))
        .route("/api/v1/files", get(list_files))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn rejection(status: StatusCode, message: &str) -> Response {
    warn!(%status, "Rejecting upload: {}", message);
    (status, Json(json!({ "message": message }))).into_response()
}

/// Records `token` as spent, forgetting tokens whose params can no longer
/// pass the expiry check anyway. False if it was already spent
fn claim_token(used: &mut HashMap<String, i64>, token: &str, expire: i64, now: i64) -> bool {
    used.retain(|_, token_expire| *token_expire >= now);

    if used.contains_key(token) {
        return false;
    }
    used.insert(token.to_string(), expire);
    true
}

async fn upload(State(state): State<CdnState>, multipart: Multipart) -> Response {
    let form = match UploadForm::read(multipart).await {
        Ok(form) => form,
        Err(err) => {
            return rejection(
                StatusCode::BAD_REQUEST,
                &format!("Malformed upload request: {}", err.body_text()),
            )
        }
    };

    if form.public_key != state.config.public_key {
        return rejection(StatusCode::FORBIDDEN, "Your account cannot be authenticated");
    }

    if form.file.is_empty() || form.file_name.is_empty() {
        return rejection(
            StatusCode::BAD_REQUEST,
            "Missing file parameter for upload",
        );
    }

    let Ok(expire) = form.expire.parse::<i64>() else {
        return rejection(StatusCode::BAD_REQUEST, "The expire parameter is invalid");
    };

    let now = Utc::now().timestamp();
    if expire < now {
        return rejection(
            StatusCode::FORBIDDEN,
            "The expire parameter is in the past",
        );
    }
    if expire > now + MAX_EXPIRE_WINDOW_SECS {
        return rejection(
            StatusCode::FORBIDDEN,
            "The expire parameter must be less than 1 hour into the future",
        );
    }

    let payload = format!("{}{}", form.token, expire);
    let signature_ok = hex::decode(&form.signature)
        .map(|sig| hmac::verify(&state.key, payload.as_bytes(), &sig).is_ok())
        .unwrap_or(false);
    if !signature_ok {
        return rejection(
            StatusCode::FORBIDDEN,
            "Your request contains invalid signature",
        );
    }

    let fresh = claim_token(
        &mut state
            .used_tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner),
        &form.token,
        expire,
        now,
    );
    if !fresh {
        return rejection(
            StatusCode::FORBIDDEN,
            "The token has already been used",
        );
    }

    let folder = form
        .folder
        .as_deref()
        .map(|f| f.trim_matches('/'))
        .filter(|f| !f.is_empty());
    let file_path = match folder {
        Some(folder) => format!("/{}/{}", folder, form.file_name),
        None => format!("/{}", form.file_name),
    };

    let stored = StoredFile {
        file_id: form.token,
        name: form.file_name,
        url: format!(
            "{}{}",
            state.config.url_endpoint.trim_end_matches('/'),
            file_path
        ),
        file_path,
        size: form.file.len(),
    };

    info!(file_path = %stored.file_path, size = stored.size, "Stored upload");
    state
        .files
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(stored.clone());

    (StatusCode::OK, Json(stored)).into_response()
}

async fn list_files(State(state): State<CdnState>) -> Json<Vec<StoredFile>> {
    Json(state.files())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claiming_a_token_forgets_expired_ones() {
        let mut used = HashMap::new();

        assert!(claim_token(&mut used, "old", 100, 50));
        assert!(claim_token(&mut used, "live", 1_000, 50));
        assert!(!claim_token(&mut used, "live", 1_000, 60));

        assert!(claim_token(&mut used, "new", 2_000, 500));
        assert!(!used.contains_key("old"));
        assert!(used.contains_key("live"));
        assert_eq!(used.len(), 2);
    }
}
