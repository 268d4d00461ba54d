use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{
    auth::ApiUser,
    errors::{ServerError, ServerResult},
    state::AppState,
    uploads::UploadAuthParams,
    user::{self, PublicUser, RegistrationError, RegistrationInput},
};

/// Body of `POST /api/register`
///
/// Missing fields deserialize as empty so they surface as field errors rather
/// than as a rejected body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub confirm_password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadAuthResponse {
    #[serde(flatten)]
    pub params: UploadAuthParams,
    pub public_key: String,
    pub url_endpoint: String,
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "Internal server error" })),
    )
        .into_response()
}

/// Persist a new user: 201 on success, 400 on invalid input or an unreadable body,
/// 409 if the email is taken
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> ServerResult<Response, Response> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            info!("Rejected registration body: {}", rejection.body_text());
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "message": "Request body must be a JSON object with string fields",
                    "errors": [],
                })),
            )
                .into_response());
        }
    };

    let input = RegistrationInput {
        name: request.name,
        email: request.email,
        password: request.password,
        confirm_password: request.confirm_password,
    };

    match user::register_user(&state, input).await {
        Ok(user) => Ok((
            StatusCode::CREATED,
            Json(json!({
                "message": "User registered successfully",
                "user": PublicUser::from(&user),
            })),
        )
            .into_response()),
        Err(RegistrationError::Invalid(errors)) => Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "message": "Invalid registration details",
                "errors": errors,
            })),
        )
            .into_response()),
        Err(RegistrationError::EmailTaken) => Ok((
            StatusCode::CONFLICT,
            Json(json!({ "message": "User with this email already exists" })),
        )
            .into_response()),
        Err(RegistrationError::Internal(err)) => Err(ServerError(
            err.wrap_err("Failed to register user"),
            internal_error(),
        )),
    }
}

/// Issue upload auth params for the signed-in user
pub async fn upload_auth(
    State(state): State<AppState>,
    ApiUser { user, .. }: ApiUser,
) -> impl IntoResponse {
    let params = state.uploads.issue(Utc::now());
    info!(user_id = %user.user_id, expire = params.expire, "Issued upload auth params");

    (
        [(header::CACHE_CONTROL, "no-store")],
        Json(UploadAuthResponse {
            params,
            public_key: state.config.media.public_key.clone(),
            url_endpoint: state.config.media.url_endpoint.clone(),
        }),
    )
}
