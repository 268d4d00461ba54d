use axum::{
    extract::Request,
    routing::{get, post},
};
use tower_cookies::CookieManagerLayer;

use crate::{
    auth::OptionalUser,
    components::{
        layout::card_page,
        ui::{
            button::{Button, ButtonSize},
            heading::PageHeading,
        },
    },
    components::layout::Page,
    state::AppState,
};

pub mod api;
pub mod session;
pub mod upload;

/// Build the application router with all routes
pub fn routes(app_state: AppState) -> axum::Router {
    axum::Router::new()
        // Public pages
        .route("/", get(root_page))
        .route("/healthz", get(healthz))
        .route("/login", get(session::login_page).post(session::login))
        .route(
            "/register",
            get(session::register_page).post(session::register),
        )
        .route("/logout", get(session::logout))
        // Authenticated pages
        .route("/upload", get(upload::upload_page))
        // JSON API
        .route("/api/register", post(api::register))
        .route("/api/upload-auth", get(api::upload_auth))
        .layer(CookieManagerLayer::new())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(sentry_tower::SentryHttpLayer::with_transaction())
        .layer(sentry_tower::NewSentryLayer::<Request>::new_from_top())
        .with_state(app_state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Root page handler - greets the signed-in user or points at login/register
async fn root_page(optional_user: OptionalUser) -> Page {
    let body = match &optional_user.user {
        Some(user) => maud::html! {
            (PageHeading::new(format!("Welcome back, {}!", user.name), "Ready to share something new?"))

            div class="space-y-4" {
                (Button::primary("Upload a video")
                    .href("/upload")
                    .full_width(true)
                    .size(ButtonSize::Large))
                (Button::link("Log out").href("/logout").full_width(true))
            }
        },
        None => maud::html! {
            (PageHeading::new("Welcome to reelup", "Upload and share your videos."))

            div class="space-y-4" {
                (Button::primary("Log in")
                    .href("/login")
                    .full_width(true)
                    .size(ButtonSize::Large))
                (Button::secondary("Create an account")
                    .href("/register")
                    .full_width(true)
                    .size(ButtonSize::Large))
            }
        },
    };

    card_page("reelup", body)
}
