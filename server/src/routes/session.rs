use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use color_eyre::eyre::WrapErr as _;
use maud::{html, Markup};
use serde::Deserialize;
use tracing::info;

use crate::{
    auth::{self, OptionalUser},
    components::{
        form::{Form as HtmlForm, InputField},
        layout::{card_page, Page},
        ui::{
            alert::Alert,
            button::{Button, ButtonSize},
            heading::PageHeading,
        },
    },
    cookies::CookieJar,
    errors::{ServerError, ServerResult, WithRedirect as _, WithStatus as _},
    state::AppState,
    user::{self, LoginInput, RegistrationError, RegistrationInput},
    validation::{self, Field, ValidationErrors},
};

/// Where people land after signing in or registering
const AFTER_LOGIN: &str = "/upload";

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Login page handler - displays the login form
pub async fn login_page(optional_user: OptionalUser) -> Response {
    if optional_user.user.is_some() {
        return Redirect::to(AFTER_LOGIN).into_response();
    }

    login_view("", None, None).into_response()
}

/// Credential sign-in from the login form
pub async fn login(
    State(state): State<AppState>,
    cookies: CookieJar,
    Form(form): Form<LoginForm>,
) -> ServerResult<Response, StatusCode> {
    if let Err(errors) = validation::validate_login(&form.email, &form.password) {
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            login_view(&form.email, Some(&errors), None),
        )
            .into_response());
    }

    let input = LoginInput {
        email: form.email,
        password: form.password,
    };
    let user = user::authenticate(&state, &input)
        .await
        .wrap_err("Failed to check credentials")
        .with_status(StatusCode::INTERNAL_SERVER_ERROR)?;

    let Some(user) = user else {
        return Ok((
            StatusCode::UNAUTHORIZED,
            login_view(
                &input.email,
                None,
                Some(Alert::error("Invalid email or password")),
            ),
        )
            .into_response());
    };

    auth::create_session_and_set_cookie(&state, &cookies, user.user_id)
        .await
        .wrap_err("Failed to create session")
        .with_status(StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Redirect::to(AFTER_LOGIN).into_response())
}

/// Registration page handler - displays the sign-up form
pub async fn register_page(optional_user: OptionalUser) -> Response {
    if optional_user.user.is_some() {
        return Redirect::to(AFTER_LOGIN).into_response();
    }

    register_view("", "", None).into_response()
}

/// Create an account from the registration form and sign the new user in
pub async fn register(
    State(state): State<AppState>,
    cookies: CookieJar,
    Form(form): Form<RegisterForm>,
) -> ServerResult<Response, StatusCode> {
    let name = form.name.clone();
    let email = form.email.clone();

    let input = RegistrationInput {
        name: form.name,
        email: form.email,
        password: form.password,
        confirm_password: Some(form.confirm_password),
    };

    let user = match user::register_user(&state, input).await {
        Ok(user) => user,
        Err(RegistrationError::Invalid(errors)) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                register_view(&name, &email, Some(&errors)),
            )
                .into_response());
        }
        Err(RegistrationError::EmailTaken) => {
            return Ok((
                StatusCode::CONFLICT,
                register_view_with_alert(
                    &name,
                    &email,
                    None,
                    Some(Alert::error("An account with this email already exists")),
                ),
            )
                .into_response());
        }
        Err(RegistrationError::Internal(err)) => {
            return Err(ServerError(
                err.wrap_err("Failed to register user"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
    };

    auth::create_session_and_set_cookie(&state, &cookies, user.user_id)
        .await
        .wrap_err("Failed to create session after registration")
        .with_status(StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Redirect::to(AFTER_LOGIN).into_response())
}

/// Logout route - clears the session cookie and redirects to home
///
/// If the store can't be reached the cookie is still cleared client-side
/// and the user is sent home.
pub async fn logout(
    State(state): State<AppState>,
    cookies: CookieJar,
) -> ServerResult<impl IntoResponse, Redirect> {
    auth::end_session(&state, &cookies)
        .await
        .wrap_err("Failed to end user session")
        .with_redirect(Redirect::to("/"))?;

    info!("User logged out successfully");
    Ok(Redirect::to("/"))
}

fn login_view(email: &str, errors: Option<&ValidationErrors>, alert: Option<Alert>) -> Page {
    let error_for = |field: Field| errors.and_then(|e| e.get(field));

    let body = html! {
        (PageHeading::new("Welcome back", "Log in to manage your uploads"))

        @if let Some(alert) = alert {
            (alert)
        }

        (HtmlForm::new("/login", "post", html! {
            (InputField::new("email")
                .label("Email")
                .input_type("email")
                .autocomplete("email")
                .placeholder("you@example.com")
                .value(email)
                .required(true)
                .error(error_for(Field::Email)))

            (InputField::new("password")
                .label("Password")
                .input_type("password")
                .autocomplete("current-password")
                .required(true)
                .error(error_for(Field::Password)))

            (Button::primary("Log in")
                .full_width(true)
                .size(ButtonSize::Large)
                .button_type("submit"))
        }))

        (footer_links("New here?", "Create an account", "/register"))
    };

    card_page("Log in - reelup", body)
}

fn register_view(name: &str, email: &str, errors: Option<&ValidationErrors>) -> Page {
    register_view_with_alert(name, email, errors, None)
}

fn register_view_with_alert(
    name: &str,
    email: &str,
    errors: Option<&ValidationErrors>,
    alert: Option<Alert>,
) -> Page {
    let error_for = |field: Field| errors.and_then(|e| e.get(field));

    let body = html! {
        (PageHeading::new("Create your account", "Start uploading in under a minute"))

        @if let Some(alert) = alert {
            (alert)
        }

        (HtmlForm::new("/register", "post", html! {
            (InputField::new("name")
                .label("Name")
                .autocomplete("name")
                .value(name)
                .required(true)
                .error(error_for(Field::Name)))

            (InputField::new("email")
                .label("Email")
                .input_type("email")
                .autocomplete("email")
                .placeholder("you@example.com")
                .value(email)
                .required(true)
                .error(error_for(Field::Email)))

            (InputField::new("password")
                .label("Password")
                .input_type("password")
                .autocomplete("new-password")
                .required(true)
                .error(error_for(Field::Password)))

            (InputField::new("confirm_password")
                .label("Confirm password")
                .input_type("password")
                .autocomplete("new-password")
                .required(true)
                .error(error_for(Field::ConfirmPassword)))

            p class="text-xs text-gray-500" {
                "At least 8 characters with an uppercase letter, a lowercase letter, a number, and a symbol."
            }

            (Button::primary("Create account")
                .full_width(true)
                .size(ButtonSize::Large)
                .button_type("submit"))
        }))

        (footer_links("Already have an account?", "Log in", "/login"))
    };

    card_page("Create account - reelup", body)
}

fn footer_links(prompt: &str, link_text: &str, href: &str) -> Markup {
    html! {
        div class="mt-6 pt-4 border-t border-gray-200 text-center text-sm text-gray-600" {
            (prompt) " "
            a href=(href) class="text-indigo-600 hover:text-indigo-800" { (link_text) }
            div class="mt-2" {
                a href="/" class="text-indigo-600 hover:text-indigo-800" { "Back to Home" }
            }
        }
    }
}
