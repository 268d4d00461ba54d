//! Form-field rules shared by the HTML forms and the JSON API.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9 ._'-]*$").expect("valid name regex"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("valid email regex")
});

static LOWERCASE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z]").expect("valid regex"));
static UPPERCASE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]").expect("valid regex"));
static DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]").expect("valid regex"));
static SYMBOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]").expect("valid regex"));

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;
pub const EMAIL_MAX_CHARS: usize = 254;
pub const PASSWORD_MIN_CHARS: usize = 8;
/// bcrypt ignores everything past 72 bytes
pub const PASSWORD_MAX_BYTES: usize = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Email,
    Password,
    ConfirmPassword,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Password => "password",
            Field::ConfirmPassword => "confirm_password",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// Every failing field, one message each, in form order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    fn push(&mut self, field: Field, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    fn record(&mut self, field: Field, result: Result<(), String>) {
        if let Err(message) = result {
            self.push(field, message);
        }
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Lower-cases and trims an email for lookup and storage
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    let chars = name.chars().count();

    if name.is_empty() {
        return Err("Name is required".to_string());
    }
    if chars < NAME_MIN_CHARS {
        return Err(format!(
            "Name must be at least {} characters",
            NAME_MIN_CHARS
        ));
    }
    if chars > NAME_MAX_CHARS {
        return Err(format!("Name must be at most {} characters", NAME_MAX_CHARS));
    }
    if !NAME_RE.is_match(name) {
        return Err(
            "Name must start with a letter and contain only letters, numbers, spaces, or . _ ' -"
                .to_string(),
        );
    }

    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();

    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if email.chars().count() > EMAIL_MAX_CHARS || !EMAIL_RE.is_match(email) {
        return Err("Enter a valid email address".to_string());
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_CHARS
        ));
    }
    if password.len() > PASSWORD_MAX_BYTES {
        return Err(format!(
            "Password must be at most {} bytes",
            PASSWORD_MAX_BYTES
        ));
    }

    let missing: Vec<&str> = [
        (&*LOWERCASE_RE, "a lowercase letter"),
        (&*UPPERCASE_RE, "an uppercase letter"),
        (&*DIGIT_RE, "a number"),
        (&*SYMBOL_RE, "a symbol"),
    ]
    .into_iter()
    .filter(|(re, _)| !re.is_match(password))
    .map(|(_, what)| what)
    .collect();

    if !missing.is_empty() {
        return Err(format!("Password must contain {}", missing.join(", ")));
    }

    Ok(())
}

/// Checks a registration submission
///
/// `confirm_password` is only compared when the client sent one.
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    confirm_password: Option<&str>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    errors.record(Field::Name, validate_name(name));
    errors.record(Field::Email, validate_email(email));
    errors.record(Field::Password, validate_password(password));

    if let Some(confirm) = confirm_password {
        if confirm.is_empty() {
            errors.push(Field::ConfirmPassword, "Please confirm your password");
        } else if confirm != password {
            errors.push(Field::ConfirmPassword, "Passwords do not match");
        }
    }

    errors.into_result()
}

/// Checks a login submission. Password strength is not re-checked here
pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    errors.record(Field::Email, validate_email(email));
    if password.is_empty() {
        errors.push(Field::Password, "Password is required");
    }

    errors.into_result()
}
